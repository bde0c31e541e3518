/// 共有エラー型とエラーハンドリング
pub mod errors;

/// 共有設定管理
pub mod config;

/// 共有ユーティリティ関数
pub mod utils;

/// APIサーバーとの通信
pub mod api_client;

/// ページング要求と結果
pub mod pagination;

/// 一覧の絞り込みとローカル検索
pub mod query;

/// REST上のエンティティ一覧へのアクセス
pub mod resource;

/// ユーザー向け通知
pub mod notification;

/// 一覧画面の再読み込み制御
pub mod reload;


#[cfg(test)]
pub(crate) mod test_server;

// 便利な再エクスポート
pub use config::{
    get_environment, initialize_application, initialize_logging_system,
    load_environment_variables, log_initialization_complete, Environment, EnvironmentConfig,
    InitializationResult,
};
pub use errors::{AppError, AppResult, ErrorSeverity};
