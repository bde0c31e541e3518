/// 環境設定関連のモジュール
pub mod environment;
pub mod initialization;

// 便利な再エクスポート
pub use environment::{
    get_environment, initialize_logging_system, load_environment_variables, ApiConfig,
    Environment, EnvironmentConfig, SessionConfig,
};
pub use initialization::{initialize_application, log_initialization_complete, InitializationResult};
