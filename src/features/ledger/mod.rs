/// 経費・収入に共通する台帳機能
///
/// 経費と収入はエンドポイントのパスと表示名が異なるだけなので、
/// `LedgerKind` で種別を区別した同じモデルとサービスを使い分ける。
pub mod models;
pub mod service;

pub use models::*;
pub use service::LedgerService;
