/// カテゴリー機能モジュール
///
/// 収入・経費の分類に使うカテゴリーのモデルとAPI操作を提供します。
pub mod models;
pub mod service;

pub use models::*;
pub use service::CategoryService;
