/// 収入機能モジュール
///
/// 収入のモデルと、一覧・登録・集計のAPI操作を提供します。
pub mod models;
pub mod service;

pub use models::*;
pub use service::IncomeService;
