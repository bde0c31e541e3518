/// ダッシュボード機能モジュール
///
/// 経費・収入・カテゴリーを集計し、グラフ表示用のデータを組み立てます。
pub mod models;
pub mod service;
pub mod stats;

pub use models::*;
pub use service::{build_overview, DashboardService};
