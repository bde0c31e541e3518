/// 機能別モジュール
///
/// 各機能モジュールは、その機能に関連するモデルとAPI操作のサービスを含む自己完結型のユニットです。
pub mod auth;
pub mod categories;
pub mod dashboard;
pub mod expenses;
pub mod incomes;
pub mod ledger;
