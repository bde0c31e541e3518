use crate::features::categories::models::CategoryStats;
use crate::features::expenses::models::Expense;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// 合計・件数・平均
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summary {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
}

/// カテゴリー別の集計（円グラフ用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: i64,
    pub category_name: String,
    pub color: Option<String>,
    pub total: Decimal,
    pub count: usize,
    /// 全体に占める割合（%、小数点以下2桁）
    pub percentage: Decimal,
}

/// 月別の収支（棒グラフ用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyTotal {
    /// YYYY-MM
    pub month: String,
    pub expenses: Decimal,
    pub incomes: Decimal,
    pub balance: Decimal,
}

/// ダッシュボード表示用データ
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardOverview {
    pub expense_summary: Summary,
    pub income_summary: Summary,
    /// 収入合計 - 経費合計
    pub balance: Decimal,
    pub category_stats: CategoryStats,
    pub expenses_by_category: Vec<CategoryTotal>,
    pub incomes_by_category: Vec<CategoryTotal>,
    pub monthly: Vec<MonthlyTotal>,
    pub recent_expenses: Vec<Expense>,
}
