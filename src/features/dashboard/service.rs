use crate::features::categories::models::Category;
use crate::features::categories::service::CategoryService;
use crate::features::dashboard::models::DashboardOverview;
use crate::features::dashboard::stats::{
    count_by_type, monthly_totals, most_recent, summarize, totals_by_category,
};
use crate::features::expenses::models::Expense;
use crate::features::expenses::service::ExpenseService;
use crate::features::incomes::models::Income;
use crate::features::incomes::service::IncomeService;
use log::info;

/// ダッシュボードに表示する最近の経費の件数
pub const RECENT_EXPENSES_LIMIT: usize = 5;

/// ダッシュボード集計サービス
#[derive(Clone)]
pub struct DashboardService {
    categories: CategoryService,
    expenses: ExpenseService,
    incomes: IncomeService,
}

impl DashboardService {
    pub fn new(categories: CategoryService, expenses: ExpenseService, incomes: IncomeService) -> Self {
        Self {
            categories,
            expenses,
            incomes,
        }
    }

    /// ダッシュボード表示用データを取得する
    ///
    /// 経費・収入・カテゴリーを並行して取得する。
    /// 個々の取得に失敗した場合はその部分だけ空として集計する
    pub async fn overview(&self) -> DashboardOverview {
        let (expenses, incomes, categories) = futures::join!(
            self.expenses.get_all(),
            self.incomes.get_all(),
            self.categories.get_all(),
        );

        let overview = build_overview(&expenses, &incomes, &categories);
        info!(
            "ダッシュボードを集計しました: expenses={}, incomes={}, categories={}",
            overview.expense_summary.count,
            overview.income_summary.count,
            overview.category_stats.total
        );
        overview
    }
}

/// 取得済みデータからダッシュボード表示用データを組み立てる
pub fn build_overview(
    expenses: &[Expense],
    incomes: &[Income],
    categories: &[Category],
) -> DashboardOverview {
    let expense_summary = summarize(expenses);
    let income_summary = summarize(incomes);

    DashboardOverview {
        balance: income_summary.total - expense_summary.total,
        expense_summary,
        income_summary,
        category_stats: count_by_type(categories),
        expenses_by_category: totals_by_category(expenses),
        incomes_by_category: totals_by_category(incomes),
        monthly: monthly_totals(expenses, incomes),
        recent_expenses: most_recent(expenses, RECENT_EXPENSES_LIMIT),
    }
}
