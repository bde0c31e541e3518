/// ダッシュボード用の集計処理
///
/// いずれも取得済みのデータを受け取る純粋関数で、空の入力にはゼロを返す。
use crate::features::categories::models::{Category, CategoryStats, CategoryType, TypeBreakdown};
use crate::features::ledger::models::LedgerRecord;
use crate::shared::query::LedgerEntry;
use crate::shared::utils::month_key;
use rust_decimal::Decimal;
use std::collections::{BTreeMap, HashMap};

pub use crate::features::dashboard::models::{CategoryTotal, MonthlyTotal, Summary};

/// 合計・件数・平均を集計する
///
/// # 戻り値
/// 空の場合は全てゼロ。平均は小数点以下2桁に丸める
pub fn summarize<T: LedgerEntry>(entries: &[T]) -> Summary {
    if entries.is_empty() {
        return Summary::default();
    }

    let total: Decimal = entries.iter().map(|entry| entry.value()).sum();
    let count = entries.len();

    Summary {
        total,
        count,
        average: (total / Decimal::from(count)).round_dp(2),
    }
}

/// 種別ごとのカテゴリー数を集計する
pub fn count_by_type(categories: &[Category]) -> CategoryStats {
    let by_type = categories
        .iter()
        .fold(TypeBreakdown::default(), |mut acc, category| {
            match category.category_type {
                CategoryType::Income => acc.income += 1,
                CategoryType::Expense => acc.expense += 1,
            }
            acc
        });

    CategoryStats {
        total: categories.len(),
        by_type,
    }
}

/// カテゴリー別に合計する
///
/// # 戻り値
/// 合計の降順（同額はカテゴリー名順）
pub fn totals_by_category<K>(entries: &[LedgerRecord<K>]) -> Vec<CategoryTotal> {
    let mut grouped: HashMap<i64, CategoryTotal> = HashMap::new();

    for entry in entries {
        let category = &entry.category;
        let slot = grouped.entry(category.id).or_insert_with(|| CategoryTotal {
            category_id: category.id,
            category_name: category.name.clone(),
            color: category.color.clone(),
            total: Decimal::ZERO,
            count: 0,
            percentage: Decimal::ZERO,
        });
        slot.total += entry.value();
        slot.count += 1;
    }

    let grand_total: Decimal = grouped.values().map(|t| t.total).sum();
    let mut totals: Vec<CategoryTotal> = grouped
        .into_values()
        .map(|mut t| {
            if !grand_total.is_zero() {
                t.percentage = (t.total / grand_total * Decimal::ONE_HUNDRED).round_dp(2);
            }
            t
        })
        .collect();

    totals.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category_name.cmp(&b.category_name))
    });
    totals
}

/// 月別の経費・収入・収支を集計する
///
/// # 戻り値
/// 月の昇順。どちらか一方にしか記録がない月も含む
pub fn monthly_totals<E, I>(expenses: &[E], incomes: &[I]) -> Vec<MonthlyTotal>
where
    E: LedgerEntry,
    I: LedgerEntry,
{
    let mut months: BTreeMap<String, (Decimal, Decimal)> = BTreeMap::new();

    for expense in expenses {
        months.entry(month_key(expense.date())).or_default().0 += expense.value();
    }
    for income in incomes {
        months.entry(month_key(income.date())).or_default().1 += income.value();
    }

    months
        .into_iter()
        .map(|(month, (expenses, incomes))| MonthlyTotal {
            month,
            expenses,
            incomes,
            balance: incomes - expenses,
        })
        .collect()
}

/// 日付の新しい順に最大n件を返す
pub fn most_recent<T: LedgerEntry + Clone>(entries: &[T], n: usize) -> Vec<T> {
    let mut sorted = entries.to_vec();
    // 同日の並びは元の順序を保つ
    sorted.sort_by(|a, b| b.date().cmp(&a.date()));
    sorted.truncate(n);
    sorted
}
