/// ローカルでの絞り込みとページング
///
/// APIサーバーが「絞り込み＋ページング」を同時に受け付けないため、
/// 全件を取得したうえでクライアント側で絞り込み、ページ単位に切り出します。
/// 絞り込みは必ずページングより先に行うため、`total_elements` は常に絞り込み後の件数です。
use crate::shared::pagination::{PageRequest, PaginatedResult};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// エンティティ用の絞り込み条件
pub trait QueryFilter<T> {
    /// 有効な条件が1つもないかどうか
    fn is_empty(&self) -> bool;

    /// 要素が条件に一致するかどうか
    fn matches(&self, item: &T) -> bool;
}

/// 経費・収入に共通する項目
pub trait LedgerEntry {
    fn description(&self) -> &str;
    fn category_id(&self) -> i64;
    fn date(&self) -> NaiveDate;
    fn value(&self) -> Decimal;
}

/// 大文字小文字を区別しない部分一致
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// 絞り込み条件を適用する
pub fn apply_filter<T, F>(items: Vec<T>, filter: &F) -> Vec<T>
where
    F: QueryFilter<T>,
{
    items
        .into_iter()
        .filter(|item| filter.matches(item))
        .collect()
}

/// 全件に対して絞り込みとページングを行う
///
/// # 引数
/// * `items` - 絞り込み前の全件
/// * `filter` - 絞り込み条件
/// * `page` - ページング要求
///
/// # 戻り値
/// サーバー側ページングと同じ形のページング結果
pub fn local_query<T, F>(items: Vec<T>, filter: &F, page: &PageRequest) -> PaginatedResult<T>
where
    F: QueryFilter<T>,
{
    let fetched = items.len();
    let filtered = apply_filter(items, filter);

    log::debug!(
        "ローカル絞り込み: fetched={fetched}, matched={}, page={}, size={}",
        filtered.len(),
        page.page,
        page.page_size()
    );

    PaginatedResult::paginate(filtered, page)
}

/// 空白のみの検索語は未指定として扱う
fn normalized_search(search: &Option<String>) -> Option<&str> {
    search.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// 経費・収入の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryFilter {
    /// 説明文の部分一致（大文字小文字を区別しない）
    pub search: Option<String>,
    pub category_id: Option<i64>,
    /// 開始日（この日を含む）
    pub start_date: Option<NaiveDate>,
    /// 終了日（この日を含む）
    pub end_date: Option<NaiveDate>,
}

impl EntryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_category(mut self, category_id: i64) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_date_range(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.start_date = start;
        self.end_date = end;
        self
    }

    /// 指定された条件のみをクエリパラメータに変換する
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();

        if let Some(search) = normalized_search(&self.search) {
            params.push(("search".to_string(), search.to_string()));
        }
        if let Some(category_id) = self.category_id {
            params.push(("categoryId".to_string(), category_id.to_string()));
        }
        if let Some(start) = self.start_date {
            params.push(("startDate".to_string(), start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("endDate".to_string(), end.format("%Y-%m-%d").to_string()));
        }

        params
    }
}

impl<T: LedgerEntry> QueryFilter<T> for EntryFilter {
    fn is_empty(&self) -> bool {
        normalized_search(&self.search).is_none()
            && self.category_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    // 検索語 → カテゴリ → 日付範囲の順に判定する
    fn matches(&self, item: &T) -> bool {
        if let Some(search) = normalized_search(&self.search) {
            if !contains_ignore_case(item.description(), search) {
                return false;
            }
        }

        if let Some(category_id) = self.category_id {
            if item.category_id() != category_id {
                return false;
            }
        }

        let date = item.date();
        if self.start_date.is_some_and(|start| date < start) {
            return false;
        }
        if self.end_date.is_some_and(|end| date > end) {
            return false;
        }

        true
    }
}
