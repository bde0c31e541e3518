/// ページング要求と結果
///
/// サーバー側のページングAPIと、ローカルでのページング（フォールバック）の両方で
/// 同じ結果の形を返すための型を提供します。
use serde::{Deserialize, Serialize};

/// 並び順
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// ページング要求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// ページ番号（0始まり）
    pub page: u32,
    /// 1ページあたりの件数（1以上）
    pub size: u32,
    /// 並び替えフィールド
    pub sort: Option<String>,
    pub direction: SortDirection,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(0, 10)
    }
}

impl PageRequest {
    /// 新しいページング要求を作成する（sizeは1以上に丸める）
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page,
            size: size.max(1),
            sort: None,
            direction: SortDirection::Asc,
        }
    }

    pub fn with_sort(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.sort = Some(field.into());
        self.direction = direction;
        self
    }

    /// 1ページあたりの件数（0が直接代入されていても1として扱う）
    pub fn page_size(&self) -> usize {
        self.size.max(1) as usize
    }

    /// 先頭要素のインデックス
    pub fn offset(&self) -> usize {
        (self.page as usize).saturating_mul(self.page_size())
    }

    /// クエリパラメータに変換する（sortは指定時のみ出力）
    pub fn to_query_params(&self) -> Vec<(String, String)> {
        let mut params = vec![
            ("page".to_string(), self.page.to_string()),
            ("size".to_string(), self.page_size().to_string()),
        ];

        if let Some(sort) = self.sort.as_deref().filter(|s| !s.trim().is_empty()) {
            params.push(("sort".to_string(), sort.to_string()));
            params.push(("direction".to_string(), self.direction.as_str().to_string()));
        }

        params
    }
}

/// ページング結果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedResult<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page_number: u32,
    pub page_size: u32,
    pub first: bool,
    pub last: bool,
    pub empty: bool,
}

impl<T> PaginatedResult<T> {
    /// 空のページング結果を作成する
    pub fn empty_page(request: &PageRequest) -> Self {
        Self {
            content: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            page_number: request.page,
            page_size: request.page_size() as u32,
            first: request.page == 0,
            last: true,
            empty: true,
        }
    }

    /// 全件をページ単位に切り出す
    ///
    /// # 引数
    /// * `items` - フィルタ済みの全件
    /// * `request` - ページング要求
    ///
    /// # 戻り値
    /// 指定ページの要素とページング情報
    pub fn paginate(items: Vec<T>, request: &PageRequest) -> Self {
        let total = items.len();
        let size = request.page_size();
        let start_index = request.offset();
        let end_index = start_index.saturating_add(size);

        let content: Vec<T> = if start_index >= total {
            Vec::new()
        } else {
            items
                .into_iter()
                .skip(start_index)
                .take(size)
                .collect()
        };

        Self {
            content,
            total_elements: total as u64,
            total_pages: total.div_ceil(size) as u32,
            page_number: request.page,
            page_size: size as u32,
            first: request.page == 0,
            last: end_index >= total,
            empty: total == 0,
        }
    }

    /// 要素の型を変換する
    pub fn map<U, F>(self, f: F) -> PaginatedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PaginatedResult {
            content: self.content.into_iter().map(f).collect(),
            total_elements: self.total_elements,
            total_pages: self.total_pages,
            page_number: self.page_number,
            page_size: self.page_size,
            first: self.first,
            last: self.last,
            empty: self.empty,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.empty
    }
}
