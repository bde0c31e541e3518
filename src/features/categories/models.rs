use crate::shared::errors::{AppError, AppResult};
use crate::shared::query::{contains_ignore_case, QueryFilter};
use crate::shared::utils::{validate_required_field, validate_text_length};
use chrono::NaiveDateTime;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// カテゴリー名の最大文字数
pub const MAX_CATEGORY_NAME_LENGTH: usize = 100;

static COLOR_PATTERN: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").ok());

fn is_hex_color(color: &str) -> bool {
    COLOR_PATTERN
        .as_ref()
        .map_or(false, |pattern| pattern.is_match(color))
}

/// カテゴリー種別
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CategoryType {
    Income,
    Expense,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryType::Income => "INCOME",
            CategoryType::Expense => "EXPENSE",
        }
    }
}

impl fmt::Display for CategoryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CategoryType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "INCOME" => Ok(CategoryType::Income),
            "EXPENSE" => Ok(CategoryType::Expense),
            other => Err(AppError::validation(format!(
                "不明なカテゴリー種別です: {other}"
            ))),
        }
    }
}

/// カテゴリーデータモデル
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    /// 無効化されたカテゴリーは選択肢に表示しない
    #[serde(default = "default_active")]
    pub active: bool,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_active() -> bool {
    true
}

/// カテゴリー作成・更新用DTO
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDto {
    pub name: String,
    #[serde(rename = "type")]
    pub category_type: CategoryType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl CategoryDto {
    pub fn new(name: impl Into<String>, category_type: CategoryType) -> Self {
        Self {
            name: name.into(),
            category_type,
            color: None,
            active: None,
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// 既存カテゴリーから更新用DTOを作成する
    pub fn from_category(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            category_type: category.category_type,
            color: category.color.clone(),
            active: Some(category.active),
        }
    }

    /// フォーム入力のバリデーション
    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.name, "カテゴリー名")?;
        validate_text_length(&self.name, MAX_CATEGORY_NAME_LENGTH, "カテゴリー名")?;

        if let Some(color) = &self.color {
            if !is_hex_color(color) {
                return Err(AppError::validation(
                    "色は#RRGGBB形式で指定してください",
                ));
            }
        }

        Ok(())
    }
}

/// カテゴリー一覧の絞り込み条件
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub category_type: Option<CategoryType>,
}

impl CategoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_type(mut self, category_type: CategoryType) -> Self {
        self.category_type = Some(category_type);
        self
    }

    fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }
}

impl QueryFilter<Category> for CategoryFilter {
    fn is_empty(&self) -> bool {
        self.search_term().is_none() && self.category_type.is_none()
    }

    fn matches(&self, item: &Category) -> bool {
        if let Some(term) = self.search_term() {
            if !contains_ignore_case(&item.name, term) {
                return false;
            }
        }

        self.category_type
            .map_or(true, |category_type| item.category_type == category_type)
    }
}

/// 種別ごとの件数
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TypeBreakdown {
    #[serde(alias = "INCOME")]
    pub income: usize,
    #[serde(alias = "EXPENSE")]
    pub expense: usize,
}

/// カテゴリー統計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CategoryStats {
    pub total: usize,
    pub by_type: TypeBreakdown,
}


#[cfg(test)]
mod tests {
    use super::test_support::category;
    use super::*;

    #[test]
    fn test_category_deserialization() {
        let json = r##"{
            "id": 3,
            "name": "Alimentação",
            "type": "EXPENSE",
            "createdAt": "2024-01-10T08:30:00",
            "active": true,
            "color": "#FF5733"
        }"##;

        let category: Category = serde_json::from_str(json).unwrap();
        assert_eq!(category.id, 3);
        assert_eq!(category.category_type, CategoryType::Expense);
        assert_eq!(category.color.as_deref(), Some("#FF5733"));
        assert!(category.created_at.is_some());
    }

    #[test]
    fn test_category_active_defaults_to_true() {
        let category: Category =
            serde_json::from_str(r#"{"id":1,"name":"Salário","type":"INCOME"}"#).unwrap();
        assert!(category.active);
        assert_eq!(category.color, None);
    }

    #[test]
    fn test_category_type_parsing() {
        assert_eq!("income".parse::<CategoryType>().unwrap(), CategoryType::Income);
        assert_eq!(" EXPENSE ".parse::<CategoryType>().unwrap(), CategoryType::Expense);
        assert!("OTHER".parse::<CategoryType>().is_err());
        assert_eq!(CategoryType::Income.to_string(), "INCOME");
    }

    #[test]
    fn test_dto_validation() {
        assert!(CategoryDto::new("Transporte", CategoryType::Expense).validate().is_ok());
        assert!(CategoryDto::new("  ", CategoryType::Expense).validate().is_err());
        assert!(CategoryDto::new("a".repeat(101), CategoryType::Expense)
            .validate()
            .is_err());

        let colored = CategoryDto::new("Lazer", CategoryType::Expense).with_color("#00aaFF");
        assert!(colored.validate().is_ok());

        let bad_color = CategoryDto::new("Lazer", CategoryType::Expense).with_color("blue");
        assert!(bad_color.validate().is_err());
    }

    #[test]
    fn test_dto_serialization_omits_missing_fields() {
        let json = serde_json::to_string(&CategoryDto::new("Lazer", CategoryType::Expense)).unwrap();
        assert_eq!(json, r#"{"name":"Lazer","type":"EXPENSE"}"#);
    }

    #[test]
    fn test_filter_matches_name_and_type() {
        let items = vec![
            category(1, "Salário", CategoryType::Income),
            category(2, "Alimentação", CategoryType::Expense),
            category(3, "Aluguel", CategoryType::Expense),
        ];

        let filter = CategoryFilter::new().with_search("AL").with_type(CategoryType::Expense);
        let matched: Vec<i64> = items
            .iter()
            .filter(|c| filter.matches(c))
            .map(|c| c.id)
            .collect();
        assert_eq!(matched, vec![2, 3]);
    }

    #[test]
    fn test_blank_search_is_empty_filter() {
        assert!(QueryFilter::<Category>::is_empty(&CategoryFilter::new().with_search("   ")));
        assert!(!QueryFilter::<Category>::is_empty(
            &CategoryFilter::new().with_type(CategoryType::Income)
        ));
    }
}
