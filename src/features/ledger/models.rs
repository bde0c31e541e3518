use crate::features::categories::models::Category;
use crate::shared::errors::{AppError, AppResult};
use crate::shared::query::LedgerEntry;
use crate::shared::utils::{validate_amount, validate_required_field, validate_text_length};
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use std::marker::PhantomData;

/// 説明の最大文字数
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

/// 台帳の種別（経費・収入）
pub trait LedgerKind: Debug + Clone + Copy + PartialEq + Send + Sync + 'static {
    /// エンドポイントのパス
    const PATH: &'static str;

    /// 通知・ログに使う表示名
    const LABEL: &'static str;
}

/// 台帳データモデル
///
/// 経費・収入はどちらもこの形で返される。種別は型パラメータで区別する
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct LedgerRecord<K> {
    pub id: i64,
    pub description: String,
    pub value: Decimal,
    pub date: NaiveDate,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub category: Category,
    #[serde(skip)]
    pub kind: PhantomData<K>,
}

fn default_active() -> bool {
    true
}

impl<K> LedgerEntry for LedgerRecord<K> {
    fn description(&self) -> &str {
        &self.description
    }

    fn category_id(&self) -> i64 {
        self.category.id
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn value(&self) -> Decimal {
        self.value
    }
}

/// 台帳の作成・更新用DTO
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", bound = "")]
pub struct LedgerDto<K> {
    pub description: String,
    pub value: Decimal,
    pub date: NaiveDate,
    pub category_id: i64,
    #[serde(skip)]
    pub kind: PhantomData<K>,
}

impl<K> LedgerDto<K> {
    pub fn new(
        description: impl Into<String>,
        value: Decimal,
        date: NaiveDate,
        category_id: i64,
    ) -> Self {
        Self {
            description: description.into(),
            value,
            date,
            category_id,
            kind: PhantomData,
        }
    }

    /// 既存のデータから更新用DTOを作成する
    pub fn from_record(record: &LedgerRecord<K>) -> Self {
        Self::new(
            record.description.clone(),
            record.value,
            record.date,
            record.category.id,
        )
    }

    /// フォーム入力のバリデーション
    ///
    /// # バリデーション規則
    /// - 説明は必須、255文字以内
    /// - 金額は0より大きく、小数点以下2桁まで
    /// - カテゴリーの指定は必須
    pub fn validate(&self) -> AppResult<()> {
        validate_required_field(&self.description, "説明")?;
        validate_text_length(&self.description, MAX_DESCRIPTION_LENGTH, "説明")?;
        validate_amount(self.value)?;

        if self.category_id <= 0 {
            return Err(AppError::validation("カテゴリーを選択してください"));
        }

        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::record;
    use super::*;
    use crate::features::categories::models::CategoryType;
    use rust_decimal_macros::dec;

    #[derive(Debug, Clone, Copy, PartialEq)]
    struct Sample;

    impl LedgerKind for Sample {
        const PATH: &'static str = "/samples";
        const LABEL: &'static str = "サンプル";
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    #[test]
    fn test_record_defaults_missing_fields() {
        let json = r#"{
            "id": 3,
            "description": "Padaria",
            "value": 12.5,
            "date": "2024-03-01",
            "category": { "id": 5, "name": "Alimentação", "type": "EXPENSE" }
        }"#;

        let record: LedgerRecord<Sample> = serde_json::from_str(json).unwrap();
        assert!(record.active);
        assert_eq!(record.created_at, None);
        assert_eq!(record.value, dec!(12.5));
    }

    #[test]
    fn test_kind_marker_is_not_serialized() {
        let dto: LedgerDto<Sample> = LedgerDto::new("Ônibus", dec!(4.5), date(), 4);

        let value = serde_json::to_value(&dto).unwrap();
        assert_eq!(value["categoryId"], 4);
        assert_eq!(value["date"], "2024-03-01");
        assert_eq!(value["value"].as_f64(), Some(4.5));
        assert!(value.get("kind").is_none());
    }

    #[test]
    fn test_dto_validation() {
        let dto = |description: &str, value: Decimal, category_id: i64| {
            LedgerDto::<Sample>::new(description, value, date(), category_id)
        };

        assert!(dto("Aluguel", dec!(1200), 1).validate().is_ok());
        assert!(dto("", dec!(10), 1).validate().is_err());
        assert!(dto("   ", dec!(10), 1).validate().is_err());
        assert!(dto(&"a".repeat(256), dec!(10), 1).validate().is_err());
        assert!(dto(&"a".repeat(255), dec!(10), 1).validate().is_ok());
        assert!(dto("Aluguel", dec!(0), 1).validate().is_err());
        assert!(dto("Aluguel", dec!(-5), 1).validate().is_err());
        assert!(dto("Aluguel", dec!(10), 0).validate().is_err());
    }

    #[test]
    fn test_from_record_keeps_category() {
        let source: LedgerRecord<Sample> =
            record(1, "Cinema", dec!(30), "2024-02-10", 7, CategoryType::Expense);

        let dto = LedgerDto::from_record(&source);
        assert_eq!(dto.category_id, 7);
        assert_eq!(dto.description, "Cinema");
        assert_eq!(dto.value, dec!(30));
    }
}
