use crate::features::ledger::models::{LedgerDto, LedgerKind, LedgerRecord};

/// 経費
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ExpenseKind;

impl LedgerKind for ExpenseKind {
    const PATH: &'static str = "/expenses";
    const LABEL: &'static str = "経費";
}

/// 経費データモデル
pub type Expense = LedgerRecord<ExpenseKind>;

/// 経費作成・更新用DTO
pub type ExpenseDto = LedgerDto<ExpenseKind>;


#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::query::LedgerEntry;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[test]
    fn test_expense_deserialization() {
        let json = r#"{
            "id": 10,
            "description": "Supermercado",
            "value": 152.35,
            "date": "2024-01-15",
            "createdAt": "2024-01-15T19:02:11",
            "active": true,
            "category": { "id": 2, "name": "Alimentação", "type": "EXPENSE" }
        }"#;

        let expense: Expense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.value, dec!(152.35));
        assert_eq!(expense.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(expense.category_id(), 2);
        assert!(expense.created_at.is_some());
    }
}
