use crate::features::expenses::models::ExpenseKind;
use crate::features::ledger::LedgerService;

/// 経費操作サービス
pub type ExpenseService = LedgerService<ExpenseKind>;
