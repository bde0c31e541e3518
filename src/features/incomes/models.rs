use crate::features::ledger::models::{LedgerDto, LedgerKind, LedgerRecord};

/// 収入
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeKind;

impl LedgerKind for IncomeKind {
    const PATH: &'static str = "/incomes";
    const LABEL: &'static str = "収入";
}

/// 収入データモデル
pub type Income = LedgerRecord<IncomeKind>;

/// 収入作成・更新用DTO
pub type IncomeDto = LedgerDto<IncomeKind>;
