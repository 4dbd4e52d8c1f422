use ledger_api::{LedgerCode, ParsedMessage};

pub const DEFAULT_BLOCKED_LEDGER_CODE: LedgerCode = 123;

/// Решает, какие сообщения сохраняются: все, кроме одного
/// заблокированного ledger code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterPolicy {
    blocked_ledger_code: LedgerCode,
}

impl FilterPolicy {
    pub fn new(blocked_ledger_code: LedgerCode) -> Self {
        Self { blocked_ledger_code }
    }

    pub fn blocked_ledger_code(&self) -> LedgerCode {
        self.blocked_ledger_code
    }

    pub fn accept(&self, message: &ParsedMessage) -> bool {
        self.accepts_code(message.ledger_code)
    }

    pub fn accepts_code(&self, ledger_code: LedgerCode) -> bool {
        ledger_code != self.blocked_ledger_code
    }
}

impl Default for FilterPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_BLOCKED_LEDGER_CODE)
    }
}
