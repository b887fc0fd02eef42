use thiserror::Error;

/// Error taxonomy of the ledger. Every rejected operation leaves prior
/// state completely unchanged; each kind renders a distinct message.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Invalid amount: enter a positive number with at most two decimals")]
    InvalidAmount,

    #[error("Invalid quantity: enter a whole number greater than zero")]
    InvalidQuantity,

    #[error("Debtor name cannot be empty")]
    EmptyDebtorName,

    #[error("Line item {0} is not part of this account")]
    UnknownLineItem(i64),

    #[error("Unknown debt account: {0}")]
    UnknownAccount(String),

    #[error("Unknown product: {0}")]
    UnknownProduct(String),

    #[error("The account was changed by another writer; please retry")]
    WriteConflict,

    #[error("Store error: {0}")]
    Store(#[from] rusqlite::Error),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
