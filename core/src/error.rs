use crate::friend::FriendId;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

/// Broad classification of a rejected ledger operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The caller invoked an operation in a state where it is not allowed.
    InvalidPrecondition,
    /// The caller passed values that should have been rejected before reaching the ledger.
    InvalidInput,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no friend is selected")]
    NoSelection,

    #[error("no friend with id {0}")]
    UnknownFriend(FriendId),

    #[error("a friend with id {0} already exists")]
    DuplicateFriend(FriendId),

    #[error("{0} must not be empty")]
    EmptyField(&'static str),

    #[error("{field} is not a valid amount: {value:?}")]
    InvalidAmount { field: &'static str, value: String },

    #[error("amounts must not be negative")]
    NegativeAmount,

    #[error("your expense ({paid}) is more than the bill ({bill})")]
    ExpenseExceedsBill { paid: String, bill: String },

    #[error("balance out of range")]
    BalanceOverflow,
}

impl LedgerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LedgerError::NoSelection
            | LedgerError::UnknownFriend(_)
            | LedgerError::DuplicateFriend(_) => ErrorKind::InvalidPrecondition,
            LedgerError::EmptyField(_)
            | LedgerError::InvalidAmount { .. }
            | LedgerError::NegativeAmount
            | LedgerError::ExpenseExceedsBill { .. }
            | LedgerError::BalanceOverflow => ErrorKind::InvalidInput,
        }
    }
}
