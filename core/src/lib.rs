//! Core of splitbill: an in-memory roster of friends with running balances,
//! a toggled friend selection, and the rule that turns a shared bill into a
//! balance change for the selected friend.
//!
//! - `ledger`: the [`Ledger`] state machine and its [`Snapshot`]s
//! - `friend`: friend records, identifiers and the startup roster
//! - `split`: bill-split arithmetic
//! - `money`: parsing and formatting of pence amounts
//! - `error`: [`LedgerError`] and its [`ErrorKind`]

pub mod error;
pub mod friend;
pub mod ledger;
pub mod money;
pub mod split;

pub use error::{ErrorKind, LedgerError, Result};
pub use friend::{seed_friends, Friend, FriendId, NewFriend, DEFAULT_IMAGE};
pub use ledger::{Ledger, Snapshot};
pub use money::{describe_balance, format_amount, format_money, parse_amount, DEFAULT_CURRENCY};
pub use split::{Payer, SplitBill};
