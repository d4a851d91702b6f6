//! How a shared bill turns into a change of one friend's balance.

use crate::error::{LedgerError, Result};
use crate::money::format_amount;
use serde::{Deserialize, Serialize};

/// Who put the money down for the bill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Payer {
    #[default]
    User,
    Friend,
}

impl Payer {
    pub fn toggle(self) -> Self {
        match self {
            Payer::User => Payer::Friend,
            Payer::Friend => Payer::User,
        }
    }
}

/// A bill shared between the user and the selected friend, in pence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitBill {
    pub bill_total: i64,
    pub paid_by_user: i64,
    pub payer: Payer,
}

impl SplitBill {
    pub fn new(bill_total: i64, paid_by_user: i64, payer: Payer) -> Self {
        Self {
            bill_total,
            paid_by_user,
            payer,
        }
    }

    /// The friend's share of the bill.
    pub fn paid_by_friend(&self) -> Result<i64> {
        if self.bill_total < 0 || self.paid_by_user < 0 {
            return Err(LedgerError::NegativeAmount);
        }
        if self.paid_by_user > self.bill_total {
            return Err(LedgerError::ExpenseExceedsBill {
                paid: format_amount(self.paid_by_user),
                bill: format_amount(self.bill_total),
            });
        }
        Ok(self.bill_total - self.paid_by_user)
    }

    /// Change to apply to the friend's balance.
    ///
    /// When the user pays, the friend owes their own share. When the friend
    /// pays, the user owes what the user's share was. The two branches are
    /// not mirror images of each other and must stay that way.
    pub fn delta(&self) -> Result<i64> {
        let paid_by_friend = self.paid_by_friend()?;
        Ok(match self.payer {
            Payer::User => paid_by_friend,
            Payer::Friend => -self.paid_by_user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_pays_friend_owes_their_share() {
        let split = SplitBill::new(2000, 500, Payer::User);
        assert_eq!(split.paid_by_friend(), Ok(1500));
        assert_eq!(split.delta(), Ok(1500));
    }

    #[test]
    fn friend_pays_user_owes_their_share() {
        let split = SplitBill::new(2000, 500, Payer::Friend);
        assert_eq!(split.delta(), Ok(-500));
    }

    #[test]
    fn whole_bill_paid_by_user_leaves_nothing_owed() {
        assert_eq!(SplitBill::new(1000, 1000, Payer::User).delta(), Ok(0));
        assert_eq!(SplitBill::new(1000, 1000, Payer::Friend).delta(), Ok(-1000));
    }

    #[test]
    fn expense_above_bill_is_rejected() {
        let err = SplitBill::new(1000, 1500, Payer::User).delta().unwrap_err();
        assert_eq!(
            err,
            LedgerError::ExpenseExceedsBill {
                paid: "15.00".to_string(),
                bill: "10.00".to_string()
            }
        );
    }

    #[test]
    fn negative_amounts_are_rejected() {
        assert_eq!(
            SplitBill::new(-1, 0, Payer::User).delta(),
            Err(LedgerError::NegativeAmount)
        );
    }

    #[test]
    fn payer_toggles_both_ways() {
        assert_eq!(Payer::User.toggle(), Payer::Friend);
        assert_eq!(Payer::Friend.toggle(), Payer::User);
    }
}
