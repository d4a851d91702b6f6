//! The Ledger: roster, selection and add-form visibility.
//!
//! Every mutator takes `&mut self`, leaves the ledger untouched when it
//! rejects the call, and returns a [`Snapshot`] of the state it produced.
//! The roster sits behind an `Arc` and is replaced wholesale on change, so a
//! snapshot taken earlier keeps seeing the roster it was taken from.

use crate::error::{LedgerError, Result};
use crate::friend::{seed_friends, Friend, FriendId, NewFriend};
use crate::split::SplitBill;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// Immutable view of the ledger at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    pub roster: Arc<Vec<Friend>>,
    pub selected: Option<FriendId>,
    pub add_form_open: bool,
}

impl Snapshot {
    pub fn selected_friend(&self) -> Option<&Friend> {
        let id = self.selected.as_ref()?;
        self.roster.iter().find(|f| &f.id == id)
    }
}

#[derive(Debug, Clone)]
pub struct Ledger {
    roster: Arc<Vec<Friend>>,
    selected: Option<FriendId>,
    add_form_open: bool,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Ledger {
    /// An empty ledger.
    pub fn new() -> Self {
        Self {
            roster: Arc::new(Vec::new()),
            selected: None,
            add_form_open: false,
        }
    }

    /// A ledger holding the startup roster.
    pub fn seeded() -> Self {
        Self {
            roster: Arc::new(seed_friends()),
            selected: None,
            add_form_open: false,
        }
    }

    pub fn with_roster(friends: Vec<Friend>) -> Result<Self> {
        let mut seen = HashSet::new();
        for friend in &friends {
            if !seen.insert(&friend.id) {
                return Err(LedgerError::DuplicateFriend(friend.id.clone()));
            }
        }
        Ok(Self {
            roster: Arc::new(friends),
            selected: None,
            add_form_open: false,
        })
    }

    // Read accessors

    pub fn roster(&self) -> &[Friend] {
        &self.roster
    }

    pub fn selected(&self) -> Option<&FriendId> {
        self.selected.as_ref()
    }

    pub fn selected_friend(&self) -> Option<&Friend> {
        self.selected.as_ref().and_then(|id| self.friend(id))
    }

    pub fn is_add_form_open(&self) -> bool {
        self.add_form_open
    }

    pub fn friend(&self, id: &FriendId) -> Option<&Friend> {
        self.roster.iter().find(|f| &f.id == id)
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            roster: Arc::clone(&self.roster),
            selected: self.selected.clone(),
            add_form_open: self.add_form_open,
        }
    }

    // Mutators

    /// Appends a friend at the end of the roster and closes the add-friend form.
    /// The selection is left alone.
    pub fn add_friend(&mut self, friend: NewFriend) -> Result<Snapshot> {
        if self.friend(&friend.id).is_some() {
            warn!(id = %friend.id, "rejected add_friend with duplicate id");
            return Err(LedgerError::DuplicateFriend(friend.id));
        }

        let mut roster = Vec::with_capacity(self.roster.len() + 1);
        roster.extend(self.roster.iter().cloned());
        let friend = friend.into_friend();
        debug!(id = %friend.id, name = %friend.name, "friend added");
        roster.push(friend);

        self.roster = Arc::new(roster);
        self.add_form_open = false;
        Ok(self.snapshot())
    }

    pub fn toggle_add_form(&mut self) -> Snapshot {
        self.add_form_open = !self.add_form_open;
        debug!(open = self.add_form_open, "add-friend form toggled");
        self.snapshot()
    }

    /// Selects `id`, or clears the selection if `id` is already selected.
    /// Either way the add-friend form is closed.
    pub fn select_friend(&mut self, id: &FriendId) -> Result<Snapshot> {
        if self.friend(id).is_none() {
            warn!(%id, "rejected select_friend for unknown id");
            return Err(LedgerError::UnknownFriend(id.clone()));
        }

        if self.selected.as_ref() == Some(id) {
            self.selected = None;
            debug!(%id, "friend deselected");
        } else {
            self.selected = Some(id.clone());
            debug!(%id, "friend selected");
        }
        self.add_form_open = false;
        Ok(self.snapshot())
    }

    /// Adds `delta` pence to the selected friend's balance, then clears the
    /// selection. Every other roster entry is carried over untouched.
    pub fn apply_split(&mut self, delta: i64) -> Result<Snapshot> {
        let Some(selected) = self.selected.clone() else {
            warn!(delta, "rejected apply_split with no friend selected");
            return Err(LedgerError::NoSelection);
        };

        let mut roster = Vec::with_capacity(self.roster.len());
        for friend in self.roster.iter() {
            if friend.id == selected {
                let balance = friend
                    .balance
                    .checked_add(delta)
                    .ok_or(LedgerError::BalanceOverflow)?;
                debug!(id = %friend.id, old = friend.balance, new = balance, "split applied");
                roster.push(Friend {
                    balance,
                    ..friend.clone()
                });
            } else {
                roster.push(friend.clone());
            }
        }

        self.roster = Arc::new(roster);
        self.selected = None;
        Ok(self.snapshot())
    }

    /// Computes the balance change for `split` and applies it to the selected friend.
    ///
    /// A missing selection is reported before any problem with the bill itself.
    pub fn split_bill(&mut self, split: SplitBill) -> Result<Snapshot> {
        if self.selected.is_none() {
            warn!(?split, "rejected split_bill with no friend selected");
            return Err(LedgerError::NoSelection);
        }
        let delta = split.delta()?;
        self.apply_split(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::split::Payer;

    fn clark_only() -> Ledger {
        Ledger::with_roster(vec![Friend::new(1u64, "Clark", "img", -700)]).unwrap()
    }

    fn new_friend(id: &str) -> NewFriend {
        NewFriend {
            id: FriendId::from(id),
            name: format!("Friend {id}"),
            image: "img".to_string(),
        }
    }

    #[test]
    fn seeded_ledger_starts_closed_and_unselected() {
        let ledger = Ledger::default();
        assert_eq!(ledger.roster().len(), 3);
        assert!(ledger.selected().is_none());
        assert!(!ledger.is_add_form_open());
    }

    #[test]
    fn duplicate_ids_rejected_at_construction() {
        let err = Ledger::with_roster(vec![
            Friend::new(1u64, "A", "img", 0),
            Friend::new(1u64, "B", "img", 0),
        ])
        .unwrap_err();
        assert_eq!(err, LedgerError::DuplicateFriend(FriendId::from(1u64)));
    }

    #[test]
    fn add_friend_appends_and_closes_form() {
        let mut ledger = clark_only();
        ledger.toggle_add_form();
        let snap = ledger.add_friend(new_friend("2")).unwrap();

        assert_eq!(snap.roster.len(), 2);
        assert_eq!(snap.roster[1].id, FriendId::from("2"));
        assert_eq!(snap.roster[1].balance, 0);
        assert!(!snap.add_form_open);
    }

    #[test]
    fn add_friend_keeps_selection() {
        let mut ledger = clark_only();
        ledger.select_friend(&FriendId::from(1u64)).unwrap();
        ledger.add_friend(new_friend("2")).unwrap();
        assert_eq!(ledger.selected(), Some(&FriendId::from(1u64)));
    }

    #[test]
    fn add_friend_rejects_existing_id() {
        let mut ledger = clark_only();
        let before = ledger.snapshot();
        let err = ledger.add_friend(new_friend("1")).unwrap_err();
        assert_eq!(err, LedgerError::DuplicateFriend(FriendId::from("1")));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn toggle_add_form_is_its_own_inverse() {
        let mut ledger = clark_only();
        assert!(ledger.toggle_add_form().add_form_open);
        assert!(!ledger.toggle_add_form().add_form_open);
    }

    #[test]
    fn selecting_same_friend_twice_deselects() {
        let mut ledger = clark_only();
        let id = FriendId::from(1u64);
        assert_eq!(ledger.select_friend(&id).unwrap().selected, Some(id.clone()));
        assert_eq!(ledger.select_friend(&id).unwrap().selected, None);
    }

    #[test]
    fn selecting_closes_add_form() {
        let mut ledger = clark_only();
        ledger.toggle_add_form();
        let snap = ledger.select_friend(&FriendId::from(1u64)).unwrap();
        assert!(!snap.add_form_open);
    }

    #[test]
    fn selecting_unknown_friend_is_rejected() {
        let mut ledger = clark_only();
        ledger.toggle_add_form();
        let err = ledger.select_friend(&FriendId::from("nope")).unwrap_err();
        assert_eq!(err, LedgerError::UnknownFriend(FriendId::from("nope")));
        assert!(ledger.is_add_form_open());
    }

    #[test]
    fn split_without_selection_fails_loudly() {
        let mut ledger = clark_only();
        let before = ledger.snapshot();
        assert_eq!(ledger.apply_split(100), Err(LedgerError::NoSelection));
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn user_paying_scenario() {
        let mut ledger = clark_only();
        ledger.select_friend(&FriendId::from(1u64)).unwrap();
        let snap = ledger
            .split_bill(SplitBill::new(2000, 500, Payer::User))
            .unwrap();
        assert_eq!(snap.roster[0].balance, 800);
        assert_eq!(snap.selected, None);
    }

    #[test]
    fn friend_paying_scenario() {
        let mut ledger = clark_only();
        ledger.select_friend(&FriendId::from(1u64)).unwrap();
        let snap = ledger
            .split_bill(SplitBill::new(2000, 500, Payer::Friend))
            .unwrap();
        assert_eq!(snap.roster[0].balance, -1200);
        assert_eq!(snap.selected, None);
    }

    #[test]
    fn split_bill_checks_selection_before_amounts() {
        let mut ledger = clark_only();
        let before = ledger.snapshot();
        assert_eq!(
            ledger.split_bill(SplitBill::new(100, 500, Payer::User)),
            Err(LedgerError::NoSelection)
        );
        assert_eq!(ledger.snapshot(), before);
    }

    #[test]
    fn invalid_split_keeps_selection() {
        let mut ledger = clark_only();
        ledger.select_friend(&FriendId::from(1u64)).unwrap();
        assert!(ledger.split_bill(SplitBill::new(100, 500, Payer::User)).is_err());
        assert_eq!(ledger.selected(), Some(&FriendId::from(1u64)));
    }

    #[test]
    fn old_snapshots_do_not_see_later_splits() {
        let mut ledger = Ledger::seeded();
        let clark = FriendId::from(118836u64);
        ledger.select_friend(&clark).unwrap();
        let before = ledger.snapshot();
        let after = ledger.apply_split(1500).unwrap();

        assert_eq!(before.roster[0].balance, -700);
        assert_eq!(after.roster[0].balance, 800);
        assert_eq!(before.roster[1..], after.roster[1..]);
        assert_eq!(before.selected_friend().map(|f| f.name.as_str()), Some("Clark"));
    }

    #[test]
    fn overflowing_balance_is_rejected() {
        let mut ledger =
            Ledger::with_roster(vec![Friend::new(1u64, "Max", "img", i64::MAX)]).unwrap();
        ledger.select_friend(&FriendId::from(1u64)).unwrap();
        assert_eq!(ledger.apply_split(1), Err(LedgerError::BalanceOverflow));
        assert_eq!(ledger.roster()[0].balance, i64::MAX);
    }
}
