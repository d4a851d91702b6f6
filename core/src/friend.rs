//! Friend records and their identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Default avatar service used when adding a friend.
pub const DEFAULT_IMAGE: &str = "https://i.pravatar.cc/48";

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FriendId(String);

impl FriendId {
    /// A fresh random identifier for a friend added at runtime.
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl fmt::Display for FriendId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FriendId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for FriendId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for FriendId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// A friend on the roster.
///
/// `balance` is in pence: negative means the user owes this friend,
/// positive means the friend owes the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Friend {
    pub id: FriendId,
    pub name: String,
    pub image: String,
    pub balance: i64,
}

impl Friend {
    pub fn new(
        id: impl Into<FriendId>,
        name: impl Into<String>,
        image: impl Into<String>,
        balance: i64,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            image: image.into(),
            balance,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.balance == 0
    }
}

/// A friend about to be added. There is no balance: everyone starts settled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFriend {
    pub id: FriendId,
    pub name: String,
    pub image: String,
}

impl NewFriend {
    /// Builds a friend with a random id, tagging the image reference with it
    /// so each friend gets a distinct avatar.
    pub fn with_random_id(name: impl Into<String>, image: &str) -> Self {
        let id = FriendId::random();
        let image = format!("{}?={}", image, id);
        Self {
            id,
            name: name.into(),
            image,
        }
    }

    pub(crate) fn into_friend(self) -> Friend {
        Friend {
            id: self.id,
            name: self.name,
            image: self.image,
            balance: 0,
        }
    }
}

/// The roster every session starts with.
pub fn seed_friends() -> Vec<Friend> {
    vec![
        Friend::new(118836u64, "Clark", "https://i.pravatar.cc/48?u=118836", -700),
        Friend::new(933372u64, "Sarah", "https://i.pravatar.cc/48?u=933372", 2000),
        Friend::new(499476u64, "Anthony", "https://i.pravatar.cc/48?u=499476", 0),
    ]
}
