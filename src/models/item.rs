use serde::{Deserialize, Serialize};
use std::{collections::HashSet, fmt::Display};

/// Identifier of a catalog item, 1-based as produced by the offline pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u32);

impl Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ItemId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Items a session will never show or recommend again
///
/// Grows monotonically within a session; there is no removal operation.
#[derive(Debug, Clone, Default)]
pub struct ExclusionSet {
    ids: HashSet<ItemId>,
}

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks an item as excluded. Returns `false` if it already was.
    pub fn insert(&mut self, id: ItemId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.ids.iter().copied()
    }
}

/// Items the user explicitly saved, in the order they were saved
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Watchlist {
    items: Vec<ItemId>,
}

impl Watchlist {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an item; saving the same item again is a no-op
    pub fn push(&mut self, id: ItemId) -> bool {
        if self.items.contains(&id) {
            return false;
        }
        self.items.push(id);
        true
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A single like/dislike decision on the displayed item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackEvent {
    pub item_id: ItemId,
    pub liked: bool,
    #[serde(default)]
    pub save_to_watchlist: bool,
}
