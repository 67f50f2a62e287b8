//! Sides and slot ownership.
//!
//! ## Side
//!
//! A match is always played between two sides: the human `User` and the
//! computed `Opponent`.
//!
//! ## Owner
//!
//! Ownership of a board slot. An empty slot is owned by nobody; a freshly
//! placed card that has not yet been claimed by a pattern is `Transient`.
//!
//! ## SideMap
//!
//! Per-side data storage, indexed by `Side`.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Side {
    User,
    Opponent,
}

impl Side {
    /// The side that moves after this one.
    #[must_use]
    pub const fn other(self) -> Self {
        match self {
            Side::User => Side::Opponent,
            Side::Opponent => Side::User,
        }
    }

    /// Dense index (`User` = 0, `Opponent` = 1).
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Side::User => 0,
            Side::Opponent => 1,
        }
    }

    /// Both sides, user first.
    pub fn both() -> impl Iterator<Item = Side> {
        [Side::User, Side::Opponent].into_iter()
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Side::User => f.write_str("user"),
            Side::Opponent => f.write_str("opponent"),
        }
    }
}

/// Ownership of a board slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Owner {
    /// Empty slot.
    #[default]
    None,
    /// Occupied, not claimed by either side.
    Transient,
    User,
    Opponent,
}

impl Owner {
    /// Check if this owner is the given side.
    #[must_use]
    pub fn is(self, side: Side) -> bool {
        self == Owner::from(side)
    }

    /// The owning side, if any.
    #[must_use]
    pub fn side(self) -> Option<Side> {
        match self {
            Owner::User => Some(Side::User),
            Owner::Opponent => Some(Side::Opponent),
            Owner::None | Owner::Transient => None,
        }
    }
}

impl From<Side> for Owner {
    fn from(side: Side) -> Self {
        match side {
            Side::User => Owner::User,
            Side::Opponent => Owner::Opponent,
        }
    }
}

/// Per-side data storage with O(1) access.
///
/// ```
/// use lunar_match::core::{Side, SideMap};
///
/// let mut score: SideMap<u32> = SideMap::default();
/// score[Side::User] += 3;
/// assert_eq!(score[Side::User], 3);
/// assert_eq!(score[Side::Opponent], 0);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SideMap<T> {
    data: [T; 2],
}

impl<T> SideMap<T> {
    /// Create a map with values from a factory function.
    pub fn new(factory: impl Fn(Side) -> T) -> Self {
        Self {
            data: [factory(Side::User), factory(Side::Opponent)],
        }
    }

    /// Create a map with both entries set to the same value.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self::new(|_| value.clone())
    }

    /// Iterate over (Side, &T) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (Side, &T)> {
        Side::both().zip(self.data.iter())
    }
}

impl<T> Index<Side> for SideMap<T> {
    type Output = T;

    fn index(&self, side: Side) -> &Self::Output {
        &self.data[side.index()]
    }
}

impl<T> IndexMut<Side> for SideMap<T> {
    fn index_mut(&mut self, side: Side) -> &mut Self::Output {
        &mut self.data[side.index()]
    }
}
