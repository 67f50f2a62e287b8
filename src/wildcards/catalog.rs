//! Wildcard catalog and the per-match deck.
//!
//! Wildcards are listed in unlock order. Nine of them only set a perk; the
//! other four act on the board.
//!
//! | Wildcard | Kind | Effect |
//! |---|---|---|
//! | Aries | random destruction | destroy up to 2 random opponent cards |
//! | Leo | chosen destruction | destroy a chosen card the user does not own |
//! | Gemini | ownership transfer | claim up to 2 chosen opponent slots |
//! | Capricorn | composite | destroy a chosen card, then place again there |

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::scoring::Perk;

/// Wildcard identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum WildcardId {
    SuperMoon,
    LightOfMars,
    MoonAtApogee,
    WinterSolstice,
    Sagittarius,
    Scorpio,
    LongNightMoon,
    LightOfVenus,
    Aquarius,
    Aries,
    Leo,
    Gemini,
    Capricorn,
}

/// What a wildcard does when played.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WildcardKind {
    /// Sets a perk for the rest of the match.
    Perk(Perk),
    /// Destroys random opponent cards.
    RandomDestroy { count: usize },
    /// Destroys one chosen card.
    ChosenDestroy,
    /// Claims chosen opponent slots.
    Transfer { count: usize },
    /// Destroys a chosen card and grants a placement on that slot.
    DestroyAndPlace,
}

impl WildcardId {
    /// Every wildcard, in unlock order.
    pub const ALL: [WildcardId; 13] = [
        WildcardId::SuperMoon,
        WildcardId::LightOfMars,
        WildcardId::MoonAtApogee,
        WildcardId::WinterSolstice,
        WildcardId::Sagittarius,
        WildcardId::Scorpio,
        WildcardId::LongNightMoon,
        WildcardId::LightOfVenus,
        WildcardId::Aquarius,
        WildcardId::Aries,
        WildcardId::Leo,
        WildcardId::Gemini,
        WildcardId::Capricorn,
    ];

    #[must_use]
    pub const fn kind(self) -> WildcardKind {
        match self {
            WildcardId::SuperMoon => WildcardKind::Perk(Perk::SuperMoon),
            WildcardId::LightOfMars => WildcardKind::Perk(Perk::LightOfMars),
            WildcardId::MoonAtApogee => WildcardKind::Perk(Perk::MoonAtApogee),
            WildcardId::WinterSolstice => WildcardKind::Perk(Perk::WinterSolstice),
            WildcardId::Sagittarius => WildcardKind::Perk(Perk::Sagittarius),
            WildcardId::Scorpio => WildcardKind::Perk(Perk::Scorpio),
            WildcardId::LongNightMoon => WildcardKind::Perk(Perk::LongNightMoon),
            WildcardId::LightOfVenus => WildcardKind::Perk(Perk::LightOfVenus),
            WildcardId::Aquarius => WildcardKind::Perk(Perk::Aquarius),
            WildcardId::Aries => WildcardKind::RandomDestroy { count: 2 },
            WildcardId::Leo => WildcardKind::ChosenDestroy,
            WildcardId::Gemini => WildcardKind::Transfer { count: 2 },
            WildcardId::Capricorn => WildcardKind::DestroyAndPlace,
        }
    }

    /// Whether the wildcard's effect lasts for the rest of the match.
    #[must_use]
    pub const fn is_persistent(self) -> bool {
        match self.kind() {
            WildcardKind::Perk(perk) => !perk.is_one_shot(),
            _ => false,
        }
    }

    /// Whether playing it asks the user to pick slots.
    #[must_use]
    pub const fn is_interactive(self) -> bool {
        matches!(
            self.kind(),
            WildcardKind::ChosenDestroy | WildcardKind::Transfer { .. } | WildcardKind::DestroyAndPlace
        )
    }

    /// Stable lowercase name, used by the command line.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            WildcardId::SuperMoon => "super-moon",
            WildcardId::LightOfMars => "light-of-mars",
            WildcardId::MoonAtApogee => "moon-at-apogee",
            WildcardId::WinterSolstice => "winter-solstice",
            WildcardId::Sagittarius => "sagittarius",
            WildcardId::Scorpio => "scorpio",
            WildcardId::LongNightMoon => "long-night-moon",
            WildcardId::LightOfVenus => "light-of-venus",
            WildcardId::Aquarius => "aquarius",
            WildcardId::Aries => "aries",
            WildcardId::Leo => "leo",
            WildcardId::Gemini => "gemini",
            WildcardId::Capricorn => "capricorn",
        }
    }

    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.name() == name)
    }

    /// Player-facing description.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            WildcardId::SuperMoon => "Your Full Moon pairs earn 2 extra points",
            WildcardId::LightOfMars => "Your Lunar Cycles earn 2 extra points",
            WildcardId::MoonAtApogee => "Opponent patterns score at most 1 point",
            WildcardId::WinterSolstice => "The opponent cannot take your slots",
            WildcardId::Sagittarius => "Your next patterns earn triple points",
            WildcardId::Scorpio => "The opponent earns no end-game bonus",
            WildcardId::LongNightMoon => "The opponent earns no end-game bonus",
            WildcardId::LightOfVenus => "Your end-game bonus counts twice",
            WildcardId::Aquarius => "10 extra points at the end of the match",
            WildcardId::Aries => "Destroy up to 2 random opponent cards",
            WildcardId::Leo => "Destroy a card you do not own",
            WildcardId::Gemini => "Take up to 2 opponent slots",
            WildcardId::Capricorn => "Destroy a card and play on its slot",
        }
    }
}

impl std::fmt::Display for WildcardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Wildcards available in one match, and which have been played.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WildcardDeck {
    owned: BTreeSet<WildcardId>,
    played: BTreeSet<WildcardId>,
}

impl WildcardDeck {
    #[must_use]
    pub fn new(owned: impl IntoIterator<Item = WildcardId>) -> Self {
        Self {
            owned: owned.into_iter().collect(),
            played: BTreeSet::new(),
        }
    }

    /// Owned wildcards not yet played this match, in unlock order.
    #[must_use]
    pub fn playable(&self) -> Vec<WildcardId> {
        self.owned.difference(&self.played).copied().collect()
    }

    #[must_use]
    pub fn can_play(&self, id: WildcardId) -> bool {
        self.owned.contains(&id) && !self.played.contains(&id)
    }

    pub fn mark_played(&mut self, id: WildcardId) {
        self.played.insert(id);
    }

    #[must_use]
    pub fn played(&self) -> &BTreeSet<WildcardId> {
        &self.played
    }
}
