//! Perks and the per-pattern perk table.
//!
//! ## Perk table
//!
//! `side` is the side that placed the card forming the pattern.
//!
//! | Perk | Applies when | Effect |
//! |---|---|---|
//! | SuperMoon | side = user, Full Moon Pair | bonus += 2 |
//! | LightOfMars | side = user, Lunar Cycle | bonus += 2 |
//! | MoonAtApogee | side = opponent | starred = subject slot only |
//! | WinterSolstice | side = opponent | user-owned slots are not claimable |
//! | Sagittarius | side = user | bonus += 2 * (bonus + starred) |
//!
//! Scorpio, LongNightMoon, LightOfVenus and Aquarius only act on the
//! end-game bonus (see `scoring::player`).
//!
//! Sagittarius is applied after SuperMoon and LightOfMars so it multiplies
//! their bonus too.

use serde::{Deserialize, Serialize};

use crate::board::{Pattern, PatternKind};
use crate::core::{Owner, Side, SlotId};

/// A match-scoped scoring modifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Perk {
    SuperMoon,
    LightOfMars,
    MoonAtApogee,
    WinterSolstice,
    Sagittarius,
    Scorpio,
    LongNightMoon,
    LightOfVenus,
    Aquarius,
}

impl Perk {
    pub const ALL: [Perk; 9] = [
        Perk::SuperMoon,
        Perk::LightOfMars,
        Perk::MoonAtApogee,
        Perk::WinterSolstice,
        Perk::Sagittarius,
        Perk::Scorpio,
        Perk::LongNightMoon,
        Perk::LightOfVenus,
        Perk::Aquarius,
    ];

    const fn bit(self) -> u16 {
        1 << self as u16
    }

    /// One-shot perks clear themselves after their first effect.
    #[must_use]
    pub const fn is_one_shot(self) -> bool {
        matches!(self, Perk::Sagittarius | Perk::Aquarius)
    }

    /// Perks that only affect the end-game bonus.
    #[must_use]
    pub const fn is_end_game(self) -> bool {
        matches!(
            self,
            Perk::Scorpio | Perk::LongNightMoon | Perk::LightOfVenus | Perk::Aquarius
        )
    }
}

impl std::fmt::Display for Perk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Perk::SuperMoon => "Super Moon",
            Perk::LightOfMars => "Light of Mars",
            Perk::MoonAtApogee => "Moon at Apogee",
            Perk::WinterSolstice => "Winter Solstice",
            Perk::Sagittarius => "Sagittarius",
            Perk::Scorpio => "Scorpio",
            Perk::LongNightMoon => "Long Night Moon",
            Perk::LightOfVenus => "Light of Venus",
            Perk::Aquarius => "Aquarius",
        };
        f.write_str(name)
    }
}

/// Bitset of active perks.
///
/// ```
/// use lunar_match::scoring::{Perk, PerkSet};
///
/// let mut perks = PerkSet::empty();
/// perks.insert(Perk::Scorpio);
/// assert!(perks.contains(Perk::Scorpio));
/// assert!(!perks.contains(Perk::Aquarius));
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PerkSet(u16);

impl PerkSet {
    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn insert(&mut self, perk: Perk) {
        self.0 |= perk.bit();
    }

    /// Remove a perk, returning whether it was set.
    pub fn remove(&mut self, perk: Perk) -> bool {
        let was = self.contains(perk);
        self.0 &= !perk.bit();
        was
    }

    #[must_use]
    pub const fn contains(self, perk: Perk) -> bool {
        self.0 & perk.bit() != 0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn iter(self) -> impl Iterator<Item = Perk> {
        Perk::ALL.into_iter().filter(move |perk| self.contains(*perk))
    }
}

impl FromIterator<Perk> for PerkSet {
    fn from_iter<I: IntoIterator<Item = Perk>>(iter: I) -> Self {
        let mut set = PerkSet::empty();
        for perk in iter {
            set.insert(perk);
        }
        set
    }
}

/// Scoring outcome of one pattern after perks.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Award {
    pub kind: PatternKind,
    /// Every slot the pattern touches.
    pub occupied: Vec<SlotId>,
    /// Slots worth one point each.
    pub starred: Vec<SlotId>,
    /// Slots the placing side takes ownership of.
    pub claimable: Vec<SlotId>,
    /// Extra points awarded in a separate step.
    pub bonus: u32,
}

impl Award {
    /// Total points this pattern awards.
    #[must_use]
    pub fn points(&self) -> u32 {
        self.starred.len() as u32 + self.bonus
    }
}

/// Apply the perk table to one pattern.
///
/// `perks` is the set captured at the start of the batch; `owner` reports
/// current slot ownership.
pub fn award(
    pattern: &Pattern,
    subject: SlotId,
    side: Side,
    perks: PerkSet,
    owner: impl Fn(SlotId) -> Owner,
) -> Award {
    let kind = pattern.kind();
    let occupied = pattern.occupied(subject);
    let mut starred = pattern.default_starred(subject);
    let mut claimable = occupied.clone();
    let mut bonus = 0;

    match side {
        Side::User => {
            if perks.contains(Perk::SuperMoon) && kind == PatternKind::FullMoonPair {
                bonus += 2;
            }
            if perks.contains(Perk::LightOfMars) && kind == PatternKind::LunarCycle {
                bonus += 2;
            }
            if perks.contains(Perk::Sagittarius) {
                bonus += 2 * (bonus + starred.len() as u32);
            }
        }
        Side::Opponent => {
            if perks.contains(Perk::MoonAtApogee) {
                starred = vec![subject];
            }
            if perks.contains(Perk::WinterSolstice) {
                claimable.retain(|slot| !owner(*slot).is(Side::User));
            }
        }
    }

    Award {
        kind,
        occupied,
        starred,
        claimable,
        bonus,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unowned(_: SlotId) -> Owner {
        Owner::Transient
    }

    fn full_moon() -> Pattern {
        Pattern::FullMoonPair { other: SlotId(1) }
    }

    fn cycle() -> Pattern {
        Pattern::LunarCycle {
            chain: vec![SlotId(0), SlotId(1), SlotId(2)],
        }
    }

    #[test]
    fn test_super_moon_ignores_opponent() {
        let perks: PerkSet = [Perk::SuperMoon].into_iter().collect();

        let opponent = award(&full_moon(), SlotId(0), Side::Opponent, perks, unowned);
        assert_eq!(opponent.bonus, 0);
        assert_eq!(opponent.starred, vec![SlotId(0), SlotId(1)]);
        assert_eq!(opponent.starred, opponent.occupied);

        let user = award(&full_moon(), SlotId(0), Side::User, perks, unowned);
        assert_eq!(user.bonus, 2);
    }

    #[test]
    fn test_light_of_mars_only_cycles() {
        let perks: PerkSet = [Perk::LightOfMars].into_iter().collect();
        assert_eq!(award(&cycle(), SlotId(1), Side::User, perks, unowned).bonus, 2);
        assert_eq!(award(&full_moon(), SlotId(0), Side::User, perks, unowned).bonus, 0);
    }

    #[test]
    fn test_moon_at_apogee_caps_opponent() {
        let perks: PerkSet = [Perk::MoonAtApogee].into_iter().collect();
        let opponent = award(&cycle(), SlotId(1), Side::Opponent, perks, unowned);
        assert_eq!(opponent.starred, vec![SlotId(1)]);
        assert_eq!(opponent.points(), 1);
        assert_eq!(opponent.claimable.len(), 3);

        let user = award(&cycle(), SlotId(1), Side::User, perks, unowned);
        assert_eq!(user.points(), 3);
    }

    #[test]
    fn test_winter_solstice_protects_user_slots() {
        let perks: PerkSet = [Perk::WinterSolstice].into_iter().collect();
        let owner = |slot: SlotId| if slot == SlotId(2) { Owner::User } else { Owner::Opponent };

        let opponent = award(&cycle(), SlotId(1), Side::Opponent, perks, owner);
        assert_eq!(opponent.claimable, vec![SlotId(0), SlotId(1)]);
        assert_eq!(opponent.starred.len(), 3);

        let user = award(&cycle(), SlotId(1), Side::User, perks, owner);
        assert_eq!(user.claimable.len(), 3);
    }

    #[test]
    fn test_sagittarius_formula() {
        let sag: PerkSet = [Perk::Sagittarius].into_iter().collect();
        // Phase pair: starred = 1, bonus = 2 * (0 + 1).
        let pair = Pattern::PhasePair { other: SlotId(3) };
        assert_eq!(award(&pair, SlotId(0), Side::User, sag, unowned).bonus, 2);

        // With SuperMoon first: bonus = 2 + 2 * (2 + 2) = 10.
        let both: PerkSet = [Perk::Sagittarius, Perk::SuperMoon].into_iter().collect();
        let full = award(&full_moon(), SlotId(0), Side::User, both, unowned);
        assert_eq!(full.bonus, 10);
        assert_eq!(full.points(), 12);

        assert_eq!(award(&pair, SlotId(0), Side::Opponent, sag, unowned).bonus, 0);
    }

    #[test]
    fn test_perk_set_ops() {
        let mut perks = PerkSet::empty();
        assert!(perks.is_empty());
        perks.insert(Perk::Aquarius);
        perks.insert(Perk::Scorpio);
        assert_eq!(perks.iter().collect::<Vec<_>>(), vec![Perk::Scorpio, Perk::Aquarius]);
        assert!(perks.remove(Perk::Aquarius));
        assert!(!perks.remove(Perk::Aquarius));
        assert!(Perk::Aquarius.is_one_shot());
        assert!(Perk::LightOfVenus.is_end_game());
        assert!(!Perk::SuperMoon.is_end_game());
    }
}
