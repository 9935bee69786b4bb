//! Chip denominations and count-per-denomination bundles.

use serde::{Deserialize, Serialize};
use std::{collections::BTreeMap, fmt};

/// Whole chip value. Bundle values are summed in `u64` so a full table of
/// stacks can't overflow.
pub type ChipValue = u64;

/// The fixed set of chip colors on the table.
///
/// Declaration order doubles as the tie-break when two denominations share a
/// value (green and red are both worth 25).
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Denomination {
    Blue,
    White,
    Black,
    Green,
    Red,
}

impl Denomination {
    pub const ALL: [Self; 5] = [Self::Blue, Self::White, Self::Black, Self::Green, Self::Red];

    #[must_use]
    pub const fn value(self) -> ChipValue {
        match self {
            Self::Blue => 400,
            Self::White => 200,
            Self::Black => 50,
            Self::Green => 25,
            Self::Red => 25,
        }
    }

    /// Denominations ordered by value, largest first. Equal values keep
    /// declaration order.
    #[must_use]
    pub fn by_value_desc() -> [Self; 5] {
        let mut denominations = Self::ALL;
        denominations.sort_by(|a, b| b.value().cmp(&a.value()));
        denominations
    }
}

impl fmt::Display for Denomination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Blue => "blue",
            Self::White => "white",
            Self::Black => "black",
            Self::Green => "green",
            Self::Red => "red",
        };
        write!(f, "{repr}")
    }
}

/// Chip counts keyed by denomination. Used for stacks, round bets, the pot
/// and (partially filled) bets. A missing entry counts as zero.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ChipBundle(BTreeMap<Denomination, u32>);

impl ChipBundle {
    /// Bundle with an explicit zero for every denomination.
    #[must_use]
    pub fn zeroed() -> Self {
        Self(Denomination::ALL.iter().map(|d| (*d, 0)).collect())
    }

    /// Same as [`ChipBundle::zeroed`] with the given counts filled in.
    #[must_use]
    pub fn full<I>(counts: I) -> Self
    where
        I: IntoIterator<Item = (Denomination, u32)>,
    {
        let mut bundle = Self::zeroed();
        for (denomination, count) in counts {
            bundle.set(denomination, count);
        }
        bundle
    }

    #[must_use]
    pub fn get(&self, denomination: Denomination) -> u32 {
        self.0.get(&denomination).copied().unwrap_or(0)
    }

    pub fn set(&mut self, denomination: Denomination, count: u32) {
        self.0.insert(denomination, count);
    }

    /// Add chips, saturating at `u32::MAX`.
    pub fn add(&mut self, denomination: Denomination, count: u32) {
        let entry = self.0.entry(denomination).or_insert(0);
        *entry = entry.saturating_add(count);
    }

    /// Remove chips if enough are present. Returns `false` and leaves the
    /// bundle untouched otherwise.
    pub fn remove(&mut self, denomination: Denomination, count: u32) -> bool {
        let available = self.get(denomination);
        if available < count {
            return false;
        }
        self.set(denomination, available - count);
        true
    }

    /// Move every chip of `other` into this bundle.
    pub fn absorb(&mut self, other: &ChipBundle) {
        for (denomination, count) in other.iter() {
            self.add(denomination, count);
        }
    }

    /// Non-zero entries only.
    pub fn iter(&self) -> impl Iterator<Item = (Denomination, u32)> + '_ {
        self.0
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(d, count)| (*d, *count))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    #[must_use]
    pub fn chip_count(&self) -> u64 {
        self.0.values().map(|count| u64::from(*count)).sum()
    }

    /// Monetary value of the bundle.
    #[must_use]
    pub fn value(&self) -> ChipValue {
        self.0
            .iter()
            .map(|(d, count)| d.value() * ChipValue::from(*count))
            .sum()
    }

    /// Make change for `amount` greedily, largest denomination first. Whatever
    /// can't be expressed in chips is returned as the remainder.
    #[must_use]
    pub fn greedy_change(amount: ChipValue) -> (Self, ChipValue) {
        let mut bundle = Self::zeroed();
        let mut owed = amount;
        for denomination in Denomination::by_value_desc() {
            let count = owed / denomination.value();
            if count > 0 {
                let count = u32::try_from(count).unwrap_or(u32::MAX);
                bundle.set(denomination, count);
                owed -= denomination.value() * ChipValue::from(count);
            }
        }
        (bundle, owed)
    }

    /// Fill in explicit zeros for denominations that are missing.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        for denomination in Denomination::ALL {
            self.0.entry(denomination).or_insert(0);
        }
        self
    }
}

impl FromIterator<(Denomination, u32)> for ChipBundle {
    fn from_iter<T: IntoIterator<Item = (Denomination, u32)>>(iter: T) -> Self {
        let mut bundle = Self::default();
        for (denomination, count) in iter {
            bundle.add(denomination, count);
        }
        bundle
    }
}

impl fmt::Display for ChipBundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.iter().map(|(d, count)| format!("{count}x{d}")).collect();
        if parts.is_empty() {
            write!(f, "nothing")
        } else {
            write!(f, "{}", parts.join(" "))
        }
    }
}
