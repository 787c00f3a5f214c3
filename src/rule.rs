use crate::error::{Error, Result};
use std::{fmt, str::FromStr};

/// The number of permutations for a 3x3 neighbourhood
const PERMUTATIONS: usize = 1 << 9;
/// The bit of the center cell in a neighbourhood index
pub const CENTER: usize = 0b000_010_000;

type NeighborhoodIndex = [bool; PERMUTATIONS];

/// An outer-totalistic rule: born and survive neighbour counts in `0..=8`
///
/// Both sets are kept as bit masks (bit `n` set means `n` is a member) together
/// with a lookup table over all 512 neighbourhoods, so a step only needs one
/// index per cell.
#[derive(Clone, PartialEq, Eq)]
pub struct RuleSet {
    born: u16,
    survive: u16,
    index: NeighborhoodIndex,
}

impl RuleSet {
    /// Builds a rule from neighbour counts, ignoring anything above 8
    pub fn new(born: impl IntoIterator<Item = u8>, survive: impl IntoIterator<Item = u8>) -> Self {
        Self::from_masks(to_mask(born), to_mask(survive))
    }

    fn from_masks(born: u16, survive: u16) -> Self {
        Self {
            born,
            survive,
            index: generate_index(born, survive),
        }
    }

    /// Conway's Life, `B3/S23`
    pub fn conway() -> Self {
        Self::new([3], [2, 3])
    }

    /// Parses `B<digits>/S<digits>` or `<survive>/<born>`
    ///
    /// The first group is `born` only when the rule starts with `B`. Anything that
    /// is not a digit is dropped, so `B3/S23`, `B3/S2,3` and `23/3` all mean Life.
    pub fn parse(rule: &str) -> Result<Self> {
        let err = |reason| Error::RuleParse {
            rule: rule.to_owned(),
            reason,
        };
        let (first, second) = rule.split_once('/').ok_or_else(|| err("missing `/`"))?;
        if second.contains('/') {
            return Err(err("more than two groups"));
        }

        let (born, survive) = if rule.starts_with('B') {
            (first, second)
        } else {
            (second, first)
        };
        Ok(Self::from_masks(digit_mask(born), digit_mask(survive)))
    }

    #[inline]
    pub fn born(&self, neighbors: u32) -> bool {
        neighbors <= 8 && self.born & (1 << neighbors) != 0
    }
    #[inline]
    pub fn survives(&self, neighbors: u32) -> bool {
        neighbors <= 8 && self.survive & (1 << neighbors) != 0
    }

    /// Next state of a cell given its own state and live neighbour count
    #[inline]
    pub fn evaluate(&self, own: bool, neighbors: u32) -> bool {
        if own {
            self.survives(neighbors)
        } else {
            self.born(neighbors)
        }
    }

    /// Next state of the center of a 3x3 neighbourhood packed into 9 bits,
    /// row by row with the center at [`CENTER`]
    #[inline]
    pub fn next_state(&self, neighborhood: usize) -> bool {
        self.index[neighborhood & (PERMUTATIONS - 1)]
    }
}

fn to_mask(counts: impl IntoIterator<Item = u8>) -> u16 {
    counts
        .into_iter()
        .filter(|&n| n <= 8)
        .fold(0, |mask, n| mask | 1 << n)
}

fn digit_mask(group: &str) -> u16 {
    to_mask(
        group
            .chars()
            .filter_map(|c| c.to_digit(10))
            .map(|d| d as u8),
    )
}

/// Creates the lookup table for a rule
///
/// The table is indexed by a 9-bit number representing a cell and its neighbors.
/// The center cell is the middle-most bit, `1 << 4`.
fn generate_index(born: u16, survive: u16) -> NeighborhoodIndex {
    let mut index = [false; PERMUTATIONS];
    for (i, next) in index.iter_mut().enumerate() {
        let neighbors = (i & !CENTER).count_ones();
        let mask = if i & CENTER != 0 { survive } else { born };
        *next = mask & (1 << neighbors) != 0;
    }
    index
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::conway()
    }
}

impl FromStr for RuleSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Writes the canonical `B.../S...` form
impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = |mask: u16| -> String {
            (0..=8u8)
                .filter(|&n| mask & (1 << n) != 0)
                .map(|n| char::from(b'0' + n))
                .collect()
        };
        write!(f, "B{}/S{}", digits(self.born), digits(self.survive))
    }
}

impl fmt::Debug for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RuleSet({self})")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_value(alive: bool, neighbors: usize) -> usize {
        const NEIGHBOR_BITS: [usize; 8] = [
            0b000_000_001,
            0b000_000_010,
            0b000_000_100,
            0b000_001_000,
            0b000_100_000,
            0b001_000_000,
            0b010_000_000,
            0b100_000_000,
        ];

        let mut value = if alive { CENTER } else { 0 };
        for bit in NEIGHBOR_BITS.iter().take(neighbors) {
            value |= bit;
        }
        value
    }

    #[test]
    fn both_notations_mean_life() {
        let golly = RuleSet::parse("B3/S23").unwrap();
        let mcell = RuleSet::parse("23/3").unwrap();

        assert_eq!(golly, mcell);
        assert_eq!(golly, RuleSet::conway());
        assert!(golly.born(3) && !golly.born(2));
        assert!(golly.survives(2) && golly.survives(3) && !golly.survives(4));
    }

    #[test]
    fn missing_separator_is_rejected() {
        assert!(matches!(
            RuleSet::parse("B3S23"),
            Err(Error::RuleParse { rule, .. }) if rule == "B3S23"
        ));
        assert!(RuleSet::parse("B3/S2/3").is_err());
    }

    #[test]
    fn junk_and_repeats_are_ignored() {
        let rule = RuleSet::parse("B36x6/S2,3,3 ").unwrap();

        assert_eq!(rule, RuleSet::new([3, 6], [2, 3]));
    }

    #[test]
    fn digit_nine_is_dropped() {
        let rule = RuleSet::parse("B39/S9").unwrap();

        assert_eq!(rule, RuleSet::parse("B3/S").unwrap());
        assert!(!rule.born(9));
    }

    #[test]
    fn empty_groups_are_allowed() {
        let rule = RuleSet::parse("B/S").unwrap();

        assert!((0..=8).all(|n| !rule.born(n) && !rule.survives(n)));
    }

    #[test]
    fn only_uppercase_b_marks_born_first() {
        // lowercase is read as survive/born
        let rule = RuleSet::parse("b3/s23").unwrap();

        assert_eq!(rule, RuleSet::new([2, 3], [3]));
    }

    #[test]
    fn displays_canonical_form() {
        assert_eq!(RuleSet::parse("23/36").unwrap().to_string(), "B36/S23");
        assert_eq!(RuleSet::parse("B/S").unwrap().to_string(), "B/S");
    }

    #[test]
    fn evaluate_follows_sets() {
        let life = RuleSet::conway();

        assert!(life.evaluate(true, 2));
        assert!(life.evaluate(true, 3));
        assert!(life.evaluate(false, 3));
        assert!(!life.evaluate(true, 0));
        assert!(!life.evaluate(true, 1));
        assert!(!life.evaluate(true, 4));
        assert!(!life.evaluate(false, 2));
        assert!(!life.evaluate(false, 4));
    }

    #[test]
    fn table_matches_evaluate() {
        for rule in ["B3/S23", "B36/S23", "B2/S", "B0123/S45678"] {
            let rule = RuleSet::parse(rule).unwrap();
            for alive in [false, true] {
                for neighbors in 0..=8 {
                    assert_eq!(
                        rule.next_state(grid_value(alive, neighbors)),
                        rule.evaluate(alive, neighbors as u32),
                        "{rule:?} alive={alive} neighbors={neighbors}"
                    );
                }
            }
        }
    }
}
