//! Edge topologies and the resolver that makes every coordinate readable.

use crate::error::{Error, Result};
use crate::grid::Grid;
use std::{fmt, str::FromStr};

/// What a read past one edge of the grid sees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BorderPolicy {
    /// Always dead
    #[default]
    Off,
    /// Always alive
    On,
    /// Wraps around to the opposite edge
    Loop,
    /// Reflects, repeating the edge cell
    Mirror0,
    /// Reflects about the edge cell without repeating it
    Mirror1,
    /// Wraps around to the opposite edge and flips the other axis
    Mobius,
    /// Reflects like [`BorderPolicy::Mirror0`] and flips the other axis
    Fold,
}

impl BorderPolicy {
    pub const ALL: [Self; 7] = [
        Self::Off,
        Self::On,
        Self::Loop,
        Self::Mirror0,
        Self::Mirror1,
        Self::Mobius,
        Self::Fold,
    ];

    pub fn token(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::On => "on",
            Self::Loop => "loop",
            Self::Mirror0 => "mirror0",
            Self::Mirror1 => "mirror1",
            Self::Mobius => "mobius",
            Self::Fold => "fold",
        }
    }
}

impl FromStr for BorderPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|p| p.token() == s)
            .ok_or_else(|| Error::Configuration {
                token: s.to_owned(),
            })
    }
}

impl fmt::Display for BorderPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Top,
    Bottom,
    Left,
    Right,
}

/// One policy per edge, each chosen independently
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BorderConfig {
    pub top: BorderPolicy,
    pub bottom: BorderPolicy,
    pub left: BorderPolicy,
    pub right: BorderPolicy,
}

impl BorderConfig {
    pub fn uniform(policy: BorderPolicy) -> Self {
        Self {
            top: policy,
            bottom: policy,
            left: policy,
            right: policy,
        }
    }

    /// Parses the four edge tokens, failing on the first unknown one
    pub fn from_tokens(top: &str, bottom: &str, left: &str, right: &str) -> Result<Self> {
        Ok(Self {
            top: top.parse()?,
            bottom: bottom.parse()?,
            left: left.parse()?,
            right: right.parse()?,
        })
    }

    pub fn with_edge(mut self, edge: Edge, policy: BorderPolicy) -> Self {
        *self.edge_mut(edge) = policy;
        self
    }

    pub fn edge(&self, edge: Edge) -> BorderPolicy {
        match edge {
            Edge::Top => self.top,
            Edge::Bottom => self.bottom,
            Edge::Left => self.left,
            Edge::Right => self.right,
        }
    }

    fn edge_mut(&mut self, edge: Edge) -> &mut BorderPolicy {
        match edge {
            Edge::Top => &mut self.top,
            Edge::Bottom => &mut self.bottom,
            Edge::Left => &mut self.left,
            Edge::Right => &mut self.right,
        }
    }
}

/// The outcome of applying one edge correction
enum Correction {
    /// The edge decides the value outright
    Value(bool),
    /// The coordinate moved, possibly flipping the other axis along the way
    Moved { coord: i64, other: i64 },
}

/// Corrections for a single axis
///
/// `len`/`other_len` are the extent of this axis and of the perpendicular one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Axis {
    under: BorderPolicy,
    over: BorderPolicy,
}

impl Axis {
    #[inline]
    fn underflow(self, c: i64, len: i64, other: i64, other_len: i64) -> Correction {
        let flipped = other_len - other - 1;
        let (coord, other) = match self.under {
            BorderPolicy::Off => return Correction::Value(false),
            BorderPolicy::On => return Correction::Value(true),
            BorderPolicy::Loop => (c.rem_euclid(len), other),
            BorderPolicy::Mirror0 => (-c - 1, other),
            BorderPolicy::Mirror1 if len == 1 => (0, other),
            BorderPolicy::Mirror1 => (-c, other),
            BorderPolicy::Fold => (-c - 1, flipped),
            BorderPolicy::Mobius => (c.rem_euclid(len), flipped),
        };
        Correction::Moved { coord, other }
    }

    #[inline]
    fn overflow(self, c: i64, len: i64, other: i64, other_len: i64) -> Correction {
        let flipped = other_len - other - 1;
        let (coord, other) = match self.over {
            BorderPolicy::Off => return Correction::Value(false),
            BorderPolicy::On => return Correction::Value(true),
            BorderPolicy::Loop => (c % len, other),
            BorderPolicy::Mirror0 => (len - (c - len) - 1, other),
            BorderPolicy::Mirror1 if len == 1 => (0, other),
            BorderPolicy::Mirror1 => (len - (c - len) - 2, other),
            BorderPolicy::Fold => (len - (c - len) - 1, flipped),
            BorderPolicy::Mobius => (c % len, flipped),
        };
        Correction::Moved { coord, other }
    }

    /// Distance covered by one reflection off each edge, when both edges reflect
    fn period(self, len: i64) -> Option<i64> {
        use BorderPolicy::{Fold, Mirror0, Mirror1};
        match (self.under, self.over) {
            (Mirror0 | Fold, Mirror0 | Fold) => Some(2 * len),
            (Mirror1, Mirror1) if len > 1 => Some(2 * (len - 1)),
            _ => None,
        }
    }

    /// Corrects `c` until it lies in `0..len`, returning the settled `(c, other)`
    /// or `Err` with the value an `off`/`on` edge decided on
    ///
    /// Reflections may land past the opposite edge on small grids, which is why
    /// this loops. Every pass strictly shrinks the distance to the range. Between
    /// two reflecting edges whole there-and-back pairs are skipped up front.
    #[inline]
    fn settle(
        self,
        mut c: i64,
        len: i64,
        mut other: i64,
        other_len: i64,
    ) -> std::result::Result<(i64, i64), bool> {
        if let Some(period) = self.period(len) {
            // pairs the loop below would take before getting within one reflection
            let pairs = if c >= len {
                (c - len) / period
            } else if c < 0 {
                (-1 - c) / period
            } else {
                0
            };
            c += if c < 0 { pairs * period } else { -pairs * period };
            let pair_flips = (self.under == BorderPolicy::Fold) != (self.over == BorderPolicy::Fold);
            if pair_flips && pairs % 2 == 1 {
                other = other_len - other - 1;
            }
        }
        while c < 0 || c >= len {
            let correction = if c < 0 {
                self.underflow(c, len, other, other_len)
            } else {
                self.overflow(c, len, other, other_len)
            };
            match correction {
                Correction::Value(value) => return Err(value),
                Correction::Moved { coord, other: o } => {
                    c = coord;
                    other = o;
                }
            }
        }
        Ok((c, other))
    }
}

/// A compiled [`BorderConfig`]
///
/// Built once whenever the edges change and then shared by every lookup of
/// a step. [`BorderResolver::resolve`] is total: any coordinate, however far
/// outside the grid, maps to a definite cell state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BorderResolver {
    config: BorderConfig,
    horizontal: Axis,
    vertical: Axis,
}

impl BorderResolver {
    pub fn new(config: BorderConfig) -> Self {
        Self {
            config,
            horizontal: Axis {
                under: config.left,
                over: config.right,
            },
            vertical: Axis {
                under: config.top,
                over: config.bottom,
            },
        }
    }

    /// Parses and compiles the four edge tokens
    pub fn from_tokens(top: &str, bottom: &str, left: &str, right: &str) -> Result<Self> {
        BorderConfig::from_tokens(top, bottom, left, right).map(Self::new)
    }

    #[inline]
    pub fn config(&self) -> BorderConfig {
        self.config
    }

    /// Reads `(x, y)` from `grid`, applying the edge policies to anything out of range
    ///
    /// The x axis is settled first, then the y axis, then the cell is read.
    #[inline]
    pub fn resolve(&self, grid: &Grid, x: i32, y: i32) -> bool {
        let (w, h) = (i64::from(grid.width()), i64::from(grid.height()));
        let (x, y) = (i64::from(x), i64::from(y));

        let (x, y) = match self.horizontal.settle(x, w, y, h) {
            Ok(xy) => xy,
            Err(value) => return value,
        };
        let (y, x) = match self.vertical.settle(y, h, x, w) {
            Ok(yx) => yx,
            Err(value) => return value,
        };
        grid.get(x as i32, y as i32)
    }
}

impl Default for BorderResolver {
    fn default() -> Self {
        Self::new(BorderConfig::default())
    }
}
