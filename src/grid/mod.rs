mod window;

pub use self::window::GridWindow;
use crate::error::{Error, Result};
use rand::Rng;
use serde::{Deserialize, Serialize, Serializer};

/// A rectangular field of cells, packed eight to a byte
///
/// Cell `(x, y)` lives at index `x + y * width`, in byte `index / 8` at bit
/// `7 - index % 8`, so the first cell of every byte is its most significant bit.
/// This layout is what [`Grid::bytes`] exposes and what the JSON form carries.
///
/// Bits past the last cell in the final byte are padding. They are never read
/// by [`Grid::get`] but are kept as-is so that encoding round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "WireGrid")]
pub struct Grid {
    width: i32,
    height: i32,
    bits: Vec<u8>,
}

/// `[width, height, [bytes...]]`
#[derive(Deserialize)]
struct WireGrid(i32, i32, Vec<u8>);

impl TryFrom<WireGrid> for Grid {
    type Error = Error;

    fn try_from(WireGrid(width, height, bits): WireGrid) -> Result<Self> {
        Grid::from_bits(width, height, bits)
    }
}

impl Serialize for Grid {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        (self.width, self.height, &self.bits).serialize(serializer)
    }
}

#[inline]
fn locate(width: i32, x: i32, y: i32) -> (usize, u8) {
    let idx = x as usize + y as usize * width as usize;
    (idx / 8, 0x80 >> (idx % 8))
}

fn byte_len(width: i32, height: i32) -> Result<usize> {
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidDimension { width, height });
    }
    Ok((width as usize * height as usize).div_ceil(8))
}

impl Grid {
    /// Creates an all-dead grid
    pub fn new(width: i32, height: i32) -> Result<Self> {
        let len = byte_len(width, height)?;
        Ok(Self {
            width,
            height,
            bits: vec![0; len],
        })
    }

    /// Wraps already packed bytes, which must be exactly `ceil(width * height / 8)` long
    pub fn from_bits(width: i32, height: i32, bits: Vec<u8>) -> Result<Self> {
        let expected = byte_len(width, height)?;
        if bits.len() != expected {
            return Err(Error::BitLength {
                expected,
                actual: bits.len(),
            });
        }
        Ok(Self {
            width,
            height,
            bits,
        })
    }

    /// Sets every byte to `0b0101_0101`
    ///
    /// This only lines up into a checkerboard when `width` is a multiple of 8,
    /// otherwise rows drift into stripes.
    pub fn alternating(width: i32, height: i32) -> Result<Self> {
        let mut grid = Self::new(width, height)?;
        grid.bits.fill(0b0101_0101);
        Ok(grid)
    }

    /// Fills every byte with random bits from the thread-local generator
    pub fn random(width: i32, height: i32) -> Result<Self> {
        Self::random_with(width, height, &mut rand::rng())
    }

    pub fn random_with<R: Rng>(width: i32, height: i32, rng: &mut R) -> Result<Self> {
        let mut grid = Self::new(width, height)?;
        rng.fill(&mut grid.bits[..]);
        Ok(grid)
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.width
    }
    #[inline]
    pub fn height(&self) -> i32 {
        self.height
    }
    #[inline]
    pub fn contains(&self, x: i32, y: i32) -> bool {
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }

    /// The packed cell bytes, see the type level docs for the layout
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Reads a cell
    ///
    /// `(x, y)` must be inside the grid. Out of range reads are a caller bug and
    /// either panic or return a neighbouring cell's state.
    #[inline]
    pub fn get(&self, x: i32, y: i32) -> bool {
        debug_assert!(self.contains(x, y), "({x}, {y}) outside of grid");
        let (byte, mask) = locate(self.width, x, y);
        self.bits[byte] & mask != 0
    }

    #[inline]
    pub fn set_true(&mut self, x: i32, y: i32) {
        debug_assert!(self.contains(x, y), "({x}, {y}) outside of grid");
        let (byte, mask) = locate(self.width, x, y);
        self.bits[byte] |= mask;
    }
    #[inline]
    pub fn set_false(&mut self, x: i32, y: i32) {
        debug_assert!(self.contains(x, y), "({x}, {y}) outside of grid");
        let (byte, mask) = locate(self.width, x, y);
        self.bits[byte] &= !mask;
    }
    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: bool) {
        if value {
            self.set_true(x, y);
        } else {
            self.set_false(x, y);
        }
    }
    #[inline]
    pub fn invert(&mut self, x: i32, y: i32) {
        debug_assert!(self.contains(x, y), "({x}, {y}) outside of grid");
        let (byte, mask) = locate(self.width, x, y);
        self.bits[byte] ^= mask;
    }

    /// Returns a copy with every byte complemented, padding included
    pub fn invert_all(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            bits: self.bits.iter().map(|b| !b).collect(),
        }
    }

    /// Number of live cells, ignoring padding bits
    pub fn alive_count(&self) -> usize {
        let cells = self.width as usize * self.height as usize;
        let full = cells / 8;
        let whole: u32 = self.bits[..full].iter().map(|b| b.count_ones()).sum();
        let tail = match cells % 8 {
            0 => 0,
            rem => (self.bits[full] & (0xff << (8 - rem))).count_ones(),
        };
        (whole + tail) as usize
    }

    /// Copies the cells of `pattern` with its top left corner at `(x, y)`,
    /// dropping whatever falls outside of this grid
    pub fn paste(&mut self, pattern: &Grid, x: i32, y: i32) {
        for py in 0..pattern.height {
            for px in 0..pattern.width {
                let (tx, ty) = (x + px, y + py);
                if self.contains(tx, ty) {
                    self.set(tx, ty, pattern.get(px, py));
                }
            }
        }
    }

    #[inline]
    pub(crate) fn bytes_mut(&mut self) -> &mut [u8] {
        &mut self.bits
    }

    pub fn window(&self, left: i32, top: i32, width: i32, height: i32) -> GridWindow<'_> {
        GridWindow::new(self, left, top, width, height)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arb_grid() -> impl Strategy<Value = Grid> {
        (1..40i32, 1..40i32).prop_flat_map(|(w, h)| {
            let len = (w as usize * h as usize).div_ceil(8);
            proptest::collection::vec(any::<u8>(), len)
                .prop_map(move |bits| Grid::from_bits(w, h, bits).unwrap())
        })
    }

    #[test]
    fn rejects_non_positive_dimensions() {
        assert!(matches!(
            Grid::new(0, 4),
            Err(Error::InvalidDimension { width: 0, height: 4 })
        ));
        assert!(Grid::new(3, -1).is_err());
    }

    #[test]
    fn byte_length_rounds_up() {
        assert_eq!(Grid::new(3, 3).unwrap().bytes().len(), 2);
        assert_eq!(Grid::new(8, 2).unwrap().bytes().len(), 2);
        assert_eq!(Grid::new(1, 1).unwrap().bytes().len(), 1);
    }

    #[test]
    fn bits_are_msb_first() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_true(0, 0);
        grid.set_true(2, 2); // idx 8
        grid.set_true(1, 2); // idx 7

        assert_eq!(grid.bytes(), &[0b1000_0001, 0b1000_0000]);
        assert!(grid.get(0, 0));
        assert!(grid.get(1, 2));
        assert!(!grid.get(1, 0));
    }

    #[test]
    fn set_and_invert_single_cells() {
        let mut grid = Grid::new(5, 2).unwrap();
        grid.set(4, 1, true);
        assert!(grid.get(4, 1));
        grid.invert(4, 1);
        assert!(!grid.get(4, 1));
        grid.invert(0, 1);
        assert!(grid.get(0, 1));
        grid.set_false(0, 1);
        assert_eq!(grid.alive_count(), 0);
    }

    #[test]
    fn alternating_fills_every_byte() {
        let grid = Grid::alternating(8, 2).unwrap();

        assert!(grid.bytes().iter().all(|&b| b == 0b0101_0101));
        assert!(!grid.get(0, 0) && grid.get(1, 0));
        // byte aligned rows repeat the same phase, so no checkerboard here either
        assert!(!grid.get(0, 1) && grid.get(1, 1));
    }

    #[test]
    fn alternating_drifts_on_unaligned_rows() {
        let grid = Grid::alternating(3, 2).unwrap();

        // idx 3 is (0, 1)
        assert!(grid.get(0, 1));
        assert!(!grid.get(0, 0));
    }

    #[test]
    fn alive_count_ignores_padding() {
        let grid = Grid::new(3, 3).unwrap().invert_all();

        assert_eq!(grid.bytes()[1], 0xff);
        assert_eq!(grid.alive_count(), 9);
    }

    #[test]
    fn paste_clips_to_bounds() {
        let mut pattern = Grid::new(2, 2).unwrap();
        pattern.set_true(0, 0);
        pattern.set_true(1, 1);
        let mut grid = Grid::new(3, 3).unwrap();
        grid.paste(&pattern, 2, 2);

        assert!(grid.get(2, 2));
        assert_eq!(grid.alive_count(), 1);
    }

    #[test]
    fn json_wire_format() {
        let mut grid = Grid::new(3, 3).unwrap();
        grid.set_true(1, 1);

        assert_eq!(grid.to_json().unwrap(), "[3,3,[8,0]]");
        assert_eq!(Grid::from_json("[3,3,[8,0]]").unwrap(), grid);
    }

    #[test]
    fn json_rejects_inconsistent_data() {
        assert!(matches!(
            Grid::from_json("[3,3,[8]]"),
            Err(Error::Json(_))
        ));
        assert!(Grid::from_json("[0,3,[]]").is_err());
        assert!(Grid::from_json("[3,3,[8,256]]").is_err());
    }

    #[test]
    fn from_bits_checks_length() {
        assert!(matches!(
            Grid::from_bits(4, 4, vec![0; 3]),
            Err(Error::BitLength {
                expected: 2,
                actual: 3
            })
        ));
    }

    proptest! {
        #[test]
        fn json_round_trips(grid in arb_grid()) {
            let json = grid.to_json().unwrap();
            prop_assert_eq!(Grid::from_json(&json).unwrap(), grid);
        }

        #[test]
        fn invert_all_is_an_involution(grid in arb_grid()) {
            prop_assert_eq!(grid.invert_all().invert_all(), grid);
        }

        #[test]
        fn invert_all_flips_every_cell(grid in arb_grid()) {
            let inverted = grid.invert_all();
            for y in 0..grid.height() {
                for x in 0..grid.width() {
                    prop_assert_ne!(grid.get(x, y), inverted.get(x, y));
                }
            }
        }
    }
}
