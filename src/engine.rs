use crate::{BorderResolver, Grid, Result, RuleSet};
use rayon::prelude::*;

/// Offsets of a 3x3 neighbourhood, row by row, so `(0, 0)` lands on bit 4
/// which is [`crate::rule::CENTER`]
const NEIGHBORHOOD: [(i32, i32); 9] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (0, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

#[inline]
fn next_cell_state(old: &Grid, x: i32, y: i32, resolver: &BorderResolver, rules: &RuleSet) -> bool {
    // combine the cell and its neighbors into a 9-bit index
    let mut neighborhood = 0;
    for (i, &(dx, dy)) in NEIGHBORHOOD.iter().enumerate() {
        neighborhood |= usize::from(resolver.resolve(old, x + dx, y + dy)) << i;
    }
    rules.next_state(neighborhood)
}

/// Computes the output bytes `first_byte..first_byte + out.len()` of a grid that
/// is `width` cells wide and `cells` cells large
///
/// `out` must be zeroed, only live cells are written.
fn fill_bytes(
    old: &Grid,
    width: i32,
    cells: usize,
    first_byte: usize,
    out: &mut [u8],
    resolver: &BorderResolver,
    rules: &RuleSet,
) {
    let width = width as usize;
    for (i, byte) in out.iter_mut().enumerate() {
        let base = (first_byte + i) * 8;
        for bit in 0..8 {
            let idx = base + bit;
            if idx >= cells {
                return;
            }
            let (x, y) = ((idx % width) as i32, (idx / width) as i32);
            if next_cell_state(old, x, y, resolver, rules) {
                *byte |= 0x80 >> bit;
            }
        }
    }
}

/// Derives the next generation of `old` as a new `new_width` x `new_height` grid
///
/// The new grid shares its origin with `old`. Every read, including the cell's
/// own state, goes through `resolver`, so cells outside of `old` (when growing,
/// or the neighbours of edge cells) follow the border policy.
pub fn step(
    old: &Grid,
    new_width: i32,
    new_height: i32,
    resolver: &BorderResolver,
    rules: &RuleSet,
) -> Result<Grid> {
    let mut next = Grid::new(new_width, new_height)?;
    let cells = new_width as usize * new_height as usize;
    fill_bytes(old, new_width, cells, 0, next.bytes_mut(), resolver, rules);
    Ok(next)
}

/// Same as [`step`], but splits the output bytes across the rayon thread pool
///
/// Each task owns a disjoint run of bytes, so the result is identical to [`step`].
pub fn step_parallel(
    old: &Grid,
    new_width: i32,
    new_height: i32,
    resolver: &BorderResolver,
    rules: &RuleSet,
) -> Result<Grid> {
    let mut next = Grid::new(new_width, new_height)?;
    let cells = new_width as usize * new_height as usize;
    let bytes = next.bytes_mut();
    // a few chunks per thread so uneven rows still balance out
    let chunk = bytes
        .len()
        .div_ceil(rayon::current_num_threads() * 4)
        .max(1);

    bytes
        .par_chunks_mut(chunk)
        .enumerate()
        .for_each(|(i, out)| fill_bytes(old, new_width, cells, i * chunk, out, resolver, rules));
    Ok(next)
}
