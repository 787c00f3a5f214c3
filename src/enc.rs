use crate::error::{Error, Result};
use crate::grid::Grid;
use regex::Regex;
use std::sync::OnceLock;

pub trait GridCodec {
    fn encode(&self, grid: &Grid) -> Result<String>;
    fn decode(&self, value: &str) -> Result<Grid>;
}

/// The `[width, height, [bytes...]]` wire format
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonCodec;

impl GridCodec for JsonCodec {
    fn encode(&self, grid: &Grid) -> Result<String> {
        grid.to_json()
    }

    fn decode(&self, value: &str) -> Result<Grid> {
        Grid::from_json(value)
    }
}

struct RunEncoder {
    sequence: String,
    line_len: usize,
    max_line_len: usize,
}
impl RunEncoder {
    fn new(max_line_len: usize) -> Self {
        Self {
            sequence: String::new(),
            line_len: 0,
            max_line_len,
        }
    }

    fn push_run(&mut self, run: i32, c: char) {
        let append = match run {
            0 => String::new(),
            1 => c.to_string(),
            n => format!("{}{}", n, c),
        };
        if self.line_len + append.len() > self.max_line_len {
            self.sequence.push('\n');
            self.line_len = 0;
        }
        self.line_len += append.len();
        self.sequence.push_str(&append);
    }

    pub fn end(mut self) -> String {
        if self.line_len + 1 > self.max_line_len {
            self.sequence.push('\n');
        }
        self.sequence.push('!');
        self.sequence
    }
}

fn header_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| {
        Regex::new(r"^\s*x\s*=\s*(\d+)\s*,\s*y\s*=\s*(\d+)(?:\s*,\s*rule\s*=\s*(\S+))?")
            .expect("valid header regex")
    })
}

fn run_regex() -> &'static Regex {
    static CELL: OnceLock<Regex> = OnceLock::new();
    CELL.get_or_init(|| Regex::new(r"(\d*)([bo$!])").expect("valid run regex"))
}

/// Life RLE, as read and written by Golly and most pattern collections
///
/// Cells are anchored at the grid origin, so a decoded pattern has the size from
/// its `x = .., y = ..` header (or its extent when the header is missing).
pub struct RunLengthEncoded {
    name: Option<String>,
    rule: Option<String>,
    header: bool,
}
impl RunLengthEncoded {
    pub fn set_name<T: AsRef<str>>(mut self, name: T) -> Self {
        self.name = Some(name.as_ref().to_owned());
        self
    }
    pub fn set_rule<T: AsRef<str>>(mut self, rule: T) -> Self {
        self.rule = Some(rule.as_ref().to_owned());
        self
    }
    pub fn without_header(mut self) -> Self {
        self.header = false;
        self
    }

    /// The `rule = ..` entry of a pattern's header, if it has one
    pub fn header_rule(value: &str) -> Option<String> {
        value
            .lines()
            .find_map(|line| header_regex().captures(line))
            .and_then(|caps| caps.get(3))
            .map(|rule| rule.as_str().to_owned())
    }

    fn encode_header(&self, grid: &Grid) -> String {
        let mut header = String::new();
        if !self.header {
            return header;
        }
        if let Some(name) = &self.name {
            header.push_str(&format!("#N {}\n", name));
        }
        header.push_str(&format!("x = {}, y = {}", grid.width(), grid.height()));
        if let Some(rule) = &self.rule {
            header.push_str(&format!(", rule = {}", rule));
        }
        header.push('\n');
        header
    }
    fn encode_cells(&self, grid: &Grid) -> String {
        let mut last = (-1, 0);
        let mut alive_run = 0;
        let mut seq = RunEncoder::new(70);
        for (x, y) in grid.window(0, 0, grid.width(), grid.height()).iter() {
            // if we're one ahead of the last, then only increment the run
            if last.1 == y && last.0 + 1 == x {
                alive_run += 1;
                last = (x, y);
                continue;
            }

            let lines_run = y - last.1;
            let dead_run = match lines_run {
                0 => x - last.0 - 1,
                _ => x,
            };
            // NOTE: order matters!
            seq.push_run(alive_run, 'o');
            seq.push_run(lines_run, '$');
            seq.push_run(dead_run, 'b');

            alive_run = 1;
            last = (x, y);
        }

        seq.push_run(alive_run, 'o');
        seq.end()
    }
}
impl Default for RunLengthEncoded {
    fn default() -> Self {
        Self {
            name: None,
            rule: None,
            header: true,
        }
    }
}

/// Moves an RLE cursor `run` cells along, failing instead of overflowing
fn advance(at: i32, run: i32) -> Result<i32> {
    at.checked_add(run)
        .ok_or_else(|| Error::Pattern("pattern too large".to_owned()))
}

fn outside(right: i32, bottom: i32, width: i32, height: i32) -> Error {
    Error::Pattern(format!(
        "cells reach {right}x{bottom}, beyond the {width}x{height} header"
    ))
}

impl GridCodec for RunLengthEncoded {
    fn encode(&self, grid: &Grid) -> Result<String> {
        Ok(format!(
            "{}{}\n",
            self.encode_header(grid),
            self.encode_cells(grid)
        ))
    }

    fn decode(&self, value: &str) -> Result<Grid> {
        let mut size = None;
        // live runs as (y, first x, one past the last x)
        let mut runs = Vec::new();
        let mut cursor = (0, 0);
        'lines_loop: for line in value.lines() {
            if line.trim_start().starts_with('#') {
                continue;
            }
            if let Some(caps) = header_regex().captures(line) {
                let dim = |i: usize| {
                    caps[i]
                        .parse::<i32>()
                        .map_err(|_| Error::Pattern(format!("header size `{}` too large", &caps[i])))
                };
                size = Some((dim(1)?, dim(2)?));
                continue;
            }

            for (_, [run_str, state]) in run_regex().captures_iter(line).map(|x| x.extract()) {
                let run = match run_str {
                    "" => 1,
                    s => s
                        .parse::<i32>()
                        .map_err(|_| Error::Pattern(format!("run length `{s}` too large")))?,
                };
                match state {
                    "!" => break 'lines_loop,
                    "o" => {
                        let end = advance(cursor.0, run)?;
                        if end > cursor.0 {
                            runs.push((cursor.1, cursor.0, end));
                        }
                        cursor.0 = end;
                    }
                    "b" => cursor.0 = advance(cursor.0, run)?,
                    "$" => {
                        cursor.0 = 0;
                        cursor.1 = advance(cursor.1, run)?;
                    }
                    _ => unreachable!(),
                }
            }
        }

        let extent = runs
            .iter()
            .try_fold((0, 0), |(w, h), &(y, _, end)| {
                Ok::<_, Error>((w.max(end), h.max(advance(y, 1)?)))
            })?;
        let (width, height) = size.unwrap_or(extent);
        if extent.0 > width || extent.1 > height {
            return Err(outside(extent.0, extent.1, width, height));
        }

        let mut grid = Grid::new(width, height)?;
        for (y, start, end) in runs {
            for x in start..end {
                grid.set_true(x, y);
            }
        }
        Ok(grid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GLIDER: &str = "#N Glider\nx = 3, y = 3, rule = B3/S23\nbo$2bo$3o!\n";

    #[test]
    fn decodes_glider() {
        let grid = RunLengthEncoded::default().decode(GLIDER).unwrap();
        let cells: Vec<_> = grid.window(0, 0, 3, 3).iter().collect();

        assert_eq!((grid.width(), grid.height()), (3, 3));
        assert_eq!(cells, vec![(1, 0), (2, 1), (0, 2), (1, 2), (2, 2)]);
    }

    #[test]
    fn encodes_glider() {
        let grid = RunLengthEncoded::default().decode(GLIDER).unwrap();
        let encoded = RunLengthEncoded::default()
            .set_name("Glider")
            .set_rule("B3/S23")
            .encode(&grid)
            .unwrap();

        assert_eq!(encoded, GLIDER);
    }

    #[test]
    fn reads_header_rule() {
        assert_eq!(
            RunLengthEncoded::header_rule(GLIDER).as_deref(),
            Some("B3/S23")
        );
        assert_eq!(RunLengthEncoded::header_rule("x = 1, y = 1\no!"), None);
    }

    #[test]
    fn keeps_leading_blank_rows_and_columns() {
        let mut grid = Grid::new(6, 4).unwrap();
        grid.set_true(4, 2);
        grid.set_true(5, 2);
        let codec = RunLengthEncoded::default();
        let encoded = codec.encode(&grid).unwrap();

        assert_eq!(encoded, "x = 6, y = 4\n2$4b2o!\n");
        assert_eq!(codec.decode(&encoded).unwrap(), grid);
    }

    #[test]
    fn size_from_extent_without_header() {
        let grid = RunLengthEncoded::default().decode("3o$\n$o!").unwrap();

        assert_eq!((grid.width(), grid.height()), (3, 3));
        assert_eq!(grid.alive_count(), 4);
    }

    #[test]
    fn wraps_long_lines() {
        let mut grid = Grid::new(200, 1).unwrap();
        for x in (1..200).step_by(2) {
            grid.set_true(x, 0);
        }
        let encoded = RunLengthEncoded::default()
            .without_header()
            .encode(&grid)
            .unwrap();

        assert!(encoded.lines().all(|line| line.len() <= 70));
        assert_eq!(RunLengthEncoded::default().decode(&encoded).unwrap(), grid);
    }

    #[test]
    fn rejects_cells_outside_header() {
        assert!(matches!(
            RunLengthEncoded::default().decode("x = 2, y = 1\n3o!"),
            Err(Error::Pattern(_))
        ));
        assert!(matches!(
            RunLengthEncoded::default().decode("!"),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn huge_runs_are_errors() {
        let codec = RunLengthEncoded::default();
        for pattern in [
            "x = 4, y = 4\n2147483647bo!",
            "2147483647$o!",
            "2147483647b2147483647b!",
            "x = 4, y = 4\n2000000000o!",
        ] {
            assert!(
                matches!(codec.decode(pattern), Err(Error::Pattern(_))),
                "{pattern}"
            );
        }
    }

    #[test]
    fn json_codec_uses_wire_format() {
        let grid = RunLengthEncoded::default().decode(GLIDER).unwrap();
        let json = JsonCodec.encode(&grid).unwrap();

        assert_eq!(json, "[3,3,[71,128]]");
        assert_eq!(JsonCodec.decode(&json).unwrap(), grid);
    }
}
