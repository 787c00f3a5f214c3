use std::time::Duration;

use anyhow::{Context, Result, bail};
use celllab::{BorderConfig, BorderPolicy, Edge, Grid};
use rand::{SeedableRng, rngs::StdRng};

pub struct Args {
    matches: getopts::Matches,
}

impl Args {
    fn new<T: AsRef<str>>(args: &[T]) -> Result<Option<Self>> {
        let mut opts = getopts::Options::new();
        opts.optflag("", "help", "print this help menu");
        opts.optflag("c", "console", "run in console mode");
        opts.optflag("t", "threads", "step on all cores");
        opts.optopt("o", "output", "output file (.json or rle)", "FILE");
        opts.optopt("i", "input", "input file (.json or rle)", "FILE");
        opts.optopt("w", "width", "set grid width", "WIDTH");
        opts.optopt("h", "height", "set grid height", "HEIGHT");
        opts.optopt("f", "fill", "random, alternating or empty", "TYPE");
        opts.optopt("", "seed", "seed for the random fill", "SEED");
        opts.optopt("r", "rule", "rule string, e.g. B3/S23", "RULE");
        opts.optopt("b", "border", "policy for every edge", "POLICY");
        opts.optopt("", "top", "policy for the top edge", "POLICY");
        opts.optopt("", "bottom", "policy for the bottom edge", "POLICY");
        opts.optopt("", "left", "policy for the left edge", "POLICY");
        opts.optopt("", "right", "policy for the right edge", "POLICY");
        opts.optopt(
            "s",
            "sleep",
            "the amount of time to sleep between generations",
            "MILLIS",
        );
        opts.optopt("g", "gens", "max number of generations", "COUNT");
        opts.optopt("", "stats", "write stats csv to file", "FILE");

        let matches = opts
            .parse(args.iter().map(T::as_ref))
            .context("invalid arguments")?;
        if matches.opt_present("help") {
            let policies: Vec<_> = BorderPolicy::ALL.iter().map(|p| p.token()).collect();
            println!("{}", opts.usage("usage: celllab [options]"));
            println!("border policies: {}", policies.join(", "));
            Ok(None)
        } else {
            Ok(Some(Self { matches }))
        }
    }
    pub fn from_env() -> Result<Option<Self>> {
        let env = std::env::args().collect::<Vec<_>>();
        Self::new(&env[1..])
    }

    fn get<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>>
    where
        T::Err: std::error::Error + Send + Sync + 'static,
    {
        self.matches
            .opt_get(name)
            .with_context(|| format!("invalid value for --{name}"))
    }

    pub fn console(&self) -> bool {
        self.matches.opt_present("console")
    }
    pub fn multithreading(&self) -> bool {
        self.matches.opt_present("threads")
    }

    pub fn generations(&self) -> Result<u64> {
        // kinda hacky way of saying "infinity"
        Ok(self.get("gens")?.unwrap_or(u64::MAX))
    }
    pub fn sleep(&self) -> Result<Option<Duration>> {
        Ok(match self.get("sleep")? {
            Some(millis) => Some(Duration::from_millis(millis)),
            None if self.console() => Some(Duration::from_millis(100)),
            None => None,
        })
    }

    /// The requested grid size, `None` per axis if it was not given
    pub fn size(&self) -> Result<(Option<i32>, Option<i32>)> {
        Ok((self.get("width")?, self.get("height")?))
    }

    pub fn grid_size(&self) -> Result<(i32, i32)> {
        let default = if self.console() {
            let (cols, rows) = crossterm::terminal::size()?;
            // leave the last row to the report line
            (i32::from(cols), i32::from(rows.saturating_sub(1)).max(1))
        } else {
            (500, 500)
        };

        let (w, h) = self.size()?;
        Ok((w.unwrap_or(default.0), h.unwrap_or(default.1)))
    }
    pub fn fill_mode(&self) -> Result<FillMode> {
        let mode_str = self.matches.opt_str("fill");
        FillMode::new(mode_str.as_deref().unwrap_or("random"))
    }
    pub fn seed(&self) -> Result<Option<u64>> {
        self.get("seed")
    }

    pub fn rule(&self) -> Option<String> {
        self.matches.opt_str("rule")
    }

    /// Starts from `--border` (or all `off`) and applies the per-edge overrides
    pub fn borders(&self) -> Result<BorderConfig> {
        let mut config = match self.matches.opt_str("border") {
            Some(token) => BorderConfig::uniform(token.parse()?),
            None => BorderConfig::default(),
        };
        for (name, edge) in [
            ("top", Edge::Top),
            ("bottom", Edge::Bottom),
            ("left", Edge::Left),
            ("right", Edge::Right),
        ] {
            if let Some(token) = self.matches.opt_str(name) {
                config = config.with_edge(edge, token.parse()?);
            }
        }
        Ok(config)
    }

    pub fn output_file(&self) -> Option<String> {
        self.matches.opt_str("output")
    }
    pub fn input_file(&self) -> Option<String> {
        self.matches.opt_str("input")
    }

    pub fn stats_file(&self) -> Option<String> {
        self.matches.opt_str("stats")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillMode {
    Random,
    Alternating,
    Empty,
}
impl FillMode {
    fn new<S: AsRef<str>>(s: S) -> Result<Self> {
        match s.as_ref() {
            "random" => Ok(Self::Random),
            "alternating" => Ok(Self::Alternating),
            "empty" => Ok(Self::Empty),
            other => bail!("unknown fill mode `{other}`"),
        }
    }

    pub fn create_grid(self, w: i32, h: i32, seed: Option<u64>) -> Result<Grid> {
        let grid = match self {
            Self::Random => match seed {
                Some(seed) => Grid::random_with(w, h, &mut StdRng::seed_from_u64(seed))?,
                None => Grid::random(w, h)?,
            },
            Self::Alternating => Grid::alternating(w, h)?,
            Self::Empty => Grid::new(w, h)?,
        };
        Ok(grid)
    }
}
