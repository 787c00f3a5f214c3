use std::time::{Duration, Instant};

/// How often a rate report becomes available
const REPORT_INTERVAL: Duration = Duration::from_millis(500);

pub trait Recorder {
    /// Called after every generation with its number and live cell count
    fn record(&mut self, generation: u64, population: usize);

    fn has_report(&self) -> bool;
    fn report(&mut self) -> String;
}

/// Tracks generations per second between reports
pub struct RateRecord {
    generation: u64,
    population: usize,
    cells: usize,
    gens_in_report: u32,
    last_report: Instant,
}
impl RateRecord {
    pub fn new(population: usize, cells: usize) -> Self {
        Self {
            generation: 0,
            population,
            cells,
            gens_in_report: 0,
            last_report: Instant::now(),
        }
    }

    fn density(&self) -> f64 {
        self.population as f64 / self.cells.max(1) as f64
    }
}
impl Recorder for RateRecord {
    fn record(&mut self, generation: u64, population: usize) {
        self.generation = generation;
        self.population = population;
        self.gens_in_report += 1;
    }

    fn has_report(&self) -> bool {
        self.last_report.elapsed() >= REPORT_INTERVAL
    }
    fn report(&mut self) -> String {
        let gens_per_sec = f64::from(self.gens_in_report) / self.last_report.elapsed().as_secs_f64();
        // reset stats for next report
        self.last_report = Instant::now();
        self.gens_in_report = 0;

        format!(
            "{:.02}gen/s gen:{} alive:{} ({:.1}%)",
            gens_per_sec,
            self.generation,
            self.population,
            self.density() * 100.0
        )
    }
}

/// A [`RateRecord`] that also keeps every generation for a CSV export
pub struct CsvRecord {
    inner: RateRecord,
    rows: Vec<(u64, u128, usize)>,
    last: Instant,
}
impl CsvRecord {
    pub fn new(population: usize, cells: usize) -> Self {
        Self {
            inner: RateRecord::new(population, cells),
            rows: Vec::new(),
            last: Instant::now(),
        }
    }

    pub fn write<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        writeln!(out, "gen,delta_us,alive")?;
        for (generation, delta, alive) in &self.rows {
            writeln!(out, "{generation},{delta},{alive}")?;
        }
        out.flush()
    }

    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        let file = std::fs::File::create(path)?;
        self.write(std::io::BufWriter::new(file))
    }
}
impl Recorder for CsvRecord {
    fn record(&mut self, generation: u64, population: usize) {
        let delta = self.last.elapsed().as_micros();
        self.last = Instant::now();

        self.rows.push((generation, delta, population));
        self.inner.record(generation, population);
    }

    fn has_report(&self) -> bool {
        self.inner.has_report()
    }
    fn report(&mut self) -> String {
        self.inner.report()
    }
}

pub enum SwitchRecorder {
    Csv(CsvRecord),
    Rate(RateRecord),
}
impl SwitchRecorder {
    pub fn new(population: usize, cells: usize, csv: bool) -> Self {
        if csv {
            Self::Csv(CsvRecord::new(population, cells))
        } else {
            Self::Rate(RateRecord::new(population, cells))
        }
    }

    /// Writes the CSV if this records one, otherwise does nothing
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> std::io::Result<()> {
        match self {
            Self::Csv(r) => r.save(path),
            Self::Rate(_) => Ok(()),
        }
    }
}
impl Recorder for SwitchRecorder {
    fn record(&mut self, generation: u64, population: usize) {
        match self {
            Self::Csv(r) => r.record(generation, population),
            Self::Rate(r) => r.record(generation, population),
        }
    }
    fn has_report(&self) -> bool {
        match self {
            Self::Csv(r) => r.has_report(),
            Self::Rate(r) => r.has_report(),
        }
    }
    fn report(&mut self) -> String {
        match self {
            Self::Csv(r) => r.report(),
            Self::Rate(r) => r.report(),
        }
    }
}
