use std::{path::Path, thread};

use anyhow::{Context, Result};
use celllab::{GridCodec, JsonCodec, RunLengthEncoded, Simulation};
use tracing_subscriber::EnvFilter;

mod console;
mod options;
mod stats;

use console::ConsoleCommand;
use stats::Recorder;

fn is_json(file_name: &str) -> bool {
    Path::new(file_name)
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

/// Builds the starting simulation from a pattern file or a fill mode
fn args_to_simulation(args: &options::Args) -> Result<Simulation> {
    let (grid, file_rule) = if let Some(file_name) = args.input_file() {
        let encoded = std::fs::read_to_string(&file_name)
            .with_context(|| format!("failed to read {file_name}"))?;
        let (pattern, rule) = if is_json(&file_name) {
            (JsonCodec.decode(&encoded)?, None)
        } else {
            (
                RunLengthEncoded::default().decode(&encoded)?,
                RunLengthEncoded::header_rule(&encoded),
            )
        };

        // place the pattern at the origin of a larger grid if one was asked for
        let grid = match args.size()? {
            (None, None) => pattern,
            (w, h) => {
                let mut grid = celllab::Grid::new(
                    w.unwrap_or(pattern.width()),
                    h.unwrap_or(pattern.height()),
                )?;
                grid.paste(&pattern, 0, 0);
                grid
            }
        };
        (grid, rule)
    } else {
        let (w, h) = args.grid_size()?;
        (args.fill_mode()?.create_grid(w, h, args.seed()?)?, None)
    };

    let mut sim = Simulation::new(grid).with_parallel(args.multithreading());
    sim.set_borders(args.borders()?);
    if let Some(rule) = args.rule().or(file_rule) {
        sim.set_rule(&rule)?;
    }
    Ok(sim)
}

fn save(sim: &Simulation, file_name: &str) -> Result<()> {
    let encoded = if is_json(file_name) {
        JsonCodec.encode(sim.grid())?
    } else {
        RunLengthEncoded::default()
            .set_name("celllab generated pattern")
            .set_rule(sim.rules().to_string())
            .encode(sim.grid())?
    };
    std::fs::write(file_name, encoded).with_context(|| format!("failed to write {file_name}"))
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();

    let Some(args) = options::Args::from_env()? else {
        return Ok(());
    };

    let mut sim = args_to_simulation(&args)?;
    tracing::info!(
        width = sim.grid().width(),
        height = sim.grid().height(),
        alive = sim.population(),
        rule = %sim.rules(),
        borders = ?sim.borders(),
        "starting"
    );

    let mut console = if args.console() {
        Some(console::ConsoleRender::new()?)
    } else {
        // nobody is there to press play
        sim.play();
        None
    };
    let sleep = args.sleep()?;
    let generations = args.generations()?;

    let cells = sim.grid().width() as usize * sim.grid().height() as usize;
    let mut stats = stats::SwitchRecorder::new(sim.population(), cells, args.stats_file().is_some());
    let mut brush = None;
    'generations: while sim.generation() < generations {
        // render the console if in console mode
        if let Some(ref mut console) = console {
            while let Some(cmd) = console.poll_events()? {
                match cmd {
                    ConsoleCommand::Exit => break 'generations,
                    ConsoleCommand::TogglePlay => {
                        sim.toggle();
                    }
                    ConsoleCommand::Step => {
                        sim.step()?;
                        stats.record(sim.generation(), sim.population());
                    }
                    ConsoleCommand::Clear => sim.clear()?,
                    ConsoleCommand::Alternating => sim.fill_alternating()?,
                    ConsoleCommand::Random => sim.fill_random(&mut rand::rng())?,
                    ConsoleCommand::Invert => sim.invert_all(),
                    // a press flips the cell and dragging paints whatever it became
                    ConsoleCommand::Toggle(x, y) => {
                        brush = sim.toggle_cell(x, y).then(|| sim.grid().get(x, y));
                    }
                    ConsoleCommand::Paint(x, y) => {
                        if let Some(value) = brush {
                            sim.paint(x, y, value);
                        }
                    }
                    ConsoleCommand::Release => brush = None,
                    ConsoleCommand::Resize(w, h) => sim.resize(w, h)?,
                    ConsoleCommand::Handled => {}
                }
            }
            console.draw(sim.grid())?;
        }

        // report metrics every 500ms
        if stats.has_report() {
            let report = stats.report();
            if let Some(ref mut console) = console {
                console.set_report(report);
            } else {
                tracing::info!("{report}");
            }
        }

        // compute the next generation
        if sim.tick()? {
            stats.record(sim.generation(), sim.population());
        }
        if let Some(time) = sleep {
            thread::sleep(time);
        }
    }
    std::mem::drop(console);
    tracing::info!(
        generation = sim.generation(),
        alive = sim.population(),
        "finished"
    );

    if let Some(file_name) = args.output_file() {
        save(&sim, &file_name)?;
    }
    if let Some(file_name) = args.stats_file() {
        stats
            .save(&file_name)
            .with_context(|| format!("failed to write {file_name}"))?;
    }

    Ok(())
}
