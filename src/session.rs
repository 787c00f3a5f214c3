//! The controller that owns the current generation and its configuration.

use crate::border::{BorderConfig, BorderPolicy, BorderResolver, Edge};
use crate::engine;
use crate::error::{Error, Result};
use crate::grid::Grid;
use crate::rule::RuleSet;
use rand::Rng;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Paused,
    Running,
}

/// A running automaton
///
/// Keeps exactly one grid. Each step replaces it with the next generation,
/// sized by the dimensions last passed to [`Simulation::resize`]. The border
/// resolver and the rule are compiled only when their configuration changes,
/// and a rejected change leaves the previous one in effect.
#[derive(Debug)]
pub struct Simulation {
    grid: Grid,
    width: i32,
    height: i32,
    resolver: BorderResolver,
    rules: RuleSet,
    state: RunState,
    generation: u64,
    parallel: bool,
}

impl Simulation {
    /// Starts paused, with `off` borders and Conway's Life
    pub fn new(grid: Grid) -> Self {
        Self {
            width: grid.width(),
            height: grid.height(),
            grid,
            resolver: BorderResolver::default(),
            rules: RuleSet::default(),
            state: RunState::default(),
            generation: 0,
            parallel: false,
        }
    }

    /// Steps on the rayon pool instead of the calling thread
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    #[inline]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }
    #[inline]
    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
    #[inline]
    pub fn borders(&self) -> BorderConfig {
        self.resolver.config()
    }
    #[inline]
    pub fn state(&self) -> RunState {
        self.state
    }
    #[inline]
    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }
    #[inline]
    pub fn population(&self) -> usize {
        self.grid.alive_count()
    }
    /// Dimensions the next generation will have
    #[inline]
    pub fn target_size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    /// Compiles and installs a new rule string
    ///
    /// On failure the current rule stays active.
    pub fn set_rule(&mut self, rule: &str) -> Result<()> {
        let rules = RuleSet::parse(rule).inspect_err(|err| {
            tracing::warn!(%err, active = %self.rules, "keeping previous rule");
        })?;
        if rules != self.rules {
            tracing::debug!(rule = %rules, "rule compiled");
            self.rules = rules;
        }
        Ok(())
    }

    /// Replaces all four edges, rebuilding the resolver only if something changed
    pub fn set_borders(&mut self, config: BorderConfig) {
        if config != self.resolver.config() {
            tracing::debug!(?config, "border resolver compiled");
            self.resolver = BorderResolver::new(config);
        }
    }

    /// Parses and installs the four edge tokens
    ///
    /// On failure the current resolver stays active.
    pub fn set_border_tokens(
        &mut self,
        top: &str,
        bottom: &str,
        left: &str,
        right: &str,
    ) -> Result<()> {
        let config = BorderConfig::from_tokens(top, bottom, left, right)
            .inspect_err(|err| self.warn_border(err))?;
        self.set_borders(config);
        Ok(())
    }

    /// Changes a single edge from its token
    pub fn set_border(&mut self, edge: Edge, token: &str) -> Result<()> {
        let policy = token
            .parse::<BorderPolicy>()
            .inspect_err(|err| self.warn_border(err))?;
        self.set_borders(self.borders().with_edge(edge, policy));
        Ok(())
    }

    fn warn_border(&self, err: &Error) {
        tracing::warn!(%err, active = ?self.resolver.config(), "keeping previous borders");
    }

    /// Sets the dimensions of the next generation
    ///
    /// The current grid is left alone, the change shows after the next step.
    pub fn resize(&mut self, width: i32, height: i32) -> Result<()> {
        if width <= 0 || height <= 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn play(&mut self) {
        self.state = RunState::Running;
    }
    pub fn pause(&mut self) {
        self.state = RunState::Paused;
    }
    pub fn toggle(&mut self) -> RunState {
        self.state = match self.state {
            RunState::Paused => RunState::Running,
            RunState::Running => RunState::Paused,
        };
        self.state
    }

    fn advance(&mut self) -> Result<()> {
        let next = if self.parallel {
            engine::step_parallel
        } else {
            engine::step
        };
        self.grid = next(&self.grid, self.width, self.height, &self.resolver, &self.rules)?;
        self.generation += 1;
        tracing::trace!(
            generation = self.generation,
            population = self.grid.alive_count(),
            "stepped"
        );
        Ok(())
    }

    /// Advances a single generation, pausing first
    pub fn step(&mut self) -> Result<&Grid> {
        self.pause();
        self.advance()?;
        Ok(&self.grid)
    }

    /// Called once per scheduling tick, advances only while running
    ///
    /// Returns whether a new generation was produced.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.is_running() {
            return Ok(false);
        }
        self.advance()?;
        Ok(true)
    }

    pub fn clear(&mut self) -> Result<()> {
        self.grid = Grid::new(self.grid.width(), self.grid.height())?;
        Ok(())
    }

    pub fn fill_alternating(&mut self) -> Result<()> {
        self.grid = Grid::alternating(self.grid.width(), self.grid.height())?;
        Ok(())
    }

    pub fn fill_random<R: Rng>(&mut self, rng: &mut R) -> Result<()> {
        self.grid = Grid::random_with(self.grid.width(), self.grid.height(), rng)?;
        Ok(())
    }

    pub fn invert_all(&mut self) {
        self.grid = self.grid.invert_all();
    }

    /// Sets a cell if it is inside the grid, returning whether it was
    pub fn paint(&mut self, x: i32, y: i32, value: bool) -> bool {
        if !self.grid.contains(x, y) {
            return false;
        }
        self.grid.set(x, y, value);
        true
    }

    /// Flips a cell if it is inside the grid, returning whether it was
    pub fn toggle_cell(&mut self, x: i32, y: i32) -> bool {
        if !self.grid.contains(x, y) {
            return false;
        }
        self.grid.invert(x, y);
        true
    }
}
