//! Bit-packed, two-state cellular automata with configurable borders and rules.

pub mod border;
pub mod enc;
pub mod engine;
pub mod error;
pub mod grid;
pub mod rule;
pub mod session;

pub use border::{BorderConfig, BorderPolicy, BorderResolver, Edge};
pub use enc::{GridCodec, JsonCodec, RunLengthEncoded};
pub use engine::{step, step_parallel};
pub use error::{Error, Result};
pub use grid::{Grid, GridWindow};
pub use rule::RuleSet;
pub use session::{RunState, Simulation};
