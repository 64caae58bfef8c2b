//! Macro engine: ordered multi-step automation with stop-on-first-error
//! semantics.
//!
//! A run is `Idle -> Running -> {Completed, Failed}`.  There is no pause or
//! cancellation.  Steps run strictly in order with a fixed settle delay
//! between them; the first failing step ends the run.

mod command;
mod engine;
pub mod naming;

pub use command::{parse_commands, MacroCommand};
pub use engine::{MacroEngine, MacroResult};
