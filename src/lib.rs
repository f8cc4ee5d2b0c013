//! Seeded, auditable dice rolling for tabletop RPG notation.
//!
//! Expressions such as `1d20+5`, `4d6dl1` or `2d6 + 1d8 + 3` are parsed into
//! dice groups, rolled from a generator bound to a seed, and recorded so that
//! any roll can be replayed later.
//!
//! ```
//! use dicebox::{DiceEngine, Selection};
//!
//! let engine = DiceEngine::default();
//! let roll = engine.execute("4d6dl1 + 2", Some("character-1"));
//!
//! let group = &roll.groups()[0];
//! assert_eq!(group.selection(), Selection::DropLowest(1));
//! assert_eq!(group.kept().len(), 3);
//! assert_eq!(roll.total(), group.total() + 2);
//!
//! let again = engine.replay("character-1").unwrap();
//! assert!(roll.same_roll(&again));
//! ```
#![warn(missing_docs)]
#![warn(clippy::missing_errors_doc)]


#[cfg(test)]
mod roll_test_strategies;

mod config;
mod engine;
mod error;
mod history;
mod parser;
mod record;
mod roll;
mod seed;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use engine::{DiceEngine, Validation};
pub use error::Error;
pub use history::{History, Statistics};
pub use parser::{ParseError, ParsedExpression, Parser, parse};
pub use record::RollExpression;
pub use roll::{
    DiceGroup, DieOutcome, DieSource,
    GroupSpec, GroupSpecBuilder, Selection,
    MAX_DICE, SUPPORTED_SIDES,
};
pub use seed::{derive_seed, resolve_seed, SeededDice, DERIVED_SEED_LEN};
