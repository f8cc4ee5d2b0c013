use crate::parser::ParseError;
use crate::roll::Selection;


/// Errors raised while building dice groups, configuring the engine, or replaying rolls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The die has a number of sides outside [`crate::SUPPORTED_SIDES`].
    #[error("Invalid die type: d{0}. Supported: d4, d6, d8, d10, d12, d20, d100")]
    UnsupportedDie(u32),

    /// A group asks for zero dice or more than [`crate::MAX_DICE`].
    #[error("Invalid dice count: {0}. Must be between 1 and 100")]
    DiceCount(u32),

    /// A drop/keep count is 0 or not below the number of dice.
    #[error("Invalid selection {selection} for {count} dice: must keep or drop at least one die and fewer than are rolled")]
    SelectionCount {
        /// The rejected selection.
        selection: Selection,
        /// Number of dice in the group.
        count: u16,
    },

    /// An [`crate::EngineConfig`] value is unusable.
    #[error("Invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// [`crate::DiceEngine::replay()`] found no stored roll with the seed.
    #[error("No roll found with seed: {0}")]
    SeedNotFound(String),

    /// The expression could not be parsed.
    #[error("Parser error - {0}")]
    Parser(#[from] ParseError)
}
