use crate::Error as RollError;


/// Why an expression could not be parsed.
///
/// Errors raised by [`crate::Parser::parse()`] are wrapped in
/// [`ParseError::AtPosition`]; use [`ParseError::err()`] and [`ParseError::pos()`]
/// to inspect them.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    /// An error together with the character offset where it was detected.
    #[error("At position {0} - {1}")]
    AtPosition(usize, Box<ParseError>),

    /// The input is blank.
    #[error("Empty expression")]
    Empty,

    /// A character that cannot start any token.
    #[error("Invalid character: '{0}'")]
    Token(char),

    /// A word other than `d`, `adv`, `dis`, `kh`, `kl`, `dh` or `dl`.
    #[error("Unknown identifier: {0}")]
    Identifier(String),

    /// A number too large to read.
    #[error("Invalid number: {0}")]
    Number(#[from] std::num::ParseIntError),

    /// The input holds no dice clause at all.
    #[error("No valid dice found in expression")]
    NoDice,

    /// A `d` not followed by a number.
    #[error("Expected die sides after 'd', got {0}")]
    MissingSides(String),

    /// A sign not followed by a number.
    #[error("Malformed modifier: expected a number after '{0}', got {1}")]
    MalformedModifier(char, String),

    /// A modifier that does not fit in an `i32`.
    #[error("Modifier {0} is too large")]
    ModifierRange(u32),

    /// A dice clause introduced by `-`.
    #[error("Dice groups can only be added, not subtracted")]
    SubtractedGroup,

    /// A token that cannot appear where it was found.
    #[error("Unexpected {0}")]
    Unexpected(String),

    /// A clause outside the supported ranges.
    #[error("{0}")]
    Range(Box<RollError>),
}

impl ParseError {
    /// The underlying error, with any position wrapper removed.
    pub fn err(&self) -> &Self {
        match self {
            ParseError::AtPosition(_, err) => err.as_ref(),
            other => other
        }
    }

    /// Character offset at which the error was detected, if known.
    pub fn pos(&self) -> Option<&usize> {
        match self {
            ParseError::AtPosition(position, _) => Some(position),
            _ => None
        }
    }

    /// Wraps the error with a position unless it already carries one.
    pub fn at_pos(self, position: usize) -> Self {
        match self {
            ParseError::AtPosition(_, _) => self,
            other => ParseError::AtPosition(position, Box::new(other))
        }
    }
}

impl From<RollError> for ParseError {
    fn from(value: RollError) -> Self {
        ParseError::Range(Box::new(value))
    }
}

pub type Result<T> = std::result::Result<T, ParseError>;
