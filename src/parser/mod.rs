mod error;
mod lexer;
mod expr;
mod parse;

#[cfg(test)]
pub(crate) mod str_test_strategies;

pub use error::ParseError;
pub(crate) use lexer::{Lexer, Token};
pub use expr::ParsedExpression;
pub use parse::{Parser, parse};
