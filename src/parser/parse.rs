use crate::roll::{GroupSpec, Selection, MAX_DICE};
use crate::parser::error::*;
use crate::parser::{Lexer, Token, ParsedExpression};


/// A recursive descent parser for dice notation strings.
///
/// The grammar accepts one or more `[count]d<sides>[±modifier][suffix]`
/// clauses joined by `+`, optionally followed by a single signed constant.
/// Input is case-insensitive and whitespace is ignored.
#[derive(Debug)]
pub struct Parser {
    tokens: Vec<(Token, usize)>,
    cursor: usize,
}

impl Parser {
    /// Tokenizes `input` and prepares a parser for it.
    ///
    /// # Errors
    /// - [`ParseError::Empty`] if the input is blank.
    /// - [`ParseError::NoDice`] if no `d` token appears at all.
    /// - Lexing errors, wrapped in [`ParseError::AtPosition`].
    ///
    /// # Examples
    /// ```
    /// use dicebox::{Parser, ParseError};
    ///
    /// assert!(Parser::new("1d20 + 5").is_ok());
    ///
    /// let empty = Parser::new("  ").unwrap_err();
    /// assert!(matches!(empty.err(), ParseError::Empty));
    /// ```
    pub fn new(input: &str) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let mut tokens = Vec::new();

        loop {
            let token = lexer.next_token().map_err(|err| err.at_pos(lexer.position))?;
            tokens.push((token, lexer.start));

            if token == Token::Eof {
                break;
            }
        }

        if tokens.len() == 1 {
            return Err(ParseError::Empty);
        }

        if !tokens.iter().any(|(token, _)| *token == Token::Dice) {
            return Err(ParseError::NoDice);
        }

        Ok(Self { tokens, cursor: 0 })
    }

    /// Parses the whole input into a [`ParsedExpression`].
    ///
    /// # Errors
    /// Returns a [`ParseError`] wrapped with the position of the offending token.
    /// Get the wrapped error with [`ParseError::err()`] and the position with
    /// [`ParseError::pos()`].
    ///
    /// # Examples
    /// ```
    /// use dicebox::{Parser, ParseError};
    ///
    /// let expr = Parser::new("4d6dl1+2").unwrap().parse().unwrap();
    /// assert_eq!(expr.groups().len(), 1);
    /// assert_eq!(expr.constant_modifier(), 2);
    ///
    /// let err = Parser::new("1d20+").unwrap().parse().unwrap_err();
    /// assert!(matches!(err.err(), ParseError::MalformedModifier('+', _)));
    /// assert_eq!(err.pos(), Some(&5));
    /// ```
    pub fn parse(&mut self) -> Result<ParsedExpression> {
        self.parse_expression()
            .map_err(|err| err.at_pos(self.position()))
    }

    fn current(&self) -> Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> Token {
        self.tokens
            .get(self.cursor + offset)
            .map_or(Token::Eof, |(token, _)| *token)
    }

    fn position(&self) -> usize {
        let last = self.tokens.len().saturating_sub(1);
        self.tokens.get(self.cursor.min(last)).map_or(0, |(_, position)| *position)
    }

    fn advance(&mut self) {
        if self.cursor + 1 < self.tokens.len() {
            self.cursor += 1;
        }
    }

    /// `true` if the token at `offset` opens a dice clause (`d..` or `N d..`).
    fn starts_clause(&self, offset: usize) -> bool {
        match self.peek(offset) {
            Token::Dice => true,
            Token::Number(_) => self.peek(offset + 1) == Token::Dice,
            _ => false,
        }
    }

    fn parse_expression(&mut self) -> Result<ParsedExpression> {
        let mut groups = vec![self.parse_clause()?];
        let mut constant = 0;

        loop {
            match self.current() {
                Token::Eof => break,

                Token::Plus | Token::Minus if self.starts_clause(1) => {
                    if self.current() == Token::Minus {
                        return Err(ParseError::SubtractedGroup);
                    }
                    self.advance();
                    groups.push(self.parse_clause()?);
                },

                Token::Plus | Token::Minus => {
                    constant = self.parse_signed()?;

                    let trailing = self.current();
                    if trailing != Token::Eof {
                        return Err(ParseError::Unexpected(format!("{trailing} after constant modifier")));
                    }
                    break;
                },

                other => return Err(ParseError::Unexpected(other.to_string())),
            }
        }

        Ok(ParsedExpression::new(groups, constant))
    }

    fn parse_clause(&mut self) -> Result<GroupSpec> {
        let start = self.position();

        let count = match self.current() {
            Token::Number(n) => {
                self.advance();
                n
            },
            _ => 1
        };

        match self.current() {
            Token::Dice => self.advance(),
            other => return Err(ParseError::Unexpected(other.to_string())),
        }

        let sides = match self.current() {
            Token::Number(n) => {
                self.advance();
                n
            },
            other => return Err(ParseError::MissingSides(other.to_string())),
        };

        let modifier = match self.current() {
            Token::Plus | Token::Minus if !self.starts_clause(1) => self.parse_signed()?,
            _ => 0
        };

        let selection = self.parse_selection()?;

        // range errors point at the start of the clause
        let at_clause = |err: crate::Error| ParseError::from(err).at_pos(start);

        let sides = u16::try_from(sides).map_err(|_| at_clause(crate::Error::UnsupportedDie(sides)))?;
        let count = u16::try_from(count)
            .ok()
            .filter(|count| *count <= MAX_DICE)
            .ok_or_else(|| at_clause(crate::Error::DiceCount(count)))?;

        GroupSpec::builder(sides)
            .count(count)
            .modifier(modifier)
            .selection(selection)
            .build()
            .map_err(at_clause)
    }

    fn parse_selection(&mut self) -> Result<Selection> {
        let token = self.current();

        let make: fn(u16) -> Selection = match token {
            Token::Advantage => {
                self.advance();
                return Ok(Selection::Advantage);
            },
            Token::Disadvantage => {
                self.advance();
                return Ok(Selection::Disadvantage);
            },
            Token::KeepHighest => Selection::kh,
            Token::KeepLowest => Selection::kl,
            Token::DropHighest => Selection::dh,
            Token::DropLowest => Selection::dl,
            _ => return Ok(Selection::Normal),
        };

        self.advance();

        let n = match self.current() {
            Token::Number(n) => {
                self.advance();
                u16::try_from(n).unwrap_or(u16::MAX)
            },
            _ => 1
        };

        Ok(make(n))
    }

    fn parse_signed(&mut self) -> Result<i32> {
        let sign = match self.current() {
            Token::Minus => '-',
            _ => '+',
        };
        self.advance();

        match self.current() {
            Token::Number(n) => {
                self.advance();
                let magnitude = i32::try_from(n).map_err(|_| ParseError::ModifierRange(n))?;
                Ok(if sign == '-' { -magnitude } else { magnitude })
            },
            other => Err(ParseError::MalformedModifier(sign, other.to_string())),
        }
    }
}


/// Parses a dice notation string into a [`ParsedExpression`].
///
/// This is a convenience function that creates a [`Parser`] and calls its `parse` method.
///
/// # Errors
/// Returns a [`ParseError`] describing the first problem found. Errors found
/// while parsing carry the position of the offending token.
///
/// # Examples
/// ```
/// use dicebox::{parse, ParseError, Error};
///
/// let expr = parse("2d6 + 1d8 + 3").unwrap();
/// assert_eq!(expr.dice_types(), vec!["d6", "d8"]);
///
/// let err = parse("101d6").unwrap_err();
/// assert!(matches!(err.err(), ParseError::Range(e) if **e == Error::DiceCount(101)));
/// ```
pub fn parse(input: &str) -> Result<ParsedExpression> {
    let mut parser = Parser::new(input)?;
    parser.parse()
}
