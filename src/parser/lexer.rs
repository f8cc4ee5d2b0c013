use std::fmt::Display;
use crate::parser::error::*;


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Token {
    Number(u32),
    Dice,
    Plus,
    Minus,
    Advantage,
    Disadvantage,
    KeepHighest,
    KeepLowest,
    DropHighest,
    DropLowest,
    Eof,
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Token::Number(n) => write!(f, "number {n}"),
            Token::Dice => write!(f, "'d'"),
            Token::Plus => write!(f, "'+'"),
            Token::Minus => write!(f, "'-'"),
            Token::Advantage => write!(f, "'adv'"),
            Token::Disadvantage => write!(f, "'dis'"),
            Token::KeepHighest => write!(f, "'kh'"),
            Token::KeepLowest => write!(f, "'kl'"),
            Token::DropHighest => write!(f, "'dh'"),
            Token::DropLowest => write!(f, "'dl'"),
            Token::Eof => write!(f, "end of input"),
        }
    }
}


#[derive(Debug)]
pub(crate) struct Lexer {
    input: Vec<char>,
    pub position: usize,
    /// Offset of the first character of the last token returned.
    pub start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            start: 0,
        }
    }

    pub fn next_token(&mut self) -> Result<Token> {
        self.skip_whitespace();
        self.start = self.position;

        if self.position >= self.input.len() {
            return Ok(Token::Eof);
        }

        let ch = self.input[self.position];

        match ch {
            '+' => {
                self.position += 1;
                Ok(Token::Plus)
            }
            '-' => {
                self.position += 1;
                Ok(Token::Minus)
            }
            '0'..='9' => self.read_number(),
            'a'..='z' | 'A'..='Z' => self.read_identifier(),
            _ => Err(ParseError::Token(ch))
        }
    }

    fn skip_whitespace(&mut self) {
        while self.position < self.input.len() && self.input[self.position].is_whitespace() {
            self.position += 1;
        }
    }

    fn read_number(&mut self) -> Result<Token> {
        let start = self.position;
        while self.position < self.input.len() && self.input[self.position].is_ascii_digit() {
            self.position += 1;
        }

        let number_str: String = self.input[start..self.position].iter().collect();
        let number: u32 = number_str.parse()?;

        Ok(Token::Number(number))
    }

    fn read_identifier(&mut self) -> Result<Token> {
        let start = self.position;
        while self.position < self.input.len() && self.input[self.position].is_ascii_alphabetic() {
            self.position += 1;
        }

        let identifier: String = self.input[start..self.position].iter().collect();
        match identifier.to_ascii_lowercase().as_str() {
            "d" => Ok(Token::Dice),
            "adv" => Ok(Token::Advantage),
            "dis" => Ok(Token::Disadvantage),
            "kh" => Ok(Token::KeepHighest),
            "kl" => Ok(Token::KeepLowest),
            "dh" => Ok(Token::DropHighest),
            "dl" => Ok(Token::DropLowest),
            _ => Err(ParseError::Identifier(identifier)),
        }
    }
}


#[cfg(test)]
mod test {
    use super::*;
    use proptest::prelude::*;
    use crate::parser::str_test_strategies::*;


    fn tokens(input: &str) -> Vec<Token> {
        let mut lexer = Lexer::new(input);
        std::iter::from_fn(|| {
            match lexer.next_token() {
                Ok(Token::Eof) => None,
                Ok(token) => Some(token),
                Err(_) => None,
            }
        }).collect()
    }

    proptest! {
        #[test]
        fn test_single_number_token(n in 0u32..=100_000) {
            let mut lexer = Lexer::new(&n.to_string());
            let token = lexer.next_token().unwrap();

            prop_assert_eq!(token, Token::Number(n));
            prop_assert_eq!(lexer.next_token().unwrap(), Token::Eof);
        }

        #[test]
        fn test_selection_identifiers(suffix in "(adv|dis|kh|kl|dh|dl|ADV|Dis|KH|dL)") {
            let expected = match suffix.to_ascii_lowercase().as_str() {
                "adv" => Token::Advantage,
                "dis" => Token::Disadvantage,
                "kh" => Token::KeepHighest,
                "kl" => Token::KeepLowest,
                "dh" => Token::DropHighest,
                "dl" => Token::DropLowest,
                _ => unreachable!(),
            };

            prop_assert_eq!(tokens(&suffix), vec![expected]);
        }

        #[test]
        fn test_invalid_character(
            ch in any::<char>().prop_filter("remove", |c| {
                !c.is_ascii_digit() &&
                !c.is_ascii_alphabetic() &&
                !"+-".contains(*c) &&
                !c.is_whitespace()
            })
        ) {
            let mut lexer = Lexer::new(&ch.to_string());
            let result = lexer.next_token();

            prop_assert!(matches!(result, Err(ParseError::Token(_))));
        }

        #[test]
        fn test_invalid_identifier(identifier in "[a-zA-Z]{1,6}") {
            let known = ["d", "adv", "dis", "kh", "kl", "dh", "dl"];
            if known.contains(&identifier.to_ascii_lowercase().as_str()) {
                return Ok(());
            }

            let mut lexer = Lexer::new(&identifier);
            prop_assert_eq!(lexer.next_token(), Err(ParseError::Identifier(identifier.clone())));
        }

        #[test]
        fn test_simple_dice_expression(count in 1u32..=100, sides in 1u32..=100) {
            prop_assert_eq!(tokens(&format!("{count}d{sides}")), vec![
                Token::Number(count),
                Token::Dice,
                Token::Number(sides)
            ]);
        }

        #[test]
        fn test_valid_expressions_tokenize(expr in dice_expression_strategy()) {
            let mut lexer = Lexer::new(&expr);

            loop {
                match lexer.next_token() {
                    Ok(Token::Eof) => break,
                    Ok(_) => {},
                    Err(e) => {
                        return Err(TestCaseError::Fail(format!("Tokenization error on {expr}: {e:?}").into()));
                    }
                }
            }
        }
    }

    #[test]
    fn test_token_start_skips_whitespace() {
        let mut lexer = Lexer::new("  1d20 +  5");

        assert_eq!(lexer.next_token().unwrap(), Token::Number(1));
        assert_eq!(lexer.start, 2);
        lexer.next_token().unwrap();
        lexer.next_token().unwrap();
        assert_eq!(lexer.next_token().unwrap(), Token::Plus);
        assert_eq!(lexer.start, 7);
        assert_eq!(lexer.next_token().unwrap(), Token::Number(5));
        assert_eq!(lexer.start, 10);
    }

    #[test]
    fn test_number_overflow() {
        let mut lexer = Lexer::new("99999999999");
        assert!(matches!(lexer.next_token(), Err(ParseError::Number(_))));
    }

    #[test]
    fn test_suffix_after_sides() {
        assert_eq!(tokens("4d6dl1+2"), vec![
            Token::Number(4),
            Token::Dice,
            Token::Number(6),
            Token::DropLowest,
            Token::Number(1),
            Token::Plus,
            Token::Number(2),
        ]);
    }
}
