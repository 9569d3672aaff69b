//! Lex a reaction rule string into a series of tokens for later parsing

use thiserror::Error;

use crate::io::rule_parse::token::Token;

const NOT_PREFIX: &str = "NOT_";

pub struct Lexer {
    source: Vec<char>,
    tokens: Vec<Token>,
    start: usize,
    current: usize,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        Lexer {
            source: source.chars().collect(),
            tokens: Vec::new(),
            start: 0,
            current: 0,
        }
    }

    /// Convert the source into tokens, always terminated by [`Token::Eof`]
    pub fn lex(mut self) -> Result<Vec<Token>, LexerError> {
        while !self.is_at_end() {
            self.start = self.current;
            self.scan_token()?;
        }

        self.tokens.push(Token::Eof);
        Ok(self.tokens)
    }

    fn scan_token(&mut self) -> Result<(), LexerError> {
        let c: char = self.advance();
        match c {
            '&' => self.add_token(Token::And),
            '!' => self.add_token(Token::Not),
            '=' | '-' if self.peek() == '>' => {
                self.advance();
                self.add_token(Token::Arrow);
            }
            c if c.is_whitespace() => {}
            c if c.is_control() => {
                return Err(LexerError::InvalidCharacter {
                    character: c,
                    position: self.start,
                })
            }
            _ => self.read_identifier(),
        };
        Ok(())
    }

    fn advance(&mut self) -> char {
        let char_at_current = self.source[self.current];
        self.current += 1;
        char_at_current
    }

    fn read_identifier(&mut self) {
        loop {
            let c = self.peek();
            // `=` and `-` belong to the identifier unless they start an arrow
            let continues = match c {
                '=' | '-' => self.peek_next() != '>',
                c => Lexer::is_identifier_char(c),
            };
            if !continues {
                break;
            }
            self.advance();
        }

        let text: String = self.source[self.start..self.current].iter().collect();

        match text.as_str() {
            "AND" => self.add_token(Token::And),
            "NOT" => self.add_token(Token::Not),
            prefixed if prefixed.len() > NOT_PREFIX.len() && prefixed.starts_with(NOT_PREFIX) => {
                self.add_token(Token::Not);
                self.add_token(Token::Identifier(prefixed[NOT_PREFIX.len()..].to_string()));
            }
            species => self.add_token(Token::Identifier(species.to_string())),
        }
    }

    /// Species names run until whitespace, a conjunction, a negation or an arrow
    fn is_identifier_char(c: char) -> bool {
        !(c == '&' || c == '!' || c.is_whitespace() || c.is_control())
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            return '\0';
        }
        self.source[self.current]
    }

    fn peek_next(&self) -> char {
        if self.current + 1 >= self.source.len() {
            return '\0';
        }
        self.source[self.current + 1]
    }

    fn add_token(&mut self, token: Token) {
        self.tokens.push(token);
    }

    fn is_at_end(&self) -> bool {
        self.current >= self.source.len()
    }
}

/// Enum representing possible lexing errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum LexerError {
    #[error("Unexpected character `{character}` at position {position}")]
    InvalidCharacter { character: char, position: usize },
}
