//! Module providing Token struct for lexing

/// Represents Tokens in a reaction rule
#[derive(Debug, PartialEq, Clone, Eq, Hash)]
pub enum Token {
    Identifier(String),
    /// `&` or `AND`
    And,
    /// `!`, `NOT`, or the `NOT_` prefix
    Not,
    /// `=>` or `->`
    Arrow,
    Eof,
}
