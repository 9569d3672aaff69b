//! Module for parsing reaction rule strings into reactant and product species names

use crate::io::rule_parse::lexer::LexerError;
use crate::io::rule_parse::parser::ParseError;
use log::debug;
use thiserror::Error;

pub mod lexer;
pub mod parser;
pub mod token;

/// A reactant as written in a rule
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReactantSpec {
    /// Species name with any negation marker stripped
    pub name: String,
    /// Whether the reactant carried a negation marker (`!`, `NOT_`, `NOT `)
    pub inhibitory: bool,
}

/// Reactants and product of a single rule, in the order they were written
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedRule {
    pub reactants: Vec<ReactantSpec>,
    pub product: String,
}

/// Parse a reaction rule into its reactants and product
///
/// # Parameters
/// - `input`: &str representing the rule, e.g. `"A & !B => C"`
///
/// # Returns
/// Parse result which is
/// - `Ok`: The [`ParsedRule`], names are not yet resolved against any species table
/// - `Err`: The RuleParseError describing the issue with the rule which was being parsed
///
/// # Examples
/// ```rust
/// use netflux_core::io::rule_parse::parse_rule;
/// let rule = parse_rule("A AND NOT B -> C").unwrap();
/// assert_eq!(rule.product, "C");
/// assert!(rule.reactants[1].inhibitory);
/// ```
pub fn parse_rule(input: &str) -> Result<ParsedRule, RuleParseError> {
    let tokens = lexer::Lexer::new(input).lex()?;
    let mut parser = parser::RuleParser::new(tokens);
    let rule = parser.parse()?;
    debug!(
        "parsed rule `{}` into {} reactant(s) and product {}",
        input,
        rule.reactants.len(),
        rule.product
    );
    Ok(rule)
}

/// Enum representing possible lex and parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum RuleParseError {
    /// Lexing Error
    #[error("Error occurred during lexing of the rule: {0}")]
    LexingError(#[from] LexerError),
    /// Parsing Error
    #[error("Error occurred during parsing of the rule: {0}")]
    ParsingError(#[from] ParseError),
}

impl RuleParseError {
    /// Whether the rule failed because it has zero or several products
    pub fn is_product_count(&self) -> bool {
        match self {
            RuleParseError::ParsingError(err) => err.is_product_count(),
            RuleParseError::LexingError(_) => false,
        }
    }
}
