use crate::io::rule_parse::token::Token;
use crate::io::rule_parse::{ParsedRule, ReactantSpec};

use thiserror::Error;
/*
Rule Grammar:
rule      -> reactants? ARROW product EOF ;
reactants -> reactant ( AND reactant )* ;
reactant  -> NOT? SPECIES ;
product   -> SPECIES ;

e.g. A & !B => C, A AND NOT_B -> C, => A
 */

/// Reaction rule parser
pub struct RuleParser {
    /// Vector of tokens from the rule string
    tokens: Vec<Token>,
    /// Current token being processed
    current: usize,
}

impl RuleParser {
    /// Create a new RuleParser
    pub fn new(tokens: Vec<Token>) -> RuleParser {
        RuleParser { tokens, current: 0 }
    }

    // region Parsing Functions

    /// Parse the token vector into a [`ParsedRule`]
    pub fn parse(&mut self) -> Result<ParsedRule, ParseError> {
        // The separator count is checked up front, so every later failure is about
        // the shape of one side
        match self.tokens.iter().filter(|t| **t == Token::Arrow).count() {
            0 => return Err(ParseError::MissingSeparator),
            1 => {}
            count => return Err(ParseError::MultipleSeparators(count)),
        }

        let reactants = self.reactants()?;
        self.consume(Token::Arrow, "Expect `=>` or `->` after reactants")?;
        let product = self.product()?;
        Ok(ParsedRule { reactants, product })
    }

    fn reactants(&mut self) -> Result<Vec<ReactantSpec>, ParseError> {
        let mut reactants = Vec::new();
        // Boundary reaction, no reactants
        if self.check(Token::Arrow) {
            return Ok(reactants);
        }

        reactants.push(self.reactant()?);
        while self.match_token(&[Token::And]) {
            reactants.push(self.reactant()?);
        }
        Ok(reactants)
    }

    fn reactant(&mut self) -> Result<ReactantSpec, ParseError> {
        let inhibitory = self.match_token(&[Token::Not]);
        if let Some(name) = self.match_identifier() {
            return Ok(ReactantSpec { name, inhibitory });
        }
        if inhibitory {
            return Err(ParseError::MissingToken(
                "Expect species name after negation".to_string(),
            ));
        }
        Err(ParseError::ExpectedReactant)
    }

    fn product(&mut self) -> Result<String, ParseError> {
        if self.is_at_end() {
            return Err(ParseError::MissingProduct);
        }
        if self.check(Token::Not) {
            return Err(ParseError::NegatedProduct);
        }
        let product = self
            .match_identifier()
            .ok_or(ParseError::ExpectedProduct)?;
        if !self.is_at_end() {
            let extra = self.tokens[self.current..]
                .iter()
                .filter(|t| matches!(t, Token::Identifier(_)))
                .count();
            if extra > 0 {
                return Err(ParseError::MultipleProducts(extra + 1));
            }
            return Err(ParseError::EarlyTermination);
        }
        Ok(product)
    }

    // endregion Parsing Functions

    // region parsing helper functions

    /// Check whether the token at the current position matches one of the provided `tokens`,
    /// if it does advance [`self.current`] and return true, otherwise return false
    fn match_token(&mut self, tokens: &[Token]) -> bool {
        for t in tokens {
            if self.check(t.clone()) {
                self.advance();
                return true;
            }
        }
        false
    }

    /// Similar to [`match_token`], but for matching an identifier token. If the current
    /// token is an identifier return `Some(name)`, otherwise return None
    fn match_identifier(&mut self) -> Option<String> {
        if self.is_at_end() {
            return None;
        }
        if let Token::Identifier(id) = self.peek() {
            self.advance();
            return Some(id);
        }
        None
    }

    /// Check whether the current token matches the provided `token`
    fn check(&self, token: Token) -> bool {
        if self.is_at_end() {
            return false;
        }
        self.peek() == token
    }

    /// Advance `self.current` one position unless at end, then return the previous token.
    fn advance(&mut self) -> Token {
        if !self.is_at_end() {
            self.current += 1;
        }
        self.previous()
    }

    fn is_at_end(&self) -> bool {
        self.peek() == Token::Eof
    }

    fn peek(&self) -> Token {
        self.tokens[self.current].clone()
    }

    fn previous(&self) -> Token {
        self.tokens[self.current - 1].clone()
    }

    /// Check whether the current token matches `token`, advancing if it does and
    /// returning an error otherwise.
    fn consume(&mut self, token: Token, msg: &str) -> Result<Token, ParseError> {
        if self.check(token) {
            return Ok(self.advance());
        }

        Err(ParseError::MissingToken(msg.to_string()))
    }

    // endregion parsing helper functions
}

/// Enum representing possible parse errors
#[derive(Debug, Error, PartialEq, Clone)]
pub enum ParseError {
    /// No `=>`/`->` in the rule
    #[error("Rule has no product separator (`=>` or `->`)")]
    MissingSeparator,
    /// More than one `=>`/`->` in the rule
    #[error("Rule has {0} product separators, expected exactly one")]
    MultipleSeparators(usize),
    /// Nothing after the separator
    #[error("Rule has no product")]
    MissingProduct,
    /// Several species after the separator
    #[error("Rule has {0} products, expected exactly one")]
    MultipleProducts(usize),
    /// The product carried a negation marker
    #[error("Product of a rule can not be negated")]
    NegatedProduct,
    /// Token after the separator was not a species
    #[error("Expected a species name as the product")]
    ExpectedProduct,
    /// A conjunction was not followed or preceded by a species
    #[error("Expected a reactant, check for a dangling `&`/`AND`")]
    ExpectedReactant,
    /// Missing expected token
    #[error("Missing expected token: {0}")]
    MissingToken(String),
    /// Tokens remained after the product
    #[error("Parsing terminated early, unexpected tokens after the product")]
    EarlyTermination,
}

impl ParseError {
    /// Whether the error concerns the number of products rather than the rule grammar
    pub fn is_product_count(&self) -> bool {
        matches!(
            self,
            ParseError::MissingProduct | ParseError::MultipleProducts(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::rule_parse::lexer::Lexer;

    fn parse(rule: &str) -> Result<ParsedRule, ParseError> {
        let tokens = Lexer::new(rule).lex().unwrap();
        RuleParser::new(tokens).parse()
    }

    fn reactant(name: &str, inhibitory: bool) -> ReactantSpec {
        ReactantSpec {
            name: name.to_string(),
            inhibitory,
        }
    }

    #[test]
    fn input_parse() {
        let rule = parse("=> A").unwrap();
        assert!(rule.reactants.is_empty());
        assert_eq!(rule.product, "A");
    }

    #[test]
    fn single_reactant_parse() {
        let rule = parse("A => B").unwrap();
        assert_eq!(rule.reactants, vec![reactant("A", false)]);
        assert_eq!(rule.product, "B");
    }

    #[test]
    fn and_parse() {
        let rule = parse("A & !B & C -> D").unwrap();
        assert_eq!(
            rule.reactants,
            vec![
                reactant("A", false),
                reactant("B", true),
                reactant("C", false)
            ]
        );
        assert_eq!(rule.product, "D");
    }

    #[test]
    fn separator_count() {
        assert_eq!(parse("A B"), Err(ParseError::MissingSeparator));
        assert_eq!(parse("A => B => C"), Err(ParseError::MultipleSeparators(2)));
        assert_eq!(parse("A -> B => C"), Err(ParseError::MultipleSeparators(2)));
    }

    #[test]
    fn product_count() {
        assert_eq!(parse("A =>"), Err(ParseError::MissingProduct));
        assert_eq!(parse("A => B & C"), Err(ParseError::MultipleProducts(2)));
        assert_eq!(parse("A => B C"), Err(ParseError::MultipleProducts(2)));
        assert!(parse("A =>").unwrap_err().is_product_count());
        assert!(!parse("A B").unwrap_err().is_product_count());
    }

    #[test]
    fn invalid_parse() {
        assert_eq!(parse("A => !B"), Err(ParseError::NegatedProduct));
        assert_eq!(parse("A & => B"), Err(ParseError::ExpectedReactant));
        assert_eq!(parse("& A => B"), Err(ParseError::ExpectedReactant));
        assert!(matches!(parse("! => B"), Err(ParseError::MissingToken(_))));
        assert!(matches!(parse("A B => C"), Err(ParseError::MissingToken(_))));
        assert_eq!(parse("A => &"), Err(ParseError::ExpectedProduct));
        assert_eq!(parse("A => B &"), Err(ParseError::EarlyTermination));
    }
}
