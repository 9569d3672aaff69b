//! This module provides a struct for representing reactions (logic rules)
use derive_builder::Builder;

use crate::configuration::defaults;

/// A logic rule stating that one or more reactants regulate a single product
///
/// The rule text uses the grammar of [`crate::io::rule_parse`], e.g. `"A & !B => C"`.
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Reaction {
    /// Used to identify the reaction (must be unique)
    #[builder(setter(into))]
    pub id: String,
    /// Rule text
    #[builder(setter(into))]
    pub rule: String,
    /// Weight, the maximal contribution of the reaction
    #[builder(default = "defaults().w")]
    pub w: f64,
    /// Hill coefficient
    #[builder(default = "defaults().n")]
    pub n: f64,
    /// Reactant activity giving half-maximal activation, in (0, 1)
    #[builder(default = "defaults().ec50")]
    pub ec50: f64,
}

impl Reaction {
    pub fn new(
        id: &str,
        rule: &str,
        w: f64,
        n: f64,
        ec50: f64,
    ) -> Result<Reaction, ReactionBuilderError> {
        ReactionBuilder::default()
            .id(id)
            .rule(rule)
            .w(w)
            .n(n)
            .ec50(ec50)
            .build()
    }
}

impl ReactionBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref id) = self.id {
            if id.trim().is_empty() {
                return Err("reaction id must not be empty".to_string());
            }
        }
        for (field, value) in [("w", self.w), ("n", self.n), ("EC50", self.ec50)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("reaction {field} must be finite, got {v}"));
                }
            }
        }
        if let Some(w) = self.w {
            if w < 0. {
                return Err(format!("reaction w must be non-negative, got {w}"));
            }
        }
        if let Some(n) = self.n {
            if n <= 0. {
                return Err(format!("reaction n must be positive, got {n}"));
            }
        }
        if let Some(ec50) = self.ec50 {
            if ec50 <= 0. || ec50 >= 1. {
                return Err(format!("reaction EC50 must lie in (0, 1), got {ec50}"));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_applied() {
        let reaction = ReactionBuilder::default()
            .id("r1")
            .rule("A => B")
            .build()
            .unwrap();
        assert_eq!(reaction.w, 1.);
        assert_eq!(reaction.n, 1.4);
        assert_eq!(reaction.ec50, 0.5);
    }

    #[test]
    fn parameter_ranges() {
        assert!(Reaction::new("r", "A => B", 0., 1., 0.5).is_ok());
        assert!(Reaction::new("r", "A => B", -0.1, 1., 0.5).is_err());
        assert!(Reaction::new("r", "A => B", 1., 0., 0.5).is_err());
        assert!(Reaction::new("r", "A => B", 1., 1., 0.).is_err());
        assert!(Reaction::new("r", "A => B", 1., 1., 1.).is_err());
        assert!(Reaction::new("r", "A => B", 1., f64::INFINITY, 0.5).is_err());
    }
}
