//! This module provides the Species struct, representing one row of the species table
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

use crate::configuration::defaults;

/// A modeled entity with a normalized activity level
#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
pub struct Species {
    /// Used to identify the species (must be unique), and referenced by reaction rules
    #[builder(setter(into))]
    pub id: String,
    /// Human-readable species name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Initial activity
    #[builder(default = "defaults().y0")]
    pub y0: f64,
    /// Maximal activity
    #[builder(default = "defaults().ymax")]
    pub ymax: f64,
    /// Time constant, must be positive
    #[builder(default = "defaults().tau")]
    pub tau: f64,
}

impl Species {
    pub fn new(
        id: &str,
        name: Option<String>,
        y0: f64,
        ymax: f64,
        tau: f64,
    ) -> Result<Species, SpeciesBuilderError> {
        SpeciesBuilder::default()
            .id(id)
            .name(name)
            .y0(y0)
            .ymax(ymax)
            .tau(tau)
            .build()
    }

    /// Name of the species if it has one, otherwise its id
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

impl Display for Species {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl SpeciesBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref id) = self.id {
            if id.trim().is_empty() {
                return Err("species id must not be empty".to_string());
            }
        }
        for (field, value) in [("y0", self.y0), ("ymax", self.ymax), ("tau", self.tau)] {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("species {field} must be finite, got {v}"));
                }
            }
        }
        if let Some(tau) = self.tau {
            if tau <= 0. {
                return Err(format!("species tau must be positive, got {tau}"));
            }
        }
        Ok(())
    }
}
