//! Default values used when species or reaction records omit a parameter
//!
//! Builders and the table readers take a snapshot of [`CONFIGURATION`] when they fill in a
//! missing field. Changing it only affects records built afterwards, so set it before loading
//! any model, or pass an explicit [`Configuration`] to `Model::from_json_str_with` or
//! `Model::read_csv_with` instead.
use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

/// Default species and reaction parameters
#[derive(Clone, Debug, PartialEq)]
pub struct Configuration {
    /// Initial activity of a species
    pub y0: f64,
    /// Maximal activity of a species
    pub ymax: f64,
    /// Time constant of a species
    pub tau: f64,
    /// Reaction weight
    pub w: f64,
    /// Reaction Hill coefficient
    pub n: f64,
    /// Reaction half-maximal activation constant
    pub ec50: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            y0: 0.,
            ymax: 1.,
            tau: 1.,
            w: 1.,
            n: 1.4,
            ec50: 0.5,
        }
    }
}

/// Get a copy of the current configuration
///
/// Falls back to [`Configuration::default`] if the lock has been poisoned.
pub fn defaults() -> Configuration {
    CONFIGURATION
        .read()
        .map(|c| c.clone())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn netflux_defaults() {
        let config = defaults();
        assert_eq!(config, Configuration::default());
        assert_eq!(config.n, 1.4);
        assert_eq!(config.ec50, 0.5);
        // Default Hill parameters are not hazardous
        assert!(config.ec50.powf(config.n) < 0.5);
    }
}
