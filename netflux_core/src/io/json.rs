//! Module providing JSON IO for Models, generated ODE systems and their parameters
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::configuration::{defaults, Configuration};
use crate::logic_model::model::{Model, ModelError};
use crate::logic_model::reaction::{Reaction, ReactionBuilder, ReactionBuilderError};
use crate::logic_model::species::{Species, SpeciesBuilder, SpeciesBuilderError};
use crate::ode::system::{ModelParameters, OdeError, OdeSystem};

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
#[derive(Serialize, Deserialize)]
struct JsonModel {
    #[serde(default)]
    id: Option<String>,
    species: Vec<JsonSpecies>,
    reactions: Vec<JsonReaction>,
}

#[derive(Serialize, Deserialize)]
struct JsonSpecies {
    id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,
    #[serde(default)]
    y0: Option<f64>,
    #[serde(default)]
    ymax: Option<f64>,
    #[serde(default)]
    tau: Option<f64>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    rule: String,
    #[serde(default)]
    w: Option<f64>,
    #[serde(default)]
    n: Option<f64>,
    #[serde(default, rename = "EC50")]
    ec50: Option<f64>,
}
// endregion JSON Model

// region Conversions
impl JsonSpecies {
    /// Build the Species, taking omitted fields from `config`
    fn into_species(self, config: &Configuration) -> Result<Species, SpeciesBuilderError> {
        SpeciesBuilder::default()
            .id(self.id)
            .name(self.name)
            .y0(self.y0.unwrap_or(config.y0))
            .ymax(self.ymax.unwrap_or(config.ymax))
            .tau(self.tau.unwrap_or(config.tau))
            .build()
    }
}

impl JsonReaction {
    /// Build the Reaction, taking omitted fields from `config`
    fn into_reaction(self, config: &Configuration) -> Result<Reaction, ReactionBuilderError> {
        ReactionBuilder::default()
            .id(self.id)
            .rule(self.rule)
            .w(self.w.unwrap_or(config.w))
            .n(self.n.unwrap_or(config.n))
            .ec50(self.ec50.unwrap_or(config.ec50))
            .build()
    }
}

impl From<&Species> for JsonSpecies {
    fn from(s: &Species) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            y0: Some(s.y0),
            ymax: Some(s.ymax),
            tau: Some(s.tau),
        }
    }
}

impl From<&Reaction> for JsonReaction {
    fn from(r: &Reaction) -> Self {
        Self {
            id: r.id.clone(),
            rule: r.rule.clone(),
            w: Some(r.w),
            n: Some(r.n),
            ec50: Some(r.ec50),
        }
    }
}

impl Model {
    /// Read a model from a JSON document on disk
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        Model::from_json_str(&model_str)
    }

    /// Parse a model from a JSON document
    ///
    /// Numeric fields left out of a species or reaction take the values of one snapshot of
    /// the global configuration, see [`Model::from_json_str_with`].
    pub fn from_json_str(json: &str) -> Result<Model, JsonError> {
        Model::from_json_str_with(json, &defaults())
    }

    /// Parse a model from a JSON document, filling omitted numeric fields from `config`
    pub fn from_json_str_with(json: &str, config: &Configuration) -> Result<Model, JsonError> {
        let json_model = match serde_json::from_str::<JsonModel>(json) {
            Ok(model) => model,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        Model::from_json(json_model, config)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(&self.to_json())?)
    }

    fn from_json(json_model: JsonModel, config: &Configuration) -> Result<Self, JsonError> {
        let species = json_model
            .species
            .into_iter()
            .map(|s| s.into_species(config))
            .collect::<Result<Vec<_>, _>>()?;
        let reactions = json_model
            .reactions
            .into_iter()
            .map(|r| r.into_reaction(config))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Model::new(json_model.id, species, reactions)?)
    }

    fn to_json(&self) -> JsonModel {
        JsonModel {
            id: self.id.clone(),
            species: self.species().values().map(JsonSpecies::from).collect(),
            reactions: self.reactions().values().map(JsonReaction::from).collect(),
        }
    }
}
// endregion Conversions

// region ODE outputs
impl OdeSystem {
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, self.to_json_string()?)?;
        Ok(())
    }

    /// Read a previously written system, checking that its expressions only refer to
    /// species and reactions it declares
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<OdeSystem, JsonError> {
        let system_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        let system: OdeSystem = serde_json::from_str(&system_str)?;
        system.validate()?;
        Ok(system)
    }
}

impl ModelParameters {
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<ModelParameters, JsonError> {
        let params_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        Ok(serde_json::from_str(&params_str)?)
    }
}
// endregion ODE outputs

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build species")]
    UnableToBuildSpecies(#[from] SpeciesBuilderError),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Unable to build model")]
    UnableToBuildModel(#[from] ModelError),
    #[error("Inconsistent ODE system")]
    InvalidSystem(#[from] OdeError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}
