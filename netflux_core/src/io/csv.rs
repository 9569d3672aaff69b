//! Module providing CSV IO for Models, reading the species and reaction tables of a Netflux
//! spreadsheet exported one sheet per file
use std::path::Path;

use ::csv::{ReaderBuilder, StringRecord, Trim};
use log::debug;
use serde::Deserialize;
use thiserror::Error;

use crate::configuration::{defaults, Configuration};
use crate::logic_model::model::{Model, ModelError};
use crate::logic_model::reaction::{Reaction, ReactionBuilder, ReactionBuilderError};
use crate::logic_model::species::{Species, SpeciesBuilder, SpeciesBuilderError};

/// Row of the species table, headers are matched after lowercasing
#[derive(Deserialize)]
struct CsvSpecies {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default, alias = "yinit")]
    y0: Option<f64>,
    #[serde(default)]
    ymax: Option<f64>,
    #[serde(default)]
    tau: Option<f64>,
}

/// Row of the reaction table, headers are matched after lowercasing
#[derive(Deserialize)]
struct CsvReaction {
    id: String,
    rule: String,
    #[serde(default, alias = "weight")]
    w: Option<f64>,
    #[serde(default)]
    n: Option<f64>,
    #[serde(default)]
    ec50: Option<f64>,
}

impl CsvSpecies {
    /// Build the Species, taking omitted fields from `config`
    fn into_species(self, config: &Configuration) -> Result<Species, SpeciesBuilderError> {
        SpeciesBuilder::default()
            .id(self.id)
            .name(self.name.filter(|name| !name.is_empty()))
            .y0(self.y0.unwrap_or(config.y0))
            .ymax(self.ymax.unwrap_or(config.ymax))
            .tau(self.tau.unwrap_or(config.tau))
            .build()
    }
}

impl CsvReaction {
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

/// Deserialize every row of a CSV file, with its header row lowercased
fn read_rows<T, P>(path: P) -> Result<Vec<T>, CsvError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let mut reader = ReaderBuilder::new().trim(Trim::All).from_path(path)?;
    let headers: StringRecord = reader.headers()?.iter().map(str::to_lowercase).collect();
    reader.set_headers(headers);
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

impl Model {
    /// Read a model from a species table and a reaction table
    ///
    /// Headers are case-insensitive and accept the Netflux spellings (`ID`, `name`, `Yinit`,
    /// `Ymax`, `tau` for species and `ID`, `Rule`, `Weight`, `n`, `EC50` for reactions). Empty
    /// numeric cells take the values of one snapshot of the global configuration.
    pub fn read_csv<P: AsRef<Path>, Q: AsRef<Path>>(
        id: Option<String>,
        species_path: P,
        reactions_path: Q,
    ) -> Result<Model, CsvError> {
        Model::read_csv_with(id, species_path, reactions_path, &defaults())
    }

    /// Same as [`Model::read_csv`], filling empty numeric cells from `config`
    pub fn read_csv_with<P: AsRef<Path>, Q: AsRef<Path>>(
        id: Option<String>,
        species_path: P,
        reactions_path: Q,
        config: &Configuration,
    ) -> Result<Model, CsvError> {
        let species = read_rows::<CsvSpecies, _>(species_path)?
            .into_iter()
            .map(|s| s.into_species(config))
            .collect::<Result<Vec<_>, _>>()?;
        let reactions = read_rows::<CsvReaction, _>(reactions_path)?
            .into_iter()
            .map(|r| r.into_reaction(config))
            .collect::<Result<Vec<_>, _>>()?;
        debug!(
            "Read {} species and {} reactions from CSV",
            species.len(),
            reactions.len()
        );
        Ok(Model::new(id, species, reactions)?)
    }
}

#[derive(Error, Debug)]
pub enum CsvError {
    #[error("Unable to read CSV table")]
    UnableToRead(#[from] ::csv::Error),
    #[error("Unable to build species")]
    UnableToBuildSpecies(#[from] SpeciesBuilderError),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Unable to build model")]
    UnableToBuildModel(#[from] ModelError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;

    fn data_path(file: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("test_data")
            .join(file)
    }

    #[test]
    fn read_example() {
        let model = Model::read_csv(
            Some("exampleNet".to_string()),
            data_path("species.csv"),
            data_path("reactions.csv"),
        )
        .unwrap();
        let from_json = Model::read_json(data_path("example_net.json")).unwrap();
        assert_eq!(model, from_json);
    }

    #[test]
    fn lowercase_headers_and_empty_cells() {
        let dir = tempfile::tempdir().unwrap();
        let species_path = dir.path().join("species.csv");
        let reactions_path = dir.path().join("reactions.csv");
        fs::write(&species_path, "id,y0,tau\nA,,2\nB,0.5,\n").unwrap();
        fs::write(&reactions_path, "id,rule,w,ec50\nr1,=> A,,\nr2, A => B ,0.9,0.3\n").unwrap();

        let model = Model::read_csv(None, &species_path, &reactions_path).unwrap();
        let defaults = Configuration::default();
        assert!(model.id.is_none());
        assert_eq!(model.species()["A"].y0, defaults.y0);
        assert_eq!(model.species()["A"].tau, 2.);
        assert_eq!(model.species()["B"].y0, 0.5);
        assert_eq!(model.species()["B"].tau, defaults.tau);
        assert_eq!(model.species()["B"].name, None);
        let r2 = &model.reactions()["r2"];
        assert_eq!(r2.rule, "A => B");
        assert_eq!(r2.w, 0.9);
        assert_eq!(r2.n, defaults.n);
        assert_eq!(r2.ec50, 0.3);
    }

    #[test]
    fn explicit_configuration() {
        let dir = tempfile::tempdir().unwrap();
        let species_path = dir.path().join("species.csv");
        let reactions_path = dir.path().join("reactions.csv");
        fs::write(&species_path, "ID,Yinit\nA,\n").unwrap();
        fs::write(&reactions_path, "ID,Rule,n\nr1,=> A,\n").unwrap();
        let config = Configuration {
            y0: 0.25,
            n: 3.,
            ..Configuration::default()
        };
        let model = Model::read_csv_with(None, &species_path, &reactions_path, &config).unwrap();
        assert_eq!(model.species()["A"].y0, 0.25);
        assert_eq!(model.reactions()["r1"].n, 3.);
    }

    #[test]
    fn errors() {
        let dir = tempfile::tempdir().unwrap();
        let species_path = dir.path().join("species.csv");
        let reactions_path = dir.path().join("reactions.csv");
        fs::write(&species_path, "ID,Yinit\nA,zero\n").unwrap();
        fs::write(&reactions_path, "ID,Rule\nr1,=> A\n").unwrap();
        assert!(matches!(
            Model::read_csv(None, &species_path, &reactions_path),
            Err(CsvError::UnableToRead(_))
        ));

        fs::write(&species_path, "ID,tau\nA,-1\n").unwrap();
        assert!(matches!(
            Model::read_csv(None, &species_path, &reactions_path),
            Err(CsvError::UnableToBuildSpecies(_))
        ));

        fs::write(&species_path, "ID\nA\n").unwrap();
        fs::write(&reactions_path, "ID,Rule\nr1,A & => A\n").unwrap();
        assert!(matches!(
            Model::read_csv(None, &species_path, &reactions_path),
            Err(CsvError::UnableToBuildModel(ModelError::Grammar { .. }))
        ));
    }
}
