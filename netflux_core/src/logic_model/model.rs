//! This module provides the Model struct for representing an entire logic-based network
use std::collections::HashSet;

use indexmap::IndexMap;
use log::{debug, info};
use nalgebra::{DMatrix, DVector};
use thiserror::Error;

use crate::io::rule_parse::{parse_rule, RuleParseError};
use crate::logic_model::reaction::Reaction;
use crate::logic_model::species::Species;
use crate::ode::system::{ModelParameters, OdeParameters, OdeSystem};

/// Represents a logic-based network of species regulated by reaction rules
///
/// A Model is immutable once built, the interaction and inhibition matrices are derived from
/// the species and reaction tables exactly once in [`Model::new`].
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Id associated with the Model
    pub id: Option<String>,
    /// Map of species ids to Species, in table order
    species: IndexMap<String, Species>,
    /// Map of reaction ids to Reactions, in table order
    reactions: IndexMap<String, Reaction>,
    /// Species x reaction incidence, -1 reactant, +1 product, 0 otherwise
    interaction_matrix: DMatrix<i8>,
    /// Species x reaction flags marking inhibitory reactants
    inhibition_matrix: DMatrix<bool>,
}

impl Model {
    /// Build a Model from ordered species and reaction tables
    ///
    /// # Parameters
    /// - id: Optional identifier of the model
    /// - species: Species table, ids must be unique
    /// - reactions: Reaction table, ids must be unique
    ///
    /// # Returns
    /// The model, or the first [`ModelError`] encountered. No partial model is ever returned.
    ///
    /// # Examples
    /// ```rust
    /// use netflux_core::logic_model::model::Model;
    /// use netflux_core::logic_model::reaction::Reaction;
    /// use netflux_core::logic_model::species::SpeciesBuilder;
    /// let species = vec![
    ///     SpeciesBuilder::default().id("A").build().unwrap(),
    ///     SpeciesBuilder::default().id("B").build().unwrap(),
    /// ];
    /// let reactions = vec![
    ///     Reaction::new("r1", "=> A", 1., 1.4, 0.5).unwrap(),
    ///     Reaction::new("r2", "A => B", 1., 1.4, 0.5).unwrap(),
    /// ];
    /// let model = Model::new(Some("example".to_string()), species, reactions).unwrap();
    /// assert_eq!(model.interaction_matrix()[(0, 1)], -1);
    /// ```
    pub fn new(
        id: Option<String>,
        species: Vec<Species>,
        reactions: Vec<Reaction>,
    ) -> Result<Model, ModelError> {
        let mut species_map: IndexMap<String, Species> = IndexMap::new();
        for s in species {
            if species_map.contains_key(&s.id) {
                return Err(ModelError::DuplicateSpecies(s.id));
            }
            species_map.insert(s.id.clone(), s);
        }
        let mut reaction_map: IndexMap<String, Reaction> = IndexMap::new();
        for r in reactions {
            if reaction_map.contains_key(&r.id) {
                return Err(ModelError::DuplicateReaction(r.id));
            }
            reaction_map.insert(r.id.clone(), r);
        }

        let (interaction_matrix, inhibition_matrix) =
            build_interaction_matrices(&species_map, &reaction_map)?;
        info!(
            "built model {} with {} species and {} reactions",
            id.as_deref().unwrap_or("<unnamed>"),
            species_map.len(),
            reaction_map.len()
        );
        Ok(Model {
            id,
            species: species_map,
            reactions: reaction_map,
            interaction_matrix,
            inhibition_matrix,
        })
    }

    // region Accessors
    pub fn species(&self) -> &IndexMap<String, Species> {
        &self.species
    }

    pub fn reactions(&self) -> &IndexMap<String, Reaction> {
        &self.reactions
    }

    pub fn interaction_matrix(&self) -> &DMatrix<i8> {
        &self.interaction_matrix
    }

    pub fn inhibition_matrix(&self) -> &DMatrix<bool> {
        &self.inhibition_matrix
    }

    pub fn num_species(&self) -> usize {
        self.species.len()
    }

    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    /// Species ids in table order
    pub fn species_ids(&self) -> Vec<String> {
        self.species.keys().cloned().collect()
    }

    /// Reaction ids in table order
    pub fn reaction_ids(&self) -> Vec<String> {
        self.reactions.keys().cloned().collect()
    }

    /// Row index of a species
    pub fn species_index(&self, id: &str) -> Option<usize> {
        self.species.get_index_of(id)
    }

    /// Column index of a reaction
    pub fn reaction_index(&self, id: &str) -> Option<usize> {
        self.reactions.get_index_of(id)
    }
    // endregion Accessors

    // region Matrix Queries
    /// Columns of the reactions producing species row `species`, in increasing order
    pub fn producing_reactions(&self, species: usize) -> Vec<usize> {
        (0..self.num_reactions())
            .filter(|&j| self.interaction_matrix[(species, j)] == 1)
            .collect()
    }

    /// Rows of the reactants of reaction column `reaction`, in increasing order
    pub fn reactants(&self, reaction: usize) -> Vec<usize> {
        (0..self.num_species())
            .filter(|&i| self.interaction_matrix[(i, reaction)] == -1)
            .collect()
    }

    /// Row of the product of reaction column `reaction`
    pub fn product(&self, reaction: usize) -> Option<usize> {
        (0..self.num_species()).find(|&i| self.interaction_matrix[(i, reaction)] == 1)
    }

    /// Whether species row `species` is an inhibitory reactant of reaction column `reaction`
    pub fn is_inhibitory(&self, species: usize, reaction: usize) -> bool {
        self.inhibition_matrix[(species, reaction)]
    }
    // endregion Matrix Queries

    /// Collect the species and reaction parameters as index-aligned vectors
    ///
    /// The returned vectors may be modified freely (e.g. to switch an input on) before
    /// being passed to the right-hand side of an [`OdeSystem`].
    pub fn load_params(&self) -> ModelParameters {
        let species_param = |f: fn(&Species) -> f64| {
            DVector::from_iterator(self.num_species(), self.species.values().map(f))
        };
        let reaction_param = |f: fn(&Reaction) -> f64| {
            DVector::from_iterator(self.num_reactions(), self.reactions.values().map(f))
        };
        ModelParameters {
            species_ids: self.species_ids(),
            y0: species_param(|s: &Species| s.y0),
            ode: OdeParameters {
                ymax: species_param(|s: &Species| s.ymax),
                tau: species_param(|s: &Species| s.tau),
                w: reaction_param(|r: &Reaction| r.w),
                n: reaction_param(|r: &Reaction| r.n),
                ec50: reaction_param(|r: &Reaction| r.ec50),
            },
        }
    }

    /// Generate the system of normalized ODEs for this model
    pub fn ode_system(&self) -> OdeSystem {
        OdeSystem::generate(self)
    }
}

// region Interaction Matrices
/// Fold the reaction rules into the interaction and inhibition matrices
///
/// Row order follows `species`, column order follows `reactions`. Any rule failing to parse
/// or resolve aborts the whole build.
pub fn build_interaction_matrices(
    species: &IndexMap<String, Species>,
    reactions: &IndexMap<String, Reaction>,
) -> Result<(DMatrix<i8>, DMatrix<bool>), ModelError> {
    let mut interaction_matrix = DMatrix::from_element(species.len(), reactions.len(), 0i8);
    let mut inhibition_matrix = DMatrix::from_element(species.len(), reactions.len(), false);

    for (col, reaction) in reactions.values().enumerate() {
        let parsed = parse_rule(&reaction.rule).map_err(|err| {
            if err.is_product_count() {
                ModelError::Shape {
                    reaction_id: reaction.id.clone(),
                    rule: reaction.rule.clone(),
                    reason: err.to_string(),
                }
            } else {
                ModelError::Grammar {
                    reaction_id: reaction.id.clone(),
                    rule: reaction.rule.clone(),
                    source: err,
                }
            }
        })?;

        let resolve = |name: &str| {
            species
                .get_index_of(name)
                .ok_or_else(|| ModelError::NameResolution {
                    reaction_id: reaction.id.clone(),
                    rule: reaction.rule.clone(),
                    token: name.to_string(),
                })
        };
        let shape_error = |reason: String| ModelError::Shape {
            reaction_id: reaction.id.clone(),
            rule: reaction.rule.clone(),
            reason,
        };

        let product_row = resolve(&parsed.product)?;
        let mut seen: HashSet<usize> = HashSet::new();
        for reactant in &parsed.reactants {
            let row = resolve(&reactant.name)?;
            if row == product_row {
                return Err(shape_error(format!(
                    "species {} is both reactant and product",
                    reactant.name
                )));
            }
            if !seen.insert(row) {
                return Err(shape_error(format!(
                    "species {} is listed more than once as a reactant",
                    reactant.name
                )));
            }
            interaction_matrix[(row, col)] = -1;
            if reactant.inhibitory {
                inhibition_matrix[(row, col)] = true;
            }
        }
        interaction_matrix[(product_row, col)] = 1;
        debug!(
            "reaction {} (column {}) has product row {} and {} reactant(s)",
            reaction.id,
            col,
            product_row,
            parsed.reactants.len()
        );
    }

    Ok((interaction_matrix, inhibition_matrix))
}
// endregion Interaction Matrices

/// Errors which abort model construction
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ModelError {
    /// Rule does not split into exactly one reactant side and one product side
    #[error("Reaction {reaction_id} has an invalid rule `{rule}`: {source}")]
    Grammar {
        reaction_id: String,
        rule: String,
        source: RuleParseError,
    },
    /// Rule references a species id not present in the species table
    #[error("Reaction {reaction_id} rule `{rule}` references unknown species `{token}`")]
    NameResolution {
        reaction_id: String,
        rule: String,
        token: String,
    },
    /// Rule does not describe a single product regulated by distinct reactants
    #[error("Reaction {reaction_id} rule `{rule}` has an invalid shape: {reason}")]
    Shape {
        reaction_id: String,
        rule: String,
        reason: String,
    },
    #[error("Species id {0} appears more than once")]
    DuplicateSpecies(String),
    #[error("Reaction id {0} appears more than once")]
    DuplicateReaction(String),
}
