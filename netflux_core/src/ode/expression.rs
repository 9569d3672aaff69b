//! Synthesis of the logic expression driving each species
use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::logic_model::model::Model;
use crate::ode::logic::{activation, and_of_product, inhibition, or};
use crate::ode::system::OdeParameters;

/// Representation of the drive of one species as an expression tree
///
/// Leaves refer to species rows and reaction columns by index, the parameter values are only
/// looked up at evaluation time so the same tree serves any parameter override.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum LogicExpr {
    /// Reaction without reactants, contributes its weight
    Input { reaction: usize },
    /// Single activating reactant
    Activation { species: usize, reaction: usize },
    /// Single inhibitory reactant
    Inhibition { species: usize, reaction: usize },
    /// Several reactants of one reaction (each term is an Activation or Inhibition)
    And {
        reaction: usize,
        terms: Vec<LogicExpr>,
    },
    /// Two converging reactions
    Or {
        left: Box<LogicExpr>,
        right: Box<LogicExpr>,
    },
}

impl LogicExpr {
    /// Create a new OR node
    pub fn new_or(left: LogicExpr, right: LogicExpr) -> LogicExpr {
        LogicExpr::Or {
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Term contributed by reactant row `species` to reaction column `reaction`
    fn reactant_term(species: usize, reaction: usize, inhibitory: bool) -> LogicExpr {
        if inhibitory {
            LogicExpr::Inhibition { species, reaction }
        } else {
            LogicExpr::Activation { species, reaction }
        }
    }

    /// Evaluate the expression against the state `y`
    ///
    /// Indices are not checked here, callers make sure `y` and the reaction parameters have
    /// the lengths the expression was synthesized for.
    pub fn eval(&self, y: &[f64], params: &OdeParameters) -> f64 {
        match self {
            LogicExpr::Input { reaction } => params.w[*reaction],
            LogicExpr::Activation { species, reaction } => activation(
                y[*species],
                params.w[*reaction],
                params.n[*reaction],
                params.ec50[*reaction],
            ),
            LogicExpr::Inhibition { species, reaction } => inhibition(
                y[*species],
                params.w[*reaction],
                params.n[*reaction],
                params.ec50[*reaction],
            ),
            LogicExpr::And { reaction, terms } => {
                let product: f64 = terms.iter().map(|t| t.eval(y, params)).product();
                and_of_product(params.w[*reaction], product, terms.len())
            }
            LogicExpr::Or { left, right } => or(left.eval(y, params), right.eval(y, params)),
        }
    }

    /// Reaction columns the expression reads parameters from, in order of appearance
    pub fn reactions(&self) -> Vec<usize> {
        let mut out = Vec::new();
        self.collect_reactions(&mut out);
        out
    }

    fn collect_reactions(&self, out: &mut Vec<usize>) {
        match self {
            // Terms of an AND share its reaction
            LogicExpr::Input { reaction }
            | LogicExpr::Activation { reaction, .. }
            | LogicExpr::Inhibition { reaction, .. }
            | LogicExpr::And { reaction, .. } => out.push(*reaction),
            LogicExpr::Or { left, right } => {
                left.collect_reactions(out);
                right.collect_reactions(out);
            }
        }
    }

    /// Render the expression, naming species with `species_ids`
    ///
    /// Species indices without an entry in `species_ids` are rendered as numbers.
    pub fn to_string_ids(&self, species_ids: &[String]) -> String {
        let name = |i: &usize| {
            species_ids
                .get(*i)
                .cloned()
                .unwrap_or_else(|| i.to_string())
        };
        match self {
            LogicExpr::Input { reaction } => format!("w[{}]", reaction),
            LogicExpr::Activation { species, reaction } => format!(
                "act(y[{}],w[{r}],n[{r}],EC50[{r}])",
                name(species),
                r = reaction
            ),
            LogicExpr::Inhibition { species, reaction } => format!(
                "inhib(y[{}],w[{r}],n[{r}],EC50[{r}])",
                name(species),
                r = reaction
            ),
            LogicExpr::And { reaction, terms } => {
                let terms: Vec<String> =
                    terms.iter().map(|t| t.to_string_ids(species_ids)).collect();
                format!("AND(w[{}],[{}])", reaction, terms.join(","))
            }
            LogicExpr::Or { left, right } => format!(
                "OR({},{})",
                left.to_string_ids(species_ids),
                right.to_string_ids(species_ids)
            ),
        }
    }
}

impl Display for LogicExpr {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_ids(&[]))
    }
}

/// Build the expression driving species row `species`
///
/// Each producing reaction contributes one term: its weight when it has no reactants, a
/// single activation/inhibition for one reactant, and an AND of those otherwise. Several
/// producing reactions are combined by a left fold of OR over increasing column index,
/// `OR(OR(t0, t1), t2)`.
///
/// # Returns
/// `None` when no reaction produces the species.
pub fn synthesize(model: &Model, species: usize) -> Option<LogicExpr> {
    model
        .producing_reactions(species)
        .into_iter()
        .map(|reaction| reaction_term(model, reaction))
        .reduce(LogicExpr::new_or)
}

/// Term contributed by reaction column `reaction` to the drive of its product
fn reaction_term(model: &Model, reaction: usize) -> LogicExpr {
    let reactants = model.reactants(reaction);
    match reactants.as_slice() {
        [] => LogicExpr::Input { reaction },
        [species] => {
            LogicExpr::reactant_term(*species, reaction, model.is_inhibitory(*species, reaction))
        }
        _ => LogicExpr::And {
            reaction,
            terms: reactants
                .iter()
                .map(|&s| LogicExpr::reactant_term(s, reaction, model.is_inhibitory(s, reaction)))
                .collect(),
        },
    }
}
