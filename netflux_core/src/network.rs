//! Module providing a node/edge view of a Model for visualization
//!
//! The graph is derived from the interaction and inhibition matrices only, no logic-gate
//! math is involved.
use serde::{Deserialize, Serialize};

use crate::logic_model::model::Model;

/// Graph of species and AND gates
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Network {
    /// Label of the graph, the model id if it has one
    pub label: String,
    pub nodes: Vec<NetworkNode>,
    pub edges: Vec<NetworkEdge>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NetworkEdge {
    pub source: String,
    pub target: String,
    pub kind: EdgeKind,
    /// Id of the reaction the edge belongs to
    pub reaction: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Species,
    /// Synthetic node joining the reactants of a multi-reactant reaction
    AndGate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Activation,
    Inhibition,
}

impl EdgeKind {
    fn from_inhibitory(inhibitory: bool) -> EdgeKind {
        if inhibitory {
            EdgeKind::Inhibition
        } else {
            EdgeKind::Activation
        }
    }
}

/// Id of the AND node of reaction column `reaction`
pub fn and_node_id(reaction: usize) -> String {
    format!("and_{}", reaction)
}

impl Network {
    /// Build the graph of a Model
    ///
    /// Every species becomes a node, labelled with its name when it has one. A reaction with
    /// several reactants gets an AND node: each reactant points to it and it points to the
    /// product. A single reactant points straight to the product. Edges leaving an
    /// inhibitory reactant are tagged [`EdgeKind::Inhibition`]. Input reactions add no edge.
    pub fn from_model(model: &Model) -> Network {
        let species_ids = model.species_ids();
        let mut nodes: Vec<NetworkNode> = model
            .species()
            .values()
            .map(|s| NetworkNode {
                id: s.id.clone(),
                label: s.display_name().to_string(),
                kind: NodeKind::Species,
            })
            .collect();
        let mut edges: Vec<NetworkEdge> = Vec::new();

        for (j, reaction_id) in model.reactions().keys().enumerate() {
            let Some(product) = model.product(j) else {
                continue;
            };
            let reactants = model.reactants(j);
            let edge = |source: String, target: String, kind: EdgeKind| NetworkEdge {
                source,
                target,
                kind,
                reaction: reaction_id.clone(),
            };
            match reactants.as_slice() {
                [] => {}
                [reactant] => edges.push(edge(
                    species_ids[*reactant].clone(),
                    species_ids[product].clone(),
                    EdgeKind::from_inhibitory(model.is_inhibitory(*reactant, j)),
                )),
                _ => {
                    let gate = and_node_id(j);
                    nodes.push(NetworkNode {
                        id: gate.clone(),
                        label: "AND".to_string(),
                        kind: NodeKind::AndGate,
                    });
                    for &reactant in &reactants {
                        edges.push(edge(
                            species_ids[reactant].clone(),
                            gate.clone(),
                            EdgeKind::from_inhibitory(model.is_inhibitory(reactant, j)),
                        ));
                    }
                    edges.push(edge(
                        gate,
                        species_ids[product].clone(),
                        EdgeKind::Activation,
                    ));
                }
            }
        }

        Network {
            label: model.id.clone().unwrap_or_else(|| "network".to_string()),
            nodes,
            edges,
        }
    }

    /// Serialize the graph as JSON
    pub fn to_json_string(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl Model {
    /// Node/edge graph of the model, see [`Network::from_model`]
    pub fn network(&self) -> Network {
        Network::from_model(self)
    }
}
