//! Module providing XGMML export of a Network, readable by Cytoscape
use std::fs;
use std::path::Path;

use serde::Serialize;
use thiserror::Error;

use crate::network::{EdgeKind, Network};

const XGMML_NAMESPACE: &str = "http://www.cs.rpi.edu/XGMML";

#[derive(Serialize)]
#[serde(rename = "graph")]
struct XgmmlGraph<'a> {
    #[serde(rename = "@label")]
    label: &'a str,
    #[serde(rename = "@xmlns")]
    xmlns: &'static str,
    #[serde(rename = "node")]
    nodes: Vec<XgmmlNode<'a>>,
    #[serde(rename = "edge")]
    edges: Vec<XgmmlEdge<'a>>,
}

#[derive(Serialize)]
struct XgmmlNode<'a> {
    #[serde(rename = "@id")]
    id: &'a str,
    #[serde(rename = "@label")]
    label: &'a str,
}

#[derive(Serialize)]
struct XgmmlEdge<'a> {
    #[serde(rename = "@source")]
    source: &'a str,
    #[serde(rename = "@target")]
    target: &'a str,
    #[serde(rename = "@label")]
    label: &'static str,
}

impl<'a> From<&'a Network> for XgmmlGraph<'a> {
    fn from(network: &'a Network) -> Self {
        XgmmlGraph {
            label: &network.label,
            xmlns: XGMML_NAMESPACE,
            nodes: network
                .nodes
                .iter()
                .map(|n| XgmmlNode {
                    id: &n.id,
                    label: &n.label,
                })
                .collect(),
            edges: network
                .edges
                .iter()
                .map(|e| XgmmlEdge {
                    source: &e.source,
                    target: &e.target,
                    label: match e.kind {
                        EdgeKind::Activation => "activates",
                        EdgeKind::Inhibition => "inhibits",
                    },
                })
                .collect(),
        }
    }
}

impl Network {
    /// Serialize the graph as an XGMML document
    pub fn to_xgmml(&self) -> Result<String, XgmmlError> {
        Ok(quick_xml::se::to_string(&XgmmlGraph::from(self))?)
    }

    /// Write the graph to `path` as an XGMML document
    pub fn write_xgmml<P: AsRef<Path>>(&self, path: P) -> Result<(), XgmmlError> {
        fs::write(path, self.to_xgmml()?)?;
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum XgmmlError {
    #[error("Unable to serialize network as XGMML")]
    Serialize(#[from] quick_xml::errors::serialize::SeError),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}

#[cfg(test)]
mod xgmml_tests {
    use crate::logic_model::model::Model;
    use crate::logic_model::reaction::Reaction;
    use crate::logic_model::species::SpeciesBuilder;

    fn setup_model() -> Model {
        let species = ["A", "B", "C"]
            .iter()
            .map(|id| SpeciesBuilder::default().id(*id).build().unwrap())
            .collect();
        let reactions = vec![
            Reaction::new("r1", "=> A", 1., 1.4, 0.5).unwrap(),
            Reaction::new("r2", "A => B", 1., 1.4, 0.5).unwrap(),
            Reaction::new("r3", "A & !B => C", 1., 1.4, 0.5).unwrap(),
        ];
        Model::new(Some("exampleNet".to_string()), species, reactions).unwrap()
    }

    #[test]
    fn xgmml_document() {
        let xml = setup_model().network().to_xgmml().unwrap();
        assert!(xml.starts_with("<graph"));
        assert!(xml.contains(r#"label="exampleNet""#));
        assert!(xml.contains(r#"xmlns="http://www.cs.rpi.edu/XGMML""#));
        assert_eq!(xml.matches("<node").count(), 4);
        assert_eq!(xml.matches("<edge").count(), 4);
        assert!(xml.contains(r#"id="and_2""#));
        assert_eq!(xml.matches(r#"label="inhibits""#).count(), 1);
        assert_eq!(xml.matches(r#"label="activates""#).count(), 3);
    }

    #[test]
    fn write_xgmml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exampleNet.xgmml");
        setup_model().network().write_xgmml(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains(r#"source="and_2" target="C""#));
    }
}
