// JSON scenario files: named nodes, capacitated links and demands

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::domain::{
    network::{Network, NodeId},
    routing_error::{Result, RoutingError},
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkSpec {
    pub from: String,
    pub to: String,
    pub capacity: f64,
    /// Also add the reverse link with the same capacity.
    #[serde(default)]
    pub bidirectional: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandSpec {
    pub ingress: String,
    pub egress: String,
    pub offered_traffic: f64,
}

/// Serialized form of a network design
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Scenario {
    pub nodes: Vec<String>,
    #[serde(default)]
    pub links: Vec<LinkSpec>,
    #[serde(default)]
    pub demands: Vec<DemandSpec>,
}

impl Scenario {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| RoutingError::Store(format!("invalid scenario: {}", e)))
    }

    /// Builds the network; links and demands keep their file order as ids.
    pub fn to_network(&self) -> Result<Network> {
        let mut network = Network::new();
        let mut ids: HashMap<&str, NodeId> = HashMap::with_capacity(self.nodes.len());
        for name in &self.nodes {
            if ids.insert(name.as_str(), network.add_node(name.clone())).is_some() {
                return Err(RoutingError::InvalidNetwork(format!(
                    "duplicate node '{}'",
                    name
                )));
            }
        }

        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| RoutingError::InvalidNetwork(format!("unknown node '{}'", name)))
        };

        for link in &self.links {
            let (from, to) = (lookup(&link.from)?, lookup(&link.to)?);
            if link.bidirectional {
                network.add_bidirectional_link(from, to, link.capacity)?;
            } else {
                network.add_link(from, to, link.capacity)?;
            }
        }

        for demand in &self.demands {
            network.add_demand(
                lookup(&demand.ingress)?,
                lookup(&demand.egress)?,
                demand.offered_traffic,
            )?;
        }

        Ok(network)
    }
}

/// Parses a scenario document straight into a network.
pub fn load_network(json: &str) -> Result<Network> {
    Scenario::from_json(json)?.to_network()
}
