// Network snapshot: nodes, capacitated directed links and offered demands

use serde::{Deserialize, Serialize};
use std::fmt;

use super::routing_error::{Result, RoutingError};

macro_rules! dense_id {
    ($name:ident, $prefix:literal) => {
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "{}"), self.0)
            }
        }
    };
}

dense_id!(NodeId, "n");
dense_id!(LinkId, "e");
dense_id!(DemandId, "d");

#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
}

/// Directed link `origin → destination`
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    pub id: LinkId,
    pub origin: NodeId,
    pub destination: NodeId,
    pub capacity: f64,
}

/// Point-to-point traffic demand
#[derive(Debug, Clone, PartialEq)]
pub struct Demand {
    pub id: DemandId,
    pub ingress: NodeId,
    pub egress: NodeId,
    pub offered_traffic: f64,
}

/// Immutable topology and demand snapshot for one routing run.
///
/// Ids are dense indexes into the node, link and demand vectors, so the
/// canonical iteration order of every stage is id order.
#[derive(Debug, Clone, Default)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    demands: Vec<Demand>,
    outgoing: Vec<Vec<LinkId>>,
    incoming: Vec<Vec<LinkId>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, name: impl Into<String>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            id,
            name: name.into(),
        });
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        id
    }

    pub fn add_link(
        &mut self,
        origin: NodeId,
        destination: NodeId,
        capacity: f64,
    ) -> Result<LinkId> {
        self.check_node(origin)?;
        self.check_node(destination)?;
        if origin == destination {
            return Err(RoutingError::InvalidNetwork(format!(
                "self-loop link at node {}",
                self.node_name(origin)
            )));
        }
        if !capacity.is_finite() || capacity < 0.0 {
            return Err(RoutingError::InvalidNetwork(format!(
                "link {} -> {} has invalid capacity {}",
                self.node_name(origin),
                self.node_name(destination),
                capacity
            )));
        }

        let id = LinkId(self.links.len());
        self.links.push(Link {
            id,
            origin,
            destination,
            capacity,
        });
        self.outgoing[origin.index()].push(id);
        self.incoming[destination.index()].push(id);
        Ok(id)
    }

    /// Adds one link in each direction, both with `capacity`.
    pub fn add_bidirectional_link(
        &mut self,
        a: NodeId,
        b: NodeId,
        capacity: f64,
    ) -> Result<(LinkId, LinkId)> {
        let forward = self.add_link(a, b, capacity)?;
        let backward = self.add_link(b, a, capacity)?;
        Ok((forward, backward))
    }

    pub fn add_demand(
        &mut self,
        ingress: NodeId,
        egress: NodeId,
        offered_traffic: f64,
    ) -> Result<DemandId> {
        self.check_node(ingress)?;
        self.check_node(egress)?;
        if ingress == egress {
            return Err(RoutingError::InvalidNetwork(format!(
                "demand ingress and egress are both {}",
                self.node_name(ingress)
            )));
        }
        if !offered_traffic.is_finite() || offered_traffic < 0.0 {
            return Err(RoutingError::InvalidNetwork(format!(
                "demand {} -> {} has invalid offered traffic {}",
                self.node_name(ingress),
                self.node_name(egress),
                offered_traffic
            )));
        }

        let id = DemandId(self.demands.len());
        self.demands.push(Demand {
            id,
            ingress,
            egress,
            offered_traffic,
        });
        Ok(id)
    }

    /// Rejects snapshots no formulation can be built from.
    pub fn validate(&self) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(RoutingError::InvalidNetwork(
                "topology has no nodes".to_string(),
            ));
        }
        if self.links.is_empty() {
            return Err(RoutingError::InvalidNetwork(
                "topology has no links".to_string(),
            ));
        }
        if self.demands.is_empty() {
            return Err(RoutingError::InvalidNetwork(
                "no demands to route".to_string(),
            ));
        }
        Ok(())
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn demands(&self) -> &[Demand] {
        &self.demands
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_links(&self) -> usize {
        self.links.len()
    }

    pub fn num_demands(&self) -> usize {
        self.demands.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.index())
    }

    pub fn link(&self, id: LinkId) -> Option<&Link> {
        self.links.get(id.index())
    }

    pub fn demand(&self, id: DemandId) -> Option<&Demand> {
        self.demands.get(id.index())
    }

    pub fn node_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().find(|n| n.name == name).map(|n| n.id)
    }

    /// Display name of a node, or its id when unknown.
    pub fn node_name(&self, id: NodeId) -> String {
        self.node(id)
            .map(|n| n.name.clone())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn outgoing_links(&self, node: NodeId) -> &[LinkId] {
        self.outgoing
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn incoming_links(&self, node: NodeId) -> &[LinkId] {
        self.incoming
            .get(node.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Human readable `A -> B -> C` rendering of a link path.
    pub fn describe_path(&self, links: &[LinkId]) -> String {
        self.path_nodes(links).join(" -> ")
    }

    /// Names of the nodes a link path visits, origin first.
    pub fn path_nodes(&self, links: &[LinkId]) -> Vec<String> {
        let mut names = Vec::with_capacity(links.len() + 1);
        for (i, link) in links.iter().filter_map(|id| self.link(*id)).enumerate() {
            if i == 0 {
                names.push(self.node_name(link.origin));
            }
            names.push(self.node_name(link.destination));
        }
        names
    }

    fn check_node(&self, id: NodeId) -> Result<()> {
        if id.index() < self.nodes.len() {
            Ok(())
        } else {
            Err(RoutingError::InvalidNetwork(format!("unknown node {}", id)))
        }
    }
}
