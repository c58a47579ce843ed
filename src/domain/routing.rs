// Candidate routes and the routing assignment produced by a run

use serde::{Deserialize, Serialize};

use super::network::{Demand, DemandId, LinkId, Network};

/// Loopless ingress-to-egress path generated for one demand
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateRoute {
    pub demand: DemandId,
    pub links: Vec<LinkId>,
    pub cost: f64,
}

impl CandidateRoute {
    pub fn hop_count(&self) -> usize {
        self.links.len()
    }

    pub fn traverses(&self, link: LinkId) -> bool {
        self.links.contains(&link)
    }
}

/// Traffic carried over one path of a demand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteAssignment {
    pub links: Vec<LinkId>,
    /// Node names along `links`, for readers of the exported assignment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub nodes: Vec<String>,
    pub carried_traffic: f64,
    /// Wavelength indexes occupied by the route, empty for flow routing.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub wavelengths: Vec<usize>,
}

impl RouteAssignment {
    /// Route over `links` carrying `carried_traffic`, with node names taken from `network`.
    pub fn new(network: &Network, links: Vec<LinkId>, carried_traffic: f64) -> Self {
        Self {
            nodes: network.path_nodes(&links),
            links,
            carried_traffic,
            wavelengths: Vec::new(),
        }
    }

    pub fn with_wavelengths(mut self, wavelengths: Vec<usize>) -> Self {
        self.wavelengths = wavelengths;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DemandRouting {
    pub demand: DemandId,
    pub offered_traffic: f64,
    pub routes: Vec<RouteAssignment>,
}

impl DemandRouting {
    /// Entry for a demand that carries nothing.
    pub fn unrouted(demand: &Demand) -> Self {
        Self {
            demand: demand.id,
            offered_traffic: demand.offered_traffic,
            routes: Vec::new(),
        }
    }

    pub fn carried_traffic(&self) -> f64 {
        self.routes.iter().map(|r| r.carried_traffic).sum()
    }
}

/// Final output of a run: per demand, the routes and the traffic they carry.
///
/// Every demand of the network has exactly one entry, in demand id order.
/// Demands offering no traffic keep an entry with no routes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoutingAssignment {
    pub demands: Vec<DemandRouting>,
}

impl RoutingAssignment {
    pub fn new(demands: Vec<DemandRouting>) -> Self {
        Self { demands }
    }

    /// One empty entry per demand of `network`.
    pub fn unrouted(network: &Network) -> Self {
        Self::new(network.demands().iter().map(DemandRouting::unrouted).collect())
    }

    pub fn demand(&self, id: DemandId) -> Option<&DemandRouting> {
        self.demands.iter().find(|d| d.demand == id)
    }

    pub fn num_routes(&self) -> usize {
        self.demands.iter().map(|d| d.routes.len()).sum()
    }

    /// Traffic carried on each link, indexed by link id.
    pub fn link_loads(&self, num_links: usize) -> Vec<f64> {
        let mut loads = vec![0.0; num_links];
        for route in self.demands.iter().flat_map(|d| &d.routes) {
            for link in &route.links {
                if let Some(load) = loads.get_mut(link.index()) {
                    *load += route.carried_traffic;
                }
            }
        }
        loads
    }

    /// Sum of the traffic carried over all links.
    pub fn total_link_traffic(&self) -> f64 {
        self.demands
            .iter()
            .flat_map(|d| &d.routes)
            .map(|r| r.carried_traffic * r.links.len() as f64)
            .sum()
    }

    /// Drops routes carrying less than `epsilon`; demand entries stay.
    pub fn prune(mut self, epsilon: f64) -> Self {
        for demand in &mut self.demands {
            demand.routes.retain(|r| r.carried_traffic >= epsilon);
        }
        self
    }

    /// Links whose load exceeds their capacity by more than `epsilon`.
    pub fn overloaded_links(&self, network: &Network, epsilon: f64) -> Vec<LinkId> {
        self.link_loads(network.num_links())
            .iter()
            .zip(network.links())
            .filter(|(load, link)| **load > link.capacity + epsilon)
            .map(|(_, link)| link.id)
            .collect()
    }
}
