// In-memory network store holding one design and its committed routing

use crate::domain::{
    network::Network,
    routing::RoutingAssignment,
    routing_error::Result,
    store::NetworkStore,
};

#[derive(Debug, Clone, Default)]
pub struct InMemoryNetworkStore {
    network: Network,
    assignment: Option<RoutingAssignment>,
}

impl InMemoryNetworkStore {
    pub fn new(network: Network) -> Self {
        Self {
            network,
            assignment: None,
        }
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    /// Last committed routing, if any run succeeded.
    pub fn assignment(&self) -> Option<&RoutingAssignment> {
        self.assignment.as_ref()
    }

    pub fn into_assignment(self) -> Option<RoutingAssignment> {
        self.assignment
    }
}

impl NetworkStore for InMemoryNetworkStore {
    fn snapshot(&self) -> Result<Network> {
        Ok(self.network.clone())
    }

    fn commit(&mut self, assignment: RoutingAssignment, epsilon: f64) -> Result<()> {
        self.assignment = Some(assignment.prune(epsilon));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        network::{DemandId, LinkId},
        routing::{DemandRouting, RouteAssignment},
    };

    #[test]
    fn commit_replaces_and_prunes() {
        let mut store = InMemoryNetworkStore::default();
        assert!(store.assignment().is_none());

        let assignment = RoutingAssignment::new(vec![DemandRouting {
            demand: DemandId(0),
            offered_traffic: 1.0,
            routes: vec![
                RouteAssignment {
                    links: vec![LinkId(0)],
                    nodes: Vec::new(),
                    carried_traffic: 1.0,
                    wavelengths: vec![0],
                },
                RouteAssignment {
                    links: vec![LinkId(1)],
                    nodes: Vec::new(),
                    carried_traffic: 1e-6,
                    wavelengths: vec![3],
                },
            ],
        }]);
        store.commit(assignment, 0.001).unwrap();
        assert_eq!(store.assignment().map(|a| a.num_routes()), Some(1));

        store.commit(RoutingAssignment::default(), 0.001).unwrap();
        assert_eq!(store.into_assignment(), Some(RoutingAssignment::default()));
    }
}
