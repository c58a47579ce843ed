// Contract of the topology/demand store a routing run reads from and writes to

use super::network::Network;
use super::routing::RoutingAssignment;
use super::routing_error::Result;

/// External holder of the network design.
///
/// A run reads one snapshot and, only after every stage succeeded, commits a
/// single assignment. Implementations drop entries carrying less than the
/// given tolerance when committing.
pub trait NetworkStore {
    /// Read-only copy of the nodes, links and demands.
    fn snapshot(&self) -> Result<Network>;

    /// Replace the stored routing with `assignment`.
    fn commit(&mut self, assignment: RoutingAssignment, epsilon: f64) -> Result<()>;
}
