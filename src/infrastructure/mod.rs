// Infrastructure: concrete stores and scenario files

pub mod memory_store;
pub mod scenario;

pub use memory_store::InMemoryNetworkStore;
pub use scenario::{load_network, DemandSpec, LinkSpec, Scenario};
