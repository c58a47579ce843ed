// Domain module: optimization models, network snapshot and routing results

pub mod models;
pub mod network;
pub mod routing;
pub mod routing_error;
pub mod solver_service;
pub mod store;
pub mod value_objects;

pub use models::*;
pub use network::*;
pub use routing::*;
pub use routing_error::RoutingError;
pub use solver_service::*;
pub use store::*;
pub use value_objects::*;
