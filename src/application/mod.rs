// Application layer: path generation, model building, solution mapping and the run itself

pub mod config;
pub mod formulation;
pub mod mappers;
pub mod path_generator;
pub mod routing_service;

pub use config::{FormulationKind, ParameterInfo, RoutingConfig};
pub use formulation::{
    UnsplittableFlowFormulation, UnsplittableModel, WavelengthModel, WavelengthRoutingFormulation,
};
pub use path_generator::{hop_count, KShortestPaths, PathGenerator};
pub use routing_service::{RoutingReport, RoutingService};
