// Domain layer: optimization models, network snapshot, routing results
pub mod domain;

// Application layer: path generation, formulations, solution mapping, orchestration
pub mod application;

// Infrastructure layer: stores and scenario files
pub mod infrastructure;

// Solver adapters: Concrete implementations of SolverService
pub mod solver;

// Re-export commonly used types
pub use domain::{
    CandidateRoute, Constraint, ConstraintType, Demand, DemandId, DemandRouting, Link, LinkId,
    Network, NetworkStore, Node, NodeId, ObjectiveFunction, OptimizationProblem,
    OptimizationType, RouteAssignment, RoutingAssignment, RoutingError, Solution,
    SolutionStatus, SolverBackend, SolverError, SolverService, Variable, VariableGrid,
    VariableType,
};

pub use application::{
    FormulationKind, PathGenerator, RoutingConfig, RoutingReport, RoutingService,
    UnsplittableFlowFormulation, WavelengthRoutingFormulation,
};

pub use infrastructure::{load_network, InMemoryNetworkStore, Scenario};

pub use solver::SolverFactory;

#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
pub use solver::GoodLpSolver;

#[cfg(feature = "highs")]
pub use solver::HighsSolver;
