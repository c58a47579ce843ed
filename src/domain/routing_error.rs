// Failures of a routing run. Every variant is terminal for the run.

use super::models::ModelError;
use super::network::{DemandId, LinkId};
use super::solver_service::SolverError;
use super::value_objects::SolutionStatus;

#[derive(Debug, thiserror::Error)]
pub enum RoutingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid network: {0}")]
    InvalidNetwork(String),

    #[error("There are no admissible routes for demand {demand} ({ingress} -> {egress})")]
    NoAdmissiblePath {
        demand: DemandId,
        ingress: String,
        egress: String,
    },

    #[error("An optimal solution was not found: solver reported {status} ({message})")]
    InfeasibleOrSuboptimal {
        status: SolutionStatus,
        message: String,
    },

    #[error("Malformed solution for demand {demand}: {reason}")]
    MalformedSolution { demand: DemandId, reason: String },

    #[error("Invalid model: {0}")]
    InvalidModel(#[from] ModelError),

    #[error("Solver failure: {0}")]
    Solver(#[from] SolverError),

    #[error("Store error: {0}")]
    Store(String),
}

impl RoutingError {
    pub(crate) fn malformed(demand: DemandId, reason: impl Into<String>) -> Self {
        RoutingError::MalformedSolution {
            demand,
            reason: reason.into(),
        }
    }

    pub(crate) fn unknown_link(link: LinkId) -> Self {
        RoutingError::InvalidNetwork(format!("unknown link {}", link))
    }
}

pub type Result<T> = std::result::Result<T, RoutingError>;
