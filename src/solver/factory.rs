use crate::domain::{
    solver_service::{Result, SolverError, SolverService},
    value_objects::SolverBackend,
};
#[cfg(any(feature = "microlp", feature = "coin_cbc"))]
use crate::solver::GoodLpSolver;
#[cfg(feature = "highs")]
use crate::solver::HighsSolver;
use std::sync::Arc;

/// Factory for creating solver instances based on configuration
pub struct SolverFactory;

impl SolverFactory {
    /// Create a solver for a specific backend
    pub fn create_from_backend(backend: SolverBackend) -> Result<Arc<dyn SolverService>> {
        match backend {
            SolverBackend::Auto => Self::default_solver(),
            #[cfg(feature = "microlp")]
            SolverBackend::MicroLp => Ok(Arc::new(GoodLpSolver::microlp())),
            #[cfg(feature = "coin_cbc")]
            SolverBackend::CoinCbc => Ok(Arc::new(GoodLpSolver::coin_cbc())),
            #[cfg(feature = "highs")]
            SolverBackend::Highs => Ok(Arc::new(HighsSolver::new())),
            #[allow(unreachable_patterns)]
            other => Err(SolverError::SolverNotAvailable(format!(
                "{} support is not compiled into this build",
                other
            ))),
        }
    }

    /// Get the default solver: HiGHS, then CBC, then microlp
    pub fn default_solver() -> Result<Arc<dyn SolverService>> {
        #[cfg(feature = "highs")]
        return Ok(Arc::new(HighsSolver::new()));

        #[cfg(all(not(feature = "highs"), feature = "coin_cbc"))]
        return Ok(Arc::new(GoodLpSolver::coin_cbc()));

        #[cfg(all(not(feature = "highs"), not(feature = "coin_cbc"), feature = "microlp"))]
        return Ok(Arc::new(GoodLpSolver::microlp()));

        #[cfg(not(any(feature = "highs", feature = "coin_cbc", feature = "microlp")))]
        Err(SolverError::SolverNotAvailable(
            "no solver backend is compiled into this build".to_string(),
        ))
    }
}
