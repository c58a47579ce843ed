// Orchestrates one routing run: paths -> model -> solver -> assignment

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use super::config::{FormulationKind, RoutingConfig};
use super::formulation::{UnsplittableFlowFormulation, WavelengthRoutingFormulation};
use super::mappers;
use super::path_generator::PathGenerator;
use crate::domain::{
    models::{OptimizationProblem, Solution},
    network::Network,
    routing::RoutingAssignment,
    routing_error::{Result, RoutingError},
    solver_service::{SolverError, SolverService},
    store::NetworkStore,
};
use crate::solver::SolverFactory;

/// Outcome of a successful run
#[derive(Debug, Clone)]
pub struct RoutingReport {
    pub formulation: FormulationKind,
    /// Optimal objective: link-wavelengths used, or traffic-weighted link usage.
    pub objective_value: f64,
    /// Traffic summed over all links, reported for flow routing.
    pub total_carried_traffic: Option<f64>,
    pub assignment: RoutingAssignment,
    pub solver: String,
}

impl RoutingReport {
    pub fn summary(&self) -> String {
        match (self.formulation, self.total_carried_traffic) {
            (FormulationKind::Unsplittable, Some(total)) => {
                format!("Total carried traffic in the links: {}", total)
            }
            _ => format!(
                "Ok! Total number of wavelengths used in the links: {}",
                self.objective_value
            ),
        }
    }
}

impl fmt::Display for RoutingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}

/// Stateless routing pipeline bound to one solver and one configuration
pub struct RoutingService {
    solver: Arc<dyn SolverService>,
    config: RoutingConfig,
}

impl RoutingService {
    pub fn new(solver: Arc<dyn SolverService>, config: RoutingConfig) -> Self {
        Self { solver, config }
    }

    /// Picks the solver named by the configuration.
    pub fn from_config(config: RoutingConfig) -> Result<Self> {
        config.validate()?;
        let solver = SolverFactory::create_from_backend(config.solver.backend)?;
        Ok(Self::new(solver, config))
    }

    pub fn config(&self) -> &RoutingConfig {
        &self.config
    }

    pub fn solver_name(&self) -> &str {
        self.solver.name()
    }

    /// Reads a snapshot from `store`, routes it and commits the assignment.
    /// Nothing is written unless every stage succeeds.
    pub fn run(&self, store: &mut dyn NetworkStore) -> Result<RoutingReport> {
        let network = store.snapshot()?;
        let report = self.solve(&network)?;
        store.commit(report.assignment.clone(), self.config.epsilon)?;
        info!(
            routes = report.assignment.num_routes(),
            "committed routing assignment"
        );
        Ok(report)
    }

    /// Runs the pipeline on a snapshot without touching any store.
    pub fn solve(&self, network: &Network) -> Result<RoutingReport> {
        self.config.validate()?;
        network.validate()?;

        info!(
            formulation = %self.config.formulation,
            nodes = network.num_nodes(),
            links = network.num_links(),
            demands = network.num_demands(),
            "starting routing run"
        );

        // Every demand needs an admissible path, even one offering no traffic.
        PathGenerator::hops(network).ensure_reachable()?;

        if network.demands().iter().all(|d| d.offered_traffic == 0.0) {
            debug!("no demand offers traffic, nothing to route");
            return Ok(self.report(0.0, RoutingAssignment::unrouted(network)));
        }

        match self.config.formulation {
            FormulationKind::WavelengthContinuous => self.route_wavelengths(network),
            FormulationKind::Unsplittable => self.route_unsplittable(network),
        }
    }

    fn route_wavelengths(&self, network: &Network) -> Result<RoutingReport> {
        let routes = PathGenerator::hops(network).generate_all(self.config.k)?;
        debug!(candidates = routes.len(), "candidate routes ready");

        let mut model =
            WavelengthRoutingFormulation::new(self.config.wavelengths, self.config.non_bifurcated)
                .build(network, routes)?;
        model.problem.solver_config = self.config.solver.clone();

        let solution = self.solve_problem(&model.problem)?;
        let assignment =
            mappers::map_wavelength_solution(network, &model, &solution, self.config.epsilon)?;

        Ok(self.report(solution.optimal_value.unwrap_or(0.0), assignment))
    }

    fn route_unsplittable(&self, network: &Network) -> Result<RoutingReport> {
        let mut model = UnsplittableFlowFormulation::new().build(network)?;
        model.problem.solver_config = self.config.solver.clone();

        let solution = self.solve_problem(&model.problem)?;
        let assignment =
            mappers::map_unsplittable_solution(network, &model, &solution, self.config.epsilon)?;

        let overloaded = assignment.overloaded_links(network, self.config.epsilon);
        if !overloaded.is_empty() {
            warn!(links = ?overloaded, "assignment exceeds link capacity beyond tolerance");
        }

        Ok(self.report(solution.optimal_value.unwrap_or(0.0), assignment))
    }

    fn solve_problem(&self, problem: &OptimizationProblem) -> Result<Solution> {
        if problem.is_mixed_integer() && !self.solver.supports_mip() {
            return Err(RoutingError::Solver(SolverError::SolverNotAvailable(format!(
                "{} cannot solve mixed-integer models",
                self.solver.name()
            ))));
        }

        info!(
            solver = self.solver.name(),
            variables = problem.num_variables(),
            constraints = problem.constraints.len(),
            integer = problem.num_integer_variables(),
            "solving model"
        );
        let solution = self.solver.solve(problem)?;
        info!(
            status = %solution.status,
            objective = ?solution.optimal_value,
            time_ms = solution.statistics.solve_time_ms,
            "solver finished"
        );

        if !solution.is_optimal() {
            return Err(RoutingError::InfeasibleOrSuboptimal {
                status: solution.status,
                message: solution.message,
            });
        }
        Ok(solution)
    }

    fn report(&self, objective_value: f64, assignment: RoutingAssignment) -> RoutingReport {
        let total_carried_traffic = match self.config.formulation {
            FormulationKind::Unsplittable => Some(assignment.total_link_traffic()),
            FormulationKind::WavelengthContinuous => None,
        };
        RoutingReport {
            formulation: self.config.formulation,
            objective_value,
            total_carried_traffic,
            assignment,
            solver: self.solver.name().to_string(),
        }
    }
}
