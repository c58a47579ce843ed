// Route × wavelength formulation with wavelength continuity

use tracing::debug;

use crate::domain::{
    models::{Constraint, ObjectiveFunction, OptimizationProblem, Variable, VariableGrid},
    network::Network,
    routing::CandidateRoute,
    routing_error::{Result, RoutingError},
    value_objects::{ConstraintType, OptimizationType},
};

/// Builds `x[p, w]`: route `p` of the pooled candidate set carries traffic
/// on wavelength `w`.
///
/// minimize   Σ_p hops(p) · Σ_w x[p,w]
/// subject to Σ_{p ∈ routes(d)} Σ_w x[p,w] = traffic(d)   for every demand d
///            Σ_{p ∋ e} x[p,w] ≤ 1                        for every link e, wavelength w
#[derive(Debug, Clone, Copy)]
pub struct WavelengthRoutingFormulation {
    pub wavelengths: usize,
    pub non_bifurcated: bool,
}

/// Built model plus what is needed to read its solution back
#[derive(Debug, Clone)]
pub struct WavelengthModel {
    pub problem: OptimizationProblem,
    pub grid: VariableGrid,
    pub routes: Vec<CandidateRoute>,
}

impl WavelengthRoutingFormulation {
    pub fn new(wavelengths: usize, non_bifurcated: bool) -> Self {
        Self {
            wavelengths,
            non_bifurcated,
        }
    }

    pub fn build(&self, network: &Network, routes: Vec<CandidateRoute>) -> Result<WavelengthModel> {
        if let Some(route) = routes.iter().find(|r| network.demand(r.demand).is_none()) {
            return Err(RoutingError::InvalidNetwork(format!(
                "candidate route for unknown demand {}",
                route.demand
            )));
        }

        let grid = VariableGrid::new("x", 0, routes.len(), self.wavelengths)?;

        let mut variables = Vec::with_capacity(grid.len());
        let mut coefficients = Vec::with_capacity(grid.len());
        for (p, route) in routes.iter().enumerate() {
            for w in 0..grid.cols() {
                let label = grid.label(p, w);
                variables.push(if self.non_bifurcated {
                    Variable::binary(label)
                } else {
                    Variable::continuous(label).with_bounds(0.0, Some(1.0))
                });
                coefficients.push(route.hop_count() as f64);
            }
        }

        let names = variables.iter().map(|v| v.name.clone()).collect();
        let objective =
            ObjectiveFunction::new(OptimizationType::Minimize, coefficients).with_names(names);
        let mut problem = OptimizationProblem::new(objective)
            .with_name("wavelength-continuous routing")
            .with_description(format!(
                "{} candidate routes over {} wavelengths",
                routes.len(),
                grid.cols()
            ))
            .with_variables(variables);

        for demand in network.demands() {
            let mut satisfaction = Constraint::new(ConstraintType::Equal, demand.offered_traffic)
                .with_name(format!("demand[{}]", demand.id));
            for (p, _) in routes
                .iter()
                .enumerate()
                .filter(|(_, r)| r.demand == demand.id)
            {
                for w in 0..grid.cols() {
                    satisfaction.push_term(grid.index(p, w)?, 1.0);
                }
            }
            problem.push_constraint(satisfaction);
        }

        let mut traversing = vec![Vec::new(); network.num_links()];
        for (p, route) in routes.iter().enumerate() {
            for link in &route.links {
                traversing
                    .get_mut(link.index())
                    .ok_or_else(|| RoutingError::unknown_link(*link))?
                    .push(p);
            }
        }

        for (link, users) in network.links().iter().zip(&traversing) {
            if users.is_empty() {
                continue;
            }
            for w in 0..grid.cols() {
                let mut exclusivity = Constraint::new(ConstraintType::LessThanOrEqual, 1.0)
                    .with_name(format!("link[{},w{}]", link.id, w));
                for &p in users {
                    exclusivity.push_term(grid.index(p, w)?, 1.0);
                }
                problem.push_constraint(exclusivity);
            }
        }

        debug!(
            variables = problem.num_variables(),
            constraints = problem.constraints.len(),
            binary = self.non_bifurcated,
            "built wavelength routing model"
        );

        Ok(WavelengthModel {
            problem,
            grid,
            routes,
        })
    }
}

impl WavelengthModel {
    /// Traffic of each route, `Σ_w x[p,w]`, read from a primal vector.
    pub fn route_traffic(&self, values: &[f64]) -> Result<Vec<f64>> {
        (0..self.routes.len())
            .map(|p| -> Result<f64> { Ok(self.grid.row_values(p, values)?.iter().sum()) })
            .collect()
    }

    /// Per-link load implied directly by a primal vector.
    pub fn implied_link_loads(&self, num_links: usize, values: &[f64]) -> Result<Vec<f64>> {
        let mut loads = vec![0.0; num_links];
        for (route, traffic) in self.routes.iter().zip(self.route_traffic(values)?) {
            for link in &route.links {
                *loads
                    .get_mut(link.index())
                    .ok_or_else(|| RoutingError::unknown_link(*link))? += traffic;
            }
        }
        Ok(loads)
    }
}
