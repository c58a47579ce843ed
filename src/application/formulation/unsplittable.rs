// Demand × link binary flow formulation: every demand travels one path

use tracing::debug;

use crate::domain::{
    models::{Constraint, ObjectiveFunction, OptimizationProblem, Variable, VariableGrid},
    network::{DemandId, Network},
    routing_error::Result,
    value_objects::{ConstraintType, OptimizationType},
};

/// Builds binary `x[d, e]`: link `e` lies on the path of demand `d`.
///
/// Demands offering no traffic are left out of the model; they carry nothing
/// and would only add free variables.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsplittableFlowFormulation;

#[derive(Debug, Clone)]
pub struct UnsplittableModel {
    pub problem: OptimizationProblem,
    pub grid: VariableGrid,
    /// Demand routed by each grid row.
    pub demands: Vec<DemandId>,
}

impl UnsplittableFlowFormulation {
    pub fn new() -> Self {
        Self
    }

    pub fn build(&self, network: &Network) -> Result<UnsplittableModel> {
        let routed: Vec<_> = network
            .demands()
            .iter()
            .filter(|d| d.offered_traffic > 0.0)
            .collect();
        let grid = VariableGrid::new("x", 0, routed.len(), network.num_links())?;

        let mut variables = Vec::with_capacity(grid.len());
        let mut coefficients = Vec::with_capacity(grid.len());
        for (row, demand) in routed.iter().enumerate() {
            for col in 0..grid.cols() {
                variables.push(Variable::binary(grid.label(row, col)));
                coefficients.push(demand.offered_traffic);
            }
        }

        let names = variables.iter().map(|v| v.name.clone()).collect();
        let objective =
            ObjectiveFunction::new(OptimizationType::Minimize, coefficients).with_names(names);
        let mut problem = OptimizationProblem::new(objective)
            .with_name("unsplittable flow routing")
            .with_description(format!(
                "{} demands over {} links",
                routed.len(),
                network.num_links()
            ))
            .with_variables(variables);

        for node in network.nodes() {
            for (row, demand) in routed.iter().enumerate() {
                let balance = if node.id == demand.ingress {
                    1.0
                } else if node.id == demand.egress {
                    -1.0
                } else {
                    0.0
                };
                let mut conservation = Constraint::new(ConstraintType::Equal, balance)
                    .with_name(format!("flow[{},{}]", node.id, demand.id));
                for link in network.outgoing_links(node.id) {
                    conservation.push_term(grid.index(row, link.index())?, 1.0);
                }
                for link in network.incoming_links(node.id) {
                    conservation.push_term(grid.index(row, link.index())?, -1.0);
                }
                problem.push_constraint(conservation);
            }
        }

        for link in network.links() {
            let mut capacity = Constraint::new(ConstraintType::LessThanOrEqual, link.capacity)
                .with_name(format!("capacity[{}]", link.id));
            for (row, demand) in routed.iter().enumerate() {
                capacity.push_term(grid.index(row, link.id.index())?, demand.offered_traffic);
            }
            problem.push_constraint(capacity);
        }

        debug!(
            variables = problem.num_variables(),
            constraints = problem.constraints.len(),
            "built unsplittable flow model"
        );

        Ok(UnsplittableModel {
            problem,
            grid,
            demands: routed.iter().map(|d| d.id).collect(),
        })
    }
}

impl UnsplittableModel {
    /// Per-link load implied directly by a primal vector.
    pub fn implied_link_loads(&self, network: &Network, values: &[f64]) -> Result<Vec<f64>> {
        let mut loads = vec![0.0; network.num_links()];
        for (row, demand) in self.demands.iter().enumerate() {
            let traffic = network
                .demand(*demand)
                .map(|d| d.offered_traffic)
                .unwrap_or(0.0);
            for (load, x) in loads.iter_mut().zip(self.grid.row_values(row, values)?) {
                *load += traffic * x;
            }
        }
        Ok(loads)
    }
}
