// good_lp Solver Adapter
// Translates domain models to good_lp expressions and runs them on a compiled-in backend

use crate::domain::{
    models::{OptimizationProblem, Solution as DomainSolution, SolutionQuality, SolverStatistics},
    solver_service::{violated_trivial_constraint, Result, SolverError, SolverService},
    value_objects::{
        ConstraintType, OptimizationType, SolutionStatus as DomainSolutionStatus, VariableType,
    },
};
use good_lp::{
    variable, variables, Expression, ResolutionError, Solution as GoodLpSolutionTrait,
    Solver as LpBackend, SolverModel, Variable as GoodLpVariable,
};
use std::time::Instant;
use tracing::debug;

/// good_lp backends this build can drive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoodLpBackend {
    #[cfg(feature = "microlp")]
    MicroLp,
    #[cfg(feature = "coin_cbc")]
    CoinCbc,
}

pub struct GoodLpSolver {
    backend: GoodLpBackend,
}

impl GoodLpSolver {
    pub fn new(backend: GoodLpBackend) -> Self {
        Self { backend }
    }

    #[cfg(feature = "microlp")]
    pub fn microlp() -> Self {
        Self::new(GoodLpBackend::MicroLp)
    }

    #[cfg(feature = "coin_cbc")]
    pub fn coin_cbc() -> Self {
        Self::new(GoodLpBackend::CoinCbc)
    }

    pub fn backend(&self) -> GoodLpBackend {
        self.backend
    }
}

impl SolverService for GoodLpSolver {
    fn solve(&self, problem: &OptimizationProblem) -> Result<DomainSolution> {
        // Validate first
        self.validate(problem)?;

        let start_time = Instant::now();

        if let Some(constraint) = violated_trivial_constraint(problem) {
            let statistics =
                SolverStatistics::for_problem(problem, start_time.elapsed().as_secs_f64() * 1000.0);
            return Ok(DomainSolution::new(
                DomainSolutionStatus::Infeasible,
                format!("Constraint '{}' has no variables and cannot hold", constraint.name),
            )
            .with_statistics(statistics));
        }

        match self.backend {
            #[cfg(feature = "microlp")]
            GoodLpBackend::MicroLp => {
                solve_with(problem, good_lp::solvers::microlp::microlp, start_time)
            }
            #[cfg(feature = "coin_cbc")]
            GoodLpBackend::CoinCbc => {
                solve_with(problem, good_lp::solvers::coin_cbc::coin_cbc, start_time)
            }
        }
    }

    fn name(&self) -> &str {
        match self.backend {
            #[cfg(feature = "microlp")]
            GoodLpBackend::MicroLp => "microlp",
            #[cfg(feature = "coin_cbc")]
            GoodLpBackend::CoinCbc => "COIN-OR CBC",
        }
    }

    fn supports_mip(&self) -> bool {
        true
    }
}

fn solve_with<S>(
    problem: &OptimizationProblem,
    backend: S,
    start_time: Instant,
) -> Result<DomainSolution>
where
    S: LpBackend,
    S::Model: SolverModel<Error = ResolutionError>,
{
    let num_vars = problem.num_variables();

    // Build variables using good_lp
    let mut vars = variables!();
    let mut lp_variables: Vec<GoodLpVariable> = Vec::with_capacity(num_vars);

    for var_def in problem.variables.iter() {
        let lower = var_def.lower_bound;
        let upper = var_def.upper_bound.unwrap_or(f64::INFINITY);

        let var = match var_def.variable_type {
            VariableType::Binary => {
                vars.add(variable().integer().min(lower).max(upper))
            }
            VariableType::Continuous => vars.add(variable().min(lower).max(upper)),
        };
        lp_variables.push(var);
    }

    // Build objective expression
    let is_maximize = problem.objective.optimization_type == OptimizationType::Maximize;
    let mut obj_expr: Expression = 0.into();

    for (i, &coeff) in problem.objective.coefficients.iter().enumerate() {
        if coeff != 0.0 {
            // good_lp minimizes, so negate for maximization
            let c = if is_maximize { -coeff } else { coeff };
            obj_expr += c * lp_variables[i];
        }
    }

    // Build constraints
    let mut lp_model = vars.minimise(obj_expr).using(backend);

    for constraint in problem.constraints.iter().filter(|c| !c.is_trivial()) {
        let mut lhs: Expression = 0.into();
        for term in &constraint.terms {
            if term.coefficient != 0.0 {
                lhs += term.coefficient * lp_variables[term.variable];
            }
        }

        match constraint.constraint_type {
            ConstraintType::LessThanOrEqual => {
                lp_model = lp_model.with(lhs.leq(constraint.bound));
            }
            ConstraintType::Equal => {
                lp_model = lp_model.with(lhs.eq(constraint.bound));
            }
            ConstraintType::GreaterThanOrEqual => {
                lp_model = lp_model.with(lhs.geq(constraint.bound));
            }
        }
    }

    // Solve the problem
    let solution_result = lp_model.solve();
    let solve_time = start_time.elapsed().as_secs_f64() * 1000.0;
    let statistics = SolverStatistics::for_problem(problem, solve_time);

    // Process result
    match solution_result {
        Ok(sol) => {
            // Extract variable values
            let variable_values: Vec<f64> = lp_variables.iter().map(|&var| sol.value(var)).collect();

            // Calculate actual objective value
            let actual_obj = problem.objective.evaluate(&variable_values);
            let quality = SolutionQuality::measure(problem, &variable_values);
            debug!(
                max_violation = quality.max_constraint_violation,
                max_integrality = quality.max_integrality_violation,
                "good_lp solution quality"
            );

            let mut solution = DomainSolution::optimal(actual_obj, variable_values)
                .with_statistics(statistics)
                .with_quality(quality);
            solution.message = format!("Optimal solution found for '{}'", problem.name);

            Ok(solution)
        }
        Err(ResolutionError::Infeasible) => Ok(DomainSolution::new(
            DomainSolutionStatus::Infeasible,
            "Problem is infeasible: no solution satisfies all constraints",
        )
        .with_statistics(statistics)),
        Err(ResolutionError::Unbounded) => Ok(DomainSolution::new(
            DomainSolutionStatus::Unbounded,
            "Problem is unbounded: objective can be improved infinitely",
        )
        .with_statistics(statistics)),
        Err(e) => Err(SolverError::ExecutionFailed(format!("{:?}", e))),
    }
}

#[cfg(all(test, feature = "microlp"))]
mod tests {
    use super::*;
    use crate::domain::models::{Constraint, ObjectiveFunction, Variable};

    /// 0/1 knapsack: capacity 15, weights 7 3 4 5 2, values 150 90 120 100 80.
    fn knapsack() -> OptimizationProblem {
        let weights = [7.0, 3.0, 4.0, 5.0, 2.0];
        let mut capacity = Constraint::new(ConstraintType::LessThanOrEqual, 15.0)
            .with_name("capacity");
        for (i, w) in weights.iter().enumerate() {
            capacity.push_term(i, *w);
        }

        OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Maximize,
            vec![150.0, 90.0, 120.0, 100.0, 80.0],
        ))
        .with_name("knapsack")
        .with_variables((0..5).map(|i| Variable::binary(format!("take{}", i))).collect())
        .add_constraint(capacity)
    }

    #[test]
    fn solves_binary_knapsack() {
        let solution = GoodLpSolver::microlp().solve(&knapsack()).unwrap();
        assert!(solution.is_optimal());
        // Stove, food, water, camera: 14 kg for 390.
        assert!((solution.optimal_value.unwrap() - 390.0).abs() < 1e-6);
        assert_eq!(solution.statistics.num_binary_vars, 5);
    }

    #[test]
    fn reports_infeasible_models() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Minimize,
            vec![1.0],
        ))
        .with_variables(vec![Variable::continuous("x").with_bounds(0.0, Some(1.0))])
        .add_constraint(Constraint::new(ConstraintType::GreaterThanOrEqual, 2.0).with_term(0, 1.0));

        let solution = GoodLpSolver::microlp().solve(&problem).unwrap();
        assert_eq!(solution.status, DomainSolutionStatus::Infeasible);
    }

    #[test]
    fn settles_empty_constraints_without_backend() {
        let base = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Minimize,
            vec![1.0],
        ))
        .with_variables(vec![Variable::continuous("x").with_bounds(0.0, Some(1.0))]);

        let satisfied = base
            .clone()
            .add_constraint(Constraint::new(ConstraintType::Equal, 0.0));
        assert!(GoodLpSolver::microlp().solve(&satisfied).unwrap().is_optimal());

        let violated = base.add_constraint(Constraint::new(ConstraintType::Equal, 1.0));
        assert_eq!(
            GoodLpSolver::microlp().solve(&violated).unwrap().status,
            DomainSolutionStatus::Infeasible
        );
    }
}
