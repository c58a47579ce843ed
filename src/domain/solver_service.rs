// Domain service interface for solving optimization problems
// Defines the contract that any solver implementation must follow

use super::models::{Constraint, OptimizationProblem, Solution};

/// Error types for the solver service
#[derive(Debug, thiserror::Error)]
pub enum SolverError {
    #[error("Invalid problem: {0}")]
    InvalidProblem(String),

    #[error("Solver not available: {0}")]
    SolverNotAvailable(String),

    #[error("Solver execution failed: {0}")]
    ExecutionFailed(String),
}

pub type Result<T> = std::result::Result<T, SolverError>;

/// Domain service interface for optimization solvers
///
/// Implementations must not modify the problem and must return primal values
/// for every declared variable when the status is optimal. Infeasible and
/// unbounded problems are reported through the solution status, not as errors.
pub trait SolverService: Send + Sync {
    /// Solve an optimization problem
    fn solve(&self, problem: &OptimizationProblem) -> Result<Solution>;

    /// Validate a problem without solving it
    fn validate(&self, problem: &OptimizationProblem) -> Result<Vec<String>> {
        let mut errors = Vec::new();

        // Check objective has coefficients
        if problem.objective.coefficients.is_empty() {
            errors.push("Objective must have at least one coefficient".to_string());
        }

        let num_vars = problem.num_variables();

        // Every objective column needs a declared variable
        if problem.variables.len() != num_vars {
            errors.push(format!(
                "Number of variables ({}) doesn't match objective coefficients ({})",
                problem.variables.len(),
                num_vars
            ));
        }

        if problem.objective.coefficients.iter().any(|c| !c.is_finite()) {
            errors.push("Objective has non-finite coefficients".to_string());
        }

        // Check constraints
        for (i, constraint) in problem.constraints.iter().enumerate() {
            if let Some(term) = constraint.terms.iter().find(|t| t.variable >= num_vars) {
                errors.push(format!(
                    "Constraint {} '{}' references variable {} but problem has {} variables",
                    i, constraint.name, term.variable, num_vars
                ));
            }
            if !constraint.bound.is_finite()
                || constraint.terms.iter().any(|t| !t.coefficient.is_finite())
            {
                errors.push(format!(
                    "Constraint {} '{}' has non-finite coefficients",
                    i, constraint.name
                ));
            }
        }

        // Check variable bounds
        for (i, var) in problem.variables.iter().enumerate() {
            if let Some(upper) = var.upper_bound {
                if var.lower_bound > upper {
                    errors.push(format!(
                        "Variable {} '{}' has lower bound ({}) > upper bound ({})",
                        i, var.name, var.lower_bound, upper
                    ));
                }
            }
        }

        if errors.is_empty() {
            Ok(Vec::new())
        } else {
            Err(SolverError::InvalidProblem(errors.join("; ")))
        }
    }

    /// Get the name of this solver backend
    fn name(&self) -> &str;

    /// Check if this solver supports mixed-integer programming
    fn supports_mip(&self) -> bool;
}

/// First constraint without effective terms whose `0 ⋈ bound` does not hold.
///
/// Backends differ in how they treat empty rows, so adapters settle these
/// before building a backend model.
pub fn violated_trivial_constraint(problem: &OptimizationProblem) -> Option<&Constraint> {
    problem
        .constraints
        .iter()
        .filter(|c| c.is_trivial())
        .find(|c| !c.constraint_type.holds(0.0, c.bound, 0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        models::{ObjectiveFunction, Variable},
        value_objects::{ConstraintType, OptimizationType},
    };

    struct NullSolver;

    impl SolverService for NullSolver {
        fn solve(&self, _problem: &OptimizationProblem) -> Result<Solution> {
            Err(SolverError::SolverNotAvailable("null".to_string()))
        }

        fn name(&self) -> &str {
            "null"
        }

        fn supports_mip(&self) -> bool {
            false
        }
    }

    fn two_variable_problem() -> OptimizationProblem {
        OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Minimize,
            vec![1.0, 2.0],
        ))
        .with_variables(vec![Variable::continuous("a"), Variable::continuous("b")])
    }

    #[test]
    fn accepts_well_formed_problem() {
        let problem = two_variable_problem()
            .add_constraint(Constraint::new(ConstraintType::Equal, 1.0).with_term(1, 1.0));
        assert!(NullSolver.validate(&problem).is_ok());
    }

    #[test]
    fn rejects_terms_outside_declared_variables() {
        let problem = two_variable_problem()
            .add_constraint(Constraint::new(ConstraintType::Equal, 1.0).with_term(2, 1.0));
        let err = NullSolver.validate(&problem).unwrap_err();
        assert!(err.to_string().contains("references variable 2"));
    }

    #[test]
    fn rejects_undeclared_variables() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Minimize,
            vec![1.0, 2.0],
        ));
        let err = NullSolver.validate(&problem).unwrap_err();
        assert!(err.to_string().contains("Number of variables (0)"));
    }

    #[test]
    fn rejects_inverted_bounds() {
        let problem = OptimizationProblem::new(ObjectiveFunction::new(
            OptimizationType::Minimize,
            vec![1.0],
        ))
        .with_variables(vec![Variable::continuous("a").with_bounds(2.0, Some(1.0))]);
        assert!(matches!(
            NullSolver.validate(&problem),
            Err(SolverError::InvalidProblem(_))
        ));
    }

    #[test]
    fn finds_violated_trivial_constraint() {
        let satisfied = two_variable_problem()
            .add_constraint(Constraint::new(ConstraintType::Equal, 0.0).with_name("empty-ok"));
        assert!(violated_trivial_constraint(&satisfied).is_none());

        let violated = satisfied
            .add_constraint(Constraint::new(ConstraintType::Equal, 1.0).with_name("empty-bad"));
        let found = violated_trivial_constraint(&violated).map(|c| c.name.as_str());
        assert_eq!(found, Some("empty-bad"));
    }
}
