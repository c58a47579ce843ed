use super::value_objects::{
    ConstraintType, OptimizationType, SolutionStatus, SolverBackend, VariableType,
};

/// Errors raised while laying out the decision variables of a model
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ModelError {
    #[error("variable grid '{name}' must have non-zero dimensions, got {rows}x{cols}")]
    EmptyGrid {
        name: String,
        rows: usize,
        cols: usize,
    },

    #[error("index ({row}, {col}) is out of bounds for variable grid '{name}' of shape {rows}x{cols}")]
    OutOfBounds {
        name: String,
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },
}

/// Decision variable in an optimization problem
#[derive(Debug, Clone)]
pub struct Variable {
    pub variable_type: VariableType,
    pub lower_bound: f64,
    pub upper_bound: Option<f64>,
    pub name: String,
}

impl Variable {
    pub fn continuous(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Continuous,
            lower_bound: 0.0,
            upper_bound: None,
            name: name.into(),
        }
    }

    pub fn binary(name: impl Into<String>) -> Self {
        Self {
            variable_type: VariableType::Binary,
            lower_bound: 0.0,
            upper_bound: Some(1.0),
            name: name.into(),
        }
    }

    pub fn with_bounds(mut self, lower: f64, upper: Option<f64>) -> Self {
        self.lower_bound = lower;
        self.upper_bound = upper;
        self
    }

    pub fn is_integer(&self) -> bool {
        self.variable_type == VariableType::Binary
    }
}

/// Two-dimensional family of decision variables laid out row-major in the
/// flat variable vector, starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableGrid {
    name: String,
    offset: usize,
    rows: usize,
    cols: usize,
}

impl VariableGrid {
    pub fn new(
        name: impl Into<String>,
        offset: usize,
        rows: usize,
        cols: usize,
    ) -> Result<Self, ModelError> {
        let name = name.into();
        if rows == 0 || cols == 0 {
            return Err(ModelError::EmptyGrid { name, rows, cols });
        }
        Ok(Self {
            name,
            offset,
            rows,
            cols,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.rows * self.cols
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Flat variable index of cell `(row, col)`.
    pub fn index(&self, row: usize, col: usize) -> Result<usize, ModelError> {
        if row >= self.rows || col >= self.cols {
            return Err(ModelError::OutOfBounds {
                name: self.name.clone(),
                row,
                col,
                rows: self.rows,
                cols: self.cols,
            });
        }
        Ok(self.offset + row * self.cols + col)
    }

    /// Variable name for cell `(row, col)`, e.g. `x[3,1]`.
    pub fn label(&self, row: usize, col: usize) -> String {
        format!("{}[{},{}]", self.name, row, col)
    }

    /// Values of one row, read from a primal vector.
    pub fn row_values<'a>(
        &self,
        row: usize,
        values: &'a [f64],
    ) -> Result<&'a [f64], ModelError> {
        let start = self.index(row, 0)?;
        values.get(start..start + self.cols).ok_or(ModelError::OutOfBounds {
            name: self.name.clone(),
            row,
            col: self.cols - 1,
            rows: self.rows,
            cols: self.cols,
        })
    }
}

/// Objective function to minimize or maximize
#[derive(Debug, Clone)]
pub struct ObjectiveFunction {
    pub optimization_type: OptimizationType,
    pub coefficients: Vec<f64>,
    pub variable_names: Vec<String>,
}

impl ObjectiveFunction {
    pub fn new(optimization_type: OptimizationType, coefficients: Vec<f64>) -> Self {
        let variable_names = (0..coefficients.len()).map(|i| format!("x{}", i)).collect();

        Self {
            optimization_type,
            coefficients,
            variable_names,
        }
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.variable_names = names;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.coefficients.len()
    }

    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.coefficients
            .iter()
            .zip(values)
            .map(|(c, v)| c * v)
            .sum()
    }
}

/// One `coefficient * variable` term of a linear expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Term {
    pub variable: usize,
    pub coefficient: f64,
}

/// Sparse linear constraint `Σ coefficient·x[variable] ⋈ bound`
#[derive(Debug, Clone)]
pub struct Constraint {
    pub constraint_type: ConstraintType,
    pub terms: Vec<Term>,
    pub bound: f64,
    pub name: String,
}

impl Constraint {
    pub fn new(constraint_type: ConstraintType, bound: f64) -> Self {
        Self {
            constraint_type,
            terms: Vec::new(),
            bound,
            name: String::new(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_term(mut self, variable: usize, coefficient: f64) -> Self {
        self.push_term(variable, coefficient);
        self
    }

    pub fn push_term(&mut self, variable: usize, coefficient: f64) {
        self.terms.push(Term {
            variable,
            coefficient,
        });
    }

    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// A constraint without terms reduces to `0 ⋈ bound`.
    pub fn is_trivial(&self) -> bool {
        self.terms.iter().all(|t| t.coefficient == 0.0)
    }

    pub fn lhs(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|t| t.coefficient * values.get(t.variable).copied().unwrap_or(0.0))
            .sum()
    }

    /// How far `values` violate this constraint, zero when satisfied.
    pub fn violation(&self, values: &[f64]) -> f64 {
        let lhs = self.lhs(values);
        match self.constraint_type {
            ConstraintType::LessThanOrEqual => (lhs - self.bound).max(0.0),
            ConstraintType::Equal => (lhs - self.bound).abs(),
            ConstraintType::GreaterThanOrEqual => (self.bound - lhs).max(0.0),
        }
    }
}

/// Configuration for the solver
#[derive(Debug, Clone)]
pub struct SolverConfig {
    pub backend: SolverBackend,
    pub time_limit: Option<f64>,
    pub gap_tolerance: Option<f64>,
    pub verbose: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            backend: SolverBackend::Auto,
            time_limit: None,
            gap_tolerance: None,
            verbose: false,
        }
    }
}

/// Complete optimization problem
#[derive(Debug, Clone)]
pub struct OptimizationProblem {
    pub name: String,
    pub description: String,
    pub objective: ObjectiveFunction,
    pub constraints: Vec<Constraint>,
    pub variables: Vec<Variable>,
    pub solver_config: SolverConfig,
}

impl OptimizationProblem {
    pub fn new(objective: ObjectiveFunction) -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            objective,
            constraints: Vec::new(),
            variables: Vec::new(),
            solver_config: SolverConfig::default(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn add_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn push_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    pub fn with_variables(mut self, variables: Vec<Variable>) -> Self {
        self.variables = variables;
        self
    }

    pub fn num_variables(&self) -> usize {
        self.objective.num_variables()
    }

    pub fn num_integer_variables(&self) -> usize {
        self.variables.iter().filter(|v| v.is_integer()).count()
    }

    pub fn is_mixed_integer(&self) -> bool {
        self.num_integer_variables() > 0
    }

    /// Largest constraint violation of `values` over all constraints.
    pub fn max_constraint_violation(&self, values: &[f64]) -> f64 {
        self.constraints
            .iter()
            .map(|c| c.violation(values))
            .fold(0.0, f64::max)
    }

    /// Largest distance of an integer variable from the nearest integer.
    pub fn max_integrality_violation(&self, values: &[f64]) -> f64 {
        self.variables
            .iter()
            .zip(values)
            .filter(|(var, _)| var.is_integer())
            .map(|(_, v)| (v - v.round()).abs())
            .fold(0.0, f64::max)
    }
}

/// Statistics about the solve process
#[derive(Debug, Clone, Default)]
pub struct SolverStatistics {
    pub solve_time_ms: f64,
    pub num_variables: u32,
    pub num_constraints: u32,
    pub num_binary_vars: u32,
}

impl SolverStatistics {
    pub fn for_problem(problem: &OptimizationProblem, solve_time_ms: f64) -> Self {
        Self {
            solve_time_ms,
            num_variables: problem.num_variables() as u32,
            num_constraints: problem.constraints.len() as u32,
            num_binary_vars: problem.num_integer_variables() as u32,
        }
    }
}

/// Quality metrics for the solution
#[derive(Debug, Clone, Default)]
pub struct SolutionQuality {
    pub max_constraint_violation: f64,
    pub max_integrality_violation: f64,
}

impl SolutionQuality {
    pub fn measure(problem: &OptimizationProblem, values: &[f64]) -> Self {
        Self {
            max_constraint_violation: problem.max_constraint_violation(values),
            max_integrality_violation: problem.max_integrality_violation(values),
        }
    }
}

/// Solution to an optimization problem
#[derive(Debug, Clone)]
pub struct Solution {
    pub status: SolutionStatus,
    pub optimal_value: Option<f64>,
    pub variable_values: Vec<f64>,
    pub message: String,
    pub statistics: SolverStatistics,
    pub quality: SolutionQuality,
}

impl Solution {
    pub fn new(status: SolutionStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            optimal_value: None,
            variable_values: Vec::new(),
            message: message.into(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn optimal(value: f64, variable_values: Vec<f64>) -> Self {
        Self {
            status: SolutionStatus::Optimal,
            optimal_value: Some(value),
            variable_values,
            message: "Optimal solution found".to_string(),
            statistics: SolverStatistics::default(),
            quality: SolutionQuality::default(),
        }
    }

    pub fn with_statistics(mut self, statistics: SolverStatistics) -> Self {
        self.statistics = statistics;
        self
    }

    pub fn with_quality(mut self, quality: SolutionQuality) -> Self {
        self.quality = quality;
        self
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolutionStatus::Optimal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn grid_rejects_empty_dimensions() {
        let err = VariableGrid::new("x", 0, 0, 4).unwrap_err();
        assert!(matches!(err, ModelError::EmptyGrid { rows: 0, cols: 4, .. }));
    }

    #[rstest]
    #[case(0, 0, 5)]
    #[case(0, 3, 8)]
    #[case(1, 0, 9)]
    #[case(2, 3, 16)]
    fn grid_indexes_row_major_from_offset(
        #[case] row: usize,
        #[case] col: usize,
        #[case] expected: usize,
    ) {
        let grid = VariableGrid::new("x", 5, 3, 4).unwrap();
        assert_eq!(grid.index(row, col).unwrap(), expected);
    }

    #[rstest]
    #[case(3, 0)]
    #[case(0, 4)]
    fn grid_rejects_out_of_bounds(#[case] row: usize, #[case] col: usize) {
        let grid = VariableGrid::new("x", 0, 3, 4).unwrap();
        assert!(matches!(
            grid.index(row, col),
            Err(ModelError::OutOfBounds { .. })
        ));
    }

    #[test]
    fn grid_reads_row_slices() {
        let grid = VariableGrid::new("x", 0, 2, 3).unwrap();
        let values = [0.0, 1.0, 0.0, 0.5, 0.5, 0.0];
        assert_eq!(grid.row_values(1, &values).unwrap(), &[0.5, 0.5, 0.0]);
        assert!(grid.row_values(1, &values[..4]).is_err());
        assert_eq!(grid.label(1, 2), "x[1,2]");
    }

    #[test]
    fn measures_constraint_violation() {
        let objective = ObjectiveFunction::new(OptimizationType::Minimize, vec![1.0, 1.0]);
        let problem = OptimizationProblem::new(objective)
            .with_variables(vec![Variable::binary("a"), Variable::binary("b")])
            .add_constraint(
                Constraint::new(ConstraintType::LessThanOrEqual, 1.0)
                    .with_term(0, 1.0)
                    .with_term(1, 1.0),
            )
            .add_constraint(Constraint::new(ConstraintType::Equal, 1.0).with_term(0, 1.0));

        assert_eq!(problem.max_constraint_violation(&[1.0, 0.0]), 0.0);
        assert_eq!(problem.max_constraint_violation(&[1.0, 1.0]), 1.0);
        assert!((problem.max_integrality_violation(&[0.75, 1.0]) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn trivial_constraints_have_no_effective_terms() {
        assert!(Constraint::new(ConstraintType::Equal, 0.0).is_trivial());
        assert!(Constraint::new(ConstraintType::Equal, 0.0)
            .with_term(0, 0.0)
            .is_trivial());
        assert!(!Constraint::new(ConstraintType::Equal, 0.0)
            .with_term(0, 2.0)
            .is_trivial());
    }
}
