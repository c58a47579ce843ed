// Run configuration and the name/value parameter surface it is parsed from

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::{
    models::SolverConfig,
    routing_error::{Result, RoutingError},
    value_objects::SolverBackend,
};

/// Which model is built for the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulationKind {
    /// Candidate routes × wavelengths, wavelength continuity enforced
    WavelengthContinuous,
    /// Demand × link binary flow, one path per demand
    Unsplittable,
}

impl fmt::Display for FormulationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormulationKind::WavelengthContinuous => write!(f, "wavelength"),
            FormulationKind::Unsplittable => write!(f, "unsplittable"),
        }
    }
}

impl FromStr for FormulationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "wavelength" | "wavelength-continuous" => Ok(FormulationKind::WavelengthContinuous),
            "unsplittable" | "unsplittable-flow" => Ok(FormulationKind::Unsplittable),
            other => Err(format!("unknown formulation '{}'", other)),
        }
    }
}

/// Name, default value and description of one recognised parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterInfo {
    pub name: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone)]
pub struct RoutingConfig {
    pub formulation: FormulationKind,
    /// Maximum number of loopless candidate paths per demand
    pub k: usize,
    /// Route-wavelength variables are binary instead of continuous
    pub non_bifurcated: bool,
    /// Wavelengths available per link
    pub wavelengths: usize,
    /// Tolerance for pruning and integrality checks
    pub epsilon: f64,
    pub solver: SolverConfig,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            formulation: FormulationKind::WavelengthContinuous,
            k: 10,
            non_bifurcated: false,
            wavelengths: 20,
            epsilon: 0.001,
            solver: SolverConfig::default(),
        }
    }
}

impl RoutingConfig {
    pub fn unsplittable() -> Self {
        Self {
            formulation: FormulationKind::Unsplittable,
            ..Self::default()
        }
    }

    pub fn wavelength(k: usize, wavelengths: usize, non_bifurcated: bool) -> Self {
        Self {
            formulation: FormulationKind::WavelengthContinuous,
            k,
            wavelengths,
            non_bifurcated,
            ..Self::default()
        }
    }

    pub fn with_backend(mut self, backend: SolverBackend) -> Self {
        self.solver.backend = backend;
        self
    }

    pub fn with_epsilon(mut self, epsilon: f64) -> Self {
        self.epsilon = epsilon;
        self
    }

    /// Recognised parameters with their defaults.
    pub fn parameters() -> Vec<ParameterInfo> {
        vec![
            ParameterInfo {
                name: "k",
                default: "10",
                description: "Maximum number of loopless admissible paths per demand",
            },
            ParameterInfo {
                name: "isNonBifurcated",
                default: "false",
                description: "True if the traffic is constrained to be non-bifurcated",
            },
            ParameterInfo {
                name: "linkCapacity",
                default: "20",
                description: "Number of wavelengths available per link",
            },
            ParameterInfo {
                name: "epsilon",
                default: "0.001",
                description: "Carried traffic below this value is treated as solver noise",
            },
            ParameterInfo {
                name: "formulation",
                default: "wavelength",
                description: "Routing model to build: wavelength or unsplittable",
            },
            ParameterInfo {
                name: "solver",
                default: "auto",
                description: "Solver backend: auto, microlp, coin_cbc or highs",
            },
        ]
    }

    /// Builds a configuration from name/value pairs on top of the defaults.
    pub fn from_parameters(parameters: &HashMap<String, String>) -> Result<Self> {
        let mut config = Self::default();
        for (name, value) in parameters {
            config.set(name, value)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Sets one parameter by name.
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        match name {
            "k" => self.k = parse(name, value)?,
            "isNonBifurcated" => self.non_bifurcated = parse(name, value)?,
            "linkCapacity" | "W" => self.wavelengths = parse(name, value)?,
            "epsilon" => self.epsilon = parse(name, value)?,
            "formulation" => self.formulation = parse(name, value)?,
            "solver" => self.solver.backend = parse(name, value)?,
            other => {
                return Err(RoutingError::InvalidConfig(format!(
                    "unknown parameter '{}'",
                    other
                )))
            }
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.k == 0 {
            return Err(RoutingError::InvalidConfig(
                "k must be a positive integer".to_string(),
            ));
        }
        if self.wavelengths == 0 {
            return Err(RoutingError::InvalidConfig(
                "linkCapacity must be a positive integer".to_string(),
            ));
        }
        if !self.epsilon.is_finite() || self.epsilon <= 0.0 || self.epsilon >= 0.5 {
            return Err(RoutingError::InvalidConfig(format!(
                "epsilon must lie in (0, 0.5), got {}",
                self.epsilon
            )));
        }
        Ok(())
    }
}

fn parse<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| {
        RoutingError::InvalidConfig(format!("invalid value '{}' for {}: {}", value, name, e))
    })
}
