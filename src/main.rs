use clap::Parser;
use routeopt::{
    FormulationKind, InMemoryNetworkStore, RoutingConfig, RoutingService, Scenario, SolverBackend,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Optimal routing of traffic demands over a capacitated network
#[derive(Debug, Parser)]
#[command(name = "routeopt", version)]
struct Cli {
    /// Scenario file (JSON) with nodes, links and demands
    #[arg(required_unless_present = "list_params")]
    scenario: Option<PathBuf>,

    /// Routing model: wavelength or unsplittable
    #[arg(long, default_value = "wavelength")]
    formulation: FormulationKind,

    /// Maximum number of loopless candidate paths per demand
    #[arg(short, long)]
    k: Option<usize>,

    /// Wavelengths available per link
    #[arg(short = 'w', long)]
    wavelengths: Option<usize>,

    /// Route-wavelength variables are binary
    #[arg(long)]
    non_bifurcated: bool,

    /// Carried traffic below this value is dropped
    #[arg(long)]
    epsilon: Option<f64>,

    /// Solver backend: auto, microlp, coin_cbc or highs
    #[arg(long, default_value = "auto")]
    solver: SolverBackend,

    /// Extra algorithm parameter as name=value, may be repeated
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,

    /// Write the routing assignment here instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List recognised algorithm parameters and exit
    #[arg(long)]
    list_params: bool,
}

impl Cli {
    fn config(&self) -> Result<RoutingConfig, Box<dyn std::error::Error>> {
        let mut config = RoutingConfig {
            formulation: self.formulation,
            non_bifurcated: self.non_bifurcated,
            ..RoutingConfig::default()
        }
        .with_backend(self.solver);
        if let Some(k) = self.k {
            config.k = k;
        }
        if let Some(wavelengths) = self.wavelengths {
            config.wavelengths = wavelengths;
        }
        if let Some(epsilon) = self.epsilon {
            config.epsilon = epsilon;
        }
        for param in &self.params {
            let (name, value) = param
                .split_once('=')
                .ok_or_else(|| format!("parameter '{}' is not NAME=VALUE", param))?;
            config.set(name.trim(), value)?;
        }
        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if cli.list_params {
        for param in RoutingConfig::parameters() {
            println!("{:<16} {:<12} {}", param.name, param.default, param.description);
        }
        return Ok(());
    }

    let Some(scenario) = &cli.scenario else {
        return Err("a scenario file is required".into());
    };
    let config = cli.config()?;
    let json = tokio::fs::read_to_string(scenario).await?;
    let network = Scenario::from_json(&json)?.to_network()?;

    // The pipeline is synchronous; keep it off the async workers.
    let report = tokio::task::spawn_blocking(move || {
        let service = RoutingService::from_config(config)?;
        let mut store = InMemoryNetworkStore::new(network);
        service.run(&mut store)
    })
    .await??;

    println!("{}", report.summary());

    let assignment = serde_json::to_string_pretty(&report.assignment)?;
    match &cli.output {
        Some(path) => tokio::fs::write(path, assignment).await?,
        None => println!("{}", assignment),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_params_without_a_scenario() {
        let cli = Cli::try_parse_from(["routeopt", "--list-params"]).unwrap();
        assert!(cli.list_params);
        assert!(cli.scenario.is_none());
    }

    #[test]
    fn scenario_is_required_for_a_run() {
        assert!(Cli::try_parse_from(["routeopt", "-k", "3"]).is_err());
    }

    #[test]
    fn flags_and_params_build_the_config() {
        let cli = Cli::try_parse_from([
            "routeopt",
            "net.json",
            "--formulation",
            "unsplittable",
            "-k",
            "4",
            "--param",
            "linkCapacity=8",
        ])
        .unwrap();
        assert_eq!(cli.scenario, Some(PathBuf::from("net.json")));

        let config = cli.config().unwrap();
        assert_eq!(config.formulation, FormulationKind::Unsplittable);
        assert_eq!(config.k, 4);
        assert_eq!(config.wavelengths, 8);
    }

    #[test]
    fn malformed_param_is_rejected() {
        let cli = Cli::try_parse_from(["routeopt", "net.json", "--param", "k"]).unwrap();
        assert!(cli.config().is_err());
    }
}
