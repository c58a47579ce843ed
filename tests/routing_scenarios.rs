//! End-to-end routing runs on small topologies with the bundled solver.
#![cfg(feature = "microlp")]

use std::sync::Arc;

use rstest::{fixture, rstest};
use routeopt::{
    load_network, GoodLpSolver, InMemoryNetworkStore, LinkId, Network, RoutingConfig,
    RoutingError, RoutingService, SolutionStatus,
};

const LINE: &str = r#"{
    "nodes": ["A", "B", "C"],
    "links": [
        { "from": "A", "to": "B", "capacity": 10, "bidirectional": true },
        { "from": "B", "to": "C", "capacity": 10, "bidirectional": true }
    ],
    "demands": [ { "ingress": "A", "egress": "C", "offered_traffic": 5 } ]
}"#;

fn service(config: RoutingConfig) -> RoutingService {
    RoutingService::new(Arc::new(GoodLpSolver::microlp()), config)
}

#[fixture]
fn line() -> Network {
    load_network(LINE).expect("line scenario")
}

#[rstest]
fn unsplittable_line_carries_demand_over_both_links(line: Network) {
    let mut store = InMemoryNetworkStore::new(line);
    let report = service(RoutingConfig::unsplittable())
        .run(&mut store)
        .expect("routing run");

    let assignment = store.assignment().expect("committed assignment");
    assert_eq!(assignment.demands.len(), 1);
    let routes = &assignment.demands[0].routes;
    assert_eq!(routes.len(), 1);
    // A->B is e0 and B->C is e2; e1 and e3 run the other way.
    assert_eq!(routes[0].links, vec![LinkId(0), LinkId(2)]);
    assert_eq!(routes[0].carried_traffic, 5.0);

    assert_eq!(report.total_carried_traffic, Some(10.0));
    assert!((report.objective_value - 10.0).abs() < 1e-6);
    assert_eq!(report.summary(), "Total carried traffic in the links: 10");
}

#[test]
fn wavelength_line_uses_one_wavelength_per_hop() {
    let mut network = Network::new();
    let a = network.add_node("A");
    let b = network.add_node("B");
    let c = network.add_node("C");
    network.add_bidirectional_link(a, b, 10.0).unwrap();
    network.add_bidirectional_link(b, c, 10.0).unwrap();
    network.add_demand(a, c, 1.0).unwrap();

    let report = service(RoutingConfig::wavelength(2, 4, true))
        .solve(&network)
        .expect("routing run");

    assert!((report.objective_value - 2.0).abs() < 1e-6);
    let routes = &report.assignment.demands[0].routes;
    assert_eq!(routes.len(), 1);
    assert_eq!(network.describe_path(&routes[0].links), "A -> B -> C");
    assert_eq!(routes[0].wavelengths.len(), 1);
    assert!((routes[0].carried_traffic - 1.0).abs() < 1e-6);
}

#[rstest]
#[case::wavelength(RoutingConfig::wavelength(3, 4, true))]
#[case::unsplittable(RoutingConfig::unsplittable())]
fn disconnected_demand_has_no_admissible_path(#[case] config: RoutingConfig) {
    let mut network = Network::new();
    let a = network.add_node("A");
    let b = network.add_node("B");
    let c = network.add_node("C");
    let d = network.add_node("D");
    network.add_bidirectional_link(a, b, 10.0).unwrap();
    network.add_bidirectional_link(c, d, 10.0).unwrap();
    network.add_demand(a, b, 1.0).unwrap();
    network.add_demand(a, d, 1.0).unwrap();

    let mut store = InMemoryNetworkStore::new(network);
    let err = service(config).run(&mut store).unwrap_err();

    match err {
        RoutingError::NoAdmissiblePath {
            ingress, egress, ..
        } => assert_eq!((ingress.as_str(), egress.as_str()), ("A", "D")),
        other => panic!("expected no admissible path, got {other:?}"),
    }
    assert!(store.assignment().is_none());
}

#[test]
fn insufficient_capacity_is_infeasible() {
    let mut network = load_network(LINE).unwrap();
    let a = network.node_by_name("A").unwrap();
    let c = network.node_by_name("C").unwrap();
    network.add_demand(a, c, 6.0).unwrap();

    let mut store = InMemoryNetworkStore::new(network);
    let err = service(RoutingConfig::unsplittable())
        .run(&mut store)
        .unwrap_err();

    assert!(
        matches!(
            err,
            RoutingError::InfeasibleOrSuboptimal {
                status: SolutionStatus::Infeasible,
                ..
            }
        ),
        "{err:?}"
    );
    assert!(store.assignment().is_none());
}

#[test]
fn wavelength_exhaustion_is_infeasible() {
    let mut network = Network::new();
    let a = network.add_node("A");
    let b = network.add_node("B");
    network.add_link(a, b, 10.0).unwrap();
    network.add_demand(a, b, 3.0).unwrap();

    let err = service(RoutingConfig::wavelength(5, 2, true))
        .solve(&network)
        .unwrap_err();
    assert!(matches!(err, RoutingError::InfeasibleOrSuboptimal { .. }));
}

#[test]
fn parameter_map_drives_the_run() {
    let params = [
        ("formulation", "wavelength"),
        ("k", "2"),
        ("linkCapacity", "8"),
        ("isNonBifurcated", "true"),
        ("solver", "microlp"),
    ]
    .iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect();
    let config = RoutingConfig::from_parameters(&params).unwrap();
    let service = RoutingService::from_config(config).unwrap();
    assert_eq!(service.solver_name(), "microlp");

    let mut unit = load_network(LINE).unwrap();
    let a = unit.node_by_name("A").unwrap();
    let b = unit.node_by_name("B").unwrap();
    unit.add_demand(b, a, 1.0).unwrap();

    // 5 lightpaths A->C plus one B->A need 5*2 + 1 link-wavelengths.
    let report = service.solve(&unit).unwrap();
    assert!((report.objective_value - 11.0).abs() < 1e-6);
}
