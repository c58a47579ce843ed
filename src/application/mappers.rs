// Solution mapping: numeric solver output -> routing assignment

use std::collections::{BTreeSet, HashSet};

use crate::application::formulation::{UnsplittableModel, WavelengthModel};
use crate::domain::{
    models::{OptimizationProblem, Solution},
    network::{Demand, LinkId, Network},
    routing::{DemandRouting, RouteAssignment, RoutingAssignment},
    routing_error::{Result, RoutingError},
    solver_service::SolverError,
};

/// Primal values of an optimal solution, checked against the model size.
fn optimal_values<'s>(problem: &OptimizationProblem, solution: &'s Solution) -> Result<&'s [f64]> {
    if !solution.is_optimal() {
        return Err(RoutingError::InfeasibleOrSuboptimal {
            status: solution.status,
            message: solution.message.clone(),
        });
    }
    if solution.variable_values.len() != problem.num_variables() {
        return Err(RoutingError::Solver(SolverError::ExecutionFailed(format!(
            "solver returned {} values for {} variables",
            solution.variable_values.len(),
            problem.num_variables()
        ))));
    }
    Ok(&solution.variable_values)
}

/// Carried traffic of every route is `Σ_w x[p,w]`; routes below `epsilon`
/// are solver noise and dropped.
pub fn map_wavelength_solution(
    network: &Network,
    model: &WavelengthModel,
    solution: &Solution,
    epsilon: f64,
) -> Result<RoutingAssignment> {
    let values = optimal_values(&model.problem, solution)?;
    let traffic = model.route_traffic(values)?;

    let mut routings: Vec<DemandRouting> =
        network.demands().iter().map(DemandRouting::unrouted).collect();

    for (p, (route, carried)) in model.routes.iter().zip(traffic).enumerate() {
        if carried < epsilon {
            continue;
        }
        let wavelengths = model
            .grid
            .row_values(p, values)?
            .iter()
            .enumerate()
            .filter(|(_, x)| **x >= epsilon)
            .map(|(w, _)| w)
            .collect();
        let routing = routings.get_mut(route.demand.index()).ok_or_else(|| {
            RoutingError::InvalidNetwork(format!("route for unknown demand {}", route.demand))
        })?;
        routing.routes.push(
            RouteAssignment::new(network, route.links.clone(), carried)
                .with_wavelengths(wavelengths),
        );
    }

    if let Some(overrun) = routings
        .iter()
        .find(|r| r.carried_traffic() > r.offered_traffic + epsilon)
    {
        return Err(RoutingError::malformed(
            overrun.demand,
            format!(
                "routes carry {} but the demand offers {}",
                overrun.carried_traffic(),
                overrun.offered_traffic
            ),
        ));
    }

    Ok(RoutingAssignment::new(routings).prune(epsilon))
}

/// Each demand's support `{e : x[d,e] ≈ 1}` must form exactly one simple
/// ingress-to-egress path, which then carries the full offered traffic.
/// Demands left out of the model get an entry without routes.
pub fn map_unsplittable_solution(
    network: &Network,
    model: &UnsplittableModel,
    solution: &Solution,
    epsilon: f64,
) -> Result<RoutingAssignment> {
    let values = optimal_values(&model.problem, solution)?;

    let mut routings = Vec::with_capacity(network.num_demands());
    for demand in network.demands() {
        let Some(row) = model.demands.iter().position(|id| *id == demand.id) else {
            routings.push(DemandRouting::unrouted(demand));
            continue;
        };

        let mut support = BTreeSet::new();
        for (col, &x) in model.grid.row_values(row, values)?.iter().enumerate() {
            if x >= 1.0 - epsilon {
                support.insert(LinkId(col));
            } else if x > epsilon {
                return Err(RoutingError::malformed(
                    demand.id,
                    format!("fractional value {} on link {}", x, LinkId(col)),
                ));
            }
        }

        let path = trace_path(network, demand, support)?;
        routings.push(DemandRouting {
            demand: demand.id,
            offered_traffic: demand.offered_traffic,
            routes: vec![RouteAssignment::new(network, path, demand.offered_traffic)],
        });
    }

    Ok(RoutingAssignment::new(routings))
}

/// Follows the unique outgoing support link from ingress until egress.
fn trace_path(network: &Network, demand: &Demand, mut support: BTreeSet<LinkId>) -> Result<Vec<LinkId>> {
    let mut at = demand.ingress;
    let mut visited = HashSet::from([at]);
    let mut path = Vec::with_capacity(support.len());

    while at != demand.egress {
        let next: Vec<LinkId> = support
            .iter()
            .copied()
            .filter(|id| network.link(*id).is_some_and(|l| l.origin == at))
            .collect();
        let link = match next.as_slice() {
            [only] => network
                .link(*only)
                .ok_or_else(|| RoutingError::unknown_link(*only))?,
            [] => {
                return Err(RoutingError::malformed(
                    demand.id,
                    format!("path stops at {}", network.node_name(at)),
                ))
            }
            several => {
                return Err(RoutingError::malformed(
                    demand.id,
                    format!(
                        "{} links leave {} in the solution",
                        several.len(),
                        network.node_name(at)
                    ),
                ))
            }
        };

        support.remove(&link.id);
        path.push(link.id);
        at = link.destination;
        if !visited.insert(at) {
            return Err(RoutingError::malformed(
                demand.id,
                format!("path revisits {}", network.node_name(at)),
            ));
        }
    }

    if !support.is_empty() {
        return Err(RoutingError::malformed(
            demand.id,
            format!("{} links are disconnected from the path", support.len()),
        ));
    }
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::formulation::{UnsplittableFlowFormulation, WavelengthRoutingFormulation};
    use crate::application::path_generator::PathGenerator;
    use crate::domain::{network::DemandId, value_objects::SolutionStatus};
    use rstest::{fixture, rstest};

    /// A <-> B <-> C, A <-> C, demand A -> C offering 2.
    #[fixture]
    fn ring() -> Network {
        let mut network = Network::new();
        let a = network.add_node("A");
        let b = network.add_node("B");
        let c = network.add_node("C");
        network.add_bidirectional_link(a, b, 10.0).unwrap(); // e0 A->B, e1 B->A
        network.add_bidirectional_link(b, c, 10.0).unwrap(); // e2 B->C, e3 C->B
        network.add_bidirectional_link(a, c, 10.0).unwrap(); // e4 A->C, e5 C->A
        network.add_demand(a, c, 2.0).unwrap();
        network
    }

    fn unsplittable(network: &Network, values: Vec<f64>) -> Result<RoutingAssignment> {
        let model = UnsplittableFlowFormulation::new().build(network).unwrap();
        let solution = Solution::optimal(0.0, values);
        map_unsplittable_solution(network, &model, &solution, 0.001)
    }

    #[rstest]
    fn reconstructs_single_path(ring: Network) {
        let assignment = unsplittable(&ring, vec![0.9999, 0.0, 1.0, 0.0, 0.0004, 0.0]).unwrap();
        let routing = assignment.demand(DemandId(0)).unwrap();
        assert_eq!(routing.routes.len(), 1);
        assert_eq!(routing.routes[0].links, vec![LinkId(0), LinkId(2)]);
        assert_eq!(routing.routes[0].nodes, vec!["A", "B", "C"]);
        assert_eq!(routing.routes[0].carried_traffic, 2.0);
    }

    #[rstest]
    fn silent_demands_keep_an_empty_entry(mut ring: Network) {
        let b = ring.node_by_name("B").unwrap();
        let c = ring.node_by_name("C").unwrap();
        ring.add_demand(c, b, 0.0).unwrap();

        let assignment = unsplittable(&ring, vec![0.0, 0.0, 0.0, 0.0, 1.0, 0.0]).unwrap();
        assert_eq!(assignment.demands.len(), 2);
        assert_eq!(assignment.demand(DemandId(0)).unwrap().routes.len(), 1);
        let silent = assignment.demand(DemandId(1)).unwrap();
        assert!(silent.routes.is_empty());
        assert_eq!(silent.offered_traffic, 0.0);
    }

    #[rstest]
    #[case::fractional(vec![0.5, 0.0, 0.5, 0.0, 0.5, 0.0], "fractional")]
    #[case::dead_end(vec![1.0, 0.0, 0.0, 0.0, 0.0, 0.0], "stops at B")]
    #[case::branching(vec![1.0, 0.0, 1.0, 0.0, 1.0, 0.0], "2 links leave A")]
    #[case::fragment(vec![0.0, 0.0, 1.0, 1.0, 1.0, 0.0], "disconnected")]
    #[case::loop_back(vec![1.0, 1.0, 0.0, 0.0, 0.0, 0.0], "revisits A")]
    fn rejects_malformed_support(
        ring: Network,
        #[case] values: Vec<f64>,
        #[case] reason_fragment: &str,
    ) {
        match unsplittable(&ring, values) {
            Err(RoutingError::MalformedSolution { demand, reason }) => {
                assert_eq!(demand, DemandId(0));
                assert!(reason.contains(reason_fragment), "{reason}");
            }
            other => panic!("expected malformed solution, got {other:?}"),
        }
    }

    #[rstest]
    fn non_optimal_status_is_rejected(ring: Network) {
        let model = UnsplittableFlowFormulation::new().build(&ring).unwrap();
        let solution = Solution::new(SolutionStatus::Infeasible, "no solution");
        let err = map_unsplittable_solution(&ring, &model, &solution, 0.001).unwrap_err();
        assert!(matches!(
            err,
            RoutingError::InfeasibleOrSuboptimal {
                status: SolutionStatus::Infeasible,
                ..
            }
        ));
    }

    #[rstest]
    fn short_primal_vector_is_a_solver_failure(ring: Network) {
        let model = UnsplittableFlowFormulation::new().build(&ring).unwrap();
        let solution = Solution::optimal(0.0, vec![1.0]);
        let err = map_unsplittable_solution(&ring, &model, &solution, 0.001).unwrap_err();
        assert!(matches!(err, RoutingError::Solver(_)));
    }

    fn wavelength_model(network: &Network) -> WavelengthModel {
        let routes = PathGenerator::hops(network).generate_all(2).unwrap();
        WavelengthRoutingFormulation::new(2, false)
            .build(network, routes)
            .unwrap()
    }

    #[rstest]
    fn splits_traffic_over_routes_and_drops_noise(ring: Network) {
        let model = wavelength_model(&ring);
        // Routes: p0 = [A->C], p1 = [A->B, B->C]; columns are wavelengths 0 and 1.
        let values = vec![1.0, 0.6, 0.0004, 0.4];
        let solution = Solution::optimal(0.0, values.clone());
        let assignment = map_wavelength_solution(&ring, &model, &solution, 0.001).unwrap();

        let routing = assignment.demand(DemandId(0)).unwrap();
        assert_eq!(routing.routes.len(), 2);
        assert_eq!(routing.routes[0].links, vec![LinkId(4)]);
        assert_eq!(routing.routes[0].wavelengths, vec![0, 1]);
        assert!((routing.routes[0].carried_traffic - 1.6).abs() < 1e-9);
        assert_eq!(routing.routes[1].wavelengths, vec![1]);

        let from_assignment = assignment.link_loads(ring.num_links());
        let from_primal = model.implied_link_loads(ring.num_links(), &values).unwrap();
        for (a, b) in from_assignment.iter().zip(&from_primal) {
            assert!((a - b).abs() <= 0.001, "{a} vs {b}");
        }
    }

    #[rstest]
    fn noise_only_routes_are_pruned(ring: Network) {
        let model = wavelength_model(&ring);
        let solution = Solution::optimal(0.0, vec![1.0, 1.0, 0.0002, 0.0003]);
        let assignment = map_wavelength_solution(&ring, &model, &solution, 0.001).unwrap();
        assert_eq!(assignment.num_routes(), 1);
    }

    #[rstest]
    fn over_carrying_demand_is_malformed(ring: Network) {
        let model = wavelength_model(&ring);
        let solution = Solution::optimal(0.0, vec![1.0, 1.0, 1.0, 0.0]);
        let err = map_wavelength_solution(&ring, &model, &solution, 0.001).unwrap_err();
        assert!(matches!(err, RoutingError::MalformedSolution { .. }));
    }
}
