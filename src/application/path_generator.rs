// Candidate path generation: k shortest loopless paths (Yen) over a link cost function

use std::cmp::{Ordering, Reverse};
use std::collections::{BTreeSet, BinaryHeap, HashSet};

use tracing::debug;

use crate::domain::{
    network::{Demand, DemandId, Link, LinkId, Network, NodeId},
    routing::CandidateRoute,
    routing_error::{Result, RoutingError},
};

/// Default link cost: every link counts as one hop.
pub fn hop_count(_link: &Link) -> f64 {
    1.0
}

/// Path ranked by cost, then by the lexicographic order of its link ids.
#[derive(Debug, Clone)]
struct RankedPath {
    cost: f64,
    links: Vec<LinkId>,
}

impl Ord for RankedPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.cost
            .total_cmp(&other.cost)
            .then_with(|| self.links.cmp(&other.links))
    }
}

impl PartialOrd for RankedPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for RankedPath {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankedPath {}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Label {
    path: RankedPath,
    node: NodeId,
}

/// Shortest-path search over a network with a fixed cost function.
struct Search<'a, C> {
    network: &'a Network,
    cost: &'a C,
}

impl<'a, C> Search<'a, C>
where
    C: Fn(&Link) -> f64,
{
    fn path_cost(&self, links: &[LinkId]) -> f64 {
        links
            .iter()
            .filter_map(|id| self.network.link(*id))
            .map(|link| (self.cost)(link))
            .sum()
    }

    /// Nodes visited by `links` when starting at `source`.
    fn path_nodes(&self, source: NodeId, links: &[LinkId]) -> Vec<NodeId> {
        let mut nodes = Vec::with_capacity(links.len() + 1);
        nodes.push(source);
        nodes.extend(
            links
                .iter()
                .filter_map(|id| self.network.link(*id))
                .map(|link| link.destination),
        );
        nodes
    }

    /// Dijkstra from `source` to `target` avoiding the banned links and nodes.
    ///
    /// Labels are popped in (cost, link sequence) order, so among equal-cost
    /// paths the lexicographically smallest one wins.
    fn shortest(
        &self,
        source: NodeId,
        target: NodeId,
        banned_links: &HashSet<LinkId>,
        banned_nodes: &HashSet<NodeId>,
    ) -> Option<RankedPath> {
        let mut settled = vec![false; self.network.num_nodes()];
        let mut heap = BinaryHeap::new();
        heap.push(Reverse(Label {
            path: RankedPath {
                cost: 0.0,
                links: Vec::new(),
            },
            node: source,
        }));

        while let Some(Reverse(label)) = heap.pop() {
            let visited = settled.get_mut(label.node.index())?;
            if *visited {
                continue;
            }
            *visited = true;

            if label.node == target {
                return Some(label.path);
            }

            for &link_id in self.network.outgoing_links(label.node) {
                if banned_links.contains(&link_id) {
                    continue;
                }
                let Some(link) = self.network.link(link_id) else {
                    continue;
                };
                let next = link.destination;
                if banned_nodes.contains(&next)
                    || settled.get(next.index()).copied().unwrap_or(true)
                {
                    continue;
                }

                let mut links = label.path.links.clone();
                links.push(link_id);
                heap.push(Reverse(Label {
                    path: RankedPath {
                        cost: label.path.cost + (self.cost)(link),
                        links,
                    },
                    node: next,
                }));
            }
        }

        None
    }
}

/// Lazy sequence of loopless paths for one demand in non-decreasing cost order.
///
/// Each call to `next` runs one Yen iteration. The sequence is finite and
/// cannot be restarted.
pub struct KShortestPaths<'a, C> {
    search: Search<'a, C>,
    demand: DemandId,
    source: NodeId,
    target: NodeId,
    accepted: Vec<RankedPath>,
    candidates: BTreeSet<RankedPath>,
    started: bool,
    exhausted: bool,
}

impl<'a, C> KShortestPaths<'a, C>
where
    C: Fn(&Link) -> f64,
{
    fn accept(&mut self, path: RankedPath) -> CandidateRoute {
        self.accepted.push(path.clone());
        CandidateRoute {
            demand: self.demand,
            links: path.links,
            cost: path.cost,
        }
    }

    fn collect_deviations(&mut self) {
        let Some(last) = self.accepted.last() else {
            return;
        };
        let last_links = last.links.clone();
        let nodes = self.search.path_nodes(self.source, &last_links);

        for (i, &spur_node) in nodes.iter().enumerate().take(last_links.len()) {
            let root = &last_links[..i];

            let banned_links: HashSet<LinkId> = self
                .accepted
                .iter()
                .filter(|p| p.links.len() > i && p.links[..i] == *root)
                .map(|p| p.links[i])
                .collect();
            let banned_nodes: HashSet<NodeId> = nodes[..i].iter().copied().collect();

            let Some(spur) =
                self.search
                    .shortest(spur_node, self.target, &banned_links, &banned_nodes)
            else {
                continue;
            };

            let mut links = root.to_vec();
            links.extend(spur.links);
            let candidate = RankedPath {
                cost: self.search.path_cost(&links),
                links,
            };
            if !self.accepted.contains(&candidate) {
                self.candidates.insert(candidate);
            }
        }
    }
}

impl<'a, C> Iterator for KShortestPaths<'a, C>
where
    C: Fn(&Link) -> f64,
{
    type Item = CandidateRoute;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }

        if !self.started {
            self.started = true;
            let first = self.search.shortest(
                self.source,
                self.target,
                &HashSet::new(),
                &HashSet::new(),
            );
            return match first {
                Some(path) => Some(self.accept(path)),
                None => {
                    self.exhausted = true;
                    None
                }
            };
        }

        self.collect_deviations();
        match self.candidates.pop_first() {
            Some(path) => Some(self.accept(path)),
            None => {
                self.exhausted = true;
                None
            }
        }
    }
}

/// Generates candidate routes over one network with one cost function.
pub struct PathGenerator<'a, C> {
    network: &'a Network,
    cost: C,
}

impl<'a> PathGenerator<'a, fn(&Link) -> f64> {
    /// Generator using hop count as link cost.
    pub fn hops(network: &'a Network) -> Self {
        Self {
            network,
            cost: hop_count,
        }
    }
}

impl<'a, C> PathGenerator<'a, C>
where
    C: Fn(&Link) -> f64,
{
    /// Rejects cost functions yielding negative or non-finite link costs.
    pub fn new(network: &'a Network, cost: C) -> Result<Self> {
        if let Some(link) = network.links().iter().find(|&l| {
            let c = cost(l);
            !c.is_finite() || c < 0.0
        }) {
            return Err(RoutingError::InvalidConfig(format!(
                "link cost of {} must be finite and non-negative, got {}",
                link.id,
                cost(link)
            )));
        }
        Ok(Self { network, cost })
    }

    /// Lazy path sequence for `demand`, not bounded by k.
    pub fn paths(&self, demand: &Demand) -> KShortestPaths<'_, C> {
        KShortestPaths {
            search: Search {
                network: self.network,
                cost: &self.cost,
            },
            demand: demand.id,
            source: demand.ingress,
            target: demand.egress,
            accepted: Vec::new(),
            candidates: BTreeSet::new(),
            started: false,
            exhausted: false,
        }
    }

    /// Up to `k` loopless paths for `demand`; none at all is an error.
    pub fn generate(&self, demand: &Demand, k: usize) -> Result<Vec<CandidateRoute>> {
        let routes: Vec<CandidateRoute> = self.paths(demand).take(k).collect();
        if routes.is_empty() {
            return Err(RoutingError::NoAdmissiblePath {
                demand: demand.id,
                ingress: self.network.node_name(demand.ingress),
                egress: self.network.node_name(demand.egress),
            });
        }
        debug!(
            demand = %demand.id,
            paths = routes.len(),
            "generated candidate paths"
        );
        Ok(routes)
    }

    /// Candidate routes of every demand, pooled in demand id order.
    pub fn generate_all(&self, k: usize) -> Result<Vec<CandidateRoute>> {
        let mut pooled = Vec::new();
        for demand in self.network.demands() {
            pooled.extend(self.generate(demand, k)?);
        }
        Ok(pooled)
    }

    /// Fails with `NoAdmissiblePath` for the first demand whose egress is unreachable.
    pub fn ensure_reachable(&self) -> Result<()> {
        for demand in self.network.demands() {
            self.generate(demand, 1)?;
        }
        Ok(())
    }
}

/// Up to `k` loopless paths from the demand's ingress to its egress, cheapest first.
pub fn generate<C>(
    network: &Network,
    demand: &Demand,
    k: usize,
    cost: C,
) -> Result<Vec<CandidateRoute>>
where
    C: Fn(&Link) -> f64,
{
    PathGenerator::new(network, cost)?.generate(demand, k)
}
