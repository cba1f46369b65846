// Copyright  (C) 2021, Hove and/or its affiliates. All rights reserved.
//
// This file is part of Navitia,
// the software to build cool stuff with public transport.
//
// Hope you'll enjoy and contribute to this project,
// powered by Hove (www.kisio.com).
// Help us simplify mobility and open public transport:
// a non ending quest to the responsive locomotion way of traveling!
//
// This contribution is a part of the research and development work of the
// IVA Project which aims to enhance traveler information and is carried out
// under the leadership of the Technological Research Institute SystemX,
// with the partnership and support of the transport organization authority
// Ile-De-France Mobilités (IDFM), SNCF, and public funds
// under the scope of the French Program "Investissements d’Avenir".
//
// LICENCE: This program is free software; you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <http://www.gnu.org/licenses/>.
//
// Stay tuned using
// twitter @navitia
// channel `#navitia` on riot https://riot.im/app/#/room/#navitia:matrix.org
// https://groups.google.com/d/forum/navitia
// www.navitia.io

//! The schedule router family : one router per schedule transport mode,
//! each a least-cost-path oracle over the subgraph of links legal for that
//! mode.
//!
//! Routers memoize whole single-source shortest-path trees, so the many
//! queries sharing a source during one pseudo-graph construction pay for
//! one Dijkstra run. The cache sits behind a read/write lock and is shared
//! by all workers of the batch.

use crate::config::{MapperConfig, TravelCostType};
use crate::model::network::{Link, LinkIdx, Network, NodeIdx};
use crate::model::shape::RouteShape;
use crate::model::schedule::TransitSchedule;
use std::cmp::Ordering;
use std::collections::{BTreeSet, BinaryHeap, HashMap};
use std::sync::{Arc, RwLock};

#[derive(Debug)]
pub(crate) struct PathResult {
    /// traversal cost of both endpoint links plus the walk between them
    pub(crate) cost: f64,
    /// walk from the source link's to-node to the target link's from-node
    pub(crate) links: Vec<LinkIdx>,
}

/// Scales link costs by their distance to a route shape : links hugging the
/// shape keep their cost, links far from it pay up to `ceiling` times more.
pub(crate) struct ShapeBias<'a> {
    pub(crate) shape: &'a RouteShape,
    pub(crate) tolerance: f64,
    pub(crate) ceiling: f64,
}

impl<'a> ShapeBias<'a> {
    fn factor(&self, network: &Network, link: &Link) -> f64 {
        let from_distance = self.shape.distance_to(&network.node(link.from).coord);
        let to_distance = self.shape.distance_to(&network.node(link.to).coord);
        let distance = from_distance.max(to_distance);
        if distance <= self.tolerance {
            1.0
        } else {
            (1.0 + (distance - self.tolerance) / self.tolerance).min(self.ceiling)
        }
    }
}

struct ShortestPathTree {
    dist: Vec<f64>,
    parent: Vec<Option<(NodeIdx, LinkIdx)>>,
}

pub(crate) struct ModeRouter {
    allowed: Vec<bool>,
    link_cost: Vec<f64>,
    trees: RwLock<HashMap<usize, Arc<ShortestPathTree>>>,
}

impl ModeRouter {
    pub(crate) fn new(
        network: &Network,
        network_modes: &BTreeSet<String>,
        cost_type: TravelCostType,
        shape_bias: Option<ShapeBias<'_>>,
    ) -> Self {
        let mut allowed = Vec::with_capacity(network.nb_of_links());
        let mut link_cost = Vec::with_capacity(network.nb_of_links());
        for (_, link) in network.links() {
            let legal = link.permits_any_of(network_modes);
            allowed.push(legal);
            let cost = if legal {
                let base = match cost_type {
                    TravelCostType::LinkLength => link.length,
                    TravelCostType::TravelTime => {
                        if link.freespeed > 0.0 {
                            link.length / link.freespeed
                        } else {
                            f64::INFINITY
                        }
                    }
                };
                match &shape_bias {
                    Some(bias) => base * bias.factor(network, link),
                    None => base,
                }
            } else {
                f64::INFINITY
            };
            link_cost.push(cost);
        }
        Self {
            allowed,
            link_cost,
            trees: RwLock::new(HashMap::new()),
        }
    }

    pub(crate) fn link_cost(&self, link: LinkIdx) -> f64 {
        self.link_cost[link.idx]
    }

    /// Least-cost walk from `from`'s to-node to `to`'s from-node, with the
    /// endpoint traversal costs added. None when no walk exists on the
    /// mode-restricted subgraph.
    ///
    /// Each endpoint contributes half its traversal cost : chaining the
    /// edges of a pseudo-graph then prices every link of the route once,
    /// consistently with the same-link rule that skips routing entirely.
    pub(crate) fn least_cost(
        &self,
        network: &Network,
        from: LinkIdx,
        to: LinkIdx,
    ) -> Option<PathResult> {
        let start = network.link(from).to;
        let target = network.link(to).from;
        let tree = self.tree(network, start);
        let walk_cost = tree.dist[target.idx];
        if !walk_cost.is_finite() {
            return None;
        }
        let mut links = Vec::new();
        let mut node = target;
        while node != start {
            let (previous, link) = tree.parent[node.idx]?;
            links.push(link);
            node = previous;
        }
        links.reverse();
        Some(PathResult {
            cost: 0.5 * self.link_cost[from.idx] + walk_cost + 0.5 * self.link_cost[to.idx],
            links,
        })
    }

    fn tree(&self, network: &Network, source: NodeIdx) -> Arc<ShortestPathTree> {
        {
            let trees = self.trees.read().expect("router cache lock poisoned");
            if let Some(tree) = trees.get(&source.idx) {
                return tree.clone();
            }
        }
        let tree = Arc::new(self.compute_tree(network, source));
        let mut trees = self.trees.write().expect("router cache lock poisoned");
        trees.entry(source.idx).or_insert(tree).clone()
    }

    fn compute_tree(&self, network: &Network, source: NodeIdx) -> ShortestPathTree {
        let nb_of_nodes = network.nb_of_nodes();
        let mut dist = vec![f64::INFINITY; nb_of_nodes];
        let mut parent: Vec<Option<(NodeIdx, LinkIdx)>> = vec![None; nb_of_nodes];
        let mut heap = BinaryHeap::new();
        dist[source.idx] = 0.0;
        heap.push(QueueEntry {
            cost: 0.0,
            node: source.idx,
        });

        while let Some(entry) = heap.pop() {
            if entry.cost > dist[entry.node] {
                continue;
            }
            let node = NodeIdx { idx: entry.node };
            for &link_idx in network.out_links(node) {
                if !self.allowed[link_idx.idx] {
                    continue;
                }
                let link_cost = self.link_cost[link_idx.idx];
                if !link_cost.is_finite() {
                    continue;
                }
                let link = network.link(link_idx);
                let next = link.to.idx;
                let next_cost = entry.cost + link_cost;
                // on equal cost the lexicographically lowest incoming link
                // id wins, which keeps results deterministic
                let better = next_cost < dist[next]
                    || (next_cost == dist[next]
                        && match parent[next] {
                            Some((_, current)) => link.id < network.link(current).id,
                            None => false,
                        });
                if better {
                    dist[next] = next_cost;
                    parent[next] = Some((node, link_idx));
                    heap.push(QueueEntry {
                        cost: next_cost,
                        node: next,
                    });
                }
            }
        }
        ShortestPathTree { dist, parent }
    }
}

#[derive(Copy, Clone, PartialEq)]
struct QueueEntry {
    cost: f64,
    node: usize,
}

impl Eq for QueueEntry {}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max-heap : reverse to pop the cheapest entry
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.node.cmp(&self.node))
    }
}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// One shared, cache-carrying router per schedule mode of the batch.
/// Shape-biased routers are built per route on demand : their link costs
/// depend on the route's shape, so their trees cannot be shared.
pub(crate) struct ScheduleRouters {
    by_mode: HashMap<String, Arc<ModeRouter>>,
}

impl ScheduleRouters {
    pub(crate) fn new(
        network: &Network,
        schedule: &TransitSchedule,
        config: &MapperConfig,
    ) -> Self {
        let schedule_modes: BTreeSet<String> = schedule
            .routes()
            .map(|(_, route)| route.mode.clone())
            .collect();
        let mut by_mode = HashMap::new();
        for schedule_mode in schedule_modes {
            if let Some(network_modes) = config.network_modes_of(&schedule_mode) {
                let router = ModeRouter::new(network, network_modes, config.travel_cost_type, None);
                by_mode.insert(schedule_mode, Arc::new(router));
            }
        }
        Self { by_mode }
    }

    pub(crate) fn router(
        &self,
        network: &Network,
        config: &MapperConfig,
        schedule_mode: &str,
        shape: Option<&RouteShape>,
    ) -> Option<Arc<ModeRouter>> {
        match shape {
            None => self.by_mode.get(schedule_mode).cloned(),
            Some(shape) => {
                let network_modes = config.network_modes_of(schedule_mode)?;
                let bias = ShapeBias {
                    shape,
                    tolerance: config.shape_distance_tolerance,
                    ceiling: config.shape_penalty_ceiling,
                };
                Some(Arc::new(ModeRouter::new(
                    network,
                    network_modes,
                    config.travel_cost_type,
                    Some(bias),
                )))
            }
        }
    }
}
