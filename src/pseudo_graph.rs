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

//! The per-route pseudo-graph : a DAG layered by stop position whose nodes
//! are link candidates. A shortest path from the virtual source to the
//! virtual sink jointly picks one candidate per stop and the inter-stop
//! walks between them.
//!
//! Layers make a full Dijkstra unnecessary : relaxing layer by layer in
//! stop order is already topological order.
//!
//! When two adjacent candidates have no walk between them and artificial
//! links are enabled, the edge survives as a *direct connection* : the
//! commit phase will synthesize an artificial link between the two
//! candidate links. A heavy penalty keeps such edges out of any solution
//! that can do without them.

use crate::candidates::LinkCandidate;
use crate::config::MapperConfig;
use crate::geometry::{distance, Coord};
use crate::model::network::{LinkIdx, Network};
use crate::router::ModeRouter;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Added to the stop-attachment penalty of artificial candidates and to
/// direct-connection edges. Any solution over real links beats any solution
/// touching an artificial construct at the same position.
const ARTIFICIAL_PENALTY: f64 = 1_000_000.0;

/// Why a route could not be mapped. These are per-route values, not
/// errors : the batch carries on and reports them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnmappableReason {
    /// a stop of the route has no link candidate on the route's mode
    NoCandidates { stop_id: String },
    /// no combination of candidates is connected by the network
    SinkUnreachable,
    /// a pseudo-graph edge weight came out NaN
    NonFiniteCost,
    /// the per-route wall-clock budget elapsed
    Timeout,
    /// an inter-stop walk is longer than allowed relative to the beeline
    TravelCostExceeded { from_stop: String, to_stop: String },
    /// the batch was cancelled before this route was solved
    Cancelled,
}

impl Display for UnmappableReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            UnmappableReason::NoCandidates { stop_id } => {
                write!(f, "stop `{}` has no link candidate", stop_id)
            }
            UnmappableReason::SinkUnreachable => {
                write!(f, "no connected candidate combination")
            }
            UnmappableReason::NonFiniteCost => write!(f, "non-finite routing cost"),
            UnmappableReason::Timeout => write!(f, "route solve timeout elapsed"),
            UnmappableReason::TravelCostExceeded { from_stop, to_stop } => {
                write!(
                    f,
                    "path between stops `{}` and `{}` exceeds the travel cost bound",
                    from_stop, to_stop
                )
            }
            UnmappableReason::Cancelled => write!(f, "batch cancelled"),
        }
    }
}

/// One stop position of the route being solved.
pub(crate) struct StopContext<'a> {
    pub(crate) stop_id: &'a str,
    pub(crate) coord: Coord,
    pub(crate) candidates: &'a [LinkCandidate],
}

/// An inter-stop segment of the solution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum InterStopPath {
    /// walk from the first candidate's to-node to the second candidate's
    /// from-node ; empty when the links are adjacent or identical
    Links(Vec<LinkIdx>),
    /// no walk exists, the commit phase must synthesize an artificial
    /// connection link
    DirectConnection,
}

/// The solver's decision for one route.
#[derive(Debug)]
pub(crate) struct RouteSolution {
    /// one chosen candidate per stop position
    pub(crate) chosen: Vec<LinkCandidate>,
    /// inter-stop segments, one per adjacent stop pair
    pub(crate) paths: Vec<InterStopPath>,
}

#[derive(Clone)]
struct NodeState {
    cost: f64,
    /// index of the predecessor in the previous layer
    pred: usize,
    /// segment from the predecessor's link to this candidate's link
    path: InterStopPath,
}

pub(crate) fn solve(
    network: &Network,
    router: &ModeRouter,
    stops: &[StopContext<'_>],
    config: &MapperConfig,
    deadline: Option<Instant>,
) -> Result<RouteSolution, UnmappableReason> {
    debug_assert!(!stops.is_empty());
    for stop in stops {
        if stop.candidates.is_empty() {
            return Err(UnmappableReason::NoCandidates {
                stop_id: stop.stop_id.to_string(),
            });
        }
    }

    let penalty = |candidate: &LinkCandidate| -> f64 {
        let distance_part = if config.routing_with_candidate_distance {
            candidate.distance
        } else {
            0.0
        };
        if candidate.artificial {
            distance_part + ARTIFICIAL_PENALTY
        } else {
            distance_part
        }
    };

    // SOURCE -> first layer : the attachment penalty is the whole weight
    let mut layers: Vec<Vec<NodeState>> = Vec::with_capacity(stops.len());
    layers.push(
        stops[0]
            .candidates
            .iter()
            .map(|candidate| NodeState {
                cost: penalty(candidate),
                pred: 0,
                path: InterStopPath::Links(Vec::new()),
            })
            .collect(),
    );

    for position in 0..stops.len() - 1 {
        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                return Err(UnmappableReason::Timeout);
            }
        }
        let next_candidates = stops[position + 1].candidates;
        let mut next_layer = vec![
            NodeState {
                cost: f64::INFINITY,
                pred: 0,
                path: InterStopPath::Links(Vec::new()),
            };
            next_candidates.len()
        ];
        for (from_idx, from_state) in layers[position].iter().enumerate() {
            if !from_state.cost.is_finite() {
                continue;
            }
            let from_candidate = &stops[position].candidates[from_idx];
            for (to_idx, to_candidate) in next_candidates.iter().enumerate() {
                let (weight, path) = if from_candidate.link == to_candidate.link {
                    // the stop is served twice on the same link : no routing
                    (penalty(to_candidate), InterStopPath::Links(Vec::new()))
                } else {
                    match router.least_cost(network, from_candidate.link, to_candidate.link) {
                        Some(result) => (
                            penalty(to_candidate) + result.cost,
                            InterStopPath::Links(result.links),
                        ),
                        None if config.use_artificial_links => {
                            let from_node = network.link(from_candidate.link).to;
                            let to_node = network.link(to_candidate.link).from;
                            let gap = distance(
                                &network.node(from_node).coord,
                                &network.node(to_node).coord,
                            );
                            (
                                penalty(to_candidate) + ARTIFICIAL_PENALTY + gap,
                                InterStopPath::DirectConnection,
                            )
                        }
                        None => continue,
                    }
                };
                if weight.is_nan() {
                    return Err(UnmappableReason::NonFiniteCost);
                }
                let total = from_state.cost + weight;
                // strict improvement only : on a tie the first candidate in
                // (distance, link id) order keeps the slot
                if total < next_layer[to_idx].cost {
                    next_layer[to_idx] = NodeState {
                        cost: total,
                        pred: from_idx,
                        path,
                    };
                }
            }
        }
        layers.push(next_layer);
    }

    // last layer -> SINK : all weights zero, pick the cheapest node,
    // breaking ties by lowest link id
    let last_layer = layers.last().expect("layers cannot be empty");
    let last_candidates = stops[stops.len() - 1].candidates;
    let mut best: Option<usize> = None;
    for (idx, state) in last_layer.iter().enumerate() {
        if !state.cost.is_finite() {
            continue;
        }
        best = match best {
            None => Some(idx),
            Some(current) => {
                let current_cost = last_layer[current].cost;
                if state.cost < current_cost
                    || (state.cost == current_cost
                        && network.link(last_candidates[idx].link).id
                            < network.link(last_candidates[current].link).id)
                {
                    Some(idx)
                } else {
                    Some(current)
                }
            }
        };
    }
    let mut cursor = match best {
        Some(idx) => idx,
        None => return Err(UnmappableReason::SinkUnreachable),
    };

    let mut chosen = Vec::with_capacity(stops.len());
    let mut paths: Vec<InterStopPath> = Vec::with_capacity(stops.len() - 1);
    for position in (0..stops.len()).rev() {
        let state = &layers[position][cursor];
        chosen.push(stops[position].candidates[cursor].clone());
        if position > 0 {
            paths.push(state.path.clone());
            cursor = state.pred;
        }
    }
    chosen.reverse();
    paths.reverse();

    if let Some(factor) = config.max_travel_cost_factor {
        check_travel_cost(network, stops, &chosen, &paths, factor)?;
    }

    Ok(RouteSolution { chosen, paths })
}

/// Guard against implausible detours : an inter-stop walk much longer than
/// the beeline between the stops makes the route unmappable. Direct
/// connections are exempt, they already pay the artificial penalty.
fn check_travel_cost(
    network: &Network,
    stops: &[StopContext<'_>],
    chosen: &[LinkCandidate],
    paths: &[InterStopPath],
    factor: f64,
) -> Result<(), UnmappableReason> {
    for position in 0..paths.len() {
        let links = match &paths[position] {
            InterStopPath::Links(links) => links,
            InterStopPath::DirectConnection => continue,
        };
        let beeline = distance(&stops[position].coord, &stops[position + 1].coord);
        if beeline <= 0.0 {
            continue;
        }
        let walk_length: f64 = links
            .iter()
            .map(|idx| network.link(*idx).length)
            .sum::<f64>()
            + network.link(chosen[position + 1].link).length;
        if walk_length > factor * beeline {
            return Err(UnmappableReason::TravelCostExceeded {
                from_stop: stops[position].stop_id.to_string(),
                to_stop: stops[position + 1].stop_id.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NetworkBuilder;
    use crate::config::{MapperConfig, TravelCostType};
    use crate::router::ModeRouter;
    use std::collections::BTreeSet;

    fn modes(names: &[&str]) -> BTreeSet<String> {
        names.iter().map(|name| name.to_string()).collect()
    }

    fn candidate(network: &Network, link_id: &str, distance: f64) -> LinkCandidate {
        LinkCandidate {
            link: network.link_idx(link_id).unwrap(),
            distance,
            artificial: false,
        }
    }

    fn line_network() -> Network {
        NetworkBuilder::new()
            .node("a", 0.0, 0.0)
            .node("b", 100.0, 0.0)
            .node("c", 200.0, 0.0)
            .link("ab", "a", "b", |link| {
                link.modes(&["bus"]);
            })
            .link("bc", "b", "c", |link| {
                link.modes(&["bus"]);
            })
            .build()
    }

    #[test]
    fn joint_choice_beats_greedy_nearest() {
        // the nearest candidate for the first stop cannot reach the second
        // stop's only candidate, so the solver must take the farther one
        let network = NetworkBuilder::new()
            .node("a", 0.0, 0.0)
            .node("b", 100.0, 0.0)
            .node("x", 0.0, 50.0)
            .node("y", 100.0, 50.0)
            .link("ab", "a", "b", |link| {
                link.modes(&["bus"]);
            })
            .link("xy", "x", "y", |link| {
                link.modes(&["bus"]);
            })
            .build();
        let router = ModeRouter::new(&network, &modes(&["bus"]), TravelCostType::LinkLength, None);
        let mut config = MapperConfig::default();
        config.use_artificial_links = false;

        let first = vec![
            candidate(&network, "xy", 10.0),
            candidate(&network, "ab", 40.0),
        ];
        let second = vec![candidate(&network, "ab", 0.0)];
        let stops = vec![
            StopContext {
                stop_id: "s1",
                coord: Coord::new(0.0, 10.0),
                candidates: &first,
            },
            StopContext {
                stop_id: "s2",
                coord: Coord::new(100.0, 0.0),
                candidates: &second,
            },
        ];

        let solution = solve(&network, &router, &stops, &config, None).unwrap();
        assert_eq!(network.link(solution.chosen[0].link).id, "ab");
        assert_eq!(network.link(solution.chosen[1].link).id, "ab");
        assert_eq!(solution.paths[0], InterStopPath::Links(Vec::new()));
    }

    #[test]
    fn artificial_candidates_lose_to_real_paths() {
        let network = NetworkBuilder::new()
            .node("a", 0.0, 0.0)
            .node("b", 100.0, 0.0)
            .node("c", 200.0, 0.0)
            .node("pt", 150.0, 20.0)
            .link("ab", "a", "b", |link| {
                link.modes(&["bus"]);
            })
            .link("bc", "b", "c", |link| {
                link.modes(&["bus"]);
            })
            .link("pt_loop", "pt", "pt", |link| {
                link.modes(&["bus"]).length(1.0);
            })
            .build();
        let router = ModeRouter::new(&network, &modes(&["bus"]), TravelCostType::LinkLength, None);
        let config = MapperConfig::default();

        let first = vec![candidate(&network, "ab", 0.0)];
        let second = vec![
            LinkCandidate {
                link: network.link_idx("pt_loop").unwrap(),
                distance: 0.0,
                artificial: true,
            },
            candidate(&network, "bc", 20.0),
        ];
        let stops = vec![
            StopContext {
                stop_id: "s1",
                coord: Coord::new(50.0, 0.0),
                candidates: &first,
            },
            StopContext {
                stop_id: "s2",
                coord: Coord::new(150.0, 20.0),
                candidates: &second,
            },
        ];

        let solution = solve(&network, &router, &stops, &config, None).unwrap();
        // the artificial loop is nearer but carries the huge penalty
        assert_eq!(network.link(solution.chosen[1].link).id, "bc");
        assert_eq!(solution.paths[0], InterStopPath::Links(Vec::new()));
    }

    #[test]
    fn disconnected_candidates_get_a_direct_connection() {
        let network = NetworkBuilder::new()
            .node("a", 0.0, 0.0)
            .node("b", 100.0, 0.0)
            .node("x", 0.0, 500.0)
            .node("y", 100.0, 500.0)
            .link("ab", "a", "b", |link| {
                link.modes(&["bus"]);
            })
            .link("xy", "x", "y", |link| {
                link.modes(&["bus"]);
            })
            .build();
        let router = ModeRouter::new(&network, &modes(&["bus"]), TravelCostType::LinkLength, None);
        let first = vec![candidate(&network, "ab", 0.0)];
        let second = vec![candidate(&network, "xy", 0.0)];
        let stops = vec![
            StopContext {
                stop_id: "s1",
                coord: Coord::new(50.0, 0.0),
                candidates: &first,
            },
            StopContext {
                stop_id: "s2",
                coord: Coord::new(50.0, 500.0),
                candidates: &second,
            },
        ];

        let config = MapperConfig::default();
        let solution = solve(&network, &router, &stops, &config, None).unwrap();
        assert_eq!(solution.paths[0], InterStopPath::DirectConnection);

        let mut config = MapperConfig::default();
        config.use_artificial_links = false;
        assert_eq!(
            solve(&network, &router, &stops, &config, None).unwrap_err(),
            UnmappableReason::SinkUnreachable
        );
    }

    #[test]
    fn missing_candidates_name_the_stop() {
        let network = line_network();
        let router = ModeRouter::new(&network, &modes(&["bus"]), TravelCostType::LinkLength, None);
        let config = MapperConfig::default();
        let first = vec![candidate(&network, "ab", 0.0)];
        let second: Vec<LinkCandidate> = Vec::new();
        let stops = vec![
            StopContext {
                stop_id: "s1",
                coord: Coord::new(0.0, 0.0),
                candidates: &first,
            },
            StopContext {
                stop_id: "lost",
                coord: Coord::new(100.0, 0.0),
                candidates: &second,
            },
        ];
        assert_eq!(
            solve(&network, &router, &stops, &config, None).unwrap_err(),
            UnmappableReason::NoCandidates {
                stop_id: "lost".to_string()
            }
        );
    }

    #[test]
    fn single_stop_routes_pick_the_best_candidate() {
        let network = line_network();
        let router = ModeRouter::new(&network, &modes(&["bus"]), TravelCostType::LinkLength, None);
        let config = MapperConfig::default();
        let only = vec![
            candidate(&network, "bc", 25.0),
            candidate(&network, "ab", 5.0),
        ];
        let stops = vec![StopContext {
            stop_id: "s1",
            coord: Coord::new(50.0, 5.0),
            candidates: &only,
        }];
        let solution = solve(&network, &router, &stops, &config, None).unwrap();
        assert_eq!(solution.chosen.len(), 1);
        assert!(solution.paths.is_empty());
        assert_eq!(network.link(solution.chosen[0].link).id, "ab");
    }

    #[test]
    fn travel_cost_guard_rejects_huge_detours() {
        // the only walk between the stops loops far away
        let network = NetworkBuilder::new()
            .node("a", 0.0, 0.0)
            .node("b", 100.0, 0.0)
            .node("far", 100.0, 5000.0)
            .node("c", 200.0, 0.0)
            .link("ab", "a", "b", |link| {
                link.modes(&["bus"]);
            })
            .link("up", "b", "far", |link| {
                link.modes(&["bus"]).length(5000.0);
            })
            .link("down", "far", "c", |link| {
                link.modes(&["bus"]).length(5000.0);
            })
            .build();
        let router = ModeRouter::new(&network, &modes(&["bus"]), TravelCostType::LinkLength, None);
        let mut config = MapperConfig::default();
        config.max_travel_cost_factor = Some(5.0);

        let first = vec![candidate(&network, "ab", 0.0)];
        let second = vec![candidate(&network, "down", 0.0)];
        let stops = vec![
            StopContext {
                stop_id: "s1",
                coord: Coord::new(50.0, 0.0),
                candidates: &first,
            },
            StopContext {
                stop_id: "s2",
                coord: Coord::new(150.0, 0.0),
                candidates: &second,
            },
        ];
        assert!(matches!(
            solve(&network, &router, &stops, &config, None).unwrap_err(),
            UnmappableReason::TravelCostExceeded { .. }
        ));
    }
}
