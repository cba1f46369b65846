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

//! Writes solver decisions back into the schedule and network, one route at
//! a time, in the single-threaded commit phase.
//!
//! Every stop ends up referencing a *child facility* bound to the chosen
//! link ; children are keyed by (parent id, link id) so two routes agreeing
//! on a link share one child. Identifier construction is a pure function of
//! the inputs, which makes the whole commit idempotent.

use crate::config::MapperConfig;
use crate::geometry::distance;
use crate::model::network::{LinkIdx, Network, NodeIdx, ARTIFICIAL_LINK_MODE};
use crate::model::schedule::{StopFacility, TransitSchedule};
use crate::pseudo_graph::{InterStopPath, RouteSolution};
use std::collections::{BTreeSet, HashMap};

/// State shared by all route commits of one batch : artificial connection
/// links are reused when several routes need the same node pair.
#[derive(Default)]
pub(crate) struct CommitContext {
    connections: HashMap<(NodeIdx, NodeIdx), LinkIdx>,
    pub(crate) created_artificial: Vec<String>,
}

impl CommitContext {
    pub(crate) fn new() -> Self {
        Self::default()
    }
}

pub(crate) fn commit_route(
    schedule: &mut TransitSchedule,
    network: &mut Network,
    context: &mut CommitContext,
    line_id: &str,
    route_id: &str,
    network_modes: &BTreeSet<String>,
    config: &MapperConfig,
    solution: &RouteSolution,
) {
    let parents: Vec<_> = match schedule.route(line_id, route_id) {
        Some(route) => route.stops.iter().map(|stop| stop.facility).collect(),
        None => return,
    };
    debug_assert_eq!(parents.len(), solution.chosen.len());

    // bind each stop to a facility carrying the chosen link
    let mut bound_facilities = Vec::with_capacity(parents.len());
    for (parent_idx, candidate) in parents.iter().zip(solution.chosen.iter()) {
        let link_id = network.link(candidate.link).id.clone();
        let parent = schedule.facility(*parent_idx).clone();
        if parent.link_id.as_deref() == Some(link_id.as_str()) {
            // remapping an already mapped schedule : the binding stands
            bound_facilities.push(*parent_idx);
            continue;
        }
        let child_id = format!("{}.link:{}", parent.id, link_id);
        let child_idx = match schedule.facility_idx(&child_id) {
            Some(existing) => existing,
            None => {
                let child = StopFacility {
                    id: child_id,
                    name: parent.name,
                    coord: parent.coord,
                    is_blocking: parent.is_blocking,
                    link_id: Some(link_id),
                };
                schedule
                    .add_facility(child)
                    .expect("child facility id was checked to be free")
            }
        };
        bound_facilities.push(child_idx);
    }

    // assemble the link sequence, collapsing consecutive repetitions
    let mut sequence: Vec<String> = Vec::new();
    let mut push = |sequence: &mut Vec<String>, id: String| {
        if sequence.last() != Some(&id) {
            sequence.push(id);
        }
    };
    push(
        &mut sequence,
        network.link(solution.chosen[0].link).id.clone(),
    );
    for (position, path) in solution.paths.iter().enumerate() {
        match path {
            InterStopPath::Links(links) => {
                for link in links {
                    push(&mut sequence, network.link(*link).id.clone());
                }
            }
            InterStopPath::DirectConnection => {
                let from_node = network.link(solution.chosen[position].link).to;
                let to_node = network.link(solution.chosen[position + 1].link).from;
                let connection =
                    connection_link(network, context, from_node, to_node, network_modes, config);
                push(&mut sequence, network.link(connection).id.clone());
            }
        }
        push(
            &mut sequence,
            network.link(solution.chosen[position + 1].link).id.clone(),
        );
    }

    if let Some(route) = schedule.route_mut(line_id, route_id) {
        for (stop, facility) in route.stops.iter_mut().zip(bound_facilities) {
            // offsets and the await-departure flag are untouched
            stop.facility = facility;
        }
        route.link_sequence = sequence;
    }
}

/// The artificial link joining two candidate links that have no walk
/// between them. One link per ordered node pair, shared by all routes.
fn connection_link(
    network: &mut Network,
    context: &mut CommitContext,
    from_node: NodeIdx,
    to_node: NodeIdx,
    network_modes: &BTreeSet<String>,
    config: &MapperConfig,
) -> LinkIdx {
    if let Some(&existing) = context.connections.get(&(from_node, to_node)) {
        for mode in network_modes {
            network.add_link_mode(existing, mode);
        }
        return existing;
    }
    let from = network.node(from_node);
    let to = network.node(to_node);
    let base = format!("{}_{}_art", from.id, to.id);
    let mut link_id = base.clone();
    let mut counter = 1u32;
    while network.contains_link_id(&link_id) {
        link_id = format!("{}.{}", base, counter);
        counter += 1;
    }
    let length = distance(&from.coord, &to.coord).max(1.0);
    let from_id = from.id.clone();
    let to_id = to.id.clone();
    let mut modes = network_modes.clone();
    modes.insert(ARTIFICIAL_LINK_MODE.to_string());
    let idx = network
        .add_link(
            link_id.clone(),
            &from_id,
            &to_id,
            length,
            config.artificial_link_freespeed,
            config.artificial_link_capacity,
            modes,
        )
        .expect("connection link id was made unique");
    context.connections.insert((from_node, to_node), idx);
    context.created_artificial.push(link_id);
    idx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::{NetworkBuilder, ScheduleBuilder};
    use crate::candidates::LinkCandidate;

    fn bus_modes() -> BTreeSet<String> {
        vec!["bus".to_string()].into_iter().collect()
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

    fn two_stop_schedule() -> TransitSchedule {
        ScheduleBuilder::new()
            .stop("s1", 50.0, 0.0)
            .stop("s2", 150.0, 0.0)
            .route("l1", "r1", |route| {
                route
                    .mode("bus")
                    .st("s1", "00:00:00", "00:00:00")
                    .st("s2", "00:02:00", "00:02:00");
            })
            .build()
    }

    fn solution_for(network: &Network, links: &[&str]) -> RouteSolution {
        RouteSolution {
            chosen: links
                .iter()
                .map(|id| LinkCandidate {
                    link: network.link_idx(id).unwrap(),
                    distance: 0.0,
                    artificial: false,
                })
                .collect(),
            paths: vec![InterStopPath::Links(Vec::new()); links.len() - 1],
        }
    }

    #[test]
    fn child_facilities_are_created_and_bound() {
        let mut network = line_network();
        let mut schedule = two_stop_schedule();
        let mut context = CommitContext::new();
        let config = MapperConfig::default();
        let solution = solution_for(&network, &["ab", "bc"]);

        commit_route(
            &mut schedule,
            &mut network,
            &mut context,
            "l1",
            "r1",
            &bus_modes(),
            &config,
            &solution,
        );

        let route = schedule.route("l1", "r1").unwrap();
        assert_eq!(route.link_sequence, vec!["ab", "bc"]);
        let first = schedule.facility(route.stops[0].facility);
        assert_eq!(first.id, "s1.link:ab");
        assert_eq!(first.link_id.as_deref(), Some("ab"));
        let second = schedule.facility(route.stops[1].facility);
        assert_eq!(second.id, "s2.link:bc");
        // the parents are still there, the finalizer decides their fate
        assert!(schedule.facility_idx("s1").is_some());
    }

    #[test]
    fn committing_twice_is_idempotent() {
        let mut network = line_network();
        let mut schedule = two_stop_schedule();
        let mut context = CommitContext::new();
        let config = MapperConfig::default();
        let solution = solution_for(&network, &["ab", "bc"]);

        commit_route(
            &mut schedule,
            &mut network,
            &mut context,
            "l1",
            "r1",
            &bus_modes(),
            &config,
            &solution,
        );
        let facilities_after_first = schedule.nb_of_facilities();
        commit_route(
            &mut schedule,
            &mut network,
            &mut context,
            "l1",
            "r1",
            &bus_modes(),
            &config,
            &solution,
        );
        // the stops now reference bound facilities, nothing new is cloned
        assert_eq!(schedule.nb_of_facilities(), facilities_after_first);
        let route = schedule.route("l1", "r1").unwrap();
        assert_eq!(route.link_sequence, vec!["ab", "bc"]);
    }

    #[test]
    fn consecutive_repetitions_collapse() {
        let mut network = line_network();
        let mut schedule = two_stop_schedule();
        let mut context = CommitContext::new();
        let config = MapperConfig::default();
        // both stops on the same link
        let solution = solution_for(&network, &["ab", "ab"]);

        commit_route(
            &mut schedule,
            &mut network,
            &mut context,
            "l1",
            "r1",
            &bus_modes(),
            &config,
            &solution,
        );
        let route = schedule.route("l1", "r1").unwrap();
        assert_eq!(route.link_sequence, vec!["ab"]);
    }

    #[test]
    fn direct_connections_synthesize_a_link() {
        let mut network = NetworkBuilder::new()
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
        let mut schedule = two_stop_schedule();
        let mut context = CommitContext::new();
        let config = MapperConfig::default();
        let mut solution = solution_for(&network, &["ab", "xy"]);
        solution.paths = vec![InterStopPath::DirectConnection];

        commit_route(
            &mut schedule,
            &mut network,
            &mut context,
            "l1",
            "r1",
            &bus_modes(),
            &config,
            &solution,
        );

        let route = schedule.route("l1", "r1").unwrap();
        assert_eq!(route.link_sequence, vec!["ab", "b_x_art", "xy"]);
        assert_eq!(context.created_artificial, vec!["b_x_art"]);
        let connection = network.link_idx("b_x_art").unwrap();
        let link = network.link(connection);
        assert!(link.modes.contains(ARTIFICIAL_LINK_MODE));
        assert!(link.modes.contains("bus"));
        // euclidean gap between node b (100,0) and node x (0,500)
        let expected_length = (100.0f64 * 100.0 + 500.0 * 500.0).sqrt();
        assert!((link.length - expected_length).abs() < 1e-9);
    }
}
