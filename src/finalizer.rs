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

//! The network finalizer : garbage-collects artificial constructs, strips
//! the sentinel mode, repairs freespeeds against the scheduled timings and
//! prunes what no mapped route touches. Runs once, after the commit phase.

use crate::config::MapperConfig;
use crate::model::network::{LinkIdx, Network, ARTIFICIAL_LINK_MODE};
use crate::model::schedule::TransitSchedule;
use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use tracing::{info, warn};

#[derive(Debug, Default, Clone)]
pub struct FinalizeStats {
    pub removed_artificial_links: usize,
    pub raised_freespeed_links: usize,
    pub removed_orphan_links: usize,
    pub removed_orphan_nodes: usize,
    pub removed_facilities: usize,
}

pub(crate) fn finalize(
    schedule: &mut TransitSchedule,
    network: &mut Network,
    config: &MapperConfig,
) -> FinalizeStats {
    let mut stats = FinalizeStats::default();

    let used_link_ids: BTreeSet<String> = schedule
        .routes()
        .flat_map(|(_, route)| route.link_sequence.iter().cloned())
        .collect();

    // 1. drop artificial links no mapped route ended up using
    let unused_artificial: HashSet<LinkIdx> = network
        .links()
        .filter(|(_, link)| {
            link.modes.contains(ARTIFICIAL_LINK_MODE) && !used_link_ids.contains(&link.id)
        })
        .map(|(idx, _)| idx)
        .collect();
    stats.removed_artificial_links = unused_artificial.len();
    network.remove_links(&unused_artificial);

    // 2. the sentinel mode disappears from the emitted network
    let tagged: Vec<LinkIdx> = network
        .links()
        .filter(|(_, link)| link.modes.contains(ARTIFICIAL_LINK_MODE))
        .map(|(idx, _)| idx)
        .collect();
    for idx in tagged {
        network.remove_link_mode(idx, ARTIFICIAL_LINK_MODE);
    }

    // 3. freespeed repair
    stats.raised_freespeed_links = repair_freespeeds(schedule, network, config);

    // 4. optionally prune everything not reachable from a used link
    if config.prune_orphan_network_parts {
        let (links, nodes) = prune_orphans(network, &used_link_ids);
        stats.removed_orphan_links = links;
        stats.removed_orphan_nodes = nodes;
    }

    // 5. facilities no route references anymore
    if config.remove_not_used_stop_facilities {
        let referenced = schedule.referenced_facilities();
        let unused: HashSet<_> = schedule
            .facilities()
            .filter(|(idx, _)| !referenced.contains(idx))
            .map(|(idx, _)| idx)
            .collect();
        stats.removed_facilities = unused.len();
        schedule.remove_facilities(&unused);
    }

    info!(
        "Finalized network : {} artificial links removed, {} freespeeds raised, {} orphan links and {} orphan nodes pruned, {} stop facilities removed",
        stats.removed_artificial_links,
        stats.raised_freespeed_links,
        stats.removed_orphan_links,
        stats.removed_orphan_nodes,
        stats.removed_facilities,
    );
    stats
}

/// Raises freespeed on schedule-freespeed-mode links so every scheduled
/// inter-stop travel time is achievable. The requirement of a segment is
/// segment length over scheduled duration ; a link shared by several
/// segments gets the maximum.
fn repair_freespeeds(
    schedule: &TransitSchedule,
    network: &mut Network,
    config: &MapperConfig,
) -> usize {
    if config.schedule_freespeed_modes.is_empty() {
        return 0;
    }
    let mut required: HashMap<String, f64> = HashMap::new();

    for (line_id, route) in schedule.routes() {
        if !route.is_mapped() || route.stops.len() < 2 {
            continue;
        }
        // locate each stop's bound link inside the route's link sequence
        let mut positions = Vec::with_capacity(route.stops.len());
        let mut cursor = 0usize;
        let mut broken = false;
        for stop in &route.stops {
            let link_id = match &schedule.facility(stop.facility).link_id {
                Some(id) => id,
                None => {
                    broken = true;
                    break;
                }
            };
            match route.link_sequence[cursor..]
                .iter()
                .position(|id| id == link_id)
            {
                Some(offset) => {
                    cursor += offset;
                    positions.push(cursor);
                }
                None => {
                    broken = true;
                    break;
                }
            }
        }
        if broken {
            warn!(
                "Route `{}` of line `{}` has stops outside its link sequence, skipping freespeed repair",
                route.id, line_id
            );
            continue;
        }

        for window in 0..route.stops.len() - 1 {
            let departure = match route.stops[window].departure_offset {
                Some(offset) => offset,
                None => continue,
            };
            let arrival = match route.stops[window + 1].arrival_offset {
                Some(offset) => offset,
                None => continue,
            };
            if arrival <= departure {
                continue;
            }
            let duration = arrival.saturating_sub(departure).as_secs_f64();
            let (start, end) = (positions[window], positions[window + 1]);
            if start == end {
                continue;
            }
            // the vehicle leaves the first stop's link and travels up to and
            // including the second stop's link
            let segment = &route.link_sequence[start + 1..=end];
            let segment_length: f64 = segment
                .iter()
                .filter_map(|id| network.link_idx(id))
                .map(|idx| network.link(idx).length)
                .sum();
            if segment_length <= 0.0 {
                continue;
            }
            let speed = segment_length / duration;
            for link_id in segment {
                let entry = required.entry(link_id.clone()).or_insert(0.0);
                if speed > *entry {
                    *entry = speed;
                }
            }
        }
    }

    let mut raised = 0usize;
    for (link_id, speed) in required {
        if let Some(idx) = network.link_idx(&link_id) {
            let link = network.link(idx);
            if !link
                .modes
                .iter()
                .any(|mode| config.schedule_freespeed_modes.contains(mode))
            {
                continue;
            }
            if network.raise_freespeed(idx, speed) {
                raised += 1;
            }
        }
    }
    raised
}

/// Removes links and nodes not reachable from any schedule-used link,
/// walking links in both directions.
fn prune_orphans(network: &mut Network, used_link_ids: &BTreeSet<String>) -> (usize, usize) {
    let mut reached_nodes = vec![false; network.nb_of_nodes()];
    let mut queue = VecDeque::new();
    for link_id in used_link_ids {
        if let Some(idx) = network.link_idx(link_id) {
            let link = network.link(idx);
            for node in [link.from, link.to].iter() {
                if !reached_nodes[node.idx] {
                    reached_nodes[node.idx] = true;
                    queue.push_back(*node);
                }
            }
        }
    }
    while let Some(node) = queue.pop_front() {
        let neighbours: Vec<_> = network
            .out_links(node)
            .iter()
            .map(|idx| network.link(*idx).to)
            .chain(
                network
                    .in_links(node)
                    .iter()
                    .map(|idx| network.link(*idx).from),
            )
            .collect();
        for neighbour in neighbours {
            if !reached_nodes[neighbour.idx] {
                reached_nodes[neighbour.idx] = true;
                queue.push_back(neighbour);
            }
        }
    }

    let orphan_links: HashSet<LinkIdx> = network
        .links()
        .filter(|(_, link)| !reached_nodes[link.from.idx])
        .map(|(idx, _)| idx)
        .collect();
    let removed_links = orphan_links.len();
    let nodes_before = network.nb_of_nodes();
    network.remove_links(&orphan_links);
    network.remove_unconnected_nodes();
    (removed_links, nodes_before - network.nb_of_nodes())
}
