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

//! Link candidate generation : for every (stop facility, schedule mode)
//! pair appearing in the schedule, the set of network links the stop may be
//! served on.
//!
//! This is a sequential pre-phase. It is the only place the network is
//! mutated before the commit : a stop with no legal link nearby gets an
//! artificial self-loop link at its coordinate, so that every stop stays
//! mappable when `use_artificial_links` is on.

use crate::config::MapperConfig;
use crate::geometry::Coord;
use crate::model::network::{LinkIdx, Network, ARTIFICIAL_LINK_MODE};
use crate::model::schedule::{FacilityIdx, TransitSchedule};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, info};

/// Artificial stop links are self-loops ; a small positive length keeps
/// every downstream length computation well defined.
const ARTIFICIAL_LINK_LENGTH: f64 = 1.0;

/// The candidate search starts at this fraction of
/// `max_link_candidate_distance` and doubles until enough links are found
/// or the cap is reached.
const INITIAL_RADIUS_DIVISOR: f64 = 4.0;

#[derive(Debug, Clone)]
pub(crate) struct LinkCandidate {
    pub(crate) link: LinkIdx,
    /// distance from the stop coordinate to the nearest point of the link
    pub(crate) distance: f64,
    pub(crate) artificial: bool,
}

#[derive(Debug, Default)]
pub(crate) struct LinkCandidates {
    by_stop_and_mode: HashMap<(FacilityIdx, String), Vec<LinkCandidate>>,
}

impl LinkCandidates {
    /// Empty when the stop has no candidate on this mode, which makes any
    /// route through it unmappable.
    pub(crate) fn get(&self, facility: FacilityIdx, schedule_mode: &str) -> &[LinkCandidate] {
        self.by_stop_and_mode
            .get(&(facility, schedule_mode.to_string()))
            .map(|candidates| candidates.as_slice())
            .unwrap_or(&[])
    }

    pub(crate) fn nb_of_sets(&self) -> usize {
        self.by_stop_and_mode.len()
    }
}

/// Builds candidate sets for all (facility, schedule mode) pairs of the
/// schedule. Returns the candidates and the ids of the artificial links
/// that had to be created.
pub(crate) fn create_candidates(
    schedule: &TransitSchedule,
    network: &mut Network,
    config: &MapperConfig,
) -> (LinkCandidates, Vec<String>) {
    let mut candidates = LinkCandidates::default();
    let mut artificial_link_ids = Vec::new();

    // routes() iterates in (line id, route id) order, so artificial link
    // identifiers come out the same on every run
    let pairs: Vec<(FacilityIdx, String)> = {
        let mut seen = BTreeSet::new();
        let mut pairs = Vec::new();
        for (_, route) in schedule.routes() {
            for stop in &route.stops {
                if seen.insert((stop.facility.idx, route.mode.clone())) {
                    pairs.push((stop.facility, route.mode.clone()));
                }
            }
        }
        pairs
    };

    for (facility_idx, schedule_mode) in pairs {
        let network_modes = match config.network_modes_of(&schedule_mode) {
            Some(modes) => modes.clone(),
            // the mapper refuses schedules with unassigned modes upfront
            None => continue,
        };
        let facility = schedule.facility(facility_idx);
        let mut found = search_candidates(network, &facility.coord, &network_modes, config);

        if found.is_empty() && config.use_artificial_links {
            let link_idx = create_artificial_stop_link(
                network,
                &facility.id,
                &facility.coord,
                &network_modes,
                config,
            );
            artificial_link_ids.push(network.link(link_idx).id.clone());
            debug!(
                "No link candidate for stop `{}` on mode `{}`, created artificial link `{}`",
                facility.id,
                schedule_mode,
                network.link(link_idx).id
            );
            found.push(LinkCandidate {
                link: link_idx,
                distance: 0.0,
                artificial: true,
            });
        }

        candidates
            .by_stop_and_mode
            .insert((facility_idx, schedule_mode), found);
    }

    info!(
        "Created {} link candidate sets, {} artificial links",
        candidates.nb_of_sets(),
        artificial_link_ids.len()
    );
    (candidates, artificial_link_ids)
}

fn search_candidates(
    network: &Network,
    coord: &Coord,
    network_modes: &BTreeSet<String>,
    config: &MapperConfig,
) -> Vec<LinkCandidate> {
    let max_radius = config.max_link_candidate_distance;
    let mut radius = max_radius / INITIAL_RADIUS_DIVISOR;
    let mut found: Vec<LinkCandidate>;
    loop {
        found = network
            .links_within(coord, radius)
            .filter(|(idx, _)| {
                let link = network.link(*idx);
                if link.modes.contains(ARTIFICIAL_LINK_MODE) {
                    // artificial links only ever serve the stop they were
                    // created for
                    return false;
                }
                if link.is_loop() && !config.allow_loop_links {
                    return false;
                }
                link.permits_any_of(network_modes)
            })
            .map(|(idx, distance)| LinkCandidate {
                link: idx,
                distance,
                artificial: false,
            })
            .collect();
        if found.len() >= config.n_link_threshold || radius >= max_radius {
            break;
        }
        radius = (radius * 2.0).min(max_radius);
    }
    found.sort_by(|a, b| {
        a.distance
            .total_cmp(&b.distance)
            .then_with(|| network.link(a.link).id.cmp(&network.link(b.link).id))
    });
    found.truncate(config.max_n_closest_links);
    found
}

fn create_artificial_stop_link(
    network: &mut Network,
    facility_id: &str,
    coord: &Coord,
    network_modes: &BTreeSet<String>,
    config: &MapperConfig,
) -> LinkIdx {
    let node_id = unique_id(&format!("pt_{}", facility_id), |id| {
        network.contains_node_id(id)
    });
    let link_id = unique_id(&format!("pt_{}", facility_id), |id| {
        network.contains_link_id(id)
    });
    let mut modes = network_modes.clone();
    modes.insert(ARTIFICIAL_LINK_MODE.to_string());

    // both endpoints are the same fresh node : a self-loop at the stop
    let node_added = network.add_node(node_id.clone(), *coord);
    debug_assert!(node_added.is_ok());
    let link_added = network.add_link(
        link_id,
        &node_id,
        &node_id,
        ARTIFICIAL_LINK_LENGTH,
        config.artificial_link_freespeed,
        config.artificial_link_capacity,
        modes,
    );
    // the ids were made unique above
    link_added.expect("artificial link insertion cannot fail")
}

fn unique_id(base: &str, taken: impl Fn(&str) -> bool) -> String {
    if !taken(base) {
        return base.to_string();
    }
    let mut counter = 1u32;
    loop {
        let candidate = format!("{}.{}", base, counter);
        if !taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}
