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

//! Shared fixtures for the mapping scenarios : a 3x3 grid network with
//! both-way links, and a ready-made bus configuration.

// not every scenario binary uses every fixture
#![allow(dead_code)]

use sleipnir::builder::NetworkBuilder;
use sleipnir::tracing::dispatcher::DefaultGuard;
use sleipnir::{MapperConfig, Network, TransitSchedule};

pub fn init_logger() -> DefaultGuard {
    sleipnir_launch::logger::init_test_logger()
}

/// 3x3 grid, nodes at (0,0)..(200,200) step 100. Node ids give the cell :
/// `"21"` sits at (200,100). Every edge carries a link in both directions,
/// id `<from>_<to>`, permitting car and bus.
pub fn grid_network() -> Network {
    grid_network_without(&[])
}

pub fn grid_network_without(excluded_links: &[&str]) -> Network {
    let mut builder = NetworkBuilder::new();
    for x in 0..3 {
        for y in 0..3 {
            builder = builder.node(&format!("{}{}", x, y), f64::from(x) * 100.0, f64::from(y) * 100.0);
        }
    }
    let mut edges = Vec::new();
    for x in 0..3 {
        for y in 0..3 {
            if x < 2 {
                edges.push((format!("{}{}", x, y), format!("{}{}", x + 1, y)));
            }
            if y < 2 {
                edges.push((format!("{}{}", x, y), format!("{}{}", x, y + 1)));
            }
        }
    }
    for (a, b) in edges {
        for (from, to) in &[(&a, &b), (&b, &a)] {
            let id = format!("{}_{}", from, to);
            if excluded_links.contains(&id.as_str()) {
                continue;
            }
            builder = builder.link(&id, from, to, |link| {
                link.modes(&["car", "bus"]);
            });
        }
    }
    builder.build()
}

pub fn bus_config() -> MapperConfig {
    let mut config = MapperConfig::default();
    config.mode_routing_assignment.insert(
        "bus".to_string(),
        vec!["bus".to_string()].into_iter().collect(),
    );
    config
}

pub fn link_sequence(schedule: &TransitSchedule, line_id: &str, route_id: &str) -> Vec<String> {
    schedule
        .route(line_id, route_id)
        .unwrap_or_else(|| panic!("no route `{}` on line `{}`", route_id, line_id))
        .link_sequence
        .clone()
}

/// id of the facility the route's `position`-th stop is bound to
pub fn bound_facility(
    schedule: &TransitSchedule,
    line_id: &str,
    route_id: &str,
    position: usize,
) -> String {
    let route = schedule
        .route(line_id, route_id)
        .unwrap_or_else(|| panic!("no route `{}` on line `{}`", route_id, line_id));
    schedule.facility(route.stops[position].facility).id.clone()
}
