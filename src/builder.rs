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

//! Provides an easy way to create networks and schedules, mostly in tests.
//!
//! ```
//! # use sleipnir::builder::{NetworkBuilder, ScheduleBuilder};
//! # fn main() {
//! let network = NetworkBuilder::new()
//!     .node("a", 0.0, 0.0)
//!     .node("b", 100.0, 0.0)
//!     .link("ab", "a", "b", |link| {
//!         link.modes(&["bus", "car"]).freespeed(13.9);
//!     })
//!     .build();
//!
//! let schedule = ScheduleBuilder::new()
//!     .stop("stop1", 50.0, 5.0)
//!     .route("line1", "route1", |route| {
//!         route
//!             .mode("bus")
//!             .st("stop1", "00:00:00", "00:00:30")
//!             .departure("08:00:00");
//!     })
//!     .build();
//! # }
//! ```
//!
//! Builders panic on inconsistent input (duplicate ids, unknown stops,
//! unparsable times) : they are meant for fixtures, not for feed ingestion.

use crate::geometry::{distance, Coord};
use crate::model::network::Network;
use crate::model::schedule::{
    Departure, StopFacility, TransitLine, TransitRoute, TransitRouteStop, TransitSchedule,
};
use crate::time::PositiveDuration;
use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

const DEFAULT_LINK_FREESPEED: f64 = 10.0;
const DEFAULT_LINK_CAPACITY: f64 = 1000.0;
const DEFAULT_ROUTE_MODE: &str = "bus";

pub struct NetworkBuilder {
    network: Network,
}

impl Default for NetworkBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl NetworkBuilder {
    pub fn new() -> Self {
        Self {
            network: Network::new(),
        }
    }

    pub fn node(mut self, id: &str, x: f64, y: f64) -> Self {
        self.network
            .add_node(id.to_string(), Coord::new(x, y))
            .unwrap_or_else(|err| panic!("NetworkBuilder : {}", err));
        self
    }

    /// Adds a link ; length defaults to the node distance, modes to `car`.
    pub fn link<F>(mut self, id: &str, from: &str, to: &str, customize: F) -> Self
    where
        F: FnOnce(&mut LinkSpec),
    {
        let mut spec = LinkSpec::default();
        customize(&mut spec);
        let length = spec.length.unwrap_or_else(|| {
            let from_coord = self
                .network
                .node_idx(from)
                .map(|idx| self.network.node(idx).coord)
                .unwrap_or_else(|| panic!("NetworkBuilder : unknown node `{}`", from));
            let to_coord = self
                .network
                .node_idx(to)
                .map(|idx| self.network.node(idx).coord)
                .unwrap_or_else(|| panic!("NetworkBuilder : unknown node `{}`", to));
            distance(&from_coord, &to_coord)
        });
        self.network
            .add_link(
                id.to_string(),
                from,
                to,
                length,
                spec.freespeed,
                spec.capacity,
                spec.modes,
            )
            .unwrap_or_else(|err| panic!("NetworkBuilder : {}", err));
        self
    }

    pub fn build(self) -> Network {
        self.network
    }
}

pub struct LinkSpec {
    length: Option<f64>,
    freespeed: f64,
    capacity: f64,
    modes: BTreeSet<String>,
}

impl Default for LinkSpec {
    fn default() -> Self {
        let mut modes = BTreeSet::new();
        modes.insert("car".to_string());
        Self {
            length: None,
            freespeed: DEFAULT_LINK_FREESPEED,
            capacity: DEFAULT_LINK_CAPACITY,
            modes,
        }
    }
}

impl LinkSpec {
    pub fn length(&mut self, length: f64) -> &mut Self {
        self.length = Some(length);
        self
    }

    pub fn freespeed(&mut self, freespeed: f64) -> &mut Self {
        self.freespeed = freespeed;
        self
    }

    pub fn capacity(&mut self, capacity: f64) -> &mut Self {
        self.capacity = capacity;
        self
    }

    pub fn modes(&mut self, modes: &[&str]) -> &mut Self {
        self.modes = modes.iter().map(|mode| mode.to_string()).collect();
        self
    }
}

pub struct ScheduleBuilder {
    schedule: TransitSchedule,
}

impl Default for ScheduleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleBuilder {
    pub fn new() -> Self {
        Self {
            schedule: TransitSchedule::new(),
        }
    }

    pub fn stop(mut self, id: &str, x: f64, y: f64) -> Self {
        self.schedule
            .add_facility(StopFacility {
                id: id.to_string(),
                name: id.to_string(),
                coord: Coord::new(x, y),
                is_blocking: false,
                link_id: None,
            })
            .unwrap_or_else(|err| panic!("ScheduleBuilder : {}", err));
        self
    }

    /// Adds a route to `line_id`, creating the line on first use.
    pub fn route<F>(mut self, line_id: &str, route_id: &str, customize: F) -> Self
    where
        F: FnOnce(&mut RouteBuilder),
    {
        let mut builder = RouteBuilder::new(route_id);
        customize(&mut builder);
        let route = builder.into_route(&self.schedule);
        let line = self
            .schedule
            .lines
            .entry(line_id.to_string())
            .or_insert_with(|| TransitLine {
                id: line_id.to_string(),
                routes: BTreeMap::new(),
            });
        if line.routes.insert(route.id.clone(), route).is_some() {
            panic!(
                "ScheduleBuilder : duplicate route `{}` on line `{}`",
                route_id, line_id
            );
        }
        self
    }

    pub fn build(self) -> TransitSchedule {
        self.schedule
    }
}

pub struct RouteBuilder {
    id: String,
    mode: String,
    stops: Vec<(String, PositiveDuration, PositiveDuration)>,
    await_departure: bool,
    departures: Vec<PositiveDuration>,
    shape_id: Option<String>,
}

impl RouteBuilder {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            mode: DEFAULT_ROUTE_MODE.to_string(),
            stops: Vec::new(),
            await_departure: true,
            departures: Vec::new(),
            shape_id: None,
        }
    }

    pub fn mode(&mut self, mode: &str) -> &mut Self {
        self.mode = mode.to_string();
        self
    }

    /// Appends a stop with `hh:mm:ss` arrival and departure offsets.
    pub fn st(&mut self, facility_id: &str, arrival: &str, departure: &str) -> &mut Self {
        let arrival = PositiveDuration::from_str(arrival)
            .unwrap_or_else(|err| panic!("RouteBuilder : {}", err));
        let departure = PositiveDuration::from_str(departure)
            .unwrap_or_else(|err| panic!("RouteBuilder : {}", err));
        self.stops.push((facility_id.to_string(), arrival, departure));
        self
    }

    pub fn await_departure(&mut self, value: bool) -> &mut Self {
        self.await_departure = value;
        self
    }

    pub fn departure(&mut self, time: &str) -> &mut Self {
        let time = PositiveDuration::from_str(time)
            .unwrap_or_else(|err| panic!("RouteBuilder : {}", err));
        self.departures.push(time);
        self
    }

    pub fn shape(&mut self, shape_id: &str) -> &mut Self {
        self.shape_id = Some(shape_id.to_string());
        self
    }

    fn into_route(self, schedule: &TransitSchedule) -> TransitRoute {
        let RouteBuilder {
            id,
            mode,
            stops,
            await_departure,
            departures,
            shape_id,
        } = self;
        let nb_of_stops = stops.len();
        let stops = stops
            .into_iter()
            .enumerate()
            .map(|(position, (facility_id, arrival, departure))| {
                let facility = schedule.facility_idx(&facility_id).unwrap_or_else(|| {
                    panic!(
                        "RouteBuilder : route `{}` references unknown stop `{}`",
                        id, facility_id
                    )
                });
                TransitRouteStop {
                    facility,
                    // the first stop has no arrival, the last no departure
                    arrival_offset: if position == 0 { None } else { Some(arrival) },
                    departure_offset: if position + 1 == nb_of_stops {
                        None
                    } else {
                        Some(departure)
                    },
                    await_departure,
                }
            })
            .collect();
        let departures = departures
            .into_iter()
            .enumerate()
            .map(|(position, time)| Departure {
                id: format!("{}_{:02}", id, position + 1),
                time,
            })
            .collect();
        TransitRoute {
            id,
            mode,
            stops,
            departures,
            link_sequence: Vec::new(),
            shape_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_wire_everything_together() {
        let schedule = ScheduleBuilder::new()
            .stop("a", 0.0, 0.0)
            .stop("b", 100.0, 0.0)
            .route("line1", "route1", |route| {
                route
                    .mode("rail")
                    .st("a", "00:00:00", "00:00:30")
                    .st("b", "00:05:00", "00:05:30")
                    .departure("08:00:00")
                    .departure("08:30:00")
                    .shape("shape1");
            })
            .build();

        assert_eq!(schedule.nb_of_facilities(), 2);
        let route = schedule.route("line1", "route1").unwrap();
        assert_eq!(route.mode, "rail");
        assert_eq!(route.shape_id.as_deref(), Some("shape1"));
        assert_eq!(route.stops.len(), 2);
        assert_eq!(route.stops[0].arrival_offset, None);
        assert_eq!(
            route.stops[0].departure_offset,
            Some(PositiveDuration::from_seconds(30))
        );
        assert_eq!(
            route.stops[1].arrival_offset,
            Some(PositiveDuration::from_hms(0, 5, 0))
        );
        assert_eq!(route.stops[1].departure_offset, None);
        assert_eq!(route.departures.len(), 2);
        assert_eq!(route.departures[0].id, "route1_01");
    }

    #[test]
    fn link_length_defaults_to_node_distance() {
        let network = NetworkBuilder::new()
            .node("a", 0.0, 0.0)
            .node("b", 300.0, 400.0)
            .link("ab", "a", "b", |link| {
                link.modes(&["bus"]);
            })
            .build();
        let ab = network.link_idx("ab").unwrap();
        assert!((network.link(ab).length - 500.0).abs() < 1e-9);
    }
}
