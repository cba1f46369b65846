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

//! Reads the input artifacts (json) into the model. The record types here
//! are the on-disk format ; `write` emits the same shapes.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sleipnir::geometry::Coord;
use sleipnir::model::schedule::{
    Departure, StopFacility, TransitLine, TransitRoute, TransitRouteStop,
};
use sleipnir::model::shape::RouteShape;
use sleipnir::tracing::info;
use sleipnir::{Network, PositiveDuration, Shapes, TransitSchedule};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkRecord {
    pub nodes: Vec<NodeRecord>,
    pub links: Vec<LinkRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NodeRecord {
    pub id: String,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinkRecord {
    pub id: String,
    pub from: String,
    pub to: String,
    pub length: f64,
    pub freespeed: f64,
    pub capacity: f64,
    pub modes: BTreeSet<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleRecord {
    #[serde(default)]
    pub stop_facilities: Vec<FacilityRecord>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FacilityRecord {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub is_blocking: bool,
    #[serde(default)]
    pub link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LineRecord {
    pub id: String,
    pub routes: Vec<RouteRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RouteRecord {
    pub id: String,
    pub mode: String,
    pub stops: Vec<StopRecord>,
    #[serde(default)]
    pub departures: Vec<DepartureRecord>,
    #[serde(default)]
    pub link_sequence: Vec<String>,
    #[serde(default)]
    pub shape_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StopRecord {
    pub facility: String,
    #[serde(default)]
    pub arrival_offset: Option<PositiveDuration>,
    #[serde(default)]
    pub departure_offset: Option<PositiveDuration>,
    #[serde(default = "default_await_departure")]
    pub await_departure: bool,
}

fn default_await_departure() -> bool {
    true
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DepartureRecord {
    pub id: String,
    pub time: PositiveDuration,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapesRecord {
    pub shapes: Vec<ShapeRecord>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShapeRecord {
    pub id: String,
    pub points: Vec<[f64; 2]>,
}

pub fn read_network(path: &Path) -> Result<Network> {
    let file =
        File::open(path).with_context(|| format!("could not open network file {:?}", path))?;
    let record: NetworkRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse network file {:?}", path))?;

    let mut network = Network::new();
    for node in record.nodes {
        network
            .add_node(node.id, Coord::new(node.x, node.y))
            .with_context(|| format!("bad node in network file {:?}", path))?;
    }
    for link in record.links {
        network
            .add_link(
                link.id,
                &link.from,
                &link.to,
                link.length,
                link.freespeed,
                link.capacity,
                link.modes,
            )
            .with_context(|| format!("bad link in network file {:?}", path))?;
    }
    info!(
        "Network loaded : {} nodes, {} links",
        network.nb_of_nodes(),
        network.nb_of_links()
    );
    Ok(network)
}

pub fn read_schedule(path: &Path) -> Result<TransitSchedule> {
    let file =
        File::open(path).with_context(|| format!("could not open schedule file {:?}", path))?;
    let record: ScheduleRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse schedule file {:?}", path))?;

    let mut schedule = TransitSchedule::new();
    for facility in record.stop_facilities {
        schedule
            .add_facility(StopFacility {
                id: facility.id,
                name: facility.name,
                coord: Coord::new(facility.x, facility.y),
                is_blocking: facility.is_blocking,
                link_id: facility.link,
            })
            .with_context(|| format!("bad stop facility in schedule file {:?}", path))?;
    }
    for line in record.lines {
        let mut transit_line = TransitLine {
            id: line.id.clone(),
            routes: Default::default(),
        };
        for route in line.routes {
            let mut stops = Vec::with_capacity(route.stops.len());
            for stop in route.stops {
                let facility = match schedule.facility_idx(&stop.facility) {
                    Some(idx) => idx,
                    None => bail!(
                        "route `{}` of line `{}` references unknown stop facility `{}`",
                        route.id,
                        line.id,
                        stop.facility
                    ),
                };
                stops.push(TransitRouteStop {
                    facility,
                    arrival_offset: stop.arrival_offset,
                    departure_offset: stop.departure_offset,
                    await_departure: stop.await_departure,
                });
            }
            let departures = route
                .departures
                .into_iter()
                .map(|departure| Departure {
                    id: departure.id,
                    time: departure.time,
                })
                .collect();
            transit_line.routes.insert(
                route.id.clone(),
                TransitRoute {
                    id: route.id,
                    mode: route.mode,
                    stops,
                    departures,
                    link_sequence: route.link_sequence,
                    shape_id: route.shape_id,
                },
            );
        }
        schedule.lines.insert(line.id, transit_line);
    }
    info!(
        "Schedule loaded : {} stop facilities, {} lines, {} routes",
        schedule.nb_of_facilities(),
        schedule.lines.len(),
        schedule.nb_of_routes()
    );
    Ok(schedule)
}

pub fn read_shapes(path: &Path) -> Result<Shapes> {
    let file =
        File::open(path).with_context(|| format!("could not open shapes file {:?}", path))?;
    let record: ShapesRecord = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("could not parse shapes file {:?}", path))?;
    let mut shapes = Shapes::new();
    for shape in record.shapes {
        shapes.insert(
            shape.id.clone(),
            RouteShape {
                id: shape.id,
                points: shape
                    .points
                    .into_iter()
                    .map(|point| Coord::new(point[0], point[1]))
                    .collect(),
            },
        );
    }
    info!("Shapes loaded : {}", shapes.len());
    Ok(shapes)
}
