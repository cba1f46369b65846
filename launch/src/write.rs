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

//! Writes the output artifacts : mapped schedule, final network, and the
//! optional street-only subset.

use crate::read::{
    DepartureRecord, FacilityRecord, LineRecord, LinkRecord, NetworkRecord, NodeRecord,
    RouteRecord, ScheduleRecord, StopRecord,
};
use anyhow::{Context, Result};
use sleipnir::tracing::info;
use sleipnir::{Network, TransitSchedule};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

pub fn write_network(network: &Network, path: &Path) -> Result<()> {
    let record = network_record(network, None);
    write_json(&record, path)?;
    info!(
        "Network written to {:?} : {} nodes, {} links",
        path,
        record.nodes.len(),
        record.links.len()
    );
    Ok(())
}

/// The subset of the network whose links permit at least one street mode.
pub fn write_street_network(
    network: &Network,
    street_modes: &BTreeSet<String>,
    path: &Path,
) -> Result<()> {
    let record = network_record(network, Some(street_modes));
    write_json(&record, path)?;
    info!(
        "Street network written to {:?} : {} nodes, {} links",
        path,
        record.nodes.len(),
        record.links.len()
    );
    Ok(())
}

pub fn write_schedule(schedule: &TransitSchedule, path: &Path) -> Result<()> {
    let record = ScheduleRecord {
        stop_facilities: schedule
            .facilities()
            .map(|(_, facility)| FacilityRecord {
                id: facility.id.clone(),
                name: facility.name.clone(),
                x: facility.coord.x,
                y: facility.coord.y,
                is_blocking: facility.is_blocking,
                link: facility.link_id.clone(),
            })
            .collect(),
        lines: schedule
            .lines
            .values()
            .map(|line| LineRecord {
                id: line.id.clone(),
                routes: line
                    .routes
                    .values()
                    .map(|route| RouteRecord {
                        id: route.id.clone(),
                        mode: route.mode.clone(),
                        stops: route
                            .stops
                            .iter()
                            .map(|stop| StopRecord {
                                facility: schedule.facility(stop.facility).id.clone(),
                                arrival_offset: stop.arrival_offset,
                                departure_offset: stop.departure_offset,
                                await_departure: stop.await_departure,
                            })
                            .collect(),
                        departures: route
                            .departures
                            .iter()
                            .map(|departure| DepartureRecord {
                                id: departure.id.clone(),
                                time: departure.time,
                            })
                            .collect(),
                        link_sequence: route.link_sequence.clone(),
                        shape_id: route.shape_id.clone(),
                    })
                    .collect(),
            })
            .collect(),
    };
    write_json(&record, path)?;
    info!(
        "Schedule written to {:?} : {} stop facilities, {} lines",
        path,
        record.stop_facilities.len(),
        record.lines.len()
    );
    Ok(())
}

fn network_record(network: &Network, street_modes: Option<&BTreeSet<String>>) -> NetworkRecord {
    let links: Vec<LinkRecord> = network
        .links()
        .filter(|(_, link)| match street_modes {
            Some(modes) => link.permits_any_of(modes),
            None => true,
        })
        .map(|(_, link)| LinkRecord {
            id: link.id.clone(),
            from: network.node(link.from).id.clone(),
            to: network.node(link.to).id.clone(),
            length: link.length,
            freespeed: link.freespeed,
            capacity: link.capacity,
            modes: link.modes.clone(),
        })
        .collect();
    let kept_nodes: BTreeSet<&str> = links
        .iter()
        .flat_map(|link| vec![link.from.as_str(), link.to.as_str()])
        .collect();
    let nodes = network
        .nodes()
        .filter(|(_, node)| street_modes.is_none() || kept_nodes.contains(node.id.as_str()))
        .map(|(_, node)| NodeRecord {
            id: node.id.clone(),
            x: node.coord.x,
            y: node.coord.y,
        })
        .collect();
    NetworkRecord { nodes, links }
}

fn write_json<T: serde::Serialize>(record: &T, path: &Path) -> Result<()> {
    let file =
        File::create(path).with_context(|| format!("could not create output file {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), record)
        .with_context(|| format!("could not write output file {:?}", path))?;
    Ok(())
}
