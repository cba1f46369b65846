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

//! Converts a GTFS feed into an unmapped transit schedule plus its shapes.
//!
//! One transit line per GTFS route ; trips of a line sharing the same stop
//! sequence and offsets collapse into one transit route with several
//! departures. Coordinates are taken as-is (longitude as x, latitude as
//! y) : projecting the feed is the caller's business.

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveDate, Weekday};
use gtfs_structures::{Exception, Gtfs, RouteType, Trip};
use sleipnir::geometry::Coord;
use sleipnir::model::schedule::{
    Departure, StopFacility, TransitLine, TransitRoute, TransitRouteStop,
};
use sleipnir::model::shape::RouteShape;
use sleipnir::tracing::{info, warn};
use sleipnir::{PositiveDuration, Shapes, TransitSchedule};
use std::collections::BTreeMap;
use std::path::Path;

/// Which services of the feed end up in the schedule.
#[derive(Debug, Clone)]
pub enum ServiceFilter {
    /// every trip, whatever its service day
    All,
    /// only trips whose service runs on that date
    Day(NaiveDate),
}

impl ServiceFilter {
    pub fn from_option(day: &Option<String>) -> Result<Self> {
        match day {
            None => Ok(ServiceFilter::All),
            Some(text) => {
                let date = NaiveDate::parse_from_str(text, "%Y-%m-%d")
                    .with_context(|| format!("could not parse service day `{}`", text))?;
                Ok(ServiceFilter::Day(date))
            }
        }
    }
}

pub fn convert(path: &Path, filter: &ServiceFilter) -> Result<(TransitSchedule, Shapes)> {
    let feed = Gtfs::new(&path.to_string_lossy())
        .map_err(|err| anyhow!("could not read GTFS feed at {:?} : {}", path, err))?;
    convert_feed(&feed, filter)
}

pub fn convert_feed(feed: &Gtfs, filter: &ServiceFilter) -> Result<(TransitSchedule, Shapes)> {
    let mut schedule = TransitSchedule::new();

    // deterministic trip order whatever the feed's map layout
    let mut trips: Vec<&Trip> = feed
        .trips
        .values()
        .filter(|trip| match filter {
            ServiceFilter::All => true,
            ServiceFilter::Day(day) => service_runs_on(feed, &trip.service_id, *day),
        })
        .collect();
    trips.sort_by(|a, b| a.id.cmp(&b.id));
    if trips.is_empty() {
        bail!("no GTFS trip matches the service filter {:?}", filter);
    }

    // stop facilities for every stop a converted trip serves
    let mut warned_about_times = false;
    for trip in &trips {
        for stop_time in &trip.stop_times {
            let stop = &stop_time.stop;
            if schedule.facility_idx(&stop.id).is_some() {
                continue;
            }
            let (x, y) = match (stop.longitude, stop.latitude) {
                (Some(longitude), Some(latitude)) => (longitude, latitude),
                _ => bail!("GTFS stop `{}` has no coordinate", stop.id),
            };
            schedule
                .add_facility(StopFacility {
                    id: stop.id.clone(),
                    name: stop.name.clone(),
                    coord: Coord::new(x, y),
                    is_blocking: false,
                    link_id: None,
                })
                .with_context(|| format!("duplicate GTFS stop `{}`", stop.id))?;
        }
    }

    let mut nb_of_routes = 0usize;
    for trip in &trips {
        let gtfs_route = feed
            .routes
            .get(&trip.route_id)
            .ok_or_else(|| anyhow!("trip `{}` references unknown route `{}`", trip.id, trip.route_id))?;
        let line_id = format!("{}_{}", gtfs_route.short_name, gtfs_route.id);
        let mode = schedule_mode(&gtfs_route.route_type);

        let (stops, first_time) = convert_stop_sequence(&schedule, trip, &mut warned_about_times)?;
        if stops.is_empty() {
            warn!("GTFS trip `{}` has no stop time, skipped", trip.id);
            continue;
        }

        let line = schedule
            .lines
            .entry(line_id.clone())
            .or_insert_with(|| TransitLine {
                id: line_id.clone(),
                routes: BTreeMap::new(),
            });

        // a trip whose stop sequence and offsets match an existing route of
        // the line only contributes departures
        let route_id = match line
            .routes
            .values()
            .find(|route| route.mode == mode && route.stops == stops)
        {
            Some(route) => route.id.clone(),
            None => {
                nb_of_routes += 1;
                line.routes.insert(
                    trip.id.clone(),
                    TransitRoute {
                        id: trip.id.clone(),
                        mode: mode.clone(),
                        stops: stops.clone(),
                        departures: Vec::new(),
                        link_sequence: Vec::new(),
                        shape_id: trip.shape_id.clone(),
                    },
                );
                trip.id.clone()
            }
        };

        let route = line
            .routes
            .get_mut(&route_id)
            .expect("route was just inserted or found");
        if trip.frequencies.is_empty() {
            push_departure(route, first_time);
        } else {
            for frequency in &trip.frequencies {
                let mut time = frequency.start_time;
                while time < frequency.end_time {
                    push_departure(route, PositiveDuration::from_seconds(time));
                    time += frequency.headway_secs;
                }
            }
        }
    }

    let shapes = convert_shapes(feed);
    info!(
        "GTFS converted : {} lines, {} routes, {} stop facilities, {} shapes",
        schedule.lines.len(),
        nb_of_routes,
        schedule.nb_of_facilities(),
        shapes.len()
    );
    Ok((schedule, shapes))
}

/// Offsets are relative to the trip's first stop time ; the first stop has
/// no arrival offset and the last no departure offset.
fn convert_stop_sequence(
    schedule: &TransitSchedule,
    trip: &Trip,
    warned_about_times: &mut bool,
) -> Result<(Vec<TransitRouteStop>, PositiveDuration)> {
    let mut stop_times = trip.stop_times.iter().collect::<Vec<_>>();
    stop_times.sort_by_key(|stop_time| stop_time.stop_sequence);

    let first_time = stop_times
        .first()
        .and_then(|stop_time| stop_time.arrival_time.or(stop_time.departure_time))
        .map(PositiveDuration::from_seconds)
        .unwrap_or_else(PositiveDuration::zero);

    let mut stops = Vec::with_capacity(stop_times.len());
    let mut previous_time = first_time.total_seconds();
    for (position, stop_time) in stop_times.iter().enumerate() {
        // untimed stops inherit the nearest preceding timed stop
        let arrival = stop_time.arrival_time.unwrap_or_else(|| {
            if !*warned_about_times {
                warn!(
                    "GTFS stop times without arrival time found (first : trip `{}`). \
                     Such stops are scheduled at the nearest preceding timed stop. \
                     This message is only given once.",
                    trip.id
                );
                *warned_about_times = true;
            }
            previous_time
        });
        let departure = stop_time.departure_time.unwrap_or(arrival);
        previous_time = departure;

        let facility = schedule
            .facility_idx(&stop_time.stop.id)
            .ok_or_else(|| anyhow!("GTFS stop `{}` was not converted", stop_time.stop.id))?;
        stops.push(TransitRouteStop {
            facility,
            arrival_offset: if position == 0 {
                None
            } else {
                Some(PositiveDuration::from_seconds(
                    arrival.saturating_sub(first_time.total_seconds()),
                ))
            },
            departure_offset: if position + 1 == stop_times.len() {
                None
            } else {
                Some(PositiveDuration::from_seconds(
                    departure.saturating_sub(first_time.total_seconds()),
                ))
            },
            await_departure: true,
        });
    }
    Ok((stops, first_time))
}

fn push_departure(route: &mut TransitRoute, time: PositiveDuration) {
    let id = format!("{}_{:02}", route.id, route.departures.len() + 1);
    route.departures.push(Departure { id, time });
}

fn convert_shapes(feed: &Gtfs) -> Shapes {
    let mut shapes = Shapes::new();
    for (shape_id, points) in &feed.shapes {
        let mut points: Vec<&_> = points.iter().collect();
        points.sort_by_key(|point| point.sequence);
        shapes.insert(
            shape_id.clone(),
            RouteShape {
                id: shape_id.clone(),
                points: points
                    .iter()
                    .map(|point| Coord::new(point.longitude, point.latitude))
                    .collect(),
            },
        );
    }
    shapes
}

fn service_runs_on(feed: &Gtfs, service_id: &str, day: NaiveDate) -> bool {
    if let Some(dates) = feed.calendar_dates.get(service_id) {
        for calendar_date in dates {
            if calendar_date.date == day {
                return match calendar_date.exception_type {
                    Exception::Added => true,
                    Exception::Deleted => false,
                };
            }
        }
    }
    match feed.calendar.get(service_id) {
        Some(calendar) => {
            if day < calendar.start_date || day > calendar.end_date {
                return false;
            }
            match day.weekday() {
                Weekday::Mon => calendar.monday,
                Weekday::Tue => calendar.tuesday,
                Weekday::Wed => calendar.wednesday,
                Weekday::Thu => calendar.thursday,
                Weekday::Fri => calendar.friday,
                Weekday::Sat => calendar.saturday,
                Weekday::Sun => calendar.sunday,
            }
        }
        None => false,
    }
}

fn schedule_mode(route_type: &RouteType) -> String {
    let mode = match route_type {
        RouteType::Tramway => "tram",
        RouteType::Subway => "subway",
        RouteType::Rail => "rail",
        RouteType::Bus => "bus",
        RouteType::Ferry => "ferry",
        RouteType::CableCar => "cablecar",
        RouteType::Gondola => "gondola",
        RouteType::Funicular => "funicular",
        _ => "pt",
    };
    mode.to_string()
}
