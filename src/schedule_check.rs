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

//! Plausibility check of a mapped schedule against its network : link
//! sequences are connected walks on legal modes, every stop's link appears
//! in its route's sequence, the sentinel mode is gone, and no mapped route
//! is shorter than its stop beeline allows.
//!
//! This validates the mapper's *output* ; raw feed validation is out of
//! scope.

use crate::config::MapperConfig;
use crate::geometry::distance;
use crate::model::network::{Network, ARTIFICIAL_LINK_MODE};
use crate::model::schedule::TransitSchedule;
use std::collections::HashSet;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlausibilityIssue {
    UnmappedRoute {
        line_id: String,
        route_id: String,
    },
    UnknownLink {
        line_id: String,
        route_id: String,
        link_id: String,
    },
    BrokenLinkSequence {
        line_id: String,
        route_id: String,
        position: usize,
    },
    WrongModeLink {
        line_id: String,
        route_id: String,
        link_id: String,
    },
    StopLinkMissing {
        line_id: String,
        route_id: String,
        facility_id: String,
    },
    ArtificialModeRemains {
        link_id: String,
    },
    BeelineViolated {
        line_id: String,
        route_id: String,
    },
}

impl Display for PlausibilityIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PlausibilityIssue::UnmappedRoute { line_id, route_id } => {
                write!(f, "route `{}` of line `{}` has no link sequence", route_id, line_id)
            }
            PlausibilityIssue::UnknownLink {
                line_id,
                route_id,
                link_id,
            } => {
                write!(
                    f,
                    "route `{}` of line `{}` references unknown link `{}`",
                    route_id, line_id, link_id
                )
            }
            PlausibilityIssue::BrokenLinkSequence {
                line_id,
                route_id,
                position,
            } => {
                write!(
                    f,
                    "route `{}` of line `{}` : links at positions {} and {} do not share a node",
                    route_id,
                    line_id,
                    position,
                    position + 1
                )
            }
            PlausibilityIssue::WrongModeLink {
                line_id,
                route_id,
                link_id,
            } => {
                write!(
                    f,
                    "route `{}` of line `{}` travels link `{}` which forbids its mode",
                    route_id, line_id, link_id
                )
            }
            PlausibilityIssue::StopLinkMissing {
                line_id,
                route_id,
                facility_id,
            } => {
                write!(
                    f,
                    "stop facility `{}` of route `{}` (line `{}`) is not bound to a link of the route",
                    facility_id, route_id, line_id
                )
            }
            PlausibilityIssue::ArtificialModeRemains { link_id } => {
                write!(f, "link `{}` still permits the artificial mode", link_id)
            }
            PlausibilityIssue::BeelineViolated { line_id, route_id } => {
                write!(
                    f,
                    "route `{}` of line `{}` is shorter than the beeline between its terminal stops",
                    route_id, line_id
                )
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct PlausibilityResult {
    pub issues: Vec<PlausibilityIssue>,
}

impl PlausibilityResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }
}

impl Display for PlausibilityResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_valid() {
            return write!(f, "mapped schedule is plausible");
        }
        writeln!(f, "{} plausibility issues :", self.issues.len())?;
        for issue in &self.issues {
            writeln!(f, "  {}", issue)?;
        }
        Ok(())
    }
}

pub fn check_schedule(
    schedule: &TransitSchedule,
    network: &Network,
    config: &MapperConfig,
) -> PlausibilityResult {
    let mut result = PlausibilityResult::default();

    for (line_id, route) in schedule.routes() {
        if route.link_sequence.is_empty() {
            result.issues.push(PlausibilityIssue::UnmappedRoute {
                line_id: line_id.to_string(),
                route_id: route.id.clone(),
            });
            continue;
        }

        let mut resolved = Vec::with_capacity(route.link_sequence.len());
        let mut sequence_known = true;
        for link_id in &route.link_sequence {
            match network.link_idx(link_id) {
                Some(idx) => resolved.push(idx),
                None => {
                    sequence_known = false;
                    result.issues.push(PlausibilityIssue::UnknownLink {
                        line_id: line_id.to_string(),
                        route_id: route.id.clone(),
                        link_id: link_id.clone(),
                    });
                }
            }
        }
        if !sequence_known {
            continue;
        }

        for (position, pair) in resolved.windows(2).enumerate() {
            if network.link(pair[0]).to != network.link(pair[1]).from {
                result.issues.push(PlausibilityIssue::BrokenLinkSequence {
                    line_id: line_id.to_string(),
                    route_id: route.id.clone(),
                    position,
                });
            }
        }

        if let Some(network_modes) = config.network_modes_of(&route.mode) {
            for idx in &resolved {
                let link = network.link(*idx);
                if !link.permits_any_of(network_modes) {
                    result.issues.push(PlausibilityIssue::WrongModeLink {
                        line_id: line_id.to_string(),
                        route_id: route.id.clone(),
                        link_id: link.id.clone(),
                    });
                }
            }
        }

        let sequence_ids: HashSet<&str> = route
            .link_sequence
            .iter()
            .map(|id| id.as_str())
            .collect();
        for stop in &route.stops {
            let facility = schedule.facility(stop.facility);
            let bound = facility
                .link_id
                .as_deref()
                .map(|link_id| sequence_ids.contains(link_id))
                .unwrap_or(false);
            if !bound {
                result.issues.push(PlausibilityIssue::StopLinkMissing {
                    line_id: line_id.to_string(),
                    route_id: route.id.clone(),
                    facility_id: facility.id.clone(),
                });
            }
        }

        if route.stops.len() >= 2 {
            let first = schedule.facility(route.stops[0].facility).coord;
            let last = schedule
                .facility(route.stops[route.stops.len() - 1].facility)
                .coord;
            let beeline = distance(&first, &last);
            let mapped_length: f64 = resolved
                .iter()
                .map(|idx| network.link(*idx).length)
                .sum();
            if mapped_length < beeline - config.beeline_distance_slack {
                result.issues.push(PlausibilityIssue::BeelineViolated {
                    line_id: line_id.to_string(),
                    route_id: route.id.clone(),
                });
            }
        }
    }

    for (_, link) in network.links() {
        if link.modes.contains(ARTIFICIAL_LINK_MODE) {
            result.issues.push(PlausibilityIssue::ArtificialModeRemains {
                link_id: link.id.clone(),
            });
        }
    }

    result
}
