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

//! The transit schedule : stop facilities in an arena, lines and routes in
//! ordered maps so that every iteration order is deterministic.

use crate::geometry::Coord;
use crate::time::PositiveDuration;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt::{Display, Formatter};

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct FacilityIdx {
    pub(crate) idx: usize,
}

#[derive(Debug, Clone)]
pub struct StopFacility {
    pub id: String,
    pub name: String,
    pub coord: Coord,
    pub is_blocking: bool,
    /// set once the facility is bound to a network link
    pub link_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitRouteStop {
    pub facility: FacilityIdx,
    pub arrival_offset: Option<PositiveDuration>,
    pub departure_offset: Option<PositiveDuration>,
    pub await_departure: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Departure {
    pub id: String,
    /// seconds since the start of the service day
    pub time: PositiveDuration,
}

#[derive(Debug, Clone)]
pub struct TransitRoute {
    pub id: String,
    /// schedule transport mode, e.g. "bus" or "rail"
    pub mode: String,
    pub stops: Vec<TransitRouteStop>,
    pub departures: Vec<Departure>,
    /// filled by the mapper : first entry is the start link, last entry the
    /// end link, consecutive entries share a network node
    pub link_sequence: Vec<String>,
    pub shape_id: Option<String>,
}

impl TransitRoute {
    pub fn is_mapped(&self) -> bool {
        !self.link_sequence.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct TransitLine {
    pub id: String,
    pub routes: BTreeMap<String, TransitRoute>,
}

#[derive(Debug, Default, Clone)]
pub struct TransitSchedule {
    facilities: Vec<StopFacility>,
    facility_id_to_idx: HashMap<String, FacilityIdx>,
    pub lines: BTreeMap<String, TransitLine>,
}

impl TransitSchedule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_of_facilities(&self) -> usize {
        self.facilities.len()
    }

    pub fn nb_of_routes(&self) -> usize {
        self.lines.values().map(|line| line.routes.len()).sum()
    }

    pub fn add_facility(&mut self, facility: StopFacility) -> Result<FacilityIdx, ScheduleError> {
        if self.facility_id_to_idx.contains_key(&facility.id) {
            return Err(ScheduleError::DuplicateFacilityId(facility.id));
        }
        let idx = FacilityIdx {
            idx: self.facilities.len(),
        };
        self.facility_id_to_idx.insert(facility.id.clone(), idx);
        self.facilities.push(facility);
        Ok(idx)
    }

    pub fn facility(&self, idx: FacilityIdx) -> &StopFacility {
        &self.facilities[idx.idx]
    }

    pub fn facility_mut(&mut self, idx: FacilityIdx) -> &mut StopFacility {
        &mut self.facilities[idx.idx]
    }

    pub fn facility_idx(&self, id: &str) -> Option<FacilityIdx> {
        self.facility_id_to_idx.get(id).copied()
    }

    pub fn facilities(&self) -> impl Iterator<Item = (FacilityIdx, &StopFacility)> {
        self.facilities
            .iter()
            .enumerate()
            .map(|(idx, facility)| (FacilityIdx { idx }, facility))
    }

    /// (line id, route) pairs in deterministic order.
    pub fn routes(&self) -> impl Iterator<Item = (&str, &TransitRoute)> {
        self.lines.values().flat_map(|line| {
            line.routes
                .values()
                .map(move |route| (line.id.as_str(), route))
        })
    }

    pub fn route(&self, line_id: &str, route_id: &str) -> Option<&TransitRoute> {
        self.lines
            .get(line_id)
            .and_then(|line| line.routes.get(route_id))
    }

    pub fn route_mut(&mut self, line_id: &str, route_id: &str) -> Option<&mut TransitRoute> {
        self.lines
            .get_mut(line_id)
            .and_then(|line| line.routes.get_mut(route_id))
    }

    /// Facilities referenced by at least one route stop.
    pub fn referenced_facilities(&self) -> HashSet<FacilityIdx> {
        let mut referenced = HashSet::new();
        for (_, route) in self.routes() {
            for stop in &route.stops {
                referenced.insert(stop.facility);
            }
        }
        referenced
    }

    /// Drops the given facilities and rebuilds the arena, remapping every
    /// route stop. The caller must not remove a facility still referenced.
    /// All previously obtained `FacilityIdx` values are invalidated.
    pub fn remove_facilities(&mut self, remove: &HashSet<FacilityIdx>) {
        if remove.is_empty() {
            return;
        }
        debug_assert!(self
            .referenced_facilities()
            .iter()
            .all(|idx| !remove.contains(idx)));
        let old_facilities = std::mem::take(&mut self.facilities);
        self.facility_id_to_idx.clear();
        let mut remap = vec![None; old_facilities.len()];
        for (old_idx, facility) in old_facilities.into_iter().enumerate() {
            if remove.contains(&FacilityIdx { idx: old_idx }) {
                continue;
            }
            let idx = FacilityIdx {
                idx: self.facilities.len(),
            };
            remap[old_idx] = Some(idx);
            self.facility_id_to_idx.insert(facility.id.clone(), idx);
            self.facilities.push(facility);
        }
        for line in self.lines.values_mut() {
            for route in line.routes.values_mut() {
                for stop in &mut route.stops {
                    // referenced facilities are never removed
                    stop.facility = remap[stop.facility.idx].unwrap();
                }
            }
        }
    }
}

#[derive(Debug)]
pub enum ScheduleError {
    DuplicateFacilityId(String),
    UnknownFacility { route_id: String, facility_id: String },
}

impl Display for ScheduleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ScheduleError::DuplicateFacilityId(id) => {
                write!(f, "duplicate stop facility id `{}`", id)
            }
            ScheduleError::UnknownFacility {
                route_id,
                facility_id,
            } => {
                write!(
                    f,
                    "route `{}` references unknown stop facility `{}`",
                    route_id, facility_id
                )
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
