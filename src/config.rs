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

use crate::time::PositiveDuration;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::{Display, Formatter};

pub const DEFAULT_MAX_LINK_CANDIDATE_DISTANCE: f64 = 300.0;
pub const DEFAULT_MAX_N_CLOSEST_LINKS: usize = 16;
pub const DEFAULT_N_LINK_THRESHOLD: usize = 2;
pub const DEFAULT_N_THREADS: usize = 2;
pub const DEFAULT_BEELINE_DISTANCE_SLACK: f64 = 50.0;
pub const DEFAULT_ARTIFICIAL_LINK_FREESPEED: f64 = 50.0;
pub const DEFAULT_ARTIFICIAL_LINK_CAPACITY: f64 = 9999.0;
pub const DEFAULT_SHAPE_DISTANCE_TOLERANCE: f64 = 10.0;
pub const DEFAULT_SHAPE_PENALTY_CEILING: f64 = 99.0;

/// How traversing a link is priced by the routers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelCostType {
    LinkLength,
    TravelTime,
}

impl std::str::FromStr for TravelCostType {
    type Err = TravelCostTypeError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let cost_type = match s {
            "link_length" => TravelCostType::LinkLength,
            "travel_time" => TravelCostType::TravelTime,
            _ => Err(TravelCostTypeError {
                cost_type_name: s.to_string(),
            })?,
        };
        Ok(cost_type)
    }
}

impl Display for TravelCostType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            TravelCostType::LinkLength => write!(f, "link_length"),
            TravelCostType::TravelTime => write!(f, "travel_time"),
        }
    }
}

#[derive(Debug)]
pub struct TravelCostTypeError {
    cost_type_name: String,
}

impl Display for TravelCostTypeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Bad travel_cost_type given : `{}`",
            self.cost_type_name
        )
    }
}

impl std::error::Error for TravelCostTypeError {}

/// Options of the schedule-to-network mapper.
///
/// `mode_routing_assignment` is the only option without a usable default :
/// it tells, for each schedule transport mode, on which network modes the
/// routes of that mode may travel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, rename_all = "snake_case", deny_unknown_fields)]
pub struct MapperConfig {
    /// schedule mode -> set of network modes routes of that mode may use
    pub mode_routing_assignment: BTreeMap<String, BTreeSet<String>>,

    /// hard cap (meters) on the stop-to-link distance of a candidate.
    /// The search starts at a quarter of this radius and doubles until
    /// `n_link_threshold` candidates are found or the cap is reached.
    pub max_link_candidate_distance: f64,

    /// upper bound on the number of candidates kept per stop
    pub max_n_closest_links: usize,

    /// minimum acceptable candidate count before the search radius grows
    pub n_link_threshold: usize,

    pub travel_cost_type: TravelCostType,

    /// emit an artificial self-loop link when a stop has no candidate
    pub use_artificial_links: bool,

    /// network modes whose link freespeed may be raised so that scheduled
    /// travel times become feasible
    pub schedule_freespeed_modes: BTreeSet<String>,

    /// add the stop-attachment penalty to pseudo-graph edge weights
    pub routing_with_candidate_distance: bool,

    pub remove_not_used_stop_facilities: bool,

    /// a loop link (from node == to node) may serve as candidate
    pub allow_loop_links: bool,

    /// a route is unmappable when some inter-stop path is longer than
    /// this factor times the stop-to-stop beeline. None disables the guard.
    pub max_travel_cost_factor: Option<f64>,

    /// remove nodes and links not reachable from any schedule-used link
    pub prune_orphan_network_parts: bool,

    pub n_threads: usize,

    /// per-route wall-clock budget; on expiry the route is unmappable
    pub route_solve_timeout: Option<PositiveDuration>,

    /// slack (meters) granted to the mapped-length-vs-beeline plausibility
    /// check
    pub beeline_distance_slack: f64,

    /// network modes defining the optional street-only output subset
    pub street_modes: BTreeSet<String>,

    pub artificial_link_freespeed: f64,
    pub artificial_link_capacity: f64,

    /// links closer to the route shape than this (meters) keep their cost
    pub shape_distance_tolerance: f64,

    /// cap on the multiplicative shape-distance penalty
    pub shape_penalty_ceiling: f64,
}

impl Default for MapperConfig {
    fn default() -> Self {
        let mut street_modes = BTreeSet::new();
        street_modes.insert("car".to_string());
        Self {
            mode_routing_assignment: BTreeMap::new(),
            max_link_candidate_distance: DEFAULT_MAX_LINK_CANDIDATE_DISTANCE,
            max_n_closest_links: DEFAULT_MAX_N_CLOSEST_LINKS,
            n_link_threshold: DEFAULT_N_LINK_THRESHOLD,
            travel_cost_type: TravelCostType::LinkLength,
            use_artificial_links: true,
            schedule_freespeed_modes: BTreeSet::new(),
            routing_with_candidate_distance: true,
            remove_not_used_stop_facilities: true,
            allow_loop_links: false,
            max_travel_cost_factor: None,
            prune_orphan_network_parts: false,
            n_threads: DEFAULT_N_THREADS,
            route_solve_timeout: None,
            beeline_distance_slack: DEFAULT_BEELINE_DISTANCE_SLACK,
            street_modes,
            artificial_link_freespeed: DEFAULT_ARTIFICIAL_LINK_FREESPEED,
            artificial_link_capacity: DEFAULT_ARTIFICIAL_LINK_CAPACITY,
            shape_distance_tolerance: DEFAULT_SHAPE_DISTANCE_TOLERANCE,
            shape_penalty_ceiling: DEFAULT_SHAPE_PENALTY_CEILING,
        }
    }
}

impl MapperConfig {
    /// Rejects configurations the mapper cannot run with. Called before
    /// any work begins, so a bad config aborts the whole batch.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.mode_routing_assignment.is_empty() {
            return Err(ConfigError::EmptyModeAssignment);
        }
        for (schedule_mode, network_modes) in &self.mode_routing_assignment {
            if network_modes.is_empty() {
                return Err(ConfigError::EmptyNetworkModes(schedule_mode.clone()));
            }
        }
        if !(self.max_link_candidate_distance > 0.0) || !self.max_link_candidate_distance.is_finite()
        {
            return Err(ConfigError::BadValue {
                option: "max_link_candidate_distance",
                message: "must be a finite positive number".to_string(),
            });
        }
        if self.n_link_threshold == 0 {
            return Err(ConfigError::BadValue {
                option: "n_link_threshold",
                message: "must be at least 1".to_string(),
            });
        }
        if self.max_n_closest_links < self.n_link_threshold {
            return Err(ConfigError::BadValue {
                option: "max_n_closest_links",
                message: "must be at least n_link_threshold".to_string(),
            });
        }
        if self.n_threads == 0 {
            return Err(ConfigError::BadValue {
                option: "n_threads",
                message: "must be at least 1".to_string(),
            });
        }
        if let Some(factor) = self.max_travel_cost_factor {
            if !(factor >= 1.0) {
                return Err(ConfigError::BadValue {
                    option: "max_travel_cost_factor",
                    message: "must be at least 1.0".to_string(),
                });
            }
        }
        if !(self.artificial_link_freespeed > 0.0) {
            return Err(ConfigError::BadValue {
                option: "artificial_link_freespeed",
                message: "must be positive".to_string(),
            });
        }
        if !(self.shape_distance_tolerance > 0.0) {
            return Err(ConfigError::BadValue {
                option: "shape_distance_tolerance",
                message: "must be positive".to_string(),
            });
        }
        if !(self.shape_penalty_ceiling >= 1.0) {
            return Err(ConfigError::BadValue {
                option: "shape_penalty_ceiling",
                message: "must be at least 1.0".to_string(),
            });
        }
        Ok(())
    }

    pub fn network_modes_of(&self, schedule_mode: &str) -> Option<&BTreeSet<String>> {
        self.mode_routing_assignment.get(schedule_mode)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyModeAssignment,
    EmptyNetworkModes(String),
    BadValue {
        option: &'static str,
        message: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::EmptyModeAssignment => {
                write!(f, "mode_routing_assignment is empty, nothing can be mapped")
            }
            ConfigError::EmptyNetworkModes(schedule_mode) => {
                write!(
                    f,
                    "mode_routing_assignment for schedule mode `{}` has no network mode",
                    schedule_mode
                )
            }
            ConfigError::BadValue { option, message } => {
                write!(f, "bad value for option `{}` : {}", option, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
