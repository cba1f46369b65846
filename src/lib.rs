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

//! Maps a public transit schedule onto a multimodal network : every transit
//! route ends up with an explicit sequence of network links, every transit
//! stop with a link it is physically served on.
//!
//! The pipeline is
//! candidates -> per-mode routers -> per-route pseudo-graph -> materializer
//! -> finalizer, orchestrated by [`PTMapper`].

pub use tracing;

pub mod builder;
pub mod config;
pub mod geometry;
pub mod mapper;
pub mod model;
pub mod report;
pub mod schedule_check;
pub mod time;

mod candidates;
mod finalizer;
mod materializer;
mod pseudo_graph;
mod router;

pub use config::{MapperConfig, TravelCostType};
pub use finalizer::FinalizeStats;
pub use mapper::{MappingError, PTMapper};
pub use model::network::{Network, ARTIFICIAL_LINK_MODE};
pub use model::schedule::TransitSchedule;
pub use model::shape::{RouteShape, Shapes};
pub use pseudo_graph::UnmappableReason;
pub use report::{MappingReport, UnmappableRoute};
pub use time::PositiveDuration;
