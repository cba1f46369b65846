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

//! Batch orchestration of the mapper.
//!
//! The batch has four phases :
//! 1. a sequential candidate pre-phase, the only pre-commit network mutation
//!    (artificial stop links) ;
//! 2. a parallel solve phase, one task per transit route over read-only
//!    inputs, producing per-route buffers ;
//! 3. a sequential commit phase in (line id, route id) order, so the output
//!    is a pure function of inputs and configuration whatever the worker
//!    count ;
//! 4. finalization.

use crate::candidates;
use crate::config::{ConfigError, MapperConfig};
use crate::finalizer;
use crate::geometry::Coord;
use crate::materializer::{self, CommitContext};
use crate::model::network::Network;
use crate::model::schedule::{FacilityIdx, TransitSchedule};
use crate::model::shape::Shapes;
use crate::pseudo_graph::{self, RouteSolution, StopContext, UnmappableReason};
use crate::report::{MappingReport, UnmappableRoute};
use crate::router::ScheduleRouters;
use rayon::prelude::*;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime};
use tracing::{info, warn};

/// Maps a transit schedule onto a network, in place.
///
/// ```
/// # use sleipnir::builder::{NetworkBuilder, ScheduleBuilder};
/// # use sleipnir::{MapperConfig, PTMapper};
/// # let mut network = NetworkBuilder::new()
/// #     .node("a", 0.0, 0.0)
/// #     .node("b", 100.0, 0.0)
/// #     .link("ab", "a", "b", |link| { link.modes(&["bus"]); })
/// #     .build();
/// # let mut schedule = ScheduleBuilder::new()
/// #     .stop("s", 50.0, 0.0)
/// #     .route("line", "route", |route| {
/// #         route.mode("bus").st("s", "00:00:00", "00:00:00");
/// #     })
/// #     .build();
/// let mut config = MapperConfig::default();
/// config.mode_routing_assignment.insert(
///     "bus".to_string(),
///     vec!["bus".to_string()].into_iter().collect(),
/// );
/// let report = PTMapper::new(&mut schedule, &mut network)
///     .run(&config, &Default::default())
///     .unwrap();
/// assert!(report.is_complete());
/// ```
pub struct PTMapper<'a> {
    schedule: &'a mut TransitSchedule,
    network: &'a mut Network,
}

struct RouteTask {
    line_id: String,
    route_id: String,
    mode: String,
    stops: Vec<(FacilityIdx, String, Coord)>,
    shape_id: Option<String>,
}

impl<'a> PTMapper<'a> {
    pub fn new(schedule: &'a mut TransitSchedule, network: &'a mut Network) -> Self {
        Self { schedule, network }
    }

    pub fn run(self, config: &MapperConfig, shapes: &Shapes) -> Result<MappingReport, MappingError> {
        let cancel = AtomicBool::new(false);
        self.run_cancellable(config, shapes, &cancel)
    }

    /// Like [`PTMapper::run`], but workers stop picking up routes once
    /// `cancel` is raised ; a cancelled batch discards all partial work and
    /// leaves schedule and network untouched by the commit phase.
    pub fn run_cancellable(
        self,
        config: &MapperConfig,
        shapes: &Shapes,
        cancel: &AtomicBool,
    ) -> Result<MappingReport, MappingError> {
        let schedule = self.schedule;
        let network = self.network;

        config.check()?;
        validate_inputs(schedule, config)?;

        let batch_timer = SystemTime::now();
        let (link_candidates, mut artificial_links) =
            candidates::create_candidates(schedule, network, config);
        let routers = ScheduleRouters::new(network, schedule, config);

        let mut tasks: Vec<RouteTask> = Vec::new();
        let mut skipped: Vec<(String, String)> = Vec::new();
        let mut nb_of_routes = 0usize;
        for (line_id, route) in schedule.routes() {
            nb_of_routes += 1;
            if route.stops.is_empty() {
                skipped.push((line_id.to_string(), route.id.clone()));
                continue;
            }
            tasks.push(RouteTask {
                line_id: line_id.to_string(),
                route_id: route.id.clone(),
                mode: route.mode.clone(),
                stops: route
                    .stops
                    .iter()
                    .map(|stop| {
                        let facility = schedule.facility(stop.facility);
                        (stop.facility, facility.id.clone(), facility.coord)
                    })
                    .collect(),
                shape_id: route.shape_id.clone(),
            });
        }

        info!(
            "Solving {} transit routes on {} threads",
            tasks.len(),
            config.n_threads
        );
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.n_threads)
            .build()
            .map_err(|err| MappingError::ThreadPool(err.to_string()))?;

        let network_ref: &Network = network;
        let solutions: Vec<Result<RouteSolution, UnmappableReason>> = pool.install(|| {
            tasks
                .par_iter()
                .map(|task| {
                    if cancel.load(Ordering::Relaxed) {
                        return Err(UnmappableReason::Cancelled);
                    }
                    let deadline = config.route_solve_timeout.map(|budget| {
                        Instant::now() + Duration::from_secs(u64::from(budget.total_seconds()))
                    });
                    let shape = task.shape_id.as_deref().and_then(|id| shapes.get(id));
                    let router = routers
                        .router(network_ref, config, &task.mode, shape)
                        .expect("route modes were validated against the assignment");
                    let stop_contexts: Vec<StopContext<'_>> = task
                        .stops
                        .iter()
                        .map(|(facility, stop_id, coord)| StopContext {
                            stop_id,
                            coord: *coord,
                            candidates: link_candidates.get(*facility, &task.mode),
                        })
                        .collect();
                    pseudo_graph::solve(network_ref, &router, &stop_contexts, config, deadline)
                })
                .collect()
        });

        if cancel.load(Ordering::Relaxed) {
            return Err(MappingError::Cancelled);
        }

        // commit phase : single-threaded, deterministic task order
        let mut context = CommitContext::new();
        let mut unmappable: Vec<UnmappableRoute> = Vec::new();
        let mut nb_of_mapped = 0usize;
        for (task, solution) in tasks.iter().zip(solutions) {
            match solution {
                Ok(solution) => {
                    let network_modes = config
                        .network_modes_of(&task.mode)
                        .expect("route modes were validated against the assignment");
                    materializer::commit_route(
                        schedule,
                        network,
                        &mut context,
                        &task.line_id,
                        &task.route_id,
                        network_modes,
                        config,
                        &solution,
                    );
                    nb_of_mapped += 1;
                }
                Err(reason) => {
                    warn!(
                        "Route `{}` of line `{}` is unmappable : {}",
                        task.route_id, task.line_id, reason
                    );
                    unmappable.push(UnmappableRoute {
                        line_id: task.line_id.clone(),
                        route_id: task.route_id.clone(),
                        reason,
                    });
                }
            }
        }
        artificial_links.extend(context.created_artificial.drain(..));

        // unmappable routes are excluded from the output schedule
        for failed in &unmappable {
            if let Some(line) = schedule.lines.get_mut(&failed.line_id) {
                line.routes.remove(&failed.route_id);
            }
        }
        schedule.lines.retain(|_, line| !line.routes.is_empty());

        let finalize = finalizer::finalize(schedule, network, config);

        let report = MappingReport {
            nb_of_routes,
            nb_of_mapped,
            skipped,
            unmappable,
            artificial_links,
            finalize,
        };
        match batch_timer.elapsed() {
            Ok(elapsed) => info!("Mapping done in {} ms", elapsed.as_millis()),
            Err(err) => warn!("Timer error : {}", err),
        }
        info!("{}", report);
        Ok(report)
    }
}

fn validate_inputs(
    schedule: &TransitSchedule,
    config: &MapperConfig,
) -> Result<(), MappingError> {
    for (line_id, route) in schedule.routes() {
        if config.network_modes_of(&route.mode).is_none() {
            return Err(MappingError::MissingModeAssignment {
                line_id: line_id.to_string(),
                route_id: route.id.clone(),
                mode: route.mode.clone(),
            });
        }
    }
    for (_, facility) in schedule.facilities() {
        if !facility.coord.is_finite() {
            return Err(MappingError::BadStopCoordinate(facility.id.clone()));
        }
    }
    Ok(())
}

#[derive(Debug)]
pub enum MappingError {
    Config(ConfigError),
    MissingModeAssignment {
        line_id: String,
        route_id: String,
        mode: String,
    },
    BadStopCoordinate(String),
    ThreadPool(String),
    Cancelled,
}

impl Display for MappingError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MappingError::Config(err) => write!(f, "{}", err),
            MappingError::MissingModeAssignment {
                line_id,
                route_id,
                mode,
            } => {
                write!(
                    f,
                    "route `{}` of line `{}` uses schedule mode `{}` which has no entry in mode_routing_assignment",
                    route_id, line_id, mode
                )
            }
            MappingError::BadStopCoordinate(facility_id) => {
                write!(
                    f,
                    "stop facility `{}` has a non-finite coordinate",
                    facility_id
                )
            }
            MappingError::ThreadPool(message) => {
                write!(f, "could not build the worker pool : {}", message)
            }
            MappingError::Cancelled => write!(f, "the batch was cancelled"),
        }
    }
}

impl std::error::Error for MappingError {}

impl From<ConfigError> for MappingError {
    fn from(err: ConfigError) -> Self {
        MappingError::Config(err)
    }
}
