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

mod utils;

use sleipnir::builder::ScheduleBuilder;
use sleipnir::schedule_check::check_schedule;
use sleipnir::{PTMapper, PositiveDuration, Shapes, TransitSchedule, UnmappableReason};
use utils::{bound_facility, bus_config, grid_network, grid_network_without, link_sequence};

fn three_stop_schedule() -> TransitSchedule {
    ScheduleBuilder::new()
        .stop("s1", 50.0, 0.0)
        .stop("s2", 150.0, 0.0)
        .stop("s3", 250.0, 100.0)
        .route("line1", "route1", |route| {
            route
                .mode("bus")
                .st("s1", "00:00:00", "00:00:00")
                .st("s2", "00:02:00", "00:02:00")
                .st("s3", "00:05:00", "00:05:00")
                .departure("08:00:00");
        })
        .build()
}

#[test]
fn bottom_row_route_follows_the_bottom_row() {
    let _log = utils::init_logger();
    let mut network = grid_network();
    let mut schedule = three_stop_schedule();

    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&bus_config(), &Shapes::new())
        .unwrap();

    assert!(report.is_complete());
    assert!(report.artificial_links.is_empty());
    assert_eq!(
        link_sequence(&schedule, "line1", "route1"),
        vec!["00_10", "10_20", "20_21"]
    );
    assert_eq!(
        bound_facility(&schedule, "line1", "route1", 2),
        "s3.link:20_21"
    );
    assert!(check_schedule(&schedule, &network, &bus_config()).is_valid());
}

#[test]
fn a_missing_link_forces_a_detour() {
    let _log = utils::init_logger();
    // the bottom middle edge is gone in both directions
    let mut network = grid_network_without(&["10_20", "20_10"]);
    let mut schedule = three_stop_schedule();

    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&bus_config(), &Shapes::new())
        .unwrap();

    assert!(report.is_complete());
    assert!(report.artificial_links.is_empty());
    assert_eq!(
        link_sequence(&schedule, "line1", "route1"),
        vec!["00_10", "10_11", "11_21"]
    );
    assert_eq!(
        bound_facility(&schedule, "line1", "route1", 2),
        "s3.link:11_21"
    );
    assert!(check_schedule(&schedule, &network, &bus_config()).is_valid());
}

#[test]
fn a_single_stop_route_gets_a_single_link() {
    let _log = utils::init_logger();
    let mut network = grid_network();
    let mut schedule = ScheduleBuilder::new()
        .stop("s1", 50.0, 0.0)
        .route("line1", "route1", |route| {
            route.mode("bus").st("s1", "00:00:00", "00:00:00");
        })
        .build();

    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&bus_config(), &Shapes::new())
        .unwrap();

    assert!(report.is_complete());
    // both directions sit at distance zero, the lower link id wins
    assert_eq!(link_sequence(&schedule, "line1", "route1"), vec!["00_10"]);
}

#[test]
fn stops_sharing_a_candidate_link_collapse_to_it() {
    let _log = utils::init_logger();
    let mut network = grid_network();
    let mut schedule = ScheduleBuilder::new()
        .stop("s1", 30.0, 5.0)
        .stop("s2", 70.0, 5.0)
        .route("line1", "route1", |route| {
            route
                .mode("bus")
                .st("s1", "00:00:00", "00:00:00")
                .st("s2", "00:01:00", "00:01:00");
        })
        .build();

    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&bus_config(), &Shapes::new())
        .unwrap();

    assert!(report.is_complete());
    assert_eq!(link_sequence(&schedule, "line1", "route1"), vec!["00_10"]);
    assert_eq!(
        bound_facility(&schedule, "line1", "route1", 0),
        "s1.link:00_10"
    );
    assert_eq!(
        bound_facility(&schedule, "line1", "route1", 1),
        "s2.link:00_10"
    );
}

#[test]
fn an_exhausted_route_budget_makes_the_route_unmappable() {
    let _log = utils::init_logger();
    let mut network = grid_network();
    let mut schedule = three_stop_schedule();
    let mut config = bus_config();
    config.route_solve_timeout = Some(PositiveDuration::zero());

    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&config, &Shapes::new())
        .unwrap();

    assert_eq!(report.nb_of_mapped, 0);
    assert_eq!(report.unmappable.len(), 1);
    assert_eq!(report.unmappable[0].reason, UnmappableReason::Timeout);
}

#[test]
fn mapping_is_deterministic_across_runs_and_worker_counts() {
    let _log = utils::init_logger();
    let mut sequences = Vec::new();
    let mut facility_sets = Vec::new();
    for n_threads in &[1usize, 4] {
        let mut network = grid_network();
        let mut schedule = three_stop_schedule();
        let mut config = bus_config();
        config.n_threads = *n_threads;
        PTMapper::new(&mut schedule, &mut network)
            .run(&config, &Shapes::new())
            .unwrap();
        sequences.push(link_sequence(&schedule, "line1", "route1"));
        let mut facilities: Vec<String> = schedule
            .facilities()
            .map(|(_, facility)| {
                format!("{}>{}", facility.id, facility.link_id.as_deref().unwrap_or("-"))
            })
            .collect();
        facilities.sort();
        facility_sets.push(facilities);
    }
    assert_eq!(sequences[0], sequences[1]);
    assert_eq!(facility_sets[0], facility_sets[1]);
}

#[test]
fn remapping_a_mapped_schedule_changes_nothing() {
    let _log = utils::init_logger();
    let mut network = grid_network();
    let mut schedule = three_stop_schedule();
    let config = bus_config();

    PTMapper::new(&mut schedule, &mut network)
        .run(&config, &Shapes::new())
        .unwrap();
    let first_sequence = link_sequence(&schedule, "line1", "route1");
    let first_facilities = schedule.nb_of_facilities();

    // second pass over the already mapped artifacts
    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&config, &Shapes::new())
        .unwrap();

    assert!(report.is_complete());
    assert!(report.artificial_links.is_empty());
    assert_eq!(link_sequence(&schedule, "line1", "route1"), first_sequence);
    assert_eq!(schedule.nb_of_facilities(), first_facilities);
}
