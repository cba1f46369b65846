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
use sleipnir::geometry::Coord;
use sleipnir::model::shape::RouteShape;
use sleipnir::schedule_check::check_schedule;
use sleipnir::{PTMapper, Shapes, TransitSchedule, ARTIFICIAL_LINK_MODE};
use utils::{bus_config, grid_network, link_sequence};

fn shaped_schedule() -> TransitSchedule {
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
                .departure("08:00:00")
                .shape("detour");
        })
        .build()
}

/// the shape leaves the bottom row at (100,0), climbs to (100,100) and
/// follows the middle row east : a longer trajectory than the direct one
fn detour_shapes() -> Shapes {
    let mut shapes = Shapes::new();
    shapes.insert(
        "detour".to_string(),
        RouteShape {
            id: "detour".to_string(),
            points: vec![
                Coord::new(0.0, 0.0),
                Coord::new(100.0, 0.0),
                Coord::new(100.0, 100.0),
                Coord::new(200.0, 100.0),
                Coord::new(250.0, 100.0),
            ],
        },
    );
    shapes
}

#[test]
fn the_shape_pulls_the_route_onto_the_detour() {
    let _log = utils::init_logger();
    let config = bus_config();

    // without the shape the direct bottom-row path wins
    let mut network = grid_network();
    let mut schedule = shaped_schedule();
    PTMapper::new(&mut schedule, &mut network)
        .run(&config, &Shapes::new())
        .unwrap();
    assert_eq!(
        link_sequence(&schedule, "line1", "route1"),
        vec!["00_10", "10_20", "20_21"]
    );

    // with it, the biased costs make the longer detour cheaper
    let mut network = grid_network();
    let mut schedule = shaped_schedule();
    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&config, &detour_shapes())
        .unwrap();
    assert!(report.is_complete());
    assert_eq!(
        link_sequence(&schedule, "line1", "route1"),
        vec!["00_10", "10_11", "11_21"]
    );
}

#[test]
fn the_shape_mapped_schedule_is_plausible() {
    let _log = utils::init_logger();
    let config = bus_config();
    let mut network = grid_network();
    let mut schedule = shaped_schedule();
    PTMapper::new(&mut schedule, &mut network)
        .run(&config, &detour_shapes())
        .unwrap();
    assert!(check_schedule(&schedule, &network, &config).is_valid());
}

#[test]
fn no_link_keeps_the_artificial_mode() {
    let _log = utils::init_logger();
    let config = bus_config();
    let mut network = grid_network();
    let mut schedule = shaped_schedule();
    PTMapper::new(&mut schedule, &mut network)
        .run(&config, &detour_shapes())
        .unwrap();
    for (_, link) in network.links() {
        assert!(!link.modes.contains(ARTIFICIAL_LINK_MODE));
    }
}
