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

use sleipnir::builder::{NetworkBuilder, ScheduleBuilder};
use sleipnir::{Network, PTMapper, Shapes};
use utils::{bound_facility, bus_config};

/// two parallel one-way streets with no connection between them
fn parallel_streets() -> Network {
    NetworkBuilder::new()
        .node("w0", 0.0, 0.0)
        .node("e0", 200.0, 0.0)
        .node("w1", 0.0, 30.0)
        .node("e1", 200.0, 30.0)
        .link("bottom", "w0", "e0", |link| {
            link.modes(&["bus"]);
        })
        .link("top", "w1", "e1", |link| {
            link.modes(&["bus"]);
        })
        .build()
}

#[test]
fn routes_disagreeing_on_a_stop_get_their_own_child_facility() {
    let _log = utils::init_logger();
    let mut network = parallel_streets();
    // the shared stop is a bit closer to the bottom street ; route2 still
    // binds it to the top street because its other stop lives there
    let mut schedule = ScheduleBuilder::new()
        .stop("a", 50.0, 0.0)
        .stop("shared", 100.0, 10.0)
        .stop("b", 100.0, 40.0)
        .route("line1", "route1", |route| {
            route
                .mode("bus")
                .st("a", "00:00:00", "00:00:00")
                .st("shared", "00:02:00", "00:02:00");
        })
        .route("line1", "route2", |route| {
            route
                .mode("bus")
                .st("shared", "00:00:00", "00:00:00")
                .st("b", "00:02:00", "00:02:00");
        })
        .build();
    let config = bus_config();

    let report = PTMapper::new(&mut schedule, &mut network)
        .run(&config, &Shapes::new())
        .unwrap();

    assert!(report.is_complete());
    assert!(report.artificial_links.is_empty());
    assert_eq!(
        bound_facility(&schedule, "line1", "route1", 1),
        "shared.link:bottom"
    );
    assert_eq!(
        bound_facility(&schedule, "line1", "route2", 0),
        "shared.link:top"
    );
    // with remove_not_used_stop_facilities on, the parent is gone
    assert!(schedule.facility_idx("shared").is_none());
    assert!(schedule.facility_idx("shared.link:bottom").is_some());
    assert!(schedule.facility_idx("shared.link:top").is_some());
}

#[test]
fn the_parent_survives_when_removal_is_disabled() {
    let _log = utils::init_logger();
    let mut network = parallel_streets();
    let mut schedule = ScheduleBuilder::new()
        .stop("a", 50.0, 0.0)
        .stop("shared", 100.0, 10.0)
        .route("line1", "route1", |route| {
            route
                .mode("bus")
                .st("a", "00:00:00", "00:00:00")
                .st("shared", "00:02:00", "00:02:00");
        })
        .build();
    let mut config = bus_config();
    config.remove_not_used_stop_facilities = false;

    PTMapper::new(&mut schedule, &mut network)
        .run(&config, &Shapes::new())
        .unwrap();

    assert!(schedule.facility_idx("shared").is_some());
    assert!(schedule.facility_idx("shared.link:bottom").is_some());
}
