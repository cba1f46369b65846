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

//! End-to-end : artifacts on disk in, mapped artifacts on disk out.

mod utils;

use sleipnir::builder::ScheduleBuilder;
use sleipnir_launch::config::{InputParams, LaunchParams, OutputParams, ScheduleInput};
use sleipnir_launch::{read, run, write};
use std::fs;
use std::path::PathBuf;
use utils::{bus_config, grid_network};

fn workdir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "sleipnir_launch_{}_{}",
        name,
        std::process::id()
    ));
    let _ = fs::remove_dir_all(&dir);
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn artifacts_round_trip_through_the_pipeline() {
    let _log = utils::init_logger();
    let dir = workdir("round_trip");

    // produce the input artifacts with the writers themselves
    let network = grid_network();
    write::write_network(&network, &dir.join("network.json")).unwrap();
    let schedule = ScheduleBuilder::new()
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
        .build();
    write::write_schedule(&schedule, &dir.join("schedule.json")).unwrap();

    let params = LaunchParams {
        input: InputParams {
            network: dir.join("network.json"),
            schedule: ScheduleInput::Json {
                path: dir.join("schedule.json"),
            },
            shapes: None,
        },
        output: OutputParams {
            schedule: dir.join("mapped_schedule.json"),
            network: dir.join("mapped_network.json"),
            street_network: Some(dir.join("street_network.json")),
        },
        mapper: bus_config(),
    };

    let report = run::run(&params).unwrap();
    assert!(report.is_complete());

    let mapped_schedule = read::read_schedule(&params.output.schedule).unwrap();
    let route = mapped_schedule.route("line1", "route1").unwrap();
    assert_eq!(route.link_sequence, vec!["00_10", "10_20", "20_21"]);
    // departures and offsets survived the round trip
    assert_eq!(route.departures.len(), 1);
    assert_eq!(route.departures[0].id, "route1_01");
    assert!(route.stops[1].arrival_offset.is_some());
    for stop in &route.stops {
        let facility = mapped_schedule.facility(stop.facility);
        assert!(facility.link_id.is_some());
    }

    let mapped_network = read::read_network(&params.output.network).unwrap();
    assert!(mapped_network.link_idx("10_20").is_some());

    // the street subset keeps the grid (all links carry car)
    let street = read::read_network(&dir.join("street_network.json")).unwrap();
    assert_eq!(street.nb_of_links(), mapped_network.nb_of_links());
}

#[test]
fn a_rail_only_street_config_shrinks_the_street_subset() {
    let _log = utils::init_logger();
    let dir = workdir("street_subset");
    let network = grid_network();
    write::write_network(&network, &dir.join("network.json")).unwrap();

    // no grid link carries the tram mode
    let mut tram_only = std::collections::BTreeSet::new();
    tram_only.insert("tram".to_string());
    write::write_street_network(&network, &tram_only, &dir.join("street.json")).unwrap();
    let street = read::read_network(&dir.join("street.json")).unwrap();
    assert_eq!(street.nb_of_links(), 0);
    assert_eq!(street.nb_of_nodes(), 0);
}
