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

//! One-call pipeline : read the artifacts, map, check, write.

use crate::config::{LaunchParams, ScheduleInput};
use crate::gtfs::{self, ServiceFilter};
use crate::read;
use crate::timer::Timer;
use crate::write;
use anyhow::Result;
use sleipnir::schedule_check::check_schedule;
use sleipnir::tracing::{info, warn};
use sleipnir::{MappingReport, PTMapper, Shapes};

pub fn run(params: &LaunchParams) -> Result<MappingReport> {
    let read_timer = Timer::start();
    let mut network = read::read_network(&params.input.network)?;
    let (mut schedule, mut shapes) = match &params.input.schedule {
        ScheduleInput::Json { path } => (read::read_schedule(path)?, Shapes::new()),
        ScheduleInput::Gtfs { path, day } => {
            let filter = ServiceFilter::from_option(day)?;
            gtfs::convert(path, &filter)?
        }
    };
    if let Some(path) = &params.input.shapes {
        // a dedicated shapes artifact overrides feed shapes with the same id
        shapes.extend(read::read_shapes(path)?);
    }
    info!("Inputs loaded in {}", read_timer.elapsed());

    let mapping_timer = Timer::start();
    let report = PTMapper::new(&mut schedule, &mut network).run(&params.mapper, &shapes)?;
    info!("Mapping finished in {}", mapping_timer.elapsed());

    let check = check_schedule(&schedule, &network, &params.mapper);
    if check.is_valid() {
        info!("Mapped schedule is plausible");
    } else {
        warn!("{}", check);
    }

    write::write_schedule(&schedule, &params.output.schedule)?;
    write::write_network(&network, &params.output.network)?;
    if let Some(path) = &params.output.street_network {
        write::write_street_network(&network, &params.mapper.street_modes, path)?;
    }
    Ok(report)
}
