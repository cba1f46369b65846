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

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use sleipnir::MapperConfig;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Everything one mapper run needs : where the inputs are, where the
/// outputs go, and the mapper options.
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct LaunchParams {
    pub input: InputParams,
    pub output: OutputParams,
    #[serde(default)]
    pub mapper: MapperConfig,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct InputParams {
    /// network artifact (json)
    pub network: PathBuf,
    pub schedule: ScheduleInput,
    /// optional shapes artifact (json) ; merged over shapes coming from a
    /// GTFS feed
    #[serde(default)]
    pub shapes: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ScheduleInput {
    /// an unmapped schedule artifact (json)
    Json { path: PathBuf },
    /// a GTFS directory, converted to an unmapped schedule on the fly ;
    /// `day` (YYYY-MM-DD) restricts the conversion to the services active
    /// on that date
    Gtfs {
        path: PathBuf,
        #[serde(default)]
        day: Option<String>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct OutputParams {
    pub schedule: PathBuf,
    pub network: PathBuf,
    /// subset of the network restricted to the configured street modes
    #[serde(default)]
    pub street_network: Option<PathBuf>,
}

impl LaunchParams {
    pub fn read_from_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("could not open launch configuration {:?}", path))?;
        let params: LaunchParams = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("could not parse launch configuration {:?}", path))?;
        Ok(params)
    }

    /// A ready-to-edit configuration, written by the cli's
    /// `--write_default_config`.
    pub fn example() -> Self {
        let mut mapper = MapperConfig::default();
        mapper.mode_routing_assignment.insert(
            "bus".to_string(),
            vec!["bus".to_string(), "car".to_string()]
                .into_iter()
                .collect(),
        );
        mapper.mode_routing_assignment.insert(
            "rail".to_string(),
            vec!["rail".to_string()].into_iter().collect(),
        );
        Self {
            input: InputParams {
                network: PathBuf::from("network.json"),
                schedule: ScheduleInput::Gtfs {
                    path: PathBuf::from("gtfs/"),
                    day: None,
                },
                shapes: None,
            },
            output: OutputParams {
                schedule: PathBuf::from("mapped_schedule.json"),
                network: PathBuf::from("mapped_network.json"),
                street_network: None,
            },
            mapper,
        }
    }
}
