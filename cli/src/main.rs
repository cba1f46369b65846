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

use anyhow::{bail, Context, Result};
use sleipnir_launch::config::LaunchParams;
use sleipnir_launch::{logger, run};
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(StructOpt, Debug)]
#[structopt(
    name = "sleipnir",
    about = "Maps a public transit schedule onto a multimodal network",
    rename_all = "snake_case"
)]
struct Options {
    /// path to the launch configuration file (json)
    #[structopt(parse(from_os_str))]
    config: PathBuf,

    /// write a default launch configuration to the given path and exit
    #[structopt(long)]
    write_default_config: bool,

    /// worker count, overrides the configuration
    #[structopt(long)]
    n_threads: Option<usize>,
}

fn main() -> Result<()> {
    logger::init_logger();
    let options = Options::from_args();

    if options.write_default_config {
        if options.config.exists() {
            bail!(
                "{:?} already exists, refusing to overwrite it",
                options.config
            );
        }
        let example = serde_json::to_string_pretty(&LaunchParams::example())?;
        std::fs::write(&options.config, example)
            .with_context(|| format!("could not write {:?}", options.config))?;
        println!("Default configuration written to {:?}", options.config);
        return Ok(());
    }

    let mut params = LaunchParams::read_from_file(&options.config)?;
    if let Some(n_threads) = options.n_threads {
        params.mapper.n_threads = n_threads;
    }
    let report = run::run(&params)?;
    println!("{}", report);
    if !report.is_complete() {
        bail!("{} routes could not be mapped", report.unmappable.len());
    }
    Ok(())
}
