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

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// A duration in seconds, also used for offsets and departure times
/// counted from the start of the service day.
#[derive(
    Debug, Eq, PartialEq, Clone, Copy, Ord, PartialOrd, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct PositiveDuration {
    seconds: u32,
}

impl PositiveDuration {
    pub fn zero() -> Self {
        Self { seconds: 0 }
    }

    pub const fn from_seconds(seconds: u32) -> Self {
        Self { seconds }
    }

    pub const fn from_hms(hours: u32, minutes: u32, seconds: u32) -> Self {
        let total_seconds = seconds + 60 * minutes + 60 * 60 * hours;
        Self {
            seconds: total_seconds,
        }
    }

    pub fn total_seconds(&self) -> u32 {
        self.seconds
    }

    pub fn as_secs_f64(&self) -> f64 {
        f64::from(self.seconds)
    }

    pub fn saturating_sub(&self, other: Self) -> Self {
        Self {
            seconds: self.seconds.saturating_sub(other.seconds),
        }
    }
}

impl Display for PositiveDuration {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let hours = self.seconds / (60 * 60);
        let minutes_in_secs = self.seconds % (60 * 60);
        let minutes = minutes_in_secs / 60;
        let seconds = minutes_in_secs % 60;
        if hours != 0 {
            write!(f, "{}h{:02}m{:02}s", hours, minutes, seconds)
        } else if minutes != 0 {
            write!(f, "{}m{:02}s", minutes, seconds)
        } else {
            write!(f, "{}s", seconds)
        }
    }
}

#[derive(Debug)]
pub struct DurationParseError {
    text: String,
}

impl Display for DurationParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Unable to parse `{}` as a duration. Expected format is hh:mm:ss",
            self.text
        )
    }
}

impl std::error::Error for DurationParseError {}

impl std::str::FromStr for PositiveDuration {
    type Err = DurationParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mk_err = || DurationParseError {
            text: s.to_string(),
        };
        let mut parts = s.split(':');
        let hours: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(&mk_err)?;
        let minutes: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(&mk_err)?;
        let seconds: u32 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .ok_or_else(&mk_err)?;
        if parts.next().is_some() || minutes >= 60 || seconds >= 60 {
            return Err(mk_err());
        }
        Ok(PositiveDuration::from_hms(hours, minutes, seconds))
    }
}

impl std::ops::Add for PositiveDuration {
    type Output = PositiveDuration;

    fn add(self, other: Self) -> Self::Output {
        PositiveDuration {
            seconds: self.seconds + other.seconds,
        }
    }
}
