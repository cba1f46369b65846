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

use crate::finalizer::FinalizeStats;
use crate::pseudo_graph::UnmappableReason;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone)]
pub struct UnmappableRoute {
    pub line_id: String,
    pub route_id: String,
    pub reason: UnmappableReason,
}

/// What one batch did : counts, the routes left unmapped and why, and the
/// artificial links that had to be synthesized.
#[derive(Debug, Default)]
pub struct MappingReport {
    pub nb_of_routes: usize,
    pub nb_of_mapped: usize,
    /// routes without stops, never handed to the solver
    pub skipped: Vec<(String, String)>,
    pub unmappable: Vec<UnmappableRoute>,
    pub artificial_links: Vec<String>,
    pub finalize: FinalizeStats,
}

impl MappingReport {
    /// true when every route with stops was mapped
    pub fn is_complete(&self) -> bool {
        self.unmappable.is_empty()
    }
}

impl Display for MappingReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(
            f,
            "Mapped {} of {} transit routes ({} skipped, {} unmappable)",
            self.nb_of_mapped,
            self.nb_of_routes,
            self.skipped.len(),
            self.unmappable.len()
        )?;
        for unmappable in &self.unmappable {
            writeln!(
                f,
                "  route `{}` of line `{}` could not be mapped : {}",
                unmappable.route_id, unmappable.line_id, unmappable.reason
            )?;
        }
        if !self.artificial_links.is_empty() {
            writeln!(
                f,
                "Emitted {} artificial links : {}",
                self.artificial_links.len(),
                self.artificial_links.join(", ")
            )?;
        }
        write!(
            f,
            "Finalizer removed {} unused artificial links, raised {} freespeeds, pruned {} links and {} nodes, dropped {} stop facilities",
            self.finalize.removed_artificial_links,
            self.finalize.raised_freespeed_links,
            self.finalize.removed_orphan_links,
            self.finalize.removed_orphan_nodes,
            self.finalize.removed_facilities,
        )
    }
}
