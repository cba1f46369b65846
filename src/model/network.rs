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

//! The directed multigraph of nodes and links the schedule is mapped onto.
//!
//! Nodes and links live in `Vec` arenas addressed by `Copy` index types ;
//! string identifiers only appear at the edges of the model.

use crate::geometry::{
    bounding_box, distance_point_to_segment, segment_within_box, Coord,
};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt::{Display, Formatter};

/// Sentinel mode tag carried by artificial stop links until the finalizer
/// strips it.
pub const ARTIFICIAL_LINK_MODE: &str = "artificial";

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct NodeIdx {
    pub(crate) idx: usize,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash)]
pub struct LinkIdx {
    pub(crate) idx: usize,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: String,
    pub coord: Coord,
}

#[derive(Debug, Clone)]
pub struct Link {
    pub id: String,
    pub from: NodeIdx,
    pub to: NodeIdx,
    pub length: f64,
    pub freespeed: f64,
    pub capacity: f64,
    pub modes: BTreeSet<String>,
}

impl Link {
    pub fn is_loop(&self) -> bool {
        self.from == self.to
    }

    pub fn permits_any_of(&self, modes: &BTreeSet<String>) -> bool {
        modes.iter().any(|mode| self.modes.contains(mode))
    }
}

#[derive(Debug, Default, Clone)]
pub struct Network {
    nodes: Vec<Node>,
    links: Vec<Link>,
    node_id_to_idx: HashMap<String, NodeIdx>,
    link_id_to_idx: HashMap<String, LinkIdx>,
    out_links: Vec<Vec<LinkIdx>>,
    in_links: Vec<Vec<LinkIdx>>,
}

impl Network {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nb_of_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn nb_of_links(&self) -> usize {
        self.links.len()
    }

    pub fn add_node(&mut self, id: String, coord: Coord) -> Result<NodeIdx, NetworkError> {
        if self.node_id_to_idx.contains_key(&id) {
            return Err(NetworkError::DuplicateNodeId(id));
        }
        let idx = NodeIdx {
            idx: self.nodes.len(),
        };
        self.node_id_to_idx.insert(id.clone(), idx);
        self.nodes.push(Node { id, coord });
        self.out_links.push(Vec::new());
        self.in_links.push(Vec::new());
        Ok(idx)
    }

    #[allow(clippy::too_many_arguments)]
    pub fn add_link(
        &mut self,
        id: String,
        from_id: &str,
        to_id: &str,
        length: f64,
        freespeed: f64,
        capacity: f64,
        modes: BTreeSet<String>,
    ) -> Result<LinkIdx, NetworkError> {
        if self.link_id_to_idx.contains_key(&id) {
            return Err(NetworkError::DuplicateLinkId(id));
        }
        let from = self
            .node_idx(from_id)
            .ok_or_else(|| NetworkError::UnknownNode {
                link_id: id.clone(),
                node_id: from_id.to_string(),
            })?;
        let to = self
            .node_idx(to_id)
            .ok_or_else(|| NetworkError::UnknownNode {
                link_id: id.clone(),
                node_id: to_id.to_string(),
            })?;
        let idx = LinkIdx {
            idx: self.links.len(),
        };
        self.link_id_to_idx.insert(id.clone(), idx);
        self.out_links[from.idx].push(idx);
        self.in_links[to.idx].push(idx);
        self.links.push(Link {
            id,
            from,
            to,
            length,
            freespeed,
            capacity,
            modes,
        });
        Ok(idx)
    }

    pub fn node(&self, idx: NodeIdx) -> &Node {
        &self.nodes[idx.idx]
    }

    pub fn link(&self, idx: LinkIdx) -> &Link {
        &self.links[idx.idx]
    }

    pub fn node_idx(&self, id: &str) -> Option<NodeIdx> {
        self.node_id_to_idx.get(id).copied()
    }

    pub fn link_idx(&self, id: &str) -> Option<LinkIdx> {
        self.link_id_to_idx.get(id).copied()
    }

    pub fn contains_node_id(&self, id: &str) -> bool {
        self.node_id_to_idx.contains_key(id)
    }

    pub fn contains_link_id(&self, id: &str) -> bool {
        self.link_id_to_idx.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = (NodeIdx, &Node)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(idx, node)| (NodeIdx { idx }, node))
    }

    pub fn links(&self) -> impl Iterator<Item = (LinkIdx, &Link)> {
        self.links
            .iter()
            .enumerate()
            .map(|(idx, link)| (LinkIdx { idx }, link))
    }

    pub fn out_links(&self, node: NodeIdx) -> &[LinkIdx] {
        &self.out_links[node.idx]
    }

    pub fn in_links(&self, node: NodeIdx) -> &[LinkIdx] {
        &self.in_links[node.idx]
    }

    /// Links whose nearest point lies within `radius` of `coord`, with that
    /// distance. A bounding-box precheck avoids the segment projection for
    /// links that cannot qualify.
    pub fn links_within<'a>(&'a self, coord: &Coord, radius: f64) -> LinksWithin<'a> {
        LinksWithin {
            network: self,
            coord: *coord,
            radius,
            bbox: bounding_box(coord, radius),
            next_idx: 0,
        }
    }

    pub fn add_link_mode(&mut self, idx: LinkIdx, mode: &str) {
        self.links[idx.idx].modes.insert(mode.to_string());
    }

    pub fn remove_link_mode(&mut self, idx: LinkIdx, mode: &str) {
        self.links[idx.idx].modes.remove(mode);
    }

    /// Raises the link freespeed to `target` ; never lowers it.
    /// Returns whether anything changed.
    pub fn raise_freespeed(&mut self, idx: LinkIdx, target: f64) -> bool {
        let link = &mut self.links[idx.idx];
        if target.is_finite() && target > link.freespeed {
            link.freespeed = target;
            true
        } else {
            false
        }
    }

    /// Drops the given links and rebuilds the arenas.
    /// All previously obtained `LinkIdx` values are invalidated.
    pub fn remove_links(&mut self, remove: &HashSet<LinkIdx>) {
        if remove.is_empty() {
            return;
        }
        let old_links = std::mem::take(&mut self.links);
        self.link_id_to_idx.clear();
        for (old_idx, link) in old_links.into_iter().enumerate() {
            if remove.contains(&LinkIdx { idx: old_idx }) {
                continue;
            }
            let idx = LinkIdx {
                idx: self.links.len(),
            };
            self.link_id_to_idx.insert(link.id.clone(), idx);
            self.links.push(link);
        }
        self.rebuild_adjacency();
    }

    /// Drops every node that no remaining link touches.
    /// All previously obtained `NodeIdx` and `LinkIdx` values are invalidated.
    pub fn remove_unconnected_nodes(&mut self) {
        let mut connected = vec![false; self.nodes.len()];
        for link in &self.links {
            connected[link.from.idx] = true;
            connected[link.to.idx] = true;
        }
        if connected.iter().all(|used| *used) {
            return;
        }
        let old_nodes = std::mem::take(&mut self.nodes);
        self.node_id_to_idx.clear();
        let mut remap = vec![None; old_nodes.len()];
        for (old_idx, node) in old_nodes.into_iter().enumerate() {
            if !connected[old_idx] {
                continue;
            }
            let idx = NodeIdx {
                idx: self.nodes.len(),
            };
            remap[old_idx] = Some(idx);
            self.node_id_to_idx.insert(node.id.clone(), idx);
            self.nodes.push(node);
        }
        for link in &mut self.links {
            // both endpoints are connected by construction
            link.from = remap[link.from.idx].unwrap();
            link.to = remap[link.to.idx].unwrap();
        }
        self.rebuild_adjacency();
    }

    fn rebuild_adjacency(&mut self) {
        self.out_links = vec![Vec::new(); self.nodes.len()];
        self.in_links = vec![Vec::new(); self.nodes.len()];
        for (idx, link) in self.links.iter().enumerate() {
            let link_idx = LinkIdx { idx };
            self.out_links[link.from.idx].push(link_idx);
            self.in_links[link.to.idx].push(link_idx);
        }
    }
}

pub struct LinksWithin<'a> {
    network: &'a Network,
    coord: Coord,
    radius: f64,
    bbox: (f64, f64, f64, f64),
    next_idx: usize,
}

impl<'a> Iterator for LinksWithin<'a> {
    type Item = (LinkIdx, f64);

    fn next(&mut self) -> Option<Self::Item> {
        while self.next_idx < self.network.links.len() {
            let idx = LinkIdx { idx: self.next_idx };
            self.next_idx += 1;
            let link = self.network.link(idx);
            let from = &self.network.node(link.from).coord;
            let to = &self.network.node(link.to).coord;
            // cheap check first, the projection only runs for plausible links
            if !segment_within_box(&self.bbox, from, to) {
                continue;
            }
            let distance = distance_point_to_segment(from, to, &self.coord);
            if distance <= self.radius {
                return Some((idx, distance));
            }
        }
        None
    }
}

#[derive(Debug)]
pub enum NetworkError {
    DuplicateNodeId(String),
    DuplicateLinkId(String),
    UnknownNode { link_id: String, node_id: String },
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            NetworkError::DuplicateNodeId(id) => {
                write!(f, "duplicate node id `{}`", id)
            }
            NetworkError::DuplicateLinkId(id) => {
                write!(f, "duplicate link id `{}`", id)
            }
            NetworkError::UnknownNode { link_id, node_id } => {
                write!(f, "link `{}` references unknown node `{}`", link_id, node_id)
            }
        }
    }
}

impl std::error::Error for NetworkError {}
