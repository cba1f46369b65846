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

//! Planar geometry helpers. The whole model lives in a projected coordinate
//! system, so everything here is Euclidean.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

pub fn distance(from: &Coord, to: &Coord) -> f64 {
    let dx = from.x - to.x;
    let dy = from.y - to.y;
    (dx * dx + dy * dy).sqrt()
}

/// (x_min, x_max, y_min, y_max) of the square of half-width `radius`
/// centered on `coord`.
pub fn bounding_box(coord: &Coord, radius: f64) -> (f64, f64, f64, f64) {
    (
        coord.x - radius,
        coord.x + radius,
        coord.y - radius,
        coord.y + radius,
    )
}

/// Cheap precheck : the bounding box of segment [a, b] overlaps `bbox`.
/// Anything within `radius` of the box center passes this test.
pub fn segment_within_box(bbox: &(f64, f64, f64, f64), a: &Coord, b: &Coord) -> bool {
    let (x_min, x_max, y_min, y_max) = *bbox;
    a.x.min(b.x) <= x_max && a.x.max(b.x) >= x_min && a.y.min(b.y) <= y_max && a.y.max(b.y) >= y_min
}

/// The point of segment [a, b] closest to `point`.
pub fn nearest_point_on_segment(a: &Coord, b: &Coord, point: &Coord) -> Coord {
    let abx = b.x - a.x;
    let aby = b.y - a.y;
    let length_squared = abx * abx + aby * aby;
    if length_squared == 0.0 {
        return *a;
    }
    let t = ((point.x - a.x) * abx + (point.y - a.y) * aby) / length_squared;
    let t = t.max(0.0).min(1.0);
    Coord {
        x: a.x + t * abx,
        y: a.y + t * aby,
    }
}

pub fn distance_point_to_segment(a: &Coord, b: &Coord, point: &Coord) -> f64 {
    distance(point, &nearest_point_on_segment(a, b, point))
}

pub fn distance_point_to_polyline(point: &Coord, polyline: &[Coord]) -> f64 {
    if polyline.is_empty() {
        return f64::INFINITY;
    }
    if polyline.len() == 1 {
        return distance(point, &polyline[0]);
    }
    polyline
        .windows(2)
        .map(|pair| distance_point_to_segment(&pair[0], &pair[1], point))
        .fold(f64::INFINITY, f64::min)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nearest_point_clamps_to_endpoints() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(100.0, 0.0);
        let before = Coord::new(-50.0, 10.0);
        let after = Coord::new(150.0, 10.0);
        assert_eq!(nearest_point_on_segment(&a, &b, &before), a);
        assert_eq!(nearest_point_on_segment(&a, &b, &after), b);
    }

    #[test]
    fn distance_to_segment_interior() {
        let a = Coord::new(0.0, 0.0);
        let b = Coord::new(100.0, 0.0);
        let point = Coord::new(50.0, 30.0);
        assert!((distance_point_to_segment(&a, &b, &point) - 30.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let a = Coord::new(10.0, 10.0);
        let point = Coord::new(13.0, 14.0);
        assert!((distance_point_to_segment(&a, &a, &point) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn polyline_distance_takes_the_minimum() {
        let polyline = vec![
            Coord::new(0.0, 0.0),
            Coord::new(100.0, 0.0),
            Coord::new(100.0, 100.0),
        ];
        let point = Coord::new(110.0, 50.0);
        assert!((distance_point_to_polyline(&point, &polyline) - 10.0).abs() < 1e-9);
    }
}
