// SPDX-License-Identifier: MIT
// Copyright 2026 RideLink contributors

//! Geographic primitives shared by both socket protocols.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate. Immutable value type.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub latitude: f64,
    pub longitude: f64,
}

impl Point {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<geo::Coord<f64>> for Point {
    fn from(coord: geo::Coord<f64>) -> Self {
        // geo convention: x = longitude, y = latitude
        Self {
            latitude: coord.y,
            longitude: coord.x,
        }
    }
}

/// One directed segment of a driver's declared route.
///
/// Order is significant: a route is the consecutive pairs of an ordered
/// polyline, in direction of travel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    pub start: Point,
    pub end: Point,
}

impl RouteSegment {
    /// Build the segment list from an ordered polyline.
    ///
    /// Returns an empty vec for fewer than two points.
    pub fn from_polyline(points: &[Point]) -> Vec<RouteSegment> {
        points
            .windows(2)
            .map(|pair| RouteSegment {
                start: pair[0],
                end: pair[1],
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segments_from_polyline() {
        let points = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ];
        let segments = RouteSegment::from_polyline(&points);
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].start, points[0]);
        assert_eq!(segments[0].end, points[1]);
        assert_eq!(segments[1].start, points[1]);
        assert_eq!(segments[1].end, points[2]);
    }

    #[test]
    fn test_single_point_has_no_segments() {
        let segments = RouteSegment::from_polyline(&[Point::new(1.0, 2.0)]);
        assert!(segments.is_empty());
    }
}
