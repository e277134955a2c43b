//! Voronoi tessellation
//!
//! Each cell starts as the bounding box and is clipped by the bisector
//! half-plane against every other site, nearest sites first. Clipping stops
//! once the next site is more than twice as far as the farthest cell vertex,
//! since no further bisector can reach the cell.

use super::clip::{clip_polygon, HalfPlane};
use super::spatial::BoundingBox;
use crate::maybe_rayon::map_indexed;
use geo_types::{Coord, Point, Polygon};
use serde::{Deserialize, Serialize};

/// Parameters for Voronoi tessellation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoronoiParams {
    /// Clip extent; computed from the sites when absent
    pub bbox: Option<BoundingBox>,
    /// Padding in degrees applied when the computed extent is flat
    pub padding: f64,
}

impl Default for VoronoiParams {
    fn default() -> Self {
        Self { bbox: None, padding: 0.01 }
    }
}

/// One cell per site, clipped to `bbox`.
///
/// Sites repeating an earlier site get `None`, as do sites whose cell does not
/// overlap the box.
pub fn voronoi_cells(sites: &[Point<f64>], bbox: &BoundingBox, parallel: bool) -> Vec<Option<Polygon<f64>>> {
    let frame = bbox.to_polygon();
    map_indexed(sites, parallel, |i, site| {
        if sites[..i].iter().any(|s| s == site) {
            return None;
        }
        cell(i, site.0, sites, &frame)
    })
}

fn cell(index: usize, site: Coord<f64>, sites: &[Point<f64>], frame: &Polygon<f64>) -> Option<Polygon<f64>> {
    let mut others: Vec<(f64, Coord<f64>)> = sites
        .iter()
        .enumerate()
        .filter(|(j, p)| *j != index && p.0 != site)
        .map(|(_, p)| (dist2(site, p.0), p.0))
        .collect();
    others.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut polygon = frame.clone();
    for (d2, other) in others {
        if d2 > 4.0 * reach2(site, &polygon) {
            break;
        }
        let plane = HalfPlane::closer_to(site, other);
        polygon = clip_polygon(&polygon, [&plane])?;
    }
    Some(polygon)
}

fn dist2(a: Coord<f64>, b: Coord<f64>) -> f64 {
    (a.x - b.x).powi(2) + (a.y - b.y).powi(2)
}

/// Squared distance from the site to the farthest vertex of its cell.
fn reach2(site: Coord<f64>, polygon: &Polygon<f64>) -> f64 {
    polygon
        .exterior()
        .0
        .iter()
        .map(|c| dist2(site, *c))
        .fold(0.0, f64::max)
}
