//! Convex clipping
//!
//! Sutherland-Hodgman clipping of a ring against half-planes. Voronoi cells
//! are built by clipping the bounding box against one bisector per site.

use geo_types::{Coord, LineString, Polygon};

/// The closed half-plane `normal · p <= offset`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HalfPlane {
    pub normal: Coord<f64>,
    pub offset: f64,
}

impl HalfPlane {
    pub fn new(normal: Coord<f64>, offset: f64) -> Self {
        Self { normal, offset }
    }

    /// Points at least as close to `site` as to `other`.
    pub fn closer_to(site: Coord<f64>, other: Coord<f64>) -> Self {
        let normal = Coord { x: other.x - site.x, y: other.y - site.y };
        let mid = Coord { x: (site.x + other.x) / 2.0, y: (site.y + other.y) / 2.0 };
        Self { normal, offset: dot(normal, mid) }
    }

    fn signed(&self, p: Coord<f64>) -> f64 {
        dot(self.normal, p) - self.offset
    }

    pub fn contains(&self, p: Coord<f64>) -> bool {
        self.signed(p) <= 0.0
    }

    fn intersect(&self, p: Coord<f64>, q: Coord<f64>) -> Coord<f64> {
        let sp = self.signed(p);
        let sq = self.signed(q);
        let t = sp / (sp - sq);
        Coord { x: p.x + t * (q.x - p.x), y: p.y + t * (q.y - p.y) }
    }
}

fn dot(a: Coord<f64>, b: Coord<f64>) -> f64 {
    a.x * b.x + a.y * b.y
}

/// Clip an open vertex ring against one half-plane
fn clip_ring(vertices: &[Coord<f64>], plane: &HalfPlane) -> Vec<Coord<f64>> {
    let n = vertices.len();
    let mut output = Vec::with_capacity(n + 1);

    for i in 0..n {
        let current = vertices[i];
        let next = vertices[(i + 1) % n];

        match (plane.contains(current), plane.contains(next)) {
            (true, true) => output.push(next),
            (true, false) => output.push(plane.intersect(current, next)),
            (false, true) => {
                output.push(plane.intersect(current, next));
                output.push(next);
            }
            (false, false) => {}
        }
    }

    output
}

/// Clip the exterior of a convex polygon by a sequence of half-planes.
///
/// Returns `None` once the remaining area collapses below a triangle.
pub fn clip_polygon<'a>(
    polygon: &Polygon<f64>,
    planes: impl IntoIterator<Item = &'a HalfPlane>,
) -> Option<Polygon<f64>> {
    let mut vertices: Vec<Coord<f64>> = polygon.exterior().0.to_vec();
    if vertices.len() > 1 && vertices.first() == vertices.last() {
        vertices.pop();
    }

    for plane in planes {
        vertices = clip_ring(&vertices, plane);
        if vertices.len() < 3 {
            return None;
        }
    }

    let first = *vertices.first()?;
    vertices.push(first);
    Some(Polygon::new(LineString::new(vertices), vec![]))
}
