//! Bounding-box pre-filter for pairwise overlay
//!
//! Two polygons whose boxes do not intersect cannot intersect, so candidate
//! pairs are narrowed with an R-tree before the boolean kernel runs.

use geo::BoundingRect;
use geo_types::MultiPolygon;
use rstar::{RTree, RTreeObject, AABB};

pub(crate) struct TargetEntry {
    index: usize,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for TargetEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn envelope_of(mp: &MultiPolygon<f64>) -> Option<AABB<[f64; 2]>> {
    mp.bounding_rect()
        .map(|rect| AABB::from_corners([rect.min().x, rect.min().y], [rect.max().x, rect.max().y]))
}

/// Candidate lookup over the usable targets of a pairwise operation.
pub(crate) enum TargetIndex {
    Tree(RTree<TargetEntry>),
    /// Every usable target is a candidate
    Scan(Vec<usize>),
}

impl TargetIndex {
    pub(crate) fn build(targets: &[Option<MultiPolygon<f64>>], use_tree: bool) -> Self {
        let usable = targets.iter().enumerate().filter_map(|(i, t)| t.as_ref().map(|mp| (i, mp)));
        if use_tree {
            let entries: Vec<TargetEntry> = usable
                .filter_map(|(index, mp)| envelope_of(mp).map(|envelope| TargetEntry { index, envelope }))
                .collect();
            TargetIndex::Tree(RTree::bulk_load(entries))
        } else {
            TargetIndex::Scan(usable.map(|(i, _)| i).collect())
        }
    }

    /// Target indices that may overlap `source`, ascending.
    pub(crate) fn candidates(&self, source: &MultiPolygon<f64>) -> Vec<usize> {
        match self {
            TargetIndex::Scan(all) => all.clone(),
            TargetIndex::Tree(tree) => {
                let Some(env) = envelope_of(source) else {
                    return Vec::new();
                };
                let mut hits: Vec<usize> = tree
                    .locate_in_envelope_intersecting(&env)
                    .map(|e| e.index)
                    .collect();
                hits.sort_unstable();
                hits
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::{polygon, Polygon};

    fn square(x0: f64) -> Option<MultiPolygon<f64>> {
        let p: Polygon<f64> = polygon![(x: x0, y: 0.0), (x: x0 + 1.0, y: 0.0), (x: x0 + 1.0, y: 1.0), (x: x0, y: 1.0)];
        Some(MultiPolygon::new(vec![p]))
    }

    #[test]
    fn tree_narrows_to_overlapping_boxes() {
        let targets = vec![square(10.0), None, square(0.5), square(0.9)];
        let source = square(0.0).unwrap();
        let tree = TargetIndex::build(&targets, true);
        assert_eq!(tree.candidates(&source), vec![2, 3]);
        let scan = TargetIndex::build(&targets, false);
        assert_eq!(scan.candidates(&source), vec![0, 2, 3]);
    }
}
