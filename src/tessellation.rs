use std::collections::{HashMap, HashSet};

use delaunator::{EMPTY, next_halfedge, triangulate};
use log::debug;

use crate::error::DiagramError;
use crate::point::Point;

/// One end of a ridge: a finite vertex or a direction towards infinity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexSlot {
    Bound(usize),
    Unbounded,
}

/// A ridge of the raw tessellation, separating the regions of two sites.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ridge {
    pub sites: [usize; 2],
    pub vertices: [VertexSlot; 2],
}

/// Unclipped output of a planar Voronoi construction, bottom-left origin.
#[derive(Clone, Debug, Default)]
pub struct RawTessellation {
    /// Site positions, index is the site identifier.
    pub sites: Vec<Point>,
    /// Finite Voronoi vertices. These may lie outside the unit square.
    pub vertices: Vec<Point>,
    pub ridges: Vec<Ridge>,
}

/// Trait defining the planar Voronoi primitive a diagram is assembled from.
/// This allows swapping the triangulation backend without touching the clipping.
pub trait Tessellator: Send + Sync {
    /// Tessellates `sites`, given in bottom-left origin convention.
    fn tessellate(&self, sites: &[Point]) -> Result<RawTessellation, DiagramError>;
}

/// Rejects inputs no tessellation can be built from: fewer than two sites, or
/// two sites sharing one position.
pub fn validate_sites(sites: &[Point]) -> Result<(), DiagramError> {
    if sites.len() < 2 {
        return Err(DiagramError::TooFewSites(sites.len()));
    }
    let mut seen = HashSet::with_capacity(sites.len());
    for (index, site) in sites.iter().enumerate() {
        if !seen.insert(*site) {
            return Err(DiagramError::DuplicateSite { index, position: *site });
        }
    }
    Ok(())
}

/// Voronoi tessellation derived from the Delaunay triangulation of `delaunator`.
///
/// Every triangle contributes its circumcenter as a vertex, every pair of
/// twin half-edges a finite ridge and every hull half-edge a ridge that is
/// unbounded on one side.
#[derive(Clone, Copy, Debug, Default)]
pub struct DelaunayTessellator;

impl Tessellator for DelaunayTessellator {
    fn tessellate(&self, sites: &[Point]) -> Result<RawTessellation, DiagramError> {
        validate_sites(sites)?;

        let coords: Vec<delaunator::Point> = sites
            .iter()
            .map(|p| delaunator::Point { x: p.x(), y: p.y() })
            .collect();
        let delaunay = triangulate(&coords);

        if delaunay.triangles.is_empty() {
            debug!(sites = sites.len(); "Sites are collinear, emitting unbounded ridges");
            return Ok(collinear_tessellation(sites));
        }

        let mut vertices = Vec::new();
        // Circumcenters that round to one point are one vertex (co-circular sites).
        let mut merged: HashMap<Point, usize> = HashMap::new();
        let triangle_slots: Vec<VertexSlot> = delaunay
            .triangles
            .chunks_exact(3)
            .map(|t| match circumcenter(&coords[t[0]], &coords[t[1]], &coords[t[2]]) {
                Some([x, y]) => {
                    let position = Point::unclamped(x, y);
                    let index = *merged.entry(position).or_insert_with(|| {
                        vertices.push(position);
                        vertices.len() - 1
                    });
                    VertexSlot::Bound(index)
                }
                // A flat triangle's circumcenter lies at infinity.
                None => VertexSlot::Unbounded,
            })
            .collect();

        let mut ridges = Vec::new();
        for edge in 0..delaunay.triangles.len() {
            let opposite = delaunay.halfedges[edge];
            let ridge_sites = [delaunay.triangles[edge], delaunay.triangles[next_halfedge(edge)]];
            let own = triangle_slots[edge / 3];

            if opposite == EMPTY {
                ridges.push(Ridge { sites: ridge_sites, vertices: [own, VertexSlot::Unbounded] });
            } else if edge < opposite {
                let other = triangle_slots[opposite / 3];
                if own == other && own != VertexSlot::Unbounded {
                    // Both triangles share one circumcenter, the sites only touch in a point.
                    continue;
                }
                ridges.push(Ridge { sites: ridge_sites, vertices: [own, other] });
            }
        }

        debug!(
            sites = sites.len(),
            vertices = vertices.len(),
            ridges = ridges.len();
            "Tessellated sites"
        );

        Ok(RawTessellation {
            sites: sites.to_vec(),
            vertices,
            ridges,
        })
    }
}

fn circumcenter(a: &delaunator::Point, b: &delaunator::Point, c: &delaunator::Point) -> Option<[f64; 2]> {
    let dx = b.x - a.x;
    let dy = b.y - a.y;
    let ex = c.x - a.x;
    let ey = c.y - a.y;

    let bl = dx * dx + dy * dy;
    let cl = ex * ex + ey * ey;
    let d = dx * ey - dy * ex;
    if d == 0.0 {
        return None;
    }

    let x = a.x + (ey * bl - dy * cl) * 0.5 / d;
    let y = a.y + (dx * cl - ex * bl) * 0.5 / d;
    if x.is_finite() && y.is_finite() { Some([x, y]) } else { None }
}

/// Collinear sites have only parallel ridges, none with a finite vertex.
fn collinear_tessellation(sites: &[Point]) -> RawTessellation {
    let mut order: Vec<usize> = (0..sites.len()).collect();
    order.sort_by(|&a, &b| {
        sites[a]
            .x()
            .total_cmp(&sites[b].x())
            .then(sites[a].y().total_cmp(&sites[b].y()))
    });

    let ridges = order
        .windows(2)
        .map(|pair| Ridge {
            sites: [pair[0], pair[1]],
            vertices: [VertexSlot::Unbounded, VertexSlot::Unbounded],
        })
        .collect();

    RawTessellation {
        sites: sites.to_vec(),
        vertices: Vec::new(),
        ridges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sites(coords: &[(f64, f64)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point::new(x, y)).collect()
    }

    #[test]
    fn test_three_sites() {
        let raw = DelaunayTessellator
            .tessellate(&sites(&[(0.2, 0.2), (0.8, 0.2), (0.5, 0.8)]))
            .unwrap();

        assert_eq!(raw.sites.len(), 3);
        assert_eq!(raw.vertices.len(), 1);
        assert_eq!(raw.ridges.len(), 3);
        assert_eq!(raw.vertices[0], Point::new(0.5, 0.425));

        for ridge in &raw.ridges {
            assert_eq!(ridge.vertices, [VertexSlot::Bound(0), VertexSlot::Unbounded]);
        }

        let mut pairs: Vec<[usize; 2]> = raw
            .ridges
            .iter()
            .map(|r| {
                let mut s = r.sites;
                s.sort();
                s
            })
            .collect();
        pairs.sort();
        assert_eq!(pairs, vec![[0, 1], [0, 2], [1, 2]]);
    }

    #[test]
    fn test_cocircular_sites_merge_vertices() {
        // Four corners of a square share one circumcircle.
        let raw = DelaunayTessellator
            .tessellate(&sites(&[(0.25, 0.25), (0.75, 0.25), (0.75, 0.75), (0.25, 0.75)]))
            .unwrap();

        assert_eq!(raw.vertices.len(), 1);
        assert_eq!(raw.vertices[0], Point::new(0.5, 0.5));
        // The diagonal does not separate two regions.
        assert_eq!(raw.ridges.len(), 4);
        assert!(raw.ridges.iter().all(|r| r.vertices[1] == VertexSlot::Unbounded));
    }

    #[test]
    fn test_interior_ridges() {
        let raw = DelaunayTessellator
            .tessellate(&sites(&[(0.5, 0.5), (0.1, 0.1), (0.9, 0.15), (0.85, 0.9), (0.12, 0.8)]))
            .unwrap();

        let finite = raw
            .ridges
            .iter()
            .filter(|r| r.vertices.iter().all(|v| matches!(v, VertexSlot::Bound(_))))
            .count();
        assert_eq!(finite, 4);
        assert_eq!(raw.vertices.len(), 4);
        assert_eq!(raw.ridges.len(), 8);
    }

    #[test]
    fn test_collinear_sites() {
        let raw = DelaunayTessellator
            .tessellate(&sites(&[(0.5, 0.5), (0.1, 0.5), (0.9, 0.5)]))
            .unwrap();

        assert!(raw.vertices.is_empty());
        let pairs: Vec<[usize; 2]> = raw.ridges.iter().map(|r| r.sites).collect();
        assert_eq!(pairs, vec![[1, 0], [0, 2]]);
        assert!(raw.ridges.iter().all(|r| r.vertices == [VertexSlot::Unbounded; 2]));
    }

    #[test]
    fn test_rejects_degenerate_input() {
        assert_eq!(
            DelaunayTessellator.tessellate(&sites(&[(0.5, 0.5)])).unwrap_err(),
            DiagramError::TooFewSites(1)
        );
        assert!(matches!(
            DelaunayTessellator.tessellate(&sites(&[(0.5, 0.5), (0.2, 0.2), (0.50001, 0.5)])),
            Err(DiagramError::DuplicateSite { index: 2, .. })
        ));
    }
}
