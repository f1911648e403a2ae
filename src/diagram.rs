use std::collections::HashMap;
use std::fmt;

use log::{debug, trace};
use rayon::prelude::*;

use crate::boundary::{Boundary, intersection, ray_boundary, rebound};
use crate::error::{DiagramError, GeometryError};
use crate::point::Point;
use crate::tessellation::{DelaunayTessellator, RawTessellation, Ridge, Tessellator, VertexSlot, validate_sites};

/// Identifier of a site and of the region built around it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SiteId(usize);

impl SiteId {
    pub(crate) fn new(index: usize) -> Self {
        SiteId(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Identifier of a vertex: either produced by the tessellation or created by
/// clipping a ray against the unit square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VertexId {
    Diagram(usize),
    Boundary(usize),
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VertexId::Diagram(i) => write!(f, "d{}", i),
            VertexId::Boundary(i) => write!(f, "b{}", i),
        }
    }
}

/// An edge of a region, with the site on its other side.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VoronoiEdge {
    vertex0: VertexId,
    vertex1: VertexId,
    neighbor: SiteId,
}

impl VoronoiEdge {
    pub fn new(vertex0: VertexId, vertex1: VertexId, neighbor: SiteId) -> Self {
        Self { vertex0, vertex1, neighbor }
    }

    pub fn vertices(&self) -> (VertexId, VertexId) {
        (self.vertex0, self.vertex1)
    }

    pub fn neighbor(&self) -> SiteId {
        self.neighbor
    }
}

/// The edges known to touch one site's region.
///
/// Edges are kept in ridge order and are not chained into a closed polygon.
#[derive(Clone, Debug, PartialEq)]
pub struct VoronoiRegion {
    site: SiteId,
    edges: Vec<VoronoiEdge>,
}

impl VoronoiRegion {
    pub fn new(site: SiteId, edges: Vec<VoronoiEdge>) -> Self {
        Self { site, edges }
    }

    pub fn site(&self) -> SiteId {
        self.site
    }

    pub fn edges(&self) -> &[VoronoiEdge] {
        &self.edges
    }

    /// One neighbor per edge, in edge order. A neighbor sharing two edges appears twice.
    pub fn neighbors(&self) -> Vec<SiteId> {
        self.edges.iter().map(VoronoiEdge::neighbor).collect()
    }
}

/// A Voronoi diagram clipped to the unit square.
///
/// All positions use a top-left origin. Sites are flipped into the bottom-left
/// convention of [`crate::boundary`] on the way in and every published point
/// is flipped back and normalized on the way out.
#[derive(Clone, Debug)]
pub struct VoronoiDiagram {
    sites: Vec<Point>,
    diagram_vertices: Vec<Point>,
    boundary_vertices: Vec<Point>,
    regions: Vec<VoronoiRegion>,
}

impl VoronoiDiagram {
    /// Builds the diagram of `sites` with the default [`DelaunayTessellator`].
    pub fn new(sites: &[Point]) -> Result<Self, DiagramError> {
        Self::with_tessellator(sites, &DelaunayTessellator)
    }

    /// Builds the diagram of `sites` from the output of `tessellator`.
    pub fn with_tessellator<T: Tessellator + ?Sized>(sites: &[Point], tessellator: &T) -> Result<Self, DiagramError> {
        let spatial: Vec<Point> = sites.iter().map(|s| s.normalized().flip_origin()).collect();
        validate_sites(&spatial)?;

        let raw = tessellator.tessellate(&spatial)?;
        Assembly::new(raw)?.run()
    }

    pub fn count_sites(&self) -> usize {
        self.sites.len()
    }

    pub fn count_diagram_vertices(&self) -> usize {
        self.diagram_vertices.len()
    }

    pub fn count_boundary_vertices(&self) -> usize {
        self.boundary_vertices.len()
    }

    pub fn sites(&self) -> impl Iterator<Item = (SiteId, Point)> + '_ {
        self.sites.iter().enumerate().map(|(i, p)| (SiteId(i), *p))
    }

    pub fn diagram_vertices(&self) -> impl Iterator<Item = (VertexId, Point)> + '_ {
        self.diagram_vertices.iter().enumerate().map(|(i, p)| (VertexId::Diagram(i), *p))
    }

    pub fn boundary_vertices(&self) -> impl Iterator<Item = (VertexId, Point)> + '_ {
        self.boundary_vertices.iter().enumerate().map(|(i, p)| (VertexId::Boundary(i), *p))
    }

    pub fn regions(&self) -> &[VoronoiRegion] {
        &self.regions
    }

    pub fn site(&self, id: SiteId) -> Option<Point> {
        self.sites.get(id.0).copied()
    }

    pub fn vertex(&self, id: VertexId) -> Option<Point> {
        match id {
            VertexId::Diagram(i) => self.diagram_vertices.get(i).copied(),
            VertexId::Boundary(i) => self.boundary_vertices.get(i).copied(),
        }
    }

    pub fn region(&self, id: SiteId) -> Option<&VoronoiRegion> {
        self.regions.get(id.0)
    }
}

/// A ridge with exactly one finite end, to be clipped against the square.
#[derive(Clone, Copy, Debug)]
struct Ray {
    ridge: usize,
    vertex: usize,
    sites: [usize; 2],
}

/// Mutable state of one diagram construction.
///
/// Owns the tessellation's vertices, which interior edges may rebound, and
/// the table that deduplicates boundary vertices by position.
struct Assembly {
    sites: Vec<Point>,
    vertices: Vec<Point>,
    ridges: Vec<Ridge>,
    centroid: Point,
    boundary_vertices: Vec<Point>,
    boundary_lookup: HashMap<Point, usize>,
}

impl Assembly {
    fn new(raw: RawTessellation) -> Result<Self, DiagramError> {
        let site_count = raw.sites.len();
        let vertex_count = raw.vertices.len();
        for ridge in &raw.ridges {
            for &index in &ridge.sites {
                if index >= site_count {
                    return Err(DiagramError::SiteOutOfRange { index, len: site_count });
                }
            }
            for slot in &ridge.vertices {
                if let VertexSlot::Bound(index) = *slot {
                    if index >= vertex_count {
                        return Err(DiagramError::VertexOutOfRange { index, len: vertex_count });
                    }
                }
            }
        }

        let n = site_count.max(1) as f64;
        let (sx, sy) = raw.sites.iter().fold((0.0, 0.0), |(x, y), p| (x + p.x(), y + p.y()));

        Ok(Self {
            centroid: Point::new(sx / n, sy / n),
            sites: raw.sites,
            vertices: raw.vertices,
            ridges: raw.ridges,
            boundary_vertices: Vec::new(),
            boundary_lookup: HashMap::new(),
        })
    }

    fn run(mut self) -> Result<VoronoiDiagram, DiagramError> {
        let mut edge_vertices: Vec<Option<(VertexId, VertexId)>> = vec![None; self.ridges.len()];
        let mut rays = Vec::new();

        // 1. Interior edges, sequential since each rebound may move a shared vertex.
        for (index, ridge) in self.ridges.iter().enumerate() {
            match ridge.vertices {
                [VertexSlot::Bound(a), VertexSlot::Bound(b)] => {
                    rebind(&mut self.vertices, a, b)?;
                    edge_vertices[index] = Some((VertexId::Diagram(a), VertexId::Diagram(b)));
                }
                [VertexSlot::Bound(vertex), VertexSlot::Unbounded] | [VertexSlot::Unbounded, VertexSlot::Bound(vertex)] => {
                    rays.push(Ray { ridge: index, vertex, sites: ridge.sites });
                }
                [VertexSlot::Unbounded, VertexSlot::Unbounded] => {
                    return Err(DiagramError::UnboundedRidge {
                        site_a: ridge.sites[0],
                        site_b: ridge.sites[1],
                    });
                }
            }
        }

        // 2. Clip every ray, read-only against sites and vertices.
        let clipped: Vec<Point> = rays
            .par_iter()
            .map(|ray| self.clip(ray))
            .collect::<Result<_, GeometryError>>()?;

        // 3. Deduplicate boundary vertices in ridge order.
        for (ray, position) in rays.iter().zip(clipped) {
            let boundary = self.boundary_vertex(position);
            edge_vertices[ray.ridge] = Some((VertexId::Diagram(ray.vertex), VertexId::Boundary(boundary)));
        }

        let mut regions: Vec<VoronoiRegion> = (0..self.sites.len())
            .map(|i| VoronoiRegion::new(SiteId(i), Vec::new()))
            .collect();
        for (ridge, vertices) in self.ridges.iter().zip(&edge_vertices) {
            let Some((v0, v1)) = *vertices else { continue };
            let [a, b] = ridge.sites;
            regions[a].edges.push(VoronoiEdge::new(v0, v1, SiteId(b)));
            regions[b].edges.push(VoronoiEdge::new(v0, v1, SiteId(a)));
        }

        debug!(
            sites = self.sites.len(),
            diagram_vertices = self.vertices.len(),
            interior_edges = self.ridges.len() - rays.len(),
            rays = rays.len(),
            boundary_vertices = self.boundary_vertices.len();
            "Assembled diagram"
        );

        let publish = |points: &[Point]| -> Vec<Point> { points.iter().map(|p| p.flip_origin().normalized()).collect() };

        Ok(VoronoiDiagram {
            sites: publish(&self.sites),
            diagram_vertices: publish(&self.vertices),
            boundary_vertices: publish(&self.boundary_vertices),
            regions,
        })
    }

    /// Position where `ray` leaves the unit square, normalized.
    fn clip(&self, ray: &Ray) -> Result<Point, GeometryError> {
        let [a, b] = ray.sites;
        let origin = self.vertices[ray.vertex];
        let midpoint = Point::midpoint(&self.sites[a], &self.sites[b]);
        let direction = if midpoint == origin { self.outward_direction(a, b, &midpoint) } else { midpoint };

        let occluded = self.midpoint_occluded(&midpoint, a, b);
        let exit = if occluded { Boundary::nearest(&midpoint) } else { ray_boundary(&origin, &direction)? };
        let position = intersection(&origin, &direction, exit)?.normalized();

        trace!(
            ridge = ray.ridge,
            occluded = occluded,
            exit:? = exit,
            position:% = position;
            "Clipped ray"
        );
        Ok(position)
    }

    /// True if some site other than `a` and `b` is strictly closer to `midpoint` than both.
    fn midpoint_occluded(&self, midpoint: &Point, a: usize, b: usize) -> bool {
        let to_a = Point::distance(midpoint, &self.sites[a]);
        let to_b = Point::distance(midpoint, &self.sites[b]);
        self.sites
            .iter()
            .enumerate()
            .filter(|&(i, _)| i != a && i != b)
            .any(|(_, site)| {
                let d = Point::distance(midpoint, site);
                d < to_a && d < to_b
            })
    }

    /// A point along the bisector of `a` and `b`, on the side facing away from the sites' centroid.
    ///
    /// Used when the finite vertex sits exactly on the midpoint (right-angled
    /// Delaunay triangles), which leaves the midpoint no direction to give.
    fn outward_direction(&self, a: usize, b: usize, midpoint: &Point) -> Point {
        let tx = self.sites[b].x() - self.sites[a].x();
        let ty = self.sites[b].y() - self.sites[a].y();
        let length = tx.hypot(ty);
        let (mut nx, mut ny) = (-ty / length, tx / length);

        let away = (midpoint.x() - self.centroid.x()) * nx + (midpoint.y() - self.centroid.y()) * ny;
        if away < 0.0 {
            nx = -nx;
            ny = -ny;
        }
        Point::unclamped(midpoint.x() + 0.5 * nx, midpoint.y() + 0.5 * ny)
    }

    /// Looks up or creates the boundary vertex at `position`.
    fn boundary_vertex(&mut self, position: Point) -> usize {
        if let Some(&index) = self.boundary_lookup.get(&position) {
            return index;
        }
        self.boundary_vertices.push(position);
        let index = self.boundary_vertices.len() - 1;
        self.boundary_lookup.insert(position, index);
        index
    }
}

/// Rebounds both ends of an interior edge, each against the other's latest position.
fn rebind(vertices: &mut [Point], a: usize, b: usize) -> Result<(), GeometryError> {
    if let Some(p) = rebound(&vertices[a], &vertices[b])? {
        vertices[a] = p;
    }
    if let Some(p) = rebound(&vertices[b], &vertices[a])? {
        vertices[b] = p;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario_sites() -> Vec<Point> {
        vec![Point::new(0.0556, 0.1333), Point::new(0.1667, 0.2778), Point::new(0.4444, 0.1)]
    }

    /// Hands a fixed raw tessellation to the assembly, ignoring the sites it receives.
    struct Fixed(RawTessellation);

    impl Tessellator for Fixed {
        fn tessellate(&self, _sites: &[Point]) -> Result<RawTessellation, DiagramError> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_three_site_scenario() {
        let diagram = VoronoiDiagram::new(&scenario_sites()).unwrap();

        assert_eq!(diagram.count_diagram_vertices(), 1);
        assert_eq!(diagram.vertex(VertexId::Diagram(0)), Some(Point::new(0.2486, 0.0999)));

        assert_eq!(diagram.count_boundary_vertices(), 3);
        let boundary: Vec<Point> = diagram.boundary_vertices().map(|(_, p)| p).collect();
        for expected in [Point::new(0.0, 0.291), Point::new(0.2402, 0.0), Point::new(0.8241, 1.0)] {
            assert!(boundary.contains(&expected), "missing boundary vertex {}", expected);
        }

        for (id, _) in diagram.sites() {
            let region = diagram.region(id).unwrap();
            assert_eq!(region.site(), id);
            let mut neighbors = region.neighbors();
            neighbors.sort();
            let expected: Vec<SiteId> = (0..3).filter(|&i| i != id.index()).map(SiteId).collect();
            assert_eq!(neighbors, expected);
        }
    }

    #[test]
    fn test_sites_are_published_unchanged() {
        let sites = scenario_sites();
        let diagram = VoronoiDiagram::new(&sites).unwrap();
        let published: Vec<Point> = diagram.sites().map(|(_, p)| p).collect();
        assert_eq!(published, sites);
    }

    #[test]
    fn test_region_neighbors_follow_edge_order() {
        let edges = vec![
            VoronoiEdge::new(VertexId::Diagram(0), VertexId::Boundary(0), SiteId(2)),
            VoronoiEdge::new(VertexId::Diagram(0), VertexId::Diagram(1), SiteId(1)),
            VoronoiEdge::new(VertexId::Diagram(1), VertexId::Boundary(1), SiteId(2)),
        ];
        let region = VoronoiRegion::new(SiteId(0), edges);
        assert_eq!(region.neighbors(), vec![SiteId(2), SiteId(1), SiteId(2)]);
    }

    #[test]
    fn test_interior_edge_rebounds_vertex() {
        let raw = RawTessellation {
            sites: vec![Point::new(0.6, 0.1), Point::new(0.6, 0.5)],
            vertices: vec![Point::new(0.3, 0.4), Point::unclamped(1.1, 0.2)],
            ridges: vec![Ridge {
                sites: [0, 1],
                vertices: [VertexSlot::Bound(0), VertexSlot::Bound(1)],
            }],
        };
        let diagram = VoronoiDiagram::with_tessellator(&[Point::new(0.6, 0.9), Point::new(0.6, 0.5)], &Fixed(raw)).unwrap();

        // (1.1, 0.2) is pulled onto RIGHT along the edge, then flipped to top-left.
        assert_eq!(diagram.vertex(VertexId::Diagram(1)), Some(Point::new(1.0, 0.775)));
        assert_eq!(diagram.vertex(VertexId::Diagram(0)), Some(Point::new(0.3, 0.6)));
        assert_eq!(diagram.count_boundary_vertices(), 0);

        let region = diagram.region(SiteId(0)).unwrap();
        assert_eq!(region.edges(), &[VoronoiEdge::new(VertexId::Diagram(0), VertexId::Diagram(1), SiteId(1))]);
    }

    #[test]
    fn test_shared_boundary_vertex_is_reused() {
        // Two rays from distinct vertices that clip to the same point on TOP.
        let raw = RawTessellation {
            sites: vec![Point::new(0.4, 0.6), Point::new(0.6, 0.6), Point::new(0.5, 0.2)],
            vertices: vec![Point::new(0.5, 0.5), Point::new(0.5, 0.55)],
            ridges: vec![
                Ridge { sites: [0, 1], vertices: [VertexSlot::Bound(0), VertexSlot::Unbounded] },
                Ridge { sites: [1, 0], vertices: [VertexSlot::Unbounded, VertexSlot::Bound(1)] },
            ],
        };
        let diagram = VoronoiDiagram::with_tessellator(&[Point::new(0.1, 0.1), Point::new(0.2, 0.2)], &Fixed(raw)).unwrap();

        assert_eq!(diagram.count_boundary_vertices(), 1);
        assert_eq!(diagram.vertex(VertexId::Boundary(0)), Some(Point::new(0.5, 0.0)));
        let edges = diagram.region(SiteId(0)).unwrap().edges();
        assert_eq!(edges[0].vertices().1, VertexId::Boundary(0));
        assert_eq!(edges[1].vertices(), (VertexId::Diagram(1), VertexId::Boundary(0)));
    }

    /// One ray from (0.3, 0.3) between sites (0.1, 0.45) and (0.9, 0.45), plus `others`.
    fn single_ray(others: &[Point]) -> VoronoiDiagram {
        let mut sites = vec![Point::new(0.1, 0.45), Point::new(0.9, 0.45)];
        sites.extend_from_slice(others);
        let raw = RawTessellation {
            sites: sites.clone(),
            vertices: vec![Point::new(0.3, 0.3)],
            ridges: vec![Ridge { sites: [0, 1], vertices: [VertexSlot::Bound(0), VertexSlot::Unbounded] }],
        };
        VoronoiDiagram::with_tessellator(&sites, &Fixed(raw)).unwrap()
    }

    #[test]
    fn test_occluded_midpoint_exits_through_nearest_boundary() {
        // (0.5, 0.4) is closer to the midpoint (0.5, 0.45) than both sites, BOTTOM is nearest.
        let diagram = single_ray(&[Point::new(0.5, 0.4)]);
        assert_eq!(diagram.count_boundary_vertices(), 1);
        assert_eq!(diagram.vertex(VertexId::Boundary(0)), Some(Point::new(0.0, 0.925)));
    }

    #[test]
    fn test_visible_midpoint_follows_ray() {
        let diagram = single_ray(&[Point::new(0.5, 0.95)]);
        assert_eq!(diagram.count_boundary_vertices(), 1);
        assert_eq!(diagram.vertex(VertexId::Boundary(0)), Some(Point::new(1.0, 0.175)));
    }

    #[test]
    fn test_occlusion_with_several_closer_sites() {
        let diagram = single_ray(&[Point::new(0.5, 0.4), Point::new(0.5, 0.5)]);
        assert_eq!(diagram.vertex(VertexId::Boundary(0)), Some(Point::new(0.0, 0.925)));
    }

    #[test]
    fn test_equidistant_site_does_not_occlude() {
        // Exactly as far from the midpoint as both ridge sites.
        let diagram = single_ray(&[Point::new(0.5, 0.85)]);
        assert_eq!(diagram.vertex(VertexId::Boundary(0)), Some(Point::new(1.0, 0.175)));
    }

    #[test]
    fn test_right_angle_vertex_on_midpoint() {
        // Circumcenter of a right triangle is the midpoint of its hypotenuse.
        let sites = [Point::new(0.2, 0.8), Point::new(0.8, 0.8), Point::new(0.2, 0.2)];
        let diagram = VoronoiDiagram::new(&sites).unwrap();

        assert_eq!(diagram.count_diagram_vertices(), 1);
        assert_eq!(diagram.vertex(VertexId::Diagram(0)), Some(Point::new(0.5, 0.5)));
        let boundary: Vec<Point> = diagram.boundary_vertices().map(|(_, p)| p).collect();
        assert!(boundary.contains(&Point::new(1.0, 0.0)), "{:?}", boundary);
    }

    #[test]
    fn test_unbounded_ridge_is_fatal() {
        let raw = RawTessellation {
            sites: vec![Point::new(0.2, 0.5), Point::new(0.8, 0.5)],
            vertices: Vec::new(),
            ridges: vec![Ridge { sites: [0, 1], vertices: [VertexSlot::Unbounded; 2] }],
        };
        let result = VoronoiDiagram::with_tessellator(&[Point::new(0.2, 0.5), Point::new(0.8, 0.5)], &Fixed(raw));
        assert_eq!(result.unwrap_err(), DiagramError::UnboundedRidge { site_a: 0, site_b: 1 });
    }

    #[test]
    fn test_out_of_range_vertex_is_rejected() {
        let raw = RawTessellation {
            sites: vec![Point::new(0.2, 0.5), Point::new(0.8, 0.5)],
            vertices: vec![Point::new(0.5, 0.5)],
            ridges: vec![Ridge { sites: [0, 1], vertices: [VertexSlot::Bound(3), VertexSlot::Unbounded] }],
        };
        let result = VoronoiDiagram::with_tessellator(&[Point::new(0.2, 0.5), Point::new(0.8, 0.5)], &Fixed(raw));
        assert_eq!(result.unwrap_err(), DiagramError::VertexOutOfRange { index: 3, len: 1 });
    }
}
