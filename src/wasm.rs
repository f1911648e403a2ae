use crate::diagram::{SiteId, VertexId, VoronoiDiagram};
use crate::error::DiagramError;
use crate::point::{Point, random_sites};
use rand::SeedableRng;
use rand::rngs::StdRng;
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

#[wasm_bindgen(typescript_custom_section)]
const TS_CONSTANTS_VERTICES: &'static str = r#"
export const BOUNDARY_VERTEX_ID_START = -1;
"#;

/// Boundary vertex IDs are negative to prevent conflicts with diagram vertex IDs.
pub const BOUNDARY_VERTEX_ID_START: i32 = -1;

fn flat_vertex_id(id: VertexId) -> i32 {
    match id {
        VertexId::Diagram(i) => i as i32,
        VertexId::Boundary(i) => BOUNDARY_VERTEX_ID_START - i as i32,
    }
}

fn flatten(points: impl Iterator<Item = Point>) -> Vec<f64> {
    points.flat_map(|p| [p.x(), p.y()]).collect()
}

/// A Voronoi diagram clipped to the unit square, exposed as flat arrays.
///
/// Coordinates use a top-left origin, `[x, y, x, y, ...]`.
#[wasm_bindgen(js_name = VoronoiDiagram)]
pub struct VoronoiDiagramWasm {
    inner: VoronoiDiagram,
}

#[wasm_bindgen(js_class = VoronoiDiagram)]
impl VoronoiDiagramWasm {
    /// Builds the diagram of the sites in `sites`, a flat array `[x, y, x, y, ...]`.
    #[wasm_bindgen(constructor)]
    pub fn new(sites: &[f64]) -> Result<VoronoiDiagramWasm, JsError> {
        Ok(Self::from_flat(sites)?)
    }

    /// Builds the diagram of `count` random sites.
    pub fn random(count: usize) -> Result<VoronoiDiagramWasm, JsError> {
        Ok(Self::from_seed(get_seed(), count)?)
    }

    #[wasm_bindgen(getter)]
    pub fn count_sites(&self) -> usize { self.inner.count_sites() }
    #[wasm_bindgen(getter)]
    pub fn count_diagram_vertices(&self) -> usize { self.inner.count_diagram_vertices() }
    #[wasm_bindgen(getter)]
    pub fn count_boundary_vertices(&self) -> usize { self.inner.count_boundary_vertices() }

    #[wasm_bindgen(getter)]
    pub fn sites(&self) -> Vec<f64> { flatten(self.inner.sites().map(|(_, p)| p)) }
    #[wasm_bindgen(getter)]
    pub fn diagram_vertices(&self) -> Vec<f64> { flatten(self.inner.diagram_vertices().map(|(_, p)| p)) }
    #[wasm_bindgen(getter)]
    pub fn boundary_vertices(&self) -> Vec<f64> { flatten(self.inner.boundary_vertices().map(|(_, p)| p)) }

    /// Edges of a site's region as triples `[vertex0, vertex1, neighbor, ...]`.
    ///
    /// Vertex IDs `>= 0` index `diagram_vertices`, negative IDs `id` index
    /// `boundary_vertices` at `-1 - id`.
    pub fn region_edges(&self, site: usize) -> Vec<i32> {
        self.inner
            .region(SiteId::new(site))
            .map(|region| {
                region
                    .edges()
                    .iter()
                    .flat_map(|e| {
                        let (v0, v1) = e.vertices();
                        [flat_vertex_id(v0), flat_vertex_id(v1), e.neighbor().index() as i32]
                    })
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn region_neighbors(&self, site: usize) -> Vec<u32> {
        self.inner
            .region(SiteId::new(site))
            .map(|region| region.neighbors().into_iter().map(|n| n.index() as u32).collect())
            .unwrap_or_default()
    }
}

impl VoronoiDiagramWasm {
    fn from_flat(sites: &[f64]) -> Result<Self, DiagramError> {
        let points: Vec<Point> = sites.chunks_exact(2).map(|c| Point::new(c[0], c[1])).collect();
        Ok(Self { inner: VoronoiDiagram::new(&points)? })
    }

    fn from_seed(seed: u64, count: usize) -> Result<Self, DiagramError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let points = random_sites(&mut rng, count);
        Ok(Self { inner: VoronoiDiagram::new(&points)? })
    }
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789 // Fixed seed for tests
    }
}
