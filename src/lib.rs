//! # vorobound
//!
//! `vorobound` turns a planar Voronoi tessellation of a finite point set into a bounded
//! subdivision of the unit square `[0, 1] x [0, 1]`. Every ridge the tessellation leaves open
//! towards infinity is clipped against one of the square's four edges, so the result is a finite
//! graph of regions, vertices and edges that can be rendered or exported directly. It is usable
//! from Rust as well as compiled to WebAssembly (WASM).
//!
//! ## Features
//!
//! - **Fixed precision**: every coordinate is rounded to 4 decimals, so boundary vertices computed
//!   independently by two neighboring regions resolve to one shared vertex.
//! - **Pluggable tessellation**: the raw Voronoi output comes from a [`Tessellator`], by default a
//!   Delaunay triangulation via `delaunator`.
//! - **Parallel clipping**: rays are clipped in parallel with `rayon`; vertex deduplication stays
//!   sequential and deterministic.
//! - **WASM-ready**: flat-array bindings built with `wasm-bindgen`.
//!
//! ## Coordinates
//!
//! Positions passed to and returned from [`VoronoiDiagram`] use a top-left origin. The functions
//! in [`boundary`] work in a bottom-left origin, where `TOP` is `y = 1`.
//!
//! ## Main Interface
//!
//! The primary entry point is [`VoronoiDiagram::new`].

pub mod boundary;
mod diagram;
mod error;
mod point;
mod tessellation;
mod wasm;

pub use boundary::Boundary;
pub use boundary::intersection;
pub use boundary::nearest_boundary;
pub use boundary::ray_boundary;
pub use boundary::rebound;
pub use diagram::SiteId;
pub use diagram::VertexId;
pub use diagram::VoronoiDiagram;
pub use diagram::VoronoiEdge;
pub use diagram::VoronoiRegion;
pub use error::DiagramError;
pub use error::GeometryError;
pub use point::DECIMAL_PLACES;
pub use point::Point;
pub use point::normalize;
pub use point::random_sites;
pub use point::round_coordinate;
pub use tessellation::DelaunayTessellator;
pub use tessellation::RawTessellation;
pub use tessellation::Ridge;
pub use tessellation::Tessellator;
pub use tessellation::VertexSlot;
pub use tessellation::validate_sites;
pub use wasm::VoronoiDiagramWasm;
