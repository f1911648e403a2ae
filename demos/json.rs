use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use vorobound::{Point, VertexId, VoronoiDiagram, random_sites};

fn point(p: Point) -> Value {
    json!([p.x(), p.y()])
}

fn vertex(id: VertexId) -> Value {
    match id {
        VertexId::Diagram(i) => json!({ "diagram": i }),
        VertexId::Boundary(i) => json!({ "boundary": i }),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let count = std::env::args().nth(1).map(|n| n.parse()).transpose()?.unwrap_or(20);

    let mut rng = StdRng::seed_from_u64(123456789);
    let sites = random_sites(&mut rng, count);
    let diagram = VoronoiDiagram::new(&sites)?;

    let regions: Vec<Value> = diagram
        .regions()
        .iter()
        .map(|region| {
            let edges: Vec<Value> = region
                .edges()
                .iter()
                .map(|edge| {
                    let (v0, v1) = edge.vertices();
                    json!({
                        "vertices": [vertex(v0), vertex(v1)],
                        "neighbor": edge.neighbor().to_string(),
                    })
                })
                .collect();
            json!({ "site": region.site().to_string(), "edges": edges })
        })
        .collect();

    let output = json!({
        "points": diagram.sites().map(|(_, p)| point(p)).collect::<Vec<_>>(),
        "diagramVertices": diagram.diagram_vertices().map(|(_, p)| point(p)).collect::<Vec<_>>(),
        "boundaryVertices": diagram.boundary_vertices().map(|(_, p)| point(p)).collect::<Vec<_>>(),
        "regions": regions,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
