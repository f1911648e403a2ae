use plotters::prelude::*;
use vorobound::{Point, VoronoiDiagram, random_sites};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    run_example("diagram_10.svg", 10)?;
    run_example("diagram_100.svg", 100)?;
    run_example("diagram_1000.svg", 1000)?;
    Ok(())
}

/// Diagram positions use a top-left origin, the chart a bottom-left one.
fn to_chart(p: Point) -> (f64, f64) {
    (p.x(), 1.0 - p.y())
}

fn run_example(filename: &str, count: usize) -> Result<(), Box<dyn std::error::Error>> {
    let root = SVGBackend::new(filename, (1024, 1024)).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .margin(10)
        .build_cartesian_2d(0.0..1.0, 0.0..1.0)?;

    let mut rng = rand::thread_rng();
    let sites = random_sites(&mut rng, count);
    let diagram = VoronoiDiagram::new(&sites)?;

    // Draw unit square
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0), (0.0, 0.0)],
        BLACK.stroke_width(2),
    )))?;

    // Draw edges, each one once from the lower site's side
    for region in diagram.regions() {
        for edge in region.edges().iter().filter(|e| e.neighbor() > region.site()) {
            let (v0, v1) = edge.vertices();
            let (Some(a), Some(b)) = (diagram.vertex(v0), diagram.vertex(v1)) else {
                continue;
            };
            chart.draw_series(std::iter::once(PathElement::new(
                vec![to_chart(a), to_chart(b)],
                BLUE.mix(0.6),
            )))?;
        }
    }

    // Draw boundary vertices
    chart.draw_series(
        diagram
            .boundary_vertices()
            .map(|(_, p)| Circle::new(to_chart(p), 3, GREEN.filled())),
    )?;

    // Draw sites
    chart.draw_series(diagram.sites().map(|(_, p)| Circle::new(to_chart(p), 2, RED.filled())))?;

    root.present()?;
    println!("Output saved to {}", filename);
    Ok(())
}
