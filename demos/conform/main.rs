//! Conformation demo: builds a small complex of rooms, refines it at a few
//! points, and reports the resulting cells.
//!
//! Usage:
//! ```text
//! cargo run --example conform
//! RUST_LOG=cuboid_kernel=debug cargo run --example conform
//! ```

use cuboid_kernel::math::Point3;
use cuboid_kernel::operations::creation::MakeCuboid;
use cuboid_kernel::operations::modification::ConformToVertex;
use cuboid_kernel::operations::query::{BoundingBox, ExtremeVertex, Volume};
use cuboid_kernel::space::{Space, SpaceRegistry};
use cuboid_kernel::topology::{VertexId, VertexStore};
use cuboid_kernel::KernelError;

/// A room that logs every vertex introduced inside it.
struct Room {
    name: &'static str,
    walls: usize,
}

impl Space for Room {
    fn edge_count(&self) -> usize {
        0
    }

    fn surface_count(&self) -> usize {
        self.walls
    }

    fn check_edge_vertex(&mut self, _edge: usize, _store: &VertexStore, _vertex: VertexId) {}

    fn check_surface_vertex(&mut self, _surface: usize, _store: &VertexStore, _vertex: VertexId) {}

    fn check_vertex(&mut self, store: &VertexStore, vertex: VertexId) {
        if let Ok(point) = store.point(vertex) {
            tracing::info!(room = self.name, %point, "room refined");
        }
    }
}

fn main() -> Result<(), KernelError> {
    // Default: WARN for everything, INFO for the kernel.
    // Override with RUST_LOG env var (e.g. RUST_LOG=cuboid_kernel=debug).
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into())
        .add_directive("conform=info".parse().unwrap_or_default())
        .add_directive("cuboid_kernel=info".parse().unwrap_or_default());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let mut store = VertexStore::new();
    let mut spaces = SpaceRegistry::new();

    let kitchen = MakeCuboid::new(Point3::new(0.0, 0.0, 0.0), Point3::new(4.0, 3.0, 3.0))
        .execute(&mut store)?;
    let living = MakeCuboid::new(Point3::new(4.0, 0.0, 0.0), Point3::new(10.0, 3.0, 3.0))
        .execute(&mut store)?;

    let kitchen_room = spaces.insert(Box::new(Room {
        name: "kitchen",
        walls: 6,
    }));
    let living_room = spaces.insert(Box::new(Room {
        name: "living",
        walls: 6,
    }));
    spaces.assign(kitchen_room, kitchen)?;
    spaces.assign(living_room, living)?;

    // A doorway corner on the shared wall, then a column in the living room.
    for point in [Point3::new(4.0, 1.0, 2.1), Point3::new(7.0, 1.5, 0.0)] {
        let vertex = store.add_vertex(point);
        let outcomes = ConformToVertex::new(vertex).execute(&mut store, &mut spaces)?;
        for outcome in &outcomes {
            println!(
                "{point}: {:?} split into {} cells",
                outcome.case,
                outcome.children.len()
            );
        }
    }

    let mut total = 0.0;
    for cuboid in store.live_cuboids() {
        let volume = Volume::new(cuboid).execute(&store)?;
        let aabb = BoundingBox::new(cuboid).execute(&store)?;
        let max = store.point(ExtremeVertex::max(cuboid).execute(&store)?)?;
        println!(
            "cell {} .. {} (max corner {max}): volume {volume:.3}, in {} room(s)",
            aabb.min,
            aabb.max,
            spaces.space_count(cuboid)
        );
        total += volume;
    }
    println!("total volume {total:.3}");
    Ok(())
}
