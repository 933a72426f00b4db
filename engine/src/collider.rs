//! Collision-shape construction.
//!
//! Box shapes are always available; convex hulls and triangle meshes are
//! built from sampled visual geometry and fall back to a box on degenerate
//! input or rejection by the geometry library. The kind actually built is
//! reported back so callers can record ground truth.

use rapier3d::na::{DMatrix, Point3, Vector3};
use rapier3d::prelude::SharedShape;

use crate::body::{BodyKind, ColliderKind, VisualGeometry};
use crate::terrain::Terrain;

/// Minimum half-extent; zero-size boxes upset the narrow phase.
const MIN_HALF_EXTENT: f32 = 0.001;

pub(crate) fn clamp_half_extents(half_extents: &Vector3<f32>) -> Vector3<f32> {
    Vector3::new(
        half_extents.x.max(MIN_HALF_EXTENT),
        half_extents.y.max(MIN_HALF_EXTENT),
        half_extents.z.max(MIN_HALF_EXTENT),
    )
}

fn geometry_points(geometry: &VisualGeometry) -> Vec<Point3<f32>> {
    geometry
        .vertices
        .chunks_exact(3)
        .map(|v| Point3::new(v[0], v[1], v[2]))
        .collect()
}

fn geometry_triangles(geometry: &VisualGeometry) -> Vec<[u32; 3]> {
    geometry
        .indices
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect()
}

fn box_shape(half_extents: &Vector3<f32>) -> SharedShape {
    let h = clamp_half_extents(half_extents);
    SharedShape::cuboid(h.x, h.y, h.z)
}

/// Builds a collision shape per the construction policy, returning the
/// shape together with the collider kind actually used.
pub(crate) fn build_shape(
    requested: ColliderKind,
    half_extents: &Vector3<f32>,
    geometry: Option<&VisualGeometry>,
    body_kind: BodyKind,
) -> (SharedShape, ColliderKind) {
    let geometry = match geometry {
        Some(g) if requested != ColliderKind::Box => g,
        _ => return (box_shape(half_extents), requested),
    };

    // Moving concave colliders are unsupported.
    let mut resolved = requested;
    if resolved == ColliderKind::Mesh && body_kind == BodyKind::Dynamic {
        resolved = ColliderKind::ConvexHull;
    }

    if geometry.is_degenerate() {
        tracing::warn!("degenerate collider geometry, falling back to box");
        return (box_shape(half_extents), ColliderKind::Box);
    }

    let points = geometry_points(geometry);
    match resolved {
        ColliderKind::ConvexHull => {
            if let Some(shape) = SharedShape::convex_hull(&points) {
                return (shape, ColliderKind::ConvexHull);
            }
            tracing::warn!("convex hull construction failed, falling back to box");
        }
        ColliderKind::Mesh => {
            match SharedShape::trimesh(points, geometry_triangles(geometry)) {
                Ok(shape) => return (shape, ColliderKind::Mesh),
                Err(err) => {
                    tracing::warn!("trimesh construction failed ({err}), falling back to box");
                }
            }
        }
        ColliderKind::Box => {}
    }

    (box_shape(half_extents), ColliderKind::Box)
}

/// Builds the static collision shape for a terrain surface: a heightfield
/// for uniform grids, a triangle mesh otherwise. Returns `None` when the
/// geometry library rejects the mesh data.
pub(crate) fn build_terrain_shape(terrain: &Terrain) -> Option<SharedShape> {
    if terrain.is_uniform_grid() {
        // Heights in row/column order; parry's heightfield rows advance
        // toward +z, which is the terrain's own row order, and the shape is
        // centered on the origin like the visual mesh.
        let rows = terrain.rows();
        let columns = terrain.columns();
        let heights = DMatrix::from_fn(rows, columns, |row, col| terrain.height_at(col, row));
        let scale = Vector3::new(terrain.width(), 1.0, terrain.depth());
        return Some(SharedShape::heightfield(heights, scale));
    }

    let vertices: Vec<Point3<f32>> = terrain
        .vertex_positions()
        .chunks_exact(3)
        .map(|v| Point3::new(v[0], v[1], v[2]))
        .collect();
    let indices: Vec<[u32; 3]> = terrain
        .triangle_indices()
        .chunks_exact(3)
        .map(|t| [t[0], t[1], t[2]])
        .collect();

    match SharedShape::trimesh(vertices, indices) {
        Ok(shape) => Some(shape),
        Err(err) => {
            tracing::warn!("terrain trimesh construction failed ({err})");
            None
        }
    }
}

/// Unit cube geometry used by tests and as a stand-in hull.
#[cfg(test)]
pub(crate) fn cube_geometry(half: f32) -> VisualGeometry {
    let h = half;
    VisualGeometry {
        vertices: vec![
            -h, -h, -h, h, -h, -h, h, h, -h, -h, h, -h, // back face
            -h, -h, h, h, -h, h, h, h, h, -h, h, h, // front face
        ],
        indices: vec![
            0, 1, 2, 0, 2, 3, // back
            4, 6, 5, 4, 7, 6, // front
            0, 4, 5, 0, 5, 1, // bottom
            3, 2, 6, 3, 6, 7, // top
            0, 3, 7, 0, 7, 4, // left
            1, 5, 6, 1, 6, 2, // right
        ],
    }
}
