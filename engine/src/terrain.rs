//! Height-sampled terrain surface.
//!
//! A rectangular grid of height samples centered on the origin, row-major
//! with `x` fastest and row 0 at `z = -depth/2`. The sculpt brush patches
//! the height samples in place; the collision shape is rebuilt wholesale
//! through [`crate::world::PhysicsWorld::set_terrain`].

/// Tolerance for treating the grid cells as square.
const UNIFORM_CELL_EPSILON: f32 = 1e-5;

#[derive(Debug, Clone)]
pub struct Terrain {
    width: f32,
    depth: f32,
    segments_x: usize,
    segments_z: usize,
    heights: Vec<f32>,
}

impl Terrain {
    /// Flat terrain spanning `width` x `depth`, centered on the origin.
    pub fn new(width: f32, depth: f32, segments_x: usize, segments_z: usize) -> Self {
        let segments_x = segments_x.max(1);
        let segments_z = segments_z.max(1);
        Self {
            width,
            depth,
            segments_x,
            segments_z,
            heights: vec![0.0; (segments_x + 1) * (segments_z + 1)],
        }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Vertices per row.
    pub fn columns(&self) -> usize {
        self.segments_x + 1
    }

    /// Vertex rows along z.
    pub fn rows(&self) -> usize {
        self.segments_z + 1
    }

    pub fn cell_size(&self) -> (f32, f32) {
        (
            self.width / self.segments_x as f32,
            self.depth / self.segments_z as f32,
        )
    }

    /// Whether the grid has equal cell size along both axes, which allows a
    /// heightfield collision shape instead of a triangle mesh.
    pub fn is_uniform_grid(&self) -> bool {
        let (cell_x, cell_z) = self.cell_size();
        (cell_x - cell_z).abs() < UNIFORM_CELL_EPSILON
    }

    pub fn height_at(&self, x: usize, z: usize) -> f32 {
        let x = x.min(self.segments_x);
        let z = z.min(self.segments_z);
        self.heights[z * self.columns() + x]
    }

    pub fn set_height(&mut self, x: usize, z: usize, height: f32) {
        if x <= self.segments_x && z <= self.segments_z {
            let columns = self.columns();
            self.heights[z * columns + x] = height;
        }
    }

    /// Bilinear height sample at a world-space point, clamped to the grid.
    pub fn sample_height(&self, world_x: f32, world_z: f32) -> f32 {
        let normalized_x = (world_x + self.width / 2.0) / self.width;
        let normalized_z = (world_z + self.depth / 2.0) / self.depth;

        let grid_x = normalized_x * self.segments_x as f32;
        let grid_z = normalized_z * self.segments_z as f32;

        let x0 = (grid_x.floor() as isize).clamp(0, self.segments_x as isize) as usize;
        let z0 = (grid_z.floor() as isize).clamp(0, self.segments_z as isize) as usize;
        let x1 = (x0 + 1).min(self.segments_x);
        let z1 = (z0 + 1).min(self.segments_z);

        let tx = (grid_x - x0 as f32).clamp(0.0, 1.0);
        let tz = (grid_z - z0 as f32).clamp(0.0, 1.0);

        let h00 = self.height_at(x0, z0);
        let h10 = self.height_at(x1, z0);
        let h01 = self.height_at(x0, z1);
        let h11 = self.height_at(x1, z1);

        let h0 = h00 * (1.0 - tx) + h10 * tx;
        let h1 = h01 * (1.0 - tx) + h11 * tx;
        h0 * (1.0 - tz) + h1 * tz
    }

    /// Raises (or lowers, with negative `delta`) samples within `radius` of
    /// a world-space point, with linear falloff toward the rim.
    pub fn apply_brush(&mut self, world_x: f32, world_z: f32, delta: f32, radius: f32) {
        if radius <= 0.0 {
            return;
        }
        let (cell_x, cell_z) = self.cell_size();

        let center_x = (world_x + self.width / 2.0) / cell_x;
        let center_z = (world_z + self.depth / 2.0) / cell_z;
        let radius_x = radius / cell_x;
        let radius_z = radius / cell_z;

        let min_x = ((center_x - radius_x).floor().max(0.0)) as usize;
        let max_x = ((center_x + radius_x).ceil() as usize).min(self.segments_x);
        let min_z = ((center_z - radius_z).floor().max(0.0)) as usize;
        let max_z = ((center_z + radius_z).ceil() as usize).min(self.segments_z);

        for z in min_z..=max_z {
            for x in min_x..=max_x {
                let dist_x = (x as f32 - center_x) / radius_x;
                let dist_z = (z as f32 - center_z) / radius_z;
                let distance = (dist_x * dist_x + dist_z * dist_z).sqrt();
                if distance > 1.0 {
                    continue;
                }
                let falloff = 1.0 - distance;
                let columns = self.columns();
                self.heights[z * columns + x] += delta * falloff;
            }
        }
    }

    /// World-space vertex positions, flat xyz, in grid order.
    pub fn vertex_positions(&self) -> Vec<f32> {
        let mut positions = Vec::with_capacity(self.columns() * self.rows() * 3);
        let (cell_x, cell_z) = self.cell_size();
        for z in 0..self.rows() {
            for x in 0..self.columns() {
                positions.push(x as f32 * cell_x - self.width / 2.0);
                positions.push(self.height_at(x, z));
                positions.push(z as f32 * cell_z - self.depth / 2.0);
            }
        }
        positions
    }

    /// Triangle indices matching [`Terrain::vertex_positions`], two
    /// triangles per cell.
    pub fn triangle_indices(&self) -> Vec<u32> {
        let columns = self.columns() as u32;
        let mut indices = Vec::with_capacity(self.segments_x * self.segments_z * 6);
        for z in 0..self.segments_z as u32 {
            for x in 0..self.segments_x as u32 {
                let a = z * columns + x;
                let b = a + 1;
                let c = a + columns;
                let d = c + 1;
                indices.extend_from_slice(&[a, c, b, b, c, d]);
            }
        }
        indices
    }
}
