//! Regular-grid terrain heights with bilinear sampling

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};

use super::ground::GroundQuery;

/// Half width of the demo terrain in world units
pub const DEMO_TERRAIN_HALF_EXTENT: f32 = 120.0;

/// Samples per side of the demo terrain
pub const DEMO_TERRAIN_RESOLUTION: usize = 121;

#[derive(Debug, Clone)]
pub struct Heightfield {
    min: Vec2,
    max: Vec2,
    columns: usize,
    rows: usize,
    /// Row-major, `rows * columns` samples; rows run along Z.
    heights: Vec<f32>,
}

impl Heightfield {
    /// Sample `height(x, z)` on a `columns × rows` grid spanning `min..max` in XZ.
    pub fn from_fn(
        min: Vec2,
        max: Vec2,
        columns: usize,
        rows: usize,
        height: impl Fn(f32, f32) -> f32,
    ) -> Self {
        let columns = columns.max(2);
        let rows = rows.max(2);
        let mut heights = Vec::with_capacity(columns * rows);

        for row in 0..rows {
            let z = min.y + (max.y - min.y) * row as f32 / (rows - 1) as f32;
            for column in 0..columns {
                let x = min.x + (max.x - min.x) * column as f32 / (columns - 1) as f32;
                heights.push(height(x, z));
            }
        }

        Self {
            min,
            max,
            columns,
            rows,
            heights,
        }
    }

    /// Gentle rolling hills with a flat area around the vehicle spawn points.
    pub fn demo_terrain() -> Self {
        let extent = Vec2::splat(DEMO_TERRAIN_HALF_EXTENT);
        Self::from_fn(
            -extent,
            extent,
            DEMO_TERRAIN_RESOLUTION,
            DEMO_TERRAIN_RESOLUTION,
            |x, z| {
                let hills = (x * 0.05).sin() * (z * 0.04).cos() * 3.0 + (x * 0.013 + z * 0.021).sin() * 2.0;
                let spawn_distance = Vec2::new(x + 35.0, z - 10.0).length();
                let flatten = ((spawn_distance - 15.0) / 20.0).clamp(0.0, 1.0);
                hills * flatten
            },
        )
    }

    pub fn min(&self) -> Vec2 {
        self.min
    }

    pub fn max(&self) -> Vec2 {
        self.max
    }

    /// Bilinear height at world `(x, z)`, `None` outside the grid.
    pub fn sample_bilinear(&self, x: f32, z: f32) -> Option<f32> {
        let size = self.max - self.min;
        let norm_x = (x - self.min.x) / size.x;
        let norm_z = (z - self.min.y) / size.y;
        if !(0.0..=1.0).contains(&norm_x) || !(0.0..=1.0).contains(&norm_z) {
            return None;
        }

        // Continuous sample space
        let sample_x = norm_x * (self.columns - 1) as f32;
        let sample_z = norm_z * (self.rows - 1) as f32;

        let x0 = (sample_x.floor() as usize).min(self.columns - 1);
        let z0 = (sample_z.floor() as usize).min(self.rows - 1);
        let x1 = (x0 + 1).min(self.columns - 1);
        let z1 = (z0 + 1).min(self.rows - 1);

        let wx = sample_x - x0 as f32;
        let wz = sample_z - z0 as f32;

        let h00 = self.height_at_sample(x0, z0);
        let h10 = self.height_at_sample(x1, z0);
        let h01 = self.height_at_sample(x0, z1);
        let h11 = self.height_at_sample(x1, z1);

        let h_top = h00 * (1.0 - wx) + h10 * wx;
        let h_bottom = h01 * (1.0 - wx) + h11 * wx;
        Some(h_top * (1.0 - wz) + h_bottom * wz)
    }

    fn height_at_sample(&self, column: usize, row: usize) -> f32 {
        self.heights
            .get(row * self.columns + column)
            .copied()
            .unwrap_or(0.0)
    }

    fn sample_position(&self, column: usize, row: usize) -> Vec3 {
        let size = self.max - self.min;
        let x = self.min.x + size.x * column as f32 / (self.columns - 1) as f32;
        let z = self.min.y + size.y * row as f32 / (self.rows - 1) as f32;
        Vec3::new(x, self.height_at_sample(column, row), z)
    }

    /// Triangle mesh of the surface with finite-difference normals.
    pub fn to_mesh(&self) -> Mesh {
        let mut positions = Vec::with_capacity(self.columns * self.rows);
        let mut normals = Vec::with_capacity(self.columns * self.rows);
        let mut uvs = Vec::with_capacity(self.columns * self.rows);

        for row in 0..self.rows {
            for column in 0..self.columns {
                let position = self.sample_position(column, row);
                let left = self.sample_position(column.saturating_sub(1), row);
                let right = self.sample_position((column + 1).min(self.columns - 1), row);
                let back = self.sample_position(column, row.saturating_sub(1));
                let front = self.sample_position(column, (row + 1).min(self.rows - 1));

                let normal = (front - back).cross(right - left).normalize_or(Vec3::Y);

                positions.push(position.to_array());
                normals.push(normal.to_array());
                uvs.push([
                    column as f32 / (self.columns - 1) as f32,
                    row as f32 / (self.rows - 1) as f32,
                ]);
            }
        }

        let mut indices = Vec::with_capacity((self.columns - 1) * (self.rows - 1) * 6);
        for row in 0..self.rows - 1 {
            for column in 0..self.columns - 1 {
                let i = (row * self.columns + column) as u32;
                let next_row = i + self.columns as u32;
                indices.extend_from_slice(&[i, next_row, i + 1, i + 1, next_row, next_row + 1]);
            }
        }

        let mut mesh = Mesh::new(
            PrimitiveTopology::TriangleList,
            RenderAssetUsages::RENDER_WORLD,
        );
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);
        mesh.insert_attribute(Mesh::ATTRIBUTE_NORMAL, normals);
        mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, uvs);
        mesh.insert_indices(Indices::U32(indices));
        mesh
    }
}

impl GroundQuery for Heightfield {
    fn height_at(&self, x: f32, z: f32) -> Option<f32> {
        self.sample_bilinear(x, z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plane(a: f32, b: f32, c: f32) -> Heightfield {
        Heightfield::from_fn(Vec2::ZERO, Vec2::splat(10.0), 11, 11, move |x, z| {
            a * x + b * z + c
        })
    }

    #[test]
    fn bilinear_reproduces_linear_surface() {
        let field = plane(0.5, -0.25, 3.0);
        for (x, z) in [(0.0, 0.0), (2.3, 7.9), (9.99, 0.01), (10.0, 10.0)] {
            let expected = 0.5 * x - 0.25 * z + 3.0;
            let actual = field.sample_bilinear(x, z).unwrap();
            assert!((actual - expected).abs() < 1e-4, "({x}, {z}): {actual} vs {expected}");
        }
    }

    #[test]
    fn bilinear_blends_cell_corners() {
        // Single cell with one raised corner
        let field = Heightfield::from_fn(Vec2::ZERO, Vec2::ONE, 2, 2, |x, z| {
            if x > 0.5 && z > 0.5 { 4.0 } else { 0.0 }
        });
        assert!((field.sample_bilinear(0.5, 0.5).unwrap() - 1.0).abs() < 1e-5);
        assert!((field.sample_bilinear(1.0, 0.5).unwrap() - 2.0).abs() < 1e-5);
    }

    #[test]
    fn outside_grid_has_no_height() {
        let field = plane(0.0, 0.0, 1.0);
        assert_eq!(field.height_at(-0.1, 5.0), None);
        assert_eq!(field.height_at(5.0, 10.5), None);
    }

    #[test]
    fn demo_terrain_is_flat_at_spawn() {
        let field = Heightfield::demo_terrain();
        assert!(field.height_at(-35.0, 10.0).unwrap().abs() < 1e-5);
    }
}
