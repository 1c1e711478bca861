//! Heightfield-following reference grid

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::view::NoFrustumCulling;
use constants::render_settings::{GRID_CELL_SIZE, GRID_COLOUR, GRID_LIFT};

use super::heightmap::Heightfield;

#[derive(Component)]
pub struct GroundGrid;

/// Spawn grid lines draped over the terrain in both directions
pub fn create_ground_grid(
    commands: &mut Commands,
    terrain: &Heightfield,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let grid_material = materials.add(StandardMaterial {
        base_color: GRID_COLOUR,
        alpha_mode: AlphaMode::Blend,
        unlit: true,
        ..default()
    });

    let size = terrain.max() - terrain.min();
    let line_count_x = ((size.x / GRID_CELL_SIZE).round() as u32).max(10);
    let line_count_z = ((size.y / GRID_CELL_SIZE).round() as u32).max(10);

    // Segments per line so the grid follows the surface between samples
    let segments_per_line = ((size.x.max(size.y) / GRID_CELL_SIZE) as usize * 4).clamp(50, 1000);

    let mut vertices = Vec::new();
    let mut indices = Vec::new();

    for i in 0..=line_count_x {
        let x = terrain.min().x + size.x * i as f32 / line_count_x as f32;
        append_line(
            terrain,
            &mut vertices,
            &mut indices,
            segments_per_line,
            |t| Vec2::new(x, terrain.min().y + size.y * t),
        );
    }

    for i in 0..=line_count_z {
        let z = terrain.min().y + size.y * i as f32 / line_count_z as f32;
        append_line(
            terrain,
            &mut vertices,
            &mut indices,
            segments_per_line,
            |t| Vec2::new(terrain.min().x + size.x * t, z),
        );
    }

    let mut mesh = Mesh::new(PrimitiveTopology::LineList, RenderAssetUsages::RENDER_WORLD);
    mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, vertices);
    mesh.insert_indices(Indices::U32(indices));

    commands.spawn((
        Mesh3d(meshes.add(mesh)),
        MeshMaterial3d(grid_material),
        Visibility::Visible,
        NoFrustumCulling,
        Transform::IDENTITY,
        GroundGrid,
    ));
}

/// Append one polyline sampled along `xz(t)` for `t` in `0..=1`
fn append_line(
    terrain: &Heightfield,
    vertices: &mut Vec<[f32; 3]>,
    indices: &mut Vec<u32>,
    segments: usize,
    xz: impl Fn(f32) -> Vec2,
) {
    let first = vertices.len() as u32;

    for i in 0..=segments {
        let point = xz(i as f32 / segments as f32);
        let height = terrain.sample_bilinear(point.x, point.y).unwrap_or(0.0);
        vertices.push([point.x, height + GRID_LIFT, point.y]);
    }

    for i in 0..segments as u32 {
        indices.extend_from_slice(&[first + i, first + i + 1]);
    }
}
