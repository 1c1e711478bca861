//! Demo scene and its on-screen feedback.
//!
//! Builds the procedural terrain, reference grid, vehicles, light and main
//! camera, and draws path gizmos plus the HUD tracker every frame.

use bevy::prelude::*;

use crate::engine::camera::rig::MainCamera;
use crate::engine::core::frame::FrameSet;

/// Curve, waypoint and assigned path gizmos.
pub mod gizmos;

/// Heightfield-following grid mesh for spatial reference.
pub mod grid;

/// Ground height queries consumed by physics, picking and the camera clamp.
pub mod ground;

/// Regular-grid terrain with bilinear sampling.
pub mod heightmap;

/// FPS readout, camera tracker and HUD visibility.
pub mod hud;

/// Vehicle component and the demo vehicle rigs.
pub mod vehicles;

use gizmos::{draw_editor_gizmos, draw_library_gizmos};
use ground::Ground;
use heightmap::Heightfield;
use hud::{fps_notification_system, hud_visibility_system, spawn_hud, tracker_text_system};

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene).add_systems(
            Update,
            (
                draw_editor_gizmos,
                draw_library_gizmos,
                tracker_text_system,
                hud_visibility_system,
                fps_notification_system,
            )
                .after(FrameSet::FloorClamp),
        );

        #[cfg(not(target_arch = "wasm32"))]
        {
            app.add_systems(Update, hud::fps_text_update_system);
        }
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    let terrain = Heightfield::demo_terrain();

    commands.spawn((
        Mesh3d(meshes.add(terrain.to_mesh())),
        MeshMaterial3d(materials.add(StandardMaterial {
            base_color: Color::srgb(0.35, 0.5, 0.3),
            perceptual_roughness: 0.95,
            ..default()
        })),
        Transform::default(),
        Name::new("Terrain"),
    ));
    grid::create_ground_grid(&mut commands, &terrain, &mut meshes, &mut materials);
    commands.insert_resource(Ground::new(terrain));

    spawn_lighting(&mut commands);

    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(-35.0, 25.0, 45.0).looking_at(Vec3::new(-35.0, 0.0, 10.0), Vec3::Y),
        MainCamera,
    ));

    vehicles::spawn_demo_vehicles(&mut commands, &mut meshes, &mut materials);
    spawn_hud(&mut commands);

    info!("[PATH] Demo scene ready");
}

fn spawn_lighting(commands: &mut Commands) {
    commands.spawn((
        DirectionalLight {
            shadows_enabled: true,
            ..default()
        },
        Transform::from_rotation(Quat::from_euler(
            EulerRot::ZYX,
            0.0,
            1.0,
            -std::f32::consts::FRAC_PI_4,
        )),
    ));
    commands.insert_resource(AmbientLight {
        brightness: 300.0,
        ..default()
    });
}
