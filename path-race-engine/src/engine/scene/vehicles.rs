use bevy::prelude::*;
use constants::render_settings::VEHICLE_COLOURS;

use crate::engine::camera::rig::CameraDefinition;
use crate::engine::core::session::VehicleSlot;
use crate::engine::motion::wheels::{WheelBinding, WheelPart, WheelRig, WheelRole};

/// Spawn position and ground offset per slot.
pub const VEHICLE_SPAWNS: [(Vec3, f32); 2] = [
    (Vec3::new(-40.0, 10.0, 10.0), 0.0),
    (Vec3::new(-30.0, 10.0, 10.0), 0.5),
];

const BODY_SIZE: Vec3 = Vec3::new(1.8, 0.8, 4.0);
const WHEEL_RADIUS: f32 = 0.4;
const WHEEL_WIDTH: f32 = 0.3;

/// A drivable vehicle. The forward axis is local -Z.
#[derive(Component, Debug, Clone)]
pub struct Vehicle {
    pub slot: VehicleSlot,
    pub velocity: Vec3,
    /// Height of the origin above the ground when resting.
    pub ground_offset: f32,
    pub cameras: Vec<CameraDefinition>,
    /// Manual drive speed along the forward axis; negative when reversing.
    pub speed: f32,
    /// Smoothed steering input in `-1..=1`.
    pub steer: f32,
}

impl Vehicle {
    pub fn new(slot: VehicleSlot, ground_offset: f32) -> Self {
        Self {
            slot,
            velocity: Vec3::ZERO,
            ground_offset,
            cameras: Vec::new(),
            speed: 0.0,
            steer: 0.0,
        }
    }

    pub fn camera(&self, name: &str) -> Option<&CameraDefinition> {
        self.cameras.iter().find(|camera| camera.name == name)
    }

    /// Stop all motion, used when teleporting.
    pub fn halt(&mut self) {
        self.velocity = Vec3::ZERO;
        self.speed = 0.0;
        self.steer = 0.0;
    }
}

/// Spawn both demo vehicles: a box body with four wheels on steer pivots.
pub fn spawn_demo_vehicles(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
) {
    let body_mesh = meshes.add(Cuboid::from_size(BODY_SIZE));
    let wheel_mesh = meshes.add(Cylinder::new(WHEEL_RADIUS, WHEEL_WIDTH));
    let wheel_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.1, 0.1, 0.1),
        perceptual_roughness: 0.9,
        ..default()
    });

    for slot in VehicleSlot::ALL {
        let (position, ground_offset) = VEHICLE_SPAWNS[slot.index()];
        let body_material = materials.add(StandardMaterial {
            base_color: VEHICLE_COLOURS[slot.index()],
            ..default()
        });

        let vehicle = commands
            .spawn((
                Vehicle::new(slot, ground_offset),
                Transform::from_translation(position),
                Visibility::default(),
                Name::new(format!("Vehicle {}", slot.index() + 1)),
            ))
            .id();

        let body = commands
            .spawn((
                Mesh3d(body_mesh.clone()),
                MeshMaterial3d(body_material),
                Transform::from_xyz(0.0, BODY_SIZE.y * 0.5 + WHEEL_RADIUS * 0.5, 0.0),
            ))
            .id();
        commands.entity(vehicle).add_child(body);

        let half_track = BODY_SIZE.x * 0.5;
        let half_base = BODY_SIZE.z * 0.35;
        let wheels = [
            (WheelRole::FrontLeft, Vec3::new(-half_track, WHEEL_RADIUS, -half_base)),
            (WheelRole::FrontRight, Vec3::new(half_track, WHEEL_RADIUS, -half_base)),
            (WheelRole::Rear, Vec3::new(-half_track, WHEEL_RADIUS, half_base)),
            (WheelRole::Rear, Vec3::new(half_track, WHEEL_RADIUS, half_base)),
        ];

        let mut rig = WheelRig::default();
        for (role, offset) in wheels {
            let pivot = commands
                .spawn((
                    Transform::from_translation(offset),
                    Visibility::default(),
                    WheelPart,
                ))
                .id();
            // Cylinder axis is Y; the child lays it on its side so the spin entity rolls about X.
            let mesh = commands
                .spawn((
                    Transform::from_rotation(role.mirrored_rest()),
                    Visibility::default(),
                    WheelPart,
                ))
                .with_child((
                    Mesh3d(wheel_mesh.clone()),
                    MeshMaterial3d(wheel_material.clone()),
                    Transform::from_rotation(Quat::from_rotation_z(std::f32::consts::FRAC_PI_2)),
                ))
                .id();
            commands.entity(pivot).add_child(mesh);
            commands.entity(vehicle).add_child(pivot);

            rig.bindings.push(WheelBinding {
                role,
                pivot,
                mesh,
                rest_steer: Quat::IDENTITY,
            });
        }

        commands.entity(vehicle).insert(rig);
        info!("[RACE] Spawned vehicle slot {} at {:?}", slot.index(), position);
    }
}
