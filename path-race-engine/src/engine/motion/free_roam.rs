use bevy::prelude::*;

use crate::engine::core::config::PhysicsConfig;
use crate::engine::core::frame::frame_delta;
use crate::engine::core::session::Session;
use crate::engine::motion::race::under_race_control;
use crate::engine::scene::ground::{Ground, GroundQuery};
use crate::engine::scene::vehicles::Vehicle;
use crate::tools::path_library::PathLibrary;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroundContact {
    Airborne,
    Grounded,
    /// Fell below the world floor and was put back at the respawn height.
    Respawned,
}

/// One gravity step with ground snap for a vehicle origin.
pub fn step_free_roam(
    position: &mut Vec3,
    velocity: &mut Vec3,
    ground_offset: f32,
    ground: &dyn GroundQuery,
    config: &PhysicsConfig,
    dt: f32,
) -> GroundContact {
    velocity.y -= config.gravity * dt;
    *position += *velocity * dt;

    let probe = *position + Vec3::Y * config.probe_lift;
    let reach = config.probe_lift + ground_offset + config.contact_tolerance;
    let mut contact = GroundContact::Airborne;

    if let Some(hit) = ground.surface_below(probe) {
        if probe.y - hit.y <= reach && velocity.y <= 0.0 {
            position.y = hit.y + ground_offset;
            velocity.y = 0.0;
            contact = GroundContact::Grounded;
        }
    }

    if position.y < config.world_floor {
        position.y = config.respawn_height;
        *velocity = Vec3::ZERO;
        contact = GroundContact::Respawned;
    }

    contact
}

pub fn free_roam_system(
    time: Res<Time>,
    config: Res<PhysicsConfig>,
    ground: Res<Ground>,
    session: Res<Session>,
    library: Res<PathLibrary>,
    mut vehicles: Query<(&mut Transform, &mut Vehicle)>,
) {
    let dt = frame_delta(&time);

    for (mut transform, mut vehicle) in &mut vehicles {
        if under_race_control(&session, &library, vehicle.slot) {
            continue;
        }

        let Vehicle {
            velocity,
            ground_offset,
            ..
        } = &mut *vehicle;

        let contact = step_free_roam(
            &mut transform.translation,
            velocity,
            *ground_offset,
            &**ground,
            &config,
            dt,
        );

        if contact == GroundContact::Respawned {
            warn!(
                "[RACE] Vehicle slot {} fell through the world, respawned at height {}",
                vehicle.slot.index(),
                config.respawn_height
            );
        }
    }
}
