use bevy::ecs::query::QueryFilter;
use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelRole {
    FrontLeft,
    FrontRight,
    Rear,
}

impl WheelRole {
    /// Mirrored wheel meshes spin in opposite local directions.
    pub fn spin_sign(self) -> f32 {
        match self {
            Self::FrontLeft => 1.0,
            Self::FrontRight | Self::Rear => -1.0,
        }
    }

    /// Rest rotation for a wheel built from one shared mesh. The front-left
    /// spin entity is turned half way about Y so its flipped spin sign still
    /// rolls the wheel forward.
    pub fn mirrored_rest(self) -> Quat {
        match self {
            Self::FrontLeft => Quat::from_rotation_y(std::f32::consts::PI),
            Self::FrontRight | Self::Rear => Quat::IDENTITY,
        }
    }

    pub fn steers(self) -> bool {
        matches!(self, Self::FrontLeft | Self::FrontRight)
    }
}

/// One wheel: steering rotates `pivot`, spinning rotates `mesh` (a child of the pivot).
#[derive(Debug, Clone)]
pub struct WheelBinding {
    pub role: WheelRole,
    pub pivot: Entity,
    pub mesh: Entity,
    pub rest_steer: Quat,
}

/// Wheel hierarchy of a vehicle, described once at spawn.
#[derive(Component, Debug, Clone)]
pub struct WheelRig {
    pub bindings: Vec<WheelBinding>,
    pub spin_axis: Vec3,
    pub steer_axis: Vec3,
}

impl Default for WheelRig {
    fn default() -> Self {
        Self {
            bindings: Vec::new(),
            spin_axis: Vec3::X,
            steer_axis: Vec3::Y,
        }
    }
}

/// Marker for wheel pivots and meshes.
#[derive(Component)]
pub struct WheelPart;

impl WheelRig {
    /// Spin meshes by `spin` radians and set front pivots to `steer` radians.
    pub fn apply<F: QueryFilter>(
        &self,
        spin: f32,
        steer: f32,
        parts: &mut Query<&mut Transform, F>,
    ) {
        for binding in &self.bindings {
            if let Ok(mut mesh) = parts.get_mut(binding.mesh) {
                mesh.rotation = spun(mesh.rotation, self.spin_axis, binding.role, spin);
            }

            if binding.role.steers() {
                if let Ok(mut pivot) = parts.get_mut(binding.pivot) {
                    pivot.rotation = steered(binding.rest_steer, self.steer_axis, steer);
                }
            }
        }
    }
}

fn spun(current: Quat, axis: Vec3, role: WheelRole, spin: f32) -> Quat {
    (current * Quat::from_axis_angle(axis, role.spin_sign() * spin)).normalize()
}

fn steered(rest: Quat, axis: Vec3, steer: f32) -> Quat {
    rest * Quat::from_axis_angle(axis, steer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    #[test]
    fn right_and_rear_wheels_spin_backwards_in_local_space() {
        let left = spun(Quat::IDENTITY, Vec3::X, WheelRole::FrontLeft, 0.3);
        let right = spun(Quat::IDENTITY, Vec3::X, WheelRole::FrontRight, 0.3);
        let (axis, angle) = left.to_axis_angle();
        assert!(axis.distance(Vec3::X) < 1e-5 && (angle - 0.3).abs() < 1e-5);
        assert!(right.angle_between(left.inverse()) < 1e-5);
    }

    #[test]
    fn mirrored_front_left_rolls_with_the_others() {
        let roll = |role: WheelRole| {
            let rest = role.mirrored_rest();
            spun(rest, Vec3::X, role, 0.3) * rest.inverse()
        };
        let rear = roll(WheelRole::Rear);
        assert!(roll(WheelRole::FrontLeft).angle_between(rear) < 1e-5);
        assert!(roll(WheelRole::FrontRight).angle_between(rear) < 1e-5);
        assert!(rear.angle_between(Quat::from_rotation_x(-0.3)) < 1e-5);
    }

    #[test]
    fn steering_is_absolute_not_cumulative() {
        let rest = Quat::from_rotation_y(0.1);
        let once = steered(rest, Vec3::Y, 0.2);
        let again = steered(rest, Vec3::Y, 0.2);
        assert_eq!(once, again);
        assert!(once.angle_between(Quat::from_rotation_y(0.3)) < 1e-5);
    }

    #[test]
    fn rig_drives_pivots_and_meshes() {
        let mut world = World::new();
        let pivot = world.spawn((Transform::default(), WheelPart)).id();
        let mesh = world.spawn((Transform::default(), WheelPart)).id();
        let rear_pivot = world.spawn((Transform::default(), WheelPart)).id();
        let rear_mesh = world.spawn((Transform::default(), WheelPart)).id();

        let rig = WheelRig {
            bindings: vec![
                WheelBinding {
                    role: WheelRole::FrontLeft,
                    pivot,
                    mesh,
                    rest_steer: Quat::IDENTITY,
                },
                WheelBinding {
                    role: WheelRole::Rear,
                    pivot: rear_pivot,
                    mesh: rear_mesh,
                    rest_steer: Quat::IDENTITY,
                },
            ],
            ..default()
        };

        world
            .run_system_once(move |mut parts: Query<&mut Transform, With<WheelPart>>| {
                rig.apply(0.5, 0.25, &mut parts);
            })
            .unwrap();

        let pivot_rotation = world.get::<Transform>(pivot).unwrap().rotation;
        let mesh_rotation = world.get::<Transform>(mesh).unwrap().rotation;
        let rear_pivot_rotation = world.get::<Transform>(rear_pivot).unwrap().rotation;
        let rear_mesh_rotation = world.get::<Transform>(rear_mesh).unwrap().rotation;

        assert!(pivot_rotation.angle_between(Quat::from_rotation_y(0.25)) < 1e-5);
        assert!(mesh_rotation.angle_between(Quat::from_rotation_x(0.5)) < 1e-5);
        assert_eq!(rear_pivot_rotation, Quat::IDENTITY);
        assert!(rear_mesh_rotation.angle_between(Quat::from_rotation_x(-0.5)) < 1e-5);
    }
}
