use bevy::prelude::*;

/// Iterations used to refine a ray/terrain crossing.
const REFINE_ITERATIONS: usize = 5;

/// Height queries against the walkable surface.
///
/// Implementors only answer `height_at`; the downward probe and ray picking
/// are derived from it.
pub trait GroundQuery: Send + Sync {
    /// Surface height under `(x, z)`, or `None` outside the surface.
    fn height_at(&self, x: f32, z: f32) -> Option<f32>;

    /// First surface point straight below `origin`.
    fn surface_below(&self, origin: Vec3) -> Option<Vec3> {
        let height = self.height_at(origin.x, origin.z)?;
        (height <= origin.y).then(|| Vec3::new(origin.x, height, origin.z))
    }

    /// First crossing of a ray with the surface, marched in fixed steps and
    /// refined by bisection.
    fn ray_hit(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        let direction = direction.normalize_or_zero();
        if direction == Vec3::ZERO {
            return None;
        }

        let step = (max_distance * 0.002).clamp(0.05, 1.0);
        let mut last_t: Option<f32> = None;
        let mut t = 0.0;

        while t <= max_distance {
            let point = origin + direction * t;
            if let Some(height) = self.height_at(point.x, point.z) {
                if point.y <= height {
                    let refined = match last_t {
                        Some(above) => self.refine_crossing(origin, direction, above, t),
                        None => t,
                    };
                    let hit = origin + direction * refined;
                    let height = self.height_at(hit.x, hit.z).unwrap_or(height);
                    return Some(Vec3::new(hit.x, height, hit.z));
                }
                last_t = Some(t);
            } else {
                last_t = None;
            }
            t += step;
        }

        None
    }

    fn refine_crossing(&self, origin: Vec3, direction: Vec3, above: f32, below: f32) -> f32 {
        let mut low = above;
        let mut high = below;

        for _ in 0..REFINE_ITERATIONS {
            let mid = (low + high) * 0.5;
            let point = origin + direction * mid;
            match self.height_at(point.x, point.z) {
                Some(height) if point.y > height => low = mid,
                _ => high = mid,
            }
        }

        (low + high) * 0.5
    }
}

/// Infinite horizontal plane.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlatGround {
    pub height: f32,
}

impl GroundQuery for FlatGround {
    fn height_at(&self, _x: f32, _z: f32) -> Option<f32> {
        Some(self.height)
    }

    fn ray_hit(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<Vec3> {
        if direction.y.abs() < 0.001 {
            return None;
        }
        let t = (self.height - origin.y) / direction.y;
        let reach = direction.length();
        (t > 0.0 && t * reach <= max_distance).then(|| origin + direction * t)
    }
}

/// Ground surface shared by physics, editing and the camera floor clamp.
#[derive(Resource)]
pub struct Ground(Box<dyn GroundQuery>);

impl Ground {
    pub fn new(query: impl GroundQuery + 'static) -> Self {
        Self(Box::new(query))
    }

    pub fn flat(height: f32) -> Self {
        Self::new(FlatGround { height })
    }
}

impl Default for Ground {
    fn default() -> Self {
        Self::flat(0.0)
    }
}

impl std::ops::Deref for Ground {
    type Target = dyn GroundQuery;

    fn deref(&self) -> &Self::Target {
        self.0.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Ramp;

    impl GroundQuery for Ramp {
        fn height_at(&self, x: f32, _z: f32) -> Option<f32> {
            (x >= 0.0).then_some(x * 0.5)
        }
    }

    #[test]
    fn surface_below_ignores_ground_above_origin() {
        let ground = FlatGround { height: 2.0 };
        assert_eq!(
            ground.surface_below(Vec3::new(1.0, 5.0, 3.0)),
            Some(Vec3::new(1.0, 2.0, 3.0))
        );
        assert_eq!(ground.surface_below(Vec3::new(1.0, 1.0, 3.0)), None);
    }

    #[test]
    fn flat_ray_hit_is_exact() {
        let ground = Ground::flat(0.0);
        let hit = ground
            .ray_hit(Vec3::new(0.0, 10.0, 0.0), Vec3::new(1.0, -1.0, 0.0), 100.0)
            .unwrap();
        assert!(hit.distance(Vec3::new(10.0, 0.0, 0.0)) < 1e-4);
        assert!(ground.ray_hit(Vec3::Y, Vec3::Y, 100.0).is_none());
    }

    #[test]
    fn marched_ray_hit_lands_on_surface() {
        let hit = Ramp
            .ray_hit(Vec3::new(10.0, 20.0, 0.0), Vec3::NEG_Y, 50.0)
            .unwrap();
        assert!((hit.y - 5.0).abs() < 1e-4);
        assert!((hit.x - 10.0).abs() < 1e-4);
    }

    #[test]
    fn ray_outside_surface_misses() {
        assert!(Ramp.ray_hit(Vec3::new(-5.0, 20.0, 0.0), Vec3::NEG_Y, 50.0).is_none());
    }
}
