//! Point-mass kinematics driven by steering forces
//!
//! Vehicles live in reference pixels (1600x1200); actors convert to and from
//! normalized screen space around each update.

use glam::Vec2;
use rand::Rng;

use super::spatial::{AgentSnapshot, EntityId};
use super::steering::{SteeringContext, SteeringManager};
use crate::perpendicular;

/// Heading only follows velocity above this squared speed
const MIN_HEADING_SPEED_SQ: f32 = 1e-7;

#[derive(Debug, Clone, PartialEq)]
pub struct MovingEntity {
    pub position: Vec2,
    pub velocity: Vec2,
    /// Unit facing direction
    pub heading: Vec2,
    /// Always `perpendicular(heading)`
    pub side: Vec2,
    pub mass: f32,
    pub max_speed: f32,
    pub max_force: f32,
    /// Degrees per second
    pub max_turn_rate: f32,
}

impl MovingEntity {
    pub fn new(
        position: Vec2,
        velocity: Vec2,
        mass: f32,
        max_speed: f32,
        max_force: f32,
        max_turn_rate: f32,
    ) -> Self {
        let heading = velocity.try_normalize().unwrap_or(Vec2::X);
        Self {
            position,
            velocity,
            heading,
            side: perpendicular(heading),
            mass,
            max_speed,
            max_force,
            max_turn_rate,
        }
    }

    /// Assign the heading (normalized) and recompute `side`
    pub fn set_heading(&mut self, heading: Vec2) {
        if let Some(h) = heading.try_normalize() {
            self.heading = h;
            self.side = perpendicular(h);
        }
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Apply `force` for `dt` seconds: accelerate, clamp speed, move, update heading
    pub fn integrate(&mut self, force: Vec2, dt: f32) {
        if self.mass > 0.0 {
            self.velocity += force / self.mass * dt;
        }
        self.velocity = self.velocity.clamp_length_max(self.max_speed);
        self.position += self.velocity * dt;
        if self.velocity.length_squared() > MIN_HEADING_SPEED_SQ {
            self.set_heading(self.velocity);
        }
    }

    /// Turn the heading toward `target` by at most `max_turn_rate * dt` degrees.
    ///
    /// Returns true when already facing the target.
    pub fn rotate_heading_to_face(&mut self, target: Vec2, dt: f32) -> bool {
        let Some(to_target) = (target - self.position).try_normalize() else {
            return true;
        };
        let dot = self.heading.dot(to_target);
        if dot > 1.0 - 1e-6 {
            return true;
        }
        let angle = dot.clamp(-1.0, 1.0).acos();
        let max_step = (self.max_turn_rate * dt).to_radians();
        let step = angle.min(max_step) * self.heading.perp_dot(to_target).signum();
        let rotation = Vec2::from_angle(step);
        self.set_heading(rotation.rotate(self.heading));
        self.velocity = rotation.rotate(self.velocity);
        false
    }

    pub fn snapshot(&self, id: EntityId) -> AgentSnapshot {
        AgentSnapshot {
            id,
            position: self.position,
            velocity: self.velocity,
        }
    }
}

/// A moving entity with its own steering behaviors
#[derive(Debug, Clone)]
pub struct Vehicle {
    pub entity: MovingEntity,
    pub steering: SteeringManager,
}

impl Vehicle {
    pub fn new(entity: MovingEntity) -> Self {
        Self {
            entity,
            steering: SteeringManager::new(),
        }
    }

    /// Refresh behaviors, compute the combined force and integrate it
    pub fn update<R: Rng + ?Sized>(&mut self, id: EntityId, ctx: &SteeringContext<'_>, rng: &mut R) {
        self.steering.refresh(&self.entity, ctx);
        let force = self.steering.calculate(id, &self.entity, ctx, rng);
        self.entity.integrate(force, ctx.dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::spatial::SpatialIndex;
    use crate::sim::steering::Behavior;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_heading_follows_velocity() {
        let mut e = MovingEntity::new(Vec2::ZERO, Vec2::ZERO, 1.0, 100.0, 100.0, 720.0);
        assert_eq!(e.heading, Vec2::X);
        e.integrate(Vec2::new(0.0, 600.0), 0.1);
        assert!((e.heading - Vec2::Y).length() < 1e-6);
        assert!((e.side - perpendicular(Vec2::Y)).length() < 1e-6);
    }

    #[test]
    fn test_zero_force_keeps_heading() {
        let mut e = MovingEntity::new(Vec2::ZERO, Vec2::ZERO, 1.0, 100.0, 100.0, 720.0);
        e.set_heading(Vec2::new(0.0, -3.0));
        e.integrate(Vec2::ZERO, 1.0 / 60.0);
        assert_eq!(e.heading, Vec2::NEG_Y);
        assert_eq!(e.position, Vec2::ZERO);
    }

    #[test]
    fn test_rotate_heading_to_face_limits_turn() {
        let mut e = MovingEntity::new(Vec2::ZERO, Vec2::ZERO, 1.0, 100.0, 100.0, 90.0);
        // 90 deg/s for half a second: only halfway to a target straight up
        assert!(!e.rotate_heading_to_face(Vec2::new(0.0, 10.0), 0.5));
        let expected = Vec2::from_angle(45f32.to_radians());
        assert!((e.heading - expected).length() < 1e-4);
        assert!(!e.rotate_heading_to_face(Vec2::new(0.0, 10.0), 0.5));
        assert!(e.rotate_heading_to_face(Vec2::new(0.0, 10.0), 0.5));
    }

    #[test]
    fn test_vehicle_seeks_target() {
        let mut rng = Pcg32::seed_from_u64(3);
        let index = SpatialIndex::new(100.0);
        let ctx = SteeringContext {
            dt: 1.0 / 60.0,
            player: None,
            neighbors: &index,
            threats: &[],
        };
        let mut v = Vehicle::new(MovingEntity::new(Vec2::ZERO, Vec2::ZERO, 1.0, 200.0, 400.0, 720.0));
        v.steering.enable(Behavior::Seek { target: Vec2::new(100.0, 0.0) }).unwrap();
        let start = v.entity.position.distance(Vec2::new(100.0, 0.0));
        for _ in 0..10 {
            v.update(EntityId(1), &ctx, &mut rng);
        }
        assert!(v.entity.position.distance(Vec2::new(100.0, 0.0)) < start);
    }

    proptest! {
        #[test]
        fn prop_speed_clamped_after_integrate(
            vx in -1e4f32..1e4, vy in -1e4f32..1e4,
            fx in -1e5f32..1e5, fy in -1e5f32..1e5,
            mass in 0.01f32..10.0,
            max_speed in 1.0f32..1000.0,
            dt in 0.001f32..0.1,
        ) {
            let mut e = MovingEntity::new(Vec2::ZERO, Vec2::new(vx, vy), mass, max_speed, 1e5, 720.0);
            e.integrate(Vec2::new(fx, fy), dt);
            prop_assert!(e.speed() <= max_speed * 1.0001);
            prop_assert!((e.heading.length() - 1.0).abs() < 1e-4);
        }
    }
}
