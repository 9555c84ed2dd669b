//! Steering behaviors
//!
//! Each active behavior produces a force from the owner's kinematic state and
//! a read-only view of the world. The [`SteeringManager`] keeps at most one
//! behavior per [`BehaviorKind`] and combines them in ascending kind order
//! with a force budget: earlier behaviors get first claim on `max_force`.

use std::collections::BTreeMap;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::spatial::{AgentSnapshot, EntityId, SpatialIndex};
use super::vehicle::MovingEntity;
use crate::error::SimError;
use crate::{point_to_world_space, random_direction};

/// Arrive tweak factor applied to the deceleration rate
const DECELERATION_TWEAKER: f32 = 0.3;

/// Behavior tag; the discriminant is the accumulation priority (lower first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    Evade = 3,
    EvadeMulti = 4,
    Flee = 5,
    Separation = 6,
    Seek = 8,
    Arrive = 9,
    Wander = 10,
    Pursuit = 11,
}

/// How quickly Arrive slows down near its target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Deceleration {
    Slow = 3,
    Normal = 2,
    Fast = 1,
}

impl Deceleration {
    #[inline]
    fn factor(self) -> f32 {
        self as i32 as f32
    }
}

/// Read-only world view handed to behaviors for one tick
#[derive(Debug, Clone, Copy)]
pub struct SteeringContext<'a> {
    /// Seconds elapsed this tick
    pub dt: f32,
    /// The player, when it can be chased
    pub player: Option<AgentSnapshot>,
    /// Every enemy agent at the start of the tick
    pub neighbors: &'a SpatialIndex,
    /// Projectiles an evading agent should dodge
    pub threats: &'a [AgentSnapshot],
}

impl SteeringContext<'_> {
    /// Look up an agent by id among the player, neighbors and threats
    pub fn find(&self, id: EntityId) -> Option<AgentSnapshot> {
        if let Some(player) = self.player.filter(|p| p.id == id) {
            return Some(player);
        }
        self.neighbors
            .get(id)
            .copied()
            .or_else(|| self.threats.iter().find(|t| t.id == id).copied())
    }
}

/// A single steering behavior with its parameters and private state
#[derive(Debug, Clone, PartialEq)]
pub enum Behavior {
    Seek {
        target: Vec2,
    },
    Flee {
        target: Vec2,
    },
    Arrive {
        target: Vec2,
        deceleration: Deceleration,
    },
    Pursuit {
        evader: EntityId,
    },
    Evade {
        pursuer: EntityId,
        min_distance: f32,
    },
    /// Dodge every closing threat inside `min_distance`
    EvadeMulti {
        min_distance: f32,
    },
    Wander {
        /// Target displacement per second
        jitter: f32,
        radius: f32,
        distance: f32,
        /// Current point on the wander circle (local space)
        target: Vec2,
    },
    Separation {
        radius: f32,
        /// Neighbors cached by the last `refresh`
        neighbors: Vec<AgentSnapshot>,
    },
}

impl Behavior {
    /// Wander starting from a random point on its circle
    pub fn wander<R: Rng + ?Sized>(jitter: f32, radius: f32, distance: f32, rng: &mut R) -> Self {
        Behavior::Wander {
            jitter,
            radius,
            distance,
            target: random_direction(rng) * radius,
        }
    }

    pub fn separation(radius: f32) -> Self {
        Behavior::Separation {
            radius,
            neighbors: Vec::new(),
        }
    }

    pub fn kind(&self) -> BehaviorKind {
        match self {
            Behavior::Seek { .. } => BehaviorKind::Seek,
            Behavior::Flee { .. } => BehaviorKind::Flee,
            Behavior::Arrive { .. } => BehaviorKind::Arrive,
            Behavior::Pursuit { .. } => BehaviorKind::Pursuit,
            Behavior::Evade { .. } => BehaviorKind::Evade,
            Behavior::EvadeMulti { .. } => BehaviorKind::EvadeMulti,
            Behavior::Wander { .. } => BehaviorKind::Wander,
            Behavior::Separation { .. } => BehaviorKind::Separation,
        }
    }

    /// Per-tick preparation (neighbor caching)
    pub fn refresh(&mut self, owner: &MovingEntity, ctx: &SteeringContext<'_>) {
        if let Behavior::Separation { radius, neighbors } = self {
            ctx.neighbors.query_into(owner.position, *radius, neighbors);
        }
    }

    pub fn calculate<R: Rng + ?Sized>(
        &mut self,
        owner_id: EntityId,
        owner: &MovingEntity,
        ctx: &SteeringContext<'_>,
        rng: &mut R,
    ) -> Vec2 {
        match self {
            Behavior::Seek { target } => seek(owner, *target),
            Behavior::Flee { target } => flee(owner, *target),
            Behavior::Arrive {
                target,
                deceleration,
            } => arrive(owner, *target, *deceleration),
            Behavior::Pursuit { evader } => match ctx.find(*evader) {
                Some(evader) => pursuit(owner, &evader),
                None => Vec2::ZERO,
            },
            Behavior::Evade {
                pursuer,
                min_distance,
            } => match ctx.find(*pursuer) {
                Some(pursuer) => evade(owner, &pursuer, *min_distance),
                None => Vec2::ZERO,
            },
            Behavior::EvadeMulti { min_distance } => evade_multi(owner, ctx.threats, *min_distance),
            Behavior::Wander {
                jitter,
                radius,
                distance,
                target,
            } => {
                *target += random_direction(rng) * (*jitter * ctx.dt);
                *target = target.normalize_or_zero() * *radius;
                let local = *target + Vec2::new(*distance, 0.0);
                point_to_world_space(local, owner.heading, owner.side, owner.position) - owner.position
            }
            Behavior::Separation { neighbors, .. } => separation(owner_id, owner, neighbors),
        }
    }
}

/// Steer toward `target` at full speed
pub fn seek(owner: &MovingEntity, target: Vec2) -> Vec2 {
    let desired = (target - owner.position).normalize_or_zero() * owner.max_speed;
    desired - owner.velocity
}

/// Steer away from `target` at full speed
pub fn flee(owner: &MovingEntity, target: Vec2) -> Vec2 {
    let desired = (owner.position - target).normalize_or_zero() * owner.max_speed;
    desired - owner.velocity
}

/// Seek that decelerates to rest on the target
pub fn arrive(owner: &MovingEntity, target: Vec2, deceleration: Deceleration) -> Vec2 {
    let to_target = target - owner.position;
    let dist = to_target.length();
    if dist <= 0.0 {
        return Vec2::ZERO;
    }
    let speed = (dist / (deceleration.factor() * DECELERATION_TWEAKER)).min(owner.max_speed);
    let desired = to_target * speed / dist;
    desired - owner.velocity
}

/// Seek the evader's predicted position
pub fn pursuit(owner: &MovingEntity, evader: &AgentSnapshot) -> Vec2 {
    let to_evader = evader.position - owner.position;
    let closing_speed = owner.max_speed + evader.speed();
    let look_ahead = if closing_speed > 0.0 {
        to_evader.length() / closing_speed
    } else {
        0.0
    };
    seek(owner, evader.position + evader.velocity * look_ahead)
}

/// Flee the pursuer's predicted position while it is within `min_distance`
pub fn evade(owner: &MovingEntity, pursuer: &AgentSnapshot, min_distance: f32) -> Vec2 {
    let to_pursuer = pursuer.position - owner.position;
    if to_pursuer.length_squared() > min_distance * min_distance {
        return Vec2::ZERO;
    }
    let closing_speed = owner.max_speed + pursuer.speed();
    let look_ahead = if closing_speed > 0.0 {
        to_pursuer.length() / closing_speed
    } else {
        0.0
    };
    flee(owner, pursuer.position + pursuer.velocity * look_ahead)
}

/// Sum of evasions from every threat on a closing course inside `min_distance`,
/// each weighted by `max_force / distance`.
///
/// A threat is closing when its velocity opposes the owner's (negative dot
/// product); a stationary owner has no closing threats.
pub fn evade_multi(owner: &MovingEntity, threats: &[AgentSnapshot], min_distance: f32) -> Vec2 {
    let min_distance_sq = min_distance * min_distance;
    let mut force = Vec2::ZERO;
    for threat in threats {
        if threat.velocity.dot(owner.velocity) >= 0.0 {
            continue;
        }
        let to_threat = threat.position - owner.position;
        let dist_sq = to_threat.length_squared();
        if dist_sq >= min_distance_sq || dist_sq <= 0.0 {
            continue;
        }
        let dist = dist_sq.sqrt();
        let look_ahead = dist / (owner.max_speed + threat.speed());
        let predicted = threat.position + threat.velocity * look_ahead;
        force += owner.max_force * flee(owner, predicted) / dist;
    }
    force
}

/// Push away from neighbors, inversely proportional to distance
pub fn separation(owner_id: EntityId, owner: &MovingEntity, neighbors: &[AgentSnapshot]) -> Vec2 {
    let mut force = Vec2::ZERO;
    for other in neighbors {
        if other.id == owner_id {
            continue;
        }
        let to_agent = owner.position - other.position;
        let dist = to_agent.length();
        if dist <= 0.0 {
            continue;
        }
        force += to_agent / dist / dist * owner.max_speed;
    }
    force
}

/// Add `force` to `total` without exceeding `max_force`.
///
/// Returns false once the budget is spent and accumulation should stop.
pub fn accumulate_force(total: &mut Vec2, force: Vec2, max_force: f32) -> bool {
    let remaining = max_force - total.length();
    if remaining <= 0.0 {
        return false;
    }
    let magnitude = force.length();
    if magnitude < remaining {
        *total += force;
        true
    } else {
        *total += force / magnitude * remaining;
        false
    }
}

/// Active behaviors of one vehicle
#[derive(Debug, Clone, Default)]
pub struct SteeringManager {
    behaviors: BTreeMap<BehaviorKind, Behavior>,
}

impl SteeringManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a behavior; fails if one of the same kind is already active
    pub fn enable(&mut self, behavior: Behavior) -> Result<(), SimError> {
        let kind = behavior.kind();
        if self.behaviors.contains_key(&kind) {
            return Err(SimError::DuplicateBehavior(kind));
        }
        self.behaviors.insert(kind, behavior);
        Ok(())
    }

    /// Deactivate a behavior; no-op when it is not active
    pub fn disable(&mut self, kind: BehaviorKind) {
        self.behaviors.remove(&kind);
    }

    /// Deactivate every behavior
    pub fn reset(&mut self) {
        self.behaviors.clear();
    }

    pub fn is_enabled(&self, kind: BehaviorKind) -> bool {
        self.behaviors.contains_key(&kind)
    }

    pub fn is_empty(&self) -> bool {
        self.behaviors.is_empty()
    }

    pub fn kinds(&self) -> impl Iterator<Item = BehaviorKind> + '_ {
        self.behaviors.keys().copied()
    }

    pub fn refresh(&mut self, owner: &MovingEntity, ctx: &SteeringContext<'_>) {
        for behavior in self.behaviors.values_mut() {
            behavior.refresh(owner, ctx);
        }
    }

    /// Combined steering force, never longer than `owner.max_force`
    pub fn calculate<R: Rng + ?Sized>(
        &mut self,
        owner_id: EntityId,
        owner: &MovingEntity,
        ctx: &SteeringContext<'_>,
        rng: &mut R,
    ) -> Vec2 {
        let mut total = Vec2::ZERO;
        for behavior in self.behaviors.values_mut() {
            let force = behavior.calculate(owner_id, owner, ctx, rng);
            if !force.is_finite() {
                continue;
            }
            if !accumulate_force(&mut total, force, owner.max_force) {
                break;
            }
        }
        total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn owner_at(position: Vec2, velocity: Vec2) -> MovingEntity {
        let mut e = MovingEntity::new(position, velocity, 1.0, 300.0, 500.0, 720.0);
        e.velocity = velocity;
        e
    }

    fn snapshot(id: u32, position: Vec2, velocity: Vec2) -> AgentSnapshot {
        AgentSnapshot {
            id: EntityId(id),
            position,
            velocity,
        }
    }

    #[test]
    fn test_enable_twice_fails() {
        let mut manager = SteeringManager::new();
        manager.enable(Behavior::Seek { target: Vec2::ZERO }).unwrap();
        let err = manager.enable(Behavior::Seek { target: Vec2::ONE }).unwrap_err();
        assert!(matches!(err, SimError::DuplicateBehavior(BehaviorKind::Seek)));
        assert!(manager.is_enabled(BehaviorKind::Seek));
    }

    #[test]
    fn test_disable_and_reset_are_idempotent() {
        let mut manager = SteeringManager::new();
        manager.disable(BehaviorKind::Wander);
        manager.enable(Behavior::separation(100.0)).unwrap();
        manager.reset();
        manager.reset();
        assert!(manager.is_empty());
        assert!(!manager.is_enabled(BehaviorKind::Separation));
    }

    #[test]
    fn test_kinds_iterate_in_priority_order() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut manager = SteeringManager::new();
        manager.enable(Behavior::Pursuit { evader: EntityId(0) }).unwrap();
        manager.enable(Behavior::wander(1.0, 1.0, 1.0, &mut rng)).unwrap();
        manager.enable(Behavior::EvadeMulti { min_distance: 250.0 }).unwrap();
        manager.enable(Behavior::separation(100.0)).unwrap();
        let kinds: Vec<_> = manager.kinds().collect();
        assert_eq!(
            kinds,
            vec![
                BehaviorKind::EvadeMulti,
                BehaviorKind::Separation,
                BehaviorKind::Wander,
                BehaviorKind::Pursuit
            ]
        );
    }

    #[test]
    fn test_seek_and_flee_are_opposite_at_rest() {
        let owner = owner_at(Vec2::ZERO, Vec2::ZERO);
        let target = Vec2::new(10.0, 0.0);
        assert_eq!(seek(&owner, target), Vec2::new(300.0, 0.0));
        assert_eq!(flee(&owner, target), Vec2::new(-300.0, 0.0));
    }

    #[test]
    fn test_arrive_zero_at_target() {
        let owner = owner_at(Vec2::new(5.0, 5.0), Vec2::ZERO);
        assert_eq!(arrive(&owner, Vec2::new(5.0, 5.0), Deceleration::Normal), Vec2::ZERO);
        // Close to the target the desired speed is below max speed
        let f = arrive(&owner, Vec2::new(6.0, 5.0), Deceleration::Slow);
        assert!((f.x - 1.0 / 0.9).abs() < 1e-4);
    }

    #[test]
    fn test_pursuit_leads_moving_evader() {
        let owner = owner_at(Vec2::ZERO, Vec2::ZERO);
        let evader = snapshot(1, Vec2::new(300.0, 0.0), Vec2::new(0.0, 300.0));
        let f = pursuit(&owner, &evader);
        assert!(f.y > 0.0, "should aim ahead of the evader");
    }

    #[test]
    fn test_evade_only_inside_min_distance() {
        let owner = owner_at(Vec2::ZERO, Vec2::ZERO);
        let far = snapshot(1, Vec2::new(500.0, 0.0), Vec2::ZERO);
        let near = snapshot(1, Vec2::new(50.0, 0.0), Vec2::ZERO);
        assert_eq!(evade(&owner, &far, 100.0), Vec2::ZERO);
        assert!(evade(&owner, &near, 100.0).x < 0.0);
    }

    #[test]
    fn test_evade_multi_ignores_non_closing_threats() {
        let owner = owner_at(Vec2::ZERO, Vec2::new(100.0, 0.0));
        let closing = snapshot(1, Vec2::new(100.0, 0.0), Vec2::new(-500.0, 0.0));
        let receding = snapshot(2, Vec2::new(100.0, 0.0), Vec2::new(500.0, 0.0));
        let stacked = snapshot(3, Vec2::ZERO, Vec2::new(-500.0, 0.0));

        assert_eq!(evade_multi(&owner, &[receding], 250.0), Vec2::ZERO);
        assert_eq!(evade_multi(&owner, &[stacked], 250.0), Vec2::ZERO);
        assert!(evade_multi(&owner, &[closing], 250.0).x < 0.0);

        let resting = owner_at(Vec2::ZERO, Vec2::ZERO);
        assert_eq!(evade_multi(&resting, &[closing], 250.0), Vec2::ZERO);
    }

    #[test]
    fn test_separation_skips_self_and_coincident() {
        let owner = owner_at(Vec2::ZERO, Vec2::ZERO);
        let neighbors = [
            snapshot(1, Vec2::ZERO, Vec2::ZERO),
            snapshot(2, Vec2::ZERO, Vec2::ZERO),
            snapshot(3, Vec2::new(10.0, 0.0), Vec2::ZERO),
        ];
        let f = separation(EntityId(1), &owner, &neighbors);
        assert!(f.is_finite());
        assert!((f - Vec2::new(-30.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_budget_stops_after_saturating_behavior() {
        let mut total = Vec2::ZERO;
        assert!(accumulate_force(&mut total, Vec2::new(3.0, 0.0), 5.0));
        assert!(!accumulate_force(&mut total, Vec2::new(0.0, 10.0), 5.0));
        assert!((total - Vec2::new(3.0, 2.0)).length() < 1e-6);

        let mut spent = Vec2::new(5.0, 0.0);
        assert!(!accumulate_force(&mut spent, Vec2::new(1.0, 0.0), 5.0));
        assert_eq!(spent, Vec2::new(5.0, 0.0));
    }

    #[test]
    fn test_wander_stays_bounded() {
        let mut rng = Pcg32::seed_from_u64(42);
        let index = SpatialIndex::new(100.0);
        let ctx = SteeringContext {
            dt: 1.0 / 60.0,
            player: None,
            neighbors: &index,
            threats: &[],
        };
        let owner = owner_at(Vec2::new(400.0, 400.0), Vec2::ZERO);
        let mut wander = Behavior::wander(100_000.0, 150.0, 100.0, &mut rng);
        for _ in 0..100 {
            let f = wander.calculate(EntityId(0), &owner, &ctx, &mut rng);
            assert!(f.length() <= 250.0 + 1e-2);
        }
    }

    proptest! {
        #[test]
        fn prop_budget_never_exceeds_max_force(
            forces in prop::collection::vec((-1e4f32..1e4, -1e4f32..1e4), 0..8),
            max_force in 1.0f32..2000.0,
        ) {
            let mut total = Vec2::ZERO;
            for (x, y) in forces {
                if !accumulate_force(&mut total, Vec2::new(x, y), max_force) {
                    break;
                }
            }
            prop_assert!(total.length() <= max_force * 1.0001);
        }
    }
}
