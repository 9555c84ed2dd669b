//! Actor catalog
//!
//! Builds every actor kind the game knows: sprite layouts, stats from
//! [`Tuning`], starting states and steering behaviors.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorPart, BombData, EnemyData, Role};
use super::animation::Animation;
use super::player::PlayerData;
use super::spatial::EntityId;
use super::state::{ActorState, FAST_RHOMB_SPIN};
use super::steering::Behavior;
use crate::consts::GAME_SPEED;
use crate::content::{AlphaMask, Content, SMALL_RECT};
use crate::error::SimError;
use crate::renderer::Color;
use crate::tuning::{ActorStats, Tuning};
use crate::{perpendicular, random_direction, rotate_degrees, to_normalized, to_world};

/// Spin rate of FastSmallRhombs (degrees per second)
pub const SMALL_RHOMB_SPIN: f32 = -400.0;
/// Children spawned when a FastRhomb dies
pub const SPLIT_COUNT: usize = 3;
/// Player start position and draw rotation
const PLAYER_START: Vec2 = Vec2::new(0.5, 0.5);
const PLAYER_ROTATION: f32 = 45.0;
/// Screen corners used by corner waves
pub const CORNERS: [Vec2; 4] = [Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0), Vec2::new(1.0, 1.0), Vec2::new(1.0, 0.0)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnemyKind {
    /// Pursues the player
    Rhomb,
    /// Pursues the player and dodges bullets
    SmartRhomb,
    /// Heavy pursuer that splits into three FastSmallRhombs
    FastRhomb,
    /// Wanders at random
    FastSmallRhomb,
}

impl EnemyKind {
    pub fn color(self) -> Color {
        match self {
            EnemyKind::Rhomb => Color::AQUA,
            EnemyKind::SmartRhomb => Color::LAWN_GREEN,
            EnemyKind::FastRhomb | EnemyKind::FastSmallRhomb => Color::PINK,
        }
    }

    pub fn has_born_phase(self) -> bool {
        self != EnemyKind::FastSmallRhomb
    }

    /// State a freshly spawned enemy starts in
    pub fn initial_state(self) -> ActorState {
        match self {
            EnemyKind::Rhomb => ActorState::rhomb_born(),
            EnemyKind::SmartRhomb => ActorState::born(),
            EnemyKind::FastRhomb => ActorState::fast_rhomb_born(),
            EnemyKind::FastSmallRhomb => ActorState::Normal,
        }
    }

    /// Animation while active
    pub fn active_animation(self) -> Animation {
        match self {
            EnemyKind::Rhomb => Animation::rhomb_squeeze(),
            EnemyKind::SmartRhomb => Animation::None,
            EnemyKind::FastRhomb => Animation::spin(FAST_RHOMB_SPIN),
            EnemyKind::FastSmallRhomb => Animation::spin(SMALL_RHOMB_SPIN),
        }
    }
}

/// Creates actors with unique ids
#[derive(Debug, Clone)]
pub struct Spawner {
    tuning: Tuning,
    mask: Arc<AlphaMask>,
    next_id: u32,
}

impl Spawner {
    pub fn new(tuning: Tuning, content: &Content) -> Result<Self, SimError> {
        Ok(Self {
            tuning,
            mask: content.get(SMALL_RECT)?,
            next_id: 0,
        })
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Part displaced by (`dx`, `dy`) reference pixels
    fn part(&self, dx: f32, dy: f32, rotation_offset: f32, scale_x: f32, color: Color) -> ActorPart {
        ActorPart::new(
            self.mask.clone(),
            to_normalized(Vec2::new(dx, dy)),
            rotation_offset,
            Vec2::new(scale_x, 0.5),
            color,
        )
    }

    /// Four edges of a diamond, `half` pixels from the center on each axis
    fn diamond(&self, half: f32, scale_x: f32, color: Color) -> Vec<ActorPart> {
        vec![
            self.part(half, half, -45.0, scale_x, color),
            self.part(-half, half, 45.0, scale_x, color),
            self.part(-half, -half, -45.0, scale_x, color),
            self.part(half, -half, 45.0, scale_x, color),
        ]
    }

    fn enemy_parts(&self, kind: EnemyKind) -> Vec<ActorPart> {
        let c = kind.color();
        match kind {
            EnemyKind::Rhomb => self.diamond(8.0, 0.5, c),
            EnemyKind::SmartRhomb => {
                let mut parts = self.diamond(8.0, 0.5, c);
                parts.extend([
                    self.part(8.0, 0.0, 90.0, 0.25, c),
                    self.part(-8.0, 0.0, 90.0, 0.25, c),
                    self.part(0.0, 8.0, 0.0, 0.25, c),
                    self.part(0.0, -8.0, 0.0, 0.25, c),
                ]);
                parts
            }
            EnemyKind::FastRhomb => {
                let mut parts = self.diamond(8.0, 0.5, c);
                parts.extend([self.part(0.0, 0.0, 0.0, 0.7071, c), self.part(0.0, 0.0, 90.0, 0.7071, c)]);
                parts
            }
            EnemyKind::FastSmallRhomb => {
                let mut parts = self.diamond(4.0, 0.25, c);
                parts.extend([self.part(0.0, 0.0, 0.0, 0.3535, c), self.part(0.0, 0.0, 90.0, 0.3535, c)]);
                parts
            }
        }
    }

    pub fn player_parts(&self) -> Vec<ActorPart> {
        let c = Color::WHITE;
        vec![
            self.part(7.0, 5.0, -40.0, 0.4, c),
            self.part(-7.0, 5.0, 40.0, 0.4, c),
            self.part(5.0, -4.0, -25.0, 0.25, c),
            self.part(-5.0, -4.0, 25.0, 0.25, c),
            self.part(12.0, -8.0, 65.0, 0.325, c),
            self.part(-12.0, -8.0, -65.0, 0.325, c),
        ]
    }

    /// The player at the screen center, in its born state
    pub fn player(&mut self) -> Actor {
        let data = PlayerData::new(self.tuning.player_lives, self.tuning.player_bombs);
        let parts = self.player_parts();
        let id = self.next_id();
        let mut player = Actor::new(id, Role::Player(data), PLAYER_START, Vec2::ZERO, &self.tuning.player, parts);
        player.rotation = PLAYER_ROTATION;
        player.sync_parts();
        player.enter(ActorState::player_born());
        player
    }

    /// Enemy of `kind` chasing `target`, in its initial state
    pub fn enemy<R: Rng + ?Sized>(
        &mut self,
        kind: EnemyKind,
        position: Vec2,
        target: EntityId,
        rng: &mut R,
    ) -> Result<Actor, SimError> {
        let stats = *self.tuning.enemy(kind);
        let parts = self.enemy_parts(kind);
        let id = self.next_id();
        let role = Role::Enemy(EnemyData {
            kind,
            points: stats.points,
        });
        let mut enemy = Actor::new(id, role, position, Vec2::ZERO, &stats.stats, parts);

        let steering = &mut enemy.vehicle.steering;
        match kind {
            EnemyKind::Rhomb | EnemyKind::FastRhomb => {
                steering.enable(Behavior::Pursuit { evader: target })?;
                steering.enable(Behavior::separation(self.tuning.separation_radius))?;
            }
            EnemyKind::SmartRhomb => {
                steering.enable(Behavior::Pursuit { evader: target })?;
                steering.enable(Behavior::separation(self.tuning.separation_radius))?;
                steering.enable(Behavior::EvadeMulti {
                    min_distance: self.tuning.evade_distance,
                })?;
            }
            EnemyKind::FastSmallRhomb => {
                steering.enable(Behavior::wander(
                    self.tuning.wander_jitter,
                    self.tuning.wander_radius,
                    self.tuning.wander_distance,
                    rng,
                ))?;
                enemy.vehicle.entity.set_heading(random_direction(rng));
            }
        }

        let state = kind.initial_state();
        if state == ActorState::Normal {
            enemy.enter_with(state, kind.active_animation());
        } else {
            enemy.enter(state);
        }
        Ok(enemy)
    }

    fn bullet(&mut self, position: Vec2, direction: Vec2) -> Actor {
        let stats = ActorStats {
            mass: self.tuning.bullet_mass,
            max_speed: self.tuning.bullet_speed,
            max_force: 0.0,
            max_turn_rate: 0.0,
            radius: self.tuning.bullet_radius,
        };
        let parts = vec![
            self.part(0.0, 0.0, 90.0, 0.15, Color::WHITE),
            self.part(-6.0, 1.0, 10.0, 0.28, Color::WHITE),
            self.part(-6.0, -1.0, -10.0, 0.28, Color::WHITE),
        ];
        let id = self.next_id();
        let mut bullet = Actor::new(id, Role::Bullet, position, direction * stats.max_speed, &stats, parts);
        bullet.rotation = direction.y.atan2(direction.x).to_degrees() + 90.0;
        bullet.sync_parts();
        bullet
    }

    /// Five-bullet spread fired from `position` along unit `direction`
    pub fn volley(&mut self, position: Vec2, direction: Vec2) -> Vec<Actor> {
        let perp = perpendicular(direction).normalize_or_zero();
        let origin = to_world(position);
        let shots = [
            (origin + 5.0 * direction, 0.0),
            (origin + 5.0 * perp + 3.0 * direction, 1.1),
            (origin - 5.0 * perp + 3.0 * direction, -1.1),
            (origin + 6.0 * perp, 2.8),
            (origin - 6.0 * perp, -2.8),
        ];
        shots
            .into_iter()
            .map(|(at, spread)| self.bullet(to_normalized(at), rotate_degrees(direction, spread)))
            .collect()
    }

    /// Stationary ring source. Its reach comes from the ring alone, so the
    /// bounding radius is zero.
    pub fn bomb(&mut self, position: Vec2) -> Actor {
        let stats = ActorStats {
            mass: 1.0,
            max_speed: 0.0,
            max_force: 0.0,
            max_turn_rate: 0.0,
            radius: 0.0,
        };
        let data = BombData {
            elapsed: 0.0,
            radius: 0.0,
            duration: self.tuning.bomb_duration,
            expansion_speed: self.tuning.bomb_expansion_speed * GAME_SPEED,
        };
        let id = self.next_id();
        Actor::new(id, Role::Bomb(data), position, Vec2::ZERO, &stats, Vec::new())
    }

    fn scattered<R: Rng + ?Sized>(&self, center: Vec2, rng: &mut R) -> Vec2 {
        center + random_direction(rng) * rng.random_range(0.0..=self.tuning.spawn_scatter)
    }

    /// `size` Rhombs scattered around a random point
    pub fn flock<R: Rng + ?Sized>(&mut self, size: usize, target: EntityId, rng: &mut R) -> Result<Vec<Actor>, SimError> {
        let center = Vec2::new(rng.random_range(0.0..1.0), rng.random_range(0.0..1.0));
        (0..size)
            .map(|_| {
                let at = self.scattered(center, rng);
                self.enemy(EnemyKind::Rhomb, at, target, rng)
            })
            .collect()
    }

    /// FastSmallRhombs left behind by a dead FastRhomb
    pub fn split<R: Rng + ?Sized>(&mut self, position: Vec2, rng: &mut R) -> Result<Vec<Actor>, SimError> {
        (0..SPLIT_COUNT)
            .map(|_| {
                let at = self.scattered(position, rng);
                self.enemy(EnemyKind::FastSmallRhomb, at, EntityId(u32::MAX), rng)
            })
            .collect()
    }

    /// One active enemy of `kind` at each screen corner
    pub fn corner_wave<R: Rng + ?Sized>(
        &mut self,
        kind: EnemyKind,
        target: EntityId,
        rng: &mut R,
    ) -> Result<Vec<Actor>, SimError> {
        CORNERS
            .iter()
            .map(|&corner| {
                let mut enemy = self.enemy(kind, corner, target, rng)?;
                enemy.activate();
                Ok(enemy)
            })
            .collect()
    }
}
