//! Actors: everything that lives on the playfield
//!
//! An actor is a set of sprite parts placed around a center, a vehicle that
//! moves it, a logical state and an animation. What kind of actor it is
//! lives in [`Role`]; behavior that differs per kind dispatches on it.

use std::sync::Arc;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::animation::Animation;
use super::catalog::EnemyKind;
use super::collision::{SpritePose, bomb_ring_hits, circles_overlap, sprites_collide};
use super::player::PlayerData;
use super::spatial::{AgentSnapshot, EntityId};
use super::state::{ActorState, StateEvent};
use super::steering::SteeringContext;
use super::vehicle::{MovingEntity, Vehicle};
use crate::consts::{GAME_SPEED, MAX_X, MAX_Y, MIN_X, MIN_Y};
use crate::content::AlphaMask;
use crate::renderer::{Color, Renderer};
use crate::tuning::ActorStats;
use crate::{rotate_degrees, to_normalized, to_world};

/// Alpha every part is drawn with
pub const PART_ALPHA: u8 = 160;
/// Dead enemies inherit this multiple of the killing impulse as velocity
const DEATH_IMPULSE: f32 = 100.0;
/// Bullets are dropped once they leave this margin around the screen
const BULLET_MARGIN: f32 = 0.001;

/// One sprite of an actor, placed relative to the actor center
#[derive(Debug, Clone)]
pub struct ActorPart {
    pub mask: Arc<AlphaMask>,
    /// Offset from the actor center (normalized, unrotated)
    pub displacement: Vec2,
    /// Degrees added to the actor rotation
    pub rotation_offset: f32,
    pub scale: Vec2,
    pub color: Color,
    /// World placement, refreshed by [`ActorPart::update_transform`]
    pub position: Vec2,
    pub rotation: f32,
}

impl ActorPart {
    pub fn new(mask: Arc<AlphaMask>, displacement: Vec2, rotation_offset: f32, scale: Vec2, color: Color) -> Self {
        Self {
            mask,
            displacement,
            rotation_offset,
            scale,
            color: color.with_alpha(PART_ALPHA),
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    /// Place the part for an actor at `position` with draw rotation `rotation`.
    /// The displacement is rotated in pixel space so the layout keeps its shape.
    pub fn update_transform(&mut self, position: Vec2, rotation: f32) {
        let offset = rotate_degrees(to_world(self.displacement), rotation);
        self.position = position + to_normalized(offset);
        self.rotation = rotation + self.rotation_offset;
    }

    pub fn pose(&self) -> SpritePose<'_> {
        SpritePose {
            mask: &self.mask,
            position: self.position,
            rotation: self.rotation,
            scale: self.scale,
        }
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        renderer.draw_quad(self.mask.name(), self.position, self.rotation, self.scale, self.color);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyData {
    pub kind: EnemyKind,
    pub points: u64,
}

/// Expanding ring state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BombData {
    pub elapsed: f32,
    /// Current ring radius (reference pixels)
    pub radius: f32,
    pub duration: f32,
    /// Reference pixels per second
    pub expansion_speed: f32,
}

impl BombData {
    /// Grow the ring; returns true once the bomb is spent
    pub fn advance(&mut self, dt: f32) -> bool {
        self.elapsed += dt;
        if self.elapsed < self.duration {
            self.radius = self.elapsed * self.expansion_speed;
            false
        } else {
            true
        }
    }
}

#[derive(Debug, Clone)]
pub enum Role {
    Player(PlayerData),
    Enemy(EnemyData),
    Bullet,
    Bomb(BombData),
}

#[derive(Debug, Clone)]
pub struct Actor {
    pub id: EntityId,
    pub role: Role,
    /// Normalized screen position
    pub position: Vec2,
    /// Degrees
    pub rotation: f32,
    /// Bounding radius, normalized
    pub radius: f32,
    pub parts: Vec<ActorPart>,
    pub vehicle: Vehicle,
    state: ActorState,
    animation: Animation,
}

impl Actor {
    /// Actor in the Normal state. `velocity` and `stats.max_speed` are in
    /// reference pixels per second and get the global speed scale applied.
    pub fn new(id: EntityId, role: Role, position: Vec2, velocity: Vec2, stats: &ActorStats, parts: Vec<ActorPart>) -> Self {
        let entity = MovingEntity::new(
            to_world(position),
            velocity * GAME_SPEED,
            stats.mass,
            stats.max_speed * GAME_SPEED,
            stats.max_force,
            stats.max_turn_rate,
        );
        let mut actor = Self {
            id,
            role,
            position,
            rotation: 0.0,
            radius: stats.radius,
            parts,
            vehicle: Vehicle::new(entity),
            state: ActorState::Normal,
            animation: Animation::None,
        };
        actor.sync_parts();
        actor
    }

    pub fn state(&self) -> &ActorState {
        &self.state
    }

    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    pub fn collidable(&self) -> bool {
        self.state.collidable()
    }

    pub fn enemy_kind(&self) -> Option<EnemyKind> {
        match &self.role {
            Role::Enemy(data) => Some(data.kind),
            _ => None,
        }
    }

    pub fn velocity(&self) -> Vec2 {
        self.vehicle.entity.velocity
    }

    pub fn snapshot(&self) -> AgentSnapshot {
        self.vehicle.entity.snapshot(self.id)
    }

    /// Switch state and install the state's own animation
    pub(crate) fn enter(&mut self, state: ActorState) {
        self.animation = state.entry_animation();
        self.state = state;
    }

    /// Switch state with a specific animation
    pub(crate) fn enter_with(&mut self, state: ActorState, animation: Animation) {
        self.state = state;
        self.animation = animation;
    }

    /// Move the actor, keeping the vehicle in sync
    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
        self.vehicle.entity.position = to_world(position);
        self.sync_parts();
    }

    /// Advance one tick: animation, movement (if the state allows it), timers.
    pub fn update<R: Rng + ?Sized>(&mut self, ctx: &SteeringContext<'_>, rng: &mut R) -> StateEvent {
        if let Role::Bomb(bomb) = &mut self.role {
            return if bomb.advance(ctx.dt) {
                StateEvent::Expired
            } else {
                StateEvent::None
            };
        }

        self.animation.update(&mut self.parts, &mut self.rotation, ctx.dt, rng);

        if self.state.moves() {
            match self.role {
                Role::Player(_) => self.move_player(ctx.dt),
                Role::Enemy(_) => {
                    self.vehicle.update(self.id, ctx, rng);
                    self.position = to_normalized(self.vehicle.entity.position);
                    self.clamp_to_playfield();
                }
                Role::Bullet => {
                    self.vehicle.update(self.id, ctx, rng);
                    self.position = to_normalized(self.vehicle.entity.position);
                }
                Role::Bomb(_) => {}
            }
        }

        let event = self.state.advance(ctx.dt);
        if let StateEvent::Matured(animation) = &event {
            self.enter_with(ActorState::Normal, animation.clone());
        }
        self.sync_parts();
        event
    }

    pub(crate) fn sync_parts(&mut self) {
        let (position, rotation) = (self.position, self.rotation + 90.0);
        for part in &mut self.parts {
            part.update_transform(position, rotation);
        }
    }

    pub(crate) fn clamp_to_playfield(&mut self) {
        let clamped = self.position.clamp(Vec2::new(MIN_X, MIN_Y), Vec2::new(MAX_X, MAX_Y));
        if clamped != self.position {
            self.position = clamped;
            self.vehicle.entity.position = to_world(clamped);
        }
    }

    pub fn is_out_of_bounds(&self) -> bool {
        let p = self.position;
        p.x > 1.0 + BULLET_MARGIN || p.x < -BULLET_MARGIN || p.y > 1.0 + BULLET_MARGIN || p.y < -BULLET_MARGIN
    }

    /// Broad phase on bounding circles, then any pixel-overlapping part pair
    pub fn collides_with(&self, other: &Actor) -> bool {
        if !self.collidable() || !other.collidable() {
            return false;
        }
        if !circles_overlap(self.position, self.radius, other.position, other.radius) {
            return false;
        }
        self.parts
            .iter()
            .any(|mine| other.parts.iter().any(|theirs| sprites_collide(&mine.pose(), &theirs.pose())))
    }

    /// Ring test for bombs; always false for other roles
    pub fn bomb_hits(&self, other: &Actor) -> bool {
        match &self.role {
            Role::Bomb(bomb) => bomb_ring_hits(self.position, bomb.radius, other.position),
            _ => false,
        }
    }

    /// Bring an enemy straight to its active state, skipping the born phase
    pub fn activate(&mut self) {
        if let Some(kind) = self.enemy_kind() {
            if kind.has_born_phase() {
                self.enter_with(ActorState::Normal, kind.active_animation());
                self.sync_parts();
            }
        }
    }

    /// Kill an enemy. Its velocity follows `impulse` and its behaviors stop.
    ///
    /// Returns true if the death splits the enemy into children.
    pub fn die(&mut self, impulse: Vec2) -> bool {
        let Some(kind) = self.enemy_kind() else {
            return false;
        };
        if self.state.is_dead() {
            return false;
        }
        let entity = &mut self.vehicle.entity;
        entity.velocity = (impulse * DEATH_IMPULSE).clamp_length_max(entity.max_speed);
        self.vehicle.steering.reset();
        if kind == EnemyKind::FastRhomb {
            self.enter(ActorState::fast_rhomb_dead());
            true
        } else {
            self.enter(ActorState::enemy_dead());
            false
        }
    }

    /// Stop chasing: clear behaviors and velocity
    pub fn freeze(&mut self) {
        self.vehicle.steering.reset();
        self.vehicle.entity.velocity = Vec2::ZERO;
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.animation.draw(&self.parts, renderer);
    }
}
