//! Player input, ship control and scoring
//!
//! Input is polled: the shell fills a [`PlayerIntent`] each tick and the
//! simulation reads it. Nothing here knows about keyboards or gamepads.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::actor::{Actor, ActorPart, Role};
use super::state::ActorState;
use crate::consts::{REFERENCE_HEIGHT, REFERENCE_WIDTH};
use crate::error::SimError;
use crate::renderer::{Color, Renderer};
use crate::{to_normalized, to_world};

/// Stick deflection below this (squared) counts as released
const DEAD_ZONE_SQ: f32 = 0.001;
/// Number of input slots
pub const MAX_PLAYERS: usize = 4;

/// What the player wants to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerIntent {
    /// Movement direction; zero to stand still
    pub move_direction: Vec2,
    /// Firing direction; zero to hold fire
    pub shoot_direction: Vec2,
    /// Held bomb button; a bomb goes off on the press
    pub wants_bomb: bool,
}

impl PlayerIntent {
    /// Same intent with weapons masked out
    pub fn without_weapons(self) -> Self {
        Self {
            shoot_direction: Vec2::ZERO,
            wants_bomb: false,
            ..self
        }
    }
}

/// Validated input slot index (0-3)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlayerSlot(usize);

impl PlayerSlot {
    pub const ONE: PlayerSlot = PlayerSlot(0);

    pub fn index(self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for PlayerSlot {
    type Error = SimError;

    fn try_from(value: usize) -> Result<Self, Self::Error> {
        if value < MAX_PLAYERS {
            Ok(PlayerSlot(value))
        } else {
            Err(SimError::InvalidPlayerSlot(value))
        }
    }
}

/// Intents for every input slot in one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct InputFrame {
    slots: [PlayerIntent; MAX_PLAYERS],
}

impl InputFrame {
    pub fn get(&self, slot: PlayerSlot) -> &PlayerIntent {
        &self.slots[slot.0]
    }

    pub fn set(&mut self, slot: PlayerSlot, intent: PlayerIntent) {
        self.slots[slot.0] = intent;
    }
}

/// Player-only state carried in [`Role::Player`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub lives: u32,
    pub bombs: u32,
    pub score: u64,
    pub multiplier: u64,
    /// Last non-zero firing direction
    pub shoot_direction: Vec2,
    /// Seconds accumulated toward the next volley
    shot_timer: Option<f32>,
    bomb_held: bool,
    pub intent: PlayerIntent,
}

impl PlayerData {
    pub fn new(lives: u32, bombs: u32) -> Self {
        Self {
            lives,
            bombs,
            score: 0,
            multiplier: 1,
            shoot_direction: Vec2::X,
            shot_timer: None,
            bomb_held: false,
            intent: PlayerIntent::default(),
        }
    }

    /// Add `points` scaled by the current multiplier; returns the awarded amount
    pub fn add_to_score(&mut self, points: u64) -> u64 {
        let awarded = self.multiplier * points;
        self.score += awarded;
        awarded
    }

    /// Holding fire shoots one volley every `interval` seconds; the first
    /// volley of a game goes off immediately.
    ///
    /// Returns the firing direction when a volley is due.
    pub fn trigger(&mut self, dt: f32, interval: f32) -> Option<Vec2> {
        let direction = self.intent.shoot_direction;
        if direction.length_squared() < DEAD_ZONE_SQ {
            return None;
        }
        self.shoot_direction = direction.normalize();
        let timer = self.shot_timer.get_or_insert(interval);
        let fire = *timer >= interval;
        if fire {
            *timer = 0.0;
        }
        *timer += dt;
        fire.then_some(self.shoot_direction)
    }

    /// True on the tick the bomb button goes down while bombs remain
    pub fn use_bomb(&mut self) -> bool {
        let pressed = self.intent.wants_bomb && !self.bomb_held;
        self.bomb_held = self.intent.wants_bomb;
        if pressed && self.bombs > 0 {
            self.bombs -= 1;
            true
        } else {
            false
        }
    }

    pub fn hud_lines(&self) -> [String; 3] {
        [
            format!("Score: {}", self.score),
            format!("Bombs: {}", self.bombs),
            format!("Lives: {}", self.lives),
        ]
    }
}

impl Actor {
    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.role {
            Role::Player(data) => Some(data),
            _ => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.role {
            Role::Player(data) => Some(data),
            _ => None,
        }
    }

    /// Direct control: move at full speed along the intent and turn the
    /// ship toward the movement direction.
    pub(crate) fn move_player(&mut self, dt: f32) {
        let Role::Player(data) = &self.role else {
            return;
        };
        let wanted = data.intent.move_direction;
        let direction = if wanted.length_squared() > DEAD_ZONE_SQ {
            wanted.normalize()
        } else {
            Vec2::ZERO
        };
        let turn_speed = self.vehicle.entity.max_turn_rate;

        if direction != Vec2::ZERO {
            let r = self.rotation.to_radians();
            let facing = Vec2::new(-r.sin(), r.cos());
            let dot = direction.dot(facing);
            if (dot - 1.0).abs() > 0.001 {
                self.rotation += if dot > 0.0 { dt * turn_speed } else { -dt * turn_speed };
            }
            self.rotation %= 360.0;
        }

        let max_speed = self.vehicle.entity.max_speed;
        self.position += to_normalized(direction * max_speed * dt);
        self.clamp_to_playfield();
        self.vehicle.entity.position = to_world(self.position);
        self.vehicle.entity.velocity = direction * max_speed;
    }

    /// Player death: lose a life and start fading out
    pub fn kill_player(&mut self) {
        if let Role::Player(data) = &mut self.role {
            data.lives = data.lives.saturating_sub(1);
            self.vehicle.entity.velocity = Vec2::ZERO;
            self.enter(ActorState::PlayerDead);
        }
    }

    /// Rebuild the ship where it died and restart the born phase
    pub fn respawn(&mut self, parts: Vec<ActorPart>) {
        if let Role::Player(data) = &mut self.role {
            data.intent = PlayerIntent::default();
            self.parts = parts;
            self.vehicle.entity.velocity = Vec2::ZERO;
            self.enter(ActorState::player_born());
            self.sync_parts();
        }
    }

    /// Score, bombs and lives in screen-space text
    pub fn draw_hud(&self, renderer: &mut dyn Renderer) {
        let Some(data) = self.player_data() else {
            return;
        };
        let [score, bombs, lives] = data.hud_lines();
        let x = 5.0 / REFERENCE_WIDTH;
        renderer.draw_text(&score, Vec2::new(x, 5.0 / REFERENCE_HEIGHT), Color::WHITE);
        renderer.draw_text(&bombs, Vec2::new(x, (REFERENCE_HEIGHT - 50.0) / REFERENCE_HEIGHT), Color::WHITE);
        renderer.draw_text(&lives, Vec2::new(x, (REFERENCE_HEIGHT - 25.0) / REFERENCE_HEIGHT), Color::WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::Content;
    use crate::renderer::CommandBuffer;
    use crate::sim::catalog::Spawner;
    use crate::tuning::Tuning;

    fn player() -> Actor {
        Spawner::new(Tuning::default(), &Content::builtin()).unwrap().player()
    }

    #[test]
    fn test_player_slots() {
        assert_eq!(PlayerSlot::try_from(3).unwrap().index(), 3);
        assert!(matches!(PlayerSlot::try_from(4), Err(SimError::InvalidPlayerSlot(4))));

        let mut frame = InputFrame::default();
        let intent = PlayerIntent {
            move_direction: Vec2::X,
            ..Default::default()
        };
        frame.set(PlayerSlot::try_from(2).unwrap(), intent);
        assert_eq!(*frame.get(PlayerSlot::try_from(2).unwrap()), intent);
        assert_eq!(*frame.get(PlayerSlot::ONE), PlayerIntent::default());
    }

    #[test]
    fn test_score_uses_multiplier() {
        let mut data = PlayerData::new(3, 3);
        assert_eq!(data.add_to_score(50), 50);
        data.multiplier = 3;
        assert_eq!(data.add_to_score(25), 75);
        assert_eq!(data.score, 125);
    }

    #[test]
    fn test_shot_cadence() {
        let mut data = PlayerData::new(3, 3);
        data.intent.shoot_direction = Vec2::new(0.0, -2.0);
        let dt = 0.05;
        let fired: Vec<bool> = (0..8).map(|_| data.trigger(dt, 0.18).is_some()).collect();
        // Immediately, then once 0.18 s have accumulated
        assert_eq!(fired, vec![true, false, false, false, true, false, false, false]);
        assert_eq!(data.shoot_direction, Vec2::NEG_Y);

        data.intent.shoot_direction = Vec2::ZERO;
        assert!(data.trigger(dt, 0.18).is_none());
    }

    #[test]
    fn test_bomb_fires_on_press_only() {
        let mut data = PlayerData::new(3, 2);
        data.intent.wants_bomb = true;
        assert!(data.use_bomb());
        assert!(!data.use_bomb());
        data.intent.wants_bomb = false;
        assert!(!data.use_bomb());
        data.intent.wants_bomb = true;
        assert!(data.use_bomb());
        data.intent.wants_bomb = false;
        data.use_bomb();
        data.intent.wants_bomb = true;
        assert!(!data.use_bomb());
        assert_eq!(data.bombs, 0);
    }

    #[test]
    fn test_player_moves_and_clamps() {
        let mut p = player();
        p.player_data_mut().unwrap().intent.move_direction = Vec2::new(3.0, 0.0);
        let start = p.position;
        p.move_player(0.1);
        let moved = to_world(p.position - start);
        assert!((moved.x - 550.0 * crate::consts::GAME_SPEED * 0.1).abs() < 1e-2);
        assert_eq!(p.vehicle.entity.velocity, Vec2::new(p.vehicle.entity.max_speed, 0.0));

        for _ in 0..100 {
            p.move_player(0.1);
        }
        assert_eq!(p.position.x, crate::consts::MAX_X);
    }

    #[test]
    fn test_kill_and_respawn() {
        let mut p = player();
        p.kill_player();
        assert_eq!(*p.state(), ActorState::PlayerDead);
        assert_eq!(p.player_data().unwrap().lives, 2);
        assert!(!p.collidable());

        let parts = p.parts.clone();
        p.respawn(parts);
        assert!(matches!(p.state(), ActorState::PlayerBorn { .. }));
        assert!(matches!(p.animation(), crate::sim::animation::Animation::Flash { .. }));
    }

    #[test]
    fn test_hud_text() {
        let p = player();
        let mut buf = CommandBuffer::new();
        p.draw_hud(&mut buf);
        let texts: Vec<_> = buf.texts().collect();
        assert_eq!(texts, vec!["Score: 0", "Bombs: 3", "Lives: 3"]);
    }
}
