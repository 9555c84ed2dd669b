//! Game modes and the player life cycle
//!
//! A level owns the entity manager and at most one enemy generator. It
//! masks input per mode, turns player hits into deaths, and respawns the
//! player after a delay until the lives run out.

use serde::{Deserialize, Serialize};

use super::catalog::EnemyKind;
use super::entity_manager::{EntityManager, TickReport};
use super::generator::EnemyGenerator;
use super::player::PlayerIntent;
use crate::consts::RESPAWN_DELAY;
use crate::content::Content;
use crate::error::SimError;
use crate::renderer::Renderer;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LevelMode {
    /// Endless Rhomb flocks; the player cannot shoot or bomb
    PeaceKeeper,
    /// Corner waves of SmartRhombs, refreshed on a timer
    Evolved,
    /// Empty field; enemies are spawned by the caller
    Sandbox,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum LevelEvent {
    PlayerDied { lives_left: u32 },
    PlayerRespawned,
    GameOver { score: u64 },
    GeneratorReplaced,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Life {
    Alive,
    Dead { elapsed: f32 },
}

pub struct Level {
    mode: LevelMode,
    manager: EntityManager,
    generator: Option<EnemyGenerator>,
    life: Life,
    mode_timer: f32,
    game_over: bool,
}

impl Level {
    pub fn new(mode: LevelMode, tuning: Tuning, content: &Content, seed: u64) -> Result<Self, SimError> {
        let generator = match mode {
            LevelMode::PeaceKeeper => Some(EnemyGenerator::flock(&tuning)),
            LevelMode::Evolved => Some(Self::evolved_generator(&tuning)),
            LevelMode::Sandbox => None,
        };
        let manager = EntityManager::new(tuning, content, seed)?;
        log::info!("Level {mode:?} started (seed {seed})");
        Ok(Self {
            mode,
            manager,
            generator,
            life: Life::Alive,
            mode_timer: 0.0,
            game_over: false,
        })
    }

    fn evolved_generator(tuning: &Tuning) -> EnemyGenerator {
        EnemyGenerator::corner(tuning, EnemyKind::SmartRhomb, tuning.evolved_rounds)
    }

    pub fn mode(&self) -> LevelMode {
        self.mode
    }

    pub fn manager(&self) -> &EntityManager {
        &self.manager
    }

    pub fn manager_mut(&mut self) -> &mut EntityManager {
        &mut self.manager
    }

    pub fn generator(&self) -> Option<&EnemyGenerator> {
        self.generator.as_ref()
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn player_alive(&self) -> bool {
        self.life == Life::Alive
    }

    /// Run one tick. Returns the level events and the manager's tick report.
    pub fn update(&mut self, intent: &PlayerIntent, dt: f32) -> Result<(Vec<LevelEvent>, TickReport), SimError> {
        let mut events = Vec::new();
        if self.game_over {
            return Ok((events, TickReport::default()));
        }

        if self.mode == LevelMode::Evolved {
            self.mode_timer += dt;
            if self.mode_timer > self.manager.tuning().evolved_refresh {
                self.mode_timer = 0.0;
                self.generator = Some(Self::evolved_generator(self.manager.tuning()));
                log::info!("Evolved generator replaced");
                events.push(LevelEvent::GeneratorReplaced);
            }
        }

        let intent = match self.mode {
            LevelMode::PeaceKeeper => intent.without_weapons(),
            LevelMode::Evolved | LevelMode::Sandbox => *intent,
        };
        let report = self.manager.tick(&intent, dt)?;

        if report.player_hit && self.life == Life::Alive {
            self.on_player_hit(&mut events);
        }

        match &mut self.life {
            Life::Alive => {
                if let Some(generator) = &mut self.generator {
                    generator.update(dt, &mut self.manager)?;
                }
            }
            Life::Dead { elapsed } => {
                *elapsed += dt;
                if *elapsed > RESPAWN_DELAY {
                    self.life = Life::Alive;
                    self.manager.on_player_alive();
                    self.manager.respawn_player();
                    log::info!("Player respawned");
                    events.push(LevelEvent::PlayerRespawned);
                }
            }
        }
        Ok((events, report))
    }

    fn on_player_hit(&mut self, events: &mut Vec<LevelEvent>) {
        let (lives, score) = self
            .manager
            .player()
            .player_data()
            .map_or((0, 0), |data| (data.lives, data.score));
        if lives == 0 {
            self.game_over = true;
            log::info!("Game over, score {score}");
            events.push(LevelEvent::GameOver { score });
            return;
        }
        self.manager.on_player_dead();
        self.manager.player_mut().kill_player();
        self.life = Life::Dead { elapsed: 0.0 };
        log::info!("Player died, {} lives left", lives - 1);
        events.push(LevelEvent::PlayerDied { lives_left: lives - 1 });
    }

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        self.manager.draw(renderer);
    }
}
