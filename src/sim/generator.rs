//! Timed enemy generators
//!
//! A generator waits for its start delay, then fires every `period` seconds
//! until it runs out of rounds. Spawned enemies go through the entity
//! manager's staging like any other addition.

use serde::{Deserialize, Serialize};

use super::catalog::EnemyKind;
use super::entity_manager::EntityManager;
use crate::error::SimError;
use crate::tuning::Tuning;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GeneratorKind {
    /// A flock of Rhombs around a random point, forever
    Flock,
    /// One enemy of `kind` at each corner, `per_corner` times
    Corner { kind: EnemyKind, per_corner: u32, rounds: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyGenerator {
    kind: GeneratorKind,
    period: f32,
    /// Delay before the first round
    wait: f32,
    wait_elapsed: f32,
    timer: f32,
    active: bool,
}

impl EnemyGenerator {
    pub fn flock(tuning: &Tuning) -> Self {
        Self::new(GeneratorKind::Flock, tuning.flock_period, 0.0)
    }

    pub fn corner(tuning: &Tuning, kind: EnemyKind, per_corner: u32) -> Self {
        let kind = GeneratorKind::Corner {
            kind,
            per_corner,
            rounds: 0,
        };
        Self::new(kind, tuning.corner_period, tuning.corner_wait)
    }

    fn new(kind: GeneratorKind, period: f32, wait: f32) -> Self {
        Self {
            kind,
            period,
            wait,
            wait_elapsed: 0.0,
            timer: 0.0,
            active: true,
        }
    }

    pub fn kind(&self) -> &GeneratorKind {
        &self.kind
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Advance the timers and spawn when due; returns the number of enemies staged
    pub fn update(&mut self, dt: f32, manager: &mut EntityManager) -> Result<usize, SimError> {
        if !self.active {
            return Ok(0);
        }
        if self.wait_elapsed < self.wait {
            self.wait_elapsed += dt;
            return Ok(0);
        }
        self.timer += dt;
        if self.timer <= self.period {
            return Ok(0);
        }
        self.timer = 0.0;

        match &mut self.kind {
            GeneratorKind::Flock => manager.spawn_flock(),
            GeneratorKind::Corner {
                kind,
                per_corner,
                rounds,
            } => {
                *rounds += 1;
                if *rounds > *per_corner {
                    log::debug!("Corner generator for {kind:?} finished");
                    self.active = false;
                    return Ok(0);
                }
                manager.spawn_corner_wave(*kind)
            }
        }
    }
}
