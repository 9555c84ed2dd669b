//! Entity manager: owns every actor and runs one simulation tick
//!
//! Additions and removals requested during a tick are staged and applied at
//! the start of the next one, so no collection is mutated while it is being
//! iterated. Tick order:
//! 1. count staged enemy removals toward the score multiplier
//! 2. update the player (movement, volleys, bombs)
//! 3. apply staged removals and additions
//! 4. bombs against enemies
//! 5. bullets against enemies, one hit per bullet
//! 6. enemies, then the player hit test

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::Serialize;

use super::actor::{Actor, Role};
use super::catalog::{EnemyKind, Spawner};
use super::player::PlayerIntent;
use super::spatial::{AgentSnapshot, EntityId, SpatialIndex};
use super::state::StateEvent;
use super::steering::SteeringContext;
use crate::content::Content;
use crate::error::SimError;
use crate::renderer::Renderer;
use crate::tuning::Tuning;

/// What killed an enemy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KillSource {
    Bullet(EntityId),
    Bomb(EntityId),
    /// Killed from outside the tick through [`EntityManager::kill_enemy`]
    Scripted,
}

/// Gameplay events raised during one tick
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum SimEvent {
    EnemyKilled {
        id: EntityId,
        kind: EnemyKind,
        /// Points awarded after the multiplier
        points: u64,
        source: KillSource,
    },
    /// New multiplier value
    MultiplierRaised(u64),
    BombDetonated(EntityId),
    PlayerHit,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TickReport {
    pub events: Vec<SimEvent>,
    /// At least one active enemy touched the player this tick
    pub player_hit: bool,
}

pub struct EntityManager {
    player: Actor,
    enemies: Vec<Actor>,
    bullets: Vec<Actor>,
    bombs: Vec<Actor>,

    enemies_to_add: Vec<Actor>,
    enemies_to_remove: Vec<EntityId>,
    bullets_to_remove: Vec<EntityId>,
    bombs_to_remove: Vec<EntityId>,
    /// Removed enemies not yet converted into a multiplier step
    kill_tally: u32,

    spawner: Spawner,
    rng: Pcg32,
    index: SpatialIndex,
    threats: Vec<AgentSnapshot>,
}

impl EntityManager {
    pub fn new(tuning: Tuning, content: &Content, seed: u64) -> Result<Self, SimError> {
        let cell_size = tuning.separation_radius;
        let mut spawner = Spawner::new(tuning, content)?;
        let player = spawner.player();
        Ok(Self {
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            bombs: Vec::new(),
            enemies_to_add: Vec::new(),
            enemies_to_remove: Vec::new(),
            bullets_to_remove: Vec::new(),
            bombs_to_remove: Vec::new(),
            kill_tally: 0,
            spawner,
            rng: Pcg32::seed_from_u64(seed),
            index: SpatialIndex::new(cell_size),
            threats: Vec::new(),
        })
    }

    // === Accessors ===

    pub fn player(&self) -> &Actor {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Actor {
        &mut self.player
    }

    pub fn enemies(&self) -> &[Actor] {
        &self.enemies
    }

    pub fn bullets(&self) -> &[Actor] {
        &self.bullets
    }

    pub fn bombs(&self) -> &[Actor] {
        &self.bombs
    }

    pub fn enemy(&self, id: EntityId) -> Option<&Actor> {
        self.enemies.iter().find(|e| e.id == id)
    }

    /// Enemies staged for the next tick
    pub fn pending_additions(&self) -> &[Actor] {
        &self.enemies_to_add
    }

    pub fn pending_enemy_removals(&self) -> &[EntityId] {
        &self.enemies_to_remove
    }

    pub fn pending_bullet_removals(&self) -> &[EntityId] {
        &self.bullets_to_remove
    }

    pub fn kill_tally(&self) -> u32 {
        self.kill_tally
    }

    pub fn tuning(&self) -> &Tuning {
        self.spawner.tuning()
    }

    // === Staging ===

    /// Stage an enemy for the next tick
    pub fn stage_enemy(&mut self, enemy: Actor) {
        log::debug!("Staged {:?} {:?} at {}", enemy.enemy_kind(), enemy.id, enemy.position);
        self.enemies_to_add.push(enemy);
    }

    /// Stage a new enemy of `kind` chasing the player
    pub fn spawn_enemy(&mut self, kind: EnemyKind, position: Vec2) -> Result<EntityId, SimError> {
        let enemy = self.spawner.enemy(kind, position, self.player.id, &mut self.rng)?;
        let id = enemy.id;
        self.stage_enemy(enemy);
        Ok(id)
    }

    /// Like [`EntityManager::spawn_enemy`], skipping the born phase
    pub fn spawn_active_enemy(&mut self, kind: EnemyKind, position: Vec2) -> Result<EntityId, SimError> {
        let mut enemy = self.spawner.enemy(kind, position, self.player.id, &mut self.rng)?;
        enemy.activate();
        let id = enemy.id;
        self.stage_enemy(enemy);
        Ok(id)
    }

    /// Stage a flock of Rhombs around a random point; returns the flock size
    pub fn spawn_flock(&mut self) -> Result<usize, SimError> {
        let size = self.spawner.tuning().flock_size;
        let flock = self.spawner.flock(size, self.player.id, &mut self.rng)?;
        let count = flock.len();
        self.enemies_to_add.extend(flock);
        log::debug!("Staged flock of {count}");
        Ok(count)
    }

    /// Stage one active enemy of `kind` at every screen corner
    pub fn spawn_corner_wave(&mut self, kind: EnemyKind) -> Result<usize, SimError> {
        let wave = self.spawner.corner_wave(kind, self.player.id, &mut self.rng)?;
        let count = wave.len();
        self.enemies_to_add.extend(wave);
        log::debug!("Staged corner wave of {kind:?}");
        Ok(count)
    }

    /// Stage an enemy removal. Unknown or already staged ids are ignored.
    pub fn remove_enemy(&mut self, id: EntityId) -> bool {
        if self.enemies_to_remove.contains(&id) || !self.enemies.iter().any(|e| e.id == id) {
            return false;
        }
        self.enemies_to_remove.push(id);
        true
    }

    /// Kill an active enemy outside the collision passes.
    ///
    /// Returns false if the enemy is unknown or not collidable.
    pub fn kill_enemy(&mut self, id: EntityId, impulse: Vec2) -> Result<bool, SimError> {
        let Some(index) = self.enemies.iter().position(|e| e.id == id) else {
            return Ok(false);
        };
        let mut events = Vec::new();
        self.kill_at(index, impulse, KillSource::Scripted, &mut events)
    }

    // === Player lifecycle ===

    /// Every enemy stops chasing
    pub fn on_player_dead(&mut self) {
        for enemy in self.enemies.iter_mut().chain(self.enemies_to_add.iter_mut()) {
            enemy.freeze();
        }
    }

    /// Clear the field before the player comes back. Staged removals stay
    /// so they still count toward the multiplier.
    pub fn on_player_alive(&mut self) {
        log::debug!("Clearing {} enemies and {} bullets", self.enemies.len(), self.bullets.len());
        self.enemies.clear();
        self.enemies_to_add.clear();
        self.bullets.clear();
        self.bullets_to_remove.clear();
    }

    /// Rebuild the player ship and restart its born phase
    pub fn respawn_player(&mut self) {
        let parts = self.spawner.player_parts();
        self.player.respawn(parts);
    }

    // === Tick ===

    pub fn tick(&mut self, intent: &PlayerIntent, dt: f32) -> Result<TickReport, SimError> {
        let mut report = TickReport::default();

        self.count_removals(&mut report.events);
        self.update_player(intent, dt, &mut report.events);
        self.apply_staged();
        self.update_bombs(dt, &mut report.events)?;
        self.update_bullets(dt, &mut report.events)?;

        report.player_hit = self.update_enemies(dt);
        if report.player_hit {
            report.events.push(SimEvent::PlayerHit);
        }
        Ok(report)
    }

    fn count_removals(&mut self, events: &mut Vec<SimEvent>) {
        self.kill_tally += self.enemies_to_remove.len() as u32;
        let per_step = self.spawner.tuning().kills_per_multiplier.max(1);
        while self.kill_tally >= per_step {
            self.kill_tally -= per_step;
            if let Some(data) = self.player.player_data_mut() {
                data.multiplier += 1;
                log::debug!("Multiplier raised to {}", data.multiplier);
                events.push(SimEvent::MultiplierRaised(data.multiplier));
            }
        }
    }

    fn update_player(&mut self, intent: &PlayerIntent, dt: f32, events: &mut Vec<SimEvent>) {
        if let Some(data) = self.player.player_data_mut() {
            data.intent = *intent;
        }
        let ctx = SteeringContext {
            dt,
            player: None,
            neighbors: &self.index,
            threats: &[],
        };
        self.player.update(&ctx, &mut self.rng);

        if self.player.state().is_dead() {
            return;
        }
        let interval = self.spawner.tuning().shot_interval;
        let Some(data) = self.player.player_data_mut() else {
            return;
        };
        let volley = data.trigger(dt, interval);
        let bomb = data.use_bomb();
        let position = self.player.position;

        if let Some(direction) = volley {
            self.bullets.extend(self.spawner.volley(position, direction));
        }
        if bomb {
            let bomb = self.spawner.bomb(position);
            log::debug!("Bomb {:?} at {}", bomb.id, position);
            events.push(SimEvent::BombDetonated(bomb.id));
            self.bombs.push(bomb);
        }
    }

    fn apply_staged(&mut self) {
        if !self.enemies_to_remove.is_empty() {
            let gone = &self.enemies_to_remove;
            self.enemies.retain(|e| !gone.contains(&e.id));
            self.enemies_to_remove.clear();
        }
        if !self.bullets_to_remove.is_empty() {
            let gone = &self.bullets_to_remove;
            self.bullets.retain(|b| !gone.contains(&b.id));
            self.bullets_to_remove.clear();
        }
        if !self.bombs_to_remove.is_empty() {
            let gone = &self.bombs_to_remove;
            self.bombs.retain(|b| !gone.contains(&b.id));
            self.bombs_to_remove.clear();
        }
        self.enemies.append(&mut self.enemies_to_add);
    }

    fn update_bombs(&mut self, dt: f32, events: &mut Vec<SimEvent>) -> Result<(), SimError> {
        let mut hits = Vec::new();
        for bomb in &mut self.bombs {
            let ctx = SteeringContext {
                dt,
                player: None,
                neighbors: &self.index,
                threats: &[],
            };
            if bomb.update(&ctx, &mut self.rng) == StateEvent::Expired {
                self.bombs_to_remove.push(bomb.id);
                continue;
            }
            for (i, enemy) in self.enemies.iter().enumerate() {
                if enemy.collidable() && bomb.bomb_hits(enemy) {
                    hits.push((i, bomb.id, enemy.position - bomb.position));
                }
            }
        }
        for (i, bomb_id, impulse) in hits {
            self.kill_at(i, impulse, KillSource::Bomb(bomb_id), events)?;
        }
        Ok(())
    }

    fn update_bullets(&mut self, dt: f32, events: &mut Vec<SimEvent>) -> Result<(), SimError> {
        for i in 0..self.bullets.len() {
            let ctx = SteeringContext {
                dt,
                player: None,
                neighbors: &self.index,
                threats: &[],
            };
            let bullet = &mut self.bullets[i];
            bullet.update(&ctx, &mut self.rng);
            if bullet.is_out_of_bounds() {
                self.bullets_to_remove.push(bullet.id);
                continue;
            }
            let Some(target) = self.enemies.iter().position(|e| bullet.collides_with(e)) else {
                continue;
            };
            let (bullet_id, impulse) = (bullet.id, bullet.velocity().normalize_or_zero());
            self.bullets_to_remove.push(bullet_id);
            self.kill_at(target, impulse, KillSource::Bullet(bullet_id), events)?;
        }
        Ok(())
    }

    /// Returns true if any enemy touched the player
    fn update_enemies(&mut self, dt: f32) -> bool {
        self.index.clear();
        for enemy in &self.enemies {
            self.index.insert(enemy.snapshot());
        }
        self.threats.clear();
        self.threats.extend(self.bullets.iter().map(Actor::snapshot));

        let ctx = SteeringContext {
            dt,
            player: (!self.player.state().is_dead()).then(|| self.player.snapshot()),
            neighbors: &self.index,
            threats: &self.threats,
        };
        let mut player_hit = false;
        for enemy in &mut self.enemies {
            if enemy.update(&ctx, &mut self.rng) == StateEvent::Expired {
                self.enemies_to_remove.push(enemy.id);
                continue;
            }
            if !player_hit && self.player.collides_with(enemy) {
                player_hit = true;
            }
        }
        player_hit
    }

    /// Kill the enemy at `index`, stage split children and award points
    fn kill_at(
        &mut self,
        index: usize,
        impulse: Vec2,
        source: KillSource,
        events: &mut Vec<SimEvent>,
    ) -> Result<bool, SimError> {
        let enemy = &mut self.enemies[index];
        let data = match &enemy.role {
            Role::Enemy(data) if enemy.collidable() => *data,
            _ => return Ok(false),
        };
        let splits = enemy.die(impulse);
        let (id, position) = (enemy.id, enemy.position);

        if splits {
            let children = self.spawner.split(position, &mut self.rng)?;
            self.enemies_to_add.extend(children);
        }
        let points = self.player.player_data_mut().map_or(0, |p| p.add_to_score(data.points));
        log::debug!("{:?} {id:?} killed by {source:?} for {points}", data.kind);
        events.push(SimEvent::EnemyKilled {
            id,
            kind: data.kind,
            points,
            source,
        });
        Ok(true)
    }

    // === Drawing ===

    pub fn draw(&self, renderer: &mut dyn Renderer) {
        for enemy in &self.enemies {
            enemy.draw(renderer);
        }
        for bullet in &self.bullets {
            bullet.draw(renderer);
        }
        self.player.draw(renderer);
        self.player.draw_hud(renderer);
    }
}
