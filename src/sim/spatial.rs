//! Neighbor queries for steering
//!
//! Steering behaviors never hold references to other actors. Once per tick
//! the entity manager snapshots every moving agent into a [`SpatialIndex`]
//! and behaviors query it by position or look targets up by [`EntityId`].
//! All coordinates here are reference pixels.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Stable identifier of an actor, unique for the lifetime of an entity manager
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

/// Kinematic state of an agent at the start of a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgentSnapshot {
    pub id: EntityId,
    pub position: Vec2,
    pub velocity: Vec2,
}

impl AgentSnapshot {
    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Uniform-grid hash over agent snapshots
#[derive(Debug, Clone)]
pub struct SpatialIndex {
    cell_size: f32,
    cells: HashMap<(i32, i32), Vec<usize>>,
    agents: Vec<AgentSnapshot>,
    ids: HashMap<EntityId, usize>,
}

impl SpatialIndex {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size: cell_size.max(1.0),
            cells: HashMap::new(),
            agents: Vec::new(),
            ids: HashMap::new(),
        }
    }

    pub fn clear(&mut self) {
        self.cells.clear();
        self.agents.clear();
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn insert(&mut self, agent: AgentSnapshot) {
        let idx = self.agents.len();
        let key = self.cell_key(agent.position);
        self.cells.entry(key).or_default().push(idx);
        self.ids.insert(agent.id, idx);
        self.agents.push(agent);
    }

    pub fn get(&self, id: EntityId) -> Option<&AgentSnapshot> {
        self.ids.get(&id).map(|&idx| &self.agents[idx])
    }

    fn cell_key(&self, p: Vec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    /// Write every agent within `radius` of `position` into `buf`.
    /// `buf` is cleared first.
    pub fn query_into(&self, position: Vec2, radius: f32, buf: &mut Vec<AgentSnapshot>) {
        buf.clear();
        let r = (radius / self.cell_size).ceil() as i32;
        let (cx, cy) = self.cell_key(position);
        let radius_sq = radius * radius;
        for ix in (cx - r)..=(cx + r) {
            for iy in (cy - r)..=(cy + r) {
                if let Some(indices) = self.cells.get(&(ix, iy)) {
                    buf.extend(
                        indices
                            .iter()
                            .map(|&i| self.agents[i])
                            .filter(|a| a.position.distance_squared(position) <= radius_sq),
                    );
                }
            }
        }
        // Cell iteration order is not stable; keep results deterministic
        buf.sort_by_key(|a| a.id);
    }
}
