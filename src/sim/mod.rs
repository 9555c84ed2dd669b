//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep supplied by the caller
//! - Seeded RNG only
//! - Deferred additions and removals, applied at the start of each tick
//! - No rendering or platform dependencies

pub mod actor;
pub mod animation;
pub mod catalog;
pub mod collision;
pub mod entity_manager;
pub mod generator;
pub mod level;
pub mod player;
pub mod spatial;
pub mod state;
pub mod steering;
pub mod vehicle;

pub use actor::{Actor, ActorPart, Role};
pub use animation::Animation;
pub use catalog::{EnemyKind, Spawner};
pub use collision::{SpritePose, bomb_ring_hits, sprites_collide};
pub use entity_manager::{EntityManager, KillSource, SimEvent, TickReport};
pub use generator::{EnemyGenerator, GeneratorKind};
pub use level::{Level, LevelEvent, LevelMode};
pub use player::{InputFrame, PlayerData, PlayerIntent, PlayerSlot};
pub use spatial::{AgentSnapshot, EntityId, SpatialIndex};
pub use state::{ActorState, StateEvent};
pub use steering::{Behavior, BehaviorKind, Deceleration, SteeringContext, SteeringManager};
pub use vehicle::{MovingEntity, Vehicle};
