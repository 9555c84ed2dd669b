//! Logical actor states
//!
//! The state decides whether an actor moves and whether it can collide.
//! Timed states carry their own elapsed time; [`ActorState::advance`]
//! reports the transitions the owning actor must perform.

use serde::{Deserialize, Serialize};

use super::animation::Animation;
use crate::consts::{BORN_TIMEOUT, DEAD_TIMEOUT};

/// Spin rate of a FastRhomb once it is active (degrees per second)
pub const FAST_RHOMB_SPIN: f32 = 600.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ActorState {
    Normal,
    Born { elapsed: f32 },
    RhombBorn { elapsed: f32 },
    FastRhombBorn { elapsed: f32 },
    PlayerBorn { elapsed: f32 },
    EnemyDead { elapsed: f32, expired: bool },
    FastRhombDead { elapsed: f32, expired: bool },
    PlayerDead,
}

/// Transition requested by [`ActorState::advance`]
#[derive(Debug, Clone, PartialEq)]
pub enum StateEvent {
    None,
    /// Born phase is over: switch to Normal with this animation
    Matured(Animation),
    /// Dead enemy timed out: stage its removal
    Expired,
}

impl ActorState {
    pub fn born() -> Self {
        ActorState::Born { elapsed: 0.0 }
    }

    pub fn rhomb_born() -> Self {
        ActorState::RhombBorn { elapsed: 0.0 }
    }

    pub fn fast_rhomb_born() -> Self {
        ActorState::FastRhombBorn { elapsed: 0.0 }
    }

    pub fn player_born() -> Self {
        ActorState::PlayerBorn { elapsed: 0.0 }
    }

    pub fn enemy_dead() -> Self {
        ActorState::EnemyDead {
            elapsed: 0.0,
            expired: false,
        }
    }

    pub fn fast_rhomb_dead() -> Self {
        ActorState::FastRhombDead {
            elapsed: 0.0,
            expired: false,
        }
    }

    /// Only active actors take part in collisions
    pub fn collidable(&self) -> bool {
        matches!(self, ActorState::Normal)
    }

    /// Whether the actor's position is integrated in this state
    pub fn moves(&self) -> bool {
        matches!(
            self,
            ActorState::Normal
                | ActorState::PlayerBorn { .. }
                | ActorState::EnemyDead { .. }
                | ActorState::FastRhombDead { .. }
        )
    }

    pub fn is_born(&self) -> bool {
        matches!(
            self,
            ActorState::Born { .. }
                | ActorState::RhombBorn { .. }
                | ActorState::FastRhombBorn { .. }
                | ActorState::PlayerBorn { .. }
        )
    }

    pub fn is_dead(&self) -> bool {
        matches!(
            self,
            ActorState::EnemyDead { .. } | ActorState::FastRhombDead { .. } | ActorState::PlayerDead
        )
    }

    /// Animation installed when entering this state
    pub fn entry_animation(&self) -> Animation {
        match self {
            ActorState::Normal => Animation::None,
            ActorState::Born { .. }
            | ActorState::RhombBorn { .. }
            | ActorState::FastRhombBorn { .. }
            | ActorState::PlayerBorn { .. } => Animation::flash(),
            ActorState::EnemyDead { .. } | ActorState::FastRhombDead { .. } | ActorState::PlayerDead => {
                Animation::fade_out_dead()
            }
        }
    }

    /// Advance timers by `dt` seconds
    pub fn advance(&mut self, dt: f32) -> StateEvent {
        match self {
            ActorState::Born { elapsed } | ActorState::PlayerBorn { elapsed } => {
                *elapsed += dt;
                if *elapsed >= BORN_TIMEOUT {
                    return StateEvent::Matured(Animation::None);
                }
            }
            ActorState::RhombBorn { elapsed } => {
                *elapsed += dt;
                if *elapsed >= BORN_TIMEOUT {
                    return StateEvent::Matured(Animation::rhomb_squeeze());
                }
            }
            ActorState::FastRhombBorn { elapsed } => {
                *elapsed += dt;
                if *elapsed >= BORN_TIMEOUT {
                    return StateEvent::Matured(Animation::spin(FAST_RHOMB_SPIN));
                }
            }
            ActorState::EnemyDead { elapsed, expired } | ActorState::FastRhombDead { elapsed, expired } => {
                *elapsed += dt;
                if *elapsed >= DEAD_TIMEOUT && !*expired {
                    *expired = true;
                    return StateEvent::Expired;
                }
            }
            ActorState::Normal | ActorState::PlayerDead => {}
        }
        StateEvent::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_born_matures_at_timeout_not_before() {
        let mut state = ActorState::born();
        for _ in 0..5 {
            assert_eq!(state.advance(0.25), StateEvent::None);
            assert!(!state.collidable());
        }
        // 1.5 s exactly
        assert_eq!(state.advance(0.25), StateEvent::Matured(Animation::None));
    }

    #[test]
    fn test_born_follow_up_animations() {
        let mut rhomb = ActorState::rhomb_born();
        assert_eq!(rhomb.advance(2.0), StateEvent::Matured(Animation::rhomb_squeeze()));
        let mut fast = ActorState::fast_rhomb_born();
        assert_eq!(fast.advance(2.0), StateEvent::Matured(Animation::spin(600.0)));
    }

    #[test]
    fn test_dead_expires_exactly_once() {
        let mut state = ActorState::enemy_dead();
        assert!(state.moves());
        assert!(!state.collidable());
        assert_eq!(state.advance(1.0), StateEvent::None);
        assert_eq!(state.advance(0.5), StateEvent::Expired);
        assert_eq!(state.advance(0.5), StateEvent::None);
        assert_eq!(state.advance(10.0), StateEvent::None);
    }

    #[test]
    fn test_movement_and_collision_flags() {
        assert!(ActorState::Normal.collidable());
        assert!(ActorState::Normal.moves());
        assert!(ActorState::player_born().moves());
        assert!(!ActorState::rhomb_born().moves());
        assert!(!ActorState::PlayerDead.moves());
        assert!(!ActorState::PlayerDead.collidable());
        assert!(matches!(ActorState::PlayerDead.entry_animation(), Animation::FadeOutDead { .. }));
        assert!(matches!(ActorState::born().entry_animation(), Animation::Flash { .. }));
    }
}
