//! Visual states of an actor
//!
//! Animations only touch presentation: part offsets, colors, scale, and
//! the actor's draw rotation. They never affect movement or collidability.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::actor::ActorPart;
use crate::random_direction;
use crate::renderer::Renderer;

/// Flash blink period for born actors (seconds)
pub const FLASH_INTERVAL: f32 = 0.4;
/// Time per blink period the parts stay hidden (seconds)
const FLASH_HIDDEN: f32 = 0.1;

const SQUEEZE_MIN: f32 = 38.0;
const SQUEEZE_MAX: f32 = 52.0;
/// Squeeze oscillation speed (degrees per second)
const SQUEEZE_RATE: f32 = 10.0;

/// Starting alpha of a dying actor's parts
const FADE_START_ALPHA: f32 = 150.0;
/// Alpha lost per second
const FADE_RATE: f32 = 200.0;
/// Relative outward drift and x-shrink per second
const FADE_SCATTER: f32 = 4.0;
const FADE_JITTER: f32 = 0.05;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Animation {
    /// Parts drawn as they are
    None,
    /// Parts blink on and off
    Flash { interval: f32, elapsed: f32 },
    /// Actor rotates at a constant rate
    Spin { degrees_per_second: f32 },
    /// Rhomb edges breathe between 38 and 52 degrees
    RhombSqueeze { angle: f32, widening: bool },
    /// Parts fly apart, shrink and fade
    FadeOutDead { alpha: f32 },
}

impl Animation {
    pub fn flash() -> Self {
        Animation::Flash {
            interval: FLASH_INTERVAL,
            elapsed: 0.0,
        }
    }

    pub fn spin(degrees_per_second: f32) -> Self {
        Animation::Spin { degrees_per_second }
    }

    pub fn rhomb_squeeze() -> Self {
        Animation::RhombSqueeze {
            angle: 45.0,
            widening: true,
        }
    }

    pub fn fade_out_dead() -> Self {
        Animation::FadeOutDead {
            alpha: FADE_START_ALPHA,
        }
    }

    pub fn update<R: Rng + ?Sized>(&mut self, parts: &mut [ActorPart], rotation: &mut f32, dt: f32, rng: &mut R) {
        match self {
            Animation::None => {}
            Animation::Flash { elapsed, .. } => *elapsed += dt,
            Animation::Spin { degrees_per_second } => *rotation += *degrees_per_second * dt,
            Animation::RhombSqueeze { angle, widening } => {
                if angle.abs() <= SQUEEZE_MIN {
                    *widening = true;
                } else if angle.abs() >= SQUEEZE_MAX {
                    *widening = false;
                }
                let step = angle.signum() * SQUEEZE_RATE * dt;
                *angle += if *widening { step } else { -step };
                for part in parts.iter_mut().filter(|p| p.rotation_offset != 0.0) {
                    part.rotation_offset = part.rotation_offset.signum() * *angle;
                }
            }
            Animation::FadeOutDead { alpha } => {
                *alpha -= FADE_RATE * dt;
                let shown = alpha.clamp(0.0, 255.0) as u8;
                let shrink = (1.0 - FADE_SCATTER * dt).max(0.0);
                for part in parts.iter_mut() {
                    part.color = part.color.with_alpha(shown);
                    let jitter = random_direction(rng) * FADE_JITTER;
                    part.displacement += FADE_SCATTER * dt * (part.displacement + jitter);
                    part.scale.x *= shrink;
                }
            }
        }
    }

    /// Whether parts are drawn this frame
    pub fn visible(&self) -> bool {
        match self {
            Animation::Flash { interval, elapsed } => elapsed % interval < interval - FLASH_HIDDEN,
            _ => true,
        }
    }

    pub fn draw(&self, parts: &[ActorPart], renderer: &mut dyn Renderer) {
        if !self.visible() {
            return;
        }
        for part in parts {
            part.draw(renderer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{AlphaMask, SMALL_RECT};
    use crate::renderer::{Color, CommandBuffer};
    use glam::Vec2;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::sync::Arc;

    fn parts(offsets: &[f32]) -> Vec<ActorPart> {
        let mask = Arc::new(AlphaMask::solid(SMALL_RECT, 50, 5));
        offsets
            .iter()
            .map(|&o| ActorPart::new(mask.clone(), Vec2::new(0.1, 0.0), o, Vec2::splat(0.5), Color::AQUA))
            .collect()
    }

    #[test]
    fn test_flash_blinks() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut anim = Animation::flash();
        let mut rot = 0.0;
        assert!(anim.visible());
        anim.update(&mut [], &mut rot, 0.25, &mut rng);
        assert!(anim.visible());
        anim.update(&mut [], &mut rot, 0.1, &mut rng);
        assert!(!anim.visible());
        anim.update(&mut [], &mut rot, 0.1, &mut rng);
        assert!(anim.visible());
    }

    #[test]
    fn test_hidden_flash_draws_nothing() {
        let anim = Animation::Flash {
            interval: FLASH_INTERVAL,
            elapsed: 0.35,
        };
        let mut buf = CommandBuffer::new();
        anim.draw(&parts(&[45.0]), &mut buf);
        assert_eq!(buf.quad_count(), 0);
        Animation::None.draw(&parts(&[45.0, -45.0]), &mut buf);
        assert_eq!(buf.quad_count(), 2);
    }

    #[test]
    fn test_spin_rotates_actor() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut anim = Animation::spin(600.0);
        let mut rot = 10.0;
        anim.update(&mut [], &mut rot, 0.5, &mut rng);
        assert!((rot - 310.0).abs() < 1e-4);
    }

    #[test]
    fn test_squeeze_stays_in_band_and_keeps_signs() {
        let mut rng = Pcg32::seed_from_u64(0);
        let mut anim = Animation::rhomb_squeeze();
        let mut ps = parts(&[45.0, -45.0]);
        let mut rot = 0.0;
        for _ in 0..600 {
            anim.update(&mut ps, &mut rot, 1.0 / 60.0, &mut rng);
            assert!(ps[0].rotation_offset > 37.0 && ps[0].rotation_offset < 53.0);
            assert_eq!(ps[1].rotation_offset, -ps[0].rotation_offset);
        }
    }

    #[test]
    fn test_fade_out_dead() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut anim = Animation::fade_out_dead();
        let mut ps = parts(&[45.0]);
        let mut rot = 0.0;
        anim.update(&mut ps, &mut rot, 0.125, &mut rng);
        assert_eq!(ps[0].color.a, 125);
        assert!((ps[0].scale.x - 0.25).abs() < 1e-6);
        assert!(ps[0].displacement.length() > 0.1);

        for _ in 0..10 {
            anim.update(&mut ps, &mut rot, 0.125, &mut rng);
        }
        assert_eq!(ps[0].color.a, 0);
        assert!(ps[0].scale.x < 0.01);
    }
}
