//! Geom Clone headless runner
//!
//! Plays a scripted Evolved-mode session at the fixed timestep and logs what
//! happens. Rendering goes to a command buffer that a real frontend would
//! consume.

#[cfg(not(target_arch = "wasm32"))]
fn main() -> Result<(), geom_clone::SimError> {
    use std::path::Path;

    use geom_clone::consts::SIM_DT;
    use geom_clone::renderer::CommandBuffer;
    use geom_clone::sim::{InputFrame, Level, LevelEvent, LevelMode, PlayerIntent, PlayerSlot, SimEvent};
    use geom_clone::{Content, Tuning};
    use glam::Vec2;

    env_logger::init();
    log::info!("Geom Clone (headless) starting...");

    let tuning = match std::env::var("GEOM_CLONE_TUNING") {
        Ok(path) => Tuning::load(Path::new(&path))?,
        Err(_) => Tuning::default(),
    };
    let seed = std::env::var("GEOM_CLONE_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0x5eed);

    let content = Content::builtin();
    let mut level = Level::new(LevelMode::Evolved, tuning, &content, seed)?;
    let mut frame = InputFrame::default();
    let mut commands = CommandBuffer::new();
    let mut kills = 0usize;

    // 60 seconds of play: circle the center while sweeping fire around
    for step in 0..(60 * 60) {
        let t = step as f32 * SIM_DT;
        frame.set(
            PlayerSlot::ONE,
            PlayerIntent {
                move_direction: Vec2::from_angle(t * 0.8),
                shoot_direction: Vec2::from_angle(-t * 2.0),
                wants_bomb: step % 900 == 450,
            },
        );

        let (events, report) = level.update(frame.get(PlayerSlot::ONE), SIM_DT)?;
        kills += report
            .events
            .iter()
            .filter(|e| matches!(e, SimEvent::EnemyKilled { .. }))
            .count();
        for event in &events {
            log::info!("t={t:.2}s {event:?}");
        }
        if events.iter().any(|e| matches!(e, LevelEvent::GameOver { .. })) {
            break;
        }

        commands.clear();
        level.draw(&mut commands);
    }

    let player = level.manager().player();
    if let Some(data) = player.player_data() {
        println!(
            "Score {} (x{}), {} kills, {} lives, {} bombs left",
            data.score, data.multiplier, kills, data.lives, data.bombs
        );
    }
    println!("Last frame: {} quads", commands.quad_count());
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The simulation is a library; a browser frontend drives it directly
}
