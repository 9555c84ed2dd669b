//! End-to-end gameplay scenarios

use geom_clone::consts::SIM_DT;
use geom_clone::sim::{
    ActorState, EnemyKind, EntityManager, KillSource, Level, LevelEvent, LevelMode, PlayerIntent, SimEvent,
};
use geom_clone::{Content, Tuning};
use glam::Vec2;

fn manager(seed: u64) -> EntityManager {
    EntityManager::new(Tuning::default(), &Content::builtin(), seed).unwrap()
}

fn idle() -> PlayerIntent {
    PlayerIntent::default()
}

#[test]
fn pursuing_rhomb_closes_in_and_kills_once() {
    let mut level = Level::new(LevelMode::Sandbox, Tuning::default(), &Content::builtin(), 1).unwrap();
    while *level.manager().player().state() != ActorState::Normal {
        level.update(&idle(), SIM_DT).unwrap();
    }
    let target = level.manager().player().position;
    let id = level
        .manager_mut()
        .spawn_active_enemy(EnemyKind::Rhomb, Vec2::new(0.8, 0.5))
        .unwrap();

    let mut last = f32::INFINITY;
    let mut deaths = 0;
    for _ in 0..(5.0 / SIM_DT) as usize {
        let (events, _) = level.update(&idle(), SIM_DT).unwrap();
        let died = events.iter().any(|e| matches!(e, LevelEvent::PlayerDied { .. }));
        if deaths == 0 {
            let rhomb = level.manager().enemy(id).unwrap();
            let distance = rhomb.position.distance(target);
            assert!(distance < last, "Rhomb stopped closing in: {distance} >= {last}");
            last = distance;
        }
        if died {
            deaths += 1;
        }
    }
    assert_eq!(deaths, 1);
    assert!(level.player_alive());
    assert_eq!(level.manager().player().player_data().unwrap().lives, 2);
}

#[test]
fn bullet_kills_enemy_ahead() {
    let mut m = manager(2);
    let id = m.spawn_active_enemy(EnemyKind::Rhomb, Vec2::new(0.7, 0.5)).unwrap();
    m.tick(&idle(), SIM_DT).unwrap();

    let fire = PlayerIntent {
        shoot_direction: Vec2::X,
        ..Default::default()
    };
    m.tick(&fire, SIM_DT).unwrap();
    assert_eq!(m.bullets().len(), 5);

    let mut kill = None;
    for _ in 0..120 {
        let report = m.tick(&idle(), SIM_DT).unwrap();
        kill = report.events.into_iter().find_map(|e| match e {
            SimEvent::EnemyKilled { id: k, points, source, .. } if k == id => Some((points, source)),
            _ => None,
        });
        if kill.is_some() {
            break;
        }
    }
    let (points, source) = kill.expect("no bullet reached the Rhomb");
    let KillSource::Bullet(bullet) = source else {
        panic!("killed by {source:?}");
    };
    assert!(m.pending_bullet_removals().contains(&bullet));
    assert_eq!(points, 50);
    assert_eq!(m.player().player_data().unwrap().score, 50);
    assert!(!m.enemy(id).unwrap().collidable());
}

#[test]
fn thirteen_removals_raise_multiplier_once() {
    let mut m = manager(3);
    let ids: Vec<_> = (0..13)
        .map(|i| m.spawn_enemy(EnemyKind::Rhomb, Vec2::new(0.1 + i as f32 * 0.06, 0.2)).unwrap())
        .collect();
    m.tick(&idle(), SIM_DT).unwrap();
    for id in ids {
        assert!(m.remove_enemy(id));
    }
    let report = m.tick(&idle(), SIM_DT).unwrap();

    assert_eq!(report.events, vec![SimEvent::MultiplierRaised(2)]);
    assert_eq!(m.player().player_data().unwrap().multiplier, 2);
    assert_eq!(m.kill_tally(), 3);
}

#[test]
fn fast_rhomb_splits_into_three() {
    let mut m = manager(4);
    let id = m.spawn_active_enemy(EnemyKind::FastRhomb, Vec2::new(0.3, 0.7)).unwrap();
    m.tick(&idle(), SIM_DT).unwrap();

    let origin = m.enemy(id).unwrap().position;
    assert!(m.kill_enemy(id, Vec2::Y).unwrap());

    let children = m.pending_additions();
    assert_eq!(children.len(), 3);
    for child in children {
        assert_eq!(child.enemy_kind(), Some(EnemyKind::FastSmallRhomb));
        assert!(child.position.distance(origin) <= 0.1 + 1e-5);
        assert!(child.collidable());
    }

    m.tick(&idle(), SIM_DT).unwrap();
    assert_eq!(m.enemies().len(), 4);
    assert!(m.pending_additions().is_empty());
}
