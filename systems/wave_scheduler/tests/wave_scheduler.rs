use std::time::Duration;

use pawn_defence_core::{Command, Event, Grade, WaveConfig};
use pawn_defence_system_wave_scheduler::{compose_wave, WaveScheduler};

fn advance(scheduler: &mut WaveScheduler, millis: u64, live_enemies: usize) -> Vec<Command> {
    let mut commands = Vec::new();
    scheduler.handle(
        &[Event::TimeAdvanced {
            dt: Duration::from_millis(millis),
        }],
        live_enemies,
        &mut commands,
    );
    commands
}

fn spawned_grades(commands: &[Command]) -> Vec<Grade> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnEnemy { grade, .. } => Some(*grade),
            _ => None,
        })
        .collect()
}

#[test]
fn boss_waves_alternate_queen_and_king() {
    let config = WaveConfig::default();
    let queen: Vec<_> = compose_wave(20, &config).into_iter().collect();
    let king: Vec<_> = compose_wave(40, &config).into_iter().collect();
    let queen_again: Vec<_> = compose_wave(60, &config).into_iter().collect();

    assert_eq!(queen, vec![(Grade::QUEEN, 1)]);
    assert_eq!(king, vec![(Grade::KING, 1)]);
    assert_eq!(queen_again, vec![(Grade::QUEEN, 1)]);
}

#[test]
fn non_boss_waves_never_contain_queens_or_kings() {
    let config = WaveConfig::default();
    for wave in (1..=120).filter(|wave| wave % 20 != 0) {
        let composition = compose_wave(wave, &config);
        assert!(!composition.is_empty(), "wave {wave} is empty");
        assert!(
            composition.keys().all(|grade| *grade < Grade::QUEEN),
            "wave {wave} contains a boss grade"
        );
    }
}

#[test]
fn first_spawn_is_immediate_and_the_rest_follow_the_interval() {
    let mut scheduler = WaveScheduler::new(WaveConfig::default(), 11, 2);

    let opening = advance(&mut scheduler, 100, 0);
    assert_eq!(opening.first(), Some(&Command::BeginWave { wave: 1, boss: false }));
    assert_eq!(spawned_grades(&opening), vec![Grade::PAWN]);

    let rest = advance(&mut scheduler, 1_500, 1);
    assert_eq!(spawned_grades(&rest), vec![Grade::PAWN; 3]);
    assert!(rest.iter().all(|command| match command {
        Command::SpawnEnemy {
            spawn_point, wave, ..
        } => *spawn_point < 2 && *wave == 1,
        _ => true,
    }));
    assert!(!rest
        .iter()
        .any(|command| matches!(command, Command::AwardGold { .. })));
}

#[test]
fn cleared_wave_pays_reward_and_starts_the_next_one() {
    let mut scheduler = WaveScheduler::new(WaveConfig::default(), 11, 2);
    let _ = advance(&mut scheduler, 100, 0);
    let _ = advance(&mut scheduler, 2_000, 4);

    let commands = advance(&mut scheduler, 200, 0);
    let reward = commands
        .iter()
        .position(|command| *command == Command::AwardGold { amount: 20 })
        .expect("reward granted");
    let next = commands
        .iter()
        .position(|command| *command == Command::BeginWave { wave: 2, boss: false })
        .expect("next wave started");
    assert!(reward < next);
    assert_eq!(scheduler.wave(), 2);
}

#[test]
fn wave_times_out_while_enemies_survive() {
    let mut scheduler = WaveScheduler::new(WaveConfig::default(), 3, 1);
    let mut elapsed = Duration::ZERO;
    let mut rewarded_at = None;

    for _ in 0..200 {
        elapsed += Duration::from_millis(100);
        let commands = advance(&mut scheduler, 100, 5);
        if commands
            .iter()
            .any(|command| matches!(command, Command::AwardGold { .. }))
        {
            rewarded_at = Some(elapsed);
            break;
        }
    }

    let rewarded_at = rewarded_at.expect("wave timed out");
    assert!(rewarded_at >= Duration::from_millis(11_900), "{rewarded_at:?}");
    assert!(rewarded_at <= Duration::from_millis(12_300), "{rewarded_at:?}");
}

#[test]
fn boss_wave_reports_and_hides_its_timer() {
    let config = WaveConfig {
        boss_every: 1,
        ..WaveConfig::default()
    };
    let mut scheduler = WaveScheduler::new(config, 5, 1);

    let opening = advance(&mut scheduler, 100, 0);
    assert_eq!(opening.first(), Some(&Command::BeginWave { wave: 1, boss: true }));
    assert_eq!(spawned_grades(&opening), vec![Grade::QUEEN]);

    let waiting = advance(&mut scheduler, 1_000, 1);
    let remaining: Vec<Duration> = waiting
        .iter()
        .filter_map(|command| match command {
            Command::ReportBossTimer { remaining } => *remaining,
            _ => None,
        })
        .collect();
    assert!(!remaining.is_empty());
    assert!(remaining.iter().all(|left| *left <= Duration::from_secs(30)));
    assert!(remaining.windows(2).all(|pair| pair[1] < pair[0]));

    let cleared = advance(&mut scheduler, 200, 0);
    assert!(cleared.contains(&Command::ReportBossTimer { remaining: None }));
    assert!(cleared.contains(&Command::AwardGold { amount: 20 }));
}

#[test]
fn spawn_order_is_deterministic_per_seed() {
    let run = |seed| {
        let mut scheduler = WaveScheduler::new(WaveConfig::default(), seed, 2);
        let mut commands = Vec::new();
        for _ in 0..400 {
            commands.extend(advance(&mut scheduler, 100, 0));
        }
        commands
    };

    assert_eq!(run(42), run(42));
}

#[test]
fn restart_returns_to_the_first_wave() {
    let mut scheduler = WaveScheduler::new(WaveConfig::default(), 1, 1);
    for _ in 0..50 {
        let _ = advance(&mut scheduler, 100, 0);
    }
    assert!(scheduler.wave() > 1);

    let mut commands = Vec::new();
    scheduler.handle(
        &[
            Event::Restarted,
            Event::TimeAdvanced {
                dt: Duration::from_millis(100),
            },
        ],
        0,
        &mut commands,
    );
    assert_eq!(commands.first(), Some(&Command::BeginWave { wave: 1, boss: false }));
}
