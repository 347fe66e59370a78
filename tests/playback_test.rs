use match_replay::*;

fn player(id: &str, role: Role, starting: bool) -> PlayerInfo {
    PlayerInfo {
        id: EntityId::from(id),
        name: id.to_string(),
        jersey: None,
        role,
        starting,
        base: None,
    }
}

fn match_data(events: Vec<MatchEvent>) -> MatchData {
    MatchData {
        roster: Roster {
            home: TeamInfo {
                id: TeamId::from("home"),
                name: "Home".to_string(),
                players: vec![
                    player("h1", Role::Goalkeeper, true),
                    player("h2", Role::Defender, true),
                    player("h3", Role::Forward, true),
                    player("h-bench", Role::Forward, false),
                ],
            },
            away: TeamInfo {
                id: TeamId::from("away"),
                name: "Away".to_string(),
                players: vec![
                    player("a1", Role::Goalkeeper, true),
                    player("a2", Role::Midfielder, true),
                ],
            },
        },
        events,
    }
}

fn goal_match() -> MatchData {
    match_data(vec![
        MatchEvent::new(10.0, 1, EventKind::KickOff)
            .with_team("home")
            .with_player("h3")
            .with_coordinates(60.0, 40.0),
        MatchEvent::new(300.0, 1, EventKind::Pass)
            .with_team("away")
            .with_player("a2")
            .with_coordinates(50.0, 30.0),
        MatchEvent::new(600.0, 1, EventKind::Shot)
            .with_team("home")
            .with_player("h3")
            .with_coordinates(108.0, 40.0)
            .with_result(EventResult::Goal),
        MatchEvent::new(900.0, 1, EventKind::Substitution)
            .with_team("home")
            .with_player("h3")
            .with_replacement("h-bench"),
        MatchEvent::new(1200.0, 1, EventKind::Carry)
            .with_team("home")
            .with_player("h-bench")
            .with_coordinates(80.0, 20.0),
    ])
}

fn new_processor(data: &MatchData) -> MatchProcessor {
    MatchProcessor::new(data, ReplayConfig::default()).unwrap()
}

#[test]
fn test_kickoff_state() {
    let processor = new_processor(&goal_match());
    let world = processor.world();
    assert_eq!(world.tracked_count(), 5);
    assert_eq!((world.score_home, world.score_away), (0, 0));
    assert_eq!(world.possession_side, Some(TeamSide::Home));
    assert_eq!(world.ball.position, Point::new(60.0, 40.0));
    assert!(!world.players.contains_key(&EntityId::from("h-bench")));
    assert_eq!(processor.mirror().positions().nrows(), 6);
}

#[test]
fn test_seek_restores_score_in_both_directions() {
    let mut processor = new_processor(&goal_match());

    processor.seek_to(700.0);
    assert_eq!(processor.world().score_home, 1);
    assert_eq!(processor.mirror().home_score(), 1);

    processor.seek_to(500.0);
    assert_eq!(processor.world().score_home, 0);
    assert_eq!(processor.world().possession_side, Some(TeamSide::Away));
    assert_eq!(processor.current_time(), 500.0);
}

#[test]
fn test_seek_is_idempotent_under_zero_tick() {
    let mut processor = new_processor(&goal_match());
    processor.seek_to(650.0);
    let world = processor.world().clone();
    let positions = processor.mirror().positions().to_owned();

    processor.tick(0.0);
    assert_eq!(processor.world(), &world);
    assert_eq!(processor.mirror().positions(), positions);
    assert!(processor.mirror().velocities().iter().all(|v| *v == 0.0));
}

#[test]
fn test_ticking_matches_seeking() {
    let data = goal_match();
    let mut ticked = new_processor(&data);
    ticked.set_speed(10.0);
    while ticked.current_time() < 1000.0 {
        ticked.tick(0.5);
    }

    let mut seeked = new_processor(&data);
    seeked.seek_to(ticked.current_time());

    assert_eq!(ticked.world(), seeked.world());
    assert_eq!(ticked.last_event(), seeked.last_event());
}

#[test]
fn test_ticking_across_substitution_keeps_mirror_shape() {
    let data = goal_match();
    let mut ticked = new_processor(&data);
    ticked.seek_to(880.0);
    let before = ticked.mirror().num_players();

    while ticked.current_time() < 920.0 {
        ticked.tick(1.0);
        let world = ticked.world();
        let mirror = ticked.mirror();
        assert_eq!(mirror.positions().nrows(), world.tracked_count() + 1);
        assert_eq!(mirror.velocities().nrows(), world.tracked_count() + 1);
        assert_eq!(mirror.num_players(), world.tracked_count());
        assert_eq!(mirror.ball_position(), world.ball.position);
    }
    assert_eq!(ticked.mirror().num_players(), before + 1);
    assert_eq!(
        ticked.mirror().index_of(&EntityId::from("h-bench")),
        Some(before)
    );

    let mut seeked = new_processor(&data);
    seeked.seek_to(ticked.current_time());
    assert_eq!(seeked.mirror().entity_order(), ticked.mirror().entity_order());
    assert_eq!(seeked.mirror().to_vector(false), ticked.mirror().to_vector(false));
}

#[test]
fn test_slow_ticks_late_in_extra_time_advance_the_clock() {
    let mut data = goal_match();
    data.events.push(
        MatchEvent::new(900.0, 4, EventKind::Pass)
            .with_team("away")
            .with_player("a2")
            .with_coordinates(40.0, 40.0),
    );
    let mut processor = new_processor(&data);
    assert_eq!(processor.end_time(), 7200.0);

    processor.seek_to(7000.0);
    processor.set_speed(0.1);
    for _ in 0..600 {
        processor.tick(1.0 / 60.0);
    }
    let advanced = processor.current_time() - 7000.0;
    assert!((advanced - 1.0).abs() < 1e-6, "advanced {}", advanced);
    assert!(!processor.is_finished());
}

#[test]
fn test_invalid_config_is_rejected() {
    let result = ReplayConfig::from_json_str(r#"{"playback": {"min_speed": 5.0, "max_speed": 1.0}}"#);
    assert!(matches!(
        result.map_err(|e| e.variant),
        Err(MatchReplayErrorVariant::InvalidConfig { .. })
    ));

    let mut config = ReplayConfig::default();
    config.pitch.width = f32::NAN;
    let result = MatchProcessor::new(&goal_match(), config);
    assert!(matches!(
        result.map_err(|e| e.variant),
        Err(MatchReplayErrorVariant::InvalidConfig { .. })
    ));
}

#[test]
fn test_substitution_grows_mirror() {
    let mut processor = new_processor(&goal_match());
    processor.seek_to(950.0);

    let world = processor.world();
    assert_eq!(world.tracked_count(), 6);
    assert!(!world.players[&EntityId::from("h3")].active);
    assert!(world.players[&EntityId::from("h-bench")].active);

    let mirror = processor.mirror();
    assert_eq!(mirror.num_players(), 6);
    assert_eq!(mirror.positions().nrows(), world.tracked_count() + 1);
    assert_eq!(mirror.ball_index(), 6);
    assert_eq!(mirror.ball_position(), world.ball.position);
}

#[test]
fn test_ball_carrier_follows_events() {
    let mut processor = new_processor(&goal_match());
    processor.seek_to(350.0);
    let carrier = processor.world().ball_carrier().unwrap();
    assert_eq!(carrier.id, EntityId::from("a2"));
    assert_eq!(
        processor.mirror().ball_owner(),
        processor.mirror().index_of(&EntityId::from("a2"))
    );
}

#[test]
fn test_speed_is_clamped() {
    let mut processor = new_processor(&goal_match());
    processor.set_speed(100.0);
    assert_eq!(processor.speed(), 10.0);
    processor.set_speed(0.0);
    assert_eq!(processor.speed(), 0.1);
    processor.set_speed(f64::NAN);
    assert_eq!(processor.speed(), 0.1);

    processor.set_speed(4.0);
    processor.tick(2.0);
    assert_eq!(processor.current_time(), 8.0);
}

#[test]
fn test_negative_tick_is_ignored() {
    let mut processor = new_processor(&goal_match());
    processor.tick(5.0);
    processor.tick(-3.0);
    processor.tick(f64::NAN);
    assert_eq!(processor.current_time(), 5.0);
}

#[test]
fn test_seek_clamps_out_of_range_targets() {
    let mut processor = new_processor(&goal_match());
    processor.seek_to(-50.0);
    assert_eq!(processor.current_time(), 0.0);
    assert!(!processor.is_finished());

    processor.seek_to(1.0e9);
    assert_eq!(processor.current_time(), processor.end_time());
    assert_eq!(processor.end_time(), 1200.0);
    assert!(processor.is_finished());
    assert_eq!(processor.current_minute(), 20);
}

#[test]
fn test_unknown_player_joins_from_event_team() {
    let mut processor = new_processor(&match_data(vec![MatchEvent::new(
        40.0,
        1,
        EventKind::Pass,
    )
    .with_team("away")
    .with_player("trialist")
    .with_coordinates(70.0, 50.0)]));
    processor.seek_to(41.0);

    let trialist = &processor.world().players[&EntityId::from("trialist")];
    assert_eq!(trialist.team, TeamSide::Away);
    assert!(processor.mirror().index_of(&EntityId::from("trialist")).is_some());
}

#[test]
fn test_incomplete_events_are_tolerated() {
    let mut processor = new_processor(&match_data(vec![
        MatchEvent::new(20.0, 1, EventKind::Shot).with_result(EventResult::Goal),
        MatchEvent::new(30.0, 1, EventKind::Shot)
            .with_team("visitors")
            .with_result(EventResult::Goal),
        MatchEvent::new(40.0, 1, EventKind::Pass).with_player("nobody"),
        MatchEvent::new(50.0, 1, EventKind::Other),
    ]));
    processor.seek_to(60.0);

    let world = processor.world();
    assert_eq!((world.score_home, world.score_away), (0, 0));
    assert_eq!(world.possession_team, Some(TeamId::from("visitors")));
    assert_eq!(world.possession_side, None);
    assert!(!world.players.contains_key(&EntityId::from("nobody")));
    assert!(processor.is_finished());
}

#[test]
fn test_out_of_order_period_is_dropped() {
    let data = match_data(vec![
        MatchEvent::new(100.0, 1, EventKind::Pass).with_team("home"),
        MatchEvent::new(10.0, 2, EventKind::Pass).with_team("away"),
        MatchEvent::new(200.0, 1, EventKind::Shot)
            .with_team("home")
            .with_result(EventResult::Goal),
        MatchEvent::new(20.0, 2, EventKind::Pass).with_team("home"),
    ]);
    let mut processor = new_processor(&data);
    assert_eq!(processor.schedule().len(), 3);
    assert_eq!(processor.end_time(), 2720.0);

    processor.seek_to(processor.end_time());
    assert_eq!(processor.world().score_home, 0);
    assert_eq!(processor.world().period, 2);
}

#[test]
fn test_fork_is_independent() {
    let mut processor = new_processor(&goal_match());
    processor.seek_to(100.0);
    let mut fork = processor.fork();
    fork.seek_to(700.0);

    assert_eq!(processor.world().score_home, 0);
    assert_eq!(processor.current_time(), 100.0);
    assert_eq!(fork.world().score_home, 1);
}

#[test]
fn test_process_rejects_bad_interval() {
    let mut processor = new_processor(&goal_match());
    let mut noop =
        |_: &MatchProcessor, _: usize, _: f64| -> MatchReplayResult<TimeAdvance> {
            Ok(TimeAdvance::NextTick)
        };
    let result = processor.process(&mut noop, 0.0);
    assert!(matches!(
        result.map_err(|e| e.variant),
        Err(MatchReplayErrorVariant::InvalidTickInterval { .. })
    ));
}

#[test]
fn test_process_runs_to_the_end() {
    let mut processor = new_processor(&goal_match());
    let mut times = Vec::new();
    let mut record = |processor: &MatchProcessor, _: usize, time: f64| -> MatchReplayResult<TimeAdvance> {
        times.push((time, processor.world().score_home));
        Ok(TimeAdvance::NextTick)
    };
    processor.process(&mut record, 100.0).unwrap();

    assert_eq!(times.len(), 13);
    assert_eq!(times.first(), Some(&(0.0, 0)));
    assert_eq!(times.last(), Some(&(1200.0, 1)));
    assert!(processor.is_finished());
}

#[test]
fn test_partial_config_keeps_defaults() {
    let config = ReplayConfig::from_json_str(r#"{"playback": {"max_speed": 4.0}}"#).unwrap();
    assert_eq!(config.playback.max_speed, 4.0);
    assert_eq!(config.playback.min_speed, 0.1);
    assert_eq!(config.pitch, PitchConfig::default());

    let mut processor = MatchProcessor::new(&goal_match(), config).unwrap();
    processor.set_speed(8.0);
    assert_eq!(processor.speed(), 4.0);
}

#[test]
fn test_duplicate_team_ids_are_rejected() {
    let mut data = goal_match();
    data.roster.away.id = TeamId::from("home");
    let result = MatchProcessor::new(&data, ReplayConfig::default());
    assert!(matches!(
        result.map_err(|e| e.variant),
        Err(MatchReplayErrorVariant::DuplicateTeamId { .. })
    ));
}
