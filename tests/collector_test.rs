use match_replay::*;

fn load_sample_match() -> MatchData {
    let data = std::fs::read_to_string("assets/matches/sample_match.json")
        .expect("Failed to read match file");
    MatchData::from_json_str(&data).expect("Failed to parse match file")
}

#[test]
fn test_sample_match_loads() {
    let match_data = load_sample_match();
    assert_eq!(match_data.events.len(), 15);

    let processor = MatchProcessor::new(&match_data, ReplayConfig::default()).unwrap();
    // The stray first-half pass logged after the second half started is dropped.
    assert_eq!(processor.schedule().len(), 14);
    assert_eq!(processor.end_time(), 5400.0);

    let registry = processor.registry();
    assert_eq!(registry.len(), 9);
    let striker = registry.info(&EntityId::from("a-st")).unwrap();
    assert_eq!(striker.role, Role::Unknown);
    assert_eq!(striker.side, TeamSide::Away);
    let midfielder = registry.info(&EntityId::from("a-cm")).unwrap();
    assert_eq!(midfielder.base, Point::new(70.0, 35.0));
}

#[test]
fn test_full_match_result() {
    let mut processor = MatchProcessor::new(&load_sample_match(), ReplayConfig::default()).unwrap();
    processor.seek_to(processor.end_time());
    let world = processor.world();
    assert_eq!((world.score_home, world.score_away), (1, 1));
    assert_eq!(world.period, 2);
    assert!(!world.ball.in_play);
    assert!(!world.players[&EntityId::from("h-st")].active);
    assert!(world.players[&EntityId::from("h-sub")].active);
}

#[test]
fn test_ndarray_pads_late_entries() {
    let match_data = load_sample_match();
    let mut collector = NDArrayCollector::<f32>::new(false);
    let mut processor = MatchProcessor::new(&match_data, ReplayConfig::default()).unwrap();
    processor
        .process(&mut FrameRateDecorator::new(60.0, &mut collector), 60.0)
        .unwrap();

    let (meta, array) = collector.get_meta_and_ndarray().unwrap();
    assert_eq!(array.shape(), &[91, 25]);
    assert_eq!(meta.column_headers.len(), 25);
    assert_eq!(meta.entity_order.len(), 9);
    assert_eq!(meta.entity_order[8], EntityId::from("h-sub"));
    assert_eq!(meta.column_headers[21], "h-sub x");
    assert_eq!(meta.column_headers[24], "ball y");

    // Substitute enters at 2730s; earlier rows carry the sentinel.
    assert_eq!(array[[0, 21]], constants::OFF_PITCH_SENTINEL);
    assert_eq!(array[[45, 22]], constants::OFF_PITCH_SENTINEL);
    assert!(array[[46, 21]] <= 1.0);
    assert!(array[[90, 21]] <= 1.0);

    // Score columns.
    assert_eq!(array[[0, 2]], 0.0);
    assert_eq!(array[[90, 2]], 1.0);
    assert_eq!(array[[90, 3]], 1.0);
}

#[test]
fn test_ndarray_with_velocities() {
    let (meta, array) = NDArrayCollector::<f64>::build_ndarray(
        &load_sample_match(),
        ReplayConfig::default(),
        true,
        300.0,
    )
    .unwrap();
    assert_eq!(array.shape(), &[19, 45]);
    assert!(meta.column_headers.contains(&"h-sub vx".to_string()));
    // Padded velocities are zero.
    let sub_vx = meta
        .column_headers
        .iter()
        .position(|h| h == "h-sub vx")
        .unwrap();
    assert_eq!(array[[0, sub_vx]], 0.0);
}

#[test]
fn test_replay_data_tracks() {
    let match_data = load_sample_match();
    let mut collector = ReplayDataCollector::new();
    FrameRateDecorator::new(10.0, &mut collector)
        .process_match(&match_data)
        .unwrap();
    let replay_data = collector.into_replay_data();

    assert_eq!(replay_data.frame_count(), 541);
    assert_eq!(replay_data.duration(), 5400.0);
    assert_eq!(replay_data.ball_data.frames().len(), 541);

    let substitute = &replay_data.players[&EntityId::from("h-sub")];
    assert_eq!(substitute.team(), TeamSide::Home);
    assert_eq!(substitute.frames().len(), 541);
    assert_eq!(substitute.frames()[0], PlayerFrame::Empty);
    assert!(substitute.frames()[540].position().is_some());

    match replay_data.players[&EntityId::from("h-st")].frames().last() {
        Some(PlayerFrame::Data { active, .. }) => assert!(!active),
        other => panic!("unexpected frame {:?}", other),
    }

    let json = replay_data.as_json().unwrap();
    assert!(json.contains("\"frame_metadata\""));
    assert!(json.contains("\"h-sub\""));
}

#[test]
fn test_closure_collector_counts_ticks() {
    let match_data = load_sample_match();
    let mut goals_seen = Vec::new();
    let mut last_score = (0, 0);
    let mut watch = |processor: &MatchProcessor, _tick: usize, time: f64| -> MatchReplayResult<TimeAdvance> {
        let world = processor.world();
        let score = (world.score_home, world.score_away);
        if score != last_score {
            goals_seen.push(time);
            last_score = score;
        }
        Ok(TimeAdvance::NextTick)
    };
    MatchProcessor::new(&match_data, ReplayConfig::default())
        .unwrap()
        .process(&mut watch, 5.0)
        .unwrap();

    assert_eq!(goals_seen, vec![15.0, 3100.0]);
}
