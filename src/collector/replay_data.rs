use serde::Serialize;
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::*;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct BallFrame {
    pub position: Point,
    pub in_play: bool,
}

impl BallFrame {
    fn new_from_processor(processor: &MatchProcessor) -> Self {
        let ball = &processor.world().ball;
        Self {
            position: ball.position,
            in_play: ball.in_play,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub enum PlayerFrame {
    Empty,
    Data {
        position: Point,
        has_ball: bool,
        active: bool,
    },
}

impl PlayerFrame {
    fn from_state(state: &PlayerState) -> Self {
        Self::Data {
            position: state.position,
            has_ball: state.has_ball,
            active: state.active,
        }
    }

    pub fn position(&self) -> Option<Point> {
        match self {
            Self::Empty => None,
            Self::Data { position, .. } => Some(*position),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PlayerData {
    team: TeamSide,
    frames: Vec<PlayerFrame>,
}

impl PlayerData {
    fn new(team: TeamSide) -> Self {
        Self {
            team,
            frames: Vec::new(),
        }
    }

    /// Frames before the player first appeared are filled with
    /// [`PlayerFrame::Empty`], keeping every track aligned with the metadata.
    fn add_frame(&mut self, frame_index: usize, frame: PlayerFrame) {
        while self.frames.len() < frame_index {
            self.frames.push(PlayerFrame::Empty);
        }
        self.frames.push(frame)
    }

    pub fn team(&self) -> TeamSide {
        self.team
    }

    pub fn frames(&self) -> &[PlayerFrame] {
        &self.frames
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct BallData {
    frames: Vec<BallFrame>,
}

impl BallData {
    fn add_frame(&mut self, frame: BallFrame) {
        self.frames.push(frame)
    }

    pub fn frames(&self) -> &[BallFrame] {
        &self.frames
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, TS, new)]
#[ts(export)]
pub struct MetadataFrame {
    pub time: f64,
    pub period: u8,
    pub score_home: u32,
    pub score_away: u32,
    pub possession: Option<TeamSide>,
}

impl MetadataFrame {
    fn new_from_processor(processor: &MatchProcessor) -> Self {
        let world = processor.world();
        Self::new(
            processor.current_time(),
            world.period,
            world.score_home,
            world.score_away,
            world.possession_side,
        )
    }
}

/// Per-entity tracks of a processed match, ready to hand to a renderer.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct ReplayData {
    pub ball_data: BallData,
    pub players: BTreeMap<EntityId, PlayerData>,
    pub frame_metadata: Vec<MetadataFrame>,
}

impl ReplayData {
    fn new() -> Self {
        ReplayData {
            ball_data: BallData { frames: Vec::new() },
            players: BTreeMap::new(),
            frame_metadata: Vec::new(),
        }
    }

    pub fn as_json(&self) -> MatchReplayResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_metadata.len()
    }

    pub fn duration(&self) -> f64 {
        self.frame_metadata
            .last()
            .map(|frame| frame.time)
            .unwrap_or(0.0)
    }

    fn add_frame(
        &mut self,
        frame_metadata: MetadataFrame,
        ball_frame: BallFrame,
        player_frames: Vec<(EntityId, TeamSide, PlayerFrame)>,
    ) {
        let frame_index = self.frame_metadata.len();
        self.frame_metadata.push(frame_metadata);
        self.ball_data.add_frame(ball_frame);
        for (player_id, team, frame) in player_frames {
            self.players
                .entry(player_id)
                .or_insert_with(|| PlayerData::new(team))
                .add_frame(frame_index, frame)
        }
    }
}

pub struct ReplayDataCollector {
    replay_data: ReplayData,
}

impl Default for ReplayDataCollector {
    fn default() -> Self {
        Self::new()
    }
}

impl ReplayDataCollector {
    pub fn new() -> Self {
        ReplayDataCollector {
            replay_data: ReplayData::new(),
        }
    }

    /// Process a whole match at the default tick rate. Wrap the collector in
    /// a [`FrameRateDecorator`] and use [`Self::into_replay_data`] for a
    /// coarser sampling.
    pub fn get_replay_data(self, match_data: &MatchData) -> MatchReplayResult<ReplayData> {
        Ok(self.process_match(match_data)?.replay_data)
    }

    pub fn into_replay_data(self) -> ReplayData {
        self.replay_data
    }

    fn get_player_frames(
        &self,
        processor: &MatchProcessor,
    ) -> Vec<(EntityId, TeamSide, PlayerFrame)> {
        processor
            .world()
            .players
            .values()
            .map(|state| {
                (
                    state.id.clone(),
                    state.team,
                    PlayerFrame::from_state(state),
                )
            })
            .collect()
    }
}

impl Collector for ReplayDataCollector {
    fn process_tick(
        &mut self,
        processor: &MatchProcessor,
        _tick: usize,
        _current_time: f64,
    ) -> MatchReplayResult<TimeAdvance> {
        let metadata_frame = MetadataFrame::new_from_processor(processor);
        let ball_frame = BallFrame::new_from_processor(processor);
        let player_frames = self.get_player_frames(processor);
        self.replay_data
            .add_frame(metadata_frame, ball_frame, player_frames);
        Ok(TimeAdvance::NextTick)
    }
}
