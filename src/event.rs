use crate::*;
use serde::{Deserialize, Serialize};

/// Everything the loader hands over for one match: who plays, and what
/// happened, in log order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchData {
    pub roster: Roster,
    pub events: Vec<MatchEvent>,
}

impl MatchData {
    pub fn from_json_str(json: &str) -> MatchReplayResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Roster {
    pub home: TeamInfo,
    pub away: TeamInfo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamInfo {
    pub id: TeamId,
    pub name: String,
    pub players: Vec<PlayerInfo>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerInfo {
    pub id: EntityId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub jersey: Option<u32>,
    #[serde(default)]
    pub role: Role,
    /// Whether the player is on the pitch at kickoff.
    #[serde(default = "default_starting")]
    pub starting: bool,
    /// Explicit base coordinate, overriding the formation layout.
    #[serde(default)]
    pub base: Option<Point>,
}

fn default_starting() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FreezeFrameEntry {
    pub player: EntityId,
    pub location: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    KickOff,
    Pass,
    Carry,
    Dribble,
    Shot,
    Duel,
    Interception,
    Clearance,
    Foul,
    Substitution,
    BallOut,
    HalfEnd,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventResult {
    Goal,
    Saved,
    Blocked,
    OffTarget,
    Complete,
    Incomplete,
    #[serde(other)]
    Other,
}

/// A single discrete occurrence from the match log. Every field other than
/// the clock and the kind is optional: missing data disables the matching
/// effect rather than rejecting the event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Seconds since the start of `period`.
    pub time: f64,
    #[serde(default)]
    pub period: Option<u8>,
    pub kind: EventKind,
    #[serde(default)]
    pub team: Option<TeamId>,
    #[serde(default)]
    pub player: Option<EntityId>,
    #[serde(default)]
    pub coordinates: Option<Point>,
    #[serde(default)]
    pub freeze_frame: Option<Vec<FreezeFrameEntry>>,
    #[serde(default)]
    pub result: Option<EventResult>,
    /// Incoming player for substitutions.
    #[serde(default)]
    pub replacement: Option<EntityId>,
}

impl MatchEvent {
    pub fn new(time: f64, period: u8, kind: EventKind) -> Self {
        Self {
            time,
            period: Some(period),
            kind,
            team: None,
            player: None,
            coordinates: None,
            freeze_frame: None,
            result: None,
            replacement: None,
        }
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(TeamId::from(team));
        self
    }

    pub fn with_player(mut self, player: &str) -> Self {
        self.player = Some(EntityId::from(player));
        self
    }

    pub fn with_coordinates(mut self, x: f32, y: f32) -> Self {
        self.coordinates = Some(Point::new(x, y));
        self
    }

    pub fn with_result(mut self, result: EventResult) -> Self {
        self.result = Some(result);
        self
    }

    pub fn with_replacement(mut self, player: &str) -> Self {
        self.replacement = Some(EntityId::from(player));
        self
    }

    pub fn with_freeze_frame(mut self, entries: &[(&str, f32, f32)]) -> Self {
        self.freeze_frame = Some(
            entries
                .iter()
                .map(|(player, x, y)| FreezeFrameEntry {
                    player: EntityId::from(*player),
                    location: Point::new(*x, *y),
                })
                .collect(),
        );
        self
    }

    pub fn is_goal(&self) -> bool {
        self.kind == EventKind::Shot && self.result == Some(EventResult::Goal)
    }
}
