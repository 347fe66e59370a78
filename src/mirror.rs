use crate::constants::*;
use crate::*;
use ::ndarray::{s, Array1, Array2, ArrayView2};
use float_ord::FloatOrd;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Flat numeric shadow of a [`WorldState`].
///
/// Row `i < N` of `positions`/`velocities` belongs to the player registered at
/// index `i`; row `N` is always the ball. Indices are assigned the first time
/// an entity is seen and never change, so arrays only ever grow. Cloning
/// produces a fully independent copy suitable for history or what-if edits.
#[derive(Debug, Clone, PartialEq)]
pub struct StateMirror {
    time: f64,
    period: u8,
    score: (u32, u32),
    positions: Array2<f32>,
    velocities: Array2<f32>,
    stamina: Array1<f32>,
    team_ids: Array1<u8>,
    active: Vec<bool>,
    ball_owner: Option<usize>,
    ball_in_play: bool,
    possession: Option<TeamSide>,
    id_to_index: HashMap<EntityId, usize>,
    index_to_id: Vec<EntityId>,
    normalization: NormalizationConfig,
}

impl StateMirror {
    pub fn from_world(world: &WorldState, normalization: NormalizationConfig) -> Self {
        let count = world.players.len();
        let mut mirror = Self {
            time: world.timestamp,
            period: world.period,
            score: (world.score_home, world.score_away),
            positions: Array2::zeros((count + 1, 2)),
            velocities: Array2::zeros((count + 1, 2)),
            stamina: Array1::from_elem(count, INITIAL_STAMINA),
            team_ids: Array1::zeros(count),
            active: Vec::with_capacity(count),
            ball_owner: None,
            ball_in_play: world.ball.in_play,
            possession: world.possession_side,
            id_to_index: HashMap::with_capacity(count),
            index_to_id: Vec::with_capacity(count),
            normalization,
        };
        for (index, (id, player)) in world.players.iter().enumerate() {
            mirror.id_to_index.insert(id.clone(), index);
            mirror.index_to_id.push(id.clone());
            mirror.set_row(index, player.position);
            mirror.team_ids[index] = player.team.index();
            mirror.active.push(player.active);
            if player.has_ball {
                mirror.ball_owner = Some(index);
            }
        }
        mirror.set_row(count, world.ball.position);
        mirror.check_invariants();
        mirror
    }

    /// Bring the mirror up to date with `world`. Unseen players are appended
    /// just ahead of the ball row; velocities are the position delta since the
    /// previous sync, or since admission for players admitted in between.
    pub fn sync(&mut self, world: &WorldState) {
        self.time = world.timestamp;
        self.period = world.period;
        self.score = (world.score_home, world.score_away);
        self.possession = world.possession_side;
        self.ball_owner = None;
        self.ball_in_play = world.ball.in_play;

        for (id, player) in world.players.iter() {
            let index = match self.id_to_index.get(id) {
                Some(index) => {
                    let index = *index;
                    let previous = self.row(index);
                    self.velocities[[index, 0]] = player.position.x - previous.x;
                    self.velocities[[index, 1]] = player.position.y - previous.y;
                    self.set_row(index, player.position);
                    index
                }
                None => self.push_player(id, player),
            };
            self.active[index] = player.active;
            if player.has_ball {
                self.ball_owner = Some(index);
            }
        }

        let ball_index = self.ball_index();
        let previous_ball = self.row(ball_index);
        self.velocities[[ball_index, 0]] = world.ball.position.x - previous_ball.x;
        self.velocities[[ball_index, 1]] = world.ball.position.y - previous_ball.y;
        self.set_row(ball_index, world.ball.position);
        self.check_invariants();
    }

    /// Give rows to players that entered the world since the last call,
    /// without touching anyone else. Calling this after every applied event
    /// numbers late entrants in order of first appearance in the log, however
    /// the playback got there.
    pub fn admit_new_players(&mut self, world: &WorldState) {
        if world.players.len() == self.index_to_id.len() {
            return;
        }
        for (id, player) in world.players.iter() {
            if !self.id_to_index.contains_key(id) {
                self.push_player(id, player);
            }
        }
        self.check_invariants();
    }

    fn push_player(&mut self, id: &EntityId, player: &PlayerState) -> usize {
        let index = self.index_to_id.len();
        self.positions = insert_before_last(&self.positions, [player.position.x, player.position.y]);
        self.velocities = insert_before_last(&self.velocities, [0.0, 0.0]);
        self.stamina = self
            .stamina
            .iter()
            .copied()
            .chain(std::iter::once(INITIAL_STAMINA))
            .collect();
        self.team_ids = self
            .team_ids
            .iter()
            .copied()
            .chain(std::iter::once(player.team.index()))
            .collect();
        self.active.push(player.active);
        self.id_to_index.insert(id.clone(), index);
        self.index_to_id.push(id.clone());
        index
    }

    pub fn reset_velocities(&mut self) {
        self.velocities.fill(0.0);
    }

    // A broken pairing here means a sync bug, not bad data.
    fn check_invariants(&self) {
        let players = self.index_to_id.len();
        assert_eq!(
            self.positions.nrows(),
            players + 1,
            "position rows must be players + ball"
        );
        assert_eq!(self.velocities.nrows(), players + 1);
        assert_eq!(self.stamina.len(), players);
        assert_eq!(self.team_ids.len(), players);
        assert_eq!(self.active.len(), players);
        assert_eq!(self.id_to_index.len(), players, "duplicate entity id in mirror");
        if let Some(owner) = self.ball_owner {
            assert!(owner < players, "ball owner must be a player row");
        }
    }

    /// Flat feature vector: normalized time, period, both scores, possession,
    /// normalized positions row by row (ball last) and, optionally, raw
    /// velocities in the same order.
    pub fn to_vector(&self, include_velocity: bool) -> Array1<f32> {
        let scale = self.normalization.position_scale;
        let mut features = Vec::with_capacity(
            FEATURE_HEADER_LEN + self.positions.len() * if include_velocity { 2 } else { 1 },
        );
        features.extend_from_slice(&self.header_features());
        features.extend(self.positions.iter().map(|v| v / scale));
        if include_velocity {
            features.extend(self.velocities.iter().copied());
        }
        Array1::from(features)
    }

    pub fn header_features(&self) -> [f32; 5] {
        [
            (self.time / self.normalization.time_scale) as f32,
            f32::from(self.period),
            self.score.0 as f32,
            self.score.1 as f32,
            self.possession.map(|side| f32::from(side.index())).unwrap_or(0.0),
        ]
    }

    pub fn to_dict(&self) -> MirrorDict {
        MirrorDict {
            time: self.time,
            period: self.period,
            score: [self.score.0, self.score.1],
            positions: rows_of(&self.positions),
            velocities: rows_of(&self.velocities),
            stamina: self.stamina.to_vec(),
            team_ids: self.team_ids.to_vec(),
            active: self.active.clone(),
            ball_owner_idx: self.ball_owner,
            ball_in_play: self.ball_in_play,
            possession_team: self.possession,
            entity_ids: self.index_to_id.clone(),
        }
    }

    pub fn from_dict(dict: &MirrorDict, normalization: NormalizationConfig) -> MatchReplayResult<Self> {
        let players = dict.entity_ids.len();
        let check_len = |field: &'static str, expected: usize, actual: usize| {
            if expected == actual {
                Ok(())
            } else {
                MatchReplayError::new_result(MatchReplayErrorVariant::MirrorShapeMismatch {
                    field,
                    expected,
                    actual,
                })
            }
        };
        check_len("positions", players + 1, dict.positions.len())?;
        check_len("velocities", players + 1, dict.velocities.len())?;
        check_len("stamina", players, dict.stamina.len())?;
        check_len("team_ids", players, dict.team_ids.len())?;
        // Dicts written before activity was tracked carry no flags.
        let active = if dict.active.is_empty() {
            vec![true; players]
        } else {
            check_len("active", players, dict.active.len())?;
            dict.active.clone()
        };
        if let Some(team) = dict.team_ids.iter().find(|team| TeamSide::from_index(**team).is_none()) {
            return MatchReplayError::new_result(MatchReplayErrorVariant::MirrorIndexOutOfRange {
                index: usize::from(*team),
                rows: 2,
            });
        }
        if let Some(index) = dict.ball_owner_idx {
            if index >= players {
                return MatchReplayError::new_result(
                    MatchReplayErrorVariant::MirrorIndexOutOfRange {
                        index,
                        rows: players,
                    },
                );
            }
        }

        let id_to_index: HashMap<_, _> = dict
            .entity_ids
            .iter()
            .enumerate()
            .map(|(index, id)| (id.clone(), index))
            .collect();
        if id_to_index.len() != players {
            let duplicate = dict
                .entity_ids
                .iter()
                .enumerate()
                .find(|(index, id)| id_to_index.get(*id) != Some(index))
                .map(|(_, id)| id.clone())
                .unwrap_or_else(|| EntityId::from(""));
            return MatchReplayError::new_result(MatchReplayErrorVariant::DuplicateEntityId {
                entity_id: duplicate,
            });
        }

        Ok(Self {
            time: dict.time,
            period: dict.period,
            score: (dict.score[0], dict.score[1]),
            positions: Array2::from_shape_vec(
                (players + 1, 2),
                dict.positions.iter().flatten().copied().collect(),
            )?,
            velocities: Array2::from_shape_vec(
                (players + 1, 2),
                dict.velocities.iter().flatten().copied().collect(),
            )?,
            stamina: Array1::from(dict.stamina.clone()),
            team_ids: Array1::from(dict.team_ids.clone()),
            active,
            ball_owner: dict.ball_owner_idx,
            ball_in_play: dict.ball_in_play,
            possession: dict.possession_team,
            id_to_index,
            index_to_id: dict.entity_ids.clone(),
            normalization,
        })
    }

    /// Rebuild a [`WorldState`] from the mirror, e.g. after what-if edits.
    /// Team ids come from `registry`; the event cursor is not part of the
    /// mirror, so `last_event` is `None`.
    pub fn to_world_state(&self, registry: &EntityRegistry) -> WorldState {
        let players: BTreeMap<EntityId, PlayerState> = self
            .index_to_id
            .iter()
            .enumerate()
            .map(|(index, id)| {
                let team = TeamSide::from_index(self.team_ids[index]).unwrap_or(TeamSide::Home);
                (
                    id.clone(),
                    PlayerState {
                        id: id.clone(),
                        team,
                        position: self.row(index),
                        has_ball: self.ball_owner == Some(index),
                        active: self.active[index],
                    },
                )
            })
            .collect();
        WorldState {
            timestamp: self.time,
            period: self.period,
            score_home: self.score.0,
            score_away: self.score.1,
            possession_team: self.possession.map(|side| registry.team_id(side).clone()),
            possession_side: self.possession,
            players,
            ball: BallState {
                position: self.ball_position(),
                height: 0.0,
                in_play: self.ball_in_play,
            },
            last_event: None,
        }
    }

    // Accessors

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn period(&self) -> u8 {
        self.period
    }

    pub fn score(&self) -> (u32, u32) {
        self.score
    }

    pub fn home_score(&self) -> u32 {
        self.score.0
    }

    pub fn away_score(&self) -> u32 {
        self.score.1
    }

    pub fn positions(&self) -> ArrayView2<'_, f32> {
        self.positions.view()
    }

    pub fn velocities(&self) -> ArrayView2<'_, f32> {
        self.velocities.view()
    }

    pub fn stamina(&self) -> &Array1<f32> {
        &self.stamina
    }

    pub fn team_ids(&self) -> &Array1<u8> {
        &self.team_ids
    }

    pub fn ball_owner(&self) -> Option<usize> {
        self.ball_owner
    }

    pub fn active(&self) -> &[bool] {
        &self.active
    }

    pub fn ball_in_play(&self) -> bool {
        self.ball_in_play
    }

    pub fn possession(&self) -> Option<TeamSide> {
        self.possession
    }

    pub fn num_players(&self) -> usize {
        self.index_to_id.len()
    }

    pub fn ball_index(&self) -> usize {
        self.index_to_id.len()
    }

    pub fn entity_order(&self) -> &[EntityId] {
        &self.index_to_id
    }

    pub fn index_of(&self, id: &EntityId) -> Option<usize> {
        self.id_to_index.get(id).copied()
    }

    pub fn id_at(&self, index: usize) -> Option<&EntityId> {
        self.index_to_id.get(index)
    }

    pub fn ball_position(&self) -> Point {
        self.row(self.ball_index())
    }

    pub fn player_positions(&self) -> ArrayView2<'_, f32> {
        self.positions.slice(s![..self.ball_index(), ..])
    }

    pub fn player_position(&self, id: &EntityId) -> Option<Point> {
        self.index_of(id).map(|index| self.row(index))
    }

    /// Overwrite one player's position, for speculative edits on a copy.
    /// Returns false when the player is not tracked.
    pub fn set_player_position(&mut self, id: &EntityId, position: Point) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.set_row(index, position);
                true
            }
            None => false,
        }
    }

    pub fn team_positions(&self, side: TeamSide) -> Vec<Point> {
        self.team_ids
            .iter()
            .enumerate()
            .filter(|(_, team)| **team == side.index())
            .map(|(index, _)| self.row(index))
            .collect()
    }

    pub fn distance_to_ball(&self, index: usize) -> Option<f32> {
        if index >= self.num_players() {
            return None;
        }
        Some(self.row(index).distance(&self.ball_position()))
    }

    pub fn closest_player_to_ball(&self) -> Option<usize> {
        let ball = self.ball_position();
        (0..self.num_players()).min_by_key(|index| FloatOrd(self.row(*index).distance(&ball)))
    }

    fn row(&self, index: usize) -> Point {
        Point::new(self.positions[[index, 0]], self.positions[[index, 1]])
    }

    fn set_row(&mut self, index: usize, position: Point) {
        self.positions[[index, 0]] = position.x;
        self.positions[[index, 1]] = position.y;
    }
}

/// Serializable form of a [`StateMirror`] for predictive consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MirrorDict {
    pub time: f64,
    pub period: u8,
    pub score: [u32; 2],
    pub positions: Vec<[f32; 2]>,
    pub velocities: Vec<[f32; 2]>,
    pub stamina: Vec<f32>,
    pub team_ids: Vec<u8>,
    #[serde(default)]
    pub active: Vec<bool>,
    pub ball_owner_idx: Option<usize>,
    #[serde(default = "default_in_play")]
    pub ball_in_play: bool,
    pub possession_team: Option<TeamSide>,
    pub entity_ids: Vec<EntityId>,
}

impl MirrorDict {
    pub fn as_json(&self) -> MatchReplayResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn default_in_play() -> bool {
    true
}

fn rows_of(array: &Array2<f32>) -> Vec<[f32; 2]> {
    array.rows().into_iter().map(|row| [row[0], row[1]]).collect()
}

fn insert_before_last(array: &Array2<f32>, row: [f32; 2]) -> Array2<f32> {
    let last = array.nrows() - 1;
    Array2::from_shape_fn((array.nrows() + 1, 2), |(i, j)| match i.cmp(&last) {
        std::cmp::Ordering::Less => array[[i, j]],
        std::cmp::Ordering::Equal => row[j],
        std::cmp::Ordering::Greater => array[[last, j]],
    })
}
