use crate::*;
use serde::Serialize;
use std::collections::BTreeMap;
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct PlayerState {
    pub id: EntityId,
    pub team: TeamSide,
    pub position: Point,
    pub has_ball: bool,
    /// False once the player has been substituted off.
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct BallState {
    pub position: Point,
    pub height: f32,
    pub in_play: bool,
}

/// The live picture of the match at the current playback time.
#[derive(Debug, Clone, PartialEq, Serialize, TS)]
#[ts(export)]
pub struct WorldState {
    pub timestamp: f64,
    pub period: u8,
    pub score_home: u32,
    pub score_away: u32,
    pub possession_team: Option<TeamId>,
    pub possession_side: Option<TeamSide>,
    pub players: BTreeMap<EntityId, PlayerState>,
    pub ball: BallState,
    /// Schedule index of the most recently applied event.
    pub last_event: Option<usize>,
}

impl WorldState {
    /// The starting lineups at their base coordinates with the ball on the
    /// centre spot and the home side in possession.
    pub fn kickoff(registry: &EntityRegistry) -> Self {
        let players = registry
            .iter_starting()
            .map(|info| {
                (
                    info.id.clone(),
                    PlayerState {
                        id: info.id.clone(),
                        team: info.side,
                        position: info.base,
                        has_ball: false,
                        active: true,
                    },
                )
            })
            .collect();
        Self {
            timestamp: 0.0,
            period: 1,
            score_home: 0,
            score_away: 0,
            possession_team: Some(registry.team_id(TeamSide::Home).clone()),
            possession_side: Some(TeamSide::Home),
            players,
            ball: BallState {
                position: registry.pitch().center(),
                height: 0.0,
                in_play: true,
            },
            last_event: None,
        }
    }

    pub fn ball_carrier(&self) -> Option<&PlayerState> {
        self.players.values().find(|player| player.has_ball)
    }

    pub fn tracked_count(&self) -> usize {
        self.players.len()
    }

    /// Advance the state through one event. Each effect needs its own fields;
    /// an effect whose fields are missing or unresolvable is skipped without
    /// touching the others.
    pub fn apply_event(&mut self, index: usize, scheduled: &ScheduledEvent, interpolator: &Interpolator) {
        let event = &scheduled.event;
        let registry = interpolator.registry();
        log::trace!(
            "Applying event {} ({:?}) at {:.2}s",
            index,
            event.kind,
            scheduled.global_time
        );

        self.last_event = Some(index);
        self.timestamp = scheduled.global_time;
        self.period = scheduled.period;

        let event_side = event.team.as_ref().and_then(|team| registry.side_of_team(team));

        if event.is_goal() {
            match event_side {
                Some(TeamSide::Home) => self.score_home += 1,
                Some(TeamSide::Away) => self.score_away += 1,
                None => log::warn!(
                    "Goal at {:.2}s has no resolvable team ({:?}), score unchanged",
                    scheduled.global_time,
                    event.team
                ),
            }
        }

        if let Some(team) = &event.team {
            self.possession_team = Some(team.clone());
            self.possession_side = event_side;
        }

        match event.kind {
            EventKind::KickOff => self.ball.in_play = true,
            EventKind::BallOut | EventKind::HalfEnd => self.ball.in_play = false,
            _ if event.coordinates.is_some() => self.ball.in_play = true,
            _ => {}
        }

        for player in self.players.values_mut() {
            player.has_ball = false;
        }

        let player_id = match &event.player {
            Some(id) => id,
            None => return,
        };

        if event.kind == EventKind::Substitution {
            if let Some(outgoing) = self.players.get_mut(player_id) {
                outgoing.active = false;
            }
            if let Some(incoming) = &event.replacement {
                self.activate(incoming, event_side, false, scheduled.global_time, interpolator);
            }
        } else {
            self.activate(player_id, event_side, true, scheduled.global_time, interpolator);
        }
    }

    /// Mark `id` as on the pitch, inserting it at its tactical position the
    /// first time it shows up.
    fn activate(
        &mut self,
        id: &EntityId,
        event_side: Option<TeamSide>,
        has_ball: bool,
        time: f64,
        interpolator: &Interpolator,
    ) {
        if let Some(player) = self.players.get_mut(id) {
            player.has_ball = has_ball;
            player.active = true;
            return;
        }

        let registry = interpolator.registry();
        let side = match registry.info(id).map(|info| info.side).or(event_side) {
            Some(side) => side,
            None => {
                log::warn!("Player {} has no known team, not tracking", id);
                return;
            }
        };
        let info = registry.resolve(id, side);
        let position = interpolator.tactical_position(&info, self.ball.position, time);
        log::debug!("Player {} enters at {:.2}s", id, time);
        self.players.insert(
            id.clone(),
            PlayerState {
                id: id.clone(),
                team: side,
                position,
                has_ball,
                active: true,
            },
        );
    }
}
