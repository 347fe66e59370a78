use crate::constants::*;
use crate::*;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use ts_rs::TS;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(id: &str) -> Self {
        EntityId(id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(transparent)]
#[ts(export)]
pub struct TeamId(pub String);

impl std::fmt::Display for TeamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TeamId {
    fn from(id: &str) -> Self {
        TeamId(id.to_string())
    }
}

/// Which end a team defends. Home attacks towards increasing x.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum TeamSide {
    Home,
    Away,
}

impl TeamSide {
    pub fn index(&self) -> u8 {
        match self {
            TeamSide::Home => 0,
            TeamSide::Away => 1,
        }
    }

    pub fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(TeamSide::Home),
            1 => Some(TeamSide::Away),
            _ => None,
        }
    }
}

/// Anything the replay tracks a position for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Entity {
    Player(EntityId),
    Ball,
}

/// Serializes as a snake_case tag; deserializes from any position name via
/// [`Role::from_position_name`], so both `"defender"` and `"Left Center Back"`
/// are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Role {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    #[default]
    Unknown,
}

impl From<String> for Role {
    fn from(name: String) -> Self {
        Role::from_position_name(&name)
    }
}

impl Role {
    /// Classify a free-text position name such as "Left Center Back" or
    /// "Center Attacking Midfield".
    pub fn from_position_name(name: &str) -> Self {
        let name = name.to_lowercase();
        if name.contains("goalkeeper") || name == "gk" {
            Role::Goalkeeper
        } else if name.contains("midfield") || name == "mid" {
            Role::Midfielder
        } else if name.contains("back") || name.contains("defender") || name == "def" {
            Role::Defender
        } else if name.contains("forward")
            || name.contains("wing")
            || name.contains("striker")
            || name == "fwd"
        {
            Role::Forward
        } else {
            Role::Unknown
        }
    }

    fn slots(&self) -> &'static [(f32, f32)] {
        match self {
            Role::Goalkeeper => &GOALKEEPER_SLOTS,
            Role::Defender => &DEFENDER_SLOTS,
            Role::Midfielder | Role::Unknown => &MIDFIELDER_SLOTS,
            Role::Forward => &FORWARD_SLOTS,
        }
    }
}

/// Static metadata for one tracked player, with its resolved base coordinate.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityInfo {
    pub id: EntityId,
    pub name: String,
    pub team_id: TeamId,
    pub side: TeamSide,
    pub role: Role,
    pub starting: bool,
    pub base: Point,
}

/// Stable identity, team and role for every rostered player, plus a default
/// layout in which no two players share a base coordinate.
#[derive(Debug, Clone)]
pub struct EntityRegistry {
    home_team: TeamId,
    away_team: TeamId,
    entities: Vec<EntityInfo>,
    index_by_id: HashMap<EntityId, usize>,
    pitch: PitchConfig,
}

impl EntityRegistry {
    pub fn new(roster: &Roster, pitch: &PitchConfig) -> MatchReplayResult<Self> {
        if roster.home.id == roster.away.id {
            return MatchReplayError::new_result(MatchReplayErrorVariant::DuplicateTeamId {
                team_id: roster.home.id.clone(),
            });
        }

        let mut entities = Vec::new();
        let mut index_by_id = HashMap::new();
        let mut occupied = HashSet::new();

        for (team, side) in [(&roster.home, TeamSide::Home), (&roster.away, TeamSide::Away)] {
            let mut role_counts: HashMap<Role, usize> = HashMap::new();
            for player in team.players.iter() {
                if index_by_id.contains_key(&player.id) {
                    return MatchReplayError::new_result(
                        MatchReplayErrorVariant::DuplicateEntityId {
                            entity_id: player.id.clone(),
                        },
                    );
                }
                let count = role_counts.entry(player.role).or_insert(0);
                let preferred = player
                    .base
                    .unwrap_or_else(|| layout_slot(player.role, *count, side, pitch));
                *count += 1;
                let base = avoid_collision(preferred, &mut occupied, pitch);

                index_by_id.insert(player.id.clone(), entities.len());
                entities.push(EntityInfo {
                    id: player.id.clone(),
                    name: player.name.clone(),
                    team_id: team.id.clone(),
                    side,
                    role: player.role,
                    starting: player.starting,
                    base,
                });
            }
        }

        Ok(Self {
            home_team: roster.home.id.clone(),
            away_team: roster.away.id.clone(),
            entities,
            index_by_id,
            pitch: *pitch,
        })
    }

    pub fn info(&self, id: &EntityId) -> Option<&EntityInfo> {
        self.index_by_id.get(id).map(|index| &self.entities[*index])
    }

    /// Metadata for `id`, synthesizing an entry for players the roster never
    /// listed (they play in the central midfield slot of their side).
    pub fn resolve(&self, id: &EntityId, side: TeamSide) -> Cow<'_, EntityInfo> {
        match self.info(id) {
            Some(info) => Cow::Borrowed(info),
            None => Cow::Owned(EntityInfo {
                id: id.clone(),
                name: id.to_string(),
                team_id: self.team_id(side).clone(),
                side,
                role: Role::Unknown,
                starting: false,
                base: layout_slot(Role::Midfielder, 1, side, &self.pitch),
            }),
        }
    }

    pub fn side_of_team(&self, team: &TeamId) -> Option<TeamSide> {
        if *team == self.home_team {
            Some(TeamSide::Home)
        } else if *team == self.away_team {
            Some(TeamSide::Away)
        } else {
            None
        }
    }

    pub fn team_id(&self, side: TeamSide) -> &TeamId {
        match side {
            TeamSide::Home => &self.home_team,
            TeamSide::Away => &self.away_team,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &EntityInfo> {
        self.entities.iter()
    }

    pub fn iter_starting(&self) -> impl Iterator<Item = &EntityInfo> {
        self.entities.iter().filter(|info| info.starting)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn pitch(&self) -> &PitchConfig {
        &self.pitch
    }
}

fn layout_slot(role: Role, nth: usize, side: TeamSide, pitch: &PitchConfig) -> Point {
    let slots = role.slots();
    let (x, y) = slots[nth % slots.len()];
    // Players beyond the formation (usually substitutes) stack sideways.
    let y = y + (nth / slots.len()) as f32 * LAYOUT_OVERFLOW_SHIFT;
    let x = x * pitch.length / PITCH_LENGTH;
    let y = y * pitch.width / PITCH_WIDTH;
    let x = match side {
        TeamSide::Home => x,
        TeamSide::Away => pitch.length - x,
    };
    pitch.clamp(Point::new(x, y))
}

fn point_key(point: &Point) -> (u32, u32) {
    (point.x.to_bits(), point.y.to_bits())
}

fn avoid_collision(
    preferred: Point,
    occupied: &mut HashSet<(u32, u32)>,
    pitch: &PitchConfig,
) -> Point {
    let mut candidate = preferred;
    let mut attempts = 0usize;
    while occupied.contains(&point_key(&candidate)) {
        attempts += 1;
        let mut y = candidate.y + LAYOUT_COLLISION_STEP;
        let mut x = candidate.x;
        if y > pitch.width {
            y -= pitch.width;
            x = (x + 1.0).min(pitch.length);
        }
        candidate = Point::new(x, y);
        if attempts > 10_000 {
            // Only reachable with absurd roster sizes; nudge off the lattice.
            candidate = Point::new(candidate.x, candidate.y + 0.5);
        }
    }
    occupied.insert(point_key(&candidate));
    candidate
}

#[cfg(test)]
mod tests {
    use super::*;

    fn player(id: &str, role: Role) -> PlayerInfo {
        PlayerInfo {
            id: EntityId::from(id),
            name: id.to_string(),
            jersey: None,
            role,
            starting: true,
            base: None,
        }
    }

    fn roster(home: Vec<PlayerInfo>, away: Vec<PlayerInfo>) -> Roster {
        Roster {
            home: TeamInfo {
                id: TeamId::from("home"),
                name: "Home".to_string(),
                players: home,
            },
            away: TeamInfo {
                id: TeamId::from("away"),
                name: "Away".to_string(),
                players: away,
            },
        }
    }

    #[test]
    fn test_layout_has_no_shared_points() {
        let home = (0..8)
            .map(|i| player(&format!("h{i}"), Role::Goalkeeper))
            .collect();
        let away = vec![
            player("a0", Role::Defender),
            PlayerInfo {
                base: Some(Point::new(95.0, 10.0)),
                ..player("a1", Role::Forward)
            },
        ];
        let registry = EntityRegistry::new(&roster(home, away), &PitchConfig::default()).unwrap();
        let points: HashSet<_> = registry.iter().map(|info| point_key(&info.base)).collect();
        assert_eq!(points.len(), registry.len());
    }

    #[test]
    fn test_away_side_is_mirrored() {
        let registry = EntityRegistry::new(
            &roster(
                vec![player("h", Role::Goalkeeper)],
                vec![player("a", Role::Goalkeeper)],
            ),
            &PitchConfig::default(),
        )
        .unwrap();
        let home = registry.info(&EntityId::from("h")).unwrap();
        let away = registry.info(&EntityId::from("a")).unwrap();
        assert_eq!(home.base, Point::new(5.0, 40.0));
        assert_eq!(away.base, Point::new(115.0, 40.0));
    }

    #[test]
    fn test_duplicate_ids_are_rejected() {
        let result = EntityRegistry::new(
            &roster(
                vec![player("same", Role::Defender)],
                vec![player("same", Role::Forward)],
            ),
            &PitchConfig::default(),
        );
        assert!(matches!(
            result.map_err(|e| e.variant),
            Err(MatchReplayErrorVariant::DuplicateEntityId { .. })
        ));
    }

    #[test]
    fn test_role_from_position_name() {
        assert_eq!(Role::from_position_name("Goalkeeper"), Role::Goalkeeper);
        assert_eq!(Role::from_position_name("Left Center Back"), Role::Defender);
        assert_eq!(
            Role::from_position_name("Right Defensive Midfield"),
            Role::Midfielder
        );
        assert_eq!(Role::from_position_name("Left Wing"), Role::Forward);
        assert_eq!(Role::from_position_name("Coach"), Role::Unknown);
    }

    #[test]
    fn test_role_deserializes_from_position_names() {
        let players: Vec<PlayerInfo> = serde_json::from_str(
            r#"[
                {"id": "a", "role": "Goalkeeper"},
                {"id": "b", "role": "Left Center Back"},
                {"id": "c", "role": "Center Forward"},
                {"id": "d", "role": "midfielder"},
                {"id": "e", "role": "Coach"},
                {"id": "f"}
            ]"#,
        )
        .unwrap();
        let roles: Vec<_> = players.iter().map(|p| p.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::Goalkeeper,
                Role::Defender,
                Role::Forward,
                Role::Midfielder,
                Role::Unknown,
                Role::Unknown,
            ]
        );

        for role in [Role::Goalkeeper, Role::Defender, Role::Midfielder, Role::Forward, Role::Unknown] {
            let json = serde_json::to_string(&role).unwrap();
            assert_eq!(serde_json::from_str::<Role>(&json).unwrap(), role);
        }
    }
}
