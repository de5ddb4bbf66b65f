use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{GameEntity, GameListItemEntity, TeamSide, UserEntity},
    dto::{format_system_time, validation::validate_not_blank},
};

/// Payload used to schedule a brand-new game.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateGameRequest {
    /// Venue of the game.
    pub location: String,
    /// Optional locality label shown in listings.
    #[serde(default)]
    pub area: Option<String>,
    /// Scheduled date, RFC 3339.
    #[serde(with = "time::serde::rfc3339")]
    #[schema(value_type = String, format = DateTime)]
    pub date: OffsetDateTime,
}

impl Validate for CreateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Err(e) = validate_not_blank(&self.location) {
            errors.add("location", e);
        }

        if let Some(ref area) = self.area {
            if let Err(e) = validate_not_blank(area) {
                errors.add("area", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Team choice when joining a game; omit to take the first free seat.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct JoinGameRequest {
    #[serde(default)]
    pub team: Option<TeamSide>,
}

/// Partial update applied by the host; omitted fields keep their value.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateGameRequest {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub area: Option<String>,
    /// New scheduled date, RFC 3339.
    #[serde(default, with = "time::serde::rfc3339::option")]
    #[schema(value_type = Option<String>, format = DateTime)]
    pub date: Option<OffsetDateTime>,
}

impl Validate for UpdateGameRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref location) = self.location {
            if let Err(e) = validate_not_blank(location) {
                errors.add("location", e);
            }
        }

        if let Some(ref area) = self.area {
            if let Err(e) = validate_not_blank(area) {
                errors.add("area", e);
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Display data for a player resolved from the users collection.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserRef {
    pub id: Uuid,
    /// Display name; absent when the account no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Contact e-mail; absent when the account no longer exists.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserRef {
    /// Look up `id` in the resolved accounts, degrading to a bare id.
    pub fn resolve(id: Uuid, users: &HashMap<Uuid, UserEntity>) -> Self {
        match users.get(&id) {
            Some(user) => Self {
                id,
                name: Some(user.name.clone()),
                email: Some(user.email.clone()),
            },
            None => Self {
                id,
                name: None,
                email: None,
            },
        }
    }
}

/// Game as stored, with raw player ids. Returned by every mutation.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameSummary {
    pub id: Uuid,
    pub team_a: Vec<Uuid>,
    pub team_b: Vec<Uuid>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Scheduled date, RFC 3339.
    pub date: String,
    pub host: Uuid,
    pub player_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameEntity> for GameSummary {
    fn from(entity: GameEntity) -> Self {
        let player_count = entity.player_count();
        Self {
            id: entity.id,
            team_a: entity.team_a,
            team_b: entity.team_b,
            location: entity.location,
            area: entity.area,
            date: format_system_time(entity.date),
            host: entity.host,
            player_count,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Entry of the public games listing.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameListItem {
    pub id: Uuid,
    /// Scheduled date, RFC 3339.
    pub date: String,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    pub player_count: usize,
}

impl From<GameListItemEntity> for GameListItem {
    fn from(entity: GameListItemEntity) -> Self {
        Self {
            id: entity.id,
            date: format_system_time(entity.date),
            location: entity.location,
            area: entity.area,
            player_count: entity.player_count,
        }
    }
}

/// Game with both rosters resolved to display data.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameDetail {
    pub id: Uuid,
    pub team_a: Vec<UserRef>,
    pub team_b: Vec<UserRef>,
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub area: Option<String>,
    /// Scheduled date, RFC 3339.
    pub date: String,
    pub host: UserRef,
    pub player_count: usize,
    pub created_at: String,
    pub updated_at: String,
}

impl GameDetail {
    /// Attach resolved display data to a game.
    pub fn resolve(entity: GameEntity, users: &HashMap<Uuid, UserEntity>) -> Self {
        let player_count = entity.player_count();
        Self {
            id: entity.id,
            team_a: entity
                .team_a
                .iter()
                .map(|id| UserRef::resolve(*id, users))
                .collect(),
            team_b: entity
                .team_b
                .iter()
                .map(|id| UserRef::resolve(*id, users))
                .collect(),
            location: entity.location,
            area: entity.area,
            date: format_system_time(entity.date),
            host: UserRef::resolve(entity.host, users),
            player_count,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Outcome of leaving a game.
#[derive(Debug, Serialize, ToSchema)]
pub struct LeaveGameResponse {
    /// True when the last player left and the game was deleted.
    pub deleted: bool,
    /// Replacement host when the departing player was hosting.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_host: Option<Uuid>,
    /// Remaining game state; absent once the game is deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameSummary>,
}
