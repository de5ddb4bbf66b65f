use std::fmt;
use std::time::SystemTime;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

/// Maximum number of players per team.
pub const TEAM_CAPACITY: usize = 2;
/// Roster size at which a game is complete and its conversation unlocks.
pub const FULL_ROSTER: usize = TEAM_CAPACITY * 2;

/// Identifies one of the two teams of a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum TeamSide {
    /// First team; the host is seeded here and capacity is probed here first.
    A,
    /// Second team; filled once team A is at capacity.
    B,
}

impl fmt::Display for TeamSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSide::A => f.write_str("A"),
            TeamSide::B => f.write_str("B"),
        }
    }
}

/// Error raised when a user cannot be seated in a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum JoinError {
    /// The user already occupies a seat in either team.
    #[error("user is already in this game")]
    AlreadyInGame,
    /// The explicitly requested team has no free seat.
    #[error("team {0} is full")]
    TeamFull(TeamSide),
    /// Neither team has a free seat.
    #[error("both teams are full")]
    GameFull,
}

/// Error raised when a user cannot be removed from a game.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LeaveError {
    /// The user occupies no seat in this game.
    #[error("user is not part of this game")]
    NotInGame,
}

/// Result of removing a player from a game roster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeaveOutcome {
    /// Replacement host, when the departing player was hosting.
    pub new_host: Option<Uuid>,
    /// True when both teams ended up empty and the game must be deleted.
    pub roster_empty: bool,
}

/// A scheduled pickup game: two teams of at most [`TEAM_CAPACITY`] players
/// and a host drawn from the roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// Players seated in team A, in join order.
    pub team_a: Vec<Uuid>,
    /// Players seated in team B, in join order.
    pub team_b: Vec<Uuid>,
    /// Where the game takes place.
    pub location: String,
    /// Optional locality label complementing `location`.
    pub area: Option<String>,
    /// When the game is scheduled.
    pub date: SystemTime,
    /// Organizer of the game; always a member of one of the two teams.
    pub host: Uuid,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the game was mutated.
    pub updated_at: SystemTime,
}

impl GameEntity {
    /// Build a fresh game hosted by `host`, who takes the first seat of team A.
    pub fn new(host: Uuid, location: String, area: Option<String>, date: SystemTime) -> Self {
        let timestamp = SystemTime::now();
        Self {
            id: Uuid::new_v4(),
            team_a: vec![host],
            team_b: Vec::new(),
            location,
            area,
            date,
            host,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Whether `user` occupies a seat in either team.
    pub fn contains(&self, user: Uuid) -> bool {
        self.side_of(user).is_some()
    }

    /// The team `user` is seated in, if any.
    pub fn side_of(&self, user: Uuid) -> Option<TeamSide> {
        if self.team_a.contains(&user) {
            Some(TeamSide::A)
        } else if self.team_b.contains(&user) {
            Some(TeamSide::B)
        } else {
            None
        }
    }

    /// Number of seated players across both teams.
    pub fn player_count(&self) -> usize {
        self.team_a.len() + self.team_b.len()
    }

    /// Every seated player, team A first.
    pub fn roster(&self) -> impl Iterator<Item = Uuid> + '_ {
        self.team_a.iter().chain(self.team_b.iter()).copied()
    }

    /// Seat `user` in a team and return the side they ended up in.
    ///
    /// A requested team is honoured only when it has a free seat; without a
    /// request team A is probed first, then team B.
    pub fn join(&mut self, user: Uuid, requested: Option<TeamSide>) -> Result<TeamSide, JoinError> {
        if self.contains(user) {
            return Err(JoinError::AlreadyInGame);
        }

        let a_full = self.team_a.len() >= TEAM_CAPACITY;
        let b_full = self.team_b.len() >= TEAM_CAPACITY;
        if a_full && b_full {
            return Err(JoinError::GameFull);
        }

        let side = match requested {
            Some(TeamSide::A) if a_full => return Err(JoinError::TeamFull(TeamSide::A)),
            Some(TeamSide::B) if b_full => return Err(JoinError::TeamFull(TeamSide::B)),
            Some(side) => side,
            None if !a_full => TeamSide::A,
            None => TeamSide::B,
        };

        match side {
            TeamSide::A => self.team_a.push(user),
            TeamSide::B => self.team_b.push(user),
        }
        self.touch();
        Ok(side)
    }

    /// Unseat `user`, reassigning the host role when the host departs.
    ///
    /// Host handoff picks the first player of team A; when team A is empty the
    /// first player of team B becomes host *and moves into team A*, so a host
    /// always sits in team A after a handoff. Callers must delete the game
    /// when the outcome reports an empty roster.
    pub fn leave(&mut self, user: Uuid) -> Result<LeaveOutcome, LeaveError> {
        let side = self.side_of(user).ok_or(LeaveError::NotInGame)?;
        match side {
            TeamSide::A => self.team_a.retain(|id| *id != user),
            TeamSide::B => self.team_b.retain(|id| *id != user),
        }

        let mut new_host = None;
        if self.host == user {
            if let Some(&first) = self.team_a.first() {
                new_host = Some(first);
            } else if !self.team_b.is_empty() {
                let promoted = self.team_b.remove(0);
                self.team_a.push(promoted);
                new_host = Some(promoted);
            }
            if let Some(host) = new_host {
                self.host = host;
            }
        }

        self.touch();
        Ok(LeaveOutcome {
            new_host,
            roster_empty: self.player_count() == 0,
        })
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

/// Roster-free game summary (subset of [`GameEntity`]) used for listings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GameListItemEntity {
    /// Primary key of the game.
    pub id: Uuid,
    /// When the game is scheduled.
    pub date: SystemTime,
    /// Where the game takes place.
    pub location: String,
    /// Optional locality label complementing `location`.
    pub area: Option<String>,
    /// Number of seated players across both teams.
    pub player_count: usize,
}

impl From<GameEntity> for GameListItemEntity {
    fn from(entity: GameEntity) -> Self {
        let player_count = entity.player_count();
        Self {
            id: entity.id,
            date: entity.date,
            location: entity.location,
            area: entity.area,
            player_count,
        }
    }
}

/// Error raised when a message cannot be appended to a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PostMessageError {
    /// The conversation has not unlocked yet.
    #[error("conversation is locked until all players have joined")]
    Locked,
    /// The author is not a participant of the conversation.
    #[error("user is not part of this conversation")]
    NotParticipant,
    /// The message body is empty once trimmed.
    #[error("message text must not be empty")]
    EmptyText,
}

/// A single chat message inside a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MessageEntity {
    /// Author of the message; a participant at the time of posting.
    pub user: Uuid,
    /// Message body, stored trimmed.
    pub text: String,
    /// When the message was appended.
    pub sent_at: SystemTime,
}

/// The group chat bound one-to-one to a game.
///
/// `is_locked` is derived state: it is recomputed from the participant count
/// on every membership change and never mutated independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConversationEntity {
    /// Primary key of the conversation.
    pub id: Uuid,
    /// The game this conversation belongs to (unique per game).
    pub game: Uuid,
    /// Participants, kept in sync with the game roster.
    pub users: IndexSet<Uuid>,
    /// Messages in append order.
    pub messages: Vec<MessageEntity>,
    /// True while fewer than [`FULL_ROSTER`] participants are present.
    pub is_locked: bool,
    /// Creation timestamp for auditing/debugging.
    pub created_at: SystemTime,
    /// Last time the conversation was mutated.
    pub updated_at: SystemTime,
}

impl ConversationEntity {
    /// Build the conversation for `game` seeded with `initial_users`.
    pub fn new(game: Uuid, initial_users: impl IntoIterator<Item = Uuid>) -> Self {
        let timestamp = SystemTime::now();
        let users: IndexSet<Uuid> = initial_users.into_iter().collect();
        let is_locked = users.len() < FULL_ROSTER;
        Self {
            id: Uuid::new_v4(),
            game,
            users,
            messages: Vec::new(),
            is_locked,
            created_at: timestamp,
            updated_at: timestamp,
        }
    }

    /// Whether `user` participates in this conversation.
    pub fn is_participant(&self, user: Uuid) -> bool {
        self.users.contains(&user)
    }

    /// Add `user` to the participant set and recompute the lock flag.
    ///
    /// Adding an existing participant is a no-op.
    pub fn add_user(&mut self, user: Uuid) {
        if self.users.insert(user) {
            self.refresh_lock();
            self.touch();
        }
    }

    /// Remove `user` from the participant set and recompute the lock flag.
    ///
    /// The conversation re-locks when membership drops below [`FULL_ROSTER`];
    /// messages posted while it was unlocked are kept.
    pub fn remove_user(&mut self, user: Uuid) {
        if self.users.shift_remove(&user) {
            self.refresh_lock();
            self.touch();
        }
    }

    /// Append a message from `user`, enforcing the lock and membership gates.
    pub fn post(&mut self, user: Uuid, text: &str) -> Result<(), PostMessageError> {
        if self.is_locked {
            return Err(PostMessageError::Locked);
        }
        if !self.is_participant(user) {
            return Err(PostMessageError::NotParticipant);
        }
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(PostMessageError::EmptyText);
        }

        self.messages.push(MessageEntity {
            user,
            text: trimmed.to_owned(),
            sent_at: SystemTime::now(),
        });
        self.touch();
        Ok(())
    }

    fn refresh_lock(&mut self) {
        self.is_locked = self.users.len() < FULL_ROSTER;
    }

    /// Refresh the update timestamp.
    pub fn touch(&mut self) {
        self.updated_at = SystemTime::now();
    }
}

/// Account data resolved from the read-only users collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UserEntity {
    /// Primary key of the user.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact e-mail address.
    pub email: String,
}
