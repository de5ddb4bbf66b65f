use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    dao::models::{ConversationEntity, MessageEntity, UserEntity},
    dto::{format_system_time, game::UserRef},
};

/// Body of a message post. Emptiness is checked by the conversation itself so
/// the lock and membership gates run first.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PostMessageRequest {
    /// Message text.
    pub message: String,
}

/// Query filter for the conversation listing.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ConversationFilter {
    /// Restrict the listing to the conversation of one game.
    pub game: Option<Uuid>,
}

/// A message with its author left as a raw id.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageSummary {
    pub user: Uuid,
    pub text: String,
    /// When the message was appended, RFC 3339.
    pub sent_at: String,
}

impl From<MessageEntity> for MessageSummary {
    fn from(entity: MessageEntity) -> Self {
        Self {
            user: entity.user,
            text: entity.text,
            sent_at: format_system_time(entity.sent_at),
        }
    }
}

/// A message with its author resolved to display data.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageDetail {
    pub user: UserRef,
    pub text: String,
    /// When the message was appended, RFC 3339.
    pub sent_at: String,
}

/// Conversation as stored, with raw participant ids.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationSummary {
    pub id: Uuid,
    /// Game this conversation belongs to.
    pub game: Uuid,
    pub users: Vec<Uuid>,
    pub messages: Vec<MessageSummary>,
    pub is_locked: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ConversationEntity> for ConversationSummary {
    fn from(entity: ConversationEntity) -> Self {
        Self {
            id: entity.id,
            game: entity.game,
            users: entity.users.into_iter().collect(),
            messages: entity.messages.into_iter().map(Into::into).collect(),
            is_locked: entity.is_locked,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Conversation with participants and authors resolved to display data.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationDetail {
    pub id: Uuid,
    /// Game this conversation belongs to.
    pub game: Uuid,
    pub users: Vec<UserRef>,
    pub messages: Vec<MessageDetail>,
    pub is_locked: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl ConversationDetail {
    /// Attach resolved display data to a conversation.
    pub fn resolve(entity: ConversationEntity, users: &HashMap<Uuid, UserEntity>) -> Self {
        Self {
            id: entity.id,
            game: entity.game,
            users: entity
                .users
                .iter()
                .map(|id| UserRef::resolve(*id, users))
                .collect(),
            messages: entity
                .messages
                .into_iter()
                .map(|message| MessageDetail {
                    user: UserRef::resolve(message.user, users),
                    text: message.text,
                    sent_at: format_system_time(message.sent_at),
                })
                .collect(),
            is_locked: entity.is_locked,
            created_at: format_system_time(entity.created_at),
            updated_at: format_system_time(entity.updated_at),
        }
    }
}

/// Entry of the conversations listing. Message bodies stay private to
/// participants; only the count is exposed here.
#[derive(Debug, Serialize, ToSchema)]
pub struct ConversationListItem {
    pub id: Uuid,
    /// Game this conversation belongs to.
    pub game: Uuid,
    pub users: Vec<Uuid>,
    pub is_locked: bool,
    pub message_count: usize,
}

impl From<ConversationEntity> for ConversationListItem {
    fn from(entity: ConversationEntity) -> Self {
        Self {
            id: entity.id,
            game: entity.game,
            users: entity.users.into_iter().collect(),
            is_locked: entity.is_locked,
            message_count: entity.messages.len(),
        }
    }
}
