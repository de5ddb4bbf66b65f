use indexmap::IndexSet;
use mongodb::bson::{Binary, DateTime, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::models::{ConversationEntity, GameEntity, MessageEntity, UserEntity};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoGameDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    team_a: Vec<Uuid>,
    team_b: Vec<Uuid>,
    location: String,
    area: Option<String>,
    date: DateTime,
    host: Uuid,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<GameEntity> for MongoGameDocument {
    fn from(value: GameEntity) -> Self {
        Self {
            id: value.id,
            team_a: value.team_a,
            team_b: value.team_b,
            location: value.location,
            area: value.area,
            date: DateTime::from_system_time(value.date),
            host: value.host,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoGameDocument> for GameEntity {
    fn from(value: MongoGameDocument) -> Self {
        Self {
            id: value.id,
            team_a: value.team_a,
            team_b: value.team_b,
            location: value.location,
            area: value.area,
            date: value.date.to_system_time(),
            host: value.host,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessageDocument {
    user: Uuid,
    text: String,
    sent_at: DateTime,
}

impl From<MessageEntity> for MongoMessageDocument {
    fn from(value: MessageEntity) -> Self {
        Self {
            user: value.user,
            text: value.text,
            sent_at: DateTime::from_system_time(value.sent_at),
        }
    }
}

impl From<MongoMessageDocument> for MessageEntity {
    fn from(value: MongoMessageDocument) -> Self {
        Self {
            user: value.user,
            text: value.text,
            sent_at: value.sent_at.to_system_time(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoConversationDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    game: Uuid,
    users: Vec<Uuid>,
    messages: Vec<MongoMessageDocument>,
    is_locked: bool,
    created_at: DateTime,
    updated_at: DateTime,
}

impl From<ConversationEntity> for MongoConversationDocument {
    fn from(value: ConversationEntity) -> Self {
        Self {
            id: value.id,
            game: value.game,
            users: value.users.into_iter().collect(),
            messages: value.messages.into_iter().map(Into::into).collect(),
            is_locked: value.is_locked,
            created_at: DateTime::from_system_time(value.created_at),
            updated_at: DateTime::from_system_time(value.updated_at),
        }
    }
}

impl From<MongoConversationDocument> for ConversationEntity {
    fn from(value: MongoConversationDocument) -> Self {
        Self {
            id: value.id,
            game: value.game,
            users: value.users.into_iter().collect::<IndexSet<Uuid>>(),
            messages: value.messages.into_iter().map(Into::into).collect(),
            is_locked: value.is_locked,
            created_at: value.created_at.to_system_time(),
            updated_at: value.updated_at.to_system_time(),
        }
    }
}

/// Account document owned by the account service; read here for display data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoUserDocument {
    #[serde(rename = "_id")]
    id: Uuid,
    name: String,
    email: String,
}

impl From<MongoUserDocument> for UserEntity {
    fn from(value: MongoUserDocument) -> Self {
        Self {
            id: value.id,
            name: value.name,
            email: value.email,
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}
