//! Error types shared by the MongoDB storage implementation.

use thiserror::Error;
use uuid::Uuid;

/// Convenient result alias returning [`MongoDaoError`] failures.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures that can occur while interacting with MongoDB.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection string could not be parsed.
    #[error("invalid MongoDB connection string `{uri}`")]
    InvalidUri {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },
    /// Building the client from parsed options failed.
    #[error("failed to construct MongoDB client")]
    ClientConstruction {
        #[source]
        source: mongodb::error::Error,
    },
    /// The server never answered the ping during connection establishment.
    #[error("MongoDB did not answer the initial ping after {attempts} attempts")]
    InitialPing {
        attempts: u32,
        #[source]
        source: mongodb::error::Error,
    },
    /// A routine health ping failed on an established connection.
    #[error("MongoDB health ping failed")]
    HealthPing {
        #[source]
        source: mongodb::error::Error,
    },
    /// Index creation failed at connect time.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        collection: &'static str,
        index: &'static str,
        #[source]
        source: mongodb::error::Error,
    },
    /// A game document could not be written.
    #[error("failed to save game {id}")]
    SaveGame {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// A game document could not be read.
    #[error("failed to load game {id}")]
    LoadGame {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// A game document could not be deleted.
    #[error("failed to delete game {id}")]
    DeleteGame {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// The game listing query failed.
    #[error("failed to list games")]
    ListGames {
        #[source]
        source: mongodb::error::Error,
    },
    /// A conversation document could not be written.
    #[error("failed to save conversation {id}")]
    SaveConversation {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// A conversation document could not be read.
    #[error("failed to load conversation {id}")]
    LoadConversation {
        id: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// The conversation lookup by owning game failed.
    #[error("failed to load conversation for game {game}")]
    LoadConversationByGame {
        game: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// The conversation deletion by owning game failed.
    #[error("failed to delete conversation for game {game}")]
    DeleteConversationByGame {
        game: Uuid,
        #[source]
        source: mongodb::error::Error,
    },
    /// The conversation listing query failed.
    #[error("failed to list conversations")]
    ListConversations {
        #[source]
        source: mongodb::error::Error,
    },
    /// The display-data lookup on the users collection failed.
    #[error("failed to load users")]
    LoadUsers {
        #[source]
        source: mongodb::error::Error,
    },
}
