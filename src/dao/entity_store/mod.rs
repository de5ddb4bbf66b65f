#[cfg(test)]
pub mod memory;
pub mod mongodb;

use crate::dao::models::{ConversationEntity, GameEntity, GameListItemEntity, UserEntity};
use crate::dao::storage::StorageResult;
use futures::future::BoxFuture;
use uuid::Uuid;

/// Abstraction over the persistence layer for games, conversations and users.
///
/// Game listings come back ordered by scheduled date, oldest first. The users
/// collection is read-only from this service's point of view; accounts are
/// managed elsewhere.
pub trait EntityStore: Send + Sync {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>>;
    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>>;
    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>>;
    fn save_conversation(
        &self,
        conversation: ConversationEntity,
    ) -> BoxFuture<'static, StorageResult<()>>;
    fn find_conversation(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ConversationEntity>>>;
    fn find_conversation_by_game(
        &self,
        game: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ConversationEntity>>>;
    fn delete_conversation_by_game(&self, game: Uuid) -> BoxFuture<'static, StorageResult<bool>>;
    fn list_conversations(
        &self,
        game: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ConversationEntity>>>;
    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>>;
    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}
