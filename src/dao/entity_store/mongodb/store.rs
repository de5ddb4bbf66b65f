use futures::{TryStreamExt, future::BoxFuture};
use mongodb::{Collection, Database, bson::doc, options::IndexOptions};
use uuid::Uuid;

use super::{
    config::MongoConfig,
    connection::establish_connection,
    error::{MongoDaoError, MongoResult},
    models::{
        MongoConversationDocument, MongoGameDocument, MongoUserDocument, doc_id, uuid_as_binary,
    },
};
use crate::dao::{
    entity_store::EntityStore,
    models::{ConversationEntity, GameEntity, GameListItemEntity, UserEntity},
    storage::StorageResult,
};

const GAME_COLLECTION_NAME: &str = "games";
const CONVERSATION_COLLECTION_NAME: &str = "conversations";
const USER_COLLECTION_NAME: &str = "users";

/// MongoDB-backed [`EntityStore`].
///
/// The handle is cheap to clone; a broken connection is replaced by building
/// a fresh store rather than by patching this one.
#[derive(Clone)]
pub struct MongoEntityStore {
    database: Database,
}

impl MongoEntityStore {
    /// Establish a connection to MongoDB and ensure indexes are present.
    pub async fn connect(config: MongoConfig) -> MongoResult<Self> {
        let (_client, database) =
            establish_connection(&config.options, &config.database_name).await?;

        let store = Self { database };
        store.ensure_indexes().await?;
        Ok(store)
    }

    async fn ensure_indexes(&self) -> MongoResult<()> {
        // Listings sort on the scheduled date.
        let games = self
            .database
            .collection::<mongodb::bson::Document>(GAME_COLLECTION_NAME);
        let date_index = mongodb::IndexModel::builder()
            .keys(doc! {"date": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("game_date_idx".to_owned()))
                    .build(),
            )
            .build();

        games
            .create_index(date_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: GAME_COLLECTION_NAME,
                index: "date",
                source,
            })?;

        // One conversation per game; lookups by game must be cheap and unique.
        let conversations = self
            .database
            .collection::<mongodb::bson::Document>(CONVERSATION_COLLECTION_NAME);
        let game_index = mongodb::IndexModel::builder()
            .keys(doc! {"game": 1})
            .options(
                IndexOptions::builder()
                    .name(Some("conversation_game_idx".to_owned()))
                    .unique(Some(true))
                    .build(),
            )
            .build();

        conversations
            .create_index(game_index)
            .await
            .map_err(|source| MongoDaoError::EnsureIndex {
                collection: CONVERSATION_COLLECTION_NAME,
                index: "game",
                source,
            })?;

        Ok(())
    }

    async fn ping(&self) -> MongoResult<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|source| MongoDaoError::HealthPing { source })?;
        Ok(())
    }

    fn game_collection(&self) -> Collection<MongoGameDocument> {
        self.database.collection(GAME_COLLECTION_NAME)
    }

    fn conversation_collection(&self) -> Collection<MongoConversationDocument> {
        self.database.collection(CONVERSATION_COLLECTION_NAME)
    }

    fn user_collection(&self) -> Collection<MongoUserDocument> {
        self.database.collection(USER_COLLECTION_NAME)
    }

    async fn save_game(&self, game: GameEntity) -> MongoResult<()> {
        let id = game.id;
        let document: MongoGameDocument = game.into();
        self.game_collection()
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveGame { id, source })?;

        Ok(())
    }

    async fn find_game(&self, id: Uuid) -> MongoResult<Option<GameEntity>> {
        let document = self
            .game_collection()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadGame { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn delete_game(&self, id: Uuid) -> MongoResult<bool> {
        let result = self
            .game_collection()
            .delete_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::DeleteGame { id, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn list_games(&self) -> MongoResult<Vec<GameListItemEntity>> {
        let documents: Vec<MongoGameDocument> = self
            .game_collection()
            .find(doc! {})
            .sort(doc! {"date": 1})
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListGames { source })?;

        Ok(documents
            .into_iter()
            .map(|document| {
                let entity: GameEntity = document.into();
                entity.into()
            })
            .collect())
    }

    async fn save_conversation(&self, conversation: ConversationEntity) -> MongoResult<()> {
        let id = conversation.id;
        let document: MongoConversationDocument = conversation.into();
        self.conversation_collection()
            .replace_one(doc_id(id), &document)
            .upsert(true)
            .await
            .map_err(|source| MongoDaoError::SaveConversation { id, source })?;

        Ok(())
    }

    async fn find_conversation(&self, id: Uuid) -> MongoResult<Option<ConversationEntity>> {
        let document = self
            .conversation_collection()
            .find_one(doc_id(id))
            .await
            .map_err(|source| MongoDaoError::LoadConversation { id, source })?;

        Ok(document.map(Into::into))
    }

    async fn find_conversation_by_game(
        &self,
        game: Uuid,
    ) -> MongoResult<Option<ConversationEntity>> {
        let document = self
            .conversation_collection()
            .find_one(doc! { "game": uuid_as_binary(game) })
            .await
            .map_err(|source| MongoDaoError::LoadConversationByGame { game, source })?;

        Ok(document.map(Into::into))
    }

    async fn delete_conversation_by_game(&self, game: Uuid) -> MongoResult<bool> {
        let result = self
            .conversation_collection()
            .delete_one(doc! { "game": uuid_as_binary(game) })
            .await
            .map_err(|source| MongoDaoError::DeleteConversationByGame { game, source })?;
        Ok(result.deleted_count > 0)
    }

    async fn list_conversations(&self, game: Option<Uuid>) -> MongoResult<Vec<ConversationEntity>> {
        let filter = match game {
            Some(game) => doc! { "game": uuid_as_binary(game) },
            None => doc! {},
        };

        let documents: Vec<MongoConversationDocument> = self
            .conversation_collection()
            .find(filter)
            .await
            .map_err(|source| MongoDaoError::ListConversations { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::ListConversations { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }

    async fn find_users(&self, ids: Vec<Uuid>) -> MongoResult<Vec<UserEntity>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let keys: Vec<_> = ids.into_iter().map(uuid_as_binary).collect();
        let documents: Vec<MongoUserDocument> = self
            .user_collection()
            .find(doc! { "_id": { "$in": keys } })
            .await
            .map_err(|source| MongoDaoError::LoadUsers { source })?
            .try_collect()
            .await
            .map_err(|source| MongoDaoError::LoadUsers { source })?;

        Ok(documents.into_iter().map(Into::into).collect())
    }
}

impl EntityStore for MongoEntityStore {
    fn save_game(&self, game: GameEntity) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_game(game).await.map_err(Into::into) })
    }

    fn find_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<Option<GameEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game(id).await.map_err(Into::into) })
    }

    fn delete_game(&self, id: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game(id).await.map_err(Into::into) })
    }

    fn list_games(&self) -> BoxFuture<'static, StorageResult<Vec<GameListItemEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_games().await.map_err(Into::into) })
    }

    fn save_conversation(
        &self,
        conversation: ConversationEntity,
    ) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.save_conversation(conversation).await.map_err(Into::into) })
    }

    fn find_conversation(
        &self,
        id: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ConversationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_conversation(id).await.map_err(Into::into) })
    }

    fn find_conversation_by_game(
        &self,
        game: Uuid,
    ) -> BoxFuture<'static, StorageResult<Option<ConversationEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .find_conversation_by_game(game)
                .await
                .map_err(Into::into)
        })
    }

    fn delete_conversation_by_game(&self, game: Uuid) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .delete_conversation_by_game(game)
                .await
                .map_err(Into::into)
        })
    }

    fn list_conversations(
        &self,
        game: Option<Uuid>,
    ) -> BoxFuture<'static, StorageResult<Vec<ConversationEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_conversations(game).await.map_err(Into::into) })
    }

    fn find_users(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<UserEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_users(ids).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}
