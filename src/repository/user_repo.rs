use crate::config::mongo_conf::MongoConfig;
use crate::model::blood_request::BloodGroup;
use crate::model::user::{Role, User};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use tracing::{error, info, instrument};

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn insert(&self, user: User) -> RepositoryResult<User>;
    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>>;
    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>>;
    async fn list(&self) -> RepositoryResult<Vec<User>>;
    async fn update_role(&self, id: &ObjectId, role: Role) -> RepositoryResult<User>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
    async fn count_by_role(&self, role: Role) -> RepositoryResult<u64>;
    async fn find_donors_by_blood_group(&self, blood_group: BloodGroup) -> RepositoryResult<Vec<User>>;
}

pub struct MongoUserRepository {
    collection: mongodb::Collection<User>,
}

impl MongoUserRepository {
    pub fn new(db: &mongodb::Database, config: &MongoConfig) -> Self {
        MongoUserRepository { collection: db.collection::<User>(&config.user_collection) }
    }

    async fn collect(&self, filter: bson::Document) -> RepositoryResult<Vec<User>> {
        let mut cursor = self
            .collection
            .find(filter, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list users: {}", e)))?;
        let mut users = Vec::new();
        while let Some(user) = cursor.next().await {
            match user {
                Ok(u) => users.push(u),
                Err(e) => {
                    error!("Failed to deserialize user: {}", e);
                    return Err(RepositoryError::serialization(format!("Failed to deserialize user: {}", e)));
                }
            }
        }
        Ok(users)
    }
}

#[async_trait]
impl UserRepository for MongoUserRepository {
    #[instrument(skip(self, user), fields(email = %user.email, role = %user.role))]
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        user.id = Some(ObjectId::new());
        let now = chrono::Local::now().to_rfc3339();
        user.created_at = Some(now.clone());
        user.updated_at = Some(now);
        self.collection.insert_one(user.clone(), None).await.map_err(|e| {
            error!("Failed to insert user: {}", e);
            RepositoryError::from(e)
        })?;
        info!("User inserted");
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.collection
            .find_one(doc! { "email": email }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by email: {}", e)))
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to find user by id: {}", e)))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<User>> {
        let users = self.collect(doc! {}).await?;
        info!("Fetched {} users", users.len());
        Ok(users)
    }

    #[instrument(skip(self))]
    async fn update_role(&self, id: &ObjectId, role: Role) -> RepositoryResult<User> {
        let update = doc! { "$set": { "role": role.as_str(), "updated_at": chrono::Local::now().to_rfc3339() } };
        let result = self
            .collection
            .update_one(doc! { "_id": id }, update, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to update role: {}", e)))?;
        if result.matched_count == 0 {
            return Err(RepositoryError::not_found(format!("User not found: {}", id)));
        }
        info!("Role updated to {}", role);
        self.find_by_id(id)
            .await?
            .ok_or_else(|| RepositoryError::not_found(format!("User not found: {}", id)))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete user: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("User not found: {}", id)));
        }
        info!("User deleted");
        Ok(())
    }

    async fn count_by_role(&self, role: Role) -> RepositoryResult<u64> {
        self.collection
            .count_documents(doc! { "role": role.as_str() }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count users: {}", e)))
    }

    #[instrument(skip(self))]
    async fn find_donors_by_blood_group(&self, blood_group: BloodGroup) -> RepositoryResult<Vec<User>> {
        self.collect(doc! { "role": Role::Donor.as_str(), "blood_group": blood_group.as_str() }).await
    }
}
