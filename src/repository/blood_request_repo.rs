use crate::config::mongo_conf::MongoConfig;
use crate::model::blood_request::{BloodRequest, RequestStatus};
use crate::repository::repository_error::{RepositoryError, RepositoryResult};
use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::stream::StreamExt;
use mongodb::options::FindOptions;
use tracing::{error, info, instrument, warn};

#[async_trait]
pub trait BloodRequestRepository: Send + Sync {
    async fn create(&self, request: BloodRequest) -> RepositoryResult<BloodRequest>;
    async fn get_by_id(&self, id: &ObjectId) -> RepositoryResult<BloodRequest>;
    /// Newest first.
    async fn list(&self) -> RepositoryResult<Vec<BloodRequest>>;
    async fn list_by_requester_email(&self, email: &str) -> RepositoryResult<Vec<BloodRequest>>;
    /// Writes only while the stored status is still `expected`; otherwise `Conflict`.
    async fn update(&self, id: &ObjectId, expected: RequestStatus, request: BloodRequest) -> RepositoryResult<BloodRequest>;
    /// Moves `from` to `to` only while the stored status is still `from`; otherwise `Conflict`.
    async fn update_status(&self, id: &ObjectId, from: RequestStatus, to: RequestStatus) -> RepositoryResult<BloodRequest>;
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()>;
    async fn count_by_status(&self, status: RequestStatus) -> RepositoryResult<u64>;
}

pub struct MongoBloodRequestRepository {
    collection: mongodb::Collection<BloodRequest>,
}

impl MongoBloodRequestRepository {
    pub fn new(db: &mongodb::Database, config: &MongoConfig) -> Self {
        MongoBloodRequestRepository { collection: db.collection::<BloodRequest>(&config.request_collection) }
    }

    async fn collect(&self, filter: bson::Document) -> RepositoryResult<Vec<BloodRequest>> {
        let options = FindOptions::builder().sort(doc! { "createdAt": -1 }).build();
        let mut cursor = self
            .collection
            .find(filter, options)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to list blood requests: {}", e)))?;
        let mut requests = Vec::new();
        while let Some(request) = cursor.next().await {
            match request {
                Ok(r) => requests.push(r),
                Err(e) => {
                    error!("Failed to deserialize blood request: {}", e);
                    return Err(RepositoryError::serialization(format!("Failed to deserialize blood request: {}", e)));
                }
            }
        }
        Ok(requests)
    }

    async fn set_fields(
        &self,
        id: &ObjectId,
        expected: RequestStatus,
        mut fields: bson::Document,
    ) -> RepositoryResult<BloodRequest> {
        fields.insert("updatedAt", chrono::Local::now().to_rfc3339());
        let result = self
            .collection
            .update_one(doc! { "_id": id, "status": expected.as_str() }, doc! { "$set": fields }, None)
            .await
            .map_err(|e| {
                error!("Failed to update blood request: {}", e);
                RepositoryError::database(format!("Failed to update blood request: {}", e))
            })?;
        if result.matched_count == 0 {
            // either gone, or moved on since it was read
            let current = self.get_by_id(id).await?;
            warn!("Blood request is {} now, expected {}", current.status, expected);
            return Err(RepositoryError::conflict(format!(
                "Blood request status changed to '{}' meanwhile",
                current.status
            )));
        }
        self.get_by_id(id).await
    }
}

#[async_trait]
impl BloodRequestRepository for MongoBloodRequestRepository {
    #[instrument(skip(self, request), fields(blood_group = %request.blood_group, urgency = %request.urgency))]
    async fn create(&self, mut request: BloodRequest) -> RepositoryResult<BloodRequest> {
        request.id = Some(ObjectId::new());
        let now = chrono::Local::now().to_rfc3339();
        request.created_at = Some(now.clone());
        request.updated_at = Some(now);
        self.collection.insert_one(request.clone(), None).await.map_err(|e| {
            error!("Failed to create blood request: {}", e);
            RepositoryError::database(format!("Failed to create blood request: {}", e))
        })?;
        info!("Blood request created");
        Ok(request)
    }

    async fn get_by_id(&self, id: &ObjectId) -> RepositoryResult<BloodRequest> {
        self.collection
            .find_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to get blood request: {}", e)))?
            .ok_or_else(|| RepositoryError::not_found(format!("Blood request not found: {}", id)))
    }

    #[instrument(skip(self))]
    async fn list(&self) -> RepositoryResult<Vec<BloodRequest>> {
        let requests = self.collect(doc! {}).await?;
        info!("Fetched {} blood requests", requests.len());
        Ok(requests)
    }

    #[instrument(skip(self))]
    async fn list_by_requester_email(&self, email: &str) -> RepositoryResult<Vec<BloodRequest>> {
        self.collect(doc! { "requesterEmail": email }).await
    }

    #[instrument(skip(self, request))]
    async fn update(&self, id: &ObjectId, expected: RequestStatus, request: BloodRequest) -> RepositoryResult<BloodRequest> {
        let mut fields = bson::to_document(&request)?;
        for key in ["_id", "createdAt", "updatedAt"] {
            fields.remove(key);
        }
        self.set_fields(id, expected, fields).await
    }

    #[instrument(skip(self))]
    async fn update_status(&self, id: &ObjectId, from: RequestStatus, to: RequestStatus) -> RepositoryResult<BloodRequest> {
        let updated = self.set_fields(id, from, doc! { "status": to.as_str() }).await?;
        info!("Blood request status set to {}", to);
        Ok(updated)
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to delete blood request: {}", e)))?;
        if result.deleted_count == 0 {
            return Err(RepositoryError::not_found(format!("Blood request not found: {}", id)));
        }
        info!("Blood request deleted");
        Ok(())
    }

    async fn count_by_status(&self, status: RequestStatus) -> RepositoryResult<u64> {
        self.collection
            .count_documents(doc! { "status": status.as_str() }, None)
            .await
            .map_err(|e| RepositoryError::database(format!("Failed to count blood requests: {}", e)))
    }
}
