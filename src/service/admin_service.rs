use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::admin_dto::{
    AdminMutationResponse, DashboardSnapshot, DeleteConfirmation, DeletedUser, Notice,
};
use crate::dto::request_dto::BloodRequestView;
use crate::dto::user_dto::UserView;
use crate::model::blood_request::{BloodRequest, RequestStatus};
use crate::model::dashboard::DashboardStats;
use crate::model::user::Role;
use crate::repository::blood_request_repo::BloodRequestRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::parse_object_id;
use crate::util::error::ServiceError;
use crate::util::notifier::{RequestNotifier, StatusNotification};

pub const REFRESH_FAILED: &str = "Failed to load dashboard data";
pub const NO_REQUESTER_EMAIL: &str = "No email found for this requester";
pub const NOTIFICATION_FAILED: &str = "Failed to send email notification";

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn list_users(&self) -> Result<Vec<UserView>, ServiceError>;
    async fn list_requests(&self) -> Result<Vec<BloodRequestView>, ServiceError>;
    async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError>;
    async fn snapshot(&self) -> Result<DashboardSnapshot, ServiceError>;
    async fn update_user_role(&self, id: &str, role: &str) -> Result<AdminMutationResponse<UserView>, ServiceError>;
    async fn delete_user(
        &self,
        id: &str,
        confirmation: DeleteConfirmation,
    ) -> Result<AdminMutationResponse<DeletedUser>, ServiceError>;
    async fn update_request_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<AdminMutationResponse<BloodRequestView>, ServiceError>;
}

pub struct AdminServiceImpl {
    pub user_repo: Arc<dyn UserRepository>,
    pub request_repo: Arc<dyn BloodRequestRepository>,
    pub notifier: Arc<dyn RequestNotifier>,
    pub coordination_phone: String,
}

impl AdminServiceImpl {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        request_repo: Arc<dyn BloodRequestRepository>,
        notifier: Arc<dyn RequestNotifier>,
        coordination_phone: String,
    ) -> Self {
        Self { user_repo, request_repo, notifier, coordination_phone }
    }

    /// Re-queries the full dashboard after a mutation. A failed refresh never
    /// fails the mutation that preceded it.
    async fn respond<T: Send>(&self, result: T, mut notices: Vec<Notice>) -> AdminMutationResponse<T> {
        let snapshot = match self.snapshot().await {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                error!("Failed to refresh dashboard after mutation: {e}");
                notices.push(Notice::error(REFRESH_FAILED));
                None
            }
        };
        AdminMutationResponse { result, notices, snapshot }
    }

    async fn notify_requester(&self, request: &BloodRequest, status: RequestStatus) -> Notice {
        let Some(notification) = StatusNotification::for_request(request, status, &self.coordination_phone) else {
            warn!("Request has no requester email, skipping notification");
            return Notice::warning(NO_REQUESTER_EMAIL);
        };
        let to = notification.to_email.clone();
        match self.notifier.notify_status(notification).await {
            Ok(()) => Notice::info(format!("Email notification sent to {to}")),
            Err(e) => {
                error!("Failed to send status notification: {e}");
                Notice::error(NOTIFICATION_FAILED)
            }
        }
    }
}

#[async_trait]
impl AdminService for AdminServiceImpl {
    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<UserView>, ServiceError> {
        let users = self.user_repo.list().await.map_err(|e| {
            error!("Failed to list users: {e}");
            ServiceError::from(e)
        })?;
        Ok(users.into_iter().map(UserView::from).collect())
    }

    #[instrument(skip(self))]
    async fn list_requests(&self) -> Result<Vec<BloodRequestView>, ServiceError> {
        let requests = self.request_repo.list().await.map_err(|e| {
            error!("Failed to list blood requests: {e}");
            ServiceError::from(e)
        })?;
        Ok(requests.into_iter().map(BloodRequestView::from).collect())
    }

    #[instrument(skip(self))]
    async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        Ok(DashboardStats {
            total_donors: self.user_repo.count_by_role(Role::Donor).await?,
            total_receivers: self.user_repo.count_by_role(Role::Receiver).await?,
            pending_requests: self.request_repo.count_by_status(RequestStatus::Pending).await?,
            fulfilled_requests: self.request_repo.count_by_status(RequestStatus::Fulfilled).await?,
        })
    }

    async fn snapshot(&self) -> Result<DashboardSnapshot, ServiceError> {
        Ok(DashboardSnapshot {
            users: self.list_users().await?,
            requests: self.list_requests().await?,
            stats: self.dashboard_stats().await?,
        })
    }

    #[instrument(skip(self))]
    async fn update_user_role(&self, id: &str, role: &str) -> Result<AdminMutationResponse<UserView>, ServiceError> {
        let role = role.parse::<Role>()?;
        let id = parse_object_id(id)?;
        let updated = self.user_repo.update_role(&id, role).await.map_err(|e| {
            error!("Failed to update user role: {e}");
            ServiceError::from(e)
        })?;
        info!("User role updated to {role}");
        Ok(self.respond(UserView::from(updated), vec![Notice::success("User role updated!")]).await)
    }

    #[instrument(skip(self))]
    async fn delete_user(
        &self,
        id: &str,
        confirmation: DeleteConfirmation,
    ) -> Result<AdminMutationResponse<DeletedUser>, ServiceError> {
        if confirmation != DeleteConfirmation::Confirmed {
            info!("User deletion not confirmed");
            return Err(ServiceError::InvalidInput("Deleting a user requires confirmation".to_string()));
        }
        let object_id = parse_object_id(id)?;
        self.user_repo.delete(&object_id).await.map_err(|e| {
            error!("Failed to delete user: {e}");
            ServiceError::from(e)
        })?;
        info!("User deleted");
        let deleted = DeletedUser { id: object_id.to_hex() };
        Ok(self.respond(deleted, vec![Notice::success("User deleted successfully!")]).await)
    }

    #[instrument(skip(self))]
    async fn update_request_status(
        &self,
        id: &str,
        status: &str,
    ) -> Result<AdminMutationResponse<BloodRequestView>, ServiceError> {
        let next = status.parse::<RequestStatus>()?;
        let object_id = parse_object_id(id)?;
        let current = self.request_repo.get_by_id(&object_id).await?;
        let next = current.status.transition_to(next).map_err(|e| {
            warn!("Rejected status change: {e}");
            ServiceError::from(e)
        })?;

        let updated = self
            .request_repo
            .update_status(&object_id, current.status, next)
            .await
            .map_err(|e| {
                error!("Failed to update request status: {e}");
                ServiceError::from(e)
            })?;
        info!("Request status updated to {next}");

        let notices = vec![
            Notice::success("Request status updated!"),
            self.notify_requester(&updated, next).await,
        ];
        Ok(self.respond(BloodRequestView::from(updated), notices).await)
    }
}
