use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

use crate::dto::request_dto::{
    BloodRequestForm, BloodRequestView, DonorEmailsResponse, SubmissionResponse, UpdateBloodRequest,
};
use crate::model::blood_request::{
    is_valid_contact, resolve_amount, AmountStatus, BloodGroup, BloodRequest, RequestStatus, Urgency,
};
use crate::model::user::Role;
use crate::repository::blood_request_repo::BloodRequestRepository;
use crate::repository::user_repo::UserRepository;
use crate::service::parse_object_id;
use crate::util::error::ServiceError;
use crate::util::payment::{PaymentCharge, PaymentGateway, PaymentPrompt};
use crate::util::session::{AuthenticatedUser, Session};

pub const LOGIN_REQUIRED: &str = "Please login to submit a request.";
pub const NOT_YOUR_REQUEST: &str = "You can only change your own requests";
pub const STATUS_IS_ADMIN_ONLY: &str = "Request status is changed from the admin dashboard";

#[async_trait]
pub trait ReceiverService: Send + Sync {
    /// Price the form without charging or persisting anything.
    async fn quote(&self, session: &Session, form: &BloodRequestForm) -> Result<PaymentPrompt, ServiceError>;
    /// Charge the quoted amount, then create the request as paid and pending.
    async fn submit(&self, session: &Session, form: BloodRequestForm) -> Result<SubmissionResponse, ServiceError>;
    async fn requests_for(&self, email: &str) -> Result<Vec<BloodRequestView>, ServiceError>;
    /// Owner or admin only. The status itself can not be moved here.
    async fn update_request(
        &self,
        session: &Session,
        id: &str,
        update: UpdateBloodRequest,
    ) -> Result<BloodRequestView, ServiceError>;
    /// Owner or admin only.
    async fn delete_request(&self, session: &Session, id: &str) -> Result<(), ServiceError>;
    async fn donors_by_blood_group(&self, blood_group: &str) -> Result<DonorEmailsResponse, ServiceError>;
}

pub struct ReceiverServiceImpl {
    pub request_repo: Arc<dyn BloodRequestRepository>,
    pub user_repo: Arc<dyn UserRepository>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub currency: String,
}

impl ReceiverServiceImpl {
    pub fn new(
        request_repo: Arc<dyn BloodRequestRepository>,
        user_repo: Arc<dyn UserRepository>,
        gateway: Arc<dyn PaymentGateway>,
        currency: String,
    ) -> Self {
        Self { request_repo, user_repo, gateway, currency }
    }

    fn require_login(session: &Session) -> Result<&AuthenticatedUser, ServiceError> {
        session.user().ok_or_else(|| {
            warn!("Blood request attempted without a session");
            ServiceError::Unauthenticated(LOGIN_REQUIRED.to_string())
        })
    }

    fn require_owner_or_admin(caller: &AuthenticatedUser, request: &BloodRequest) -> Result<(), ServiceError> {
        let owns = request
            .notification_address()
            .is_some_and(|email| email.eq_ignore_ascii_case(caller.email.trim()));
        if owns || caller.role == Role::Admin {
            return Ok(());
        }
        warn!(email = %caller.email, role = %caller.role, "Rejected change to someone else's request");
        Err(ServiceError::Forbidden(NOT_YOUR_REQUEST.to_string()))
    }

    fn prompt_for(&self, urgency: Urgency) -> PaymentPrompt {
        PaymentPrompt { amount: resolve_amount(urgency, None), currency: self.currency.clone() }
    }
}

#[async_trait]
impl ReceiverService for ReceiverServiceImpl {
    #[instrument(skip(self, session, form), fields(urgency = %form.urgency))]
    async fn quote(&self, session: &Session, form: &BloodRequestForm) -> Result<PaymentPrompt, ServiceError> {
        Self::require_login(session)?;
        Ok(self.prompt_for(form.urgency))
    }

    #[instrument(skip(self, session, form), fields(blood_group = %form.blood_group, urgency = %form.urgency))]
    async fn submit(&self, session: &Session, form: BloodRequestForm) -> Result<SubmissionResponse, ServiceError> {
        let caller = Self::require_login(session)?;
        let requester = self
            .user_repo
            .find_by_email(&caller.email)
            .await?
            .ok_or_else(|| ServiceError::NotFound("Receiver not found".to_string()))?;

        let prompt = self.prompt_for(form.urgency);
        let receipt = self
            .gateway
            .charge(PaymentCharge {
                payer_email: requester.email.clone(),
                amount: prompt.amount,
                currency: prompt.currency.clone(),
                payment_token: form.payment_token.clone(),
            })
            .await
            .map_err(|e| {
                warn!("Payment failed, request not created: {e}");
                ServiceError::from(e)
            })?;

        let request = BloodRequest {
            id: None,
            requester_email: Some(requester.email.clone()),
            name: form.name.or(Some(requester.name)),
            blood_group: form.blood_group,
            hospital: form.hospital,
            contact: form.contact,
            urgency: form.urgency,
            amount: Some(prompt.amount),
            amount_status: AmountStatus::Paid,
            status: RequestStatus::Pending,
            date: Some(chrono::Local::now().format("%Y-%m-%d").to_string()),
            donor_id: None,
            created_at: None,
            updated_at: None,
        };
        let created = self.request_repo.create(request).await.map_err(|e| {
            error!(reference = %receipt.reference, "Payment taken but request creation failed: {e}");
            ServiceError::from(e)
        })?;
        info!(reference = %receipt.reference, "Blood request submitted");

        Ok(SubmissionResponse {
            message: format!(
                "Payment of {} {} was successful. Your blood request has been submitted and is pending approval.",
                receipt.amount, receipt.currency
            ),
            request: BloodRequestView::from(created),
            payment: receipt,
        })
    }

    #[instrument(skip(self))]
    async fn requests_for(&self, email: &str) -> Result<Vec<BloodRequestView>, ServiceError> {
        let requests = self.request_repo.list_by_requester_email(email.trim()).await?;
        Ok(requests.into_iter().map(BloodRequestView::from).collect())
    }

    #[instrument(skip(self, session, update))]
    async fn update_request(
        &self,
        session: &Session,
        id: &str,
        update: UpdateBloodRequest,
    ) -> Result<BloodRequestView, ServiceError> {
        let caller = Self::require_login(session)?;
        let object_id = parse_object_id(id)?;
        let mut request = self.request_repo.get_by_id(&object_id).await?;
        Self::require_owner_or_admin(caller, &request)?;
        let read_status = request.status;

        if let Some(hospital) = update.hospital {
            let hospital = hospital.trim();
            if hospital.is_empty() {
                return Err(ServiceError::InvalidInput("Hospital is required".to_string()));
            }
            request.hospital = hospital.to_string();
        }
        if let Some(contact) = update.contact {
            let contact = contact.trim();
            if !is_valid_contact(contact) {
                return Err(ServiceError::InvalidInput("Contact must be 10 to 15 digits".to_string()));
            }
            request.contact = contact.to_string();
        }
        if let Some(urgency) = update.urgency {
            request.urgency = urgency.parse::<Urgency>()?;
        }
        // the price always follows the (possibly new) urgency tier
        request.amount = Some(request.urgency.price());

        // status moves only happen on the admin route
        if let Some(status) = update.status {
            if status.parse::<RequestStatus>()? != request.status {
                warn!("Status change attempted through the receiver route");
                return Err(ServiceError::Forbidden(STATUS_IS_ADMIN_ONLY.to_string()));
            }
        }
        if let Some(amount_status) = update.amount_status {
            request.amount_status = request.amount_status.transition_to(amount_status.parse::<AmountStatus>()?)?;
        }

        let updated = self.request_repo.update(&object_id, read_status, request).await?;
        info!("Blood request updated");
        Ok(BloodRequestView::from(updated))
    }

    #[instrument(skip(self, session))]
    async fn delete_request(&self, session: &Session, id: &str) -> Result<(), ServiceError> {
        let caller = Self::require_login(session)?;
        let object_id = parse_object_id(id)?;
        let request = self.request_repo.get_by_id(&object_id).await?;
        Self::require_owner_or_admin(caller, &request)?;
        self.request_repo.delete(&object_id).await?;
        info!("Blood request deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn donors_by_blood_group(&self, blood_group: &str) -> Result<DonorEmailsResponse, ServiceError> {
        let blood_group = blood_group.parse::<BloodGroup>()?;
        let donors = self.user_repo.find_donors_by_blood_group(blood_group).await?;
        Ok(DonorEmailsResponse {
            blood_group,
            emails: donors.into_iter().map(|u| u.email).collect(),
        })
    }
}
