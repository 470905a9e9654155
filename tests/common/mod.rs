#![allow(dead_code)]

use async_trait::async_trait;
use blood_app_backend::model::blood_request::{
    AmountStatus, BloodGroup, BloodRequest, RequestStatus, Urgency,
};
use blood_app_backend::model::user::{Role, User};
use blood_app_backend::repository::blood_request_repo::BloodRequestRepository;
use blood_app_backend::repository::repository_error::{RepositoryError, RepositoryResult};
use blood_app_backend::repository::user_repo::UserRepository;
use blood_app_backend::util::email::{EmailError, EmailMessage, Mailer};
use blood_app_backend::util::notifier::{RequestNotifier, StatusNotification};
use blood_app_backend::util::payment::{PaymentCharge, PaymentError, PaymentGateway, PaymentReceipt};
use bson::oid::ObjectId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory users keyed by id; every call is recorded by name.
#[derive(Default)]
pub struct MockUserRepository {
    pub users: Mutex<HashMap<ObjectId, User>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_list: AtomicBool,
}

impl MockUserRepository {
    pub fn with_users(users: Vec<User>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.users.lock().unwrap();
            for mut user in users {
                let id = *user.id.get_or_insert_with(ObjectId::new);
                map.insert(id, user);
            }
        }
        repo
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn insert(&self, mut user: User) -> RepositoryResult<User> {
        self.record("insert");
        let id = ObjectId::new();
        user.id = Some(id);
        self.users.lock().unwrap().insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> RepositoryResult<Option<User>> {
        self.record("find_by_email");
        Ok(self.users.lock().unwrap().values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: &ObjectId) -> RepositoryResult<Option<User>> {
        self.record("find_by_id");
        Ok(self.users.lock().unwrap().get(id).cloned())
    }

    async fn list(&self) -> RepositoryResult<Vec<User>> {
        self.record("list");
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RepositoryError::database("users unavailable"));
        }
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn update_role(&self, id: &ObjectId, role: Role) -> RepositoryResult<User> {
        self.record("update_role");
        let mut users = self.users.lock().unwrap();
        let user = users.get_mut(id).ok_or_else(|| RepositoryError::not_found("user"))?;
        user.role = role;
        Ok(user.clone())
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        self.record("delete");
        self.users
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("user"))
    }

    async fn count_by_role(&self, role: Role) -> RepositoryResult<u64> {
        self.record("count_by_role");
        Ok(self.users.lock().unwrap().values().filter(|u| u.role == role).count() as u64)
    }

    async fn find_donors_by_blood_group(&self, blood_group: BloodGroup) -> RepositoryResult<Vec<User>> {
        self.record("find_donors_by_blood_group");
        Ok(self
            .users
            .lock()
            .unwrap()
            .values()
            .filter(|u| u.role == Role::Donor && u.blood_group == Some(blood_group))
            .cloned()
            .collect())
    }
}

#[derive(Default)]
pub struct MockRequestRepository {
    pub requests: Mutex<HashMap<ObjectId, BloodRequest>>,
    pub calls: Mutex<Vec<String>>,
    pub fail_list: AtomicBool,
    /// Applied to the stored request right after the next `get_by_id`,
    /// as if another writer got in between.
    pub status_after_read: Mutex<Option<RequestStatus>>,
}

impl MockRequestRepository {
    pub fn with_requests(requests: Vec<BloodRequest>) -> Self {
        let repo = Self::default();
        {
            let mut map = repo.requests.lock().unwrap();
            for mut request in requests {
                let id = *request.id.get_or_insert_with(ObjectId::new);
                map.insert(id, request);
            }
        }
        repo
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| c.as_str() == call).count()
    }

    pub fn get(&self, id: &ObjectId) -> Option<BloodRequest> {
        self.requests.lock().unwrap().get(id).cloned()
    }

    pub fn all(&self) -> Vec<BloodRequest> {
        self.requests.lock().unwrap().values().cloned().collect()
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.fail_list.store(fail, Ordering::SeqCst);
    }

    pub fn change_status_after_next_read(&self, status: RequestStatus) {
        *self.status_after_read.lock().unwrap() = Some(status);
    }

    fn write_if_status(
        &self,
        id: &ObjectId,
        expected: RequestStatus,
        apply: impl FnOnce(&mut BloodRequest),
    ) -> RepositoryResult<BloodRequest> {
        let mut requests = self.requests.lock().unwrap();
        let stored = requests.get_mut(id).ok_or_else(|| RepositoryError::not_found("blood request"))?;
        if stored.status != expected {
            return Err(RepositoryError::conflict(format!("blood request is {}", stored.status)));
        }
        apply(stored);
        Ok(stored.clone())
    }
}

#[async_trait]
impl BloodRequestRepository for MockRequestRepository {
    async fn create(&self, mut request: BloodRequest) -> RepositoryResult<BloodRequest> {
        self.record("create");
        let id = ObjectId::new();
        request.id = Some(id);
        self.requests.lock().unwrap().insert(id, request.clone());
        Ok(request)
    }

    async fn get_by_id(&self, id: &ObjectId) -> RepositoryResult<BloodRequest> {
        self.record("get_by_id");
        let read = self.get(id).ok_or_else(|| RepositoryError::not_found("blood request"))?;
        if let Some(status) = self.status_after_read.lock().unwrap().take() {
            if let Some(stored) = self.requests.lock().unwrap().get_mut(id) {
                stored.status = status;
            }
        }
        Ok(read)
    }

    async fn list(&self) -> RepositoryResult<Vec<BloodRequest>> {
        self.record("list");
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(RepositoryError::database("requests unavailable"));
        }
        Ok(self.all())
    }

    async fn list_by_requester_email(&self, email: &str) -> RepositoryResult<Vec<BloodRequest>> {
        self.record("list_by_requester_email");
        Ok(self
            .all()
            .into_iter()
            .filter(|r| r.requester_email.as_deref() == Some(email))
            .collect())
    }

    async fn update(&self, id: &ObjectId, expected: RequestStatus, mut request: BloodRequest) -> RepositoryResult<BloodRequest> {
        self.record("update");
        request.id = Some(*id);
        self.write_if_status(id, expected, |stored| *stored = request)
    }

    async fn update_status(&self, id: &ObjectId, from: RequestStatus, to: RequestStatus) -> RepositoryResult<BloodRequest> {
        self.record("update_status");
        self.write_if_status(id, from, |stored| stored.status = to)
    }

    async fn delete(&self, id: &ObjectId) -> RepositoryResult<()> {
        self.record("delete");
        self.requests
            .lock()
            .unwrap()
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| RepositoryError::not_found("blood request"))
    }

    async fn count_by_status(&self, status: RequestStatus) -> RepositoryResult<u64> {
        self.record("count_by_status");
        Ok(self.all().iter().filter(|r| r.status == status).count() as u64)
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub sent: Mutex<Vec<StatusNotification>>,
    pub fail: bool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        RecordingNotifier { fail: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<StatusNotification> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl RequestNotifier for RecordingNotifier {
    async fn notify_status(&self, notification: StatusNotification) -> Result<(), EmailError> {
        self.sent.lock().unwrap().push(notification);
        if self.fail {
            return Err(EmailError::SmtpError("connection refused".to_string()));
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<EmailMessage>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn failing() -> Self {
        RecordingMailer { fail: true, ..Default::default() }
    }

    pub fn sent(&self) -> Vec<EmailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_email(&self, message: EmailMessage) -> Result<(), EmailError> {
        if self.fail {
            return Err(EmailError::SmtpError("connection refused".to_string()));
        }
        self.sent.lock().unwrap().push(message);
        Ok(())
    }
}

#[derive(Default)]
pub struct RecordingGateway {
    pub charges: Mutex<Vec<PaymentCharge>>,
    pub decline: bool,
}

impl RecordingGateway {
    pub fn declining() -> Self {
        RecordingGateway { decline: true, ..Default::default() }
    }

    pub fn charges(&self) -> Vec<PaymentCharge> {
        self.charges.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn charge(&self, charge: PaymentCharge) -> Result<PaymentReceipt, PaymentError> {
        self.charges.lock().unwrap().push(charge.clone());
        if self.decline {
            return Err(PaymentError::Declined("card declined".to_string()));
        }
        Ok(PaymentReceipt {
            reference: "test_ref".to_string(),
            amount: charge.amount,
            currency: charge.currency,
        })
    }
}

pub fn user(name: &str, email: &str, role: Role, blood_group: Option<BloodGroup>) -> User {
    User {
        id: Some(ObjectId::new()),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: "not-a-real-hash".to_string(),
        role,
        blood_group,
        created_at: None,
        updated_at: None,
    }
}

pub fn blood_request(email: Option<&str>, status: RequestStatus) -> BloodRequest {
    BloodRequest {
        id: Some(ObjectId::new()),
        requester_email: email.map(str::to_string),
        name: Some("Meera".to_string()),
        blood_group: BloodGroup::APositive,
        hospital: "City Hospital".to_string(),
        contact: "9876543210".to_string(),
        urgency: Urgency::High,
        amount: None,
        amount_status: AmountStatus::Paid,
        status,
        date: Some("2024-05-01".to_string()),
        donor_id: None,
        created_at: None,
        updated_at: None,
    }
}
