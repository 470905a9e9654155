mod common;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use blood_app_backend::app::app::{build_router, AppServices};
use blood_app_backend::config::{JwtConfig, NotificationConfig};
use blood_app_backend::middlewares::AuthState;
use blood_app_backend::model::blood_request::{AmountStatus, BloodGroup, BloodRequest, RequestStatus};
use blood_app_backend::model::user::{Role, User};
use blood_app_backend::service::admin_service::AdminServiceImpl;
use blood_app_backend::service::contact_service::ContactServiceImpl;
use blood_app_backend::service::receiver_service::ReceiverServiceImpl;
use blood_app_backend::service::user_service::UserServiceImpl;
use blood_app_backend::util::jwt::{JwtTokenUtils, JwtTokenUtilsImpl};
use common::{
    blood_request, user, MockRequestRepository, MockUserRepository, RecordingGateway, RecordingMailer,
    RecordingNotifier,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt; // for .oneshot()

struct TestApp {
    router: Router,
    jwt: Arc<JwtTokenUtilsImpl>,
    users: Arc<MockUserRepository>,
    requests: Arc<MockRequestRepository>,
    notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    fn new(users: Vec<User>, requests: Vec<BloodRequest>, gateway: RecordingGateway) -> Self {
        let jwt = Arc::new(JwtTokenUtilsImpl::new(JwtConfig::default()));
        let user_repo = Arc::new(MockUserRepository::with_users(users));
        let request_repo = Arc::new(MockRequestRepository::with_requests(requests));
        let notifier = Arc::new(RecordingNotifier::default());
        let notification_config = NotificationConfig::default();

        let services = AppServices {
            user: Arc::new(UserServiceImpl::new(user_repo.clone(), jwt.clone())),
            admin: Arc::new(AdminServiceImpl::new(
                user_repo.clone(),
                request_repo.clone(),
                notifier.clone(),
                notification_config.coordination_phone.clone(),
            )),
            receiver: Arc::new(ReceiverServiceImpl::new(
                request_repo.clone(),
                user_repo.clone(),
                Arc::new(gateway),
                "INR".to_string(),
            )),
            contact: Arc::new(ContactServiceImpl::new(
                Arc::new(RecordingMailer::default()),
                &notification_config,
            )),
        };
        let router = build_router(&services, Arc::new(AuthState { jwt_utils: jwt.clone() }));
        TestApp { router, jwt, users: user_repo, requests: request_repo, notifier }
    }

    fn token_for(&self, user: &User) -> String {
        let id = user.id.map(|id| id.to_hex()).unwrap_or_default();
        self.jwt.generate_token_pair(&id, &user.email, user.role).unwrap().access_token
    }

    async fn send(&self, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, value)
    }
}

fn admin() -> User {
    user("Admin", "admin@bloodbank.test", Role::Admin, None)
}

fn receiver() -> User {
    user("Priya", "priya@example.com", Role::Receiver, None)
}

fn request_form(urgency: &str) -> Value {
    json!({
        "bloodGroup": "O-",
        "hospital": "General Hospital",
        "contact": "9876543210",
        "urgency": urgency,
        "paymentToken": "tok_visa"
    })
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new(vec![], vec![], RecordingGateway::default());
    let resp = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_admin_routes_require_admin_session() {
    let receiver = receiver();
    let app = TestApp::new(vec![receiver.clone()], vec![], RecordingGateway::default());

    let (status, _) = app.send("GET", "/admin/snapshot", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.send("GET", "/admin/snapshot", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.token_for(&receiver);
    let (status, _) = app.send("GET", "/admin/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_snapshot() {
    let admin = admin();
    let donor = user("Ravi", "ravi@example.com", Role::Donor, Some(BloodGroup::BPositive));
    let app = TestApp::new(
        vec![admin.clone(), donor, receiver()],
        vec![
            blood_request(Some("priya@example.com"), RequestStatus::Pending),
            blood_request(Some("priya@example.com"), RequestStatus::Fulfilled),
        ],
        RecordingGateway::default(),
    );

    let token = app.token_for(&admin);
    let (status, body) = app.send("GET", "/admin/snapshot", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["users"].as_array().unwrap().len(), 3);
    assert_eq!(body["requests"].as_array().unwrap().len(), 2);
    assert_eq!(body["stats"]["totalDonors"], 1);
    assert_eq!(body["stats"]["totalReceivers"], 1);
    assert_eq!(body["stats"]["pendingRequests"], 1);
    assert_eq!(body["stats"]["fulfilledRequests"], 1);
    // unset amounts resolve from the urgency tier
    assert_eq!(body["requests"][0]["amount"], 500);
}

#[tokio::test]
async fn test_admin_delete_user_needs_confirmation() {
    let admin = admin();
    let receiver = receiver();
    let receiver_id = receiver.id.unwrap().to_hex();
    let app = TestApp::new(vec![admin.clone(), receiver], vec![], RecordingGateway::default());
    let token = app.token_for(&admin);

    let uri = format!("/admin/users/{receiver_id}");
    let (status, body) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Deleting a user requires confirmation");
    assert_eq!(app.users.count_calls("delete"), 0);

    let (status, body) = app.send("DELETE", &format!("{uri}?confirm=true"), Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["id"], receiver_id);
    assert_eq!(body["notices"][0]["level"], "success");
    assert_eq!(body["notices"][0]["message"], "User deleted successfully!");
    assert_eq!(body["snapshot"]["users"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_admin_update_request_status_notifies_requester() {
    let admin = admin();
    let request = blood_request(Some("priya@example.com"), RequestStatus::Pending);
    let id = request.id.unwrap();
    let app = TestApp::new(vec![admin.clone()], vec![request], RecordingGateway::default());
    let token = app.token_for(&admin);

    let uri = format!("/admin/requests/{}?status=fulfilled", id.to_hex());
    let (status, body) = app.send("PUT", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["result"]["status"], "fulfilled");
    assert_eq!(body["notices"][1]["message"], "Email notification sent to priya@example.com");
    assert_eq!(app.notifier.sent().len(), 1);

    // terminal states do not move again
    let uri = format!("/admin/requests/{}?status=cancelled", id.to_hex());
    let (status, _) = app.send("PUT", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(app.notifier.sent().len(), 1);
    assert_eq!(app.requests.get(&id).unwrap().status, RequestStatus::Fulfilled);
}

#[tokio::test]
async fn test_admin_rejects_unknown_role() {
    let admin = admin();
    let receiver = receiver();
    let uri = format!("/admin/users/{}?role=superuser", receiver.id.unwrap().to_hex());
    let app = TestApp::new(vec![admin.clone(), receiver], vec![], RecordingGateway::default());
    let token = app.token_for(&admin);

    let (status, _) = app.send("PUT", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(app.users.count_calls("update_role"), 0);
}

#[tokio::test]
async fn test_quote_requires_login() {
    let app = TestApp::new(vec![], vec![], RecordingGateway::default());
    let (status, body) = app.send("POST", "/receiver/requests/quote", None, Some(request_form("normal"))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Please login to submit a request.");
}

#[tokio::test]
async fn test_quote_prices_by_urgency() {
    let receiver = receiver();
    let app = TestApp::new(vec![receiver.clone()], vec![], RecordingGateway::default());
    let token = app.token_for(&receiver);

    let (status, body) = app.send("POST", "/receiver/requests/quote", Some(&token), Some(request_form("low"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "amount": 100, "currency": "INR" }));
    assert!(app.requests.all().is_empty());
}

#[tokio::test]
async fn test_submit_creates_paid_pending_request() {
    let receiver = receiver();
    let app = TestApp::new(vec![receiver.clone()], vec![], RecordingGateway::default());
    let token = app.token_for(&receiver);

    let (status, body) = app.send("POST", "/receiver/requests", Some(&token), Some(request_form("high"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["request"]["status"], "pending");
    assert_eq!(body["request"]["amountStatus"], "PAID");
    assert_eq!(body["request"]["amount"], 500);
    assert_eq!(body["request"]["requesterEmail"], "priya@example.com");

    let stored = app.requests.all();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0].amount_status, AmountStatus::Paid);
}

#[tokio::test]
async fn test_declined_payment_creates_nothing() {
    let receiver = receiver();
    let app = TestApp::new(vec![receiver.clone()], vec![], RecordingGateway::declining());
    let token = app.token_for(&receiver);

    let (status, _) = app.send("POST", "/receiver/requests", Some(&token), Some(request_form("high"))).await;
    assert_eq!(status, StatusCode::PAYMENT_REQUIRED);
    assert!(app.requests.all().is_empty());
}

#[tokio::test]
async fn test_submit_rejects_unknown_blood_group() {
    let receiver = receiver();
    let app = TestApp::new(vec![receiver.clone()], vec![], RecordingGateway::default());
    let token = app.token_for(&receiver);

    let mut form = request_form("high");
    form["bloodGroup"] = json!("C+");
    let (status, _) = app.send("POST", "/receiver/requests", Some(&token), Some(form)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(app.requests.all().is_empty());
}

#[tokio::test]
async fn test_requests_by_email_is_owner_or_admin() {
    let receiver = receiver();
    let other = user("Kiran", "kiran@example.com", Role::Receiver, None);
    let admin = admin();
    let app = TestApp::new(
        vec![receiver.clone(), other.clone(), admin.clone()],
        vec![blood_request(Some("priya@example.com"), RequestStatus::Pending)],
        RecordingGateway::default(),
    );

    let (status, _) = app.send("GET", "/receiver/requests/priya@example.com", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.token_for(&receiver);
    let (status, body) = app.send("GET", "/receiver/requests/priya@example.com", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let token = app.token_for(&other);
    let (status, _) = app.send("GET", "/receiver/requests/priya@example.com", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let token = app.token_for(&admin);
    let (status, _) = app.send("GET", "/receiver/requests/priya@example.com", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_delete_request_returns_no_content() {
    let receiver = receiver();
    let request = blood_request(Some("priya@example.com"), RequestStatus::Pending);
    let uri = format!("/receiver/requests/{}", request.id.unwrap().to_hex());
    let app = TestApp::new(vec![receiver.clone()], vec![request], RecordingGateway::default());
    let token = app.token_for(&receiver);

    let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(app.requests.all().is_empty());

    let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_register_and_login_over_http() {
    let app = TestApp::new(vec![], vec![], RecordingGateway::default());
    let registration = json!({
        "name": "Ravi",
        "email": "ravi@example.com",
        "password": "donate2save",
        "role": "donor",
        "bloodGroup": "B+"
    });
    let (status, body) = app.send("POST", "/users/register", None, Some(registration)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["user"]["role"], "donor");

    let login = json!({ "email": "ravi@example.com", "password": "donate2save" });
    let (status, body) = app.send("POST", "/users/login", None, Some(login)).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["tokens"]["accessToken"].is_string());

    let bad = json!({ "email": "ravi@example.com", "password": "wrongpass1" });
    let (status, body) = app.send("POST", "/users/login", None, Some(bad)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_contact_form() {
    let app = TestApp::new(vec![], vec![], RecordingGateway::default());
    let (status, body) = app
        .send("POST", "/contact", None, Some(json!({ "name": "Asha", "email": "asha@example.com", "message": "hi" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Thank you for your feedback!");

    let (status, body) = app
        .send("POST", "/contact", None, Some(json!({ "name": "", "email": "asha@example.com", "message": "hi" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Please fill out all fields.");
}

#[tokio::test]
async fn test_other_users_cannot_change_or_delete_a_request() {
    let owner = receiver();
    let donor = user("Eve", "eve@example.com", Role::Donor, Some(BloodGroup::APositive));
    let request = blood_request(Some("priya@example.com"), RequestStatus::Pending);
    let id = request.id.unwrap();
    let uri = format!("/receiver/requests/{}", id.to_hex());
    let app = TestApp::new(vec![owner, donor.clone()], vec![request], RecordingGateway::default());
    let token = app.token_for(&donor);

    let (status, body) = app
        .send("PUT", &uri, Some(&token), Some(json!({ "hospital": "Elsewhere" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "You can only change your own requests");

    let (status, _) = app.send("PUT", &uri, Some(&token), Some(json!({ "status": "fulfilled" }))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let stored = app.requests.get(&id).unwrap();
    assert_eq!(stored.status, RequestStatus::Pending);
    assert_eq!(stored.hospital, "City Hospital");
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_owner_cannot_finish_own_request_through_receiver_route() {
    let owner = receiver();
    let request = blood_request(Some("priya@example.com"), RequestStatus::Pending);
    let id = request.id.unwrap();
    let uri = format!("/receiver/requests/{}", id.to_hex());
    let app = TestApp::new(vec![owner.clone()], vec![request], RecordingGateway::default());
    let token = app.token_for(&owner);

    for status in ["fulfilled", "cancelled"] {
        let (code, body) = app.send("PUT", &uri, Some(&token), Some(json!({ "status": status }))).await;
        assert_eq!(code, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "Request status is changed from the admin dashboard");
    }
    assert_eq!(app.requests.get(&id).unwrap().status, RequestStatus::Pending);
    assert!(app.notifier.sent().is_empty());

    let (code, body) = app.send("PUT", &uri, Some(&token), Some(json!({ "hospital": "General Hospital" }))).await;
    assert_eq!(code, StatusCode::OK);
    assert_eq!(body["hospital"], "General Hospital");
}
