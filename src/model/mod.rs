pub mod blood_request;
pub mod dashboard;
pub mod user;
