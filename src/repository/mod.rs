pub mod repository_error;
pub mod user_repo;
pub mod blood_request_repo;
