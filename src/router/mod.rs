pub mod user_router;
pub mod admin_router;
pub mod receiver_router;
pub mod contact_router;
