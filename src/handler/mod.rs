pub mod user_handler;
pub mod admin_handler;
pub mod receiver_handler;
pub mod contact_handler;
