pub mod user_dto;
pub mod request_dto;
pub mod admin_dto;
pub mod contact_dto;
