use bson::oid::ObjectId;

use crate::util::error::ServiceError;

pub mod user_service;
pub mod admin_service;
pub mod receiver_service;
pub mod contact_service;

pub(crate) fn parse_object_id(id: &str) -> Result<ObjectId, ServiceError> {
    ObjectId::parse_str(id.trim()).map_err(|_| ServiceError::InvalidInput(format!("Invalid id: '{}'", id)))
}
