use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::model::blood_request::{
    is_valid_contact, AmountStatus, BloodGroup, BloodRequest, RequestStatus, Urgency,
};
use crate::util::error::ServiceError;
use crate::util::payment::PaymentReceipt;

/// Request form as submitted by a receiver. Enumerations arrive as text and
/// are parsed strictly by [`BloodRequestForm::try_from`]. The price is never
/// taken from the client.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBloodRequest {
    #[validate(length(max = 100))]
    pub name: Option<String>,
    pub blood_group: String,
    #[validate(length(min = 1, max = 200))]
    pub hospital: String,
    pub contact: String,
    pub urgency: String,
    /// Opaque token from the client-side card form
    pub payment_token: Option<String>,
}

/// A request form whose fields have all been checked.
#[derive(Debug, Clone, PartialEq)]
pub struct BloodRequestForm {
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub hospital: String,
    pub contact: String,
    pub urgency: Urgency,
    pub payment_token: Option<String>,
}

impl TryFrom<CreateBloodRequest> for BloodRequestForm {
    type Error = ServiceError;

    fn try_from(raw: CreateBloodRequest) -> Result<Self, Self::Error> {
        let blood_group = raw.blood_group.parse::<BloodGroup>()?;
        let urgency = raw.urgency.parse::<Urgency>()?;

        let hospital = raw.hospital.trim().to_string();
        if hospital.is_empty() {
            return Err(ServiceError::InvalidInput("Hospital is required".to_string()));
        }
        let contact = raw.contact.trim().to_string();
        if !is_valid_contact(&contact) {
            return Err(ServiceError::InvalidInput(
                "Contact must be 10 to 15 digits".to_string(),
            ));
        }

        Ok(BloodRequestForm {
            name: raw.name.map(|n| n.trim().to_string()).filter(|n| !n.is_empty()),
            blood_group,
            hospital,
            contact,
            urgency,
            payment_token: raw.payment_token,
        })
    }
}

/// Partial update from the receiver's "my requests" view.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBloodRequest {
    #[validate(length(min = 1, max = 200))]
    pub hospital: Option<String>,
    pub contact: Option<String>,
    pub urgency: Option<String>,
    pub status: Option<String>,
    pub amount_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequestView {
    pub id: Option<String>,
    pub requester_email: Option<String>,
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub hospital: String,
    pub contact: String,
    pub urgency: Urgency,
    /// Always resolved, never null.
    pub amount: i64,
    pub amount_status: AmountStatus,
    pub status: RequestStatus,
    pub date: Option<String>,
    pub donor_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<BloodRequest> for BloodRequestView {
    fn from(request: BloodRequest) -> Self {
        let amount = request.resolved_amount();
        BloodRequestView {
            id: request.id.map(|id| id.to_hex()),
            requester_email: request.requester_email,
            name: request.name,
            blood_group: request.blood_group,
            hospital: request.hospital,
            contact: request.contact,
            urgency: request.urgency,
            amount,
            amount_status: request.amount_status,
            status: request.status,
            date: request.date,
            donor_id: request.donor_id,
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// Returned after a paid submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub message: String,
    pub request: BloodRequestView,
    pub payment: PaymentReceipt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorEmailsResponse {
    pub blood_group: BloodGroup,
    pub emails: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorQuery {
    pub blood_group: String,
}
