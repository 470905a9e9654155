use bson::oid::ObjectId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error raised when free text does not name a known variant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {kind}: '{value}'")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

impl ParseEnumError {
    fn new(kind: &'static str, value: &str) -> Self {
        ParseEnumError { kind, value: value.to_string() }
    }
}

/// Rejected status or payment transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Cannot move {kind} from '{from}' to '{to}'")]
pub struct TransitionError {
    pub kind: &'static str,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BloodGroup {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
}

impl BloodGroup {
    pub const ALL: [BloodGroup; 8] = [
        BloodGroup::APositive,
        BloodGroup::ANegative,
        BloodGroup::BPositive,
        BloodGroup::BNegative,
        BloodGroup::OPositive,
        BloodGroup::ONegative,
        BloodGroup::AbPositive,
        BloodGroup::AbNegative,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            BloodGroup::APositive => "A+",
            BloodGroup::ANegative => "A-",
            BloodGroup::BPositive => "B+",
            BloodGroup::BNegative => "B-",
            BloodGroup::OPositive => "O+",
            BloodGroup::ONegative => "O-",
            BloodGroup::AbPositive => "AB+",
            BloodGroup::AbNegative => "AB-",
        }
    }
}

impl fmt::Display for BloodGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodGroup {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        BloodGroup::ALL
            .into_iter()
            .find(|group| group.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseEnumError::new("blood group", s))
    }
}

/// Time-criticality of a request. Drives the price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Normal,
    Low,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Normal => "normal",
            Urgency::Low => "low",
        }
    }

    /// Fixed price of the tier, in whole currency units.
    pub fn price(&self) -> i64 {
        match self {
            Urgency::High => 500,
            Urgency::Normal => 300,
            Urgency::Low => 100,
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Urgency {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Urgency::High),
            "normal" => Ok(Urgency::Normal),
            "low" => Ok(Urgency::Low),
            _ => Err(ParseEnumError::new("urgency", s)),
        }
    }
}

/// An explicit amount always wins over the urgency tier price.
pub fn resolve_amount(urgency: Urgency, explicit: Option<i64>) -> i64 {
    explicit.unwrap_or_else(|| urgency.price())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AmountStatus {
    Paid,
    Unpaid,
}

impl AmountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AmountStatus::Paid => "PAID",
            AmountStatus::Unpaid => "UNPAID",
        }
    }

    /// Payments only move forward: UNPAID -> PAID. Re-applying the current
    /// value is accepted as a no-op.
    pub fn transition_to(self, next: AmountStatus) -> Result<AmountStatus, TransitionError> {
        match (self, next) {
            (current, wanted) if current == wanted => Ok(current),
            (AmountStatus::Unpaid, AmountStatus::Paid) => Ok(AmountStatus::Paid),
            (from, to) => Err(TransitionError {
                kind: "amount status",
                from: from.as_str().to_string(),
                to: to.as_str().to_string(),
            }),
        }
    }
}

impl fmt::Display for AmountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AmountStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PAID" => Ok(AmountStatus::Paid),
            "UNPAID" => Ok(AmountStatus::Unpaid),
            _ => Err(ParseEnumError::new("amount status", s)),
        }
    }
}

/// Lifecycle stage of a request. `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Pending,
    Fulfilled,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "pending",
            RequestStatus::Fulfilled => "fulfilled",
            RequestStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, RequestStatus::Pending)
    }

    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Fulfilled)
                | (RequestStatus::Pending, RequestStatus::Cancelled)
        )
    }

    pub fn transition_to(self, next: RequestStatus) -> Result<RequestStatus, TransitionError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(TransitionError {
                kind: "request status",
                from: self.as_str().to_string(),
                to: next.as_str().to_string(),
            })
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RequestStatus::Pending),
            "fulfilled" => Ok(RequestStatus::Fulfilled),
            "cancelled" => Ok(RequestStatus::Cancelled),
            _ => Err(ParseEnumError::new("request status", s)),
        }
    }
}

/// Contact numbers are 10 to 15 ASCII digits, nothing else.
pub fn is_valid_contact(contact: &str) -> bool {
    (10..=15).contains(&contact.len()) && contact.bytes().all(|b| b.is_ascii_digit())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodRequest {
    #[serde(rename = "_id")]
    pub id: Option<ObjectId>,
    pub requester_email: Option<String>,
    pub name: Option<String>,
    pub blood_group: BloodGroup,
    pub hospital: String,
    pub contact: String,
    pub urgency: Urgency,
    pub amount: Option<i64>,
    pub amount_status: AmountStatus,
    pub status: RequestStatus,
    pub date: Option<String>,
    pub donor_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl BloodRequest {
    pub fn resolved_amount(&self) -> i64 {
        resolve_amount(self.urgency, self.amount)
    }

    /// Requester address, if one is on file and non-blank.
    pub fn notification_address(&self) -> Option<&str> {
        self.requester_email
            .as_deref()
            .map(str::trim)
            .filter(|email| !email.is_empty())
    }
}
