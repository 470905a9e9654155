use serde::{Deserialize, Serialize};
use validator::Validate;

fn default_role() -> String {
    "Donor".to_string()
}

/// Contact form submission. Missing fields deserialize as empty so the
/// service can report them together.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ContactMessage {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    #[validate(email)]
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactResponse {
    pub message: String,
}
