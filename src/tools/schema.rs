//! Input and output shapes for the agent's tools.
//!
//! Field doc comments become the `description` of each parameter in the
//! schema the model sees, so write them for the model.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Details of a travel request gathered so far.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct TravelRequestInput {
    /// Where the user wants to travel, e.g. "Lisbon, Portugal".
    #[serde(default)]
    pub destination: Option<String>,

    /// Travel dates or date range as stated by the user.
    #[serde(default)]
    pub dates: Option<String>,

    /// Total budget including currency, e.g. "2000 EUR".
    #[serde(default)]
    pub budget: Option<String>,

    /// Preferences such as pace, interests, accommodation style.
    #[serde(default)]
    pub preferences: Option<String>,
}

/// Which trip details are known and which still need asking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TravelRequestOutput {
    pub complete: bool,
    pub missing: Vec<String>,
    pub validation_message: String,
}

/// The user's answer to a proposed itinerary.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ConfirmPlanInput {
    /// The user's reply, verbatim.
    pub user_response: String,
}

/// Outcome of interpreting the user's reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confirmation {
    Confirmed,
    Declined,
    Unclear,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfirmPlanOutput {
    pub decision: Confirmation,
    pub confirmation_message: String,
}
