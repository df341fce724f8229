use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::guru::ai::ChatMessage;
use crate::steps::dto::StepView;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GuruRequest {
    pub prompt: Option<String>,
    /// Present when refining an existing goal instead of creating one.
    pub goal_id: Option<Uuid>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

#[derive(Debug, Serialize)]
pub struct GuruResponse {
    pub name: String,
    pub steps: Vec<StepView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
