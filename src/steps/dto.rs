use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::steps::repo::Step;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateStepRequest {
    pub goal_id: Option<Uuid>,
    pub description: Option<String>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStepRequest {
    pub description: Option<String>,
    pub completed: Option<bool>,
}

/// Step as serialized to clients, and as embedded in goal/guru responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub id: Uuid,
    pub description: String,
    pub completed: bool,
    pub goal_id: Uuid,
}

impl From<Step> for StepView {
    fn from(s: Step) -> Self {
        Self {
            id: s.id,
            description: s.description,
            completed: s.completed,
            goal_id: s.goal_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedStepResponse {
    pub message: String,
    pub step: StepView,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_view_wire_shape() {
        let view = StepView {
            id: Uuid::new_v4(),
            description: "Finish lesson 1".into(),
            completed: false,
            goal_id: Uuid::new_v4(),
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"goalId\""));
        assert!(!json.contains("goal_id"));
    }

    #[test]
    fn create_step_defaults_completed_to_false() {
        let req: CreateStepRequest = serde_json::from_str(
            r#"{"goalId":"6e5c9af2-78f8-44a5-b9b1-dfae7b3eb9a9","description":"x"}"#,
        )
        .unwrap();
        assert!(!req.completed);
    }
}
