use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::goals::repo::GoalWithSteps;
use crate::steps::dto::StepView;

#[derive(Debug, Deserialize)]
pub struct CreateGoalRequest {
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateGoalRequest {
    pub name: Option<String>,
    pub completed: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalResponse {
    pub id: Uuid,
    pub name: String,
    pub completed: bool,
    pub creator_id: Uuid,
    pub steps: Vec<StepView>,
}

impl From<GoalWithSteps> for GoalResponse {
    fn from(g: GoalWithSteps) -> Self {
        Self {
            id: g.id,
            name: g.name,
            completed: g.completed,
            creator_id: g.creator_id,
            steps: g.steps.0,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct DeletedGoalResponse {
    pub message: String,
    pub goal: GoalResponse,
}
