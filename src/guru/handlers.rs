use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::AuthUser,
    error::{ApiError, ApiResult},
    goals,
    guru::{
        ai::{parse_plan, ChatMessage},
        dto::{GuruRequest, GuruResponse},
        services,
    },
    state::AppState,
    steps::repo::Step,
};

pub fn guru_routes() -> Router<AppState> {
    Router::new().route("/guru", post(ask_guru))
}

/// Final user message sent to the model; mentions the current plan when
/// refining so the model revises rather than starts over.
fn build_messages(
    prompt: &str,
    history: &[ChatMessage],
    existing: Option<(&str, &[Step])>,
) -> Vec<ChatMessage> {
    let mut instruction = String::new();
    if let Some((name, steps)) = existing {
        instruction.push_str(&format!(
            "I am refining an existing goal named \"{}\" with steps: {:?}. ",
            name,
            steps.iter().map(|s| s.description.as_str()).collect::<Vec<_>>(),
        ));
    }
    instruction.push_str(&format!(
        "My goal is to {prompt}. Generate a JSON object representing my goal. \
         The response format should be:\n\
         {{\n  \"name\": \"A short goal name\",\n  \"steps\": [\"Step 1\", \"Step 2\", \"Step 3\", ...]\n}}\n\n\
         You may include an optional \"message\" field with a short reply to me.\n\
         The steps should be achievable with a clear definition of done.\n\
         Ensure the response is valid JSON."
    ));

    let mut messages = history.to_vec();
    messages.push(ChatMessage::user(instruction));
    messages
}

#[instrument(skip(state, payload))]
pub async fn ask_guru(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<GuruRequest>,
) -> ApiResult<Json<GuruResponse>> {
    let prompt = match payload.prompt.as_deref().map(str::trim) {
        Some(p) if !p.is_empty() => p.to_string(),
        _ => return Err(ApiError::Validation("prompt is required".into())),
    };

    // Resolve the target goal up front so a bad id fails before the AI call.
    let existing = match payload.goal_id {
        Some(goal_id) => {
            let goal = goals::repo::find_by_id(&state.db, goal_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Goal not found".into()))?;
            if goal.creator_id != user_id {
                return Err(ApiError::Forbidden("Not the goal owner".into()));
            }
            let steps = crate::steps::repo::by_goal(&state.db, goal_id).await?;
            Some((goal, steps))
        }
        None => None,
    };

    let messages = build_messages(
        &prompt,
        &payload.history,
        existing
            .as_ref()
            .map(|(g, s)| (g.name.as_str(), s.as_slice())),
    );

    let raw = state.ai.complete(&messages).await.map_err(|e| {
        warn!(error = %e, "AI completion failed");
        ApiError::AiApi(e.to_string())
    })?;

    // Parse before any write; a malformed response must not persist anything.
    let plan = parse_plan(&raw)?;

    let steps = match &existing {
        Some((goal, _)) => services::apply_plan_to_goal(&state.db, goal.id, &plan).await?,
        None => {
            let (goal_id, steps) = services::persist_new_plan(&state.db, user_id, &plan).await?;
            info!(goal_id = %goal_id, user_id = %user_id, "guru goal created");
            steps
        }
    };

    Ok(Json(GuruResponse {
        name: plan.name,
        steps: steps.into_iter().map(Into::into).collect(),
        message: plan.message,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instruction_embeds_the_prompt() {
        let messages = build_messages("learn Spanish", &[], None);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, "user");
        assert!(messages[0].content.contains("My goal is to learn Spanish."));
        assert!(messages[0].content.contains("valid JSON"));
    }

    #[test]
    fn history_precedes_the_instruction() {
        let history = vec![
            ChatMessage::user("earlier question"),
            ChatMessage {
                role: "assistant".into(),
                content: "earlier answer".into(),
            },
        ];
        let messages = build_messages("run a marathon", &history, None);
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[0].content, "earlier question");
        assert_eq!(messages[1].role, "assistant");
        assert!(messages[2].content.contains("run a marathon"));
    }

    #[test]
    fn refinement_mentions_the_current_plan() {
        use time::OffsetDateTime;
        use uuid::Uuid;

        let goal_id = Uuid::new_v4();
        let steps = vec![Step {
            id: Uuid::new_v4(),
            description: "Run 5k".into(),
            completed: false,
            goal_id,
            created_at: OffsetDateTime::UNIX_EPOCH,
        }];
        let messages = build_messages("go faster", &[], Some(("Run a 10k", &steps)));
        let content = &messages[0].content;
        assert!(content.contains("Run a 10k"));
        assert!(content.contains("Run 5k"));
        assert!(content.contains("go faster"));
    }
}
