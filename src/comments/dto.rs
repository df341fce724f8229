use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub content: Option<String>,
    pub post_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateCommentRequest {
    pub content: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: Uuid,
    pub content: String,
    pub commentor_id: Uuid,
    pub post_id: Uuid,
}

/// Comment with the commentor's display name resolved, as listed per post.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentWithUser {
    pub id: Uuid,
    pub content: String,
    pub username: String,
    pub post_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct DeletedCommentResponse {
    pub message: String,
    #[serde(rename = "deletedComment")]
    pub deleted_comment: CommentResponse,
}
