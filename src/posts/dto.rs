use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_limit")]
    pub limit: i64,
}
fn default_page() -> i64 {
    1
}
fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PosterView {
    pub id: Uuid,
    pub username: String,
    pub profile_image: String,
}

/// Comment as projected into the feed: content plus the commentor's display
/// name, resolved in the aggregation query.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedCommentView {
    pub content: String,
    pub username: String,
}

/// A post as the viewer sees it in the feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_time: OffsetDateTime,
    pub image_urls: Vec<String>,
    pub poster: PosterView,
    pub likes_count: i64,
    pub is_liked_by_user: bool,
    pub comments: Vec<FeedCommentView>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub page: i64,
    pub limit: i64,
    pub posts: Vec<PostView>,
    pub has_more: bool,
}

/// Raw post shape used by the by-sender listing and update responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSummary {
    pub id: Uuid,
    pub description: String,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_time: OffsetDateTime,
    pub image_urls: Vec<String>,
    pub poster_id: Uuid,
}

#[derive(Debug, Deserialize)]
pub struct SenderQuery {
    pub id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feed_query_defaults() {
        let q: FeedQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 10);
    }

    #[test]
    fn post_view_wire_shape() {
        let view = PostView {
            id: Uuid::new_v4(),
            description: "hello".into(),
            publish_time: OffsetDateTime::UNIX_EPOCH,
            image_urls: vec![],
            poster: PosterView {
                id: Uuid::new_v4(),
                username: "alice".into(),
                profile_image: "".into(),
            },
            likes_count: 0,
            is_liked_by_user: false,
            comments: vec![],
        };
        let json = serde_json::to_string(&view).unwrap();
        assert!(json.contains("\"likesCount\":0"));
        assert!(json.contains("\"isLikedByUser\":false"));
        assert!(json.contains("\"publishTime\":\"1970-01-01T00:00:00Z\""));
        assert!(json.contains("\"comments\":[]"));
    }
}
