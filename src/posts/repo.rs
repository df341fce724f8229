use serde::{Deserialize, Serialize};
use sqlx::{types::Json, FromRow, PgPool};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::posts::dto::FeedCommentView;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Post {
    pub id: Uuid,
    pub description: String,
    pub poster_id: Uuid,
    pub image_urls: Vec<String>,
    pub publish_time: OffsetDateTime,
}

/// One feed row: the post joined with its poster, like count, the viewer's
/// like flag, and the comments (with commentor usernames) as a JSON array —
/// all computed in a single round trip.
#[derive(Debug, FromRow)]
pub struct FeedRow {
    pub id: Uuid,
    pub description: String,
    pub publish_time: OffsetDateTime,
    pub image_urls: Vec<String>,
    pub poster_id: Uuid,
    pub poster_username: String,
    pub poster_profile_image: String,
    pub likes_count: i64,
    pub is_liked_by_user: bool,
    pub comments: Json<Vec<FeedCommentView>>,
}

const FEED_SELECT: &str = r#"
SELECT p.id,
       p.description,
       p.publish_time,
       p.image_urls,
       u.id AS poster_id,
       u.username AS poster_username,
       u.profile_image AS poster_profile_image,
       (SELECT count(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
       EXISTS (
           SELECT 1 FROM likes l WHERE l.post_id = p.id AND l.user_id = $1
       ) AS is_liked_by_user,
       COALESCE((
           SELECT json_agg(
                      json_build_object('content', c.content, 'username', cu.username)
                      ORDER BY c.created_at, c.id
                  )
           FROM comments c
           JOIN users cu ON cu.id = c.commentor_id
           WHERE c.post_id = p.id
       ), '[]'::json) AS comments
FROM posts p
JOIN users u ON u.id = p.poster_id
"#;

/// Newest first; ties broken by id so pages are stable.
pub async fn feed_page(
    db: &PgPool,
    viewer: Uuid,
    limit: i64,
    offset: i64,
) -> Result<Vec<FeedRow>, sqlx::Error> {
    sqlx::query_as::<_, FeedRow>(&format!(
        "{FEED_SELECT} ORDER BY p.publish_time DESC, p.id LIMIT $2 OFFSET $3"
    ))
    .bind(viewer)
    .bind(limit)
    .bind(offset)
    .fetch_all(db)
    .await
}

pub async fn view_one(
    db: &PgPool,
    viewer: Uuid,
    post_id: Uuid,
) -> Result<Option<FeedRow>, sqlx::Error> {
    sqlx::query_as::<_, FeedRow>(&format!("{FEED_SELECT} WHERE p.id = $2"))
        .bind(viewer)
        .bind(post_id)
        .fetch_optional(db)
        .await
}

pub async fn insert(
    db: &PgPool,
    poster_id: Uuid,
    description: &str,
    image_names: &[String],
) -> Result<Post, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        INSERT INTO posts (description, poster_id, image_urls)
        VALUES ($1, $2, $3)
        RETURNING id, description, poster_id, image_urls, publish_time
        "#,
    )
    .bind(description)
    .bind(poster_id)
    .bind(image_names)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        "SELECT id, description, poster_id, image_urls, publish_time FROM posts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}

pub async fn by_poster(db: &PgPool, poster_id: Uuid) -> Result<Vec<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        SELECT id, description, poster_id, image_urls, publish_time
        FROM posts
        WHERE poster_id = $1
        ORDER BY publish_time DESC, id
        "#,
    )
    .bind(poster_id)
    .fetch_all(db)
    .await
}

pub async fn update_description(
    db: &PgPool,
    id: Uuid,
    description: &str,
) -> Result<Option<Post>, sqlx::Error> {
    sqlx::query_as::<_, Post>(
        r#"
        UPDATE posts SET description = $2
        WHERE id = $1
        RETURNING id, description, poster_id, image_urls, publish_time
        "#,
    )
    .bind(id)
    .bind(description)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<u64, sqlx::Error> {
    let res = sqlx::query("DELETE FROM posts WHERE id = $1")
        .bind(id)
        .execute(db)
        .await?;
    Ok(res.rows_affected())
}
