use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, Clone, FromRow)]
pub struct Comment {
    pub id: Uuid,
    pub content: String,
    pub commentor_id: Uuid,
    pub post_id: Uuid,
}

#[derive(Debug, FromRow)]
pub struct CommentUserRow {
    pub id: Uuid,
    pub content: String,
    pub username: String,
    pub post_id: Uuid,
}

const COLUMNS: &str = "id, content, commentor_id, post_id";

pub async fn insert(
    db: &PgPool,
    commentor_id: Uuid,
    post_id: Uuid,
    content: &str,
) -> Result<Comment, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        INSERT INTO comments (content, commentor_id, post_id)
        VALUES ($1, $2, $3)
        RETURNING id, content, commentor_id, post_id
        "#,
    )
    .bind(content)
    .bind(commentor_id)
    .bind(post_id)
    .fetch_one(db)
    .await
}

pub async fn find_by_id(db: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(&format!("SELECT {COLUMNS} FROM comments WHERE id = $1"))
        .bind(id)
        .fetch_optional(db)
        .await
}

pub async fn by_post(db: &PgPool, post_id: Uuid) -> Result<Vec<CommentUserRow>, sqlx::Error> {
    sqlx::query_as::<_, CommentUserRow>(
        r#"
        SELECT c.id, c.content, u.username, c.post_id
        FROM comments c
        JOIN users u ON u.id = c.commentor_id
        WHERE c.post_id = $1
        ORDER BY c.created_at, c.id
        "#,
    )
    .bind(post_id)
    .fetch_all(db)
    .await
}

pub async fn update_content(
    db: &PgPool,
    id: Uuid,
    content: &str,
) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        r#"
        UPDATE comments SET content = $2
        WHERE id = $1
        RETURNING id, content, commentor_id, post_id
        "#,
    )
    .bind(id)
    .bind(content)
    .fetch_optional(db)
    .await
}

pub async fn delete(db: &PgPool, id: Uuid) -> Result<Option<Comment>, sqlx::Error> {
    sqlx::query_as::<_, Comment>(
        "DELETE FROM comments WHERE id = $1 RETURNING id, content, commentor_id, post_id",
    )
    .bind(id)
    .fetch_optional(db)
    .await
}
