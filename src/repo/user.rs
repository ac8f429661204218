use crate::model::{role::Role, user::User};
use sqlx::{Executor, Sqlite, SqlitePool};

pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, password, role, intern_id
        FROM users
        WHERE username = ?
        "#,
    )
    .bind(username)
    .fetch_optional(pool)
    .await
}

pub async fn username_exists(pool: &SqlitePool, username: &str) -> Result<bool, sqlx::Error> {
    sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = ? LIMIT 1)")
        .bind(username)
        .fetch_one(pool)
        .await
}

/// Inserts an account whose password is already hashed. Returns the new id.
pub async fn insert<'e, E>(
    executor: E,
    username: &str,
    password_hash: &str,
    role: Role,
    intern_id: Option<i64>,
) -> Result<i64, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query(
        r#"INSERT INTO users (username, password, role, intern_id) VALUES (?, ?, ?, ?)"#,
    )
    .bind(username)
    .bind(password_hash)
    .bind(role.as_ref())
    .bind(intern_id)
    .execute(executor)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Links an orphaned intern account back to an intern. Returns whether a row
/// changed; admin accounts and accounts still linked are left alone.
pub async fn relink_orphan(
    pool: &SqlitePool,
    username: &str,
    intern_id: i64,
) -> Result<bool, sqlx::Error> {
    let result = sqlx::query(
        r#"
        UPDATE users SET intern_id = ?
        WHERE username = ? AND role = ? AND intern_id IS NULL
        "#,
    )
    .bind(intern_id)
    .bind(username)
    .bind(Role::User.as_ref())
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}
