use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::manager::DatabaseError;
use crate::database::models::User;

/// Look up a user by login handle
pub async fn find_user_by_handle(
    pool: &PgPool,
    handle: &str,
) -> Result<Option<User>, DatabaseError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, handle, password_hash, created_at
         FROM users
         WHERE handle = $1",
    )
    .bind(handle)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

/// Insert a new user row. The unique constraint on handle surfaces as a
/// sqlx database error; callers map it to a conflict.
pub async fn insert_user(
    pool: &PgPool,
    handle: &str,
    password_hash: &str,
) -> Result<User, DatabaseError> {
    let user = User {
        id: Uuid::new_v4(),
        handle: handle.to_string(),
        password_hash: password_hash.to_string(),
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (id, handle, password_hash, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(user.id)
    .bind(&user.handle)
    .bind(&user.password_hash)
    .bind(user.created_at)
    .execute(pool)
    .await?;

    Ok(user)
}

/// True when a sqlx error is a unique-constraint violation (Postgres 23505)
pub fn is_unique_violation(err: &DatabaseError) -> bool {
    match err {
        DatabaseError::Sqlx(sqlx::Error::Database(db_err)) => {
            db_err.code().as_deref() == Some("23505")
        }
        _ => false,
    }
}
