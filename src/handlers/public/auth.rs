// Public authentication endpoints: registration and login. These are the
// only routes that do not pass through the bearer-token middleware.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{generate_jwt, hash_password, verify_password, AuthError, Claims};
use crate::config;
use crate::database::{service, Database};
use crate::error::ApiError;

const MAX_HANDLE_LEN: usize = 30;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub handle: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub handle: String,
    pub password: String,
}

/// POST /auth/register - Create a new user account
///
/// Expected input: `{"handle": "alice", "password": "..."}`.
/// Returns 201 with the created user (id, handle, created_at), or 409 when
/// the handle is already taken.
pub async fn register(
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let handle = payload.handle.trim().to_string();
    validate_handle(&handle)?;

    let password_hash = hash_password(&payload.password)?;

    let pool = Database::pool().await?;
    let user = match service::insert_user(&pool, &handle, &password_hash).await {
        Ok(user) => user,
        Err(e) if service::is_unique_violation(&e) => {
            return Err(ApiError::conflict(format!(
                "Handle '{}' is already taken",
                handle
            )));
        }
        Err(e) => return Err(e.into()),
    };

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "success": true,
            "data": {
                "id": user.id,
                "handle": user.handle,
                "created_at": user.created_at
            }
        })),
    ))
}

/// POST /auth/login - Authenticate and receive a bearer token
///
/// Expected input: `{"handle": "alice", "password": "..."}`.
/// Returns the JWT, the user it identifies, and its lifetime in seconds.
/// Invalid handle and invalid password are indistinguishable to the caller.
pub async fn login(Json(payload): Json<LoginRequest>) -> Result<impl IntoResponse, ApiError> {
    let pool = Database::pool().await?;

    let user = service::find_user_by_handle(&pool, payload.handle.trim())
        .await?
        .ok_or(AuthError::InvalidCredentials)?;

    verify_password(&payload.password, &user.password_hash)?;

    let claims = Claims::new(user.id, user.handle.clone());
    let token = generate_jwt(&claims)?;
    let expires_in = config::config().security.jwt_expiry_hours * 3600;

    Ok(Json(json!({
        "success": true,
        "data": {
            "token": token,
            "user": {
                "id": user.id,
                "handle": user.handle,
                "created_at": user.created_at
            },
            "expires_in": expires_in
        }
    })))
}

fn validate_handle(handle: &str) -> Result<(), ApiError> {
    if handle.is_empty() {
        return Err(ApiError::validation_error("Handle is required"));
    }
    if handle.len() > MAX_HANDLE_LEN {
        return Err(ApiError::validation_error(format!(
            "Handle exceeds {} characters",
            MAX_HANDLE_LEN
        )));
    }
    if !handle
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
    {
        return Err(ApiError::validation_error(
            "Handle may only contain letters, digits, '_' and '.'",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_reasonable_handles() {
        assert!(validate_handle("alice").is_ok());
        assert!(validate_handle("alice_b.99").is_ok());
    }

    #[test]
    fn rejects_bad_handles() {
        assert!(validate_handle("").is_err());
        assert!(validate_handle("has spaces").is_err());
        assert!(validate_handle(&"x".repeat(31)).is_err());
        assert!(validate_handle("semi;colon").is_err());
    }
}
