use axum::{response::Json, Extension};
use serde_json::{json, Value};

use crate::middleware::AuthUser;

/// GET /api/auth/whoami - Echo the acting identity resolved from the token
pub async fn whoami(Extension(auth): Extension<AuthUser>) -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "id": auth.user_id,
            "handle": auth.handle
        }
    }))
}
