mod common;

use anyhow::Result;
use reqwest::StatusCode;
use uuid::Uuid;

use snapfeed::auth::{generate_jwt, Claims};

// Both this process and the spawned server run in development mode, so
// tokens minted here validate against the server's signing secret.
fn bearer_token() -> String {
    generate_jwt(&Claims::new(Uuid::new_v4(), "itest".to_string())).expect("token")
}

#[tokio::test]
async fn authenticated_upload_without_file_part_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("caption", "hello");
    let res = client
        .post(format!("{}/api/posts", server.base_url))
        .bearer_auth(bearer_token())
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["code"], "VALIDATION_ERROR");
    Ok(())
}

#[tokio::test]
async fn upload_with_unsupported_media_kind_is_rejected() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let file = reqwest::multipart::Part::bytes(b"plain text".to_vec())
        .file_name("notes.txt")
        .mime_str("text/plain")?;
    let form = reqwest::multipart::Form::new()
        .part("file", file)
        .text("caption", "hello");

    let res = client
        .post(format!("{}/api/posts", server.base_url))
        .bearer_auth(bearer_token())
        .multipart(form)
        .send()
        .await?;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn delete_with_malformed_id_is_a_client_error() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .delete(format!("{}/api/posts/not-a-uuid", server.base_url))
        .bearer_auth(bearer_token())
        .send()
        .await?;

    assert!(
        res.status().is_client_error(),
        "expected client error, got {}",
        res.status()
    );
    Ok(())
}

#[tokio::test]
async fn delete_nonexistent_post_is_not_found_or_db_unavailable() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .delete(format!("{}/api/posts/{}", server.base_url, Uuid::new_v4()))
        .bearer_auth(bearer_token())
        .send()
        .await?;

    // NOT_FOUND with a reachable database; a 5xx without one
    assert!(
        res.status() == StatusCode::NOT_FOUND
            || res.status() == StatusCode::SERVICE_UNAVAILABLE
            || res.status() == StatusCode::INTERNAL_SERVER_ERROR,
        "unexpected status: {}",
        res.status()
    );
    Ok(())
}
