use std::sync::Arc;

use axum::body::Body;
use axum::extract::Request;
use marka_auth::permissions::ROLE_MANAGER;
use marka_auth::{
    bearer_token, validate_bearer_token, ApiKeyService, AuthError, AuthState, CreateApiKeyRequest,
    DbAuditLogger,
};
use marka_database::test_utils::TestDatabase;
use marka_entities::users;
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::Mutex;
use uuid::Uuid;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

async fn create_test_user(test_db: &TestDatabase, username: &str) -> anyhow::Result<users::Model> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        auth_id: Set(format!("auth0|{}", username)),
        email: Set(format!("{}@example.com", username)),
        username: Set(username.to_string()),
        is_active: Set(true),
        is_verified: Set(true),
        is_superuser: Set(false),
        roles: Set(serde_json::json!([ROLE_MANAGER])),
        scopes: Set(serde_json::json!([])),
        ..Default::default()
    };

    Ok(user.insert(test_db.connection()).await?)
}

fn request_with_authorization(value: &str) -> Request {
    Request::builder()
        .uri("/api/clients")
        .header("authorization", value)
        .body(Body::empty())
        .unwrap()
}

#[test]
fn test_bearer_token_is_detached_from_the_request() {
    let req = request_with_authorization("Bearer mk_sometokenvalue");
    assert_eq!(bearer_token(&req).unwrap(), "mk_sometokenvalue");
}

#[test]
fn test_bearer_token_rejects_other_credential_formats() {
    let missing = Request::builder().body(Body::empty()).unwrap();
    assert!(matches!(
        bearer_token(&missing),
        Err(AuthError::Unauthorized(_))
    ));

    let basic = request_with_authorization("Basic dXNlcjpwYXNz");
    assert!(matches!(
        bearer_token(&basic),
        Err(AuthError::Unauthorized(_))
    ));

    let wrong_prefix = request_with_authorization("Bearer sk_othervendor");
    assert!(matches!(
        bearer_token(&wrong_prefix),
        Err(AuthError::Unauthorized(_))
    ));
}

#[tokio::test]
async fn test_valid_key_resolves_auth_context() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let db = test_db.connection_arc();
    let state = AuthState::new(db.clone(), Arc::new(DbAuditLogger::new(db.clone())));

    let user = create_test_user(&test_db, "activemanager").await?;
    let created = ApiKeyService::new(db)
        .create_api_key(
            user.id,
            CreateApiKeyRequest {
                name: "ci key".to_string(),
                role: None,
                scopes: None,
                expires_at: None,
            },
        )
        .await?;

    // Validation runs on the multithreaded runtime; spawning pins the
    // future's Send bound at compile time.
    let handle = tokio::spawn(async move {
        let req = request_with_authorization(&format!("Bearer {}", created.api_key));
        let token = bearer_token(&req)?;
        validate_bearer_token(&token, &state).await
    });

    let auth = handle
        .await?
        .map_err(|e| anyhow::anyhow!("validation failed: {:?}", e))?;
    assert_eq!(auth.user_id(), user.id);
    assert!(auth.has_privilege(ROLE_MANAGER));

    Ok(())
}

#[tokio::test]
async fn test_deactivated_user_key_is_rejected() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let db = test_db.connection_arc();
    let state = AuthState::new(db.clone(), Arc::new(DbAuditLogger::new(db.clone())));

    let user = create_test_user(&test_db, "formermanager").await?;
    let created = ApiKeyService::new(db.clone())
        .create_api_key(
            user.id,
            CreateApiKeyRequest {
                name: "leftover key".to_string(),
                role: None,
                scopes: None,
                expires_at: None,
            },
        )
        .await?;

    // The key stays valid; only the account is switched off
    users::ActiveModel {
        id: Set(user.id),
        is_active: Set(false),
        ..Default::default()
    }
    .update(db.as_ref())
    .await?;

    let result = validate_bearer_token(&created.api_key, &state).await;
    assert!(matches!(result, Err(AuthError::Unauthorized(_))));

    Ok(())
}
