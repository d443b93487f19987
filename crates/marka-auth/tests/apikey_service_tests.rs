use marka_auth::{ApiKeyService, ApiKeyServiceError, CreateApiKeyRequest, API_KEY_PREFIX};
use marka_auth::permissions::ROLE_USER;
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
        roles: Set(serde_json::json!([ROLE_USER])),
        scopes: Set(serde_json::json!([])),
        ..Default::default()
    };

    Ok(user.insert(test_db.connection()).await?)
}

fn create_request(name: &str) -> CreateApiKeyRequest {
    CreateApiKeyRequest {
        name: name.to_string(),
        role: None,
        scopes: None,
        expires_at: None,
    }
}

#[tokio::test]
async fn test_create_and_validate_api_key() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());
    let user = create_test_user(&test_db, "keyowner").await?;

    let created = service
        .create_api_key(user.id, create_request("ci key"))
        .await?;

    assert!(created.api_key.starts_with(API_KEY_PREFIX));
    assert_eq!(created.key_prefix.len(), 8);
    assert!(created.expires_at.is_some(), "default expiry should be set");

    let validated = service.validate_api_key(&created.api_key).await?;
    assert_eq!(validated.user.id, user.id);
    assert_eq!(validated.key_name, "ci key");
    assert_eq!(validated.key_id, created.id);

    // Validation records the key's last use
    let fetched = service.get_api_key(user.id, created.id).await?;
    assert!(fetched.last_used_at.is_some());

    Ok(())
}

#[tokio::test]
async fn test_duplicate_key_name_conflicts() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());
    let user = create_test_user(&test_db, "dupename").await?;

    service
        .create_api_key(user.id, create_request("deploy"))
        .await?;

    let result = service
        .create_api_key(user.id, create_request("deploy"))
        .await;
    assert!(matches!(result, Err(ApiKeyServiceError::Conflict(_))));

    Ok(())
}

#[tokio::test]
async fn test_invalid_key_rejected() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());

    let result = service.validate_api_key("mk_doesnotexist0000000000000000").await;
    assert!(matches!(result, Err(ApiKeyServiceError::Unauthorized(_))));

    Ok(())
}

#[tokio::test]
async fn test_expired_key_rejected() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());
    let user = create_test_user(&test_db, "expired").await?;

    let request = CreateApiKeyRequest {
        name: "stale".to_string(),
        role: None,
        scopes: None,
        expires_at: Some(chrono::Utc::now() - chrono::Duration::days(1)),
    };
    let created = service.create_api_key(user.id, request).await?;

    let result = service.validate_api_key(&created.api_key).await;
    assert!(matches!(result, Err(ApiKeyServiceError::Unauthorized(_))));

    Ok(())
}

#[tokio::test]
async fn test_deactivated_key_rejected() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());
    let user = create_test_user(&test_db, "revoked").await?;

    let created = service
        .create_api_key(user.id, create_request("temp"))
        .await?;

    service
        .update_api_key(
            user.id,
            created.id,
            marka_auth::UpdateApiKeyRequest {
                name: None,
                is_active: Some(false),
                expires_at: None,
            },
        )
        .await?;

    let result = service.validate_api_key(&created.api_key).await;
    assert!(matches!(result, Err(ApiKeyServiceError::Unauthorized(_))));

    Ok(())
}

#[tokio::test]
async fn test_invalid_role_scope_rejected() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());
    let user = create_test_user(&test_db, "badrole").await?;

    let request = CreateApiKeyRequest {
        name: "bad".to_string(),
        role: Some("role:superhero".to_string()),
        scopes: None,
        expires_at: None,
    };

    let result = service.create_api_key(user.id, request).await;
    assert!(matches!(result, Err(ApiKeyServiceError::Validation(_))));

    Ok(())
}

#[tokio::test]
async fn test_delete_api_key() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());
    let user = create_test_user(&test_db, "deleter").await?;

    let created = service
        .create_api_key(user.id, create_request("shortlived"))
        .await?;

    service.delete_api_key(user.id, created.id).await?;

    let result = service.get_api_key(user.id, created.id).await;
    assert!(matches!(result, Err(ApiKeyServiceError::NotFound(_))));

    let result = service.validate_api_key(&created.api_key).await;
    assert!(matches!(result, Err(ApiKeyServiceError::Unauthorized(_))));

    Ok(())
}

#[tokio::test]
async fn test_keys_are_scoped_to_owner() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ApiKeyService::new(test_db.connection_arc());
    let owner = create_test_user(&test_db, "owner").await?;
    let other = create_test_user(&test_db, "other").await?;

    let created = service
        .create_api_key(owner.id, create_request("private"))
        .await?;

    let result = service.get_api_key(other.id, created.id).await;
    assert!(matches!(result, Err(ApiKeyServiceError::NotFound(_))));

    let (keys, total) = service.list_api_keys(other.id, 1, 20).await?;
    assert_eq!(total, 0);
    assert!(keys.is_empty());

    Ok(())
}
