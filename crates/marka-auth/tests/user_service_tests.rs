use marka_auth::permissions::{Role, ROLE_MANAGER, ROLE_USER};
use marka_auth::{CreateUserRequest, UpdateUserRequest, UserService};
use marka_core::ServiceError;
use marka_database::test_utils::TestDatabase;
use tokio::sync::Mutex;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

fn create_request(username: &str) -> CreateUserRequest {
    CreateUserRequest {
        auth_id: format!("auth0|{}", username),
        email: format!("{}@example.com", username),
        username: username.to_string(),
        roles: None,
    }
}

#[tokio::test]
async fn test_create_user_with_default_role() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    let user = service.create_user(create_request("fresh")).await?;

    assert_eq!(user.username, "fresh");
    assert!(user.is_active);
    assert!(!user.is_superuser);
    assert_eq!(user.roles, serde_json::json!([ROLE_USER]));

    Ok(())
}

#[tokio::test]
async fn test_duplicate_user_conflicts() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    service.create_user(create_request("taken")).await?;

    let result = service.create_user(create_request("taken")).await;
    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_invalid_role_scope_rejected() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    let request = CreateUserRequest {
        roles: Some(vec!["role:wizard".to_string()]),
        ..create_request("wizard")
    };

    let result = service.create_user(request).await;
    assert!(matches!(result, Err(ServiceError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_update_user_rejects_taken_username() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    service.create_user(create_request("first")).await?;
    let second = service.create_user(create_request("second")).await?;

    let result = service
        .update_user(
            second.id,
            UpdateUserRequest {
                email: None,
                username: Some("first".to_string()),
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_role_assignment_is_idempotent() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    let user = service.create_user(create_request("promotee")).await?;

    service.assign_role(user.id, Role::Manager).await?;
    let user = service.assign_role(user.id, Role::Manager).await?;
    assert_eq!(user.roles, serde_json::json!([ROLE_USER, ROLE_MANAGER]));

    let user = service.remove_role(user.id, Role::Manager).await?;
    assert_eq!(user.roles, serde_json::json!([ROLE_USER]));

    Ok(())
}

#[tokio::test]
async fn test_scope_grant_and_revoke() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    let user = service.create_user(create_request("scoped")).await?;

    let user = service.grant_scope(user.id, "reports:export").await?;
    assert_eq!(user.scopes, serde_json::json!(["reports:export"]));

    let user = service.revoke_scope(user.id, "reports:export").await?;
    assert_eq!(user.scopes, serde_json::json!([]));

    Ok(())
}

#[tokio::test]
async fn test_activation_round_trip() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    let user = service.create_user(create_request("toggled")).await?;

    let user = service.set_active(user.id, false).await?;
    assert!(!user.is_active);

    let user = service.set_active(user.id, true).await?;
    assert!(user.is_active);

    Ok(())
}

#[tokio::test]
async fn test_delete_user() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = UserService::new(test_db.connection_arc());

    let user = service.create_user(create_request("doomed")).await?;
    service.delete_user(user.id).await?;

    let result = service.get_user(user.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}
