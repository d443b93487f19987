use marka_clients::{ClientService, CreateClientRequest, UpdateClientRequest};
use marka_core::ServiceError;
use marka_database::test_utils::TestDatabase;
use marka_entities::{users, websites};
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::Mutex;
use uuid::Uuid;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

async fn create_user(test_db: &TestDatabase, username: &str) -> anyhow::Result<users::Model> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        auth_id: Set(format!("auth0|{}", username)),
        email: Set(format!("{}@example.com", username)),
        username: Set(username.to_string()),
        is_active: Set(true),
        is_verified: Set(true),
        is_superuser: Set(false),
        roles: Set(serde_json::json!([])),
        scopes: Set(serde_json::json!([])),
        ..Default::default()
    };
    Ok(user.insert(test_db.connection()).await?)
}

async fn create_website(test_db: &TestDatabase, domain: &str) -> anyhow::Result<websites::Model> {
    let website = websites::ActiveModel {
        id: Set(Uuid::new_v4()),
        domain: Set(domain.to_string()),
        is_secure: Set(true),
        is_active: Set(true),
        ..Default::default()
    };
    Ok(website.insert(test_db.connection()).await?)
}

fn create_request(title: &str) -> CreateClientRequest {
    CreateClientRequest {
        title: title.to_string(),
        description: None,
    }
}

#[tokio::test]
async fn test_create_client_slugifies_title() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let client = service
        .create_client(create_request("Acme Marketing GmbH"))
        .await?;

    assert_eq!(client.slug, "acme-marketing-gmbh");
    assert_eq!(client.title, "Acme Marketing GmbH");
    assert!(client.is_active);

    Ok(())
}

#[tokio::test]
async fn test_create_client_rejects_duplicate_title() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    service.create_client(create_request("Duplicate Co")).await?;
    let result = service.create_client(create_request("Duplicate Co")).await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_create_client_rejects_colliding_slug() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    service.create_client(create_request("Slug Target")).await?;
    // Different title, same slug after normalization
    let result = service.create_client(create_request("slug target")).await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_create_client_validates_title_length() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let too_short = service.create_client(create_request("Abc")).await;
    assert!(matches!(too_short, Err(ServiceError::Validation { .. })));

    let too_long = service.create_client(create_request(&"x".repeat(97))).await;
    assert!(matches!(too_long, Err(ServiceError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_update_client_reslugs_on_title_change() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let client = service.create_client(create_request("Old Name Inc")).await?;

    let updated = service
        .update_client(
            client.id,
            UpdateClientRequest {
                title: Some("New Name Inc".to_string()),
                description: Some("Rebranded".to_string()),
                is_active: None,
            },
        )
        .await?;

    assert_eq!(updated.title, "New Name Inc");
    assert_eq!(updated.slug, "new-name-inc");
    assert_eq!(updated.description.as_deref(), Some("Rebranded"));

    Ok(())
}

#[tokio::test]
async fn test_update_client_rejects_taken_title() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    service.create_client(create_request("First Agency")).await?;
    let second = service.create_client(create_request("Second Agency")).await?;

    let result = service
        .update_client(
            second.id,
            UpdateClientRequest {
                title: Some("First Agency".to_string()),
                description: None,
                is_active: None,
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_deactivate_client_keeps_record() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let client = service.create_client(create_request("Dormant Ltd")).await?;
    let deactivated = service.deactivate_client(client.id).await?;

    assert!(!deactivated.is_active);
    assert_eq!(service.get_client(client.id).await?.id, client.id);

    Ok(())
}

#[tokio::test]
async fn test_delete_client_removes_record() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let client = service.create_client(create_request("Gone Forever")).await?;
    service.delete_client(client.id).await?;

    let result = service.get_client(client.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_user_assignment_is_idempotent() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let client = service.create_client(create_request("Staffed Agency")).await?;
    let user = create_user(&test_db, "staffer").await?;

    service.assign_user(client.id, user.id).await?;
    service.assign_user(client.id, user.id).await?;

    let users = service.list_users(client.id).await?;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].id, user.id);

    service.remove_user(client.id, user.id).await?;
    assert!(service.list_users(client.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_remove_missing_user_association_is_not_found() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let client = service.create_client(create_request("Empty Agency")).await?;
    let user = create_user(&test_db, "unassigned").await?;

    let result = service.remove_user(client.id, user.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_website_assignment_round_trip() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let client = service.create_client(create_request("Web Agency")).await?;
    let website = create_website(&test_db, "agency.example.com").await?;

    service.assign_website(client.id, website.id).await?;
    service.assign_website(client.id, website.id).await?;

    let websites = service.list_websites(client.id).await?;
    assert_eq!(websites.len(), 1);
    assert_eq!(websites[0].id, website.id);

    service.remove_website(client.id, website.id).await?;
    assert!(service.list_websites(client.id).await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_list_clients_for_user_filters_by_membership() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = ClientService::new(test_db.connection_arc());

    let mine = service.create_client(create_request("Mine Agency")).await?;
    service.create_client(create_request("Theirs Agency")).await?;
    let user = create_user(&test_db, "scoped").await?;
    service.assign_user(mine.id, user.id).await?;

    let (clients, total) = service.list_clients_for_user(user.id, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(clients.len(), 1);
    assert_eq!(clients[0].id, mine.id);

    let (all, all_total) = service.list_clients(1, 20).await?;
    assert_eq!(all_total, 2);
    assert_eq!(all.len(), 2);

    Ok(())
}
