use marka_core::ServiceError;
use marka_database::test_utils::TestDatabase;
use marka_entities::{client_websites, clients};
use marka_websites::{CreateWebsiteRequest, UpdateWebsiteRequest, WebsiteService};
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::Mutex;
use uuid::Uuid;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

fn create_request(domain: &str) -> CreateWebsiteRequest {
    CreateWebsiteRequest {
        domain: domain.to_string(),
        is_secure: None,
    }
}

async fn create_client(test_db: &TestDatabase, slug: &str) -> anyhow::Result<clients::Model> {
    let client = clients::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set(slug.to_string()),
        title: Set(format!("Client {}", slug)),
        description: Set(None),
        is_active: Set(true),
        ..Default::default()
    };
    Ok(client.insert(test_db.connection()).await?)
}

#[tokio::test]
async fn test_create_website_normalizes_domain() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = WebsiteService::new(test_db.connection_arc());

    let website = service
        .create_website(CreateWebsiteRequest {
            domain: "  Shop.Example.COM ".to_string(),
            is_secure: None,
        })
        .await?;

    assert_eq!(website.domain, "shop.example.com");
    assert!(website.is_secure);
    assert!(website.is_active);

    Ok(())
}

#[tokio::test]
async fn test_create_website_rejects_duplicate_domain() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = WebsiteService::new(test_db.connection_arc());

    service.create_website(create_request("dup.example.com")).await?;
    let result = service.create_website(create_request("dup.example.com")).await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_create_website_rejects_invalid_domain() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = WebsiteService::new(test_db.connection_arc());

    let result = service
        .create_website(create_request("https://not-a-domain"))
        .await;

    assert!(matches!(result, Err(ServiceError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_update_website_changes_domain_and_scheme() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = WebsiteService::new(test_db.connection_arc());

    let website = service.create_website(create_request("old.example.com")).await?;

    let updated = service
        .update_website(
            website.id,
            UpdateWebsiteRequest {
                domain: Some("new.example.com".to_string()),
                is_secure: Some(false),
                is_active: None,
            },
        )
        .await?;

    assert_eq!(updated.domain, "new.example.com");
    assert!(!updated.is_secure);
    assert_eq!(updated.get_link(), "http://new.example.com");

    Ok(())
}

#[tokio::test]
async fn test_update_website_rejects_taken_domain() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = WebsiteService::new(test_db.connection_arc());

    service.create_website(create_request("first.example.com")).await?;
    let second = service.create_website(create_request("second.example.com")).await?;

    let result = service
        .update_website(
            second.id,
            UpdateWebsiteRequest {
                domain: Some("first.example.com".to_string()),
                is_secure: None,
                is_active: None,
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_delete_website_removes_record() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = WebsiteService::new(test_db.connection_arc());

    let website = service.create_website(create_request("gone.example.com")).await?;
    service.delete_website(website.id).await?;

    let result = service.get_website(website.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_list_websites_filters_by_client() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = WebsiteService::new(test_db.connection_arc());

    let owned = service.create_website(create_request("owned.example.com")).await?;
    service.create_website(create_request("other.example.com")).await?;

    let client = create_client(&test_db, "owner").await?;
    client_websites::ActiveModel {
        client_id: Set(client.id),
        website_id: Set(owned.id),
        ..Default::default()
    }
    .insert(test_db.connection())
    .await?;

    let (scoped, scoped_total) = service.list_websites(1, 20, Some(client.id)).await?;
    assert_eq!(scoped_total, 1);
    assert_eq!(scoped.len(), 1);
    assert_eq!(scoped[0].id, owned.id);

    let (all, all_total) = service.list_websites(1, 20, None).await?;
    assert_eq!(all_total, 2);
    assert_eq!(all.len(), 2);

    Ok(())
}
