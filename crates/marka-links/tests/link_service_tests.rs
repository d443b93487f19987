use marka_core::ServiceError;
use marka_database::test_utils::TestDatabase;
use marka_entities::{clients, user_clients, users};
use marka_links::{
    CreateTrackingLinkRequest, TrackingLinkFilter, TrackingLinkService, UpdateTrackingLinkRequest,
};
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::Mutex;
use uuid::Uuid;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

fn create_request(url: &str) -> CreateTrackingLinkRequest {
    CreateTrackingLinkRequest {
        url: url.to_string(),
        client_id: None,
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
async fn test_create_link_decomposes_url() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let link = service
        .create_link(create_request(
            "https://shop.example.com/sale?id=7&utm_source=newsletter&utm_medium=email",
        ))
        .await?;

    assert_eq!(link.scheme, "https");
    assert_eq!(link.domain, "shop.example.com");
    assert_eq!(link.url_path, "/sale");
    assert_eq!(link.destination, "https://shop.example.com/sale?id=7");
    assert_eq!(link.utm_source.as_deref(), Some("newsletter"));
    assert_eq!(link.utm_medium.as_deref(), Some("email"));
    assert!(link.utm_campaign.is_none());
    assert_eq!(link.url_hash.len(), 64);
    assert!(link.is_active);

    Ok(())
}

#[tokio::test]
async fn test_duplicate_url_conflicts() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let url = "https://example.com/landing?utm_campaign=spring";
    service.create_link(create_request(url)).await?;
    let result = service.create_link(create_request(url)).await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_invalid_url_rejected() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let result = service
        .create_link(create_request("ftp://example.com/file"))
        .await;
    assert!(matches!(result, Err(ServiceError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_create_link_with_unknown_client_is_not_found() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let result = service
        .create_link(CreateTrackingLinkRequest {
            url: "https://example.com/orphan".to_string(),
            client_id: Some(Uuid::new_v4()),
        })
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_update_link_reparses_url() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let link = service
        .create_link(create_request("https://example.com/old?utm_source=a"))
        .await?;

    let updated = service
        .update_link(
            link.id,
            UpdateTrackingLinkRequest {
                url: Some("https://example.com/new?utm_source=b&utm_term=kw".to_string()),
                client_id: None,
                is_active: None,
            },
        )
        .await?;

    assert_ne!(updated.url_hash, link.url_hash);
    assert_eq!(updated.url_path, "/new");
    assert_eq!(updated.utm_source.as_deref(), Some("b"));
    assert_eq!(updated.utm_term.as_deref(), Some("kw"));
    assert_eq!(updated.destination, "https://example.com/new");

    Ok(())
}

#[tokio::test]
async fn test_update_to_existing_url_conflicts() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    service
        .create_link(create_request("https://example.com/taken"))
        .await?;
    let link = service
        .create_link(create_request("https://example.com/free"))
        .await?;

    let result = service
        .update_link(
            link.id,
            UpdateTrackingLinkRequest {
                url: Some("https://example.com/taken".to_string()),
                client_id: None,
                is_active: None,
            },
        )
        .await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_list_links_applies_filters() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    service
        .create_link(create_request(
            "https://a.example.com/x?utm_source=mail&utm_campaign=spring",
        ))
        .await?;
    service
        .create_link(create_request(
            "https://b.example.com/y?utm_source=ads&utm_campaign=spring",
        ))
        .await?;

    let by_source = TrackingLinkFilter {
        utm_source: Some("mail".to_string()),
        ..Default::default()
    };
    let (links, total) = service.list_links(&by_source, None, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(links[0].domain, "a.example.com");

    let by_campaign = TrackingLinkFilter {
        utm_campaign: Some("spring".to_string()),
        ..Default::default()
    };
    let (_, total) = service.list_links(&by_campaign, None, 1, 20).await?;
    assert_eq!(total, 2);

    let by_domain = TrackingLinkFilter {
        domain: Some("b.example.com".to_string()),
        ..Default::default()
    };
    let (links, total) = service.list_links(&by_domain, None, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(links[0].utm_source.as_deref(), Some("ads"));

    Ok(())
}

#[tokio::test]
async fn test_list_links_restricted_to_allowed_clients() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let mine = create_client(&test_db, "mine").await?;
    let theirs = create_client(&test_db, "theirs").await?;

    service
        .create_link(CreateTrackingLinkRequest {
            url: "https://example.com/mine".to_string(),
            client_id: Some(mine.id),
        })
        .await?;
    service
        .create_link(CreateTrackingLinkRequest {
            url: "https://example.com/theirs".to_string(),
            client_id: Some(theirs.id),
        })
        .await?;
    // Unassigned link is invisible to scoped listings too
    service
        .create_link(create_request("https://example.com/unassigned"))
        .await?;

    let filter = TrackingLinkFilter::default();
    let allowed = vec![mine.id];
    let (links, total) = service.list_links(&filter, Some(&allowed), 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(links[0].client_id, Some(mine.id));

    let (_, all_total) = service.list_links(&filter, None, 1, 20).await?;
    assert_eq!(all_total, 3);

    Ok(())
}

#[tokio::test]
async fn test_clients_for_user_lists_memberships() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        auth_id: Set("auth0|linker".to_string()),
        email: Set("linker@example.com".to_string()),
        username: Set("linker".to_string()),
        is_active: Set(true),
        is_verified: Set(true),
        is_superuser: Set(false),
        roles: Set(serde_json::json!([])),
        scopes: Set(serde_json::json!([])),
        ..Default::default()
    }
    .insert(test_db.connection())
    .await?;

    let client = create_client(&test_db, "membership").await?;
    user_clients::ActiveModel {
        user_id: Set(user.id),
        client_id: Set(client.id),
        ..Default::default()
    }
    .insert(test_db.connection())
    .await?;

    let memberships = service.clients_for_user(user.id).await?;
    assert_eq!(memberships, vec![client.id]);

    Ok(())
}

#[tokio::test]
async fn test_delete_link_removes_record() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = TrackingLinkService::new(test_db.connection_arc());

    let link = service
        .create_link(create_request("https://example.com/doomed"))
        .await?;
    service.delete_link(link.id).await?;

    let result = service.get_link(link.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}
