use marka_core::ServiceError;
use marka_database::test_utils::TestDatabase;
use marka_websites::{
    CreatePageRequest, CreateSitemapRequest, CreateWebsiteRequest, PageService, SitemapService,
    UpdatePageRequest, UpdateSitemapRequest, WebsiteService,
};
use tokio::sync::Mutex;
use uuid::Uuid;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

async fn create_website(test_db: &TestDatabase, domain: &str) -> anyhow::Result<Uuid> {
    let service = WebsiteService::new(test_db.connection_arc());
    let website = service
        .create_website(CreateWebsiteRequest {
            domain: domain.to_string(),
            is_secure: None,
        })
        .await?;
    Ok(website.id)
}

fn page_request(url: &str) -> CreatePageRequest {
    CreatePageRequest {
        url: url.to_string(),
        status: None,
        priority: None,
        last_modified: None,
        change_frequency: None,
        sitemap_id: None,
    }
}

#[tokio::test]
async fn test_sitemap_crud_round_trip() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = SitemapService::new(test_db.connection_arc());
    let website_id = create_website(&test_db, "maps.example.com").await?;

    let sitemap = service
        .create_sitemap(
            website_id,
            CreateSitemapRequest {
                url: "/sitemap.xml".to_string(),
            },
        )
        .await?;
    assert!(sitemap.is_active);
    assert_eq!(sitemap.website_id, website_id);

    let updated = service
        .update_sitemap(
            sitemap.id,
            UpdateSitemapRequest {
                url: Some("/sitemap_index.xml".to_string()),
                is_active: Some(false),
            },
        )
        .await?;
    assert_eq!(updated.url, "/sitemap_index.xml");
    assert!(!updated.is_active);

    let (sitemaps, total) = service.list_sitemaps(website_id, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(sitemaps[0].id, sitemap.id);

    service.delete_sitemap(sitemap.id).await?;
    let result = service.get_sitemap(sitemap.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_sitemap_duplicate_url_per_website_conflicts() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = SitemapService::new(test_db.connection_arc());
    let first = create_website(&test_db, "one.example.com").await?;
    let second = create_website(&test_db, "two.example.com").await?;

    let request = CreateSitemapRequest {
        url: "/sitemap.xml".to_string(),
    };
    service.create_sitemap(first, request.clone()).await?;

    let conflict = service.create_sitemap(first, request.clone()).await;
    assert!(matches!(conflict, Err(ServiceError::AlreadyExists { .. })));

    // Same URL on another website is fine
    service.create_sitemap(second, request).await?;

    Ok(())
}

#[tokio::test]
async fn test_sitemap_for_unknown_website_is_not_found() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = SitemapService::new(test_db.connection_arc());

    let result = service
        .create_sitemap(
            Uuid::new_v4(),
            CreateSitemapRequest {
                url: "/sitemap.xml".to_string(),
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_page_defaults_and_validation() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = PageService::new(test_db.connection_arc());
    let website_id = create_website(&test_db, "pages.example.com").await?;

    let page = service.create_page(website_id, page_request("/about")).await?;
    assert_eq!(page.status, 200);
    assert_eq!(page.priority, 0.5);
    assert!(page.sitemap_id.is_none());

    let bad_priority = service
        .create_page(
            website_id,
            CreatePageRequest {
                priority: Some(1.5),
                ..page_request("/bad-priority")
            },
        )
        .await;
    assert!(matches!(bad_priority, Err(ServiceError::Validation { .. })));

    let bad_status = service
        .create_page(
            website_id,
            CreatePageRequest {
                status: Some(42),
                ..page_request("/bad-status")
            },
        )
        .await;
    assert!(matches!(bad_status, Err(ServiceError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_page_sitemap_must_belong_to_website() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let page_service = PageService::new(test_db.connection_arc());
    let sitemap_service = SitemapService::new(test_db.connection_arc());

    let website_id = create_website(&test_db, "mine.example.com").await?;
    let other_id = create_website(&test_db, "elsewhere.example.com").await?;
    let foreign_sitemap = sitemap_service
        .create_sitemap(
            other_id,
            CreateSitemapRequest {
                url: "/sitemap.xml".to_string(),
            },
        )
        .await?;

    let result = page_service
        .create_page(
            website_id,
            CreatePageRequest {
                sitemap_id: Some(foreign_sitemap.id),
                ..page_request("/cross")
            },
        )
        .await;
    assert!(matches!(result, Err(ServiceError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_page_list_filters_by_sitemap() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let page_service = PageService::new(test_db.connection_arc());
    let sitemap_service = SitemapService::new(test_db.connection_arc());

    let website_id = create_website(&test_db, "filtered.example.com").await?;
    let sitemap = sitemap_service
        .create_sitemap(
            website_id,
            CreateSitemapRequest {
                url: "/sitemap.xml".to_string(),
            },
        )
        .await?;

    page_service
        .create_page(
            website_id,
            CreatePageRequest {
                sitemap_id: Some(sitemap.id),
                ..page_request("/in-sitemap")
            },
        )
        .await?;
    page_service
        .create_page(website_id, page_request("/loose"))
        .await?;

    let (all, all_total) = page_service.list_pages(website_id, None, 1, 20).await?;
    assert_eq!(all_total, 2);
    assert_eq!(all.len(), 2);

    let (scoped, scoped_total) = page_service
        .list_pages(website_id, Some(sitemap.id), 1, 20)
        .await?;
    assert_eq!(scoped_total, 1);
    assert_eq!(scoped[0].url, "/in-sitemap");

    Ok(())
}

#[tokio::test]
async fn test_page_update_round_trip() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let service = PageService::new(test_db.connection_arc());
    let website_id = create_website(&test_db, "updates.example.com").await?;

    let page = service.create_page(website_id, page_request("/draft")).await?;

    let updated = service
        .update_page(
            page.id,
            UpdatePageRequest {
                url: Some("/published".to_string()),
                status: Some(301),
                priority: Some(0.9),
                last_modified: None,
                change_frequency: Some("weekly".to_string()),
                sitemap_id: None,
                is_active: Some(false),
            },
        )
        .await?;

    assert_eq!(updated.url, "/published");
    assert_eq!(updated.status, 301);
    assert_eq!(updated.priority, 0.9);
    assert_eq!(updated.change_frequency.as_deref(), Some("weekly"));
    assert!(!updated.is_active);

    service.delete_page(page.id).await?;
    let result = service.get_page(page.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}
