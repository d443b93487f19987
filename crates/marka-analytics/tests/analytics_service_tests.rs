use chrono::{TimeZone, Utc};
use marka_analytics::{
    CreateGa4PropertyRequest, CreateGa4StreamRequest, CreateGcftRequest, CreateGcftSnapRequest,
    CreateGscMetricRequest, CreateGscPropertyRequest, Ga4Service, GcftService, GscMetricFilter,
    GscService, MetricType, UpdateGa4PropertyRequest, UpdateGcftRequest, UpdateGcftSnapRequest,
    UpdateGscPropertyRequest,
};
use marka_core::ServiceError;
use marka_database::test_utils::TestDatabase;
use marka_entities::{clients, websites};
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::Mutex;
use uuid::Uuid;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

struct Fixture {
    client_id: Uuid,
    website_id: Uuid,
}

async fn setup_fixture(test_db: &TestDatabase) -> anyhow::Result<Fixture> {
    let client = clients::ActiveModel {
        id: Set(Uuid::new_v4()),
        slug: Set("analytics-co".to_string()),
        title: Set("Analytics Co".to_string()),
        description: Set(None),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(test_db.connection())
    .await?;

    let website = websites::ActiveModel {
        id: Set(Uuid::new_v4()),
        domain: Set("analytics.example.com".to_string()),
        is_secure: Set(true),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(test_db.connection())
    .await?;

    Ok(Fixture {
        client_id: client.id,
        website_id: website.id,
    })
}

fn ga4_request(fixture: &Fixture, title: &str, measurement_id: &str) -> CreateGa4PropertyRequest {
    CreateGa4PropertyRequest {
        title: title.to_string(),
        property_id: "123456789".to_string(),
        measurement_id: measurement_id.to_string(),
        client_id: fixture.client_id,
        website_id: fixture.website_id,
    }
}

#[tokio::test]
async fn test_ga4_property_crud() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = Ga4Service::new(test_db.connection_arc());

    let property = service
        .create_property(ga4_request(&fixture, "Main Property", "G-AAAA1111"))
        .await?;
    assert_eq!(property.measurement_id, "G-AAAA1111");

    let updated = service
        .update_property(
            property.id,
            UpdateGa4PropertyRequest {
                title: Some("Renamed Property".to_string()),
                property_id: None,
                measurement_id: None,
            },
        )
        .await?;
    assert_eq!(updated.title, "Renamed Property");

    let (properties, total) = service
        .list_properties(1, 20, Some(fixture.client_id))
        .await?;
    assert_eq!(total, 1);
    assert_eq!(properties[0].id, property.id);

    service.delete_property(property.id).await?;
    let result = service.get_property(property.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_ga4_duplicate_measurement_id_conflicts() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = Ga4Service::new(test_db.connection_arc());

    service
        .create_property(ga4_request(&fixture, "First", "G-SAME0000"))
        .await?;
    let result = service
        .create_property(ga4_request(&fixture, "Second", "G-SAME0000"))
        .await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_ga4_duplicate_title_conflicts() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = Ga4Service::new(test_db.connection_arc());

    service
        .create_property(ga4_request(&fixture, "Same Title", "G-AAAA0001"))
        .await?;
    let result = service
        .create_property(ga4_request(&fixture, "Same Title", "G-BBBB0002"))
        .await;

    assert!(matches!(result, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_ga4_stream_defaults_to_property_website() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = Ga4Service::new(test_db.connection_arc());

    let property = service
        .create_property(ga4_request(&fixture, "Streamed", "G-CCCC0003"))
        .await?;

    let stream = service
        .create_stream(
            property.id,
            CreateGa4StreamRequest {
                title: "Web Stream".to_string(),
                stream_id: "987654".to_string(),
                measurement_id: "G-CCCC0003".to_string(),
                website_id: None,
            },
        )
        .await?;

    assert_eq!(stream.website_id, fixture.website_id);
    assert_eq!(stream.ga4_id, property.id);

    let (streams, total) = service.list_streams(property.id, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(streams[0].id, stream.id);

    let duplicate = service
        .create_stream(
            property.id,
            CreateGa4StreamRequest {
                title: "Web Stream".to_string(),
                stream_id: "111".to_string(),
                measurement_id: "G-DDDD0004".to_string(),
                website_id: None,
            },
        )
        .await;
    assert!(matches!(duplicate, Err(ServiceError::AlreadyExists { .. })));

    Ok(())
}

#[tokio::test]
async fn test_gsc_property_crud() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = GscService::new(test_db.connection_arc());

    let property = service
        .create_property(CreateGscPropertyRequest {
            title: "Search Property".to_string(),
            client_id: fixture.client_id,
            website_id: fixture.website_id,
        })
        .await?;

    let duplicate = service
        .create_property(CreateGscPropertyRequest {
            title: "Search Property".to_string(),
            client_id: fixture.client_id,
            website_id: fixture.website_id,
        })
        .await;
    assert!(matches!(duplicate, Err(ServiceError::AlreadyExists { .. })));

    let updated = service
        .update_property(
            property.id,
            UpdateGscPropertyRequest {
                title: Some("Renamed Search Property".to_string()),
            },
        )
        .await?;
    assert_eq!(updated.title, "Renamed Search Property");

    service.delete_property(property.id).await?;
    let result = service.get_property(property.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_gsc_metrics_filtered_by_type_and_date() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = GscService::new(test_db.connection_arc());

    let property = service
        .create_property(CreateGscPropertyRequest {
            title: "Metric Property".to_string(),
            client_id: fixture.client_id,
            website_id: fixture.website_id,
        })
        .await?;

    let january = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let february = Utc.with_ymd_and_hms(2026, 2, 1, 0, 0, 0).unwrap();
    let march = Utc.with_ymd_and_hms(2026, 3, 1, 0, 0, 0).unwrap();

    service
        .create_metric(
            property.id,
            CreateGscMetricRequest {
                metric_type: MetricType::Query,
                keys: "rust crates".to_string(),
                clicks: 120,
                impressions: 4000,
                ctr: 0.03,
                position: 4.2,
                date_start: january,
                date_end: february,
            },
        )
        .await?;
    service
        .create_metric(
            property.id,
            CreateGscMetricRequest {
                metric_type: MetricType::Device,
                keys: "mobile".to_string(),
                clicks: 80,
                impressions: 2500,
                ctr: 0.032,
                position: 6.0,
                date_start: february,
                date_end: march,
            },
        )
        .await?;

    let by_type = GscMetricFilter {
        metric_type: Some("query".to_string()),
        ..Default::default()
    };
    let (metrics, total) = service.list_metrics(property.id, &by_type, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(metrics[0].keys, "rust crates");

    let by_date = GscMetricFilter {
        date_from: Some(february),
        ..Default::default()
    };
    let (metrics, total) = service.list_metrics(property.id, &by_date, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(metrics[0].metric_type, "device");

    let bad_type = GscMetricFilter {
        metric_type: Some("clicks".to_string()),
        ..Default::default()
    };
    let result = service.list_metrics(property.id, &bad_type, 1, 20).await;
    assert!(matches!(result, Err(ServiceError::Validation { .. })));

    Ok(())
}

#[tokio::test]
async fn test_gcft_tour_crud() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = GcftService::new(test_db.connection_arc());

    let tour = service
        .create_tour(CreateGcftRequest {
            group_name: "Showroom Tour".to_string(),
            group_slug: "showroom".to_string(),
            client_id: fixture.client_id,
        })
        .await?;
    assert_eq!(tour.group_slug, "showroom");

    let updated = service
        .update_tour(
            tour.id,
            UpdateGcftRequest {
                group_name: Some("Renamed Tour".to_string()),
                group_slug: None,
            },
        )
        .await?;
    assert_eq!(updated.group_name, "Renamed Tour");

    let (tours, total) = service.list_tours(1, 20, Some(fixture.client_id)).await?;
    assert_eq!(total, 1);
    assert_eq!(tours[0].id, tour.id);

    let missing_client = service
        .create_tour(CreateGcftRequest {
            group_name: "Orphan Tour".to_string(),
            group_slug: "orphan".to_string(),
            client_id: Uuid::new_v4(),
        })
        .await;
    assert!(matches!(
        missing_client,
        Err(ServiceError::NotFound { .. })
    ));

    service.delete_tour(tour.id).await?;
    let result = service.get_tour(tour.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_gcft_snap_slug_is_unique() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = GcftService::new(test_db.connection_arc());

    let tour = service
        .create_tour(CreateGcftRequest {
            group_name: "Snap Tour".to_string(),
            group_slug: "snap-tour".to_string(),
            client_id: fixture.client_id,
        })
        .await?;

    let snap = service
        .create_snap(
            tour.id,
            CreateGcftSnapRequest {
                snap_name: "Lobby".to_string(),
                snap_slug: "lobby01".to_string(),
                altitude: None,
            },
        )
        .await?;
    assert_eq!(snap.altitude, 0);
    assert_eq!(snap.gcft_id, tour.id);

    let duplicate = service
        .create_snap(
            tour.id,
            CreateGcftSnapRequest {
                snap_name: "Another Lobby".to_string(),
                snap_slug: "lobby01".to_string(),
                altitude: Some(12),
            },
        )
        .await;
    assert!(matches!(duplicate, Err(ServiceError::AlreadyExists { .. })));

    let updated = service
        .update_snap(
            snap.id,
            UpdateGcftSnapRequest {
                snap_name: None,
                snap_slug: None,
                altitude: Some(35),
            },
        )
        .await?;
    assert_eq!(updated.altitude, 35);

    let (snaps, total) = service.list_snaps(tour.id, 1, 20).await?;
    assert_eq!(total, 1);
    assert_eq!(snaps[0].id, snap.id);

    service.delete_snap(snap.id).await?;
    let result = service.get_snap(snap.id).await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}

#[tokio::test]
async fn test_gsc_metric_validation() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let fixture = setup_fixture(&test_db).await?;
    let service = GscService::new(test_db.connection_arc());

    let property = service
        .create_property(CreateGscPropertyRequest {
            title: "Validated Property".to_string(),
            client_id: fixture.client_id,
            website_id: fixture.website_id,
        })
        .await?;

    let january = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    let december = Utc.with_ymd_and_hms(2025, 12, 1, 0, 0, 0).unwrap();

    let inverted = service
        .create_metric(
            property.id,
            CreateGscMetricRequest {
                metric_type: MetricType::Page,
                keys: "/home".to_string(),
                clicks: 1,
                impressions: 10,
                ctr: 0.1,
                position: 1.0,
                date_start: january,
                date_end: december,
            },
        )
        .await;
    assert!(matches!(inverted, Err(ServiceError::Validation { .. })));

    let bad_ctr = service
        .create_metric(
            property.id,
            CreateGscMetricRequest {
                metric_type: MetricType::Page,
                keys: "/home".to_string(),
                clicks: 1,
                impressions: 10,
                ctr: 1.5,
                position: 1.0,
                date_start: december,
                date_end: january,
            },
        )
        .await;
    assert!(matches!(bad_ctr, Err(ServiceError::Validation { .. })));

    Ok(())
}
