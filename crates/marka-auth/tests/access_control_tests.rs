use marka_auth::context::AuthContext;
use marka_auth::permissions::{AclPermission, ROLE_MANAGER, ROLE_USER};
use marka_auth::{AccessControl, AccessTarget};
use marka_core::ServiceError;
use marka_database::test_utils::TestDatabase;
use marka_entities::{client_websites, clients, tracking_links, user_clients, users, websites};
use sea_orm::{ActiveModelTrait, Set};
use tokio::sync::Mutex;
use uuid::Uuid;

// Tests share one container and truncate tables on setup, so they must not
// overlap within this binary.
static DB_LOCK: Mutex<()> = Mutex::const_new(());

async fn create_user(
    test_db: &TestDatabase,
    username: &str,
    is_superuser: bool,
) -> anyhow::Result<users::Model> {
    let user = users::ActiveModel {
        id: Set(Uuid::new_v4()),
        auth_id: Set(format!("auth0|{}", username)),
        email: Set(format!("{}@example.com", username)),
        username: Set(username.to_string()),
        is_active: Set(true),
        is_verified: Set(true),
        is_superuser: Set(is_superuser),
        roles: Set(serde_json::json!([ROLE_USER])),
        scopes: Set(serde_json::json!([])),
        ..Default::default()
    };
    Ok(user.insert(test_db.connection()).await?)
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

async fn link_user_to_client(
    test_db: &TestDatabase,
    user_id: Uuid,
    client_id: Uuid,
) -> anyhow::Result<()> {
    let association = user_clients::ActiveModel {
        user_id: Set(user_id),
        client_id: Set(client_id),
        ..Default::default()
    };
    association.insert(test_db.connection()).await?;
    Ok(())
}

async fn create_tracking_link(
    test_db: &TestDatabase,
    client_id: Option<Uuid>,
    seed: char,
) -> anyhow::Result<tracking_links::Model> {
    let link = tracking_links::ActiveModel {
        id: Set(Uuid::new_v4()),
        url_hash: Set(seed.to_string().repeat(64)),
        url: Set("https://linkco.example.com/?utm_source=mail".to_string()),
        scheme: Set("https".to_string()),
        domain: Set("linkco.example.com".to_string()),
        destination: Set("https://linkco.example.com/".to_string()),
        url_path: Set("/".to_string()),
        utm_campaign: Set(None),
        utm_medium: Set(None),
        utm_source: Set(Some("mail".to_string())),
        utm_content: Set(None),
        utm_term: Set(None),
        is_active: Set(true),
        client_id: Set(client_id),
        ..Default::default()
    };
    Ok(link.insert(test_db.connection()).await?)
}

fn auth_for(user: &users::Model) -> AuthContext {
    AuthContext::new_api_key(user.clone(), None, None, "test".to_string(), Uuid::new_v4())
}

#[tokio::test]
async fn test_superuser_bypasses_all_checks() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let admin = create_user(&test_db, "root", true).await?;
    let other = create_user(&test_db, "somebody", false).await?;

    access
        .verify_user_can_access(
            &auth_for(&admin),
            AclPermission::Delete,
            AccessTarget::User(other.id),
        )
        .await?;

    Ok(())
}

#[tokio::test]
async fn test_manager_reads_users_but_cannot_update_them() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let mut manager = create_user(&test_db, "manager", false).await?;
    manager.roles = serde_json::json!([ROLE_MANAGER]);
    let other = create_user(&test_db, "listed", false).await?;

    access
        .verify_user_can_access(
            &auth_for(&manager),
            AclPermission::Read,
            AccessTarget::User(other.id),
        )
        .await?;

    let denied = access
        .verify_user_can_access(
            &auth_for(&manager),
            AclPermission::Update,
            AccessTarget::User(other.id),
        )
        .await;
    assert!(matches!(
        denied,
        Err(ServiceError::PermissionDenied { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_self_access_granted() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let user = create_user(&test_db, "selfish", false).await?;
    let other = create_user(&test_db, "neighbor", false).await?;

    access
        .verify_user_can_access(
            &auth_for(&user),
            AclPermission::Update,
            AccessTarget::User(user.id),
        )
        .await?;

    let denied = access
        .verify_user_can_access(
            &auth_for(&user),
            AclPermission::Update,
            AccessTarget::User(other.id),
        )
        .await;
    assert!(matches!(
        denied,
        Err(ServiceError::PermissionDenied { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_client_membership_grants_related_read() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let member = create_user(&test_db, "member", false).await?;
    let outsider = create_user(&test_db, "outsider", false).await?;
    let client = create_client(&test_db, "acme").await?;
    link_user_to_client(&test_db, member.id, client.id).await?;

    access
        .verify_user_can_access(
            &auth_for(&member),
            AclPermission::Read,
            AccessTarget::Client(client.id),
        )
        .await?;

    let denied = access
        .verify_user_can_access(
            &auth_for(&outsider),
            AclPermission::Read,
            AccessTarget::Client(client.id),
        )
        .await;
    assert!(matches!(
        denied,
        Err(ServiceError::PermissionDenied { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_client_membership_does_not_grant_delete() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let member = create_user(&test_db, "tenant", false).await?;
    let client = create_client(&test_db, "sticky").await?;
    link_user_to_client(&test_db, member.id, client.id).await?;

    // The client ACL grants ReadRelated/UpdateRelated to members but never
    // DeleteRelated, so the relationship alone does not allow deletion.
    let denied = access
        .verify_user_can_access(
            &auth_for(&member),
            AclPermission::Delete,
            AccessTarget::Client(client.id),
        )
        .await;
    assert!(matches!(
        denied,
        Err(ServiceError::PermissionDenied { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_website_access_resolves_through_owning_client() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let member = create_user(&test_db, "webmember", false).await?;
    let outsider = create_user(&test_db, "weboutsider", false).await?;
    let client = create_client(&test_db, "webco").await?;
    link_user_to_client(&test_db, member.id, client.id).await?;

    let website = websites::ActiveModel {
        id: Set(Uuid::new_v4()),
        domain: Set("webco.example.com".to_string()),
        is_secure: Set(true),
        is_active: Set(true),
        ..Default::default()
    }
    .insert(test_db.connection())
    .await?;

    client_websites::ActiveModel {
        client_id: Set(client.id),
        website_id: Set(website.id),
        ..Default::default()
    }
    .insert(test_db.connection())
    .await?;

    access
        .verify_user_can_access(
            &auth_for(&member),
            AclPermission::Read,
            AccessTarget::Website(website.id),
        )
        .await?;

    let denied = access
        .verify_user_can_access(
            &auth_for(&outsider),
            AclPermission::Read,
            AccessTarget::Website(website.id),
        )
        .await;
    assert!(matches!(
        denied,
        Err(ServiceError::PermissionDenied { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_tracking_link_access_resolves_through_client() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let member = create_user(&test_db, "linkmember", false).await?;
    let outsider = create_user(&test_db, "linkoutsider", false).await?;
    let client = create_client(&test_db, "linkco").await?;
    link_user_to_client(&test_db, member.id, client.id).await?;

    let link = create_tracking_link(&test_db, Some(client.id), 'a').await?;

    access
        .verify_user_can_access(
            &auth_for(&member),
            AclPermission::Read,
            AccessTarget::TrackingLink(link.id),
        )
        .await?;

    // Members may also delete their clients' links
    access
        .verify_user_can_access(
            &auth_for(&member),
            AclPermission::Delete,
            AccessTarget::TrackingLink(link.id),
        )
        .await?;

    let denied = access
        .verify_user_can_access(
            &auth_for(&outsider),
            AclPermission::Read,
            AccessTarget::TrackingLink(link.id),
        )
        .await;
    assert!(matches!(
        denied,
        Err(ServiceError::PermissionDenied { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_unassigned_tracking_link_has_no_related_users() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let member = create_user(&test_db, "floating", false).await?;
    let client = create_client(&test_db, "floatco").await?;
    link_user_to_client(&test_db, member.id, client.id).await?;

    let link = create_tracking_link(&test_db, None, 'b').await?;

    let denied = access
        .verify_user_can_access(
            &auth_for(&member),
            AclPermission::Read,
            AccessTarget::TrackingLink(link.id),
        )
        .await;
    assert!(matches!(
        denied,
        Err(ServiceError::PermissionDenied { .. })
    ));

    Ok(())
}

#[tokio::test]
async fn test_unknown_tracking_link_is_not_found() -> anyhow::Result<()> {
    let _guard = DB_LOCK.lock().await;
    let test_db = TestDatabase::with_migrations().await?;
    let access = AccessControl::new(test_db.connection_arc());

    let user = create_user(&test_db, "lost", false).await?;

    let result = access
        .verify_user_can_access(
            &auth_for(&user),
            AclPermission::Read,
            AccessTarget::TrackingLink(Uuid::new_v4()),
        )
        .await;
    assert!(matches!(result, Err(ServiceError::NotFound { .. })));

    Ok(())
}
