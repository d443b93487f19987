use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use marka_core::DbDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "clients")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DbDateTime,
    pub updated_at: DbDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::user_clients::Entity")]
    UserClients,
    #[sea_orm(has_many = "super::client_websites::Entity")]
    ClientWebsites,
    #[sea_orm(has_many = "super::tracking_links::Entity")]
    TrackingLinks,
    #[sea_orm(has_many = "super::ga4_properties::Entity")]
    Ga4Properties,
    #[sea_orm(has_many = "super::gsc_properties::Entity")]
    GscProperties,
    #[sea_orm(has_many = "super::gcfts::Entity")]
    Gcfts,
}

impl Related<super::user_clients::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UserClients.def()
    }
}

impl Related<super::client_websites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientWebsites.def()
    }
}

impl Related<super::tracking_links::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TrackingLinks.def()
    }
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        super::user_clients::Relation::User.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::user_clients::Relation::Client.def().rev())
    }
}

impl Related<super::websites::Entity> for Entity {
    fn to() -> RelationDef {
        super::client_websites::Relation::Website.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::client_websites::Relation::Client.def().rev())
    }
}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now = chrono::Utc::now();

        if insert {
            if self.created_at.is_not_set() {
                self.created_at = Set(now);
            }
            if self.updated_at.is_not_set() {
                self.updated_at = Set(now);
            }
        } else {
            self.updated_at = Set(now);
        }

        Ok(self)
    }
}
