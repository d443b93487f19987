use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use marka_core::DbDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "websites")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub domain: String,
    pub is_secure: bool,
    pub is_active: bool,
    pub created_at: DbDateTime,
    pub updated_at: DbDateTime,
}

impl Model {
    /// Full base URL for this website, derived from the scheme and domain
    pub fn get_link(&self) -> String {
        let scheme = if self.is_secure { "https" } else { "http" };
        format!("{}://{}", scheme, self.domain)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::client_websites::Entity")]
    ClientWebsites,
    #[sea_orm(has_many = "super::website_maps::Entity")]
    WebsiteMaps,
    #[sea_orm(has_many = "super::website_pages::Entity")]
    WebsitePages,
    #[sea_orm(has_many = "super::ga4_properties::Entity")]
    Ga4Properties,
    #[sea_orm(has_many = "super::gsc_properties::Entity")]
    GscProperties,
}

impl Related<super::client_websites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClientWebsites.def()
    }
}

impl Related<super::website_maps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebsiteMaps.def()
    }
}

impl Related<super::website_pages::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebsitePages.def()
    }
}

impl Related<super::clients::Entity> for Entity {
    fn to() -> RelationDef {
        super::client_websites::Relation::Client.def()
    }

    fn via() -> Option<RelationDef> {
        Some(super::client_websites::Relation::Website.def().rev())
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
