use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use marka_core::DbDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "website_pages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Path of the page relative to the website root
    pub url: String,
    /// HTTP status observed when the page was last fetched
    pub status: i32,
    /// Sitemap priority, 0.0 to 1.0
    pub priority: f64,
    pub last_modified: Option<DbDateTime>,
    pub change_frequency: Option<String>,
    pub is_active: bool,
    pub website_id: Uuid,
    pub sitemap_id: Option<Uuid>,
    pub created_at: DbDateTime,
    pub updated_at: DbDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::websites::Entity",
        from = "Column::WebsiteId",
        to = "super::websites::Column::Id"
    )]
    Website,
    #[sea_orm(
        belongs_to = "super::website_maps::Entity",
        from = "Column::SitemapId",
        to = "super::website_maps::Column::Id"
    )]
    WebsiteMap,
}

impl Related<super::websites::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Website.def()
    }
}

impl Related<super::website_maps::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::WebsiteMap.def()
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
