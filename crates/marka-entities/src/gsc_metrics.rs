use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use marka_core::DbDateTime;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "gsc_metrics")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    /// Metric dimension: searchappearance, query, page, device, or country
    pub metric_type: String,
    /// Dimension key reported by Search Console (query text, page URL, ...)
    pub keys: String,
    pub clicks: i32,
    pub impressions: i32,
    pub ctr: f64,
    pub position: f64,
    pub date_start: DbDateTime,
    pub date_end: DbDateTime,
    pub gsc_id: Uuid,
    pub created_at: DbDateTime,
    pub updated_at: DbDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::gsc_properties::Entity",
        from = "Column::GscId",
        to = "super::gsc_properties::Column::Id"
    )]
    GscProperty,
}

impl Related<super::gsc_properties::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::GscProperty.def()
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
