use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "services")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub base_price_cents: i64,
    pub estimated_minutes: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::service_package_item::Entity")]
    ServicePackageItem,
}

impl Related<super::service_package_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServicePackageItem.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
