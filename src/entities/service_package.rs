use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "service_packages")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
    /// Percentage discount applied to the sum of required member prices
    pub discount_percent: Decimal,
    pub is_active: bool,
    /// Mileage interval at which the shop recommends the bundle
    pub recommended_mileage_interval: Option<i32>,
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
