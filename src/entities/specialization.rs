use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "specializations")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::mechanic_certification::Entity")]
    MechanicCertification,
}

impl Related<super::mechanic_certification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MechanicCertification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
