use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "mechanics")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub full_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub phone: Option<String>,
    pub salary_cents: Option<i64>,
    pub is_active: bool,
    pub hired_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_assignment::Entity")]
    TicketAssignment,
    #[sea_orm(has_many = "super::mechanic_certification::Entity")]
    MechanicCertification,
}

impl Related<super::ticket_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketAssignment.def()
    }
}

impl Related<super::mechanic_certification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MechanicCertification.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
