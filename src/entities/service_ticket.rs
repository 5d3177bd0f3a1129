use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "service_tickets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub customer_id: i64,
    pub vehicle_id: i64,
    /// One of: pending, in_progress, completed, cancelled
    pub status: String,
    pub problem_description: String,
    pub odometer_miles: i32,
    /// Scheduling priority, 1 (urgent) through 5 (whenever)
    pub priority: i32,
    pub opened_at: DateTime<Utc>,
    /// Set exactly once, when the ticket reaches a terminal state that
    /// closes it (completed). Stays NULL for cancelled tickets.
    pub closed_at: Option<DateTime<Utc>>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::customer::Entity",
        from = "Column::CustomerId",
        to = "super::customer::Column::Id"
    )]
    Customer,
    #[sea_orm(
        belongs_to = "super::vehicle::Entity",
        from = "Column::VehicleId",
        to = "super::vehicle::Column::Id"
    )]
    Vehicle,
    #[sea_orm(has_many = "super::ticket_line_item::Entity")]
    TicketLineItem,
    #[sea_orm(has_many = "super::ticket_part_usage::Entity")]
    TicketPartUsage,
    #[sea_orm(has_many = "super::ticket_assignment::Entity")]
    TicketAssignment,
}

impl Related<super::customer::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Customer.def()
    }
}

impl Related<super::vehicle::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicle.def()
    }
}

impl Related<super::ticket_line_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketLineItem.def()
    }
}

impl Related<super::ticket_part_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketPartUsage.def()
    }
}

impl Related<super::ticket_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketAssignment.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
