use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "parts")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[sea_orm(unique)]
    pub part_number: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub supplier: Option<String>,
    pub current_cost_cents: i64,
    /// Never negative; mutated only through the inventory service
    pub quantity_in_stock: i32,
    pub reorder_level: i32,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// A part is low on stock when the on-hand quantity has fallen to
    /// (or below) its reorder level.
    pub fn is_low_stock(&self) -> bool {
        self.quantity_in_stock <= self.reorder_level
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::ticket_part_usage::Entity")]
    TicketPartUsage,
}

impl Related<super::ticket_part_usage::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TicketPartUsage.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn part_with_stock(quantity_in_stock: i32, reorder_level: i32) -> Model {
        Model {
            id: 1,
            part_number: "BRK-001".into(),
            name: "Brake pad set".into(),
            description: None,
            category: Some("brakes".into()),
            manufacturer: None,
            supplier: None,
            current_cost_cents: 2500,
            quantity_in_stock,
            reorder_level,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn low_stock_at_or_below_reorder_level() {
        assert!(part_with_stock(5, 5).is_low_stock());
        assert!(part_with_stock(0, 5).is_low_stock());
        assert!(!part_with_stock(6, 5).is_low_stock());
    }
}
