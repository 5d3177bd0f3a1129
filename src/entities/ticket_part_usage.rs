use chrono::{DateTime, Months, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "ticket_part_usages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub ticket_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub part_id: i64,
    pub quantity: i32,
    /// Cost captured at attach time; later part price changes do not
    /// alter existing tickets
    pub unit_cost_cents: i64,
    /// Markup percentage applied on top of unit cost (30.0 = 30%)
    #[sea_orm(column_type = "Decimal(Some((5, 2)))")]
    pub markup_percent: Decimal,
    pub warranty_months: Option<i32>,
    pub installed_by_mechanic_id: Option<i64>,
    pub attached_at: DateTime<Utc>,
}

impl Model {
    pub fn is_under_warranty(&self, now: DateTime<Utc>) -> bool {
        match self.warranty_months {
            Some(months) if months > 0 => self
                .attached_at
                .checked_add_months(Months::new(months as u32))
                .map(|end| now < end)
                .unwrap_or(false),
            _ => false,
        }
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::service_ticket::Entity",
        from = "Column::TicketId",
        to = "super::service_ticket::Column::Id"
    )]
    ServiceTicket,
    #[sea_orm(
        belongs_to = "super::part::Entity",
        from = "Column::PartId",
        to = "super::part::Column::Id"
    )]
    Part,
}

impl Related<super::service_ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ServiceTicket.def()
    }
}

impl Related<super::part::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Part.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn usage(warranty_months: Option<i32>, attached_at: DateTime<Utc>) -> Model {
        Model {
            ticket_id: 1,
            part_id: 1,
            quantity: 1,
            unit_cost_cents: 2500,
            markup_percent: dec!(30.0),
            warranty_months,
            installed_by_mechanic_id: None,
            attached_at,
        }
    }

    #[test]
    fn warranty_window_is_months_from_attachment() {
        let now = Utc::now();
        assert!(usage(Some(12), now - Duration::days(30)).is_under_warranty(now));
        assert!(!usage(Some(1), now - Duration::days(45)).is_under_warranty(now));
    }

    #[test]
    fn no_warranty_means_never_covered() {
        let now = Utc::now();
        assert!(!usage(None, now).is_under_warranty(now));
        assert!(!usage(Some(0), now).is_under_warranty(now));
    }
}
