use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "mechanic_certifications")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub mechanic_id: i64,
    #[sea_orm(primary_key, auto_increment = false)]
    pub specialization_id: i64,
    pub certified_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl Model {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::mechanic::Entity",
        from = "Column::MechanicId",
        to = "super::mechanic::Column::Id"
    )]
    Mechanic,
    #[sea_orm(
        belongs_to = "super::specialization::Entity",
        from = "Column::SpecializationId",
        to = "super::specialization::Column::Id"
    )]
    Specialization,
}

impl Related<super::mechanic::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Mechanic.def()
    }
}

impl Related<super::specialization::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Specialization.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn certification_without_expiry_never_expires() {
        let cert = Model {
            mechanic_id: 1,
            specialization_id: 2,
            certified_at: Utc::now(),
            expires_at: None,
        };
        assert!(!cert.is_expired(Utc::now() + Duration::days(365 * 50)));
    }

    #[test]
    fn certification_expires_at_boundary() {
        let now = Utc::now();
        let cert = Model {
            mechanic_id: 1,
            specialization_id: 2,
            certified_at: now - Duration::days(365),
            expires_at: Some(now),
        };
        assert!(cert.is_expired(now));
        assert!(!cert.is_expired(now - Duration::seconds(1)));
    }
}
