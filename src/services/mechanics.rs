use crate::{
    db::DbPool,
    entities::{
        mechanic::{self, Entity as MechanicEntity, Model as MechanicModel},
        mechanic_certification::{
            self, Entity as CertificationEntity, Model as CertificationModel,
        },
        specialization::{self, Entity as SpecializationEntity, Model as SpecializationModel},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{DateTime, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateMechanicRequest {
    #[validate(length(min = 1, message = "Full name is required"))]
    pub full_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub phone: Option<String>,
    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary_cents: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateMechanicRequest {
    pub full_name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    #[validate(range(min = 0, message = "Salary cannot be negative"))]
    pub salary_cents: Option<i64>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateSpecializationRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordCertificationRequest {
    pub specialization_id: i64,
    pub certified_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Manages the shop's mechanics, their specializations, and the
/// certifications that tie the two together.
#[derive(Clone)]
pub struct MechanicService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl MechanicService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn create_mechanic(
        &self,
        request: CreateMechanicRequest,
    ) -> Result<MechanicModel, ServiceError> {
        request.validate()?;

        let existing = MechanicEntity::find()
            .filter(mechanic::Column::Email.eq(request.email.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Email {} is already in use",
                request.email
            )));
        }

        let model = mechanic::ActiveModel {
            full_name: Set(request.full_name),
            email: Set(request.email),
            phone: Set(request.phone),
            salary_cents: Set(request.salary_cents),
            is_active: Set(true),
            hired_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(mechanic_id = model.id, "Mechanic created");
        Ok(model)
    }

    pub async fn get_mechanic(&self, mechanic_id: i64) -> Result<MechanicModel, ServiceError> {
        MechanicEntity::find_by_id(mechanic_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Mechanic {} not found", mechanic_id)))
    }

    /// Lists mechanics, optionally restricted to active (or inactive)
    /// staff only.
    pub async fn list_mechanics(
        &self,
        active: Option<bool>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<MechanicModel>, u64), ServiceError> {
        let mut query = MechanicEntity::find().order_by_asc(mechanic::Column::FullName);
        if let Some(active) = active {
            query = query.filter(mechanic::Column::IsActive.eq(active));
        }
        let paginator = query.paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let mechanics = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((mechanics, total))
    }

    #[instrument(skip(self, request))]
    pub async fn update_mechanic(
        &self,
        mechanic_id: i64,
        request: UpdateMechanicRequest,
    ) -> Result<MechanicModel, ServiceError> {
        request.validate()?;

        let existing = self.get_mechanic(mechanic_id).await?;
        let mut active: mechanic::ActiveModel = existing.into();

        if let Some(full_name) = request.full_name {
            active.full_name = Set(full_name);
        }
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(salary_cents) = request.salary_cents {
            active.salary_cents = Set(Some(salary_cents));
        }
        if let Some(is_active) = request.is_active {
            active.is_active = Set(is_active);
        }

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self, request))]
    pub async fn create_specialization(
        &self,
        request: CreateSpecializationRequest,
    ) -> Result<SpecializationModel, ServiceError> {
        request.validate()?;

        let existing = SpecializationEntity::find()
            .filter(specialization::Column::Name.eq(request.name.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Specialization {} already exists",
                request.name
            )));
        }

        let model = specialization::ActiveModel {
            name: Set(request.name),
            description: Set(request.description),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;
        Ok(model)
    }

    pub async fn list_specializations(&self) -> Result<Vec<SpecializationModel>, ServiceError> {
        let specializations = SpecializationEntity::find()
            .order_by_asc(specialization::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(specializations)
    }

    /// Records that a mechanic holds a specialization. Recording the
    /// same pair twice is a conflict.
    #[instrument(skip(self, request), fields(mechanic_id, specialization_id = request.specialization_id))]
    pub async fn record_certification(
        &self,
        mechanic_id: i64,
        request: RecordCertificationRequest,
    ) -> Result<CertificationModel, ServiceError> {
        self.get_mechanic(mechanic_id).await?;
        SpecializationEntity::find_by_id(request.specialization_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Specialization {} not found",
                    request.specialization_id
                ))
            })?;

        let existing = CertificationEntity::find_by_id((mechanic_id, request.specialization_id))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Mechanic {} already holds specialization {}",
                mechanic_id, request.specialization_id
            )));
        }

        let certified_at = request.certified_at.unwrap_or_else(Utc::now);
        if let Some(expires_at) = request.expires_at {
            if expires_at <= certified_at {
                return Err(ServiceError::ValidationError(
                    "Expiry must be after the certification date".to_string(),
                ));
            }
        }

        let model = mechanic_certification::ActiveModel {
            mechanic_id: Set(mechanic_id),
            specialization_id: Set(request.specialization_id),
            certified_at: Set(certified_at),
            expires_at: Set(request.expires_at),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(mechanic_id, specialization_id = model.specialization_id, "Certification recorded");
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::CertificationRecorded {
                    mechanic_id,
                    specialization_id: model.specialization_id,
                })
                .await
            {
                warn!(error = %e, mechanic_id, "Failed to send certification event");
            }
        }

        Ok(model)
    }

    pub async fn list_certifications(
        &self,
        mechanic_id: i64,
    ) -> Result<Vec<CertificationModel>, ServiceError> {
        self.get_mechanic(mechanic_id).await?;
        let certifications = CertificationEntity::find()
            .filter(mechanic_certification::Column::MechanicId.eq(mechanic_id))
            .order_by_asc(mechanic_certification::Column::SpecializationId)
            .all(&*self.db_pool)
            .await?;
        Ok(certifications)
    }
}
