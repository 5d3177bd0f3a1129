use crate::{
    db::DbPool,
    entities::{
        customer::Entity as CustomerEntity,
        vehicle::{self, Entity as VehicleEntity, Model as VehicleModel},
    },
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::{Datelike, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateVehicleRequest {
    #[validate(length(min = 11, max = 17, message = "VIN must be 11 to 17 characters"))]
    pub vin: String,
    #[validate(length(min = 1, message = "Make is required"))]
    pub make: String,
    #[validate(length(min = 1, message = "Model is required"))]
    pub model: String,
    #[validate(range(min = 1900, message = "Year is out of range"))]
    pub year: i32,
    pub color: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateVehicleRequest {
    /// VINs are immutable; attempts to change one are rejected
    pub vin: Option<String>,
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    pub color: Option<String>,
}

/// Manages the vehicles registered under each customer.
#[derive(Clone)]
pub struct VehicleService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl VehicleService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(customer_id, vin = %request.vin))]
    pub async fn create_vehicle(
        &self,
        customer_id: i64,
        request: CreateVehicleRequest,
    ) -> Result<VehicleModel, ServiceError> {
        request.validate()?;
        if request.year > Utc::now().year() + 1 {
            return Err(ServiceError::ValidationError(
                "Year is in the future".to_string(),
            ));
        }

        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", customer_id))
            })?;

        let vin = request.vin.to_uppercase();
        let existing = VehicleEntity::find()
            .filter(vehicle::Column::Vin.eq(vin.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "A vehicle with VIN {} is already registered",
                vin
            )));
        }

        let model = vehicle::ActiveModel {
            customer_id: Set(customer_id),
            vin: Set(vin),
            make: Set(request.make),
            model: Set(request.model),
            year: Set(request.year),
            color: Set(request.color),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(vehicle_id = model.id, customer_id, "Vehicle registered");
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::VehicleRegistered {
                    customer_id,
                    vehicle_id: model.id,
                })
                .await
            {
                warn!(error = %e, vehicle_id = model.id, "Failed to send vehicle registered event");
            }
        }

        Ok(model)
    }

    pub async fn get_vehicle(&self, vehicle_id: i64) -> Result<VehicleModel, ServiceError> {
        VehicleEntity::find_by_id(vehicle_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Vehicle {} not found", vehicle_id)))
    }

    /// Vehicle lookup scoped to its owner, for the nested customer
    /// routes.
    pub async fn get_customer_vehicle(
        &self,
        customer_id: i64,
        vehicle_id: i64,
    ) -> Result<VehicleModel, ServiceError> {
        let vehicle = self.get_vehicle(vehicle_id).await?;
        if vehicle.customer_id != customer_id {
            return Err(ServiceError::NotFound(format!(
                "Vehicle {} not found for customer {}",
                vehicle_id, customer_id
            )));
        }
        Ok(vehicle)
    }

    pub async fn list_for_customer(
        &self,
        customer_id: i64,
    ) -> Result<Vec<VehicleModel>, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Customer {} not found", customer_id))
            })?;

        let vehicles = VehicleEntity::find()
            .filter(vehicle::Column::CustomerId.eq(customer_id))
            .order_by_asc(vehicle::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(vehicles)
    }

    #[instrument(skip(self, request))]
    pub async fn update_vehicle(
        &self,
        customer_id: i64,
        vehicle_id: i64,
        request: UpdateVehicleRequest,
    ) -> Result<VehicleModel, ServiceError> {
        let existing = self.get_customer_vehicle(customer_id, vehicle_id).await?;

        if let Some(vin) = &request.vin {
            if !vin.eq_ignore_ascii_case(&existing.vin) {
                return Err(ServiceError::ValidationError(
                    "A vehicle's VIN cannot be changed".to_string(),
                ));
            }
        }

        let mut active: vehicle::ActiveModel = existing.into();
        if let Some(make) = request.make {
            active.make = Set(make);
        }
        if let Some(model) = request.model {
            active.model = Set(model);
        }
        if let Some(year) = request.year {
            if year < 1900 || year > Utc::now().year() + 1 {
                return Err(ServiceError::ValidationError(
                    "Year is out of range".to_string(),
                ));
            }
            active.year = Set(year);
        }
        if let Some(color) = request.color {
            active.color = Set(Some(color));
        }

        Ok(active.update(&*self.db_pool).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete_vehicle(
        &self,
        customer_id: i64,
        vehicle_id: i64,
    ) -> Result<(), ServiceError> {
        self.get_customer_vehicle(customer_id, vehicle_id).await?;
        VehicleEntity::delete_by_id(vehicle_id)
            .exec(&*self.db_pool)
            .await?;
        info!(vehicle_id, customer_id, "Vehicle deleted");
        Ok(())
    }
}
