use crate::{
    db::DbPool,
    entities::{
        service::{self, Entity as ServiceEntity, Model as ServiceModel},
        service_package::{self, Entity as PackageEntity, Model as PackageModel},
        service_package_item::{self, Entity as PackageItemEntity, Model as PackageItemModel},
    },
    errors::ServiceError,
};
use chrono::Utc;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{error, info, instrument};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateServiceRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    #[validate(range(min = 0, message = "Price cannot be negative"))]
    pub base_price_cents: i64,
    #[validate(range(min = 1, message = "Estimated minutes must be positive"))]
    pub estimated_minutes: i32,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePackageRequest {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    pub description: Option<String>,
    /// Percentage off the summed member prices, 0 to 100
    pub discount_percent: Option<Decimal>,
    /// Defaults to true
    pub is_active: Option<bool>,
    #[validate(range(min = 1, message = "Mileage interval must be positive"))]
    pub recommended_mileage_interval: Option<i32>,
    #[validate(length(min = 1, message = "A package needs at least one service"))]
    pub items: Vec<PackageItemRequest>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct PackageItemRequest {
    pub service_id: i64,
    /// Defaults to 1
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: Option<i32>,
    /// Optional items are excluded from the quoted bundle price
    pub is_optional: Option<bool>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PackageDetail {
    #[serde(flatten)]
    pub package: PackageModel,
    pub items: Vec<PackageItemModel>,
    pub services: Vec<ServiceModel>,
    /// Sum of required member prices with the discount applied, rounded
    /// half-up
    pub discounted_price_cents: i64,
}

/// The catalog of offered services and discounted bundles. Entries are
/// create/read only; tickets reference them but price from their own
/// stored lines.
#[derive(Clone)]
pub struct CatalogService {
    db_pool: Arc<DbPool>,
}

impl CatalogService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_service(
        &self,
        request: CreateServiceRequest,
    ) -> Result<ServiceModel, ServiceError> {
        request.validate()?;

        let model = service::ActiveModel {
            name: Set(request.name),
            description: Set(request.description),
            base_price_cents: Set(request.base_price_cents),
            estimated_minutes: Set(request.estimated_minutes),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(service_id = model.id, "Catalog service created");
        Ok(model)
    }

    pub async fn get_service(&self, service_id: i64) -> Result<ServiceModel, ServiceError> {
        ServiceEntity::find_by_id(service_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Service {} not found", service_id)))
    }

    pub async fn list_services(&self) -> Result<Vec<ServiceModel>, ServiceError> {
        let services = ServiceEntity::find()
            .order_by_asc(service::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(services)
    }

    /// Creates a package and its membership rows in one transaction.
    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn create_package(
        &self,
        request: CreatePackageRequest,
    ) -> Result<PackageDetail, ServiceError> {
        request.validate()?;

        let discount = request.discount_percent.unwrap_or(Decimal::ZERO);
        if discount < Decimal::ZERO || discount > Decimal::ONE_HUNDRED {
            return Err(ServiceError::ValidationError(
                "Discount must be between 0 and 100".to_string(),
            ));
        }

        for item in &request.items {
            item.validate()?;
        }
        let unique: HashSet<i64> = request.items.iter().map(|i| i.service_id).collect();
        if unique.len() != request.items.len() {
            return Err(ServiceError::ValidationError(
                "A service cannot appear in a package twice".to_string(),
            ));
        }

        let existing = PackageEntity::find()
            .filter(service_package::Column::Name.eq(request.name.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Package {} already exists",
                request.name
            )));
        }

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for package creation");
            ServiceError::DatabaseError(e)
        })?;

        let mut services = Vec::with_capacity(request.items.len());
        for item in &request.items {
            let found = ServiceEntity::find_by_id(item.service_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Service {} not found", item.service_id))
                })?;
            services.push(found);
        }

        let package = service_package::ActiveModel {
            name: Set(request.name),
            description: Set(request.description),
            discount_percent: Set(discount),
            is_active: Set(request.is_active.unwrap_or(true)),
            recommended_mileage_interval: Set(request.recommended_mileage_interval),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        let mut items = Vec::with_capacity(request.items.len());
        for (position, item) in request.items.iter().enumerate() {
            let stored = service_package_item::ActiveModel {
                package_id: Set(package.id),
                service_id: Set(item.service_id),
                quantity: Set(item.quantity.unwrap_or(1)),
                is_optional: Set(item.is_optional.unwrap_or(false)),
                sequence_order: Set(position as i32),
            }
            .insert(&txn)
            .await?;
            items.push(stored);
        }

        txn.commit().await.map_err(|e| {
            error!(error = %e, "Failed to commit package creation");
            ServiceError::DatabaseError(e)
        })?;

        info!(package_id = package.id, "Service package created");
        Ok(Self::assemble_detail(package, items, services))
    }

    pub async fn get_package(&self, package_id: i64) -> Result<PackageDetail, ServiceError> {
        let package = PackageEntity::find_by_id(package_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Package {} not found", package_id)))?;

        let items = PackageItemEntity::find()
            .filter(service_package_item::Column::PackageId.eq(package_id))
            .order_by_asc(service_package_item::Column::SequenceOrder)
            .all(&*self.db_pool)
            .await?;

        let service_ids: Vec<i64> = items.iter().map(|item| item.service_id).collect();
        let services = ServiceEntity::find()
            .filter(service::Column::Id.is_in(service_ids))
            .order_by_asc(service::Column::Name)
            .all(&*self.db_pool)
            .await?;

        Ok(Self::assemble_detail(package, items, services))
    }

    pub async fn list_packages(&self) -> Result<Vec<PackageModel>, ServiceError> {
        let packages = PackageEntity::find()
            .order_by_asc(service_package::Column::Name)
            .all(&*self.db_pool)
            .await?;
        Ok(packages)
    }

    fn assemble_detail(
        package: PackageModel,
        items: Vec<PackageItemModel>,
        services: Vec<ServiceModel>,
    ) -> PackageDetail {
        // Optional items ride along for free selection; only required
        // ones price into the bundle.
        let base: i64 = items
            .iter()
            .filter(|item| !item.is_optional)
            .filter_map(|item| {
                services
                    .iter()
                    .find(|s| s.id == item.service_id)
                    .map(|s| s.base_price_cents.saturating_mul(item.quantity as i64))
            })
            .fold(0i64, i64::saturating_add);
        let multiplier = Decimal::ONE - package.discount_percent / Decimal::ONE_HUNDRED;
        let discounted_price_cents = (Decimal::from(base) * multiplier)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .unwrap_or(i64::MAX);

        PackageDetail {
            package,
            items,
            services,
            discounted_price_cents,
        }
    }
}
