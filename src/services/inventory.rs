use crate::{
    db::DbPool,
    entities::part::{self, Entity as PartEntity, Model as PartModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use metrics::counter;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreatePartRequest {
    #[validate(length(min = 1, message = "Part number is required"))]
    pub part_number: String,
    #[validate(length(min = 1, message = "Part name is required"))]
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub supplier: Option<String>,
    #[validate(range(min = 0, message = "Cost cannot be negative"))]
    pub current_cost_cents: i64,
    #[validate(range(min = 0, message = "Stock cannot be negative"))]
    pub quantity_in_stock: i32,
    pub reorder_level: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdatePartRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub supplier: Option<String>,
    #[validate(range(min = 0, message = "Cost cannot be negative"))]
    pub current_cost_cents: Option<i64>,
    #[validate(range(min = 0, message = "Reorder level cannot be negative"))]
    pub reorder_level: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AdjustQuantityRequest {
    /// Signed delta; positive restocks, negative consumes
    pub delta: i32,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct QuantityAdjustment {
    pub part_id: i64,
    pub previous_quantity: i32,
    pub new_quantity: i32,
}

/// Manages the parts inventory. Stock levels only change through the
/// guarded operations here, which never let a quantity go negative.
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl InventoryService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    #[instrument(skip(self, request), fields(part_number = %request.part_number))]
    pub async fn create_part(&self, request: CreatePartRequest) -> Result<PartModel, ServiceError> {
        request.validate()?;

        let existing = PartEntity::find()
            .filter(part::Column::PartNumber.eq(request.part_number.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Part number {} already exists",
                request.part_number
            )));
        }

        let model = part::ActiveModel {
            part_number: Set(request.part_number),
            name: Set(request.name),
            description: Set(request.description),
            category: Set(request.category),
            manufacturer: Set(request.manufacturer),
            supplier: Set(request.supplier),
            current_cost_cents: Set(request.current_cost_cents),
            quantity_in_stock: Set(request.quantity_in_stock),
            reorder_level: Set(request.reorder_level.unwrap_or(5)),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(part_id = model.id, "Part created");
        Ok(model)
    }

    pub async fn get_part(&self, part_id: i64) -> Result<PartModel, ServiceError> {
        PartEntity::find_by_id(part_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", part_id)))
    }

    pub async fn list_parts(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<PartModel>, u64), ServiceError> {
        let paginator = PartEntity::find()
            .order_by_asc(part::Column::PartNumber)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let parts = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((parts, total))
    }

    #[instrument(skip(self))]
    pub async fn update_part(
        &self,
        part_id: i64,
        request: UpdatePartRequest,
    ) -> Result<PartModel, ServiceError> {
        request.validate()?;

        let existing = self.get_part(part_id).await?;
        let mut active: part::ActiveModel = existing.into();

        if let Some(name) = request.name {
            active.name = Set(name);
        }
        if let Some(description) = request.description {
            active.description = Set(Some(description));
        }
        if let Some(category) = request.category {
            active.category = Set(Some(category));
        }
        if let Some(manufacturer) = request.manufacturer {
            active.manufacturer = Set(Some(manufacturer));
        }
        if let Some(supplier) = request.supplier {
            active.supplier = Set(Some(supplier));
        }
        if let Some(cost) = request.current_cost_cents {
            active.current_cost_cents = Set(cost);
        }
        if let Some(level) = request.reorder_level {
            active.reorder_level = Set(level);
        }

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Parts at or below their reorder level.
    pub async fn list_low_stock(&self) -> Result<Vec<PartModel>, ServiceError> {
        let parts = PartEntity::find()
            .filter(
                Expr::col(part::Column::QuantityInStock)
                    .lte(Expr::col(part::Column::ReorderLevel)),
            )
            .order_by_asc(part::Column::QuantityInStock)
            .all(&*self.db_pool)
            .await?;
        Ok(parts)
    }

    /// Removes stock for a ticket, on the caller's transaction so the
    /// decrement commits or rolls back together with the rest of the
    /// ticket work. The decrement is a single conditional UPDATE: it
    /// only applies when enough stock is on hand, so two concurrent
    /// consumers can never drive the quantity negative.
    ///
    /// Returns the part as it stands after the decrement, which carries
    /// the unit cost snapshot the caller records.
    #[instrument(skip(self, conn))]
    pub async fn consume<C>(
        &self,
        conn: &C,
        part_id: i64,
        quantity: i32,
    ) -> Result<PartModel, ServiceError>
    where
        C: ConnectionTrait,
    {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Consume quantity must be positive".to_string(),
            ));
        }

        let result = PartEntity::update_many()
            .col_expr(
                part::Column::QuantityInStock,
                Expr::col(part::Column::QuantityInStock).sub(quantity),
            )
            .filter(part::Column::Id.eq(part_id))
            .filter(part::Column::QuantityInStock.gte(quantity))
            .exec(conn)
            .await?;

        if result.rows_affected == 0 {
            // Distinguish a missing part from one that is merely short.
            return match PartEntity::find_by_id(part_id).one(conn).await? {
                None => Err(ServiceError::NotFound(format!("Part {} not found", part_id))),
                Some(found) => Err(ServiceError::InsufficientStock(format!(
                    "Part {} has {} in stock, {} requested",
                    part_id, found.quantity_in_stock, quantity
                ))),
            };
        }

        let updated = PartEntity::find_by_id(part_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", part_id)))?;

        counter!("autoshop_inventory_consumed_total", quantity as u64);
        Ok(updated)
    }

    /// Adds stock back, e.g. for a returned or unused part.
    #[instrument(skip(self))]
    pub async fn restock(&self, part_id: i64, quantity: i32) -> Result<PartModel, ServiceError> {
        if quantity <= 0 {
            return Err(ServiceError::ValidationError(
                "Restock quantity must be positive".to_string(),
            ));
        }
        let adjustment = self.adjust_quantity(part_id, quantity).await?;
        self.get_part(adjustment.part_id).await
    }

    /// Applies a signed delta to a part's stock. Negative deltas are
    /// conditional the same way [`consume`](Self::consume) is, so the
    /// quantity can never be driven below zero.
    #[instrument(skip(self))]
    pub async fn adjust_quantity(
        &self,
        part_id: i64,
        delta: i32,
    ) -> Result<QuantityAdjustment, ServiceError> {
        if delta == 0 {
            return Err(ServiceError::ValidationError(
                "Adjustment delta cannot be zero".to_string(),
            ));
        }

        let db = &*self.db_pool;

        let mut query = PartEntity::update_many()
            .col_expr(
                part::Column::QuantityInStock,
                Expr::col(part::Column::QuantityInStock).add(delta),
            )
            .filter(part::Column::Id.eq(part_id));
        if delta < 0 {
            query = query.filter(part::Column::QuantityInStock.gte(-delta));
        }

        let result = query.exec(db).await.map_err(|e| {
            error!(error = %e, part_id, "Failed to adjust part quantity");
            ServiceError::DatabaseError(e)
        })?;

        if result.rows_affected == 0 {
            return match PartEntity::find_by_id(part_id).one(db).await? {
                None => Err(ServiceError::NotFound(format!("Part {} not found", part_id))),
                Some(found) => Err(ServiceError::InsufficientStock(format!(
                    "Part {} has {} in stock, cannot remove {}",
                    part_id,
                    found.quantity_in_stock,
                    -delta
                ))),
            };
        }

        let updated = PartEntity::find_by_id(part_id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Part {} not found", part_id)))?;

        let adjustment = QuantityAdjustment {
            part_id,
            previous_quantity: updated.quantity_in_stock - delta,
            new_quantity: updated.quantity_in_stock,
        };

        info!(
            part_id,
            previous = adjustment.previous_quantity,
            new = adjustment.new_quantity,
            "Inventory adjusted"
        );

        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::InventoryAdjusted {
                    part_id,
                    previous_quantity: adjustment.previous_quantity,
                    new_quantity: adjustment.new_quantity,
                })
                .await
            {
                warn!(error = %e, part_id, "Failed to send inventory adjusted event");
            }
            self.notify_if_low(&updated).await;
        }

        Ok(adjustment)
    }

    /// Emits a low-stock event when the part sits at or below its
    /// reorder level.
    pub async fn notify_if_low(&self, updated: &PartModel) {
        if !updated.is_low_stock() {
            return;
        }
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::LowStock {
                    part_id: updated.id,
                    quantity_in_stock: updated.quantity_in_stock,
                    reorder_level: updated.reorder_level,
                })
                .await
            {
                warn!(error = %e, part_id = updated.id, "Failed to send low stock event");
            }
        }
    }

    #[instrument(skip(self))]
    pub async fn delete_part(&self, part_id: i64) -> Result<(), ServiceError> {
        let result = PartEntity::delete_by_id(part_id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!("Part {} not found", part_id)));
        }
        info!(part_id, "Part deleted");
        Ok(())
    }
}
