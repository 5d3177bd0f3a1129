use crate::{
    db::DbPool,
    entities::{
        mechanic::Entity as MechanicEntity,
        service::Entity as ServiceEntity,
        service_ticket::{self, Entity as TicketEntity, Model as TicketModel},
        ticket_assignment::{self, Entity as AssignmentEntity, Model as AssignmentModel},
        ticket_line_item::{self, Entity as LineItemEntity, Model as LineItemModel},
        ticket_part_usage::{self, Entity as PartUsageEntity, Model as PartUsageModel},
        vehicle::Entity as VehicleEntity,
    },
    errors::ServiceError,
    events::{Event, EventSender},
    services::inventory::InventoryService,
    services::ticket_cost::{self, TicketTotal},
};
use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use strum::{Display, EnumString};
use tracing::{error, info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

/// Lifecycle state of a service ticket.
///
/// Tickets open as `Pending`, move to `InProgress` when work starts,
/// and close as `Completed`. A ticket that has not finished may instead
/// be `Cancelled`. Both `Completed` and `Cancelled` are terminal.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TicketStatus {
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TicketStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TicketStatus::Completed | TicketStatus::Cancelled)
    }

    pub fn can_transition_to(&self, next: TicketStatus) -> bool {
        use TicketStatus::*;
        matches!(
            (self, next),
            (Pending, InProgress) | (InProgress, Completed) | (Pending, Cancelled) | (InProgress, Cancelled)
        )
    }
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateTicketRequest {
    pub customer_id: i64,
    pub vehicle_id: i64,
    #[validate(length(min = 1, message = "Problem description is required"))]
    pub problem_description: String,
    #[validate(range(min = 0, message = "Odometer reading cannot be negative"))]
    pub odometer_miles: i32,
    /// 1 (urgent) through 5 (whenever); defaults to 3
    #[validate(range(min = 1, max = 5, message = "Priority must be between 1 and 5"))]
    pub priority: Option<i32>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UpdateTicketStatusRequest {
    pub status: String,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateLineItemRequest {
    pub service_id: Option<i64>,
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
    /// Must be positive; fractional values are allowed
    pub quantity: Decimal,
    /// Optional for catalog service lines, which default to the
    /// service's base price. Required for ad hoc lines.
    #[validate(range(min = 0, message = "Unit price cannot be negative"))]
    pub unit_price_cents: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AttachPartRequest {
    pub part_id: i64,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
    /// Markup percentage; defaults to the shop's standard 30%
    pub markup_percent: Option<Decimal>,
    #[validate(range(min = 0, message = "Warranty months cannot be negative"))]
    pub warranty_months: Option<i32>,
    pub installed_by_mechanic_id: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignMechanicRequest {
    pub mechanic_id: i64,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct AssignmentEdit {
    pub mechanic_id: i64,
    #[validate(length(min = 1, message = "Role is required"))]
    pub role: String,
    #[validate(range(min = 0, message = "Minutes worked cannot be negative"))]
    pub minutes_worked: i32,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct BulkEditAssignmentsRequest {
    /// Assignments to create on the ticket
    #[serde(default)]
    pub adds: Vec<AssignmentEdit>,
    /// Mechanic ids to unassign from the ticket
    #[serde(default)]
    pub removes: Vec<i64>,
}

/// Manages service tickets: lifecycle, labor lines, part usage, and
/// mechanic assignments.
#[derive(Clone)]
pub struct TicketService {
    db_pool: Arc<DbPool>,
    inventory: InventoryService,
    event_sender: Option<Arc<EventSender>>,
}

impl TicketService {
    pub fn new(
        db_pool: Arc<DbPool>,
        inventory: InventoryService,
        event_sender: Option<Arc<EventSender>>,
    ) -> Self {
        Self {
            db_pool,
            inventory,
            event_sender,
        }
    }

    async fn send_event(&self, event: Event) {
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender.send(event).await {
                warn!(error = %e, "Failed to send ticket event");
            }
        }
    }

    fn parse_status(&self, ticket: &TicketModel) -> Result<TicketStatus, ServiceError> {
        TicketStatus::from_str(&ticket.status).map_err(|_| {
            error!(ticket_id = ticket.id, status = %ticket.status, "Ticket has unrecognized status");
            ServiceError::InternalError(format!(
                "Ticket {} has unrecognized status {}",
                ticket.id, ticket.status
            ))
        })
    }

    /// Loads a ticket and rejects the call if it has already closed.
    async fn find_open_ticket<C>(&self, conn: &C, ticket_id: i64) -> Result<TicketModel, ServiceError>
    where
        C: ConnectionTrait,
    {
        let ticket = TicketEntity::find_by_id(ticket_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Ticket {} not found", ticket_id)))?;

        if self.parse_status(&ticket)?.is_terminal() {
            return Err(ServiceError::TicketClosed(format!(
                "Ticket {} is {} and can no longer be modified",
                ticket_id, ticket.status
            )));
        }
        Ok(ticket)
    }

    #[instrument(skip(self, request), fields(customer_id = request.customer_id, vehicle_id = request.vehicle_id))]
    pub async fn create_ticket(
        &self,
        request: CreateTicketRequest,
    ) -> Result<TicketModel, ServiceError> {
        request.validate()?;

        let vehicle = VehicleEntity::find_by_id(request.vehicle_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Vehicle {} not found", request.vehicle_id))
            })?;

        if vehicle.customer_id != request.customer_id {
            return Err(ServiceError::ValidationError(format!(
                "Vehicle {} does not belong to customer {}",
                request.vehicle_id, request.customer_id
            )));
        }

        let ticket = service_ticket::ActiveModel {
            customer_id: Set(request.customer_id),
            vehicle_id: Set(request.vehicle_id),
            status: Set(TicketStatus::Pending.to_string()),
            problem_description: Set(request.problem_description),
            odometer_miles: Set(request.odometer_miles),
            priority: Set(request.priority.unwrap_or(3)),
            opened_at: Set(Utc::now()),
            closed_at: Set(None),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(ticket_id = ticket.id, "Service ticket opened");
        self.send_event(Event::TicketOpened {
            ticket_id: ticket.id,
            customer_id: ticket.customer_id,
            vehicle_id: ticket.vehicle_id,
        })
        .await;

        Ok(ticket)
    }

    pub async fn get_ticket(&self, ticket_id: i64) -> Result<TicketModel, ServiceError> {
        TicketEntity::find_by_id(ticket_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Ticket {} not found", ticket_id)))
    }

    pub async fn list_tickets(
        &self,
        status: Option<TicketStatus>,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<TicketModel>, u64), ServiceError> {
        let mut query = TicketEntity::find().order_by_desc(service_ticket::Column::OpenedAt);
        if let Some(status) = status {
            query = query.filter(service_ticket::Column::Status.eq(status.to_string()));
        }
        let paginator = query.paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let tickets = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((tickets, total))
    }

    /// Moves a ticket through its lifecycle. A ticket that has reached
    /// a terminal state rejects all further changes; a legal move to
    /// `completed` stamps `closed_at`, and that stamp is never written
    /// again.
    #[instrument(skip(self))]
    pub async fn update_status(
        &self,
        ticket_id: i64,
        request: UpdateTicketStatusRequest,
    ) -> Result<TicketModel, ServiceError> {
        let next = TicketStatus::from_str(&request.status).map_err(|_| {
            ServiceError::ValidationError(format!("Unknown ticket status {}", request.status))
        })?;

        let ticket = self.get_ticket(ticket_id).await?;
        let current = self.parse_status(&ticket)?;

        if current.is_terminal() {
            return Err(ServiceError::TicketClosed(format!(
                "Ticket {} is {} and can no longer change status",
                ticket_id, ticket.status
            )));
        }
        if !current.can_transition_to(next) {
            return Err(ServiceError::ValidationError(format!(
                "Cannot move ticket from {} to {}",
                current, next
            )));
        }

        let old_status = current.to_string();
        let mut update = TicketEntity::update_many()
            .col_expr(service_ticket::Column::Status, Expr::value(next.to_string()));
        if next == TicketStatus::Completed {
            update = update.col_expr(service_ticket::Column::ClosedAt, Expr::value(Some(Utc::now())));
        }

        // Guard against a concurrent transition: only the caller that
        // still observes the old status wins.
        let result = update
            .filter(service_ticket::Column::Id.eq(ticket_id))
            .filter(service_ticket::Column::Status.eq(old_status.clone()))
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::Conflict(format!(
                "Ticket {} changed status concurrently; retry",
                ticket_id
            )));
        }
        let updated = self.get_ticket(ticket_id).await?;

        info!(ticket_id, from = %old_status, to = %updated.status, "Ticket status changed");
        self.send_event(Event::TicketStatusChanged {
            ticket_id,
            old_status,
            new_status: updated.status.clone(),
        })
        .await;

        Ok(updated)
    }

    /// Adds a labor or service charge to an open ticket.
    #[instrument(skip(self, request), fields(ticket_id))]
    pub async fn create_line_item(
        &self,
        ticket_id: i64,
        request: CreateLineItemRequest,
    ) -> Result<LineItemModel, ServiceError> {
        request.validate()?;
        if request.quantity <= Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Quantity must be positive".to_string(),
            ));
        }

        self.find_open_ticket(&*self.db_pool, ticket_id).await?;

        // Catalog lines default their price from the referenced service;
        // ad hoc lines must quote one explicitly.
        let (line_type, unit_price_cents) = match request.service_id {
            Some(service_id) => {
                let service = ServiceEntity::find_by_id(service_id)
                    .one(&*self.db_pool)
                    .await?
                    .ok_or_else(|| {
                        ServiceError::NotFound(format!("Service {} not found", service_id))
                    })?;
                (
                    "service",
                    request.unit_price_cents.unwrap_or(service.base_price_cents),
                )
            }
            None => {
                let price = request.unit_price_cents.ok_or_else(|| {
                    ServiceError::ValidationError(
                        "Ad hoc line items require a unit price".to_string(),
                    )
                })?;
                ("adhoc", price)
            }
        };

        let line = ticket_line_item::ActiveModel {
            ticket_id: Set(ticket_id),
            service_id: Set(request.service_id),
            line_type: Set(line_type.to_string()),
            description: Set(request.description),
            quantity: Set(request.quantity),
            unit_price_cents: Set(unit_price_cents),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(ticket_id, line_item_id = line.id, "Line item added");
        self.send_event(Event::LineItemAdded {
            ticket_id,
            line_item_id: line.id,
        })
        .await;

        Ok(line)
    }

    pub async fn list_line_items(&self, ticket_id: i64) -> Result<Vec<LineItemModel>, ServiceError> {
        self.get_ticket(ticket_id).await?;
        let items = LineItemEntity::find()
            .filter(ticket_line_item::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_line_item::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(items)
    }

    /// Attaches a part to an open ticket, consuming it from inventory
    /// and capturing the unit cost at this moment. The stock decrement
    /// and the usage row commit together; if either fails nothing
    /// changes.
    #[instrument(skip(self, request), fields(ticket_id, part_id = request.part_id))]
    pub async fn attach_part(
        &self,
        ticket_id: i64,
        request: AttachPartRequest,
    ) -> Result<PartUsageModel, ServiceError> {
        request.validate()?;
        let markup = request.markup_percent.unwrap_or_else(|| Decimal::new(300, 1));
        if markup < Decimal::ZERO {
            return Err(ServiceError::ValidationError(
                "Markup cannot be negative".to_string(),
            ));
        }

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for part attachment");
            ServiceError::DatabaseError(e)
        })?;

        self.find_open_ticket(&txn, ticket_id).await?;

        if let Some(mechanic_id) = request.installed_by_mechanic_id {
            MechanicEntity::find_by_id(mechanic_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Mechanic {} not found", mechanic_id))
                })?;
        }

        let existing = PartUsageEntity::find_by_id((ticket_id, request.part_id))
            .one(&txn)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Part {} is already attached to ticket {}",
                request.part_id, ticket_id
            )));
        }

        // Conditional decrement; fails the whole attachment when stock
        // is short.
        let part = self
            .inventory
            .consume(&txn, request.part_id, request.quantity)
            .await?;

        let usage = ticket_part_usage::ActiveModel {
            ticket_id: Set(ticket_id),
            part_id: Set(request.part_id),
            quantity: Set(request.quantity),
            unit_cost_cents: Set(part.current_cost_cents),
            markup_percent: Set(markup),
            warranty_months: Set(request.warranty_months),
            installed_by_mechanic_id: Set(request.installed_by_mechanic_id),
            attached_at: Set(Utc::now()),
        }
        .insert(&txn)
        .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, ticket_id, "Failed to commit part attachment");
            ServiceError::DatabaseError(e)
        })?;

        info!(ticket_id, part_id = usage.part_id, quantity = usage.quantity, "Part attached");
        self.send_event(Event::PartConsumed {
            ticket_id,
            part_id: usage.part_id,
            quantity: usage.quantity,
        })
        .await;
        self.inventory.notify_if_low(&part).await;

        Ok(usage)
    }

    pub async fn list_part_usages(
        &self,
        ticket_id: i64,
    ) -> Result<Vec<PartUsageModel>, ServiceError> {
        self.get_ticket(ticket_id).await?;
        let usages = PartUsageEntity::find()
            .filter(ticket_part_usage::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_part_usage::Column::PartId)
            .all(&*self.db_pool)
            .await?;
        Ok(usages)
    }

    /// Recomputes the ticket total from its stored lines. Never cached;
    /// the same rows always produce the same figure.
    pub async fn get_ticket_total(&self, ticket_id: i64) -> Result<TicketTotal, ServiceError> {
        self.get_ticket(ticket_id).await?;

        let line_items = LineItemEntity::find()
            .filter(ticket_line_item::Column::TicketId.eq(ticket_id))
            .all(&*self.db_pool)
            .await?;
        let part_usages = PartUsageEntity::find()
            .filter(ticket_part_usage::Column::TicketId.eq(ticket_id))
            .all(&*self.db_pool)
            .await?;

        Ok(ticket_cost::compute_total(&line_items, &part_usages))
    }

    /// Assigns a mechanic to an open ticket. A mechanic already on the
    /// ticket is rejected, never silently updated.
    #[instrument(skip(self, request), fields(ticket_id, mechanic_id = request.mechanic_id))]
    pub async fn assign_mechanic(
        &self,
        ticket_id: i64,
        request: AssignMechanicRequest,
    ) -> Result<AssignmentModel, ServiceError> {
        self.find_open_ticket(&*self.db_pool, ticket_id).await?;

        MechanicEntity::find_by_id(request.mechanic_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Mechanic {} not found", request.mechanic_id))
            })?;

        let existing = AssignmentEntity::find_by_id((ticket_id, request.mechanic_id))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::DuplicateAssignment(format!(
                "Mechanic {} is already assigned to ticket {}",
                request.mechanic_id, ticket_id
            )));
        }

        let assignment = ticket_assignment::ActiveModel {
            ticket_id: Set(ticket_id),
            mechanic_id: Set(request.mechanic_id),
            role: Set(request.role.unwrap_or_else(|| "Technician".to_string())),
            minutes_worked: Set(0),
            assigned_at: Set(Utc::now()),
        }
        .insert(&*self.db_pool)
        .await?;

        info!(ticket_id, mechanic_id = assignment.mechanic_id, "Mechanic assigned");
        self.send_event(Event::MechanicAssigned {
            ticket_id,
            mechanic_id: assignment.mechanic_id,
        })
        .await;

        Ok(assignment)
    }

    #[instrument(skip(self))]
    pub async fn remove_mechanic(
        &self,
        ticket_id: i64,
        mechanic_id: i64,
    ) -> Result<(), ServiceError> {
        self.find_open_ticket(&*self.db_pool, ticket_id).await?;

        let result = AssignmentEntity::delete_by_id((ticket_id, mechanic_id))
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Mechanic {} is not assigned to ticket {}",
                mechanic_id, ticket_id
            )));
        }

        info!(ticket_id, mechanic_id, "Mechanic unassigned");
        self.send_event(Event::MechanicUnassigned {
            ticket_id,
            mechanic_id,
        })
        .await;
        Ok(())
    }

    pub async fn list_assignments(
        &self,
        ticket_id: i64,
    ) -> Result<Vec<AssignmentModel>, ServiceError> {
        self.get_ticket(ticket_id).await?;
        let assignments = AssignmentEntity::find()
            .filter(ticket_assignment::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_assignment::Column::MechanicId)
            .all(&*self.db_pool)
            .await?;
        Ok(assignments)
    }

    /// Applies a batch of assignment additions and removals in one
    /// transaction. Any invalid entry rolls back the entire edit; there
    /// is no partial application.
    #[instrument(skip(self, request), fields(ticket_id))]
    pub async fn bulk_edit_assignments(
        &self,
        ticket_id: i64,
        request: BulkEditAssignmentsRequest,
    ) -> Result<Vec<AssignmentModel>, ServiceError> {
        let mut seen = HashSet::new();
        for edit in &request.adds {
            edit.validate()?;
            if !seen.insert(edit.mechanic_id) {
                return Err(ServiceError::DuplicateAssignment(format!(
                    "Mechanic {} appears more than once in the edit",
                    edit.mechanic_id
                )));
            }
        }

        let txn = self.db_pool.begin().await.map_err(|e| {
            error!(error = %e, "Failed to start transaction for assignment edit");
            ServiceError::DatabaseError(e)
        })?;

        self.find_open_ticket(&txn, ticket_id).await?;

        // Removals first so an add may re-assign a removed mechanic
        // within the same edit.
        for mechanic_id in &request.removes {
            let result = AssignmentEntity::delete_by_id((ticket_id, *mechanic_id))
                .exec(&txn)
                .await?;
            if result.rows_affected == 0 {
                return Err(ServiceError::NotFound(format!(
                    "Mechanic {} is not assigned to ticket {}",
                    mechanic_id, ticket_id
                )));
            }
        }

        let now = Utc::now();
        for edit in &request.adds {
            MechanicEntity::find_by_id(edit.mechanic_id)
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    ServiceError::NotFound(format!("Mechanic {} not found", edit.mechanic_id))
                })?;

            let existing = AssignmentEntity::find_by_id((ticket_id, edit.mechanic_id))
                .one(&txn)
                .await?;
            if existing.is_some() {
                return Err(ServiceError::DuplicateAssignment(format!(
                    "Mechanic {} is already assigned to ticket {}",
                    edit.mechanic_id, ticket_id
                )));
            }

            ticket_assignment::ActiveModel {
                ticket_id: Set(ticket_id),
                mechanic_id: Set(edit.mechanic_id),
                role: Set(edit.role.clone()),
                minutes_worked: Set(edit.minutes_worked),
                assigned_at: Set(now),
            }
            .insert(&txn)
            .await?;
        }

        let results = AssignmentEntity::find()
            .filter(ticket_assignment::Column::TicketId.eq(ticket_id))
            .order_by_asc(ticket_assignment::Column::MechanicId)
            .all(&txn)
            .await?;

        txn.commit().await.map_err(|e| {
            error!(error = %e, ticket_id, "Failed to commit assignment edit");
            ServiceError::DatabaseError(e)
        })?;

        info!(
            ticket_id,
            added = request.adds.len(),
            removed = request.removes.len(),
            "Assignments edited"
        );
        self.send_event(Event::AssignmentsEdited {
            ticket_id,
            assignment_count: results.len(),
        })
        .await;

        Ok(results)
    }

    /// Open tickets (pending or in progress) for a customer; used to
    /// block customer deletion while work remains.
    pub async fn count_open_for_customer(&self, customer_id: i64) -> Result<u64, ServiceError> {
        let count = TicketEntity::find()
            .filter(service_ticket::Column::CustomerId.eq(customer_id))
            .filter(
                service_ticket::Column::Status.is_in([
                    TicketStatus::Pending.to_string(),
                    TicketStatus::InProgress.to_string(),
                ]),
            )
            .count(&*self.db_pool)
            .await?;
        Ok(count)
    }
}
