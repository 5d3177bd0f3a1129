use crate::{
    db::DbPool,
    entities::customer::{self, Entity as CustomerEntity, Model as CustomerModel},
    errors::ServiceError,
    events::{Event, EventSender},
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateCustomerRequest {
    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,
    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
    #[validate(email(message = "A valid email is required"))]
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateCustomerRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    #[validate(email(message = "A valid email is required"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub postal_code: Option<String>,
}

/// Manages customer accounts.
#[derive(Clone)]
pub struct CustomerService {
    db_pool: Arc<DbPool>,
    event_sender: Option<Arc<EventSender>>,
}

impl CustomerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Option<Arc<EventSender>>) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    /// Creates a customer with an already-hashed password. Hashing is
    /// the auth service's job; raw passwords never reach this layer.
    #[instrument(skip(self, request, password_hash), fields(email = %request.email))]
    pub async fn create_customer(
        &self,
        request: CreateCustomerRequest,
        password_hash: String,
    ) -> Result<CustomerModel, ServiceError> {
        request.validate()?;

        let existing = CustomerEntity::find()
            .filter(customer::Column::Email.eq(request.email.clone()))
            .one(&*self.db_pool)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::Conflict(format!(
                "Email {} is already registered",
                request.email
            )));
        }

        let model = customer::ActiveModel {
            first_name: Set(request.first_name),
            last_name: Set(request.last_name),
            email: Set(request.email),
            phone: Set(request.phone),
            address: Set(request.address),
            city: Set(request.city),
            state: Set(request.state),
            postal_code: Set(request.postal_code),
            password_hash: Set(password_hash),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&*self.db_pool)
        .await?;

        info!(customer_id = model.id, "Customer created");
        if let Some(event_sender) = &self.event_sender {
            if let Err(e) = event_sender
                .send(Event::CustomerCreated {
                    customer_id: model.id,
                })
                .await
            {
                warn!(error = %e, customer_id = model.id, "Failed to send customer created event");
            }
        }

        Ok(model)
    }

    pub async fn get_customer(&self, customer_id: i64) -> Result<CustomerModel, ServiceError> {
        CustomerEntity::find_by_id(customer_id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Customer {} not found", customer_id)))
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<CustomerModel>, ServiceError> {
        let found = CustomerEntity::find()
            .filter(customer::Column::Email.eq(email))
            .one(&*self.db_pool)
            .await?;
        Ok(found)
    }

    pub async fn list_customers(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<(Vec<CustomerModel>, u64), ServiceError> {
        let paginator = CustomerEntity::find()
            .order_by_asc(customer::Column::LastName)
            .paginate(&*self.db_pool, per_page);
        let total = paginator.num_items().await?;
        let customers = paginator.fetch_page(page.saturating_sub(1)).await?;
        Ok((customers, total))
    }

    #[instrument(skip(self, request))]
    pub async fn update_customer(
        &self,
        customer_id: i64,
        request: UpdateCustomerRequest,
    ) -> Result<CustomerModel, ServiceError> {
        request.validate()?;

        if let Some(email) = &request.email {
            let taken = CustomerEntity::find()
                .filter(customer::Column::Email.eq(email.clone()))
                .filter(customer::Column::Id.ne(customer_id))
                .one(&*self.db_pool)
                .await?;
            if taken.is_some() {
                return Err(ServiceError::Conflict(format!(
                    "Email {} is already registered",
                    email
                )));
            }
        }

        let existing = self.get_customer(customer_id).await?;
        let mut active: customer::ActiveModel = existing.into();

        if let Some(first_name) = request.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = request.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = request.email {
            active.email = Set(email);
        }
        if let Some(phone) = request.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(address) = request.address {
            active.address = Set(Some(address));
        }
        if let Some(city) = request.city {
            active.city = Set(Some(city));
        }
        if let Some(state) = request.state {
            active.state = Set(Some(state));
        }
        if let Some(postal_code) = request.postal_code {
            active.postal_code = Set(Some(postal_code));
        }

        Ok(active.update(&*self.db_pool).await?)
    }

    /// Deletes a customer. The handler refuses the call while the
    /// customer still has open tickets, so history for finished work is
    /// the only thing removed alongside the account.
    #[instrument(skip(self))]
    pub async fn delete_customer(&self, customer_id: i64) -> Result<(), ServiceError> {
        let result = CustomerEntity::delete_by_id(customer_id)
            .exec(&*self.db_pool)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::NotFound(format!(
                "Customer {} not found",
                customer_id
            )));
        }
        info!(customer_id, "Customer deleted");
        Ok(())
    }
}
