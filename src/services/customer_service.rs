//! Customer service - customer use cases on top of the repository.

use async_trait::async_trait;
use std::sync::Arc;

use crate::config::MSG_EMAIL_TAKEN;
use crate::domain::{CityFilter, Customer, CustomerInput};
use crate::errors::{AppError, AppResult};
use crate::infra::CustomerRepository;

/// Customer service trait for dependency injection.
///
/// Every operation ignores soft-deleted customers, except that their
/// emails remain reserved.
#[async_trait]
pub trait CustomerService: Send + Sync {
    /// Active customers visible through `filter`, ordered by ID
    async fn list_customers(&self, filter: &CityFilter) -> AppResult<Vec<Customer>>;

    /// Validate and store a new customer
    async fn create_customer(&self, input: CustomerInput) -> AppResult<Customer>;

    /// Replace every field of an active customer
    async fn update_customer(&self, id: i64, input: CustomerInput) -> AppResult<Customer>;

    /// Soft delete an active customer
    async fn delete_customer(&self, id: i64) -> AppResult<()>;
}

/// Concrete implementation of CustomerService.
pub struct CustomerManager<R: CustomerRepository> {
    customers: Arc<R>,
}

impl<R: CustomerRepository> CustomerManager<R> {
    pub fn new(customers: Arc<R>) -> Self {
        Self { customers }
    }

    /// Reject an email held by any other customer, deleted ones included.
    async fn ensure_email_free(&self, email: &str, owner: Option<i64>) -> AppResult<()> {
        match self.customers.find_by_email_with_deleted(email).await? {
            Some(existing) if Some(existing.id) != owner => {
                Err(AppError::field("email", MSG_EMAIL_TAKEN))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl<R: CustomerRepository> CustomerService for CustomerManager<R> {
    async fn list_customers(&self, filter: &CityFilter) -> AppResult<Vec<Customer>> {
        self.customers.list(filter).await
    }

    async fn create_customer(&self, input: CustomerInput) -> AppResult<Customer> {
        let draft = input.into_draft()?;
        self.ensure_email_free(&draft.email, None).await?;

        let customer = self.customers.create(draft).await?;
        tracing::info!(customer_id = customer.id, city = %customer.city, "Customer created");
        Ok(customer)
    }

    async fn update_customer(&self, id: i64, input: CustomerInput) -> AppResult<Customer> {
        // A missing target wins over a bad payload
        if self.customers.find_by_id(id).await?.is_none() {
            return Err(AppError::NotFound);
        }

        let draft = input.into_draft()?;
        self.ensure_email_free(&draft.email, Some(id)).await?;

        let customer = self.customers.update(id, draft).await?;
        tracing::info!(customer_id = id, "Customer updated");
        Ok(customer)
    }

    async fn delete_customer(&self, id: i64) -> AppResult<()> {
        self.customers.soft_delete(id).await?;
        tracing::info!(customer_id = id, "Customer soft deleted");
        Ok(())
    }
}
