//! Shared fixtures: in-memory repositories and payload builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

use customer_manager::api::{create_router, AppState};
use customer_manager::config::{Config, MSG_EMAIL_TAKEN};
use customer_manager::domain::{
    AccessPolicy, CityFilter, Customer, CustomerCategory, CustomerDraft, CustomerInput, Password,
    Title, User,
};
use customer_manager::errors::{AppError, AppResult};
use customer_manager::infra::{CustomerRepository, UserRepository};
use customer_manager::services::{Authenticator, CustomerManager};

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";
pub const TEST_PASSWORD: &str = "SecurePass123!";

pub fn test_config() -> Config {
    Config::new("postgres://unused/test", TEST_SECRET).expect("valid test config")
}

/// Customer table kept in a vector, ids assigned sequentially from 1.
#[derive(Default)]
pub struct InMemoryCustomers {
    rows: Mutex<Vec<Customer>>,
}

impl InMemoryCustomers {
    pub fn all(&self) -> Vec<Customer> {
        self.rows.lock().unwrap().clone()
    }
}

fn from_draft(id: i64, draft: CustomerDraft) -> Customer {
    Customer {
        id,
        title: draft.title,
        customer_category: draft.customer_category,
        first_name: draft.first_name,
        last_name: draft.last_name,
        email: draft.email,
        address_1: draft.address_1,
        address_2: draft.address_2,
        city: draft.city,
        mobile: draft.mobile,
        phone: draft.phone,
        company_name: draft.company_name,
        photo: draft.photo,
        credit_limit: draft.credit_limit,
        credit_period: draft.credit_period,
        is_deleted: false,
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomers {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Customer>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id && !c.is_deleted)
            .cloned())
    }

    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<Customer>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.email == email)
            .cloned())
    }

    async fn list(&self, filter: &CityFilter) -> AppResult<Vec<Customer>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| !c.is_deleted && filter.allows(&c.city))
            .cloned()
            .collect())
    }

    async fn create(&self, draft: CustomerDraft) -> AppResult<Customer> {
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.email == draft.email) {
            return Err(AppError::field("email", MSG_EMAIL_TAKEN));
        }
        let customer = from_draft(rows.len() as i64 + 1, draft);
        rows.push(customer.clone());
        Ok(customer)
    }

    async fn update(&self, id: i64, draft: CustomerDraft) -> AppResult<Customer> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|c| c.id == id && !c.is_deleted)
            .ok_or(AppError::NotFound)?;
        *row = from_draft(id, draft);
        Ok(row.clone())
    }

    async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|c| c.id == id && !c.is_deleted)
            .ok_or(AppError::NotFound)?;
        row.is_deleted = true;
        Ok(())
    }
}

/// Principals kept in a vector.
#[derive(Default)]
pub struct InMemoryUsers {
    rows: Mutex<Vec<User>>,
}

impl InMemoryUsers {
    /// Insert a principal with [`TEST_PASSWORD`] and the given groups.
    pub fn add(&self, username: &str, groups: &[&str]) -> User {
        let hash = Password::new(TEST_PASSWORD).unwrap().into_string();
        let user = User::new(
            Uuid::new_v4(),
            username.to_string(),
            hash,
            groups.iter().map(|g| g.to_string()).collect(),
        );
        self.rows.lock().unwrap().push(user.clone());
        user
    }

    pub fn deactivate(&self, username: &str) {
        for user in self.rows.lock().unwrap().iter_mut() {
            if user.username == username {
                user.is_active = false;
            }
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.rows.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create(
        &self,
        username: String,
        password_hash: String,
        groups: Vec<String>,
    ) -> AppResult<User> {
        let user = User::new(Uuid::new_v4(), username, password_hash, groups);
        self.rows.lock().unwrap().push(user.clone());
        Ok(user)
    }
}

/// Router over real services backed by in-memory stores.
pub struct TestApp {
    pub router: axum::Router,
    pub customers: Arc<InMemoryCustomers>,
    pub users: Arc<InMemoryUsers>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_policy(AccessPolicy::default())
    }

    pub fn with_policy(policy: AccessPolicy) -> Self {
        let customers = Arc::new(InMemoryCustomers::default());
        let users = Arc::new(InMemoryUsers::default());

        let state = AppState::new(
            Arc::new(Authenticator::new(users.clone(), test_config())),
            Arc::new(CustomerManager::new(customers.clone())),
            policy,
        );

        Self {
            router: create_router(state),
            customers,
            users,
        }
    }
}

/// A complete, valid customer payload.
pub fn customer_input(email: &str, city: &str) -> CustomerInput {
    CustomerInput::from_json(customer_json(email, city))
}

/// JSON body behind [`customer_input`].
pub fn customer_json(email: &str, city: &str) -> serde_json::Value {
    serde_json::json!({
        "title": "Ms",
        "customer_category": "Domestic",
        "first_name": "Kamala",
        "last_name": "Silva",
        "email": email,
        "address_1": "5 Temple Road",
        "address_2": "",
        "city": city,
        "mobile": "0712345678",
        "phone": "",
        "company_name": "",
        "credit_limit": "2500.00",
        "credit_period": 45
    })
}

pub fn sample_customer(id: i64, city: &str) -> Customer {
    Customer {
        id,
        title: Title::Mr,
        customer_category: CustomerCategory::International,
        first_name: "Ruwan".to_string(),
        last_name: "Fernando".to_string(),
        email: format!("ruwan{}@example.com", id),
        address_1: "1 Main Street".to_string(),
        address_2: None,
        city: city.to_string(),
        mobile: "0771112223".to_string(),
        phone: None,
        company_name: Some("Fernando Exports".to_string()),
        photo: None,
        credit_limit: Decimal::new(100_000, 2),
        credit_period: 30,
        is_deleted: false,
    }
}
