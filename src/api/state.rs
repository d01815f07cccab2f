//! Application state - dependency injection container for handlers.

use std::sync::Arc;

use crate::config::Config;
use crate::domain::AccessPolicy;
use crate::infra::Database;
use crate::services::{AuthService, CustomerService, ServiceContainer, Services};

/// Application state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<dyn AuthService>,
    pub customer_service: Arc<dyn CustomerService>,
    /// Group/city tables, fixed for the life of the process
    pub access_policy: Arc<AccessPolicy>,
    /// Absent when services are injected without a database (tests)
    pub database: Option<Arc<Database>>,
}

impl AppState {
    /// Wire SeaORM-backed services over an open database.
    pub fn from_config(database: Arc<Database>, access_policy: AccessPolicy, config: Config) -> Self {
        let container = Services::from_connection(database.get_connection(), config);

        Self {
            auth_service: container.auth(),
            customer_service: container.customers(),
            access_policy: Arc::new(access_policy),
            database: Some(database),
        }
    }

    /// Create state with manually injected services.
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        customer_service: Arc<dyn CustomerService>,
        access_policy: AccessPolicy,
    ) -> Self {
        Self {
            auth_service,
            customer_service,
            access_policy: Arc::new(access_policy),
            database: None,
        }
    }
}
