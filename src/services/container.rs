//! Service container - one place that wires repositories into services.

use std::sync::Arc;

use super::{AuthService, Authenticator, CustomerManager, CustomerService};
use crate::config::Config;
use crate::infra::{CustomerStore, UserStore};

/// Service container trait for dependency injection.
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn customers(&self) -> Arc<dyn CustomerService>;
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth_service: Arc<dyn AuthService>,
    customer_service: Arc<dyn CustomerService>,
}

impl Services {
    pub fn new(
        auth_service: Arc<dyn AuthService>,
        customer_service: Arc<dyn CustomerService>,
    ) -> Self {
        Self {
            auth_service,
            customer_service,
        }
    }

    /// Build every service on top of the SeaORM stores.
    pub fn from_connection(db: sea_orm::DatabaseConnection, config: Config) -> Self {
        let users = Arc::new(UserStore::new(db.clone()));
        let customers = Arc::new(CustomerStore::new(db));

        Self {
            auth_service: Arc::new(Authenticator::new(users, config)),
            customer_service: Arc::new(CustomerManager::new(customers)),
        }
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth_service.clone()
    }

    fn customers(&self) -> Arc<dyn CustomerService> {
        self.customer_service.clone()
    }
}
