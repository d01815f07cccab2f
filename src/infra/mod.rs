//! Infrastructure layer - database connection, migrations and repositories.

pub mod db;
pub mod repositories;

pub use db::{Database, Migrator};
pub use repositories::{CustomerRepository, CustomerStore, UserRepository, UserStore};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{MockCustomerRepository, MockUserRepository};
