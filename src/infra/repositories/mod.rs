//! Repository layer - Data access abstraction

pub(crate) mod entities;
mod customer_repository;
mod user_repository;

pub use customer_repository::{CustomerRepository, CustomerStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use customer_repository::MockCustomerRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
