//! Application services layer - use cases and business logic.
//!
//! Services depend on repository traits, never on SeaORM directly.

mod auth_service;
pub mod container;
mod customer_service;

pub use container::{ServiceContainer, Services};

pub use auth_service::{AccessToken, AuthService, Authenticator, Claims, TokenKind, TokenPair};
pub use customer_service::{CustomerManager, CustomerService};
