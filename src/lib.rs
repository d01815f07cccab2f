//! Customer Manager - customer records API with branch-scoped visibility.
//!
//! Authenticated staff list, create, update and soft-delete customer
//! records. Which records a caller sees depends on the groups carried in
//! their access token, mapped to cities by an [`domain::AccessPolicy`].
//!
//! # Architecture Layers
//!
//! - **cli** / **commands**: `serve`, `migrate`, `users create`
//! - **config**: environment settings and constants
//! - **domain**: customers, principals, the access policy
//! - **services**: authentication and customer use cases
//! - **infra**: SeaORM entities, repositories and migrations
//! - **api**: handlers, middleware, extractors and routes
//! - **errors**: the shared `AppError` type
//!
//! # CLI Usage
//!
//! ```bash
//! customer-manager migrate up
//! customer-manager users create -u colombo.clerk -p 'S3cretPass' -g ColomboBranch,ColomboTeam
//! customer-manager serve --port 8000
//! ```

pub mod api;
pub mod cli;
pub mod commands;
pub mod config;
pub mod domain;
pub mod errors;
pub mod infra;
pub mod services;
pub mod types;

pub use api::AppState;
pub use config::Config;
pub use domain::{AccessPolicy, CityFilter, Customer, Password, User};
pub use errors::{AppError, AppResult};
