//! Domain layer - customer records, principals and branch access rules.
//!
//! Nothing here touches the database or HTTP.

pub mod access;
pub mod customer;
pub mod password;
pub mod user;

pub use access::{AccessPolicy, CityFilter, GroupCities, GroupCityTable};
pub use customer::{
    Customer, CustomerCategory, CustomerDraft, CustomerInput, ParseChoiceError, Title,
};
pub use password::Password;
pub use user::{ProfileResponse, User};
