//! Customer database entity for SeaORM.

use sea_orm::entity::prelude::*;

use crate::domain::{Customer, ParseChoiceError};

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "customers")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub customer_category: String,
    pub first_name: String,
    pub last_name: String,
    #[sea_orm(unique)]
    pub email: String,
    pub address_1: String,
    pub address_2: Option<String>,
    pub city: String,
    pub mobile: String,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub photo: Option<String>,
    #[sea_orm(column_type = "Decimal(Some((10, 2)))")]
    pub credit_limit: Decimal,
    pub credit_period: i32,
    /// Soft delete flag (false = active)
    pub is_deleted: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Convert a stored row to the domain entity.
///
/// Fails only if the row holds a choice value the domain does not know.
impl TryFrom<Model> for Customer {
    type Error = ParseChoiceError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Customer {
            id: model.id,
            title: model.title.parse()?,
            customer_category: model.customer_category.parse()?,
            first_name: model.first_name,
            last_name: model.last_name,
            email: model.email,
            address_1: model.address_1,
            address_2: model.address_2,
            city: model.city,
            mobile: model.mobile,
            phone: model.phone,
            company_name: model.company_name,
            photo: model.photo,
            credit_limit: model.credit_limit,
            credit_period: model.credit_period,
            is_deleted: model.is_deleted,
        })
    }
}
