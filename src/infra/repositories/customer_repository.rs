//! Customer repository with soft delete support.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter,
    QueryOrder, Set, SqlErr,
};

use super::entities::customer::{self, ActiveModel, Entity as CustomerEntity};
use crate::config::MSG_EMAIL_TAKEN;
use crate::domain::{CityFilter, Customer, CustomerDraft};
use crate::errors::{AppError, AppResult, OptionExt};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Customer repository trait for dependency injection.
///
/// Query methods exclude soft-deleted records unless the name says
/// `with_deleted`.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Find active customer by ID
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Customer>>;

    /// Find customer by email including soft-deleted.
    /// Emails stay reserved after deletion.
    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<Customer>>;

    /// Active customers passing the filter, ordered by ID
    async fn list(&self, filter: &CityFilter) -> AppResult<Vec<Customer>>;

    async fn create(&self, draft: CustomerDraft) -> AppResult<Customer>;

    /// Replace every writable field of an active customer
    async fn update(&self, id: i64, draft: CustomerDraft) -> AppResult<Customer>;

    /// Set the deleted flag on an active customer
    async fn soft_delete(&self, id: i64) -> AppResult<()>;
}

/// SeaORM implementation of CustomerRepository
pub struct CustomerStore {
    db: DatabaseConnection,
}

impl CustomerStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_active_model(&self, id: i64) -> AppResult<Option<customer::Model>> {
        Ok(CustomerEntity::find_by_id(id)
            .filter(customer::Column::IsDeleted.eq(false))
            .one(&self.db)
            .await?)
    }
}

fn to_domain(model: customer::Model) -> AppResult<Customer> {
    let id = model.id;
    Customer::try_from(model)
        .map_err(|e| AppError::internal(format!("Customer {} has invalid data: {}", id, e)))
}

fn map_write_err(err: DbErr) -> AppError {
    classify_write_err(err.sql_err(), err)
}

/// Unique violations surface as an email field error, everything else as-is.
/// The email index is the only unique constraint on the table.
fn classify_write_err(kind: Option<SqlErr>, err: DbErr) -> AppError {
    match kind {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::field("email", MSG_EMAIL_TAKEN),
        _ => AppError::from(err),
    }
}

fn apply_draft(active: &mut ActiveModel, draft: CustomerDraft) {
    active.title = Set(draft.title.to_string());
    active.customer_category = Set(draft.customer_category.to_string());
    active.first_name = Set(draft.first_name);
    active.last_name = Set(draft.last_name);
    active.email = Set(draft.email);
    active.address_1 = Set(draft.address_1);
    active.address_2 = Set(draft.address_2);
    active.city = Set(draft.city);
    active.mobile = Set(draft.mobile);
    active.phone = Set(draft.phone);
    active.company_name = Set(draft.company_name);
    active.photo = Set(draft.photo);
    active.credit_limit = Set(draft.credit_limit);
    active.credit_period = Set(draft.credit_period);
}

#[async_trait]
impl CustomerRepository for CustomerStore {
    async fn find_by_id(&self, id: i64) -> AppResult<Option<Customer>> {
        self.find_active_model(id).await?.map(to_domain).transpose()
    }

    async fn find_by_email_with_deleted(&self, email: &str) -> AppResult<Option<Customer>> {
        CustomerEntity::find()
            .filter(customer::Column::Email.eq(email))
            .one(&self.db)
            .await?
            .map(to_domain)
            .transpose()
    }

    async fn list(&self, filter: &CityFilter) -> AppResult<Vec<Customer>> {
        let mut query = CustomerEntity::find().filter(customer::Column::IsDeleted.eq(false));

        if let CityFilter::Cities(cities) = filter {
            if cities.is_empty() {
                return Ok(Vec::new());
            }
            query = query.filter(customer::Column::City.is_in(cities.iter().cloned()));
        }

        query
            .order_by_asc(customer::Column::Id)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_domain)
            .collect()
    }

    async fn create(&self, draft: CustomerDraft) -> AppResult<Customer> {
        let mut active = ActiveModel {
            is_deleted: Set(false),
            ..Default::default()
        };
        apply_draft(&mut active, draft);

        let model = active.insert(&self.db).await.map_err(map_write_err)?;
        tracing::debug!(customer_id = model.id, "Customer row inserted");
        to_domain(model)
    }

    async fn update(&self, id: i64, draft: CustomerDraft) -> AppResult<Customer> {
        let model = self.find_active_model(id).await?.ok_or_not_found()?;

        let mut active: ActiveModel = model.into();
        apply_draft(&mut active, draft);

        let model = active.update(&self.db).await.map_err(map_write_err)?;
        to_domain(model)
    }

    async fn soft_delete(&self, id: i64) -> AppResult<()> {
        let model = self.find_active_model(id).await?.ok_or_not_found()?;

        let mut active: ActiveModel = model.into();
        active.is_deleted = Set(true);
        active.update(&self.db).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rust_decimal::Decimal;
    use sea_orm::{DatabaseBackend, MockDatabase};

    use super::*;
    use crate::domain::{CustomerCategory, Title};

    fn row(id: i64, city: &str) -> customer::Model {
        customer::Model {
            id,
            title: "Mrs".to_string(),
            customer_category: "Domestic".to_string(),
            first_name: "Dilani".to_string(),
            last_name: "Jayasuriya".to_string(),
            email: format!("dilani{}@example.com", id),
            address_1: "8 Lake Drive".to_string(),
            address_2: None,
            city: city.to_string(),
            mobile: "0779998887".to_string(),
            phone: None,
            company_name: None,
            photo: None,
            credit_limit: Decimal::new(50_000, 2),
            credit_period: 14,
            is_deleted: false,
        }
    }

    fn draft(email: &str) -> CustomerDraft {
        CustomerDraft {
            title: Title::Dr,
            customer_category: CustomerCategory::International,
            first_name: "Ashan".to_string(),
            last_name: "Wickrama".to_string(),
            email: email.to_string(),
            address_1: "3 Hill Street".to_string(),
            address_2: None,
            city: "Galle".to_string(),
            mobile: "0701231234".to_string(),
            phone: None,
            company_name: Some("Wickrama Tea".to_string()),
            photo: None,
            credit_limit: Decimal::new(1_000_000, 2),
            credit_period: 60,
        }
    }

    fn store(db: MockDatabase) -> CustomerStore {
        CustomerStore::new(db.into_connection())
    }

    /// SQL of every statement the store issued, in order.
    fn issued_sql(store: CustomerStore) -> Vec<String> {
        store
            .db
            .into_transaction_log()
            .iter()
            .flat_map(|txn| txn.statements().iter().map(|stmt| stmt.sql.clone()))
            .collect()
    }

    #[tokio::test]
    async fn test_list_filters_active_rows_by_city_in_id_order() {
        let store = store(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row(1, "Colombo"), row(2, "Kandy")]]),
        );

        let customers = store
            .list(&CityFilter::cities(["Colombo", "Kandy"]))
            .await
            .unwrap();
        assert_eq!(customers.iter().map(|c| c.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(customers[0].title, Title::Mrs);

        let sql = issued_sql(store);
        assert_eq!(sql.len(), 1);
        assert!(sql[0].contains(r#""customers"."is_deleted" = $1"#), "{}", sql[0]);
        assert!(sql[0].contains(r#""customers"."city" IN ($2, $3)"#), "{}", sql[0]);
        assert!(sql[0].ends_with(r#"ORDER BY "customers"."id" ASC"#), "{}", sql[0]);
    }

    #[tokio::test]
    async fn test_unrestricted_list_has_no_city_clause() {
        let store = store(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row(1, "Jaffna")]]),
        );

        assert_eq!(store.list(&CityFilter::Unrestricted).await.unwrap().len(), 1);

        let sql = issued_sql(store);
        assert!(sql[0].contains(r#""customers"."is_deleted" = $1"#));
        assert!(!sql[0].contains(r#""city" IN"#));
    }

    #[tokio::test]
    async fn test_empty_city_set_skips_the_query() {
        let store = store(MockDatabase::new(DatabaseBackend::Postgres));

        let customers = store
            .list(&CityFilter::Cities(BTreeSet::new()))
            .await
            .unwrap();

        assert!(customers.is_empty());
        assert!(issued_sql(store).is_empty());
    }

    #[tokio::test]
    async fn test_soft_delete_only_sets_the_flag() {
        let deleted = customer::Model {
            is_deleted: true,
            ..row(3, "Galle")
        };
        let store = store(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![row(3, "Galle")], vec![deleted]]),
        );

        store.soft_delete(3).await.unwrap();

        let sql = issued_sql(store);
        assert_eq!(sql.len(), 2);
        assert!(sql[0].starts_with("SELECT"), "{}", sql[0]);
        assert!(sql[0].contains(r#""customers"."is_deleted" = "#), "{}", sql[0]);
        assert!(
            sql[1].starts_with(r#"UPDATE "customers" SET "is_deleted" = $1 WHERE"#),
            "{}",
            sql[1]
        );
    }

    #[tokio::test]
    async fn test_missing_rows_are_not_found() {
        let store = store(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
                Vec::<customer::Model>::new(),
                Vec::<customer::Model>::new(),
            ]),
        );

        assert!(matches!(store.soft_delete(9).await, Err(AppError::NotFound)));
        assert!(matches!(
            store.update(9, draft("gone@example.com")).await,
            Err(AppError::NotFound)
        ));

        // No write is attempted after a failed lookup
        let sql = issued_sql(store);
        assert_eq!(sql.len(), 2);
        assert!(sql.iter().all(|s| s.starts_with("SELECT")));
    }

    #[tokio::test]
    async fn test_create_inserts_and_returns_row() {
        let stored = customer::Model {
            title: "Dr".to_string(),
            customer_category: "International".to_string(),
            email: "ashan@example.com".to_string(),
            ..row(7, "Galle")
        };
        let store = store(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![stored]]),
        );

        let customer = store.create(draft("ashan@example.com")).await.unwrap();
        assert_eq!(customer.id, 7);
        assert_eq!(customer.customer_category, CustomerCategory::International);

        let sql = issued_sql(store);
        assert!(sql[0].starts_with(r#"INSERT INTO "customers""#), "{}", sql[0]);
    }

    #[tokio::test]
    async fn test_other_write_errors_stay_database_errors() {
        let store = store(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([DbErr::Custom("connection reset".to_string())]),
        );

        let err = store.create(draft("any@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Database(_)));
    }

    #[test]
    fn test_unique_violation_is_email_field_error() {
        let err = classify_write_err(
            Some(SqlErr::UniqueConstraintViolation(
                "duplicate key value violates unique constraint".to_string(),
            )),
            DbErr::Custom("duplicate".to_string()),
        );

        assert_eq!(
            err.field_errors().unwrap()["email"],
            vec![MSG_EMAIL_TAKEN.to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_stored_choice_is_internal_error() {
        let corrupt = customer::Model {
            title: "Sir".to_string(),
            ..row(5, "Colombo")
        };
        let store = store(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([vec![corrupt]]),
        );

        assert!(matches!(store.find_by_id(5).await, Err(AppError::Internal(_))));
    }
}
