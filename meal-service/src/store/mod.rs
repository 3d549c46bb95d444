//! Persistence seam. Handlers only see [`RecordStore`]; Postgres backs it in
//! production and the `test-helpers` in-memory store backs it in tests.

#[cfg(any(test, feature = "test-helpers"))]
mod memory;
mod postgres;

#[cfg(any(test, feature = "test-helpers"))]
pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use common_http_errors::ApiError;
use common_security::TenantScope;
use thiserror::Error;

use crate::ids::RecordId;
use crate::models::{
    MealPlan, MealPlanDetails, NewUserRecord, Student, StudentChanges, StudentFields, UserChanges,
    UserRecord,
};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("duplicate value for unique field '{0}'")]
    Duplicate(&'static str),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Every method is a single store round trip. Update and delete return
/// whether a record matched the id.
#[async_trait]
pub trait RecordStore: Send + Sync + 'static {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>>;
    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<UserRecord>>;
    async fn insert_user(&self, user: NewUserRecord) -> StoreResult<RecordId>;
    async fn update_user(&self, id: RecordId, changes: UserChanges) -> StoreResult<bool>;
    async fn delete_user(&self, id: RecordId) -> StoreResult<bool>;

    async fn list_students(&self, scope: &TenantScope) -> StoreResult<Vec<Student>>;
    async fn find_student(&self, id: RecordId) -> StoreResult<Option<Student>>;
    async fn insert_student(&self, student: StudentFields) -> StoreResult<RecordId>;
    async fn update_student(&self, id: RecordId, changes: StudentChanges) -> StoreResult<bool>;
    async fn delete_student(&self, id: RecordId) -> StoreResult<bool>;

    async fn insert_meal_plan(&self, plan: &MealPlan) -> StoreResult<()>;
    /// Meal plans joined with their student, filtered on the student's tenant.
    /// Plans whose student no longer exists are omitted.
    async fn list_meal_plans(
        &self,
        scope: &TenantScope,
        student_id: Option<RecordId>,
    ) -> StoreResult<Vec<MealPlanDetails>>;
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(field) => ApiError::conflict(
                "duplicate_value",
                format!("A record with this {field} already exists"),
            ),
            other => ApiError::internal(other, None),
        }
    }
}
