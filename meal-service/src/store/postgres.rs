use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common_security::TenantScope;
use sqlx::{FromRow, PgPool};
use tracing::info;
use uuid::Uuid;

use super::{RecordStore, StoreError, StoreResult};
use crate::ids::RecordId;
use crate::models::{
    MealPlan, MealPlanDetails, NewUserRecord, Student, StudentChanges, StudentFields, UserChanges,
    UserRecord,
};

/// Postgres-backed store. The pool is created once at startup and shared.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    surname: String,
    email: String,
    password_hash: String,
    permission: String,
    kompania: String,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            surname: row.surname,
            email: row.email,
            password_hash: row.password_hash,
            permission: row.permission,
            kompania: row.kompania,
        }
    }
}

#[derive(FromRow)]
struct StudentRow {
    id: Uuid,
    name: String,
    surname: String,
    card_type: String,
    card_id: String,
    qr_code: String,
    status: String,
    kompania: String,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Self {
            id: row.id.into(),
            name: row.name,
            surname: row.surname,
            card_type: row.card_type,
            card_id: row.card_id,
            qr_code: row.qr_code,
            status: row.status,
            kompania: row.kompania,
        }
    }
}

#[derive(FromRow)]
struct MealPlanRow {
    id: Uuid,
    student_id: Uuid,
    date: String,
    meal_type: String,
    created_at: DateTime<Utc>,
    student_name: String,
    student_surname: String,
    student_card_type: String,
    student_card_id: String,
    student_qr_code: String,
    student_status: String,
    student_kompania: String,
}

impl From<MealPlanRow> for MealPlanDetails {
    fn from(row: MealPlanRow) -> Self {
        Self {
            plan: MealPlan {
                id: row.id.into(),
                student_id: row.student_id.into(),
                date: row.date,
                meal_type: row.meal_type,
                created_at: row.created_at,
            },
            student_details: Student {
                id: row.student_id.into(),
                name: row.student_name,
                surname: row.student_surname,
                card_type: row.student_card_type,
                card_id: row.student_card_id,
                qr_code: row.student_qr_code,
                status: row.student_status,
                kompania: row.student_kompania,
            },
        }
    }
}

const USER_COLUMNS: &str = "id, name, surname, email, password_hash, permission, kompania";
const STUDENT_COLUMNS: &str = "id, name, surname, card_type, card_id, qr_code, status, kompania";

fn map_unique(err: sqlx::Error, field: &'static str) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Duplicate(field),
        _ => StoreError::Database(err),
    }
}

impl PgStore {
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded schema before serving traffic.
    pub async fn migrate(&self) -> StoreResult<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        info!("database schema up to date");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserRecord::from))
    }

    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<UserRecord>> {
        let rows = sqlx::query_as::<_, UserRow>(&format!(
            "SELECT {USER_COLUMNS} FROM users
             WHERE ($1::text IS NULL OR kompania = $1)
             ORDER BY created_at"
        ))
        .bind(scope.tenant())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(UserRecord::from).collect())
    }

    async fn insert_user(&self, user: NewUserRecord) -> StoreResult<RecordId> {
        let id = RecordId::generate();
        sqlx::query(
            "INSERT INTO users (id, name, surname, email, password_hash, permission, kompania)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(id.as_uuid())
        .bind(&user.name)
        .bind(&user.surname)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(&user.permission)
        .bind(&user.kompania)
        .execute(&self.pool)
        .await
        .map_err(|err| map_unique(err, "email"))?;
        Ok(id)
    }

    async fn update_user(&self, id: RecordId, changes: UserChanges) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE users
             SET name = COALESCE($2, name),
                 surname = COALESCE($3, surname),
                 email = COALESCE($4, email),
                 password_hash = COALESCE($5, password_hash),
                 permission = COALESCE($6, permission),
                 kompania = COALESCE($7, kompania)
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(changes.name)
        .bind(changes.surname)
        .bind(changes.email)
        .bind(changes.password_hash)
        .bind(changes.permission)
        .bind(changes.kompania)
        .execute(&self.pool)
        .await
        .map_err(|err| map_unique(err, "email"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_user(&self, id: RecordId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_students(&self, scope: &TenantScope) -> StoreResult<Vec<Student>> {
        let rows = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students
             WHERE ($1::text IS NULL OR kompania = $1)
             ORDER BY created_at"
        ))
        .bind(scope.tenant())
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Student::from).collect())
    }

    async fn find_student(&self, id: RecordId) -> StoreResult<Option<Student>> {
        let row = sqlx::query_as::<_, StudentRow>(&format!(
            "SELECT {STUDENT_COLUMNS} FROM students WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Student::from))
    }

    async fn insert_student(&self, student: StudentFields) -> StoreResult<RecordId> {
        let id = RecordId::generate();
        sqlx::query(
            "INSERT INTO students (id, name, surname, card_type, card_id, qr_code, status, kompania)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(id.as_uuid())
        .bind(&student.name)
        .bind(&student.surname)
        .bind(&student.card_type)
        .bind(&student.card_id)
        .bind(&student.qr_code)
        .bind(&student.status)
        .bind(&student.kompania)
        .execute(&self.pool)
        .await?;
        Ok(id)
    }

    async fn update_student(&self, id: RecordId, changes: StudentChanges) -> StoreResult<bool> {
        let result = sqlx::query(
            "UPDATE students
             SET name = COALESCE($2, name),
                 surname = COALESCE($3, surname),
                 card_type = COALESCE($4, card_type),
                 card_id = COALESCE($5, card_id),
                 qr_code = COALESCE($6, qr_code),
                 status = COALESCE($7, status),
                 kompania = COALESCE($8, kompania)
             WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(changes.name)
        .bind(changes.surname)
        .bind(changes.card_type)
        .bind(changes.card_id)
        .bind(changes.qr_code)
        .bind(changes.status)
        .bind(changes.kompania)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_student(&self, id: RecordId) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM students WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn insert_meal_plan(&self, plan: &MealPlan) -> StoreResult<()> {
        sqlx::query(
            "INSERT INTO meal_plans (id, student_id, date, meal_type, created_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(plan.id.as_uuid())
        .bind(plan.student_id.as_uuid())
        .bind(&plan.date)
        .bind(&plan.meal_type)
        .bind(plan.created_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn list_meal_plans(
        &self,
        scope: &TenantScope,
        student_id: Option<RecordId>,
    ) -> StoreResult<Vec<MealPlanDetails>> {
        let rows = sqlx::query_as::<_, MealPlanRow>(
            "SELECT m.id, m.student_id, m.date, m.meal_type, m.created_at,
                    s.name AS student_name,
                    s.surname AS student_surname,
                    s.card_type AS student_card_type,
                    s.card_id AS student_card_id,
                    s.qr_code AS student_qr_code,
                    s.status AS student_status,
                    s.kompania AS student_kompania
             FROM meal_plans m
             JOIN students s ON s.id = m.student_id
             WHERE ($1::text IS NULL OR s.kompania = $1)
               AND ($2::uuid IS NULL OR m.student_id = $2)
             ORDER BY m.created_at",
        )
        .bind(scope.tenant())
        .bind(student_id.map(|id| id.as_uuid()))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(MealPlanDetails::from).collect())
    }
}
