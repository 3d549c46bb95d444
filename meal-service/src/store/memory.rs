use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common_security::TenantScope;

use super::{RecordStore, StoreError, StoreResult};
use crate::ids::RecordId;
use crate::models::{
    MealPlan, MealPlanDetails, NewUserRecord, Student, StudentChanges, StudentFields, UserChanges,
    UserRecord,
};

#[derive(Default)]
struct Tables {
    users: Vec<UserRecord>,
    students: Vec<Student>,
    meal_plans: Vec<MealPlan>,
}

/// Thread-safe in-process store with the same semantics as [`super::PgStore`].
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Tables>>,
}

fn apply<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_count(&self) -> usize {
        self.inner.read().expect("rwlock poisoned").users.len()
    }

    pub fn meal_plan_count(&self) -> usize {
        self.inner.read().expect("rwlock poisoned").meal_plans.len()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<UserRecord>> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_users(&self, scope: &TenantScope) -> StoreResult<Vec<UserRecord>> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard
            .users
            .iter()
            .filter(|u| scope.permits(&u.kompania))
            .cloned()
            .collect())
    }

    async fn insert_user(&self, user: NewUserRecord) -> StoreResult<RecordId> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        if guard.users.iter().any(|u| u.email == user.email) {
            return Err(StoreError::Duplicate("email"));
        }
        let id = RecordId::generate();
        guard.users.push(UserRecord {
            id,
            name: user.name,
            surname: user.surname,
            email: user.email,
            password_hash: user.password_hash,
            permission: user.permission,
            kompania: user.kompania,
        });
        Ok(id)
    }

    async fn update_user(&self, id: RecordId, changes: UserChanges) -> StoreResult<bool> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        if let Some(email) = &changes.email {
            if guard.users.iter().any(|u| u.id != id && &u.email == email) {
                return Err(StoreError::Duplicate("email"));
            }
        }
        let Some(user) = guard.users.iter_mut().find(|u| u.id == id) else {
            return Ok(false);
        };
        apply(&mut user.name, changes.name);
        apply(&mut user.surname, changes.surname);
        apply(&mut user.email, changes.email);
        apply(&mut user.password_hash, changes.password_hash);
        apply(&mut user.permission, changes.permission);
        apply(&mut user.kompania, changes.kompania);
        Ok(true)
    }

    async fn delete_user(&self, id: RecordId) -> StoreResult<bool> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        let before = guard.users.len();
        guard.users.retain(|u| u.id != id);
        Ok(guard.users.len() != before)
    }

    async fn list_students(&self, scope: &TenantScope) -> StoreResult<Vec<Student>> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard
            .students
            .iter()
            .filter(|s| scope.permits(&s.kompania))
            .cloned()
            .collect())
    }

    async fn find_student(&self, id: RecordId) -> StoreResult<Option<Student>> {
        let guard = self.inner.read().expect("rwlock poisoned");
        Ok(guard.students.iter().find(|s| s.id == id).cloned())
    }

    async fn insert_student(&self, student: StudentFields) -> StoreResult<RecordId> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        let id = RecordId::generate();
        guard.students.push(student.into_student(id));
        Ok(id)
    }

    async fn update_student(&self, id: RecordId, changes: StudentChanges) -> StoreResult<bool> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        let Some(student) = guard.students.iter_mut().find(|s| s.id == id) else {
            return Ok(false);
        };
        apply(&mut student.name, changes.name);
        apply(&mut student.surname, changes.surname);
        apply(&mut student.card_type, changes.card_type);
        apply(&mut student.card_id, changes.card_id);
        apply(&mut student.qr_code, changes.qr_code);
        apply(&mut student.status, changes.status);
        apply(&mut student.kompania, changes.kompania);
        Ok(true)
    }

    async fn delete_student(&self, id: RecordId) -> StoreResult<bool> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        let before = guard.students.len();
        guard.students.retain(|s| s.id != id);
        Ok(guard.students.len() != before)
    }

    async fn insert_meal_plan(&self, plan: &MealPlan) -> StoreResult<()> {
        let mut guard = self.inner.write().expect("rwlock poisoned");
        guard.meal_plans.push(plan.clone());
        Ok(())
    }

    async fn list_meal_plans(
        &self,
        scope: &TenantScope,
        student_id: Option<RecordId>,
    ) -> StoreResult<Vec<MealPlanDetails>> {
        let guard = self.inner.read().expect("rwlock poisoned");
        let details = guard
            .meal_plans
            .iter()
            .filter(|plan| student_id.map_or(true, |id| plan.student_id == id))
            .filter_map(|plan| {
                let student = guard.students.iter().find(|s| s.id == plan.student_id)?;
                scope.permits(&student.kompania).then(|| MealPlanDetails {
                    plan: plan.clone(),
                    student_details: student.clone(),
                })
            })
            .collect();
        Ok(details)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn student(tenant: &str) -> StudentFields {
        StudentFields {
            name: "A".into(),
            surname: "B".into(),
            card_type: "X".into(),
            card_id: "1".into(),
            qr_code: "q".into(),
            status: "active".into(),
            kompania: tenant.into(),
        }
    }

    fn plan_for(student_id: RecordId) -> MealPlan {
        MealPlan {
            id: RecordId::generate(),
            student_id,
            date: "2024-05-01".into(),
            meal_type: "lunch".into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn meal_plans_are_scoped_through_student_tenant() {
        let store = MemoryStore::new();
        let s1 = store.insert_student(student("T1")).await.unwrap();
        let s2 = store.insert_student(student("T2")).await.unwrap();
        store.insert_meal_plan(&plan_for(s1)).await.unwrap();
        store.insert_meal_plan(&plan_for(s2)).await.unwrap();

        let t1 = store
            .list_meal_plans(&TenantScope::Tenant("T1".into()), None)
            .await
            .unwrap();
        assert_eq!(t1.len(), 1);
        assert_eq!(t1[0].student_details.kompania, "T1");

        let all = store.list_meal_plans(&TenantScope::AllTenants, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn orphaned_plans_are_not_listed() {
        let store = MemoryStore::new();
        let s1 = store.insert_student(student("T1")).await.unwrap();
        store.insert_meal_plan(&plan_for(s1)).await.unwrap();
        assert!(store.delete_student(s1).await.unwrap());

        let all = store.list_meal_plans(&TenantScope::AllTenants, None).await.unwrap();
        assert!(all.is_empty());
        assert_eq!(store.meal_plan_count(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let store = MemoryStore::new();
        let user = NewUserRecord {
            name: "Ana".into(),
            surname: "K".into(),
            email: "ana@example.com".into(),
            password_hash: "$argon2id$stub".into(),
            permission: String::new(),
            kompania: "T1".into(),
        };
        store.insert_user(user.clone()).await.unwrap();
        let err = store.insert_user(user).await.unwrap_err();
        assert!(matches!(err, StoreError::Duplicate("email")));
    }

    #[tokio::test]
    async fn update_and_delete_report_matches() {
        let store = MemoryStore::new();
        let id = store.insert_student(student("T1")).await.unwrap();
        let changes = StudentChanges { status: Some("inactive".into()), ..Default::default() };
        assert!(store.update_student(id, changes).await.unwrap());
        assert_eq!(store.find_student(id).await.unwrap().unwrap().status, "inactive");

        let absent = RecordId::generate();
        assert!(!store.update_student(absent, StudentChanges::default()).await.unwrap());
        assert!(!store.delete_student(absent).await.unwrap());
    }
}
