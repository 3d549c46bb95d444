use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, SubsecRound, Utc};
use common_http_errors::{ApiError, ApiResult};
use common_security::{SecurityCtxExtractor, TenantScope};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::extract::{require, Validate, ValidatedJson};
use crate::ids::RecordId;
use crate::models::{MealPlan, MealPlanDetails};
use crate::student_handlers::student_not_found;
use crate::AppState;

#[derive(Deserialize)]
pub struct CreateMealPlanRequest {
    #[serde(rename = "studentID")]
    pub student_id: String,
    pub date: String,
    #[serde(rename = "mealType")]
    pub meal_type: String,
}

impl Validate for CreateMealPlanRequest {
    fn validate(&self) -> ApiResult<()> {
        require("studentID", &self.student_id)?;
        require("date", &self.date)?;
        require("mealType", &self.meal_type)
    }
}

/// Created plan echoed with the student's name and tenant. Those fields are
/// read at creation time and not stored on the plan.
#[derive(Debug, Serialize)]
pub struct CreatedMealPlan {
    pub id: RecordId,
    #[serde(rename = "studentID")]
    pub student_id: RecordId,
    pub date: String,
    #[serde(rename = "mealType")]
    pub meal_type: String,
    pub name: String,
    pub surname: String,
    pub kompania: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Current time at the store's microsecond precision, so the echoed
/// `createdAt` matches what later listings return.
fn creation_time() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub async fn create_meal_plan(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    ValidatedJson(body): ValidatedJson<CreateMealPlanRequest>,
) -> ApiResult<Json<CreatedMealPlan>> {
    let student_id = RecordId::from_param("studentID", &body.student_id)?;
    let scope = TenantScope::for_context(&ctx);

    let student = state
        .store
        .find_student(student_id)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    // A student outside the caller's scope is reported exactly like a missing one.
    let student = match student {
        Some(student) if scope.permits(&student.kompania) => student,
        _ => {
            warn!(student_id = %student_id, tenant = %ctx.tenant, "Meal plan for unknown student");
            return Err(student_not_found().with_trace_id(ctx.trace_id));
        }
    };

    let plan = MealPlan {
        id: RecordId::generate(),
        student_id,
        date: body.date,
        meal_type: body.meal_type,
        created_at: creation_time(),
    };
    state
        .store
        .insert_meal_plan(&plan)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;

    info!(meal_plan_id = %plan.id, student_id = %student_id, "Meal plan created");
    Ok(Json(CreatedMealPlan {
        id: plan.id,
        student_id,
        date: plan.date,
        meal_type: plan.meal_type,
        name: student.name,
        surname: student.surname,
        kompania: student.kompania,
        created_at: plan.created_at,
    }))
}

pub async fn list_meal_plans(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
) -> ApiResult<Json<Vec<MealPlanDetails>>> {
    let scope = TenantScope::for_context(&ctx);
    let plans = state
        .store
        .list_meal_plans(&scope, None)
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;
    Ok(Json(plans))
}

pub async fn list_student_meal_plans(
    State(state): State<AppState>,
    SecurityCtxExtractor(ctx): SecurityCtxExtractor,
    Path(raw_id): Path<String>,
) -> ApiResult<Json<Vec<MealPlanDetails>>> {
    let student_id = RecordId::from_param("studentID", &raw_id)?;
    let scope = TenantScope::for_context(&ctx);
    let plans = state
        .store
        .list_meal_plans(&scope, Some(student_id))
        .await
        .map_err(|err| ApiError::from(err).with_trace_id(ctx.trace_id))?;
    Ok(Json(plans))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;

    #[test]
    fn creation_time_has_microsecond_precision() {
        let created = creation_time();
        assert_eq!(created.nanosecond() % 1_000, 0);
    }
}
