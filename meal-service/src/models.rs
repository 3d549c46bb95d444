//! Stored record types and their client-facing views.
//!
//! Serialized names follow the JSON contract existing clients already use
//! (`kompania`, `cardID`, `QRCode`, `studentID`, ...).

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::ids::RecordId;

/// User row as persisted, including the password hash. Never serialized.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: RecordId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub permission: String,
    pub kompania: String,
}

/// User as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct User {
    pub id: RecordId,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub permission: String,
    pub kompania: String,
}

impl From<UserRecord> for User {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            surname: record.surname,
            email: record.email,
            permission: record.permission,
            kompania: record.kompania,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUserRecord {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password_hash: String,
    pub permission: String,
    pub kompania: String,
}

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub permission: Option<String>,
    pub kompania: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Student {
    pub id: RecordId,
    pub name: String,
    pub surname: String,
    #[serde(rename = "cardType")]
    pub card_type: String,
    #[serde(rename = "cardID")]
    pub card_id: String,
    #[serde(rename = "QRCode")]
    pub qr_code: String,
    pub status: String,
    pub kompania: String,
}

#[derive(Debug, Clone)]
pub struct StudentFields {
    pub name: String,
    pub surname: String,
    pub card_type: String,
    pub card_id: String,
    pub qr_code: String,
    pub status: String,
    pub kompania: String,
}

impl StudentFields {
    pub fn into_student(self, id: RecordId) -> Student {
        Student {
            id,
            name: self.name,
            surname: self.surname,
            card_type: self.card_type,
            card_id: self.card_id,
            qr_code: self.qr_code,
            status: self.status,
            kompania: self.kompania,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub surname: Option<String>,
    pub card_type: Option<String>,
    pub card_id: Option<String>,
    pub qr_code: Option<String>,
    pub status: Option<String>,
    pub kompania: Option<String>,
}

/// Meal plan as persisted. Carries no tenant of its own; visibility follows
/// the referenced student.
#[derive(Debug, Clone, Serialize)]
pub struct MealPlan {
    pub id: RecordId,
    #[serde(rename = "studentID")]
    pub student_id: RecordId,
    pub date: String,
    #[serde(rename = "mealType")]
    pub meal_type: String,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

/// Meal plan joined with its student.
#[derive(Debug, Clone, Serialize)]
pub struct MealPlanDetails {
    #[serde(flatten)]
    pub plan: MealPlan,
    #[serde(rename = "studentDetails")]
    pub student_details: Student,
}
