use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveType {
    pub id: String,
    #[schema(example = "Annual Leave")]
    pub name: String,
    #[schema(example = 20)]
    pub max_days_per_year: i32,
    pub carry_forward: bool,
    #[schema(nullable = true, example = 5)]
    pub carry_forward_limit: Option<i32>,
}

/// Per-employee, per-leave-type, per-year balance row.
/// `remaining_days` is derived (allocated - used) on every write.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveAssignment {
    pub id: String,
    pub employee_id: String,
    pub leave_type_id: String,
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 20)]
    pub allocated_days: i32,
    #[schema(example = 5)]
    pub used_days: i32,
    #[schema(example = 15)]
    pub remaining_days: i32,
}

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct LeaveApplication {
    pub id: String,
    pub employee_id: String,
    pub leave_type_id: String,
    #[schema(value_type = String, format = "date")]
    pub from_date: NaiveDate,
    #[schema(value_type = String, format = "date")]
    pub to_date: NaiveDate,
    /// Inclusive day count of the range.
    #[schema(example = 3)]
    pub total_days: i32,
    /// pending | approved | rejected
    #[schema(example = "pending")]
    pub status: String,
    pub reason: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}
