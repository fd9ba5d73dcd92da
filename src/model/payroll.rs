use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Monthly pay record. `net_salary` is derived server-side from the other
/// columns and recomputed on every update.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct PayrollRecord {
    pub id: String,
    pub employee_id: String,
    #[schema(example = 3)]
    pub month: i32,
    #[schema(example = 2024)]
    pub year: i32,
    pub basic_salary: f64,
    pub working_days: i32,
    pub present_days: i32,
    pub overtime_hours: f64,
    pub overtime_amount: f64,
    pub pf_deduction: f64,
    pub lwp_deduction: f64,
    pub net_salary: f64,
}
