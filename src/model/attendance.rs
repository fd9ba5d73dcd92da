use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One work session. A day may hold several closed sessions, but at most one
/// open one (punch_in set, punch_out NULL) per employee.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceRecord {
    pub id: String,
    pub employee_id: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub punch_in: Option<NaiveDateTime>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub punch_out: Option<NaiveDateTime>,
    pub working_hours: Option<f64>,
    pub overtime_hours: Option<f64>,
    /// present | absent | on_leave
    pub status: String,
    pub punch_in_latitude: Option<f64>,
    pub punch_in_longitude: Option<f64>,
    pub punch_out_latitude: Option<f64>,
    pub punch_out_longitude: Option<f64>,
}

#[derive(
    Debug, Clone, Copy, Serialize, Deserialize, strum::Display, strum::EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Absent,
    OnLeave,
}
