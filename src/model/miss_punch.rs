use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PunchType {
    In,
    Out,
}

/// A correction request for a punch the employee forgot to record.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct MissPunchRequest {
    pub id: String,
    pub employee_id: String,
    #[schema(value_type = String, format = "date")]
    pub date: NaiveDate,
    /// in | out
    pub punch_type: String,
    #[schema(value_type = String, format = "date-time")]
    pub requested_time: NaiveDateTime,
    pub reason: String,
    /// pending | approved | rejected
    #[schema(example = "pending")]
    pub status: String,
}
