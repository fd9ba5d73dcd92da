use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString, ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VisitStatus {
    InProgress,
    Completed,
}

/// A GPS-tracked client visit by a field employee. Addresses are
/// caller-supplied; reverse-geocoding happens outside this service.
#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct FieldWorkVisit {
    pub id: String,
    pub employee_id: String,
    pub client_name: String,
    pub purpose: String,
    #[schema(value_type = String, format = "date-time")]
    pub start_time: NaiveDateTime,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub end_time: Option<NaiveDateTime>,
    pub start_latitude: f64,
    pub start_longitude: f64,
    pub end_latitude: Option<f64>,
    pub end_longitude: Option<f64>,
    pub start_address: Option<String>,
    pub end_address: Option<String>,
    pub distance_km: Option<f64>,
    /// in_progress | completed
    pub status: String,
}
