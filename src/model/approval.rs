use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Which request kind an approval row refers to. One approvals table serves
/// all three; `reference_id` points at the source row.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalKind {
    Leave,
    MissPunch,
    Overtime,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    ToSchema,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Pending,
    Approved,
    Rejected,
}

/// Approval levels: 1 = manager, 2 = HR, 3 = department head.
pub const LEVEL_MANAGER: i32 = 1;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct Approval {
    pub id: String,
    pub employee_id: String,
    pub approver_id: String,
    /// leave | miss_punch | overtime
    pub kind: String,
    pub reference_id: String,
    #[schema(example = 1)]
    pub level: i32,
    /// pending | approved | rejected
    #[schema(example = "pending")]
    pub status: String,
    pub comments: Option<String>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub created_at: Option<DateTime<Utc>>,
    #[schema(value_type = Option<String>, format = "date-time")]
    pub updated_at: Option<DateTime<Utc>>,
}
