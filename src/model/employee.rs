use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": "0e9c9346-3c9d-4e2b-9a55-0b6f7f6f3a10",
        "employee_code": "EMP-001",
        "first_name": "John",
        "last_name": "Doe",
        "email": "john.doe@company.com",
        "phone": "+8801712345678",
        "department_id": "f6a3b7a2-3d53-41f8-8d25-1c9a4a1a9f01",
        "designation": "Field Engineer",
        "salary": 42000.0,
        "join_date": "2024-01-01",
        "manager_id": null,
        "status": "active"
    })
)]
pub struct Employee {
    pub id: String,

    #[schema(example = "EMP-001")]
    pub employee_code: String,

    #[schema(example = "John")]
    pub first_name: String,

    #[schema(example = "Doe")]
    pub last_name: String,

    #[schema(example = "john.doe@company.com")]
    pub email: String,

    #[schema(example = "+8801712345678", nullable = true)]
    pub phone: Option<String>,

    #[schema(nullable = true)]
    pub department_id: Option<String>,

    #[schema(example = "Field Engineer")]
    pub designation: String,

    #[schema(example = 42000.0)]
    pub salary: f64,

    #[schema(example = "2024-01-01", value_type = String, format = "date")]
    pub join_date: NaiveDate,

    /// Approver for this employee's leave and miss-punch requests.
    #[schema(nullable = true)]
    pub manager_id: Option<String>,

    /// "active" or "inactive"; employees are deactivated, never deleted.
    #[schema(example = "active")]
    pub status: String,
}
