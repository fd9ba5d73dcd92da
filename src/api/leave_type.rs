use crate::{auth::auth::AuthUser, model::leave::LeaveType};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveType {
    #[schema(example = "Annual Leave")]
    pub name: String,
    #[schema(example = 20)]
    pub max_days_per_year: i32,
    #[serde(default)]
    pub carry_forward: bool,
    #[schema(example = 5)]
    pub carry_forward_limit: Option<i32>,
}

/// Create leave type
#[utoipa::path(
    post,
    path = "/api/v1/leave-types",
    request_body = CreateLeaveType,
    responses(
        (status = 201, description = "Leave type created"),
        (status = 400, description = "Invalid payload"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave_type(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveType>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.name.trim().is_empty() || payload.max_days_per_year < 0 {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Name is required and max days must be non-negative"
        })));
    }

    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO leave_types (id, name, max_days_per_year, carry_forward, carry_forward_limit)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(payload.name.trim())
    .bind(payload.max_days_per_year)
    .bind(payload.carry_forward)
    .bind(payload.carry_forward_limit)
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to create leave type");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Leave type created",
        "id": id
    })))
}

/// List leave types
#[utoipa::path(
    get,
    path = "/api/v1/leave-types",
    responses(
        (status = 200, description = "All leave types", body = [LeaveType]),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave_types(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let types = sqlx::query_as::<_, LeaveType>(
        r#"
        SELECT id, name, max_days_per_year, carry_forward, carry_forward_limit
        FROM leave_types
        ORDER BY name
        "#,
    )
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch leave types");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(types))
}
