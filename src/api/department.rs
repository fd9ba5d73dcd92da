use crate::{auth::auth::AuthUser, model::department::Department};
use actix_web::{HttpResponse, Responder, web};
use serde::Deserialize;
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateDepartment {
    #[schema(example = "Engineering")]
    pub name: String,
}

/// Create department
#[utoipa::path(
    post,
    path = "/api/v1/departments",
    request_body = CreateDepartment,
    responses(
        (status = 201, description = "Department created"),
        (status = 400, description = "Invalid payload"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn create_department(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateDepartment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "Name is required"
        })));
    }

    let id = Uuid::new_v4().to_string();

    sqlx::query("INSERT INTO departments (id, name) VALUES (?, ?)")
        .bind(&id)
        .bind(payload.name.trim())
        .execute(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to create department");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Department created",
        "id": id
    })))
}

/// List departments
#[utoipa::path(
    get,
    path = "/api/v1/departments",
    responses(
        (status = 200, description = "All departments", body = [Department]),
        (status = 401)
    ),
    security(("bearer_auth" = [])),
    tag = "Employee"
)]
pub async fn list_departments(
    _auth: AuthUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let departments =
        sqlx::query_as::<_, Department>("SELECT id, name FROM departments ORDER BY name")
            .fetch_all(pool.get_ref())
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to fetch departments");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;

    Ok(HttpResponse::Ok().json(departments))
}
