use crate::api::leave_application::resolve_approver;
use crate::auth::auth::AuthUser;
use crate::model::approval::{ApprovalKind, ApprovalStatus, LEVEL_MANAGER};
use crate::model::miss_punch::{MissPunchRequest, PunchType};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateMissPunch {
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub punch_type: PunchType,
    #[schema(example = "2024-03-01T09:00:00", format = "date-time", value_type = String)]
    pub requested_time: NaiveDateTime,
    #[schema(example = "Forgot to punch in after client meeting")]
    pub reason: String,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct MissPunchFilter {
    pub employee_id: Option<String>,
    #[schema(example = "pending")]
    pub status: Option<String>,
}

/// Submit a miss-punch correction request
///
/// The request and its level-1 approval are created in one transaction.
#[utoipa::path(
    post,
    path = "/api/v1/miss-punch",
    request_body = CreateMissPunch,
    responses(
        (status = 201, description = "Request submitted", body = Object, example = json!({
            "message": "Miss-punch request submitted",
            "status": "pending"
        })),
        (status = 400, description = "Requested time does not fall on the given date"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "MissPunch"
)]
pub async fn create_miss_punch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateMissPunch>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    if payload.requested_time.date() != payload.date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "requested_time must fall on date"
        })));
    }

    if payload.reason.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Reason is required"
        })));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let approver_id = resolve_approver(&mut tx, &employee_id).await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Approver lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let request_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO miss_punch_requests
        (id, employee_id, date, punch_type, requested_time, reason, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&request_id)
    .bind(&employee_id)
    .bind(payload.date)
    .bind(payload.punch_type.to_string())
    .bind(payload.requested_time)
    .bind(payload.reason.trim())
    .bind(ApprovalStatus::Pending.to_string())
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create miss-punch request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    sqlx::query(
        r#"
        INSERT INTO approvals
        (id, employee_id, approver_id, kind, reference_id, level, status)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(&employee_id)
    .bind(&approver_id)
    .bind(ApprovalKind::MissPunch.to_string())
    .bind(&request_id)
    .bind(LEVEL_MANAGER)
    .bind(ApprovalStatus::Pending.to_string())
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create approval");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit miss-punch request");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Miss-punch request submitted",
        "id": request_id,
        "status": "pending"
    })))
}

/// List miss-punch requests
#[utoipa::path(
    get,
    path = "/api/v1/miss-punch",
    params(MissPunchFilter),
    responses(
        (status = 200, description = "Requests", body = [MissPunchRequest]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "MissPunch"
)]
pub async fn list_miss_punch(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<MissPunchFilter>,
) -> actix_web::Result<impl Responder> {
    // Employees see only their own requests; HR may filter freely.
    let employee_id = match query.employee_id.clone() {
        Some(id) => {
            if auth.require_hr_or_admin().is_err() && auth.employee_id()? != id {
                return Err(actix_web::error::ErrorForbidden("Not your requests"));
            }
            id
        }
        None => auth.employee_id()?,
    };

    let mut sql = String::from(
        r#"
        SELECT id, employee_id, date, punch_type, requested_time, reason, status
        FROM miss_punch_requests
        WHERE employee_id = ?
        "#,
    );
    if query.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    sql.push_str(" ORDER BY date DESC");

    let mut q = sqlx::query_as::<_, MissPunchRequest>(&sql).bind(&employee_id);
    if let Some(status) = query.status.as_deref() {
        q = q.bind(status);
    }

    let requests = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch miss-punch requests");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(requests))
}
