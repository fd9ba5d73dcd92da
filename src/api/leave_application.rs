use crate::auth::auth::AuthUser;
use crate::domain::leave;
use crate::model::approval::{ApprovalKind, ApprovalStatus, LEVEL_MANAGER};
use crate::model::leave::LeaveApplication;
use actix_web::{HttpResponse, Responder, web};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateLeaveApplication {
    pub leave_type_id: String,
    #[schema(example = "2024-03-01", format = "date", value_type = String)]
    pub from_date: NaiveDate,
    #[schema(example = "2024-03-03", format = "date", value_type = String)]
    pub to_date: NaiveDate,
    pub reason: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct LeaveApplicationFilter {
    /// Filter by employee ID
    pub employee_id: Option<String>,
    #[schema(example = "pending")]
    /// Filter by status
    pub status: Option<String>,
    /// Pagination page number (1-based)
    pub page: Option<u64>,
    /// Items per page
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct LeaveApplicationListResponse {
    pub data: Vec<LeaveApplication>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Resolves who signs off level-1 requests for this employee: the manager
/// when one is set, otherwise the employee themselves.
pub(crate) async fn resolve_approver(
    tx: &mut sqlx::MySqlConnection,
    employee_id: &str,
) -> Result<String, sqlx::Error> {
    let manager: Option<(Option<String>,)> =
        sqlx::query_as("SELECT manager_id FROM employees WHERE id = ?")
            .bind(employee_id)
            .fetch_optional(tx)
            .await?;

    Ok(manager
        .and_then(|(m,)| m)
        .unwrap_or_else(|| employee_id.to_string()))
}

/* =========================
Create leave application
========================= */
/// Submit a leave application
///
/// Total days are counted inclusively over the range. The application and
/// its level-1 approval row are created in one transaction; a request that
/// exceeds the year's remaining balance is rejected up front.
#[utoipa::path(
    post,
    path = "/api/v1/leave-applications",
    request_body(
        content = CreateLeaveApplication,
        description = "Leave application payload",
        content_type = "application/json"
    ),
    responses(
        (status = 201, description = "Leave application submitted",
         body = Object,
         example = json!({
            "message": "Leave application submitted",
            "total_days": 3,
            "status": "pending"
         })
        ),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_leave_application(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateLeaveApplication>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;

    if payload.from_date > payload.to_date {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "from_date cannot be after to_date"
        })));
    }

    let total_days = leave::inclusive_days(payload.from_date, payload.to_date) as i32;
    let year = payload.from_date.year();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Balance pre-check against this year's assignment, when one exists.
    let remaining: Option<(i32,)> = sqlx::query_as(
        r#"
        SELECT remaining_days
        FROM employee_leave_assignments
        WHERE employee_id = ? AND leave_type_id = ? AND year = ?
        "#,
    )
    .bind(&employee_id)
    .bind(&payload.leave_type_id)
    .bind(year)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Balance lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Some((remaining_days,)) = remaining {
        if total_days > remaining_days {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Insufficient leave balance",
                "requested_days": total_days,
                "remaining_days": remaining_days
            })));
        }
    }

    let approver_id = resolve_approver(&mut tx, &employee_id).await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Approver lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let application_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO leave_applications
        (id, employee_id, leave_type_id, from_date, to_date, total_days, status, reason)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&application_id)
    .bind(&employee_id)
    .bind(&payload.leave_type_id)
    .bind(payload.from_date)
    .bind(payload.to_date)
    .bind(total_days)
    .bind(ApprovalStatus::Pending.to_string())
    .bind(&payload.reason)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create leave application");
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
    .bind(ApprovalKind::Leave.to_string())
    .bind(&application_id)
    .bind(LEVEL_MANAGER)
    .bind(ApprovalStatus::Pending.to_string())
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to create approval");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit leave application");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Leave application submitted",
        "id": application_id,
        "total_days": total_days,
        "status": "pending"
    })))
}

/// Get a leave application
#[utoipa::path(
    get,
    path = "/api/v1/leave-applications/{application_id}",
    params(("application_id", Path, description = "Leave application ID")),
    responses(
        (status = 200, description = "Leave application found", body = LeaveApplication),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Leave application not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn get_leave_application(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let application_id = path.into_inner();

    let application = sqlx::query_as::<_, LeaveApplication>(
        r#"
        SELECT id, employee_id, leave_type_id, from_date, to_date, total_days,
               status, reason, created_at, updated_at
        FROM leave_applications
        WHERE id = ?
        "#,
    )
    .bind(&application_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, application_id, "Failed to fetch leave application");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let application = match application {
        Some(a) => a,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Leave application not found"
            })));
        }
    };

    // Employees only see their own applications.
    if auth.require_approver().is_err() && auth.employee_id()? != application.employee_id {
        return Err(actix_web::error::ErrorForbidden("Not your application"));
    }

    Ok(HttpResponse::Ok().json(application))
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
}

/// List leave applications
#[utoipa::path(
    get,
    path = "/api/v1/leave-applications",
    params(LeaveApplicationFilter),
    responses(
        (status = 200, description = "Paginated application list", body = LeaveApplicationListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_leave_applications(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<LeaveApplicationFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(emp_id) = query.employee_id.as_deref() {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::Str(emp_id));
    }
    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }

    let count_sql = format!("SELECT COUNT(*) FROM leave_applications{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count leave applications");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, leave_type_id, from_date, to_date, total_days,
               status, reason, created_at, updated_at
        FROM leave_applications
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, LeaveApplication>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let applications = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch leave applications");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(LeaveApplicationListResponse {
        data: applications,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
