use crate::auth::auth::AuthUser;
use crate::domain::payroll;
use crate::model::payroll::PayrollRecord;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct GeneratePayroll {
    pub employee_id: String,
    #[schema(example = 3, minimum = 1, maximum = 12)]
    pub month: u32,
    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdatePayroll {
    pub present_days: Option<i32>,
    pub overtime_hours: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct PayrollFilter {
    pub employee_id: Option<String>,
    #[schema(example = 3)]
    pub month: Option<i32>,
    #[schema(example = 2024)]
    pub year: Option<i32>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct PayrollListResponse {
    pub data: Vec<PayrollRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// Generate a monthly payroll record
///
/// Present days and overtime are aggregated from attendance for the month,
/// then the breakdown is derived. One record per employee per month.
#[utoipa::path(
    post,
    path = "/api/v1/payroll/generate",
    request_body = GeneratePayroll,
    responses(
        (status = 201, description = "Payroll generated", body = PayrollRecord),
        (status = 400, description = "Invalid month"),
        (status = 404, description = "Employee not found"),
        (status = 409, description = "Payroll already exists for this month"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn generate_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<GeneratePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if !(1..=12).contains(&payload.month) {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "month must be between 1 and 12"
        })));
    }

    let month_start = match NaiveDate::from_ymd_opt(payload.year, payload.month, 1) {
        Some(d) => d,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid month/year"
            })));
        }
    };
    let next_month = if payload.month == 12 {
        NaiveDate::from_ymd_opt(payload.year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(payload.year, payload.month + 1, 1)
    };
    let month_end = match next_month {
        Some(d) => d,
        None => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": "Invalid month/year"
            })));
        }
    };

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let salary: Option<(f64,)> = sqlx::query_as("SELECT salary FROM employees WHERE id = ?")
        .bind(&payload.employee_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Employee lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    let basic_salary = match salary {
        Some((s,)) => s,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Employee not found"
            })));
        }
    };

    let duplicate: bool = sqlx::query_scalar(
        r#"
        SELECT EXISTS(
            SELECT 1 FROM payroll_records
            WHERE employee_id = ? AND month = ? AND year = ?
            LIMIT 1
        )
        "#,
    )
    .bind(&payload.employee_id)
    .bind(payload.month)
    .bind(payload.year)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Payroll lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if duplicate {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Payroll already exists for this employee and month"
        })));
    }

    let (present_days, overtime_hours): (i64, Option<f64>) = sqlx::query_as(
        r#"
        SELECT COUNT(DISTINCT date), COALESCE(SUM(overtime_hours), 0)
        FROM attendance_records
        WHERE employee_id = ? AND date >= ? AND date < ? AND punch_in IS NOT NULL
        "#,
    )
    .bind(&payload.employee_id)
    .bind(month_start)
    .bind(month_end)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Attendance aggregation failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let working_days = payroll::working_days_in_month(payload.year, payload.month);
    let breakdown = payroll::compute_payroll(
        basic_salary,
        working_days,
        present_days as i32,
        overtime_hours.unwrap_or(0.0),
    );

    let record = PayrollRecord {
        id: Uuid::new_v4().to_string(),
        employee_id: payload.employee_id.clone(),
        month: payload.month as i32,
        year: payload.year,
        basic_salary: breakdown.basic_salary,
        working_days: breakdown.working_days,
        present_days: breakdown.present_days,
        overtime_hours: breakdown.overtime_hours,
        overtime_amount: breakdown.overtime_amount,
        pf_deduction: breakdown.pf_deduction,
        lwp_deduction: breakdown.lwp_deduction,
        net_salary: breakdown.net_salary,
    };

    sqlx::query(
        r#"
        INSERT INTO payroll_records
        (id, employee_id, month, year, basic_salary, working_days, present_days,
         overtime_hours, overtime_amount, pf_deduction, lwp_deduction, net_salary)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record.id)
    .bind(&record.employee_id)
    .bind(record.month)
    .bind(record.year)
    .bind(record.basic_salary)
    .bind(record.working_days)
    .bind(record.present_days)
    .bind(record.overtime_hours)
    .bind(record.overtime_amount)
    .bind(record.pf_deduction)
    .bind(record.lwp_deduction)
    .bind(record.net_salary)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Failed to insert payroll record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit payroll");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(record))
}

/// Adjust a payroll record
///
/// Merges the patch with stored values and recomputes the full breakdown.
/// `net_salary` can never be set directly.
#[utoipa::path(
    put,
    path = "/api/v1/payroll/{payroll_id}",
    request_body = UpdatePayroll,
    params(("payroll_id", Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll updated", body = PayrollRecord),
        (status = 404, description = "Payroll record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn update_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    body: web::Json<UpdatePayroll>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let payroll_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current: Option<(String, i32, i32, f64, i32, i32, f64)> = sqlx::query_as(
        r#"
        SELECT employee_id, month, year, basic_salary, working_days,
               present_days, overtime_hours
        FROM payroll_records
        WHERE id = ?
        FOR UPDATE
        "#,
    )
    .bind(&payroll_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payroll_id, "Failed to fetch payroll record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (employee_id, month, year, basic_salary, working_days, current_present, current_ot) =
        match current {
            Some(c) => c,
            None => {
                return Ok(HttpResponse::NotFound().json(json!({
                    "message": "Payroll record not found"
                })));
            }
        };

    let present_days = body.present_days.unwrap_or(current_present);
    let overtime_hours = body.overtime_hours.unwrap_or(current_ot);

    let breakdown =
        payroll::compute_payroll(basic_salary, working_days, present_days, overtime_hours);

    sqlx::query(
        r#"
        UPDATE payroll_records
        SET present_days = ?, overtime_hours = ?, overtime_amount = ?,
            pf_deduction = ?, lwp_deduction = ?, net_salary = ?
        WHERE id = ?
        "#,
    )
    .bind(breakdown.present_days)
    .bind(breakdown.overtime_hours)
    .bind(breakdown.overtime_amount)
    .bind(breakdown.pf_deduction)
    .bind(breakdown.lwp_deduction)
    .bind(breakdown.net_salary)
    .bind(&payroll_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payroll_id, "Failed to update payroll record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit payroll update");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(PayrollRecord {
        id: payroll_id,
        employee_id,
        month,
        year,
        basic_salary: breakdown.basic_salary,
        working_days: breakdown.working_days,
        present_days: breakdown.present_days,
        overtime_hours: breakdown.overtime_hours,
        overtime_amount: breakdown.overtime_amount,
        pf_deduction: breakdown.pf_deduction,
        lwp_deduction: breakdown.lwp_deduction,
        net_salary: breakdown.net_salary,
    }))
}

/// Get a payroll record
#[utoipa::path(
    get,
    path = "/api/v1/payroll/{payroll_id}",
    params(("payroll_id", Path, description = "Payroll record ID")),
    responses(
        (status = 200, description = "Payroll record", body = PayrollRecord),
        (status = 404, description = "Payroll record not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn get_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
) -> actix_web::Result<impl Responder> {
    let payroll_id = path.into_inner();

    let record = sqlx::query_as::<_, PayrollRecord>(
        r#"
        SELECT id, employee_id, month, year, basic_salary, working_days, present_days,
               overtime_hours, overtime_amount, pf_deduction, lwp_deduction, net_salary
        FROM payroll_records
        WHERE id = ?
        "#,
    )
    .bind(&payroll_id)
    .fetch_optional(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, payroll_id, "Failed to fetch payroll record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let record = match record {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Payroll record not found"
            })));
        }
    };

    // Employees only see their own pay.
    if auth.require_hr_or_admin().is_err() && auth.employee_id()? != record.employee_id {
        return Err(actix_web::error::ErrorForbidden("Not your payroll"));
    }

    Ok(HttpResponse::Ok().json(record))
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
    Int(i32),
}

/// List payroll records
#[utoipa::path(
    get,
    path = "/api/v1/payroll",
    params(PayrollFilter),
    responses(
        (status = 200, description = "Paginated payroll list", body = PayrollListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Payroll"
)]
pub async fn list_payroll(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<PayrollFilter>,
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
    if let Some(month) = query.month {
        where_sql.push_str(" AND month = ?");
        args.push(FilterValue::Int(month));
    }
    if let Some(year) = query.year {
        where_sql.push_str(" AND year = ?");
        args.push(FilterValue::Int(year));
    }

    let count_sql = format!("SELECT COUNT(*) FROM payroll_records{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Int(i) => count_q.bind(*i),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count payroll records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, month, year, basic_salary, working_days, present_days,
               overtime_hours, overtime_amount, pf_deduction, lwp_deduction, net_salary
        FROM payroll_records
        {}
        ORDER BY year DESC, month DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, PayrollRecord>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Int(i) => data_q.bind(i),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch payroll records");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(PayrollListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}
