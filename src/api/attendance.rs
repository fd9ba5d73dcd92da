use crate::auth::auth::AuthUser;
use crate::domain::{geo, time_accounting};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema, Default)]
pub struct PunchReq {
    /// Optional GPS fix taken at the punch.
    #[schema(example = 28.6139)]
    pub latitude: Option<f64>,
    #[schema(example = 77.2090)]
    pub longitude: Option<f64>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AttendanceFilter {
    /// Filter by employee ID
    pub employee_id: Option<String>,
    #[schema(example = "2024-03-01", value_type = String, format = "date")]
    pub from: Option<NaiveDate>,
    #[schema(example = "2024-03-31", value_type = String, format = "date")]
    pub to: Option<NaiveDate>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceRecord>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
    Date(NaiveDate),
}

fn validate_gps(payload: &PunchReq) -> Result<(), HttpResponse> {
    if let (Some(lat), Some(lng)) = (payload.latitude, payload.longitude) {
        if !geo::is_valid_coordinate(lat, lng) {
            return Err(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Invalid GPS coordinates"
            })));
        }
    }
    Ok(())
}

// One-open-session invariant: a punch-in needs no open session for the day,
// a punch-out needs exactly the open one to close.

fn check_punch_in(open_session_id: Option<&str>) -> Result<(), HttpResponse> {
    match open_session_id {
        Some(_) => Err(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Already punched in"
        }))),
        None => Ok(()),
    }
}

fn check_punch_out<T>(open_session: Option<T>) -> Result<T, HttpResponse> {
    open_session.ok_or_else(|| {
        HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Must punch in first"
        }))
    })
}

/// Punch-in endpoint
///
/// Opens a new work session for today. Fails if the employee already has an
/// open session; punching in again after a punch-out starts a fresh session.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/punch-in",
    request_body(content = PunchReq, content_type = "application/json"),
    responses(
        (status = 200, description = "Punched in successfully", body = Object, example = json!({
            "message": "Punched in successfully"
        })),
        (status = 400, description = "Already punched in", body = Object, example = json!({
            "message": "Already punched in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn punch_in(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: Option<web::Json<PunchReq>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let payload = payload.map(|p| p.into_inner()).unwrap_or_default();

    if let Err(resp) = validate_gps(&payload) {
        return Ok(resp);
    }

    let now = Utc::now().naive_utc();
    let today = now.date();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Lock today's open session, if any, so concurrent punch-ins cannot both
    // observe "no open record".
    let open: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT id
        FROM attendance_records
        WHERE employee_id = ?
        AND date = ?
        AND punch_in IS NOT NULL
        AND punch_out IS NULL
        FOR UPDATE
        "#,
    )
    .bind(&employee_id)
    .bind(today)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Punch-in lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if let Err(resp) = check_punch_in(open.as_ref().map(|(id,)| id.as_str())) {
        return Ok(resp);
    }

    // Teleportation heuristic against the last recorded fix: log only,
    // never block the punch.
    if let (Some(lat), Some(lng)) = (payload.latitude, payload.longitude) {
        let last_fix: Option<(f64, f64, NaiveDateTime)> = sqlx::query_as(
            r#"
            SELECT punch_out_latitude, punch_out_longitude, punch_out
            FROM attendance_records
            WHERE employee_id = ?
            AND punch_out IS NOT NULL
            AND punch_out_latitude IS NOT NULL
            AND punch_out_longitude IS NOT NULL
            ORDER BY punch_out DESC
            LIMIT 1
            "#,
        )
        .bind(&employee_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, employee_id, "Last fix lookup failed");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

        if let Some((last_lat, last_lng, last_at)) = last_fix {
            let last = geo::TrackPoint {
                latitude: last_lat,
                longitude: last_lng,
                recorded_at: last_at,
            };
            let current = geo::TrackPoint {
                latitude: lat,
                longitude: lng,
                recorded_at: now,
            };
            if geo::is_suspicious_movement(&last, &current) {
                tracing::warn!(employee_id, "Suspicious movement before punch-in");
            }
        }
    }

    let record_id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO attendance_records
        (id, employee_id, date, punch_in, status, punch_in_latitude, punch_in_longitude)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&record_id)
    .bind(&employee_id)
    .bind(today)
    .bind(now)
    .bind(AttendanceStatus::Present.to_string())
    .bind(payload.latitude)
    .bind(payload.longitude)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Punch-in failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit punch-in");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Punched in successfully",
        "id": record_id
    })))
}

/// Punch-out endpoint
///
/// Closes the most recent open session for today and computes working and
/// overtime hours for it.
#[utoipa::path(
    post,
    path = "/api/v1/attendance/punch-out",
    request_body(content = PunchReq, content_type = "application/json"),
    responses(
        (status = 200, description = "Punched out successfully", body = Object, example = json!({
            "message": "Punched out successfully",
            "working_hours": 8.5,
            "overtime_hours": 0.5
        })),
        (status = 400, description = "No open punch-in for today", body = Object, example = json!({
            "message": "Must punch in first"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden"),
        (status = 500, description = "Internal server error")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn punch_out(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: Option<web::Json<PunchReq>>,
) -> actix_web::Result<impl Responder> {
    let employee_id = auth.employee_id()?;
    let payload = payload.map(|p| p.into_inner()).unwrap_or_default();

    if let Err(resp) = validate_gps(&payload) {
        return Ok(resp);
    }

    let now = Utc::now().naive_utc();
    let today = now.date();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let open: Option<(String, NaiveDateTime, Option<f64>, Option<f64>)> = sqlx::query_as(
        r#"
        SELECT id, punch_in, punch_in_latitude, punch_in_longitude
        FROM attendance_records
        WHERE employee_id = ?
        AND date = ?
        AND punch_in IS NOT NULL
        AND punch_out IS NULL
        ORDER BY punch_in DESC
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(&employee_id)
    .bind(today)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Punch-out lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (record_id, punch_in, in_lat, in_lng) = match check_punch_out(open) {
        Ok(row) => row,
        Err(resp) => return Ok(resp),
    };

    let worked = match time_accounting::session_hours(punch_in, now) {
        Ok(w) => w,
        Err(e) => {
            tracing::error!(error = %e, employee_id, record_id, "Rejecting out-of-order punch");
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "Punch-out is earlier than punch-in"
            })));
        }
    };

    // Teleportation heuristic: log only, never block the punch.
    if let (Some(last_lat), Some(last_lng), Some(lat), Some(lng)) =
        (in_lat, in_lng, payload.latitude, payload.longitude)
    {
        let last = geo::TrackPoint {
            latitude: last_lat,
            longitude: last_lng,
            recorded_at: punch_in,
        };
        let current = geo::TrackPoint {
            latitude: lat,
            longitude: lng,
            recorded_at: now,
        };
        if geo::is_suspicious_movement(&last, &current) {
            tracing::warn!(employee_id, record_id, "Suspicious movement between punches");
        }
    }

    sqlx::query(
        r#"
        UPDATE attendance_records
        SET punch_out = ?, working_hours = ?, overtime_hours = ?,
            punch_out_latitude = ?, punch_out_longitude = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(worked.working_hours)
    .bind(worked.overtime_hours)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(&record_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, record_id, "Punch-out failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit punch-out");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Punched out successfully",
        "working_hours": worked.working_hours,
        "overtime_hours": worked.overtime_hours
    })))
}

/// Attendance listing for HR
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(AttendanceFilter),
    responses(
        (status = 200, description = "Paginated attendance list", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Attendance"
)]
pub async fn attendance_list(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AttendanceFilter>,
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
    if let Some(from) = query.from {
        where_sql.push_str(" AND date >= ?");
        args.push(FilterValue::Date(from));
    }
    if let Some(to) = query.to {
        where_sql.push_str(" AND date <= ?");
        args.push(FilterValue::Date(to));
    }

    let count_sql = format!("SELECT COUNT(*) FROM attendance_records{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(*s),
            FilterValue::Date(d) => count_q.bind(*d),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count attendance records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, date, punch_in, punch_out, working_hours, overtime_hours,
               status, punch_in_latitude, punch_in_longitude,
               punch_out_latitude, punch_out_longitude
        FROM attendance_records
        {}
        ORDER BY date DESC, punch_in DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, AttendanceRecord>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
            FilterValue::Date(d) => data_q.bind(d),
        };
    }

    let records = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch attendance list");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(AttendanceListResponse {
        data: records,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn second_punch_in_with_open_session_is_rejected() {
        let resp = check_punch_in(Some("existing-record-id")).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn punch_in_with_no_open_session_is_allowed() {
        // Also the re-entry case: a closed session is not an open one.
        assert!(check_punch_in(None).is_ok());
    }

    #[test]
    fn punch_out_requires_an_open_session() {
        let resp = check_punch_out::<u8>(None).unwrap_err();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn punch_out_closes_the_open_session() {
        assert_eq!(check_punch_out(Some(7u8)).unwrap(), 7);
    }

    #[test]
    fn gps_payload_out_of_range_is_rejected() {
        let bad = PunchReq {
            latitude: Some(91.0),
            longitude: Some(0.0),
        };
        assert!(validate_gps(&bad).is_err());

        let good = PunchReq {
            latitude: Some(28.6139),
            longitude: Some(77.2090),
        };
        assert!(validate_gps(&good).is_ok());
    }
}
