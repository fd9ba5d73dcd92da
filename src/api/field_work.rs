use crate::auth::auth::AuthUser;
use crate::domain::geo;
use crate::model::field_work::{FieldWorkVisit, VisitStatus};
use crate::utils::token_store::MobileUser;
use actix_web::{HttpResponse, Responder, web};
use chrono::{NaiveDateTime, Utc};
use serde::Deserialize;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct StartVisit {
    #[schema(example = "Acme Corp")]
    pub client_name: String,
    #[schema(example = "Quarterly maintenance")]
    pub purpose: String,
    #[schema(example = 28.6139)]
    pub latitude: f64,
    #[schema(example = 77.2090)]
    pub longitude: f64,
    /// Address resolved by the mobile app; geocoding is not done here.
    pub address: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct EndVisit {
    #[schema(example = 28.7041)]
    pub latitude: f64,
    #[schema(example = 77.1025)]
    pub longitude: f64,
    pub address: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct VisitFilter {
    pub employee_id: Option<String>,
    #[schema(example = "in_progress")]
    pub status: Option<String>,
}

/// Start a field-work visit (mobile)
#[utoipa::path(
    post,
    path = "/api/v1/field-work/start",
    request_body = StartVisit,
    responses(
        (status = 201, description = "Visit started", body = Object, example = json!({
            "message": "Visit started"
        })),
        (status = 400, description = "Invalid GPS coordinates"),
        (status = 401, description = "Missing or invalid device token")
    ),
    tag = "FieldWork"
)]
pub async fn start_visit(
    mobile: MobileUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<StartVisit>,
) -> actix_web::Result<impl Responder> {
    let employee_id = mobile.session.employee_id;

    if !geo::is_valid_coordinate(payload.latitude, payload.longitude) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid GPS coordinates"
        })));
    }

    if payload.client_name.trim().is_empty() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Client name is required"
        })));
    }

    let visit_id = Uuid::new_v4().to_string();
    let now = Utc::now().naive_utc();

    sqlx::query(
        r#"
        INSERT INTO field_work_visits
        (id, employee_id, client_name, purpose, start_time,
         start_latitude, start_longitude, start_address, status)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&visit_id)
    .bind(&employee_id)
    .bind(payload.client_name.trim())
    .bind(&payload.purpose)
    .bind(now)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(&payload.address)
    .bind(VisitStatus::InProgress.to_string())
    .execute(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to start visit");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(serde_json::json!({
        "message": "Visit started",
        "id": visit_id
    })))
}

/// End a field-work visit (mobile)
///
/// Computes the great-circle distance between the start and end fixes.
/// Implausible movement is logged, never blocked.
#[utoipa::path(
    post,
    path = "/api/v1/field-work/{visit_id}/end",
    request_body = EndVisit,
    params(("visit_id", Path, description = "Visit ID")),
    responses(
        (status = 200, description = "Visit completed", body = Object, example = json!({
            "message": "Visit completed",
            "distance_km": 19.68
        })),
        (status = 400, description = "Invalid GPS coordinates or no visit in progress"),
        (status = 401, description = "Missing or invalid device token")
    ),
    tag = "FieldWork"
)]
pub async fn end_visit(
    mobile: MobileUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<EndVisit>,
) -> actix_web::Result<impl Responder> {
    let employee_id = mobile.session.employee_id;
    let visit_id = path.into_inner();

    if !geo::is_valid_coordinate(payload.latitude, payload.longitude) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Invalid GPS coordinates"
        })));
    }

    let now = Utc::now().naive_utc();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let open: Option<(f64, f64, NaiveDateTime)> = sqlx::query_as(
        r#"
        SELECT start_latitude, start_longitude, start_time
        FROM field_work_visits
        WHERE id = ? AND employee_id = ? AND status = 'in_progress'
        FOR UPDATE
        "#,
    )
    .bind(&visit_id)
    .bind(&employee_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, visit_id, "Visit lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (start_lat, start_lng, start_time) = match open {
        Some(row) => row,
        None => {
            return Ok(HttpResponse::BadRequest().json(serde_json::json!({
                "message": "No visit in progress with this id"
            })));
        }
    };

    let distance_km =
        geo::haversine_distance_km(start_lat, start_lng, payload.latitude, payload.longitude);

    let start = geo::TrackPoint {
        latitude: start_lat,
        longitude: start_lng,
        recorded_at: start_time,
    };
    let end = geo::TrackPoint {
        latitude: payload.latitude,
        longitude: payload.longitude,
        recorded_at: now,
    };
    if geo::is_suspicious_movement(&start, &end) {
        tracing::warn!(employee_id, visit_id, distance_km, "Suspicious movement on visit");
    }

    sqlx::query(
        r#"
        UPDATE field_work_visits
        SET end_time = ?, end_latitude = ?, end_longitude = ?, end_address = ?,
            distance_km = ?, status = ?
        WHERE id = ?
        "#,
    )
    .bind(now)
    .bind(payload.latitude)
    .bind(payload.longitude)
    .bind(&payload.address)
    .bind(distance_km)
    .bind(VisitStatus::Completed.to_string())
    .bind(&visit_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, visit_id, "Failed to end visit");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit visit");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": "Visit completed",
        "distance_km": distance_km
    })))
}

/// List the mobile caller's own visits
#[utoipa::path(
    get,
    path = "/api/v1/field-work/mine",
    responses(
        (status = 200, description = "Own visits", body = [FieldWorkVisit]),
        (status = 401, description = "Missing or invalid device token")
    ),
    tag = "FieldWork"
)]
pub async fn my_visits(
    mobile: MobileUser,
    pool: web::Data<MySqlPool>,
) -> actix_web::Result<impl Responder> {
    let employee_id = mobile.session.employee_id;

    let visits = sqlx::query_as::<_, FieldWorkVisit>(
        r#"
        SELECT id, employee_id, client_name, purpose, start_time, end_time,
               start_latitude, start_longitude, end_latitude, end_longitude,
               start_address, end_address, distance_km, status
        FROM field_work_visits
        WHERE employee_id = ?
        ORDER BY start_time DESC
        "#,
    )
    .bind(&employee_id)
    .fetch_all(pool.get_ref())
    .await
    .map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch visits");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(visits))
}

/// List field-work visits (HR view)
#[utoipa::path(
    get,
    path = "/api/v1/field-work",
    params(VisitFilter),
    responses(
        (status = 200, description = "Visits", body = [FieldWorkVisit]),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "FieldWork"
)]
pub async fn list_visits(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<VisitFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut sql = String::from(
        r#"
        SELECT id, employee_id, client_name, purpose, start_time, end_time,
               start_latitude, start_longitude, end_latitude, end_longitude,
               start_address, end_address, distance_km, status
        FROM field_work_visits
        WHERE 1=1
        "#,
    );
    if query.employee_id.is_some() {
        sql.push_str(" AND employee_id = ?");
    }
    if query.status.is_some() {
        sql.push_str(" AND status = ?");
    }
    sql.push_str(" ORDER BY start_time DESC");

    let mut q = sqlx::query_as::<_, FieldWorkVisit>(&sql);
    if let Some(emp_id) = query.employee_id.as_deref() {
        q = q.bind(emp_id);
    }
    if let Some(status) = query.status.as_deref() {
        q = q.bind(status);
    }

    let visits = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to fetch visits");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(visits))
}
