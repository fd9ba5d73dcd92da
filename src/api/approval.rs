use crate::auth::auth::AuthUser;
use crate::model::approval::{Approval, ApprovalKind, ApprovalStatus};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use sqlx::MySqlPool;
use std::str::FromStr;
use utoipa::{IntoParams, ToSchema};

#[derive(Deserialize, ToSchema)]
pub struct DecideApproval {
    /// approved or rejected; pending is not a valid decision.
    pub status: ApprovalStatus,
    pub comments: Option<String>,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct ApprovalFilter {
    #[schema(example = "pending")]
    pub status: Option<String>,
    #[schema(example = "leave")]
    pub kind: Option<String>,
    pub employee_id: Option<String>,
    pub page: Option<u64>,
    pub per_page: Option<u64>,
}

#[derive(Serialize, ToSchema)]
pub struct ApprovalListResponse {
    pub data: Vec<Approval>,
    pub page: u32,
    pub per_page: u32,
    pub total: i64,
}

/// A decision moves pending to a terminal state; "pending" itself is not one.
fn is_terminal_decision(status: ApprovalStatus) -> bool {
    status != ApprovalStatus::Pending
}

/// Statement that pushes the decision into the referenced request row.
/// Overtime approvals have no backing request table.
fn cascade_sql(kind: ApprovalKind) -> Option<&'static str> {
    match kind {
        ApprovalKind::Leave => {
            Some("UPDATE leave_applications SET status = ?, updated_at = NOW() WHERE id = ?")
        }
        ApprovalKind::MissPunch => Some("UPDATE miss_punch_requests SET status = ? WHERE id = ?"),
        ApprovalKind::Overtime => None,
    }
}

/// Decide an approval
///
/// `pending -> approved|rejected`, terminal either way. The decision and the
/// referenced request's status change are applied in one transaction so the
/// two rows can never disagree.
#[utoipa::path(
    put,
    path = "/api/v1/approvals/{approval_id}",
    request_body = DecideApproval,
    params(("approval_id", Path, description = "Approval ID")),
    responses(
        (status = 200, description = "Approval decided", body = Object, example = json!({
            "message": "Approval approved"
        })),
        (status = 400, description = "Invalid decision or already processed"),
        (status = 404, description = "Approval not found"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Approval"
)]
pub async fn decide_approval(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    payload: web::Json<DecideApproval>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let approval_id = path.into_inner();

    if !is_terminal_decision(payload.status) {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Decision must be approved or rejected"
        })));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let row: Option<(String, String, String)> = sqlx::query_as(
        r#"
        SELECT kind, reference_id, status
        FROM approvals
        WHERE id = ?
        FOR UPDATE
        "#,
    )
    .bind(&approval_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, approval_id, "Approval lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (kind, reference_id, status) = match row {
        Some(r) => r,
        None => {
            return Ok(HttpResponse::NotFound().json(serde_json::json!({
                "message": "Approval not found"
            })));
        }
    };

    if status != ApprovalStatus::Pending.to_string() {
        return Ok(HttpResponse::BadRequest().json(serde_json::json!({
            "message": "Approval already processed"
        })));
    }

    let decision = payload.status.to_string();

    sqlx::query(
        r#"
        UPDATE approvals
        SET status = ?, comments = ?, updated_at = NOW()
        WHERE id = ?
        "#,
    )
    .bind(&decision)
    .bind(&payload.comments)
    .bind(&approval_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, approval_id, "Approval update failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    // Cascade the decision into the referenced request in the same
    // transaction.
    match ApprovalKind::from_str(&kind) {
        Ok(k) => {
            if let Some(sql) = cascade_sql(k) {
                sqlx::query(sql)
                    .bind(&decision)
                    .bind(&reference_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        tracing::error!(error = %e, reference_id, "Decision cascade failed");
                        actix_web::error::ErrorInternalServerError("Internal Server Error")
                    })?;
            } else {
                tracing::debug!(approval_id, "No cascade target for this approval kind");
            }
        }
        Err(_) => {
            tracing::error!(approval_id, kind, "Unknown approval kind");
        }
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit approval decision");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(serde_json::json!({
        "message": format!("Approval {}", decision)
    })))
}

// Helper enum for typed SQLx binding
enum FilterValue<'a> {
    Str(&'a str),
}

/// List approvals (approver inbox)
#[utoipa::path(
    get,
    path = "/api/v1/approvals",
    params(ApprovalFilter),
    responses(
        (status = 200, description = "Paginated approval list", body = ApprovalListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Forbidden")
    ),
    security(("bearer_auth" = [])),
    tag = "Approval"
)]
pub async fn list_approvals(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<ApprovalFilter>,
) -> actix_web::Result<impl Responder> {
    auth.require_approver()?;

    let per_page = query.per_page.unwrap_or(10).min(100);
    let page = query.page.unwrap_or(1).max(1);
    let offset = (page - 1) * per_page;

    let mut where_sql = String::from(" WHERE 1=1");
    let mut args: Vec<FilterValue> = Vec::new();

    if let Some(status) = query.status.as_deref() {
        where_sql.push_str(" AND status = ?");
        args.push(FilterValue::Str(status));
    }
    if let Some(kind) = query.kind.as_deref() {
        where_sql.push_str(" AND kind = ?");
        args.push(FilterValue::Str(kind));
    }
    if let Some(emp_id) = query.employee_id.as_deref() {
        where_sql.push_str(" AND employee_id = ?");
        args.push(FilterValue::Str(emp_id));
    }

    let count_sql = format!("SELECT COUNT(*) FROM approvals{}", where_sql);

    let mut count_q = sqlx::query_scalar::<_, i64>(&count_sql);
    for arg in &args {
        count_q = match arg {
            FilterValue::Str(s) => count_q.bind(*s),
        };
    }

    let total = count_q.fetch_one(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to count approvals");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let data_sql = format!(
        r#"
        SELECT id, employee_id, approver_id, kind, reference_id, level,
               status, comments, created_at, updated_at
        FROM approvals
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );

    let mut data_q = sqlx::query_as::<_, Approval>(&data_sql);
    for arg in args {
        data_q = match arg {
            FilterValue::Str(s) => data_q.bind(s),
        };
    }

    let approvals = data_q
        .bind(per_page)
        .bind(offset)
        .fetch_all(pool.get_ref())
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to fetch approvals");
            actix_web::error::ErrorInternalServerError("Internal Server Error")
        })?;

    Ok(HttpResponse::Ok().json(ApprovalListResponse {
        data: approvals,
        page: page as u32,
        per_page: per_page as u32,
        total,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_is_not_a_valid_decision() {
        assert!(!is_terminal_decision(ApprovalStatus::Pending));
        assert!(is_terminal_decision(ApprovalStatus::Approved));
        assert!(is_terminal_decision(ApprovalStatus::Rejected));
    }

    #[test]
    fn leave_decision_cascades_into_the_application() {
        let sql = cascade_sql(ApprovalKind::Leave).unwrap();
        assert!(sql.contains("UPDATE leave_applications"));
        assert!(sql.contains("SET status = ?"));
    }

    #[test]
    fn miss_punch_decision_cascades_into_the_request() {
        let sql = cascade_sql(ApprovalKind::MissPunch).unwrap();
        assert!(sql.contains("UPDATE miss_punch_requests"));
        assert!(sql.contains("SET status = ?"));
    }

    #[test]
    fn overtime_has_no_cascade_target() {
        assert!(cascade_sql(ApprovalKind::Overtime).is_none());
    }
}
