use crate::{auth::auth::AuthUser, domain::leave, model::leave::LeaveAssignment};
use actix_web::{HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use sqlx::MySqlPool;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

#[derive(Deserialize, ToSchema)]
pub struct CreateAssignment {
    pub employee_id: String,
    pub leave_type_id: String,
    #[schema(example = 2024)]
    pub year: i32,
    #[schema(example = 20)]
    pub allocated_days: i32,
    /// Defaults to 0.
    #[serde(default)]
    pub used_days: i32,
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateAssignment {
    pub allocated_days: Option<i32>,
    pub used_days: Option<i32>,
}

#[derive(Deserialize, ToSchema)]
pub struct BulkAssignment {
    pub employee_ids: Vec<String>,
    pub leave_type_id: String,
    #[schema(example = 20)]
    pub allocated_days: i32,
    #[schema(example = 2024)]
    pub year: i32,
}

#[derive(Serialize, ToSchema)]
pub struct BulkAssignmentResult {
    /// Assignments actually inserted.
    pub created: u32,
    /// Employees that already had a row for this leave type and year.
    pub skipped: u32,
}

#[derive(Deserialize, IntoParams, ToSchema)]
pub struct AssignmentFilter {
    pub employee_id: Option<String>,
    pub year: Option<i32>,
}

/// Locks the existing row for the rest of the transaction so two concurrent
/// creates cannot both observe "no assignment" and insert twice.
async fn assignment_exists(
    tx: &mut sqlx::MySqlConnection,
    employee_id: &str,
    leave_type_id: &str,
    year: i32,
) -> Result<bool, sqlx::Error> {
    let row: Option<(String,)> = sqlx::query_as(
        r#"
        SELECT id FROM employee_leave_assignments
        WHERE employee_id = ? AND leave_type_id = ? AND year = ?
        LIMIT 1
        FOR UPDATE
        "#,
    )
    .bind(employee_id)
    .bind(leave_type_id)
    .bind(year)
    .fetch_optional(tx)
    .await?;

    Ok(row.is_some())
}

/// MySQL integrity-constraint violation, raised by the unique key on
/// (employee_id, leave_type_id, year) when an insert loses the race anyway.
fn is_duplicate_key(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(e) if e.code().as_deref() == Some("23000"))
}

/// Splits bulk assignees into the ones to insert and the count of employees
/// already holding an assignment for the leave type and year.
fn split_assignees(rows: Vec<(&String, bool)>) -> (Vec<&String>, u32) {
    let mut to_insert = Vec::new();
    let mut skipped = 0u32;
    for (employee_id, exists) in rows {
        if exists {
            skipped += 1;
        } else {
            to_insert.push(employee_id);
        }
    }
    (to_insert, skipped)
}

/// Create a single leave assignment
///
/// `remaining_days` is always derived as allocated - used; it is never
/// accepted from the caller.
#[utoipa::path(
    post,
    path = "/api/v1/leave-assignments",
    request_body = CreateAssignment,
    responses(
        (status = 201, description = "Assignment created"),
        (status = 409, description = "Assignment already exists for this employee/leave type/year"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn create_assignment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<CreateAssignment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let exists = assignment_exists(
        &mut tx,
        &payload.employee_id,
        &payload.leave_type_id,
        payload.year,
    )
    .await
    .map_err(|e| {
        tracing::error!(error = %e, "Assignment lookup failed");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    if exists {
        return Ok(HttpResponse::Conflict().json(json!({
            "message": "Assignment already exists for this employee, leave type and year"
        })));
    }

    let id = Uuid::new_v4().to_string();
    let remaining = leave::remaining_days(payload.allocated_days, payload.used_days);

    sqlx::query(
        r#"
        INSERT INTO employee_leave_assignments
        (id, employee_id, leave_type_id, year, allocated_days, used_days, remaining_days)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(&payload.employee_id)
    .bind(&payload.leave_type_id)
    .bind(payload.year)
    .bind(payload.allocated_days)
    .bind(payload.used_days)
    .bind(remaining)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        if is_duplicate_key(&e) {
            return actix_web::error::ErrorConflict(
                "Assignment already exists for this employee, leave type and year",
            );
        }
        tracing::error!(error = %e, "Failed to create assignment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit assignment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Created().json(json!({
        "message": "Assignment created",
        "id": id,
        "remaining_days": remaining
    })))
}

/// Update a leave assignment
///
/// Merges the patch with stored values and recomputes `remaining_days` inside
/// one transaction, so concurrent updates cannot interleave between the read
/// and the write.
#[utoipa::path(
    put,
    path = "/api/v1/leave-assignments/{assignment_id}",
    request_body = UpdateAssignment,
    params(("assignment_id", Path, description = "Assignment ID")),
    responses(
        (status = 200, description = "Assignment updated"),
        (status = 404, description = "Assignment not found")
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn update_assignment(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    path: web::Path<String>,
    body: web::Json<UpdateAssignment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    let assignment_id = path.into_inner();

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let current: Option<(i32, i32)> = sqlx::query_as(
        r#"
        SELECT allocated_days, used_days
        FROM employee_leave_assignments
        WHERE id = ?
        FOR UPDATE
        "#,
    )
    .bind(&assignment_id)
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, assignment_id, "Failed to fetch assignment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let (current_allocated, current_used) = match current {
        Some(c) => c,
        None => {
            return Ok(HttpResponse::NotFound().json(json!({
                "message": "Assignment not found"
            })));
        }
    };

    let allocated = body.allocated_days.unwrap_or(current_allocated);
    let used = body.used_days.unwrap_or(current_used);
    let remaining = leave::remaining_days(allocated, used);

    sqlx::query(
        r#"
        UPDATE employee_leave_assignments
        SET allocated_days = ?, used_days = ?, remaining_days = ?
        WHERE id = ?
        "#,
    )
    .bind(allocated)
    .bind(used)
    .bind(remaining)
    .bind(&assignment_id)
    .execute(&mut *tx)
    .await
    .map_err(|e| {
        tracing::error!(error = %e, assignment_id, "Failed to update assignment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit assignment update");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Assignment updated",
        "remaining_days": remaining
    })))
}

/// Bulk-assign a leave type to many employees
///
/// One row per employee with used_days = 0. Employees that already hold an
/// assignment for the same leave type and year are skipped, not duplicated.
#[utoipa::path(
    post,
    path = "/api/v1/leave-assignments/bulk",
    request_body = BulkAssignment,
    responses(
        (status = 200, description = "Bulk assignment outcome", body = BulkAssignmentResult),
        (status = 400, description = "Empty employee list"),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn bulk_assign(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    payload: web::Json<BulkAssignment>,
) -> actix_web::Result<impl Responder> {
    auth.require_hr_or_admin()?;

    if payload.employee_ids.is_empty() {
        return Ok(HttpResponse::BadRequest().json(json!({
            "message": "employee_ids must not be empty"
        })));
    }

    let mut tx = pool.begin().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to begin transaction");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let mut rows = Vec::with_capacity(payload.employee_ids.len());
    for employee_id in &payload.employee_ids {
        let exists = assignment_exists(&mut tx, employee_id, &payload.leave_type_id, payload.year)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "Assignment lookup failed");
                actix_web::error::ErrorInternalServerError("Internal Server Error")
            })?;
        rows.push((employee_id, exists));
    }

    let (to_insert, mut skipped) = split_assignees(rows);
    let mut created = 0u32;

    for employee_id in to_insert {
        let result = sqlx::query(
            r#"
            INSERT INTO employee_leave_assignments
            (id, employee_id, leave_type_id, year, allocated_days, used_days, remaining_days)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(employee_id)
        .bind(&payload.leave_type_id)
        .bind(payload.year)
        .bind(payload.allocated_days)
        .bind(payload.allocated_days) // remaining = allocated - 0
        .execute(&mut *tx)
        .await;

        match result {
            Ok(_) => created += 1,
            // Unique key lost the race to another writer
            Err(e) if is_duplicate_key(&e) => skipped += 1,
            Err(e) => {
                tracing::error!(error = %e, employee_id, "Bulk assignment insert failed");
                return Err(actix_web::error::ErrorInternalServerError(
                    "Internal Server Error",
                ));
            }
        }
    }

    tx.commit().await.map_err(|e| {
        tracing::error!(error = %e, "Failed to commit bulk assignment");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(BulkAssignmentResult { created, skipped }))
}

/// List leave assignments
#[utoipa::path(
    get,
    path = "/api/v1/leave-assignments",
    params(AssignmentFilter),
    responses(
        (status = 200, description = "Assignments", body = [LeaveAssignment]),
        (status = 401),
        (status = 403)
    ),
    security(("bearer_auth" = [])),
    tag = "Leave"
)]
pub async fn list_assignments(
    auth: AuthUser,
    pool: web::Data<MySqlPool>,
    query: web::Query<AssignmentFilter>,
) -> actix_web::Result<impl Responder> {
    // Employees may read their own balances; HR passes an employee filter.
    let employee_id = match query.employee_id.clone() {
        Some(id) => {
            if auth.require_hr_or_admin().is_err() && auth.employee_id()? != id {
                return Err(actix_web::error::ErrorForbidden("Not your assignments"));
            }
            id
        }
        None => auth.employee_id()?,
    };

    let mut sql = String::from(
        r#"
        SELECT id, employee_id, leave_type_id, year, allocated_days, used_days, remaining_days
        FROM employee_leave_assignments
        WHERE employee_id = ?
        "#,
    );
    if query.year.is_some() {
        sql.push_str(" AND year = ?");
    }
    sql.push_str(" ORDER BY year DESC");

    let mut q = sqlx::query_as::<_, LeaveAssignment>(&sql).bind(&employee_id);
    if let Some(year) = query.year {
        q = q.bind(year);
    }

    let assignments = q.fetch_all(pool.get_ref()).await.map_err(|e| {
        tracing::error!(error = %e, employee_id, "Failed to fetch assignments");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(assignments))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn fresh_employees_all_get_a_row() {
        let employees = ids(&["e1", "e2", "e3"]);
        let rows = employees.iter().map(|id| (id, false)).collect();

        let (to_insert, skipped) = split_assignees(rows);
        assert_eq!(to_insert.len(), 3);
        assert_eq!(skipped, 0);
    }

    #[test]
    fn already_assigned_employees_are_skipped_not_duplicated() {
        let employees = ids(&["e1", "e2", "e3"]);
        let rows = employees
            .iter()
            .enumerate()
            .map(|(i, id)| (id, i != 1)) // only e2 has no assignment yet
            .collect();

        let (to_insert, skipped) = split_assignees(rows);
        assert_eq!(to_insert, vec![&employees[1]]);
        assert_eq!(skipped, 2);
    }

    #[test]
    fn rerun_of_a_completed_bulk_creates_nothing() {
        let employees = ids(&["e1", "e2"]);
        let rows = employees.iter().map(|id| (id, true)).collect();

        let (to_insert, skipped) = split_assignees(rows);
        assert!(to_insert.is_empty());
        assert_eq!(skipped, 2);
    }
}
