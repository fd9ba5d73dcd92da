use crate::api::approval::{ApprovalListResponse, DecideApproval};
use crate::api::attendance::{AttendanceListResponse, PunchReq};
use crate::api::department::CreateDepartment;
use crate::api::employee::{CreateEmployee, EmployeeListResponse};
use crate::api::field_work::{EndVisit, StartVisit};
use crate::api::leave_application::{CreateLeaveApplication, LeaveApplicationListResponse};
use crate::api::leave_assignment::{
    BulkAssignment, BulkAssignmentResult, CreateAssignment, UpdateAssignment,
};
use crate::api::leave_type::CreateLeaveType;
use crate::api::miss_punch::CreateMissPunch;
use crate::api::payroll::{GeneratePayroll, PayrollListResponse, UpdatePayroll};
use crate::model::approval::{Approval, ApprovalKind, ApprovalStatus};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus};
use crate::model::department::Department;
use crate::model::employee::Employee;
use crate::model::field_work::{FieldWorkVisit, VisitStatus};
use crate::model::leave::{LeaveApplication, LeaveAssignment, LeaveType};
use crate::model::miss_punch::{MissPunchRequest, PunchType};
use crate::model::payroll::PayrollRecord;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "HRMS API",
        version = "1.0.0",
        description = r#"
## Human Resource Management System

Attendance, leave, approvals, field work and payroll for a single organization.

### Key Features
- **Employee Management**
  - Profiles, reporting lines, soft deactivation
- **Attendance**
  - GPS-tagged punch in and punch out with derived working and overtime hours
- **Leave Management**
  - Yearly balances, applications, manager approval
- **Approvals**
  - One inbox for leave, miss-punch and overtime sign-off
- **Field Work**
  - Mobile visit tracking with travelled distance
- **Payroll**
  - Monthly pay derived from attendance

### Security
Web endpoints use **JWT Bearer authentication**; mobile field-work endpoints
use a short-lived device token in the `X-Device-Token` header.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::get_employee,
        crate::api::employee::list_employees,
        crate::api::employee::update_employee,
        crate::api::employee::deactivate_employee,

        crate::api::department::create_department,
        crate::api::department::list_departments,

        crate::api::attendance::punch_in,
        crate::api::attendance::punch_out,
        crate::api::attendance::attendance_list,

        crate::api::leave_type::create_leave_type,
        crate::api::leave_type::list_leave_types,

        crate::api::leave_assignment::create_assignment,
        crate::api::leave_assignment::update_assignment,
        crate::api::leave_assignment::bulk_assign,
        crate::api::leave_assignment::list_assignments,

        crate::api::leave_application::create_leave_application,
        crate::api::leave_application::get_leave_application,
        crate::api::leave_application::list_leave_applications,

        crate::api::approval::decide_approval,
        crate::api::approval::list_approvals,

        crate::api::miss_punch::create_miss_punch,
        crate::api::miss_punch::list_miss_punch,

        crate::api::field_work::start_visit,
        crate::api::field_work::end_visit,
        crate::api::field_work::my_visits,
        crate::api::field_work::list_visits,

        crate::api::payroll::generate_payroll,
        crate::api::payroll::update_payroll,
        crate::api::payroll::get_payroll,
        crate::api::payroll::list_payroll
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            EmployeeListResponse,
            Department,
            CreateDepartment,
            AttendanceRecord,
            AttendanceStatus,
            PunchReq,
            AttendanceListResponse,
            LeaveType,
            CreateLeaveType,
            LeaveAssignment,
            CreateAssignment,
            UpdateAssignment,
            BulkAssignment,
            BulkAssignmentResult,
            LeaveApplication,
            CreateLeaveApplication,
            LeaveApplicationListResponse,
            Approval,
            ApprovalKind,
            ApprovalStatus,
            DecideApproval,
            ApprovalListResponse,
            MissPunchRequest,
            PunchType,
            CreateMissPunch,
            FieldWorkVisit,
            VisitStatus,
            StartVisit,
            EndVisit,
            PayrollRecord,
            GeneratePayroll,
            UpdatePayroll,
            PayrollListResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "Attendance", description = "Punch tracking APIs"),
        (name = "Leave", description = "Leave balance and application APIs"),
        (name = "Approval", description = "Approval inbox APIs"),
        (name = "MissPunch", description = "Miss-punch correction APIs"),
        (name = "FieldWork", description = "Field visit tracking APIs"),
        (name = "Payroll", description = "Payroll APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
