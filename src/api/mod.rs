pub mod approval;
pub mod attendance;
pub mod department;
pub mod employee;
pub mod field_work;
pub mod leave_application;
pub mod leave_assignment;
pub mod leave_type;
pub mod miss_punch;
pub mod payroll;
