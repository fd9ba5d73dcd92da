pub mod approval;
pub mod attendance;
pub mod department;
pub mod employee;
pub mod field_work;
pub mod leave;
pub mod miss_punch;
pub mod payroll;
pub mod role;
