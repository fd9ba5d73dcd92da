pub mod geo;
pub mod leave;
pub mod payroll;
pub mod time_accounting;
