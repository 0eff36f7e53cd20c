pub mod attendance;
pub mod dashboard;
pub mod employee;
pub mod leave;
pub mod notification;
pub mod payroll;
pub mod qr;
pub mod reports;
