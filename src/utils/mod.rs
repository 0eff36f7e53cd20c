pub mod attendance_stats;
pub mod db_utils;
pub mod email_cache;
pub mod email_filter;
pub mod geo;
pub mod payroll_calc;
pub mod qr_code;
