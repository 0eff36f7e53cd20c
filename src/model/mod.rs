pub mod attendance;
pub mod leave_request;
pub mod notification;
pub mod profile;
pub mod qr_config;
pub mod role;
