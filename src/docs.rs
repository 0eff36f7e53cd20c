use crate::api::attendance::ScanReq;
use crate::api::employee::CreateEmployee;
use crate::api::leave::CreateLeaveRequest;
use crate::api::notification::CreateNotification;
use crate::api::qr::{SetPinReq, UpdateQrConfig, ValidateReq, VerifyPinReq};
use crate::model::attendance::AttendanceRecord;
use crate::model::leave_request::LeaveRequest;
use crate::model::notification::Notification;
use crate::model::profile::UserProfile;
use crate::model::qr_config::QrAttendanceConfig;
use crate::utils::attendance_stats::{DashboardSummary, ReportTotals, StatusCount, WeeklyBucket};
use crate::utils::payroll_calc::{PayrollLine, PayrollTotals};
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "StaffPulse API",
        version = "1.0.0",
        description = r#"
## Staff Attendance & Payroll Administration

This API powers a staff administration dashboard for a small venue.

### 🔹 Key Features
- **Employee Management**
  - Staff directory with departments, positions and roles
- **QR Attendance**
  - Daily rotating QR code, scan-based check-in/check-out, optional geofence
- **Payroll**
  - Monthly regular/overtime hour splits with configurable rates
- **Reports & Dashboard**
  - Weekly attendance charts and same-day aggregates
- **Notifications**
  - Per-user feed with a live change stream (SSE)
- **Leave Management**
  - File, approve and reject leave requests

### 🔐 Security
Endpoints are protected using **JWT Bearer authentication**.
Sensitive operations require the **Admin** or **Manager** role.

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::scan,
        crate::api::attendance::history,
        crate::api::attendance::today,
        crate::api::attendance::update_record,
        crate::api::attendance::delete_record,

        crate::api::employee::list,
        crate::api::employee::me,
        crate::api::employee::update_me,
        crate::api::employee::get,
        crate::api::employee::create,
        crate::api::employee::update,
        crate::api::employee::deactivate,

        crate::api::payroll::monthly,
        crate::api::reports::attendance,
        crate::api::dashboard::summary,

        crate::api::notification::list,
        crate::api::notification::create,
        crate::api::notification::mark_read,
        crate::api::notification::mark_all_read,
        crate::api::notification::delete,
        crate::api::notification::stream,

        crate::api::qr::daily,
        crate::api::qr::validate,
        crate::api::qr::verify_access_pin,
        crate::api::qr::set_access_pin,
        crate::api::qr::get_config,
        crate::api::qr::update_config,

        crate::api::leave::create,
        crate::api::leave::list,
        crate::api::leave::approve,
        crate::api::leave::reject,
    ),
    components(
        schemas(
            ScanReq,
            AttendanceRecord,
            UserProfile,
            CreateEmployee,
            PayrollLine,
            PayrollTotals,
            WeeklyBucket,
            StatusCount,
            ReportTotals,
            DashboardSummary,
            Notification,
            CreateNotification,
            QrAttendanceConfig,
            UpdateQrConfig,
            ValidateReq,
            VerifyPinReq,
            SetPinReq,
            LeaveRequest,
            CreateLeaveRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "QR check-in/check-out and record administration"),
        (name = "Employees", description = "Staff directory APIs"),
        (name = "Payroll", description = "Monthly payroll summaries"),
        (name = "Reports", description = "Attendance reporting APIs"),
        (name = "Dashboard", description = "Same-day aggregates"),
        (name = "Notifications", description = "Per-user notification feed"),
        (name = "QR", description = "Daily code and attendance configuration"),
        (name = "Leave", description = "Leave management APIs"),
    )
)]
pub struct ApiDoc;

pub struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
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
