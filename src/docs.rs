use crate::api::attendance::AttendanceAction;
use crate::api::certification::CertificationPayload;
use crate::api::document::{UpdateDocument, UploadDocumentForm};
use crate::api::employee::{CreateEmployee, CreatedEmployee, EmployeePayload};
use crate::api::leave_request::{CreateLeave, LeaveDecision};
use crate::api::performance_review::ReviewPayload;
use crate::api::skill::SkillPayload;
use crate::api::training::TrainingPayload;
use crate::auth::handlers::LoginRequest;
use crate::model::{
    attendance::{Attendance, AttendanceStatus},
    certification::Certification,
    document::{Document, DocumentStats, DocumentStatus},
    employee::{EmergencyContact, Employee, EmployeeStatus},
    leave_request::{LeaveRequest, LeaveStatus},
    performance_review::PerformanceReview,
    role::Role,
    skill::{Skill, SkillLevel},
    training::{Training, TrainingStatus},
    user::UserProfile,
};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ERMS API",
        version = "1.0.0",
        description = r#"
## Employee Records Management System

JSON REST API for an HR back office.

### Features
- **Employees**: records with emergency contact, optional login account
- **Documents**: uploads with expiry tracking (Valid, Expiring Soon, Expired)
- **Attendance**: daily clock-in, clock-out and absence marking
- **Leave**: requests with a one-time approve or deny decision
- **Performance, training, certifications, skills**: per-employee CRUD

### Response format
- Field names are camelCase
- Errors are `{"error": "..."}`
- The employee and document lists are paginated with `page` / `limit`
  and report the total in `X-Total-Count`
"#,
    ),
    paths(
        crate::auth::handlers::login,

        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::create_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::document::list_documents,
        crate::api::document::list_employee_documents,
        crate::api::document::upload_document,
        crate::api::document::update_document,
        crate::api::document::delete_document,
        crate::api::document::document_stats,

        crate::api::attendance::clock_in,
        crate::api::attendance::clock_out,
        crate::api::attendance::mark_absent,
        crate::api::attendance::list_attendance,
        crate::api::attendance::today_attendance,
        crate::api::attendance::employee_attendance,
        crate::api::attendance::attendance_by_date,

        crate::api::leave_request::create_leave,
        crate::api::leave_request::list_leaves,
        crate::api::leave_request::employee_leaves,
        crate::api::leave_request::set_leave_status,

        crate::api::performance_review::list_reviews,
        crate::api::performance_review::create_review,
        crate::api::performance_review::update_review,
        crate::api::performance_review::delete_review,

        crate::api::training::list_trainings,
        crate::api::training::create_training,
        crate::api::training::update_training,
        crate::api::training::delete_training,

        crate::api::certification::list_certifications,
        crate::api::certification::create_certification,
        crate::api::certification::update_certification,
        crate::api::certification::delete_certification,

        crate::api::skill::list_skills,
        crate::api::skill::create_skill,
        crate::api::skill::update_skill,
        crate::api::skill::delete_skill
    ),
    components(
        schemas(
            LoginRequest,
            UserProfile,
            Role,
            Employee,
            EmployeeStatus,
            EmergencyContact,
            EmployeePayload,
            CreateEmployee,
            CreatedEmployee,
            Document,
            DocumentStatus,
            DocumentStats,
            UpdateDocument,
            UploadDocumentForm,
            Attendance,
            AttendanceStatus,
            AttendanceAction,
            LeaveRequest,
            LeaveStatus,
            CreateLeave,
            LeaveDecision,
            PerformanceReview,
            ReviewPayload,
            Training,
            TrainingStatus,
            TrainingPayload,
            Certification,
            CertificationPayload,
            Skill,
            SkillLevel,
            SkillPayload
        )
    ),
    tags(
        (name = "Auth", description = "Login"),
        (name = "Employee", description = "Employee management APIs"),
        (name = "Document", description = "Document upload and expiry tracking APIs"),
        (name = "Attendance", description = "Attendance management APIs"),
        (name = "Leave", description = "Leave management APIs"),
        (name = "Performance", description = "Performance review APIs"),
        (name = "Training", description = "Training, certification and skill APIs"),
    )
)]
pub struct ApiDoc;
