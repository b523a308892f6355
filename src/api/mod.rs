pub mod attendance;
pub mod certification;
pub mod document;
pub mod employee;
pub mod leave_request;
pub mod performance_review;
pub mod skill;
pub mod training;
