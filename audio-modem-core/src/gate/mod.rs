pub mod capture_input;
pub mod once_event;
pub mod readiness;
