mod auth;
mod dashboard;
mod users;
mod courses;
mod students;
mod marks;
mod fees;
pub mod extract;

use crate::{config::Config, services::StoreService};

/// Shared handler state: the store handle and the loaded configuration.
pub type AppState = (StoreService, Config);

pub use auth::{handle_login, handle_register, handle_forgot_password};
pub use dashboard::{get_dashboard_stats, get_report_summary};
pub use users::{list_users, get_user, update_user};
pub use courses::{list_courses, create_course, update_course};
pub use students::{list_students, get_student, admit_student, update_student};
pub use marks::{list_marks, create_marks, update_marks};
pub use fees::{list_fees, create_fees, update_fees};
