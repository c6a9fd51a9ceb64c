use crate::config::Config;
use crate::errors::AppResult;
use crate::models::{NewCourse, NewUser, Role};
use super::{credentials::hash_password, StoreService};

/// Loads the demo data set: one administrator and three courses owned by it.
pub async fn seed_defaults(store: &StoreService, config: &Config) -> AppResult<()> {
    if !config.seed.enabled {
        tracing::info!("Seeding disabled, starting with an empty store");
        return Ok(());
    }

    let admin = store
        .create_user(NewUser {
            email: config.seed.admin_email.trim().to_ascii_lowercase(),
            password_hash: hash_password(&config.seed.admin_password, config.auth.bcrypt_cost)?,
            role: Role::Admin,
            first_name: "Admin".into(),
            last_name: "User".into(),
            phone: Some("+1-555-0100".into()),
            address: Some("College Administrative Office".into()),
        })
        .await;

    let courses = [
        ("CS101", "Computer Science", "Introduction to Computer Science", 4, "Computer Science"),
        ("MATH201", "Mathematics", "Advanced Mathematics", 3, "Mathematics"),
        ("PHY301", "Physics", "General Physics", 4, "Physics"),
    ];
    for (code, name, description, credits, department) in courses {
        store
            .create_course(NewCourse {
                code: code.into(),
                name: name.into(),
                description: Some(description.into()),
                credits,
                department: department.into(),
                faculty_id: Some(admin.id.clone()),
            })
            .await;
    }

    tracing::info!("Seeded administrator {} and {} courses", admin.email, courses.len());
    Ok(())
}
