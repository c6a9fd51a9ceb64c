mod auth;

pub use auth::require_admin;
#[cfg(test)]
pub use auth::ROLE_HEADER;
