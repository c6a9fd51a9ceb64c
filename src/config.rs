use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub log: LogConfig,
    pub auth: AuthConfig,
    pub seed: SeedConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub static_dir: String,
    pub max_body_size: usize,  // in bytes
}

#[derive(Debug, Deserialize, Clone)]
pub struct LogConfig {
    pub level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    pub bcrypt_cost: u32,
    pub default_student_password: String,
    pub enforce_roles: bool,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeedConfig {
    pub enabled: bool,
    pub admin_email: String,
    pub admin_password: String,
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "0.0.0.0".into(),
                port: 5000,
                static_dir: "static".into(),
                max_body_size: 1024 * 1024,
            },
            log: LogConfig {
                level: "info".into(),
            },
            auth: AuthConfig {
                bcrypt_cost: 10,
                default_student_password: "student123".into(),
                enforce_roles: true,
            },
            seed: SeedConfig {
                enabled: true,
                admin_email: "admin@college.edu".into(),
                admin_password: "admin123".into(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_shipped_file() {
        let shipped: Config = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("parse config/default.toml");
        let default = Config::default();

        assert_eq!(shipped.server.port, default.server.port);
        assert_eq!(shipped.server.max_body_size, default.server.max_body_size);
        assert_eq!(shipped.seed.admin_email, default.seed.admin_email);
        assert_eq!(
            shipped.auth.default_student_password,
            default.auth.default_student_password
        );
        assert!(shipped.auth.enforce_roles);
    }
}
