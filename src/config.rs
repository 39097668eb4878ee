use std::env;
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct Config {
    pub database_url: String,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    /// Upper bound on a capacity transaction, lock wait included.
    pub lock_timeout: Duration,
    pub seed_timetable: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            database_url: env::var("DATABASE_URL")
                .expect("DATABASE_URL must be set"),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| "0.0.0.0".to_string()),
            server_port: env::var("SERVER_PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .expect("SERVER_PORT must be a number"),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "25".to_string())
                .parse()
                .expect("DB_MAX_CONNECTIONS must be a number"),
            lock_timeout: Duration::from_millis(
                env::var("LOCK_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .expect("LOCK_TIMEOUT_MS must be a number"),
            ),
            seed_timetable: env::var("SEED_TIMETABLE")
                .unwrap_or_else(|_| "true".to_string())
                .parse()
                .expect("SEED_TIMETABLE must be true or false"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}
