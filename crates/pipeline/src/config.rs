use std::time::Duration;

/// Import pipeline configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Deadline applied to every single store call.
    pub call_timeout: Duration,
    /// Rows provisioned concurrently. `1` processes rows one at a time.
    pub max_concurrency: usize,
    /// Skip rows whose email already has an account instead of attempting
    /// to create it again.
    pub dedup_by_email: bool,
    /// Minimum accepted password length for new accounts.
    pub min_password_length: usize,
    /// Largest accepted upload, in bytes.
    pub max_upload_bytes: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            call_timeout: Duration::from_secs(10),
            max_concurrency: 1,
            dedup_by_email: false,
            min_password_length: 6,
            max_upload_bytes: 5 * 1024 * 1024,
        }
    }
}

impl ImportConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                        | Default   |
    /// |--------------------------------|-----------|
    /// | `IMPORT_CALL_TIMEOUT_SECS`     | `10`      |
    /// | `IMPORT_MAX_CONCURRENCY`       | `1`       |
    /// | `IMPORT_DEDUP_BY_EMAIL`        | `false`   |
    /// | `IDENTITY_MIN_PASSWORD_LENGTH` | `6`       |
    /// | `IMPORT_MAX_UPLOAD_BYTES`      | `5242880` |
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let call_timeout_secs: u64 = std::env::var("IMPORT_CALL_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".into())
            .parse()
            .expect("IMPORT_CALL_TIMEOUT_SECS must be a valid u64");

        let max_concurrency: usize = std::env::var("IMPORT_MAX_CONCURRENCY")
            .unwrap_or_else(|_| "1".into())
            .parse()
            .expect("IMPORT_MAX_CONCURRENCY must be a valid usize");

        let dedup_by_email = std::env::var("IMPORT_DEDUP_BY_EMAIL")
            .map(|v| parse_flag(&v))
            .unwrap_or(defaults.dedup_by_email);

        let min_password_length: usize = std::env::var("IDENTITY_MIN_PASSWORD_LENGTH")
            .unwrap_or_else(|_| "6".into())
            .parse()
            .expect("IDENTITY_MIN_PASSWORD_LENGTH must be a valid usize");

        let max_upload_bytes: usize = std::env::var("IMPORT_MAX_UPLOAD_BYTES")
            .map(|v| {
                v.parse()
                    .expect("IMPORT_MAX_UPLOAD_BYTES must be a valid usize")
            })
            .unwrap_or(defaults.max_upload_bytes);

        Self {
            call_timeout: call_timeout_from_secs(call_timeout_secs),
            max_concurrency: max_concurrency.max(1),
            dedup_by_email,
            min_password_length,
            max_upload_bytes,
        }
    }
}

/// Per-call deadline, never below one second.
fn call_timeout_from_secs(secs: u64) -> Duration {
    Duration::from_secs(secs.max(1))
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
