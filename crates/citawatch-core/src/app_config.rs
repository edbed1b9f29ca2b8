/// Settings for the REST booking API pipeline.
///
/// Absent entirely when `CITAWATCH_API_BASE_URL` is not set, in which case
/// the pipeline is skipped for the run.
#[derive(Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub username: String,
    pub password: String,
    pub health_centre_ids: Vec<i64>,
    pub specialty_ids: Vec<i64>,
    /// Insurance agreement the availability query is scoped to.
    pub agreement_id: i64,
    /// Appointment format. 1 = presential.
    pub format_id: i64,
    pub max_concurrent_jobs: usize,
    pub job_timeout_secs: u64,
    pub request_timeout_secs: u64,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &"[redacted]")
            .field("health_centre_ids", &self.health_centre_ids)
            .field("specialty_ids", &self.specialty_ids)
            .field("agreement_id", &self.agreement_id)
            .field("format_id", &self.format_id)
            .field("max_concurrent_jobs", &self.max_concurrent_jobs)
            .field("job_timeout_secs", &self.job_timeout_secs)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Settings for the browser-driven booking portal pipeline.
///
/// Absent entirely when `CITAWATCH_PORTAL_URL` is not set.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    pub url: String,
    pub health_centre_ids: Vec<String>,
    pub specialty_ids: Vec<String>,
    pub insurer_id: String,
    pub group_id: String,
    pub concept_id: String,
    pub job_timeout_secs: u64,
    /// Fixed wait after each form selection while dependent controls reload.
    pub settle_delay_secs: u64,
    /// Bound on each wait for a form control to become visible.
    pub control_wait_secs: u64,
    pub headless: bool,
}

/// Telegram delivery settings. Absent when `CITAWATCH_TELEGRAM_TOKEN` is not
/// set; notifications then go to the log instead.
#[derive(Clone)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: i64,
}

impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("token", &"[redacted]")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub api: Option<ApiConfig>,
    pub portal: Option<PortalConfig>,
    pub telegram: Option<TelegramConfig>,
}
