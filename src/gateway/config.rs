use super::error::{LockApiError, LockApiResult};

/// Runtime configuration describing how to reach the reservation API.
#[derive(Debug, Clone)]
pub struct LockApiConfig {
    pub base_url: String,
    /// Identity this service acts as; the backend attributes holds to it.
    pub client_id: String,
    pub bearer_token: Option<String>,
}

impl LockApiConfig {
    /// Construct a configuration from an explicit base URL and client identity.
    pub fn new(base_url: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client_id: client_id.into(),
            bearer_token: None,
        }
    }

    /// Attach a bearer token to every outgoing request.
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> LockApiResult<Self> {
        let base_url =
            std::env::var("COURT_API_BASE_URL").map_err(|_| LockApiError::MissingEnvVar {
                var: "COURT_API_BASE_URL",
            })?;
        let client_id =
            std::env::var("COURT_API_CLIENT_ID").map_err(|_| LockApiError::MissingEnvVar {
                var: "COURT_API_CLIENT_ID",
            })?;

        let mut config = Self::new(base_url, client_id);

        if let Ok(token) = std::env::var("COURT_API_TOKEN") {
            config = config.with_bearer_token(token);
        }

        Ok(config)
    }
}
