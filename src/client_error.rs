use reqwest::StatusCode;
use serde_json::Error as JsonError;

#[derive(thiserror::Error, Debug)]
pub enum ClientError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Upstream error ({0}): {1}")]
    Upstream(StatusCode, String),

    #[error("Unable to parse json data: {0}")]
    Parse(#[source] JsonError),

    #[error("Unable to encode value for key {0}: {1}")]
    Encoding(String, #[source] JsonError),

    #[error("Invalid service location: {0}")]
    InvalidLocation(String),

    #[error("Invalid client config: {0}")]
    Config(String),
}

impl ClientError {
    //transport 层失败没有状态码，按 500 处理
    pub fn transport(context: &str, err: reqwest::Error) -> Self {
        ClientError::Upstream(
            err.status().unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            format!("{}: {}", context, err),
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// Raised by the `must_get_*` accessors. It is never returned to the caller:
/// startup config that cannot be read must stop the process.
#[derive(thiserror::Error, Debug)]
#[error("Could not {action} config ({key}) {reason}")]
pub struct FatalConfigError {
    pub action: &'static str,
    pub key: String,
    pub reason: String,
}

impl FatalConfigError {
    pub fn new(action: &'static str, key: &str, reason: impl ToString) -> Self {
        Self {
            action,
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    pub fn raise(self) -> ! {
        log::error!("{}", self);
        panic!("{}", self)
    }
}
