use thiserror::Error;

#[derive(Debug, Error)]
pub enum SpoonError {
    #[error("'{tool}' is not installed or not on PATH: {hint}")]
    ToolMissing { tool: String, hint: String },

    #[error("no API key configured for {0}: run 'spoon api add {0} <key>'")]
    MissingCredential(String),

    #[error("not logged in: run 'spoon login --user <name> --token <token>'")]
    NotLoggedIn,

    #[error("invalid {kind} '{value}': expected one of {expected}")]
    InvalidValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("token balance exhausted: run 'spoon tokens add <n>'")]
    TokensExhausted,

    #[error("nothing to run for '{0}'")]
    EmptyPlan(String),

    #[error("translation failed: {0}")]
    Translation(String),

    #[error("remote state error: {0}")]
    Remote(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("home directory not found: set HOME environment variable")]
    HomeNotFound,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SpoonError>;
