//! Error types shared by the resolver, the template transformer and the
//! process collaborators.
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShrubberyError {
    /// A required configuration key is absent and no fallback resolves.
    #[error("missing configuration field `{field}` for stage `{stage}`")]
    MissingField { field: String, stage: String },

    /// The account identity could not be resolved.
    #[error("identity lookup failed: {0}")]
    UpstreamUnavailable(String),

    /// The generated template lacks an expected structural path.
    #[error("malformed template at `{path}`: {reason}")]
    MalformedTemplate { path: String, reason: String },

    /// An external command could not be started or exited non-zero.
    #[error("`{command}` failed ({status}){}", format_output(.output))]
    ExternalProcessFailure {
        command: String,
        status: String,
        output: String,
    },
}

fn format_output(output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        String::new()
    } else {
        format!("\n{}", output)
    }
}

impl ShrubberyError {
    pub(crate) fn malformed<P, R>(path: P, reason: R) -> Self
    where
        P: Into<String>,
        R: Into<String>,
    {
        ShrubberyError::MalformedTemplate {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
