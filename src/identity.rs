//! Account identity resolution, used only to derive the default bucket name.
use crate::error::ShrubberyError;
use crate::process::{Invocation, ProcessRunner};

pub trait IdentityLookup {
    fn account_id(&self) -> Result<String, ShrubberyError>;
}

/// Asks `aws sts get-caller-identity` for the account of the active profile.
pub struct AwsIdentity<'a> {
    runner: &'a dyn ProcessRunner,
    profile: Option<&'a str>,
}

impl<'a> AwsIdentity<'a> {
    pub fn new(runner: &'a dyn ProcessRunner, profile: Option<&'a str>) -> Self {
        Self { runner, profile }
    }

    fn invocation(&self) -> Invocation {
        Invocation::new("Looking up AWS account id...", "aws")
            .args([
                "sts",
                "get-caller-identity",
                "--query",
                "Account",
                "--output",
                "text",
            ])
            .profile(self.profile)
    }
}

impl IdentityLookup for AwsIdentity<'_> {
    fn account_id(&self) -> Result<String, ShrubberyError> {
        let output = self
            .runner
            .run(&self.invocation())
            .map_err(|e| ShrubberyError::UpstreamUnavailable(e.to_string()))?;

        let account_id = output.trim();
        if account_id.is_empty() || account_id == "None" {
            return Err(ShrubberyError::UpstreamUnavailable(
                "get-caller-identity returned no account".to_string(),
            ));
        }
        Ok(account_id.to_string())
    }
}
