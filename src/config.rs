use crate::error::ShrubberyError;
use crate::identity::IdentityLookup;
use anyhow::{ensure, Context as _, Result};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

pub const STACK_NAME_KEY: &str = "shrubbery.stack_name";
pub const S3_BUCKET_KEY: &str = "shrubbery.s3_bucket";

/// Prefix of the bucket name used when no bucket is configured.
pub const DEFAULT_BUCKET_PREFIX: &str = "chalice-shrubbery-";

/// Overrides that may be given either per stage or at the top level.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct Overrides {
    #[serde(rename = "shrubbery.stack_name", skip_serializing_if = "Option::is_none")]
    pub stack_name: Option<String>,
    #[serde(rename = "shrubbery.s3_bucket", skip_serializing_if = "Option::is_none")]
    pub s3_bucket: Option<String>,
}

/// Path -> method -> parameter list.
pub type ValidationParameters = IndexMap<String, IndexMap<String, Vec<Value>>>;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Replaces the generated definitions when given; absent keeps them.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definitions: Option<Map<String, Value>>,
    #[serde(default)]
    pub parameters: ValidationParameters,
}

/// The parts of `.chalice/config.json` this tool reads. Every other Chalice
/// key is ignored.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChaliceConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_name: Option<String>,
    #[serde(default)]
    pub stages: BTreeMap<String, Overrides>,
    #[serde(flatten)]
    pub global: Overrides,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationConfig>,
}

impl ChaliceConfig {
    /// Whether `stage` has its own entry under `stages`.
    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages.contains_key(stage)
    }

    fn stage_overrides(&self, stage: &str) -> Option<&Overrides> {
        self.stages.get(stage)
    }

    /// Stage override, then global override, then `app_name`.
    pub fn stack_name(&self, stage: &str) -> Result<String, ShrubberyError> {
        self.stage_overrides(stage)
            .and_then(|o| o.stack_name.clone())
            .or_else(|| self.global.stack_name.clone())
            .or_else(|| self.app_name.clone())
            .ok_or_else(|| ShrubberyError::MissingField {
                field: format!("{} or app_name", STACK_NAME_KEY),
                stage: stage.to_string(),
            })
    }

    /// Stage override, then global override, then
    /// `chalice-shrubbery-<account-id>`. The identity is only looked up when
    /// neither override is set.
    pub fn bucket_name(
        &self,
        stage: &str,
        identity: &dyn IdentityLookup,
    ) -> Result<String, ShrubberyError> {
        if let Some(bucket) = self
            .stage_overrides(stage)
            .and_then(|o| o.s3_bucket.clone())
            .or_else(|| self.global.s3_bucket.clone())
        {
            return Ok(bucket);
        }

        debug!("No {} configured, deriving bucket from account id.", S3_BUCKET_KEY);
        let account_id = identity.account_id()?;
        Ok(format!("{}{}", DEFAULT_BUCKET_PREFIX, account_id))
    }

    pub fn validation(&self) -> Option<&ValidationConfig> {
        self.validation.as_ref()
    }
}

pub fn load_config<P>(path: P) -> Result<ChaliceConfig>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    ensure!(path.exists(), "{} does not exist.", path.display());
    ensure!(path.is_file(), "{} is not a file.", path.display());

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Can not read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Can not parse {}", path.display()))
}
