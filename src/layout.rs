//! Where things live: files under the Chalice project directory and the S3
//! location a deployment is uploaded to.
use crate::fs;
use anyhow::{Context as _, Result};
use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};
use url::Url;

pub const CHALICE_DIR: &str = ".chalice";
pub const CONFIG_FILE: &str = "config.json";
pub const SAM_TEMPLATE: &str = "sam.json";
pub const PACKAGED_TEMPLATE: &str = "packaged.json";
pub const S3_PREFIX_ROOT: &str = "chalice-shrubbery";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new<P>(root: P) -> Result<Self>
    where
        P: AsRef<Path>,
    {
        Ok(Self {
            root: fs::absolutize(root)?,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `<project>/.chalice/config.json`
    pub fn config_path(&self) -> PathBuf {
        self.root.join(CHALICE_DIR).join(CONFIG_FILE)
    }

    /// `<project>/.chalice/deployments/shrubbery/<stage>`
    pub fn output_dir(&self, stage: &str) -> PathBuf {
        self.root
            .join(CHALICE_DIR)
            .join("deployments")
            .join("shrubbery")
            .join(stage)
    }

    pub fn sam_template(&self, stage: &str) -> PathBuf {
        self.output_dir(stage).join(SAM_TEMPLATE)
    }

    pub fn packaged_template(&self, stage: &str) -> PathBuf {
        self.output_dir(stage).join(PACKAGED_TEMPLATE)
    }
}

/// Upload location of one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    pub bucket: String,
    pub prefix: String,
}

impl S3Location {
    pub fn new(bucket: &str, stack_name: &str, stage: &str, at: DateTime<Local>) -> Self {
        Self {
            bucket: bucket.to_string(),
            prefix: format!(
                "{}/{}/{}/{}",
                S3_PREFIX_ROOT,
                stack_name,
                stage,
                at.format("%Y-%m-%dT%H:%M:%S%.6f")
            ),
        }
    }

    /// `s3://<bucket>/<prefix>/packaged.json`
    pub fn template_uri(&self) -> Result<Url> {
        let uri = format!("s3://{}/{}/{}", self.bucket, self.prefix, PACKAGED_TEMPLATE);
        Url::parse(&uri).with_context(|| format!("Invalid S3 location {}", uri))
    }
}
