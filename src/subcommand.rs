//! Subcommand module
//!
//! This module contains subcommands.
//! Each subcommand is implemented as a function that runs its external
//! commands in order and stops at the first failure.
use crate::config::{self, ChaliceConfig};
use crate::fs;
use crate::identity::AwsIdentity;
use crate::layout::{Project, S3Location};
use crate::process::{Invocation, ProcessRunner};
use crate::template;
use anyhow::{Context as _, Result};
use chrono::Local;
use log::{debug, info, warn};
use std::path::Path;

const CAPABILITIES: [&str; 2] = ["CAPABILITY_IAM", "CAPABILITY_NAMED_IAM"];

fn path_arg<P>(path: P) -> String
where
    P: AsRef<Path>,
{
    path.as_ref().to_string_lossy().into_owned()
}

fn load_project_config(project: &Project, stage: &str) -> Result<ChaliceConfig> {
    let path = project.config_path();
    debug!("Loading config from {}", path.display());
    let config = config::load_config(&path)?;
    if !config.has_stage(stage) {
        warn!("Stage {} is not defined in config, using global settings.", stage);
    }
    Ok(config)
}

/// Deploy a Chalice project as a CloudFormation stack.
///
/// # Arguments
/// * `project` - Chalice project
/// * `runner` - Runs the external commands
/// * `stage` - Chalice stage
/// * `profile` - AWS CLI profile passed to every external command
/// * `merge_template` - Template merged by `chalice package`
///
/// # Example
/// ```sh
/// $ chalice-shrubbery deploy --stage dev --profile prod
/// ```
pub fn deploy(
    project: &Project,
    runner: &dyn ProcessRunner,
    stage: &str,
    profile: Option<&str>,
    merge_template: Option<&Path>,
) -> Result<()> {
    let config = load_project_config(project, stage)?;
    let stack_name = config.stack_name(stage)?;
    let bucket = config.bucket_name(stage, &AwsIdentity::new(runner, profile))?;
    let location = S3Location::new(&bucket, &stack_name, stage, Local::now());
    info!("Deploying stack {} for stage {} via s3://{}", stack_name, stage, bucket);

    let output_dir = project.output_dir(stage);
    if let Some(parent) = output_dir.parent() {
        fs::ensure_dir(parent)?;
    }
    let sam_template = project.sam_template(stage);
    let packaged_template = project.packaged_template(stage);

    let mut chalice_package =
        Invocation::new("Using chalice to create deployment package template...", "chalice")
            .args(["package", "--stage", stage]);
    if let Some(merge_template) = merge_template {
        chalice_package = chalice_package
            .arg("--merge-template")
            .arg(path_arg(merge_template));
    }
    runner.run(
        &chalice_package
            .arg(path_arg(&output_dir))
            .profile(profile)
            .current_dir(project.root()),
    )?;

    info!("Rewriting {}", sam_template.display());
    let mut doc = template::load_template(&sam_template)?;
    template::transform(&mut doc, &stack_name, config.validation())
        .with_context(|| format!("Can not rewrite {}", sam_template.display()))?;
    template::save_template(&sam_template, &doc)?;

    runner.run(
        &Invocation::new(
            "Running cloud formation package on deployment template...",
            "aws",
        )
        .args(["cloudformation", "package", "--template-file"])
        .arg(path_arg(&sam_template))
        .arg("--s3-bucket")
        .arg(&location.bucket)
        .arg("--s3-prefix")
        .arg(&location.prefix)
        .arg("--output-template-file")
        .arg(path_arg(&packaged_template))
        .arg("--use-json")
        .profile(profile)
        .current_dir(project.root()),
    )?;

    runner.run(
        &Invocation::new("Uploading cloud formation package to S3...", "aws")
            .args(["s3", "cp"])
            .arg(path_arg(&packaged_template))
            .arg(location.template_uri()?.as_str())
            .profile(profile)
            .current_dir(project.root()),
    )?;

    runner.run(
        &Invocation::new("Deploying cloud formation change set...", "aws")
            .args(["cloudformation", "deploy", "--template-file"])
            .arg(path_arg(&packaged_template))
            .arg("--stack-name")
            .arg(&stack_name)
            .arg("--capabilities")
            .args(CAPABILITIES)
            .profile(profile)
            .current_dir(project.root()),
    )?;

    Ok(())
}

/// Delete the CloudFormation stack of a stage.
///
/// # Example
/// ```sh
/// $ chalice-shrubbery delete --stage dev
/// ```
pub fn delete(
    project: &Project,
    runner: &dyn ProcessRunner,
    stage: &str,
    profile: Option<&str>,
) -> Result<()> {
    let stack_name = load_project_config(project, stage)?.stack_name(stage)?;

    runner.run(
        &Invocation::new("Deleting cloud formation stack...", "aws")
            .args(["cloudformation", "delete-stack", "--stack-name"])
            .arg(&stack_name)
            .profile(profile)
            .current_dir(project.root()),
    )?;
    Ok(())
}

/// Describe the CloudFormation stack of a stage.
/// Returns the output of `aws cloudformation describe-stacks`.
///
/// # Example
/// ```sh
/// $ chalice-shrubbery describe --stage dev
/// ```
pub fn describe(
    project: &Project,
    runner: &dyn ProcessRunner,
    stage: &str,
    profile: Option<&str>,
) -> Result<String> {
    let stack_name = load_project_config(project, stage)?.stack_name(stage)?;

    Ok(runner.run(
        &Invocation::new("Describing cloud formation stack...", "aws")
            .args(["cloudformation", "describe-stacks", "--stack-name"])
            .arg(&stack_name)
            .profile(profile)
            .current_dir(project.root()),
    )?)
}
