//! External command invocation.
//!
//! Every call blocks until the child exits. A non-zero exit is reported as
//! [`ShrubberyError::ExternalProcessFailure`] and aborts the caller's pipeline.
use crate::error::ShrubberyError;
use itertools::Itertools;
use log::{debug, info, trace};
use nu_ansi_term::Color::Cyan;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Environment variable carrying the credential profile to the child process.
pub const PROFILE_ENV: &str = "AWS_PROFILE";

/// One external command to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub label: String,
    pub program: String,
    pub args: Vec<String>,
    pub profile: Option<String>,
    pub current_dir: Option<PathBuf>,
}

impl Invocation {
    pub fn new<L, P>(label: L, program: P) -> Self
    where
        L: Into<String>,
        P: Into<String>,
    {
        Self {
            label: label.into(),
            program: program.into(),
            args: Vec::new(),
            profile: None,
            current_dir: None,
        }
    }

    pub fn arg<S>(mut self, arg: S) -> Self
    where
        S: Into<String>,
    {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Scope a credential profile to this invocation only.
    pub fn profile(mut self, profile: Option<&str>) -> Self {
        self.profile = profile.map(str::to_string);
        self
    }

    /// Run the child in `dir` instead of the caller's working directory.
    pub fn current_dir<P>(mut self, dir: P) -> Self
    where
        P: AsRef<Path>,
    {
        self.current_dir = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn command_line(&self) -> String {
        std::iter::once(&self.program).chain(&self.args).join(" ")
    }
}

pub trait ProcessRunner {
    /// Run the invocation to completion and return its standard output.
    fn run(&self, invocation: &Invocation) -> Result<String, ShrubberyError>;
}

/// Runs invocations as real child processes.
#[derive(Debug, Default)]
pub struct SystemRunner;

impl SystemRunner {
    fn command(invocation: &Invocation) -> Command {
        let mut command = Command::new(&invocation.program);
        command.args(&invocation.args);
        if let Some(profile) = &invocation.profile {
            command.env(PROFILE_ENV, profile);
        }
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }
        command
    }
}

impl ProcessRunner for SystemRunner {
    fn run(&self, invocation: &Invocation) -> Result<String, ShrubberyError> {
        info!("{}", Cyan.bold().paint(invocation.label.as_str()));
        info!("{}", invocation.command_line());
        if let Some(dir) = &invocation.current_dir {
            trace!("cwd={}", dir.display());
        }
        if let Some(profile) = &invocation.profile {
            trace!("{}={}", PROFILE_ENV, profile);
        }

        let output = Self::command(invocation).output().map_err(|e| {
            ShrubberyError::ExternalProcessFailure {
                command: invocation.command_line(),
                status: "failed to start".to_string(),
                output: e.to_string(),
            }
        })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();

        if !output.status.success() {
            return Err(ShrubberyError::ExternalProcessFailure {
                command: invocation.command_line(),
                status: output.status.to_string(),
                output: format!("{}{}", stdout, stderr),
            });
        }

        if !stdout.trim().is_empty() {
            debug!("{}", stdout.trim_end());
        }
        if !stderr.trim().is_empty() {
            debug!("{}", stderr.trim_end());
        }
        Ok(stdout)
    }
}
