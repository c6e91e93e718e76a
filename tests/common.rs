#![cfg(unix)]
#![allow(dead_code)]

use anyhow::Result;
use assert_cmd::Command;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use indoc::indoc;
use serde_json::Value;
use std::os::unix::fs::PermissionsExt;

const FAKE_CHALICE: &str = indoc! {r#"
    #!/bin/sh
    echo "chalice $* profile=${AWS_PROFILE:-}" >> "$FAKE_LOG"
    pwd > "$FAKE_LOG.cwd"
    for last; do :; done
    mkdir -p "$last"
    cp "$FAKE_SAM" "$last/sam.json"
    echo "Creating deployment package."
"#};

const FAKE_AWS: &str = indoc! {r#"
    #!/bin/sh
    echo "aws $* profile=${AWS_PROFILE:-}" >> "$FAKE_LOG"
    command="$1 $2"
    while [ $# -gt 0 ]; do
        case "$1" in
            --template-file) src="$2" ;;
            --output-template-file) dst="$2" ;;
        esac
        shift
    done
    case "$command" in
        "sts get-caller-identity") echo "123456789012" ;;
        "cloudformation package") cp "$src" "$dst"; echo "Successfully packaged artifacts" ;;
        "cloudformation describe-stacks") echo "CREATE_COMPLETE" ;;
        "cloudformation deploy")
            if [ -n "$FAKE_DEPLOY_FAIL" ]; then
                echo "No changes to deploy" >&2
                exit 255
            fi
            echo "Successfully created/updated stack"
            ;;
    esac
"#};

pub struct Fixture {
    pub temp: TempDir,
    pub project: ChildPath,
    pub log: ChildPath,
    bin: ChildPath,
    sam: ChildPath,
}

fn install(bin: &ChildPath, name: &str, script: &str) -> Result<()> {
    let tool = bin.child(name);
    tool.write_str(script)?;
    std::fs::set_permissions(tool.path(), std::fs::Permissions::from_mode(0o755))?;
    Ok(())
}

pub fn setup(config: &Value, sam: &Value) -> Result<Fixture> {
    let temp = TempDir::new()?;
    let project = temp.child("project");
    project
        .child(".chalice/config.json")
        .write_str(&serde_json::to_string_pretty(config)?)?;

    let bin = temp.child("bin");
    bin.create_dir_all()?;
    install(&bin, "chalice", FAKE_CHALICE)?;
    install(&bin, "aws", FAKE_AWS)?;

    let sam_file = temp.child("generated-sam.json");
    sam_file.write_str(&serde_json::to_string(sam)?)?;

    let log = temp.child("calls.log");
    log.touch()?;

    Ok(Fixture {
        temp,
        project,
        log,
        bin,
        sam: sam_file,
    })
}

impl Fixture {
    pub fn cmd(&self) -> Result<Command> {
        let path = std::env::var_os("PATH").unwrap_or_default();
        let mut paths = vec![self.bin.path().to_path_buf()];
        paths.extend(std::env::split_paths(&path));

        let mut cmd = Command::cargo_bin("chalice-shrubbery")?;
        cmd.env("PATH", std::env::join_paths(paths)?)
            .env("FAKE_LOG", self.log.path())
            .env("FAKE_SAM", self.sam.path())
            .env_remove("AWS_PROFILE")
            .env_remove("FAKE_DEPLOY_FAIL")
            .arg("--project-dir")
            .arg(self.project.path());
        Ok(cmd)
    }

    pub fn calls(&self) -> Result<Vec<String>> {
        Ok(std::fs::read_to_string(self.log.path())?
            .lines()
            .map(str::to_string)
            .collect())
    }

    /// Working directory `chalice` last ran in.
    pub fn chalice_cwd(&self) -> Result<std::path::PathBuf> {
        let cwd = std::fs::read_to_string(format!("{}.cwd", self.log.path().display()))?;
        Ok(std::fs::canonicalize(cwd.trim_end())?)
    }

    pub fn output_dir(&self, stage: &str) -> ChildPath {
        self.project
            .child(".chalice/deployments/shrubbery")
            .child(stage)
    }
}
