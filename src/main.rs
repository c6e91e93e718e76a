use anyhow::Result;
use chalice_shrubbery::layout::Project;
use chalice_shrubbery::process::SystemRunner;
use chalice_shrubbery::subcommand;
use clap::{Args as ClapArgs, Parser, Subcommand};
use simplelog::{ColorChoice, ConfigBuilder, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[clap(
    name = env!("CARGO_PKG_NAME"),
    version = env!("CARGO_PKG_VERSION"),
    about = env!("CARGO_PKG_DESCRIPTION"),
    arg_required_else_help = true,
)]
struct Args {
    /// Chalice project directory.
    #[clap(short = 'C', long, global = true, default_value = ".")]
    project_dir: PathBuf,

    /// Print errors only.
    #[clap(short, long, conflicts_with_all = ["verbose", "trace"])]
    quiet: bool,

    /// Print the output of external commands.
    #[clap(short, long, conflicts_with = "trace")]
    verbose: bool,

    /// Print everything.
    #[clap(short, long)]
    trace: bool,

    #[clap(subcommand)]
    subcommand: SubCommands,
}

#[derive(Debug, ClapArgs)]
struct Target {
    /// Specify the Chalice stage to operate upon
    #[clap(long, required = true)]
    stage: String,

    /// Provide the name of an AWS CLI profile to use for operations
    #[clap(long)]
    profile: Option<String>,
}

#[derive(Debug, Subcommand)]
enum SubCommands {
    /// Deploy a Chalice project to AWS using CloudFormation.
    Deploy {
        #[clap(flatten)]
        target: Target,

        /// Template merged into the one generated by chalice package.
        #[clap(long)]
        merge_template: Option<PathBuf>,
    },
    /// Delete a deployed Chalice project CloudFormation stack.
    Delete {
        #[clap(flatten)]
        target: Target,
    },
    /// Describe an existing Chalice project CloudFormation stack.
    Describe {
        #[clap(flatten)]
        target: Target,
    },
}

impl Args {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else if self.trace {
            LevelFilter::Trace
        } else {
            LevelFilter::Info
        }
    }
}

fn init_logger(level: LevelFilter) {
    let config = ConfigBuilder::new()
        .set_time_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .set_thread_level(LevelFilter::Off)
        .build();
    TermLogger::init(level, config, TerminalMode::Stderr, ColorChoice::Auto).unwrap_or_else(drop);
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logger(args.log_level());

    let project = Project::new(&args.project_dir)?;
    let runner = SystemRunner;

    match args.subcommand {
        SubCommands::Deploy {
            target,
            merge_template,
        } => subcommand::deploy(
            &project,
            &runner,
            &target.stage,
            target.profile.as_deref(),
            merge_template.as_deref(),
        ),
        SubCommands::Delete { target } => {
            subcommand::delete(&project, &runner, &target.stage, target.profile.as_deref())
        }
        SubCommands::Describe { target } => {
            let output =
                subcommand::describe(&project, &runner, &target.stage, target.profile.as_deref())?;
            print!("{}", output);
            Ok(())
        }
    }
}
