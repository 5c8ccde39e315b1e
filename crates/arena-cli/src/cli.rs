//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

use arena_common_config::{ArenaConfig, ConfigLoader};

use crate::commands::{PersonasCommand, RunCommand, StatusCommand};
use crate::error::CliError;

/// Arena - a debate tournament among model-backed personas
///
/// Contestants answer a shared question every round and vote for each
/// other's answers. Whoever goes too long without a vote is replaced.
#[derive(Debug, Parser)]
#[command(
    name = "arena",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress output and lower logging to errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Project directory holding `.arena/`, `data/` and `logs/`
    #[arg(
        short = 'C',
        long,
        global = true,
        default_value = ".",
        value_hint = ValueHint::DirPath
    )]
    pub project_dir: PathBuf,

    /// Path to configuration file (defaults to `<project>/.arena/config.yaml`)
    #[arg(
        short,
        long,
        global = true,
        env = "ARENA_CONFIG",
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "text", value_enum)]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start or resume the tournament
    Run(RunCommand),

    /// Show standings and the elimination history
    Status(StatusCommand),

    /// List personas, alive and eliminated
    Personas(PersonasCommand),

    /// Generate shell completions
    #[command(hide = true)]
    Completions(CompletionsCommand),
}

/// Shell completions generation
#[derive(Debug, Parser)]
pub struct CompletionsCommand {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: clap_complete::Shell,
}

impl CompletionsCommand {
    pub fn execute(&self) -> Result<(), CliError> {
        use clap::CommandFactory;
        use clap_complete::generate;

        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(self.shell, &mut cmd, name, &mut std::io::stdout());
        Ok(())
    }
}

impl Cli {
    /// Load the project configuration, apply environment overrides and
    /// resolve data paths against the project directory.
    pub fn load_config(&self) -> Result<ArenaConfig, CliError> {
        let loader = ConfigLoader::new(&self.project_dir);
        let mut config = match &self.config {
            Some(path) => loader.load_file(path)?,
            None => loader.load()?,
        };
        config.apply_env_overrides();
        config.paths = config.paths.resolved(loader.base_path());
        Ok(config)
    }

    /// Execute the selected command
    pub async fn execute(self) -> Result<(), CliError> {
        let ctx = match &self.command {
            Command::Completions(cmd) => return cmd.execute(),
            _ => CommandContext {
                config: self.load_config()?,
                format: self.format,
                verbose: self.verbose,
                quiet: self.quiet,
            },
        };

        match self.command {
            Command::Run(cmd) => cmd.execute(&ctx).await,
            Command::Status(cmd) => cmd.execute(&ctx),
            Command::Personas(cmd) => cmd.execute(&ctx),
            Command::Completions(cmd) => cmd.execute(),
        }
    }
}

/// Context passed to all commands
#[derive(Debug)]
pub struct CommandContext {
    pub config: ArenaConfig,
    pub format: OutputFormat,
    pub verbose: u8,
    pub quiet: bool,
}
