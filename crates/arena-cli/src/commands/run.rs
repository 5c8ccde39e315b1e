//! `arena run`: start or resume the tournament.

use std::path::PathBuf;

use clap::{Parser, ValueHint};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};

use arena_common_fs::read_to_string;
use arena_tournament::{Arena, ArenaStores, GatewayFactory, QueuedQuestions};

use crate::cli::{CommandContext, OutputFormat};
use crate::commands::SummaryReport;
use crate::error::CliError;
use crate::output::{print_output, EventRenderer};
use crate::questions::PromptingQuestions;

const MAX_QUESTION_FILE_BYTES: u64 = 1024 * 1024;

/// Start or resume the tournament
#[derive(Debug, Parser)]
pub struct RunCommand {
    /// File with one question per line, asked in order
    #[arg(short = 'Q', long, value_hint = ValueHint::FilePath)]
    pub questions: Option<PathBuf>,

    /// Total rounds to reach, counting rounds already played
    #[arg(short, long)]
    pub rounds: Option<u32>,

    /// Seed for model assignment and fallback votes
    #[arg(long, env = "ARENA_SEED")]
    pub seed: Option<u64>,

    /// Stop when the question file runs out instead of prompting on stdin
    #[arg(long)]
    pub no_prompt: bool,

    /// Print full responses and persona strategy notes
    #[arg(long)]
    pub full: bool,
}

impl RunCommand {
    pub async fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let mut config = ctx.config.clone();
        if let Some(rounds) = self.rounds {
            if rounds == 0 {
                return Err(CliError::user_with_hint(
                    "--rounds must be greater than 0",
                    "Omit --rounds to use tournament.total_rounds from the config",
                ));
            }
            config.tournament.total_rounds = rounds;
        }
        if self.seed.is_some() {
            config.tournament.seed = self.seed;
        }

        let queued = match &self.questions {
            Some(path) => {
                QueuedQuestions::from_lines(&read_to_string(path, MAX_QUESTION_FILE_BYTES)?)
            }
            None => QueuedQuestions::default(),
        };
        if self.no_prompt && queued.remaining() == 0 {
            return Err(CliError::user_with_hint(
                "No questions to ask",
                "Pass --questions <file> or drop --no-prompt to type questions",
            ));
        }
        info!(
            queued = queued.remaining(),
            total_rounds = config.tournament.total_rounds,
            "starting arena"
        );

        let gateway = GatewayFactory::create(&config.backend)?;
        let mut arena = Arena::new(&config, gateway, ArenaStores::files(&config.paths));

        let printer = (ctx.format == OutputFormat::Text && !ctx.quiet).then(|| {
            let renderer = EventRenderer::new(self.full);
            let mut events = arena.subscribe();
            tokio::spawn(async move {
                loop {
                    match events.recv().await {
                        Ok(event) => {
                            if let Some(text) = renderer.render(&event) {
                                println!("{text}");
                            }
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "event display fell behind");
                        }
                        Err(RecvError::Closed) => break,
                    }
                }
            })
        });

        let mut questions = PromptingQuestions::stdin(queued, !self.no_prompt);
        let result = arena.run(&mut questions).await;

        // closes the event channel so the printer drains and stops
        drop(arena);
        if let Some(printer) = printer {
            if let Err(e) = printer.await {
                warn!(error = %e, "event display task failed");
            }
        }

        let summary = result?;
        if ctx.format == OutputFormat::Text && !ctx.quiet {
            println!();
        }
        print_output(
            ctx,
            &SummaryReport {
                total_rounds: config.tournament.total_rounds,
                summary: Some(summary),
                show_history: true,
            },
        )
    }
}
