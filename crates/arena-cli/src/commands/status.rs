//! `arena status`: standings and eliminations from the persisted state.

use std::fmt::Write as _;

use clap::Parser;
use serde::Serialize;

use arena_tournament::store::FileStateStore;
use arena_tournament::{StateStore, TournamentSummary};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, Alignment, Column, FormattedOutput, Table};

/// Show standings and the elimination history
#[derive(Debug, Parser)]
pub struct StatusCommand {
    /// Hide the elimination history
    #[arg(long)]
    pub no_history: bool,
}

impl StatusCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let store = FileStateStore::new(ctx.config.paths.state_file());
        let summary = store.load()?.filter(|s| !s.is_empty()).map(|s| s.summary());

        let report = SummaryReport {
            total_rounds: ctx.config.tournament.total_rounds,
            summary,
            show_history: !self.no_history,
        };
        print_output(ctx, &report)
    }
}

/// Standings plus elimination history, or a notice when nothing ran yet.
#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub total_rounds: u32,
    #[serde(flatten)]
    pub summary: Option<TournamentSummary>,
    #[serde(skip)]
    pub show_history: bool,
}

impl FormattedOutput for SummaryReport {
    fn format_text(&self) -> String {
        let Some(summary) = &self.summary else {
            return "No tournament in progress. Start one with `arena run`.".to_string();
        };

        let mut out = String::new();
        let _ = writeln!(
            out,
            "Round {} of {}\n",
            summary.rounds_played, self.total_rounds
        );

        let mut standings = Table::new(vec![
            Column::new("#").align(Alignment::Right),
            Column::new("Name").max_width(28),
            Column::new("Id"),
            Column::new("Model"),
            Column::new("Gen").align(Alignment::Right),
            Column::new("Votes").align(Alignment::Right),
            Column::new("Drought").align(Alignment::Right),
            Column::new("Rounds").align(Alignment::Right),
        ]);
        for standing in &summary.survivors {
            let c = &standing.contestant;
            standings.add_row(vec![
                standing.rank.to_string(),
                c.name.clone(),
                c.id.to_string(),
                c.model.clone(),
                c.generation.to_string(),
                c.total_votes_received.to_string(),
                c.drought.to_string(),
                c.rounds_participated.to_string(),
            ]);
        }
        out.push_str(&standings.render());

        if self.show_history && !summary.eliminations.is_empty() {
            let _ = writeln!(out, "\nEliminated ({})\n", summary.eliminations.len());
            let mut history = Table::new(vec![
                Column::new("Round").align(Alignment::Right),
                Column::new("Name").max_width(28),
                Column::new("Id"),
                Column::new("Model"),
                Column::new("Gen").align(Alignment::Right),
                Column::new("Survived").align(Alignment::Right),
                Column::new("Votes").align(Alignment::Right),
            ]);
            for record in &summary.eliminations {
                history.add_row(vec![
                    record.eliminated_round.to_string(),
                    record.contestant_name.clone(),
                    record.contestant_id.to_string(),
                    record.model.clone(),
                    record.generation.to_string(),
                    record.rounds_survived.to_string(),
                    record.total_votes_received.to_string(),
                ]);
            }
            out.push_str(&history.render());
        }
        out
    }
}
