//! `arena personas`: the persona store, living and dead.

use std::fmt::Write as _;

use clap::Parser;
use console::style;
use serde::Serialize;

use arena_tournament::store::FilePersonaStore;
use arena_tournament::{Persona, PersonaId, PersonaStore};

use crate::cli::CommandContext;
use crate::error::CliError;
use crate::output::{print_output, Alignment, Column, FormattedOutput, Table};

/// List personas, alive and eliminated
#[derive(Debug, Parser)]
pub struct PersonasCommand {
    /// Show a single persona in full
    pub id: Option<String>,

    /// Only personas that have not been eliminated
    #[arg(long, conflicts_with = "id")]
    pub alive: bool,
}

impl PersonasCommand {
    pub fn execute(&self, ctx: &CommandContext) -> Result<(), CliError> {
        let store = FilePersonaStore::new(ctx.config.paths.personalities_dir());

        if let Some(raw) = &self.id {
            let persona = PersonaId::parse(raw)
                .ok()
                .map(|id| store.get(&id))
                .transpose()?
                .flatten()
                .ok_or_else(|| {
                    CliError::user_with_hint(
                        format!("No persona with id `{raw}`"),
                        "Run `arena personas` to list the known ids",
                    )
                })?;
            return print_output(ctx, &PersonaDetail(persona));
        }

        let mut personas = store.list_all()?;
        if self.alive {
            personas.retain(Persona::is_alive);
        }
        personas.sort_by(|a, b| a.born_round.cmp(&b.born_round).then_with(|| a.id.cmp(&b.id)));
        print_output(ctx, &PersonaList(personas))
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct PersonaList(pub Vec<Persona>);

impl FormattedOutput for PersonaList {
    fn format_text(&self) -> String {
        if self.0.is_empty() {
            return "No personas found.".to_string();
        }

        let mut table = Table::new(vec![
            Column::new("Id"),
            Column::new("Name").max_width(28),
            Column::new("Gen").align(Alignment::Right),
            Column::new("Born").align(Alignment::Right),
            Column::new("Died").align(Alignment::Right),
            Column::new("Model"),
        ]);
        for persona in &self.0 {
            table.add_row(vec![
                persona.id.to_string(),
                persona.name.clone(),
                persona.generation.to_string(),
                persona.born_round.to_string(),
                persona.died_round.map_or_else(|| "-".to_string(), |r| r.to_string()),
                persona.model.clone().unwrap_or_else(|| "-".to_string()),
            ]);
        }
        table.render()
    }
}

#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct PersonaDetail(pub Persona);

impl FormattedOutput for PersonaDetail {
    fn format_text(&self) -> String {
        let p = &self.0;
        let mut out = String::new();
        let _ = writeln!(out, "{} ({})", style(&p.name).bold(), p.id);

        let status = match p.died_round {
            Some(round) => format!("eliminated in round {round}"),
            None => "alive".to_string(),
        };
        let _ = writeln!(
            out,
            "  generation {}, born in round {}, {status}",
            p.generation, p.born_round
        );
        if let Some(parent) = &p.parent_id {
            let _ = writeln!(out, "  parent {parent}");
        }
        if let Some(model) = &p.model {
            let _ = writeln!(out, "  model {model}");
        }
        let _ = writeln!(out, "\n{}\n{}", style("Persona").bold(), p.traits);
        let _ = writeln!(out, "\n{}\n{}", style("Voting criteria").bold(), p.voting_criteria);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arena_tournament::testing::starter_personas;

    #[test]
    fn test_list_marks_the_dead() {
        console::set_colors_enabled(false);
        let mut personas = starter_personas(2);
        personas[1].died_round = Some(3);
        personas[0].model = Some("qwen3:8b".into());

        let text = PersonaList(personas).format_text();
        let rows: Vec<&str> = text.lines().skip(2).collect();
        assert!(rows[0].starts_with("starter-01"));
        assert!(rows[0].ends_with("qwen3:8b"));
        assert!(rows[1].contains(" 3 "));
    }

    #[test]
    fn test_detail_shows_lineage_and_criteria() {
        console::set_colors_enabled(false);
        let mut persona = starter_personas(1).remove(0).generation(2);
        persona.parent_id = Some(PersonaId::generated(1));

        let text = PersonaDetail(persona).format_text();
        assert!(text.starts_with("Starter 1 (starter-01)"));
        assert!(text.contains("generation 2, born in round 0, alive"));
        assert!(text.contains("parent gen-1"));
        assert!(text.contains("Votes for the most convincing answer."));
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(PersonaList(Vec::new()).format_text(), "No personas found.");
    }
}
