//! Console rendering of tournament progress events.

use console::{style, Emoji};

use arena_tournament::ArenaEvent;

static ARENA: Emoji<'_, '_> = Emoji("🏟️  ", "");
static BALLOT: Emoji<'_, '_> = Emoji("🗳️  ", "");
static DICE: Emoji<'_, '_> = Emoji("🎲 ", "(random) ");
static SKULL: Emoji<'_, '_> = Emoji("💀 ", "x ");
static SEEDLING: Emoji<'_, '_> = Emoji("🌱 ", "+ ");
static WARNING: Emoji<'_, '_> = Emoji("⚠️  ", "! ");

const PREVIEW_CHARS: usize = 160;

/// Turns [`ArenaEvent`]s into console lines.
#[derive(Debug, Clone, Default)]
pub struct EventRenderer {
    /// Print full responses and vote reasoning instead of previews.
    pub verbose: bool,
}

impl EventRenderer {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// The text for one event, `None` for events that print nothing.
    pub fn render(&self, event: &ArenaEvent) -> Option<String> {
        let text = match event {
            ArenaEvent::TournamentStarted {
                resumed,
                round,
                contestants,
            } => {
                let how = if *resumed {
                    format!("Resuming after round {round}")
                } else {
                    "Starting a new tournament".to_string()
                };
                format!(
                    "{ARENA}{} with {contestants} contestants",
                    style(how).bold()
                )
            }
            ArenaEvent::RoundStarted { round, question } => format!(
                "\n{}\n{} {question}",
                style(format!("=== Round {round} ===")).cyan().bold(),
                style("Question:").bold()
            ),
            ArenaEvent::ResponseReceived {
                contestant_name,
                model,
                content,
                ..
            } => format!(
                "\n{} {}\n{}",
                style(contestant_name).bold(),
                style(format!("[{model}]")).dim(),
                self.preview(content)
            ),
            ArenaEvent::VoteCast {
                voter_name,
                target_name,
                reasoning,
                fallback,
                ..
            } => {
                let marker = if *fallback { &DICE } else { &BALLOT };
                let mut line = format!("{marker}{voter_name} -> {}", style(target_name).green());
                if let Some(reasoning) = reasoning.as_deref().filter(|r| !r.is_empty()) {
                    line.push_str(&format!(
                        " {}",
                        style(format!("({})", self.preview(reasoning))).dim()
                    ));
                }
                line
            }
            ArenaEvent::Tally { round, standings } => {
                let heading = style(format!("Standings after round {round}")).bold();
                let mut text = format!("\n{heading}");
                for standing in standings {
                    let c = &standing.contestant;
                    text.push_str(&format!(
                        "\n  {:>2}. {} {} total, drought {}",
                        standing.rank,
                        style(&c.name).bold(),
                        c.total_votes_received,
                        c.drought
                    ));
                }
                text
            }
            ArenaEvent::DroughtWarning {
                contestant_name,
                drought,
                limit,
            } => format!(
                "{WARNING}{}",
                style(format!(
                    "{contestant_name} has gone {drought} of {limit} rounds without a vote"
                ))
                .yellow()
            ),
            ArenaEvent::Eliminated { record } => format!(
                "{SKULL}{} {}",
                style(format!("{} eliminated", record.contestant_name)).red().bold(),
                style(format!(
                    "(survived {} rounds, {} votes)",
                    record.rounds_survived, record.total_votes_received
                ))
                .dim()
            ),
            ArenaEvent::ReplacementCreated {
                name,
                model,
                generation,
                strategy_notes,
                ..
            } => {
                let mut line = format!(
                    "{SEEDLING}{} enters on {model} (generation {generation})",
                    style(name).green().bold()
                );
                if self.verbose && !strategy_notes.is_empty() {
                    line.push_str(&format!("\n   {}", style(strategy_notes).dim()));
                }
                line
            }
            ArenaEvent::RoundComplete { .. } => return None,
            ArenaEvent::TournamentComplete { rounds_played } => format!(
                "\n{}",
                style(format!("Tournament stopped after round {rounds_played}")).bold()
            ),
        };
        Some(text)
    }

    fn preview(&self, text: &str) -> String {
        let text = text.trim();
        if self.verbose || text.chars().count() <= PREVIEW_CHARS {
            return text.to_string();
        }
        let kept: String = text.chars().take(PREVIEW_CHARS).collect();
        format!("{}...", kept.trim_end())
    }
}
