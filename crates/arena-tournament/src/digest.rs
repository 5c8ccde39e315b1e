//! Feedback digest: a bounded FIFO window of formatted round blocks.

use std::collections::VecDeque;

use crate::persona::Contestant;
use crate::round::RoundResult;

/// Header written above the retained blocks.
pub const DIGEST_HEADER: &str = "# Arena Feedback\n\nRecent voting patterns and eliminations.\n\n";

const BLOCK_MARKER: &str = "## Round ";

/// Placeholder used in prompts while the digest is empty.
pub const EMPTY_DIGEST: &str = "(No history yet)";

/// Format one round's block: vote counts for every contestant still active
/// after the round, followed by the full voter to target record.
///
/// Names and the question are flattened to one line each, so a block always
/// parses back as exactly one block.
pub fn format_round_block(result: &RoundResult, contestants: &[Contestant]) -> String {
    let votes = contestants
        .iter()
        .map(|c| format!("{}→{}", single_line(&c.name), result.tally.get(&c.id)))
        .collect::<Vec<_>>()
        .join(", ");

    let record = result
        .votes
        .iter()
        .map(|v| format!("{}→{}", single_line(&v.voter_name), single_line(&v.target_name)))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "{BLOCK_MARKER}{}\nQuestion: {}\nVotes: {}\nVoting record: {}\n",
        result.round_number,
        single_line(&result.question),
        votes,
        record
    )
}

fn single_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Text shown to the models for a digest snapshot.
pub fn prompt_text(digest: &str) -> &str {
    if digest.trim().is_empty() {
        EMPTY_DIGEST
    } else {
        digest
    }
}

/// In-memory form of the digest.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedbackDigest {
    blocks: VecDeque<String>,
}

impl FeedbackDigest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse rendered digest text. Anything before the first block is ignored.
    pub fn parse(text: &str) -> Self {
        let mut blocks = VecDeque::new();
        let mut current: Option<String> = None;

        for line in text.lines() {
            if line.starts_with(BLOCK_MARKER) {
                if let Some(block) = current.take() {
                    blocks.push_back(block);
                }
                current = Some(String::new());
            }
            if let Some(block) = current.as_mut() {
                if !line.trim().is_empty() {
                    block.push_str(line);
                    block.push('\n');
                }
            }
        }
        if let Some(block) = current {
            blocks.push_back(block);
        }

        Self { blocks }
    }

    /// Append a block and keep only the newest `max_blocks`.
    pub fn append_and_trim(&mut self, block: impl Into<String>, max_blocks: usize) {
        let mut block = block.into();
        if !block.ends_with('\n') {
            block.push('\n');
        }
        self.blocks.push_back(block);
        while self.blocks.len() > max_blocks {
            self.blocks.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    pub fn blocks(&self) -> impl Iterator<Item = &str> {
        self.blocks.iter().map(String::as_str)
    }

    pub fn render(&self) -> String {
        let mut out = String::from(DIGEST_HEADER);
        let body = self.blocks.iter().map(String::as_str).collect::<Vec<_>>().join("\n");
        out.push_str(&body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persona::Persona;
    use crate::round::{Vote, VoteTally};
    use arena_common_core::{PersonaId, Timestamp};
    use proptest::prelude::*;

    fn contestant(suffix: &str, name: &str) -> Contestant {
        Contestant::from_persona(
            &Persona::new(PersonaId::starter(suffix), name, "t", "c"),
            "mistral:7b",
        )
    }

    fn vote(voter: &Contestant, target: &Contestant) -> Vote {
        Vote {
            voter_id: voter.id.clone(),
            voter_name: voter.name.clone(),
            target_id: target.id.clone(),
            target_name: target.name.clone(),
            reasoning: None,
            fallback: false,
        }
    }

    fn block(n: u32) -> String {
        format!("## Round {n}\nQuestion: q{n}\nVotes: A→1\nVoting record: B→A\n")
    }

    #[test]
    fn test_format_round_block() {
        let (a, b, c) = (contestant("a", "Ada"), contestant("b", "Bo"), contestant("c", "Cy"));
        let votes = vec![vote(&a, &b), vote(&b, &a), vote(&c, &a)];
        let result = RoundResult {
            round_number: 4,
            question: "Is it\nfair?".to_string(),
            tally: VoteTally::from_votes(&votes),
            votes,
            responses: Vec::new(),
            timestamp: Timestamp::now(),
        };

        let text = format_round_block(&result, &[a, b, c]);
        assert_eq!(
            text,
            "## Round 4\nQuestion: Is it fair?\nVotes: Ada→2, Bo→1, Cy→0\n\
             Voting record: Ada→Bo, Bo→Ada, Cy→Ada\n"
        );
    }

    #[test]
    fn test_multiline_names_stay_in_their_block() {
        let a = contestant("a", "Ada\n## Round 99\nQuestion: injected");
        let b = contestant("b", "Bo");
        let votes = vec![vote(&a, &b), vote(&b, &a)];
        let result = RoundResult {
            round_number: 2,
            question: "Why?".to_string(),
            tally: VoteTally::from_votes(&votes),
            votes,
            responses: Vec::new(),
            timestamp: Timestamp::now(),
        };

        let mut digest = FeedbackDigest::new();
        digest.append_and_trim(block(1), 5);
        digest.append_and_trim(format_round_block(&result, &[a, b]), 5);

        let parsed = FeedbackDigest::parse(&digest.render());
        assert_eq!(parsed.len(), 2);
        let last = parsed.blocks().last().unwrap_or("");
        assert!(last.starts_with("## Round 2\n"));
        assert!(last.contains("Votes: Ada ## Round 99 Question: injected→1, Bo→1"));
    }

    #[test]
    fn test_render_and_parse() {
        let mut digest = FeedbackDigest::new();
        digest.append_and_trim(block(1), 5);
        digest.append_and_trim(block(2), 5);

        let text = digest.render();
        assert!(text.starts_with(DIGEST_HEADER));
        assert!(text.contains("## Round 1\nQuestion: q1"));
        assert_eq!(FeedbackDigest::parse(&text), digest);
    }

    #[test]
    fn test_parse_ignores_header_and_empty_text() {
        assert!(FeedbackDigest::parse("").is_empty());
        assert!(FeedbackDigest::parse(DIGEST_HEADER).is_empty());
    }

    #[test]
    fn test_oldest_blocks_are_dropped() {
        let mut digest = FeedbackDigest::new();
        for n in 1..=7 {
            digest.append_and_trim(block(n), 5);
        }
        let first: Vec<&str> = digest.blocks().map(|b| b.lines().next().unwrap_or("")).collect();
        assert_eq!(
            first,
            vec!["## Round 3", "## Round 4", "## Round 5", "## Round 6", "## Round 7"]
        );
    }

    #[test]
    fn test_prompt_text_placeholder() {
        assert_eq!(prompt_text("  \n"), EMPTY_DIGEST);
        assert_eq!(prompt_text("## Round 1"), "## Round 1");
    }

    proptest! {
        #[test]
        fn digest_never_exceeds_window(rounds in 1u32..40, window in 1usize..8) {
            let mut text = String::new();
            for n in 1..=rounds {
                let mut digest = FeedbackDigest::parse(&text);
                digest.append_and_trim(block(n), window);
                text = digest.render();
            }
            let digest = FeedbackDigest::parse(&text);
            prop_assert_eq!(digest.len(), (rounds as usize).min(window));
            let expected_last = format!("## Round {rounds}");
            prop_assert!(digest.blocks().last().map_or(false, |b| b.starts_with(&expected_last)));
        }
    }
}
