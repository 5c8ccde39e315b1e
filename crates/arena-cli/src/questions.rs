//! Where round questions come from: a question file first, then stdin.

use async_trait::async_trait;
use console::{style, Term};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader, Lines, Stdin};

use arena_tournament::{ArenaResult, QuestionSource, QueuedQuestions};

/// Serves queued questions, then reads one line per round from `reader`.
/// End of input stops the run.
pub struct PromptingQuestions<R> {
    queued: QueuedQuestions,
    lines: Option<Lines<R>>,
    show_prompt: bool,
}

impl PromptingQuestions<BufReader<Stdin>> {
    /// Queued questions followed by interactive stdin, unless `interactive` is off.
    pub fn stdin(queued: QueuedQuestions, interactive: bool) -> Self {
        Self {
            queued,
            lines: interactive.then(|| BufReader::new(tokio::io::stdin()).lines()),
            show_prompt: Term::stderr().is_term(),
        }
    }
}

impl<R: AsyncBufRead + Unpin> PromptingQuestions<R> {
    pub fn with_reader(queued: QueuedQuestions, reader: R) -> Self {
        Self {
            queued,
            lines: Some(reader.lines()),
            show_prompt: false,
        }
    }
}

#[async_trait]
impl<R> QuestionSource for PromptingQuestions<R>
where
    R: AsyncBufRead + Unpin + Send,
{
    async fn next_question(&mut self, round: u32) -> ArenaResult<Option<String>> {
        if let Some(question) = self.queued.pop() {
            return Ok(Some(question));
        }
        let Some(lines) = self.lines.as_mut() else {
            return Ok(None);
        };

        loop {
            if self.show_prompt {
                // prompt write failures only lose the prompt
                let _ = Term::stderr().write_str(&format!(
                    "{} ",
                    style(format!("Question for round {round}:")).cyan().bold()
                ));
            }
            let line = lines
                .next_line()
                .await
                .map_err(arena_common_core::Error::from)?;
            match line {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(line.trim().to_string())),
                None => return Ok(None),
            }
        }
    }
}
