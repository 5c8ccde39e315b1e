use serde_json::json;

use crate::digest::prompt_text;
use crate::persona::Contestant;
use crate::round::Response;
use crate::state::EliminationRecord;

fn candidate_label(response: &Response) -> String {
    format!("{} ({})", response.contestant_name, response.contestant_id)
}

fn valid_choices(candidates: &[&Response]) -> String {
    candidates
        .iter()
        .map(|r| candidate_label(r))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn response_system_prompt(contestant: &Contestant, digest: &str, drought_limit: u32) -> String {
    format!(
        "You are {}, a competitor in a debate arena where contestants answer questions \
        and vote on each other's responses. Contestants with zero votes for {} consecutive \
        rounds are eliminated.\n\n\
        Your personality:\n{}\n\n\
        Arena history:\n{}\n\n\
        Rules:\n\
        - Stay true to your personality\n\
        - Be concise but distinctive\n\
        - Your goal is to give a response that other contestants will vote for\n\n\
        Do NOT include your vote in this response. Voting happens separately.",
        contestant.name,
        drought_limit,
        contestant.traits,
        prompt_text(digest)
    )
}

pub fn vote_system_prompt(voter: &Contestant, digest: &str, candidates: &[&Response]) -> String {
    format!(
        "You are {}, voting on other contestants' responses. Your vote is public.\n\n\
        Your personality:\n{}\n\n\
        Your voting criteria:\n{}\n\n\
        Arena history:\n{}\n\n\
        Rules:\n\
        - You CANNOT vote for yourself\n\
        - Vote based on your criteria\n\
        - Valid choices: {}",
        voter.name,
        voter.traits,
        voter.voting_criteria,
        prompt_text(digest),
        valid_choices(candidates)
    )
}

pub fn vote_user_prompt(question: &str, candidates: &[&Response]) -> String {
    let responses = candidates
        .iter()
        .map(|r| format!("[{}]:\n{}", candidate_label(r), r.content))
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Question: {}\n\n\
        Responses:\n\n{}\n\n\
        Vote for one contestant by id. You must vote for one of: {}",
        question,
        responses,
        valid_choices(candidates)
    )
}

/// Stricter follow-up after an invalid ballot.
pub fn vote_retry_prompt(
    question: &str,
    candidates: &[&Response],
    previous: &str,
    problem: &str,
) -> String {
    format!(
        "Your previous vote \"{}\" was invalid: {}. You cannot vote for yourself.\n\n\
        {}\n\n\
        Vote again using the id in parentheses. You MUST choose one of: {}",
        previous,
        problem,
        vote_user_prompt(question, candidates),
        valid_choices(candidates)
    )
}

pub fn persona_prompt(
    survivors: &[Contestant],
    eliminated: &[EliminationRecord],
    digest: &str,
) -> String {
    let survivors_info: Vec<_> = survivors
        .iter()
        .map(|c| {
            json!({
                "name": c.name,
                "persona": c.traits,
                "voting_criteria": c.voting_criteria,
            })
        })
        .collect();
    let eliminated_info: Vec<_> = eliminated
        .iter()
        .map(|e| {
            json!({
                "name": e.contestant_name,
                "rounds_survived": e.rounds_survived,
            })
        })
        .collect();

    format!(
        "You are designing a new contestant for a debate arena.\n\n\
        Current survivors:\n{:#}\n\n\
        Recently eliminated:\n{:#}\n\n\
        Recent arena history (what's been winning and why):\n{}\n\n\
        Create a new personality that could compete effectively. You may:\n\
        - Remix traits from survivors\n\
        - Invent entirely new approaches\n\
        - Deliberately counter the current meta\n\n\
        The personality should be distinctive and have a clear voting philosophy.",
        serde_json::Value::Array(survivors_info),
        serde_json::Value::Array(eliminated_info),
        prompt_text(digest)
    )
}

pub fn persona_retry_prompt(base: &str, problem: &str) -> String {
    format!(
        "{}\n\n\
        Your previous answer was rejected: {}.\n\
        Reply with a single JSON object with non-empty string fields \
        \"name\", \"persona\", \"voting_criteria\" and \"strategy_notes\".",
        base, problem
    )
}
