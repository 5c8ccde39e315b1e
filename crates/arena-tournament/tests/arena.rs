use arena_common_config::{ArenaConfig, PathsConfig};
use arena_test_utils::{assert_err, assert_ok, read_json, temp_dir, write_json};
use arena_tournament::store::FileRoundLog;
use arena_tournament::testing::{starter_personas, vote_json, ScriptedGateway};
use arena_tournament::{
    Arena, ArenaError, ArenaEvent, ArenaStores, FeedbackDigest, LlmError, MemoryStore, Persona,
    PersonaId, PersonaStore, QueuedQuestions, RequestPurpose,
};

fn id(n: usize) -> PersonaId {
    PersonaId::starter(format!("{n:02}"))
}

fn back_the_first(voter: &PersonaId) -> String {
    if *voter == id(1) {
        id(2).to_string()
    } else {
        id(1).to_string()
    }
}

fn config(total_rounds: u32) -> ArenaConfig {
    let mut config = ArenaConfig::default();
    config.tournament.total_rounds = total_rounds;
    config.tournament.seed = Some(7);
    config
}

fn questions(n: usize) -> QueuedQuestions {
    QueuedQuestions::new((1..=n).map(|i| format!("Question number {i}?")))
}

fn arena(config: &ArenaConfig, store: &MemoryStore) -> Arena {
    Arena::new(
        config,
        Box::new(ScriptedGateway::with_ballots(back_the_first)),
        ArenaStores::memory(store),
    )
}

#[tokio::test]
async fn test_bootstrap_requires_five_starters() {
    let mut personas = starter_personas(4);
    personas.push(Persona::new(PersonaId::generated(1), "Leftover", "t", "c"));
    let store = MemoryStore::with_personas(personas);

    let err = assert_err!(arena(&config(3), &store).run(&mut questions(3)).await);
    assert!(matches!(
        err,
        ArenaError::InsufficientStarters {
            required: 5,
            found: 4
        }
    ));
    assert!(store.state().is_none());
}

#[tokio::test]
async fn test_bootstrap_takes_first_starters_by_id() {
    let store = MemoryStore::with_personas(starter_personas(7));
    let mut arena = arena(&config(1), &store);

    let state = assert_ok!(arena.bootstrap());
    let ids: Vec<PersonaId> = state.contestants.iter().map(|c| c.id.clone()).collect();
    assert_eq!(ids, (1..=5).map(id).collect::<Vec<_>>());
    assert_eq!(state.current_round, 0);

    // five distinct models from the default five-model pool
    let mut models: Vec<&str> = state.contestants.iter().map(|c| c.model.as_str()).collect();
    models.sort();
    models.dedup();
    assert_eq!(models.len(), 5);

    let saved = store.get(&id(1)).unwrap().unwrap();
    assert_eq!(saved.model.as_deref(), Some(state.contestants[0].model.as_str()));
    assert_eq!(store.state(), Some(state));
}

#[tokio::test]
async fn test_full_run_with_periodic_eliminations() {
    let store = MemoryStore::with_personas(starter_personas(5));
    let mut arena = arena(&config(6), &store);
    let mut events = arena.subscribe();

    let summary = assert_ok!(arena.run(&mut questions(10)).await);

    assert_eq!(summary.rounds_played, 6);
    assert_eq!(summary.survivors.len(), 5);
    assert_eq!(summary.survivors[0].contestant.id, id(1));

    // 03-05 starve in rounds 1-3, their replacements starve in rounds 4-6
    let eliminated: Vec<(String, u32)> = summary
        .eliminations
        .iter()
        .map(|r| (r.contestant_id.to_string(), r.eliminated_round))
        .collect();
    assert_eq!(
        eliminated,
        vec![
            ("starter-03".to_string(), 3),
            ("starter-04".to_string(), 3),
            ("starter-05".to_string(), 3),
            ("gen-1".to_string(), 6),
            ("gen-2".to_string(), 6),
            ("gen-3".to_string(), 6),
        ]
    );

    let state = store.state().unwrap();
    assert_eq!(state.current_round, 6);
    let roster: Vec<&str> = state.contestants.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(roster, vec!["starter-01", "starter-02", "gen-4", "gen-5", "gen-6"]);

    assert_eq!(store.rounds_logged(), vec![1, 2, 3, 4, 5, 6]);
    let round_six = store.round(6).unwrap();
    assert_eq!(round_six.question, "Question number 6?");
    assert_eq!(round_six.tally.total(), 5);

    let digest = store.digest();
    assert_eq!(digest.len(), 5);
    assert!(digest.blocks().next().unwrap().starts_with("## Round 2"));

    let mut started = 0;
    let mut fallbacks = 0;
    let mut replacements = 0;
    let mut completed = false;
    while let Ok(event) = events.try_recv() {
        match event {
            ArenaEvent::RoundStarted { .. } => started += 1,
            ArenaEvent::VoteCast { fallback, .. } => fallbacks += usize::from(fallback),
            ArenaEvent::ReplacementCreated { .. } => replacements += 1,
            ArenaEvent::TournamentComplete { rounds_played } => {
                completed = rounds_played == 6;
            }
            _ => {}
        }
    }
    assert_eq!(started, 6);
    assert_eq!(fallbacks, 0);
    assert_eq!(replacements, 6);
    assert!(completed);
}

#[tokio::test]
async fn test_run_stops_when_questions_run_out_and_resumes() {
    let store = MemoryStore::with_personas(starter_personas(5));

    let summary = assert_ok!(arena(&config(5), &store).run(&mut questions(2)).await);
    assert_eq!(summary.rounds_played, 2);
    assert_eq!(store.state().unwrap().current_round, 2);

    let mut resumed = arena(&config(5), &store);
    let mut events = resumed.subscribe();
    let summary = assert_ok!(resumed.run(&mut questions(10)).await);

    assert_eq!(summary.rounds_played, 5);
    assert_eq!(store.rounds_logged(), vec![1, 2, 3, 4, 5]);
    // the resumed run picks questions from its own source, starting at round 3
    assert_eq!(store.round(3).unwrap().question, "Question number 1?");
    match events.try_recv() {
        Ok(ArenaEvent::TournamentStarted { resumed, round, .. }) => {
            assert!(resumed);
            assert_eq!(round, 2);
        }
        other => panic!("Expected TournamentStarted, got {other:?}"),
    }
}

/// Answers and votes like `back_the_first`, but every persona synthesis fails.
fn synthesis_down() -> ScriptedGateway {
    ScriptedGateway::new(|request| match request.purpose {
        RequestPurpose::Response => Ok("an answer".to_string()),
        RequestPurpose::Vote => {
            let voter = request.contestant_id.as_ref().expect("votes carry a voter");
            Ok(vote_json(&back_the_first(voter), "scripted"))
        }
        RequestPurpose::Persona => Err(LlmError::Http {
            status: 500,
            body: "model crashed".to_string(),
        }),
    })
}

#[tokio::test]
async fn test_failed_replacement_keeps_roster_and_is_retried_on_resume() {
    let store = MemoryStore::with_personas(starter_personas(5));
    let mut broken = Arena::new(
        &config(6),
        Box::new(synthesis_down()),
        ArenaStores::memory(&store),
    );

    let err = assert_err!(broken.run(&mut questions(6)).await);
    assert!(matches!(
        err,
        ArenaError::Gateway(LlmError::Http { status: 500, .. })
    ));

    // round 3 is saved, its elimination phase left no trace
    let state = store.state().unwrap();
    assert_eq!(state.current_round, 3);
    assert_eq!(state.contestants.len(), 5);
    assert!(state.elimination_history.is_empty());
    for contestant in &state.contestants {
        assert!(store.get(&contestant.id).unwrap().unwrap().is_alive());
    }
    assert!(store.get(&PersonaId::generated(1)).unwrap().is_none());

    let mut healthy = arena(&config(6), &store);
    let summary = assert_ok!(healthy.run(&mut questions(1)).await);
    assert_eq!(summary.rounds_played, 4);

    let state = store.state().unwrap();
    let roster: Vec<&str> = state.contestants.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(roster, vec!["starter-01", "starter-02", "gen-1", "gen-2", "gen-3"]);
    let eliminated: Vec<(String, u32)> = state
        .elimination_history
        .iter()
        .map(|r| (r.contestant_id.to_string(), r.eliminated_round))
        .collect();
    assert_eq!(
        eliminated,
        vec![
            ("starter-03".to_string(), 3),
            ("starter-04".to_string(), 3),
            ("starter-05".to_string(), 3),
        ]
    );
    assert_eq!(store.get(&id(3)).unwrap().unwrap().died_round, Some(3));
    assert_eq!(store.get(&PersonaId::generated(1)).unwrap().unwrap().born_round, 3);
    // the replacements played round 4
    assert_eq!(store.round(4).unwrap().responses.len(), 5);
}

#[tokio::test]
async fn test_finished_tournament_plays_no_more_rounds() {
    let store = MemoryStore::with_personas(starter_personas(5));
    assert_ok!(arena(&config(2), &store).run(&mut questions(5)).await);

    let mut remaining = questions(5);
    let summary = assert_ok!(arena(&config(2), &store).run(&mut remaining).await);
    assert_eq!(summary.rounds_played, 2);
    assert_eq!(remaining.remaining(), 5);
}

#[tokio::test]
async fn test_file_backed_tournament() {
    let dir = temp_dir();
    let mut config = config(3);
    config.paths = PathsConfig::default().resolved(dir.path());

    for persona in starter_personas(5) {
        write_json(
            dir.path(),
            &format!("data/personalities/{}.json", persona.id),
            &serde_json::to_value(&persona).unwrap(),
        );
    }

    let mut arena = Arena::new(
        &config,
        Box::new(ScriptedGateway::with_ballots(back_the_first)),
        ArenaStores::files(&config.paths),
    );
    let summary = assert_ok!(arena.run(&mut questions(3)).await);
    assert_eq!(summary.eliminations.len(), 3);

    let state = read_json(&dir.path().join("data/arena_state.json"));
    assert_eq!(state["current_round"], 3);
    assert_eq!(state["contestants"].as_array().unwrap().len(), 5);
    assert_eq!(state["elimination_history"][0]["contestant_id"], "starter-03");

    let dead = read_json(&dir.path().join("data/personalities/starter-03.json"));
    assert_eq!(dead["died_round"], 3);
    let born = read_json(&dir.path().join("data/personalities/gen-1.json"));
    assert_eq!(born["born_round"], 3);
    assert_eq!(born["died_round"], serde_json::Value::Null);

    let feedback = std::fs::read_to_string(dir.path().join("data/feedback.md")).unwrap();
    assert!(feedback.starts_with("# Arena Feedback"));
    assert_eq!(FeedbackDigest::parse(&feedback).len(), 3);

    let log = FileRoundLog::new(dir.path().join("logs"));
    let round_one = log.read(1).unwrap();
    assert_eq!(round_one.round_number, 1);
    assert_eq!(round_one.responses.len(), 5);
    assert!(dir.path().join("logs/round-003.json").exists());
}
