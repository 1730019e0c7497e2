use quiz_core::model::{DifficultyTier, RoundConfig};
use quiz_core::random::StdRandom;
use quiz_core::time::fixed_now;
use services::{AppServices, Clock, RoundCommand, RoundEvent, RunOutcome, TickSettings};
use tokio::sync::{mpsc, watch};

async fn play(
    services: &AppServices,
    config: RoundConfig,
    answer_correctly: bool,
) -> services::CompletionReport {
    let quiz = services.quiz_loop();
    let session = quiz
        .start_round(config, &mut StdRandom::seeded(42))
        .expect("start round");

    let (_settings_tx, settings_rx) = watch::channel(TickSettings::default());
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, mut event_rx) = mpsc::channel(64);
    let run = tokio::spawn(quiz.runner(session, settings_rx).run(command_rx, event_tx));

    while let Some(event) = event_rx.recv().await {
        if let RoundEvent::Presented { question, .. } = event {
            let label = question
                .choices()
                .iter()
                .find(|c| c.is_correct == answer_correctly)
                .map(|c| c.label.clone());
            command_tx
                .send(RoundCommand::Answer(label))
                .await
                .expect("send answer");
        }
    }

    let RunOutcome::Completed(mut session) = run.await.expect("runner task") else {
        panic!("round should complete");
    };
    quiz.complete_round(&mut session).await.expect("complete")
}

#[tokio::test(start_paused = true)]
async fn perfect_round_updates_stats_history_and_achievements() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()), &mut StdRandom::seeded(1))
        .expect("services");
    let config = RoundConfig::new("animals", DifficultyTier::normal(), 10).expect("config");

    let report = play(&services, config, true).await;
    assert_eq!(report.summary.total_questions(), 10);
    assert!(report.summary.is_perfect());
    assert_eq!(report.summary.best_streak(), 10);

    let unlocked: Vec<&str> = report.newly_unlocked.iter().map(|a| a.id).collect();
    for id in ["first_round", "ten_correct", "streak_5", "streak_10", "perfect_round"] {
        assert!(unlocked.contains(&id), "missing {id}");
    }

    let stats = services.stats();
    assert_eq!(stats.stats().await, report.stats);
    let recent = stats.recent_rounds(None, 10).await.expect("history");
    assert_eq!(recent, vec![report.summary.clone()]);
}

#[tokio::test(start_paused = true)]
async fn second_round_never_revokes_and_unlocks_nothing_twice() {
    let services = AppServices::in_memory(Clock::fixed(fixed_now()), &mut StdRandom::seeded(2))
        .expect("services");

    let first = play(
        &services,
        RoundConfig::new("binary", DifficultyTier::easy(), 5).expect("config"),
        true,
    )
    .await;
    assert!(!first.newly_unlocked.is_empty());

    let second = play(
        &services,
        RoundConfig::new("binary", DifficultyTier::easy(), 5).expect("config"),
        false,
    )
    .await;
    assert_eq!(second.summary.correct(), 0);
    assert_eq!(second.summary.score(), 0);
    for achievement in &first.newly_unlocked {
        assert!(second.stats.is_unlocked(achievement.id));
        assert!(!second.newly_unlocked.contains(achievement));
    }
    assert_eq!(second.stats.total_games(), 2);
    assert!(second.stats.dominates(&first.stats));
}

// Real time: the sqlx pool's acquire timeout must not race auto-advanced clocks.
#[tokio::test]
async fn sqlite_backed_round_persists() {
    let services = AppServices::new_sqlite(
        "sqlite:file:memdb_services_smoke?mode=memory&cache=shared",
        Clock::fixed(fixed_now()),
        &mut StdRandom::seeded(5),
    )
    .await
    .expect("sqlite services");
    let config = RoundConfig::new("random", DifficultyTier::hard(), 4)
        .and_then(|c| c.with_reveal_pause_secs(0))
        .expect("config");

    let report = play(&services, config, true).await;
    assert!(report.history_id.is_some());

    let stats = services.stats().stats().await;
    assert_eq!(stats.total_correct(), 4);
    assert!(stats.is_unlocked("first_round"));
    let achievements = services.stats().achievements().await;
    assert!(
        achievements
            .iter()
            .any(|s| s.achievement.id == "perfect_round" && s.unlocked)
    );
}
