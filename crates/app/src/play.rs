//! Line-based terminal host for a round.

use quiz_core::model::{AnswerResult, Question, RoundConfig};
use quiz_core::random::RandomSource;
use services::{AppServices, RoundCommand, RoundEvent, RunOutcome, TickSettings};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

const RECENT_ROUNDS: u32 = 5;

/// Map one line of input to a command.
///
/// A choice label typed out wins over position, so `10` on a binary question
/// picks the label `10`. Otherwise `1`-`4` or `a`-`d` pick by position. `q`
/// quits whether or not a question is live.
fn parse_input(line: &str, question: Option<&Question>) -> Option<RoundCommand> {
    let input = line.trim();
    if let Some(choice) = question.and_then(|q| {
        q.choices()
            .iter()
            .find(|c| c.label.eq_ignore_ascii_case(input))
    }) {
        return Some(RoundCommand::Answer(Some(choice.label.clone())));
    }
    if input.eq_ignore_ascii_case("q") || input.eq_ignore_ascii_case("quit") {
        return Some(RoundCommand::Cancel);
    }

    let index = match input.to_ascii_lowercase().as_str() {
        "1" | "a" => 0,
        "2" | "b" => 1,
        "3" | "c" => 2,
        "4" | "d" => 3,
        _ => return None,
    };
    question?
        .choices()
        .get(index)
        .map(|c| RoundCommand::Answer(Some(c.label.clone())))
}

fn print_question(index: usize, total: usize, question: &Question, limit: u32) {
    println!();
    println!("Question {}/{total}  ({limit}s)", index + 1);
    println!("  {}", question.prompt());
    if let Some(hint) = question.hint() {
        println!("  hint: {hint}");
    }
    for (i, choice) in question.choices().iter().enumerate() {
        println!("    {}) {}", i + 1, choice.label);
    }
}

fn print_result(result: &AnswerResult, combo: bool, score: u64) {
    let correct_label = result.question.correct_label();
    if result.correct {
        println!("  correct! +{} (score {score})", result.points_awarded);
        if combo {
            println!("  combo x{}", result.streak_after);
        }
    } else if result.timed_out() {
        println!("  time's up, the answer was {correct_label}");
    } else {
        println!("  wrong, the answer was {correct_label}");
    }
    if let Some(example) = result.question.example() {
        println!("  e.g. {example}");
    }
}

/// Play one round against stdin and persist it on completion.
///
/// # Errors
///
/// Returns an error if the round cannot be built or its result cannot be
/// saved.
pub async fn play_round<R: RandomSource + ?Sized>(
    services: &AppServices,
    config: RoundConfig,
    settings: TickSettings,
    rng: &mut R,
) -> Result<(), Box<dyn std::error::Error>> {
    let quiz = services.quiz_loop();
    let session = quiz.start_round(config, rng)?;

    let (_settings_tx, settings_rx) = watch::channel(settings);
    let (command_tx, command_rx) = mpsc::channel(8);
    let (event_tx, mut event_rx) = mpsc::channel(32);
    let run = tokio::spawn(quiz.runner(session, settings_rx).run(command_rx, event_tx));

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut current: Option<Question> = None;
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                match event {
                    RoundEvent::Presented { index, total, question, time_limit_secs } => {
                        print_question(index, total, &question, time_limit_secs);
                        current = Some(question);
                    }
                    RoundEvent::Ticked { remaining_secs, settings, .. } => {
                        if settings.should_warn(remaining_secs) {
                            println!("  {remaining_secs}s left");
                        }
                    }
                    RoundEvent::Answered { result, combo, score, .. } => {
                        current = None;
                        print_result(&result, combo, score);
                    }
                    RoundEvent::Completed { correct, total, score, best_streak } => {
                        println!();
                        println!("Round over: {correct}/{total} correct, {score} points, best streak {best_streak}");
                    }
                    RoundEvent::Cancelled => println!("Round cancelled."),
                }
            }
            line = lines.next_line(), if stdin_open => {
                let command = match line {
                    Ok(Some(line)) => parse_input(&line, current.as_ref()),
                    Ok(None) | Err(_) => {
                        stdin_open = false;
                        Some(RoundCommand::Cancel)
                    }
                };
                match command {
                    Some(command) => {
                        if command_tx.send(command).await.is_err() {
                            tracing::debug!("runner already finished");
                        }
                    }
                    None if current.is_some() => println!("  answer with 1-4, or q to quit"),
                    None => {}
                }
            }
        }
    }

    match run.await? {
        RunOutcome::Completed(mut session) => {
            let report = quiz.complete_round(&mut session).await?;
            for achievement in &report.newly_unlocked {
                println!("Achievement unlocked: {} ({})", achievement.title, achievement.description);
            }
            Ok(())
        }
        RunOutcome::Cancelled(_) => Ok(()),
    }
}

/// # Errors
///
/// Returns an error if round history cannot be read.
pub async fn print_stats(
    services: &AppServices,
    category: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    let view = services.stats();
    let stats = view.stats().await;
    println!("Rounds played:    {}", stats.total_games());
    println!("Correct answers:  {}/{}", stats.total_correct(), stats.total_answered());
    if let Some(accuracy) = stats.accuracy() {
        println!("Accuracy:         {:.0}%", accuracy * 100.0);
    }
    println!("Total score:      {}", stats.total_score());
    println!("Best round score: {}", stats.best_round_score());
    println!("Best streak:      {}", stats.best_streak_ever());
    println!("Perfect rounds:   {}", stats.perfect_rounds());

    let recent = view.recent_rounds(category, RECENT_ROUNDS).await?;
    if !recent.is_empty() {
        println!();
        println!("Recent rounds:");
        for round in recent {
            println!(
                "  {}  {:<10} {:<6} {}/{}  {} pts",
                round.completed_at().format("%Y-%m-%d %H:%M"),
                round.category(),
                round.tier(),
                round.correct(),
                round.total_questions(),
                round.score()
            );
        }
    }
    Ok(())
}

pub async fn print_achievements(services: &AppServices) {
    for status in services.stats().achievements().await {
        let mark = if status.unlocked { "x" } else { " " };
        println!(
            "[{mark}] {:<14} {}",
            status.achievement.title, status.achievement.description
        );
    }
}
