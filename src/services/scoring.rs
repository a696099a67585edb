use std::collections::HashSet;

use uuid::Uuid;

use crate::{
    dto::session::{QuestionResult, QuizResultsResponse, RankedPlayer},
    state::{quiz::Question, session::QuizSession},
};

/// Compute the aggregate result for one question of a session.
///
/// `scores` is a caller-supplied accumulator indexed by player join order;
/// points earned on this question are added in place so a whole-session
/// summary can be built in one pass per question. `rankings` receives the
/// join-order indexes of the correct players, fastest first, for callers
/// that need the literal per-question rank (the CSV export).
///
/// Correctness is exact-set equality with the question's correct answer
/// ids. Correct players are ranked by ascending answer time; the sort is
/// stable, so equally fast players keep their join order. The player ranked
/// `r` (1-based) earns `points × 1/r`; everyone else earns nothing. Players
/// without a submission count as an answer time of zero seconds and are
/// never correct.
pub fn question_result(
    session: &QuizSession,
    question: &Question,
    index: usize,
    scores: &mut [f64],
    rankings: &mut Vec<usize>,
) -> QuestionResult {
    let players = &session.players;
    let correct_ids = question.correct_answer_ids();
    let started_at = session.question_start_times.get(index).copied().flatten();

    let mut answer_times = Vec::with_capacity(players.len());
    let mut correct: Vec<usize> = Vec::new();

    for (player_index, player) in players.iter().enumerate() {
        let submission = player.submissions.get(index).and_then(|slot| slot.as_ref());

        let answer_time = match (submission, started_at) {
            (Some(submission), Some(started_at)) => {
                (submission.submitted_at - started_at).as_seconds_f64()
            }
            _ => 0.0,
        };
        answer_times.push(answer_time);

        if let Some(submission) = submission {
            let submitted: HashSet<Uuid> = submission.answer_ids.iter().copied().collect();
            if submitted == correct_ids {
                correct.push(player_index);
            }
        }
    }

    correct.sort_by(|lhs, rhs| answer_times[*lhs].total_cmp(&answer_times[*rhs]));

    for (position, player_index) in correct.iter().enumerate() {
        rankings.push(*player_index);
        if let Some(slot) = scores.get_mut(*player_index) {
            *slot += f64::from(question.points) / (position as f64 + 1.0);
        }
    }

    let average_answer_time = if answer_times.is_empty() {
        0.0
    } else {
        answer_times.iter().sum::<f64>() / answer_times.len() as f64
    };

    let percent_correct = if players.is_empty() {
        0
    } else {
        (correct.len() as f64 / players.len() as f64 * 100.0).round() as u32
    };

    let mut players_correct_list: Vec<String> = correct
        .iter()
        .map(|player_index| players[*player_index].name.clone())
        .collect();
    players_correct_list.sort();

    QuestionResult {
        question_id: question.id,
        players_correct_list,
        average_answer_time,
        percent_correct,
    }
}

/// Aggregate every question of the session into the final results.
///
/// The ranking is sorted descending by accumulated score on every result
/// path; ties keep join order (the sort is stable).
pub fn session_results(session: &QuizSession) -> QuizResultsResponse {
    let mut scores = vec![0.0; session.players.len()];
    let mut question_results = Vec::with_capacity(session.snapshot.questions.len());

    for (index, question) in session.snapshot.questions.iter().enumerate() {
        let mut rankings = Vec::new();
        question_results.push(question_result(
            session,
            question,
            index,
            &mut scores,
            &mut rankings,
        ));
    }

    let mut users_ranked_by_score: Vec<RankedPlayer> = session
        .players
        .iter()
        .zip(scores)
        .map(|(player, score)| RankedPlayer {
            name: player.name.clone(),
            score,
        })
        .collect();
    users_ranked_by_score.sort_by(|lhs, rhs| rhs.score.total_cmp(&lhs.score));

    QuizResultsResponse {
        users_ranked_by_score,
        question_results,
    }
}

/// Per-question 1-based ranks for every player, indexed
/// `[question][player join order]`; `0` marks a player who was not correct.
pub fn rank_table(session: &QuizSession) -> Vec<Vec<usize>> {
    let player_count = session.players.len();
    let mut scores = vec![0.0; player_count];
    let mut table = vec![vec![0; player_count]; session.snapshot.questions.len()];

    for (index, question) in session.snapshot.questions.iter().enumerate() {
        let mut rankings = Vec::new();
        question_result(session, question, index, &mut scores, &mut rankings);
        for (position, player_index) in rankings.iter().enumerate() {
            table[index][*player_index] = position + 1;
        }
    }

    table
}
