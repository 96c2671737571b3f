use std::collections::{BTreeMap, HashMap};

use chrono::{NaiveDateTime, Utc};
use tracing::info;

use crate::db::models::{AttemptAnswer, AttemptStatus, Question, TestAttempt};
use crate::db::DbClient;
use crate::Result;

/// Per-subject slice of one attempt's outcome
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectTally {
    pub answered: i32,
    pub correct: i32,
    pub time_spent_seconds: i64,
}

/// Outcome of scoring a single attempt
#[derive(Debug, Clone)]
pub struct ScoreSummary {
    pub score: i32,
    pub total_marks: i32,
    pub correct_count: i32,
    pub answered_count: i32,
    /// Keyed by subject; covers every subject the exam's questions span
    pub per_subject: BTreeMap<String, SubjectTally>,
}

/// Scores an attempt from its recorded answers. Answers written after the
/// deadline never count; unanswered questions count toward neither the
/// answered nor the correct totals.
pub fn score_attempt(
    questions: &[Question],
    answers: &[AttemptAnswer],
    deadline: NaiveDateTime,
    elapsed_seconds: i64,
) -> ScoreSummary {
    let by_id: HashMap<&str, &Question> = questions
        .iter()
        .map(|question| (question.id.as_str(), question))
        .collect();

    let mut summary = ScoreSummary {
        score: 0,
        total_marks: questions.iter().map(|q| q.marks).sum(),
        correct_count: 0,
        answered_count: 0,
        per_subject: questions
            .iter()
            .map(|q| (q.subject.clone(), SubjectTally::default()))
            .collect(),
    };

    for answer in answers {
        if answer.answered_at > deadline {
            continue;
        }
        let Some(question) = by_id.get(answer.question_id.as_str()) else {
            continue;
        };

        summary.answered_count += 1;
        let tally = summary.per_subject.entry(question.subject.clone()).or_default();
        tally.answered += 1;
        if answer.is_correct {
            summary.correct_count += 1;
            summary.score += question.marks;
            tally.correct += 1;
        }
    }

    // Attribute elapsed time across subjects in proportion to answers given
    if summary.answered_count > 0 {
        for tally in summary.per_subject.values_mut() {
            tally.time_spent_seconds =
                elapsed_seconds * tally.answered as i64 / summary.answered_count as i64;
        }
    }

    summary
}

/// Finalizes an attempt: scores it, freezes the outcome row, and folds the
/// per-subject tallies into the user's progress. Shared by the submit
/// handler and the expiry sweeper.
pub async fn finalize_attempt(
    db: &DbClient,
    attempt: &TestAttempt,
    final_status: AttemptStatus,
) -> Result<ScoreSummary> {
    let questions = db.get_questions_for_exam(&attempt.exam_id).await?;
    let answers = db.get_answers_for_attempt(&attempt.id).await?;

    // An expired attempt ends at its deadline, not at sweep time
    let now = Utc::now().naive_utc();
    let finished_at = match final_status {
        AttemptStatus::Expired => attempt.deadline_at,
        _ => now.min(attempt.deadline_at),
    };
    let elapsed_seconds = (finished_at - attempt.started_at).num_seconds().max(0);

    let summary = score_attempt(&questions, &answers, attempt.deadline_at, elapsed_seconds);

    db.finalize_attempt(
        &attempt.id,
        final_status,
        summary.score,
        summary.correct_count,
        summary.answered_count,
        finished_at,
    )
    .await?;

    for (subject, tally) in &summary.per_subject {
        db.accumulate_progress(
            &attempt.user_id,
            subject,
            1,
            tally.answered,
            tally.correct,
            tally.time_spent_seconds,
        )
        .await?;
    }

    info!(
        "Attempt {} finalized: {}/{} marks, {}/{} correct",
        attempt.id, summary.score, summary.total_marks, summary.correct_count, summary.answered_count
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn question(qid: &str, subject: &str, correct: i32, marks: i32) -> Question {
        Question {
            id: qid.to_string(),
            exam_id: "exam-1".to_string(),
            subject: subject.to_string(),
            prompt: format!("prompt {qid}"),
            options: vec!["a".to_string(), "b".to_string(), "c".to_string()],
            correct_option: correct,
            marks,
            created_at: Utc::now().naive_utc(),
        }
    }

    fn answer(
        qid: &str,
        selected: i32,
        is_correct: bool,
        answered_at: NaiveDateTime,
    ) -> AttemptAnswer {
        AttemptAnswer {
            id: format!("ans-{qid}"),
            attempt_id: "attempt-1".to_string(),
            question_id: qid.to_string(),
            selected_option: selected,
            is_correct,
            answered_at,
        }
    }

    #[test]
    fn test_scores_correct_answers_only() {
        let deadline = Utc::now().naive_utc();
        let in_time = deadline - Duration::minutes(5);
        let questions = vec![
            question("q1", "Maths", 0, 2),
            question("q2", "Maths", 1, 3),
            question("q3", "Reasoning", 2, 5),
        ];
        let answers = vec![
            answer("q1", 0, true, in_time),
            answer("q2", 0, false, in_time),
        ];

        let summary = score_attempt(&questions, &answers, deadline, 300);
        assert_eq!(summary.score, 2);
        assert_eq!(summary.total_marks, 10);
        assert_eq!(summary.correct_count, 1);
        assert_eq!(summary.answered_count, 2);
    }

    #[test]
    fn test_ignores_answers_past_deadline() {
        let deadline = Utc::now().naive_utc();
        let questions = vec![question("q1", "Maths", 0, 2)];
        let answers = vec![answer("q1", 0, true, deadline + Duration::seconds(1))];

        let summary = score_attempt(&questions, &answers, deadline, 60);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.answered_count, 0);
        assert_eq!(summary.correct_count, 0);
    }

    #[test]
    fn test_ignores_answers_to_unknown_questions() {
        let deadline = Utc::now().naive_utc();
        let questions = vec![question("q1", "Maths", 0, 2)];
        let answers = vec![answer("q-removed", 0, true, deadline - Duration::minutes(1))];

        let summary = score_attempt(&questions, &answers, deadline, 60);
        assert_eq!(summary.answered_count, 0);
    }

    #[test]
    fn test_per_subject_tallies_cover_all_exam_subjects() {
        let deadline = Utc::now().naive_utc();
        let in_time = deadline - Duration::minutes(1);
        let questions = vec![
            question("q1", "Maths", 0, 2),
            question("q2", "Reasoning", 1, 3),
        ];
        let answers = vec![answer("q1", 0, true, in_time)];

        let summary = score_attempt(&questions, &answers, deadline, 100);

        let maths = &summary.per_subject["Maths"];
        assert_eq!(maths.answered, 1);
        assert_eq!(maths.correct, 1);
        assert_eq!(maths.time_spent_seconds, 100);

        // Subject with no answers still appears, with zero counters
        let reasoning = &summary.per_subject["Reasoning"];
        assert_eq!(*reasoning, SubjectTally::default());
    }

    #[test]
    fn test_time_split_is_proportional_to_answers() {
        let deadline = Utc::now().naive_utc();
        let in_time = deadline - Duration::minutes(1);
        let questions = vec![
            question("q1", "Maths", 0, 1),
            question("q2", "Maths", 0, 1),
            question("q3", "Reasoning", 0, 1),
        ];
        let answers = vec![
            answer("q1", 0, true, in_time),
            answer("q2", 0, true, in_time),
            answer("q3", 0, true, in_time),
        ];

        let summary = score_attempt(&questions, &answers, deadline, 90);
        assert_eq!(summary.per_subject["Maths"].time_spent_seconds, 60);
        assert_eq!(summary.per_subject["Reasoning"].time_spent_seconds, 30);
    }

    #[test]
    fn test_empty_attempt_scores_zero() {
        let deadline = Utc::now().naive_utc();
        let questions = vec![question("q1", "Maths", 0, 2)];

        let summary = score_attempt(&questions, &[], deadline, 0);
        assert_eq!(summary.score, 0);
        assert_eq!(summary.answered_count, 0);
        assert_eq!(summary.total_marks, 2);
    }
}
