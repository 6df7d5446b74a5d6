//! Fixed demonstration content written the first time the question collection
//! is observed empty.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::types::{
    account::{Account, AccountId},
    answer::{Answer, AnswerId},
    question::{Question, QuestionId},
    vote::VoteDirection,
};

/// Seeding is skipped only when content is already present on both axes:
/// at least one question and at least one mentor account.
pub fn already_seeded(has_questions: bool, has_mentors: bool) -> bool {
    has_questions && has_mentors
}

fn account(uid: &str, name: &str, score: i32, mentor: bool) -> Account {
    Account {
        uid: AccountId(uid.to_string()),
        display_name: Some(name.to_string()),
        photo_url: Some(format!(
            "https://api.dicebear.com/8.x/adventurer/png?seed={}",
            uid
        )),
        score,
        is_mentor: mentor,
    }
}

pub fn demo_accounts() -> Vec<Account> {
    vec![
        account("user-1", "Alex Doe (Mobile Dev)", 15, true),
        account("user-2", "Jane Smith (Databases)", 25, true),
        account("user-3", "Sam Wilson", 5, false),
        account("user-4", "Chris Lee (GenAI)", 30, true),
        account("user-5", "Pat Kim (Web Dev)", 50, true),
        account("user-6", "Taylor Brown (UI/UX)", 42, true),
        account("user-7", "Morgan Riley (Backend)", 38, true),
        account("user-8", "Casey Jordan (Product)", 22, true),
        account("user-9", "Jamie Rivera", 12, false),
    ]
}

fn votes(entries: &[(&str, VoteDirection)]) -> HashMap<String, VoteDirection> {
    entries
        .iter()
        .map(|(uid, direction)| (uid.to_string(), *direction))
        .collect()
}

fn question(
    title: &str,
    content: &str,
    tags: &[&str],
    author: &Account,
    created_at: DateTime<Utc>,
    votes: HashMap<String, VoteDirection>,
    views: i32,
) -> Question {
    let score = votes
        .values()
        .map(|direction| match direction {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        })
        .sum();
    Question {
        id: QuestionId(Uuid::new_v4().to_string()),
        title: title.to_string(),
        content: content.to_string(),
        tags: tags.iter().map(|tag| tag.to_string()).collect(),
        author: author.clone(),
        created_at,
        votes,
        score,
        views,
        image_url: None,
        answers: None,
    }
}

fn answer(
    author: &Account,
    content: &str,
    created_at: DateTime<Utc>,
    votes: HashMap<String, VoteDirection>,
) -> Answer {
    let score = votes
        .values()
        .map(|direction| match direction {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        })
        .sum();
    Answer {
        id: AnswerId(Uuid::new_v4().to_string()),
        author: author.clone(),
        content: content.to_string(),
        created_at,
        is_ai_suggestion: false,
        votes,
        score,
    }
}

pub fn demo_questions(now: DateTime<Utc>) -> Vec<(Question, Vec<Answer>)> {
    use VoteDirection::Up;

    let accounts = demo_accounts();

    vec![
        (
            question(
                "How should I structure document data for a social app?",
                "I'm building a social app and I'm unsure how to lay out posts, comments, and likes in a document database. What are the best practices?",
                &["databases", "modeling"],
                &accounts[2],
                now - Duration::days(1),
                votes(&[("user-1", Up), ("user-4", Up)]),
                150,
            ),
            vec![
                answer(
                    &accounts[1],
                    "Use sub-collections for comments and likes so your documents stay small and your queries stay cheap.",
                    now - Duration::hours(23),
                    votes(&[("user-4", Up)]),
                ),
                answer(
                    &accounts[4],
                    "Also consider duplicating some data to avoid complex joins. Storing the author's name on the post itself is a common trade-off.",
                    now - Duration::hours(22),
                    votes(&[]),
                ),
            ],
        ),
        (
            question(
                "What is the best way to handle state in a large frontend application?",
                "My app is growing and state management is getting hard. I've looked at several libraries and patterns. Which approach scales best?",
                &["frontend", "state-management"],
                &accounts[8],
                now - Duration::days(2),
                votes(&[("user-0", Up)]),
                75,
            ),
            vec![answer(
                &accounts[0],
                "For large applications, pick something compile-checked and testable over the ergonomic-but-implicit options.",
                now - Duration::days(2) + Duration::hours(4),
                votes(&[]),
            )],
        ),
        (
            question(
                "How do I add AI-powered suggestions to my web app?",
                "I want to call a hosted prompt endpoint from my app and show the answer inline. Can someone share a minimal end-to-end example?",
                &["ai", "prompts", "webdev"],
                &accounts[2],
                now - Duration::days(3),
                votes(&[("user-3", Up)]),
                230,
            ),
            vec![answer(
                &accounts[3],
                "Define the flow server-side with a typed input and output schema, then call it from your client like any other endpoint.",
                now - Duration::days(3) + Duration::hours(14),
                votes(&[]),
            )],
        ),
        (
            question(
                "Hackathon prize API integration problem",
                "I'm trying to connect to the prize API for the hackathon but I keep getting a 403. I'm fairly sure my API key is correct. Anyone else seen this?",
                &["hackathon", "api"],
                &accounts[8],
                now - Duration::hours(5),
                votes(&[("user-1", Up)]),
                50,
            ),
            vec![answer(
                &accounts[1],
                "Mentor here. Check that you send the `Authorization` header as `Bearer YOUR_API_KEY`. Let me know if that helps!",
                now - Duration::hours(4),
                votes(&[("user-8", Up)]),
            )],
        ),
    ]
}

#[cfg(test)]
mod seed_tests {
    use super::*;

    #[test]
    fn seeding_skips_only_when_questions_and_mentors_both_exist() {
        assert!(already_seeded(true, true));
        // either axis missing means the dataset is incomplete and gets written
        assert!(!already_seeded(true, false));
        assert!(!already_seeded(false, true));
        assert!(!already_seeded(false, false));
    }

    #[test]
    fn demo_dataset_shape() {
        let accounts = demo_accounts();
        assert_eq!(accounts.len(), 9);
        assert!(accounts.iter().filter(|a| a.is_mentor).count() >= 5);

        let questions = demo_questions(Utc::now());
        assert_eq!(questions.len(), 4);
        let total_answers: usize = questions.iter().map(|(_, answers)| answers.len()).sum();
        assert_eq!(total_answers, 5);
    }

    #[test]
    fn seeded_scores_match_their_vote_maps() {
        // seed data is the one place scores must be recomputable from the map
        for (question, answers) in demo_questions(Utc::now()) {
            let net: i32 = question
                .votes
                .values()
                .map(|d| match d {
                    VoteDirection::Up => 1,
                    VoteDirection::Down => -1,
                })
                .sum();
            assert_eq!(question.score, net);
            for answer in answers {
                let net: i32 = answer
                    .votes
                    .values()
                    .map(|d| match d {
                        VoteDirection::Up => 1,
                        VoteDirection::Down => -1,
                    })
                    .sum();
                assert_eq!(answer.score, net);
            }
        }
    }

    #[test]
    fn answers_are_older_than_now_and_newer_than_their_question() {
        let now = Utc::now();
        for (question, answers) in demo_questions(now) {
            for answer in answers {
                assert!(answer.created_at > question.created_at);
                assert!(answer.created_at < now);
            }
        }
    }
}
