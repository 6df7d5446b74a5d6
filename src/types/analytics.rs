use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::types::{answer::Answer, question::Question};

/// Derived platform statistics. Never persisted; recomputed from full
/// collection scans on every request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsData {
    pub total_questions: usize,
    pub total_answers: usize,
    pub total_users: usize,
    pub total_ai_answers: usize,
    pub tag_counts: HashMap<String, u32>,
}

impl AnalyticsData {
    pub fn fold(questions: &[Question], answers: &[Answer], total_users: usize) -> Self {
        let mut tag_counts: HashMap<String, u32> = HashMap::new();
        for question in questions {
            for tag in &question.tags {
                *tag_counts.entry(tag.clone()).or_insert(0) += 1;
            }
        }

        let total_ai_answers = answers
            .iter()
            .filter(|answer| answer.is_ai_suggestion)
            .count();

        AnalyticsData {
            total_questions: questions.len(),
            total_answers: answers.len(),
            total_users,
            total_ai_answers,
            tag_counts,
        }
    }
}

#[cfg(test)]
mod analytics_tests {
    use chrono::Utc;
    use std::collections::HashMap as Map;

    use super::*;
    use crate::types::{
        account::Account,
        answer::AnswerId,
        question::QuestionId,
    };

    fn question(id: &str, tags: &[&str]) -> Question {
        Question {
            id: QuestionId(id.to_string()),
            title: "title long enough".to_string(),
            content: "content long enough to pass validation".to_string(),
            tags: tags.iter().map(|t| t.to_string()).collect(),
            author: Account::anonymous(),
            created_at: Utc::now(),
            votes: Map::new(),
            score: 0,
            views: 0,
            image_url: None,
            answers: None,
        }
    }

    fn answer(id: &str, ai: bool) -> Answer {
        Answer {
            id: AnswerId(id.to_string()),
            author: Account::anonymous(),
            content: "an answer of reasonable length".to_string(),
            created_at: Utc::now(),
            is_ai_suggestion: ai,
            votes: Map::new(),
            score: 0,
        }
    }

    #[test]
    fn folds_counts_and_tag_histogram() {
        let questions = vec![
            question("q1", &["firebase", "react"]),
            question("q2", &["react"]),
            question("q3", &["ai"]),
            question("q4", &["firebase"]),
        ];
        let answers = vec![answer("a1", true), answer("a2", false), answer("a3", true)];

        let data = AnalyticsData::fold(&questions, &answers, 9);

        assert_eq!(data.total_questions, 4);
        assert_eq!(data.total_answers, 3);
        assert_eq!(data.total_ai_answers, 2);
        assert_eq!(data.total_users, 9);
        assert_eq!(data.tag_counts.get("firebase"), Some(&2));
        assert_eq!(data.tag_counts.get("react"), Some(&2));
        assert_eq!(data.tag_counts.get("ai"), Some(&1));
        // every tag occurrence across all questions is accounted for
        assert_eq!(data.tag_counts.values().sum::<u32>(), 5);
    }

    #[test]
    fn empty_dataset_folds_to_zeroes() {
        let data = AnalyticsData::fold(&[], &[], 0);
        assert_eq!(data.total_questions, 0);
        assert_eq!(data.total_answers, 0);
        assert_eq!(data.total_ai_answers, 0);
        assert!(data.tag_counts.is_empty());
    }
}
