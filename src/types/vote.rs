use serde::{Deserialize, Serialize};

use crate::types::{account::AccountId, answer::AnswerId, question::QuestionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    fn sign(self) -> i32 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }
}

/// Vote cast by a signed-in user. An answer vote carries both the owning
/// question id and the answer id; a question vote carries only the former.
#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct NewVote {
    pub question_id: QuestionId,
    pub answer_id: Option<AnswerId>,
    pub direction: VoteDirection,
}

/// Result of applying one vote request against the voter's current entry in
/// the record's vote map. The same signed delta is applied to the record's
/// score and the author's reputation.
#[derive(Debug, PartialEq, Eq)]
pub struct VoteTransition {
    pub entry: Option<VoteDirection>,
    pub delta: i32,
}

/// Whether a vote by `voter` on a record written by `author` counts at all.
/// Anonymous-authored content has no reputation to move, and voting on your
/// own content is silently ignored rather than rejected.
pub fn affects_record(author: &AccountId, voter: &AccountId) -> bool {
    !author.is_anonymous() && author != voter
}

pub fn transition(current: Option<VoteDirection>, requested: VoteDirection) -> VoteTransition {
    match current {
        // same direction again: the voter is taking their vote back
        Some(existing) if existing == requested => VoteTransition {
            entry: None,
            delta: -requested.sign(),
        },
        // opposite direction: undo the old vote and apply the new one
        Some(_) => VoteTransition {
            entry: Some(requested),
            delta: 2 * requested.sign(),
        },
        None => VoteTransition {
            entry: Some(requested),
            delta: requested.sign(),
        },
    }
}

#[cfg(test)]
mod vote_transition_tests {
    use super::VoteDirection::{Down, Up};
    use super::*;

    #[test]
    fn first_vote_counts_once() {
        assert_eq!(
            transition(None, Up),
            VoteTransition {
                entry: Some(Up),
                delta: 1
            }
        );
        assert_eq!(
            transition(None, Down),
            VoteTransition {
                entry: Some(Down),
                delta: -1
            }
        );
    }

    #[test]
    fn repeating_a_vote_retracts_it() {
        let first = transition(None, Up);
        let second = transition(first.entry, Up);
        assert_eq!(second.entry, None);
        // the two deltas cancel, leaving the score where it started
        assert_eq!(first.delta + second.delta, 0);

        let first = transition(None, Down);
        let second = transition(first.entry, Down);
        assert_eq!(second.entry, None);
        assert_eq!(first.delta + second.delta, 0);
    }

    #[test]
    fn flipping_a_vote_moves_the_score_by_two() {
        let up = transition(None, Up);
        let flipped = transition(up.entry, Down);
        assert_eq!(flipped.entry, Some(Down));
        assert_eq!(flipped.delta, -2);

        let down = transition(None, Down);
        let flipped = transition(down.entry, Up);
        assert_eq!(flipped.entry, Some(Up));
        assert_eq!(flipped.delta, 2);
    }

    #[test]
    fn self_votes_change_nothing() {
        let author = AccountId("user-1".to_string());
        assert!(!affects_record(&author, &author));
    }

    #[test]
    fn votes_on_anonymous_content_change_nothing() {
        let author = AccountId(crate::types::account::ANONYMOUS.to_string());
        let voter = AccountId("user-2".to_string());
        assert!(!affects_record(&author, &voter));
        // not even the anonymous identity voting on itself
        assert!(!affects_record(&author, &author));
    }

    #[test]
    fn votes_between_distinct_signed_in_users_count() {
        let author = AccountId("user-1".to_string());
        let voter = AccountId("user-2".to_string());
        assert!(affects_record(&author, &voter));
    }

    #[test]
    fn long_sequences_stay_consistent() {
        // up, up (retract), down, up (flip) ends with an up entry at +1 net
        let mut entry = None;
        let mut score = 0;
        for requested in [Up, Up, Down, Up] {
            let t = transition(entry, requested);
            entry = t.entry;
            score += t.delta;
        }
        assert_eq!(entry, Some(Up));
        assert_eq!(score, 1);
    }
}
