//! Live views over the store. Each subscription is a spawned task that
//! delivers a full snapshot after every relevant change, mirroring the push
//! feed of a hosted document database. Consumers get a handle whose drop (or
//! explicit `unsubscribe`) cancels the task, so tearing down the consuming
//! view always releases the feed.

use tokio::sync::{broadcast::error::RecvError, mpsc};
use tokio::task::JoinHandle;
use tracing::{Level, event};

use crate::store::{Change, Store};
use crate::types::question::{Question, QuestionId};

pub struct Subscription {
    task: JoinHandle<()>,
}

impl Subscription {
    pub fn unsubscribe(self) {
        // Drop does the work
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Streams the full question list, newest first. The first time an empty
/// list is observed the demo seed runs once; its own change notification
/// re-triggers this loop, so no explicit re-query happens here.
pub fn questions(store: Store, updates: mpsc::Sender<Vec<Question>>) -> Subscription {
    let task = tokio::spawn(async move {
        let mut changes = store.changes();
        let mut seed_attempted = false;

        loop {
            match store.list_questions().await {
                Ok(questions) => {
                    if questions.is_empty() && !seed_attempted {
                        seed_attempted = true;
                        if let Err(e) = store.seed_demo_data().await {
                            event!(Level::ERROR, "error seeding data: {}", e);
                            if updates.send(Vec::new()).await.is_err() {
                                return;
                            }
                        }
                    } else if updates.send(questions).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    event!(Level::ERROR, "error getting real-time questions: {}", e);
                    return;
                }
            }

            loop {
                match changes.recv().await {
                    Ok(Change::Questions) | Ok(Change::Question(_)) => break,
                    Ok(Change::Answers(_)) => continue,
                    Err(RecvError::Lagged(_)) => break,
                    Err(RecvError::Closed) => return,
                }
            }
        }
    });

    Subscription { task }
}

/// Streams one question composed with its ordered answers; `None` signals
/// that the document is gone, distinct from "not yet delivered". Opening the
/// feed bumps the view counter once, fire and forget.
pub fn question(
    store: Store,
    id: QuestionId,
    updates: mpsc::Sender<Option<Question>>,
) -> Subscription {
    let task = tokio::spawn(async move {
        let mut changes = store.changes();

        {
            let store = store.clone();
            let id = id.clone();
            tokio::spawn(async move {
                if let Err(e) = store.increment_views(&id).await {
                    event!(Level::ERROR, "failed to increment view count: {}", e);
                }
            });
        }

        loop {
            let snapshot = match store.get_question(&id).await {
                Ok(Some(mut question)) => {
                    match store.answers_for(&id).await {
                        Ok(answers) => question.answers = Some(answers),
                        Err(e) => {
                            // deliver the question even when its answers fail
                            event!(Level::ERROR, "error getting real-time answers: {}", e);
                        }
                    }
                    Some(question)
                }
                Ok(None) => None,
                Err(e) => {
                    event!(Level::ERROR, "error getting real-time question: {}", e);
                    return;
                }
            };

            if updates.send(snapshot).await.is_err() {
                return;
            }

            loop {
                match changes.recv().await {
                    Ok(Change::Question(changed)) if changed == id => break,
                    Ok(Change::Answers(parent)) if parent == id => break,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(_)) => break,
                    Err(RecvError::Closed) => return,
                }
            }
        }
    });

    Subscription { task }
}
