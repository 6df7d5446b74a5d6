use handle_errors::Error;
use serde_json::Value;
use sqlx::{
    Row,
    postgres::{PgPool, PgPoolOptions, PgRow},
};
use tokio::sync::broadcast;
use tracing::{Level, event};

use crate::normalize;
use crate::seed;
use crate::types::{
    account::{Account, AccountId, NewSession},
    analytics::AnalyticsData,
    answer::Answer,
    pagination::Pagination,
    question::{Question, QuestionId},
    vote::{self, NewVote, VoteDirection},
};

/// Notification emitted after every committed write. The service is the sole
/// writer, so this channel stands in for the database's own push feed.
#[derive(Debug, Clone)]
pub enum Change {
    Questions,
    Question(QuestionId),
    Answers(QuestionId),
}

#[derive(Debug, Clone)]
pub struct Store {
    pub connection: PgPool,
    changes: broadcast::Sender<Change>,
}

fn question_from_doc(doc: Value) -> Result<Question, Error> {
    serde_json::from_value(normalize::timestamps_to_dates(doc)).map_err(Error::SerializationError)
}

fn answer_from_doc(doc: Value) -> Result<Answer, Error> {
    serde_json::from_value(normalize::timestamps_to_dates(doc)).map_err(Error::SerializationError)
}

fn question_doc(question: &Question) -> Result<Value, Error> {
    let mut doc = serde_json::to_value(question).map_err(Error::SerializationError)?;
    doc["createdAt"] = normalize::wire_timestamp(question.created_at);
    Ok(doc)
}

fn answer_doc(answer: &Answer) -> Result<Value, Error> {
    let mut doc = serde_json::to_value(answer).map_err(Error::SerializationError)?;
    doc["createdAt"] = normalize::wire_timestamp(answer.created_at);
    Ok(doc)
}

impl Store {
    pub async fn new(db_url: &str) -> Result<Self, sqlx::Error> {
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(db_url)
            .await?;
        let (changes, _) = broadcast::channel(64);

        Ok(Store {
            connection: db_pool,
            changes,
        })
    }

    pub fn changes(&self) -> broadcast::Receiver<Change> {
        self.changes.subscribe()
    }

    fn notify(&self, change: Change) {
        // nobody listening is fine
        let _ = self.changes.send(change);
    }

    /// All questions, newest first. Snapshot source for the list subscription.
    pub async fn list_questions(&self) -> Result<Vec<Question>, Error> {
        let docs = sqlx::query("SELECT doc FROM questions ORDER BY created_at DESC")
            .map(|row: PgRow| row.get::<Value, _>("doc"))
            .fetch_all(&self.connection)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;

        docs.into_iter().map(question_from_doc).collect()
    }

    /// One-shot paginated read for the REST listing.
    pub async fn get_questions(&self, pagination: Pagination) -> Result<Vec<Question>, Error> {
        let docs = sqlx::query(
            "SELECT doc FROM questions ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(pagination.limit)
        .bind(pagination.offset)
        .map(|row: PgRow| row.get::<Value, _>("doc"))
        .fetch_all(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        docs.into_iter().map(question_from_doc).collect()
    }

    pub async fn get_question(&self, id: &QuestionId) -> Result<Option<Question>, Error> {
        let doc = sqlx::query("SELECT doc FROM questions WHERE id = $1")
            .bind(&id.0)
            .map(|row: PgRow| row.get::<Value, _>("doc"))
            .fetch_optional(&self.connection)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;

        doc.map(question_from_doc).transpose()
    }

    /// Answers of one question, best score first, earlier answers winning ties.
    pub async fn answers_for(&self, question_id: &QuestionId) -> Result<Vec<Answer>, Error> {
        let docs = sqlx::query(
            "SELECT doc FROM answers WHERE question_id = $1 ORDER BY score DESC, created_at ASC",
        )
        .bind(&question_id.0)
        .map(|row: PgRow| row.get::<Value, _>("doc"))
        .fetch_all(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        docs.into_iter().map(answer_from_doc).collect()
    }

    pub async fn add_question(&self, question: Question) -> Result<Question, Error> {
        let doc = question_doc(&question)?;

        sqlx::query(
            "INSERT INTO questions (id, doc, created_at, score, image_url)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&question.id.0)
        .bind(&doc)
        .bind(question.created_at)
        .bind(question.score)
        .bind(&question.image_url)
        .execute(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        // asking rewards the author; best-effort, outside the insert
        if !question.author.uid.is_anonymous() {
            self.add_reputation(&question.author.uid, 2).await?;
        }

        self.notify(Change::Questions);
        Ok(question)
    }

    pub async fn add_answer(
        &self,
        question_id: &QuestionId,
        answer: Answer,
    ) -> Result<Answer, Error> {
        if self.get_question(question_id).await?.is_none() {
            return Err(Error::RecordNotFound);
        }

        let doc = answer_doc(&answer)?;

        sqlx::query(
            "INSERT INTO answers (id, question_id, doc, created_at, score)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(&answer.id.0)
        .bind(&question_id.0)
        .bind(&doc)
        .bind(answer.created_at)
        .bind(answer.score)
        .execute(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        if !answer.author.uid.is_anonymous() {
            self.add_reputation(&answer.author.uid, 5).await?;
        }

        self.notify(Change::Answers(question_id.clone()));
        Ok(answer)
    }

    async fn add_reputation(&self, uid: &AccountId, amount: i32) -> Result<(), Error> {
        sqlx::query("UPDATE accounts SET score = score + $1 WHERE uid = $2")
            .bind(amount)
            .bind(&uid.0)
            .execute(&self.connection)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;
        Ok(())
    }

    /// Applies one vote under a row lock so concurrent voters cannot race on
    /// the same vote map. Vote map, record score and author reputation move
    /// in the same transaction; either all of it lands or none does.
    pub async fn cast_vote(&self, new_vote: &NewVote, voter: &AccountId) -> Result<(), Error> {
        let mut tx = self.connection.begin().await.map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        let row = match &new_vote.answer_id {
            Some(answer_id) => {
                sqlx::query("SELECT doc FROM answers WHERE id = $1 AND question_id = $2 FOR UPDATE")
                    .bind(&answer_id.0)
                    .bind(&new_vote.question_id.0)
                    .fetch_optional(&mut *tx)
                    .await
            }
            None => {
                sqlx::query("SELECT doc FROM questions WHERE id = $1 FOR UPDATE")
                    .bind(&new_vote.question_id.0)
                    .fetch_optional(&mut *tx)
                    .await
            }
        }
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        let mut doc: Value = match row {
            Some(row) => row.get("doc"),
            None => return Err(Error::RecordNotFound),
        };

        let author = AccountId(
            doc.get("author")
                .and_then(|author| author.get("uid"))
                .and_then(Value::as_str)
                .unwrap_or(crate::types::account::ANONYMOUS)
                .to_string(),
        );

        if !vote::affects_record(&author, voter) {
            return Ok(());
        }

        let current = doc
            .get("votes")
            .and_then(|votes| votes.get(&voter.0))
            .cloned()
            .and_then(|value| serde_json::from_value::<VoteDirection>(value).ok());

        let transition = vote::transition(current, new_vote.direction);

        if !doc.get("votes").map(Value::is_object).unwrap_or(false) {
            doc["votes"] = serde_json::json!({});
        }
        if let Some(votes) = doc["votes"].as_object_mut() {
            match transition.entry {
                Some(direction) => {
                    votes.insert(voter.0.clone(), serde_json::json!(direction));
                }
                None => {
                    votes.remove(&voter.0);
                }
            }
        }
        let score = doc.get("score").and_then(Value::as_i64).unwrap_or(0)
            + i64::from(transition.delta);
        doc["score"] = serde_json::json!(score);
        let column_score = i32::try_from(score).map_err(|_| {
            Error::InvalidInput("vote total is out of the storable range".to_string())
        })?;

        let update = match &new_vote.answer_id {
            Some(answer_id) => sqlx::query("UPDATE answers SET doc = $1, score = $2 WHERE id = $3")
                .bind(&doc)
                .bind(column_score)
                .bind(&answer_id.0),
            None => sqlx::query("UPDATE questions SET doc = $1, score = $2 WHERE id = $3")
                .bind(&doc)
                .bind(column_score)
                .bind(&new_vote.question_id.0),
        };
        update.execute(&mut *tx).await.map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        sqlx::query("UPDATE accounts SET score = score + $1 WHERE uid = $2")
            .bind(transition.delta)
            .bind(&author.0)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;

        tx.commit().await.map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        match &new_vote.answer_id {
            Some(_) => self.notify(Change::Answers(new_vote.question_id.clone())),
            None => self.notify(Change::Question(new_vote.question_id.clone())),
        }
        Ok(())
    }

    /// Bumps the view counter inside the stored document. Plain increment, no
    /// lock: views are best-effort telemetry, unlike votes.
    pub async fn increment_views(&self, id: &QuestionId) -> Result<(), Error> {
        let result = sqlx::query(
            "UPDATE questions
             SET doc = jsonb_set(doc, '{views}', to_jsonb(COALESCE((doc->>'views')::int, 0) + 1))
             WHERE id = $1",
        )
        .bind(&id.0)
        .execute(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        if result.rows_affected() == 0 {
            return Err(Error::RecordNotFound);
        }

        self.notify(Change::Question(id.clone()));
        Ok(())
    }

    fn account_from_row(row: PgRow) -> Account {
        Account {
            uid: AccountId(row.get("uid")),
            display_name: row.get("display_name"),
            photo_url: row.get("photo_url"),
            score: row.get("score"),
            is_mentor: row.get("is_mentor"),
        }
    }

    pub async fn leaderboard(&self) -> Result<Vec<Account>, Error> {
        sqlx::query(
            "SELECT uid, display_name, photo_url, score, is_mentor
             FROM accounts ORDER BY score DESC",
        )
        .map(Self::account_from_row)
        .fetch_all(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })
    }

    pub async fn mentors(&self) -> Result<Vec<Account>, Error> {
        let mentors = self.mentor_rows().await?;
        if !mentors.is_empty() {
            return Ok(mentors);
        }
        // an empty mentor directory means a fresh database
        self.seed_demo_data().await?;
        self.mentor_rows().await
    }

    async fn mentor_rows(&self) -> Result<Vec<Account>, Error> {
        sqlx::query(
            "SELECT uid, display_name, photo_url, score, is_mentor
             FROM accounts WHERE is_mentor ORDER BY display_name ASC",
        )
        .map(Self::account_from_row)
        .fetch_all(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })
    }

    pub async fn get_account(&self, uid: &AccountId) -> Result<Option<Account>, Error> {
        sqlx::query(
            "SELECT uid, display_name, photo_url, score, is_mentor
             FROM accounts WHERE uid = $1",
        )
        .bind(&uid.0)
        .map(Self::account_from_row)
        .fetch_optional(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })
    }

    /// Creates the profile on first sign-in; later sign-ins leave the stored
    /// profile untouched.
    pub async fn ensure_account(&self, session: &NewSession) -> Result<(), Error> {
        sqlx::query(
            "INSERT INTO accounts (uid, display_name, photo_url, score, is_mentor)
             VALUES ($1, $2, $3, 0, FALSE)
             ON CONFLICT (uid) DO NOTHING",
        )
        .bind(&session.uid.0)
        .bind(&session.display_name)
        .bind(&session.photo_url)
        .execute(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;
        Ok(())
    }

    /// Full recomputation over three collection scans.
    pub async fn analytics(&self) -> Result<AnalyticsData, Error> {
        let questions = self.list_questions().await?;

        let answer_docs = sqlx::query("SELECT doc FROM answers")
            .map(|row: PgRow| row.get::<Value, _>("doc"))
            .fetch_all(&self.connection)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;
        let answers = answer_docs
            .into_iter()
            .map(answer_from_doc)
            .collect::<Result<Vec<Answer>, Error>>()?;

        let total_users: i64 = sqlx::query("SELECT COUNT(*) AS count FROM accounts")
            .map(|row: PgRow| row.get::<i64, _>("count"))
            .fetch_one(&self.connection)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;

        Ok(AnalyticsData::fold(
            &questions,
            &answers,
            total_users as usize,
        ))
    }

    pub async fn questions_with_images(&self) -> Result<Vec<Question>, Error> {
        let docs = sqlx::query(
            "SELECT doc FROM questions
             WHERE image_url IS NOT NULL
             ORDER BY image_url ASC, created_at DESC",
        )
        .map(|row: PgRow| row.get::<Value, _>("doc"))
        .fetch_all(&self.connection)
        .await
        .map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        docs.into_iter().map(question_from_doc).collect()
    }

    /// Writes the demo dataset unless questions and mentors already exist.
    /// Best-effort idempotence: two simultaneous first loads can both pass
    /// the pre-check and double-seed question documents; accounts are safe
    /// behind the conflict clause. Accepted limitation.
    pub async fn seed_demo_data(&self) -> Result<(), Error> {
        let has_questions: bool = sqlx::query("SELECT EXISTS(SELECT 1 FROM questions) AS present")
            .map(|row: PgRow| row.get::<bool, _>("present"))
            .fetch_one(&self.connection)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;

        let has_mentors: bool =
            sqlx::query("SELECT EXISTS(SELECT 1 FROM accounts WHERE is_mentor) AS present")
                .map(|row: PgRow| row.get::<bool, _>("present"))
                .fetch_one(&self.connection)
                .await
                .map_err(|e| {
                    event!(Level::ERROR, "{:?}", e);
                    Error::DatabaseQueryError(e)
                })?;

        if seed::already_seeded(has_questions, has_mentors) {
            event!(Level::INFO, "data already exists, skipping seed");
            return Ok(());
        }

        event!(Level::INFO, "seeding demo data");

        let mut tx = self.connection.begin().await.map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        for account in seed::demo_accounts() {
            sqlx::query(
                "INSERT INTO accounts (uid, display_name, photo_url, score, is_mentor)
                 VALUES ($1, $2, $3, $4, $5)
                 ON CONFLICT (uid) DO NOTHING",
            )
            .bind(&account.uid.0)
            .bind(&account.display_name)
            .bind(&account.photo_url)
            .bind(account.score)
            .bind(account.is_mentor)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                event!(Level::ERROR, "{:?}", e);
                Error::DatabaseQueryError(e)
            })?;
        }

        if !has_questions {
            for (question, answers) in seed::demo_questions(chrono::Utc::now()) {
                let doc = question_doc(&question)?;
                sqlx::query(
                    "INSERT INTO questions (id, doc, created_at, score, image_url)
                     VALUES ($1, $2, $3, $4, $5)",
                )
                .bind(&question.id.0)
                .bind(&doc)
                .bind(question.created_at)
                .bind(question.score)
                .bind(&question.image_url)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    event!(Level::ERROR, "{:?}", e);
                    Error::DatabaseQueryError(e)
                })?;

                for answer in answers {
                    let doc = answer_doc(&answer)?;
                    sqlx::query(
                        "INSERT INTO answers (id, question_id, doc, created_at, score)
                         VALUES ($1, $2, $3, $4, $5)",
                    )
                    .bind(&answer.id.0)
                    .bind(&question.id.0)
                    .bind(&doc)
                    .bind(answer.created_at)
                    .bind(answer.score)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        event!(Level::ERROR, "{:?}", e);
                        Error::DatabaseQueryError(e)
                    })?;
                }
            }
        }

        tx.commit().await.map_err(|e| {
            event!(Level::ERROR, "{:?}", e);
            Error::DatabaseQueryError(e)
        })?;

        self.notify(Change::Questions);
        Ok(())
    }
}
