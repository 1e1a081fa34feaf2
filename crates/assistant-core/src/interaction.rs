//! Interaction Loop
//!
//! One submit: run the agent over the transcript plus the question, then
//! append both turns together. Agent failures never escape; they become the
//! answer.

use serde::{Deserialize, Serialize};

use crate::message::Message;
use crate::reasoning::{Agent, AgentStep};
use crate::session::Session;

/// Prefix of every answer produced from a failed agent run
pub const ERROR_PREFIX: &str = "An error occurred while processing your question: ";

/// Warning for a blank submit
pub const EMPTY_QUESTION_NOTICE: &str = "Please enter a question to continue.";

/// Shown while the agent is working
pub const PROCESSING_NOTICE: &str = "Generating response...";

/// Inline message shown next to the form
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", content = "text", rename_all = "lowercase")]
pub enum Notice {
    Info(String),
    Warning(String),
    Success(String),
    Error(String),
}

/// Result of an answered question
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Submission {
    /// Text appended to the transcript as the assistant turn
    pub answer: String,

    /// The agent run failed and `answer` carries [`ERROR_PREFIX`]
    pub failed: bool,

    /// Tool invocations the agent made
    pub steps: Vec<AgentStep>,

    /// Success or error notice for the response area
    pub notice: Notice,
}

/// Outcome of one submit
#[derive(Clone, Debug)]
pub enum SubmitOutcome {
    /// Two entries were appended
    Answered(Submission),
    /// Nothing changed; show the warning
    Rejected(Notice),
}

/// Handle one press of the submit button
///
/// The transcript is only written once the agent has returned, so dropping
/// the future mid-run leaves it untouched.
pub async fn submit(session: &mut Session, agent: &Agent, question: &str) -> SubmitOutcome {
    if question.trim().is_empty() {
        return SubmitOutcome::Rejected(Notice::Warning(EMPTY_QUESTION_NOTICE.into()));
    }

    tracing::info!(session = %session.id, turns = session.message_count(), "Processing question");

    let mut history = session.transcript.entries().to_vec();
    history.push(Message::user(question));
    let result = agent.run(&history).await;

    session.transcript.push_user(question);
    let submission = match result {
        Ok(run) => {
            session.transcript.push_assistant(&run.answer);
            Submission {
                notice: Notice::Success(run.answer.clone()),
                answer: run.answer,
                failed: false,
                steps: run.steps,
            }
        }
        Err(e) => {
            tracing::warn!(session = %session.id, error = %e, "Agent run failed");
            let answer = format!("{ERROR_PREFIX}{e}");
            session.transcript.push_assistant_error(&answer);
            Submission {
                notice: Notice::Error(answer.clone()),
                answer,
                failed: true,
                steps: Vec::new(),
            }
        }
    };

    session.touch();
    SubmitOutcome::Answered(submission)
}
