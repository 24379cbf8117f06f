//! Arbitration between the agent path and the deterministic fallback.
//!
//! The agent runs under a deadline. Timeout, error or a disabled agent all
//! route to the fallback; a successful agent answer is returned as is. The
//! router only ever reads snapshots, so it never holds the facility lock
//! while the agent is working.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::assistant::{classify, respond, ParkingAgent, ParkingTools, HELP_TEXT};
use crate::core::{AgentError, AnalyticsAggregator, SnapshotSource};

/// Which path produced an answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerSource {
    /// The agent answered in time.
    Agent,
    /// A deterministic handler answered.
    Fallback,
    /// Nothing matched; the help text was returned.
    Unanswered,
}

/// Answer to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    /// Text shown to the user.
    pub text: String,
    /// Path that produced it.
    pub source: AnswerSource,
}

/// Routes questions to the agent or the fallback handlers.
pub struct QueryRouter {
    source: Arc<dyn SnapshotSource>,
    agent: Option<Arc<dyn ParkingAgent>>,
    timeout: Duration,
    agent_enabled: bool,
}

impl QueryRouter {
    /// Router answering from `source` with the fallback only.
    pub fn new(source: Arc<dyn SnapshotSource>, timeout: Duration) -> Self {
        Self {
            source,
            agent: None,
            timeout,
            agent_enabled: false,
        }
    }

    /// Try `agent` first.
    #[must_use]
    pub fn with_agent(mut self, agent: Arc<dyn ParkingAgent>) -> Self {
        self.agent = Some(agent);
        self.agent_enabled = true;
        self
    }

    /// Toggle the agent path without dropping the agent.
    #[must_use]
    pub const fn agent_enabled(mut self, enabled: bool) -> Self {
        self.agent_enabled = enabled;
        self
    }

    /// Agent deadline.
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Answer `question`.
    pub async fn answer(&self, question: &str) -> Answer {
        match self.ask_agent(question).await {
            Ok(text) => Answer {
                text,
                source: AnswerSource::Agent,
            },
            Err(AgentError::Disabled) => self.fallback(question),
            Err(err) => {
                tracing::warn!(error = %err, "agent path failed, using fallback");
                self.fallback(question)
            }
        }
    }

    /// Answer `question` with the deterministic handlers only.
    pub fn fallback(&self, question: &str) -> Answer {
        let snapshot = self.source.snapshot();
        match classify(question, snapshot.taken_at) {
            Some(intent) => Answer {
                text: respond(&intent, &AnalyticsAggregator::new(&snapshot)),
                source: AnswerSource::Fallback,
            },
            None => Answer {
                text: HELP_TEXT.to_string(),
                source: AnswerSource::Unanswered,
            },
        }
    }

    async fn ask_agent(&self, question: &str) -> Result<String, AgentError> {
        let agent = match &self.agent {
            Some(agent) if self.agent_enabled => agent,
            _ => return Err(AgentError::Disabled),
        };
        let tools = ParkingTools::new(Arc::clone(&self.source));
        tracing::debug!(agent = agent.name(), timeout = ?self.timeout, "asking agent");
        let text = tokio::time::timeout(self.timeout, agent.ask(question, &tools))
            .await
            .map_err(|_| AgentError::Timeout(self.timeout))??;
        if text.trim().is_empty() {
            return Err(AgentError::Malformed("empty answer".into()));
        }
        Ok(text)
    }
}
