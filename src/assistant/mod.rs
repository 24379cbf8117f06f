//! Natural-language questions about the facility.
//!
//! [`QueryRouter`] tries a [`ParkingAgent`] under a deadline and falls back
//! to the deterministic intent classifier and templated answers.

pub mod agent;
#[cfg(feature = "chat-agent")]
pub mod chat;
pub mod fallback;
pub mod intent;
pub mod router;
pub mod tools;

pub use agent::{DirectAgent, ParkingAgent};
#[cfg(feature = "chat-agent")]
pub use chat::{parse_reply, ChatCompletionsAgent, Reply, RequestedCall};
pub use fallback::{respond, HELP_TEXT};
pub use intent::{classify, QueryIntent, RevenuePeriod, DEFAULT_REVENUE_HOURS, KNOWN_COLORS};
pub use router::{Answer, AnswerSource, QueryRouter};
pub use tools::{ParkingTools, ToolCall};
