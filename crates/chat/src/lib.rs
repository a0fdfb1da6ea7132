//! Chat channel integration for braseiro:
//! - **Transport** (`transport`) - the messaging-channel seam (connect,
//!   receive, send) plus reconnect policy
//! - **Runner** (`runner`) - the inbound pump with reconnection logic
//! - **Session** (`session`) - per-message orchestration of the dialogue
//!   engine, order submission, and priority handling
//! - **Follow-up** (`followup`) - delayed acknowledgement after an
//!   agent-handoff request
//! - **Outbox** (`outbox`) - queue for unsolicited outbound messages
//!
//! The dialogue itself lives in `braseiro-core`; this crate only moves
//! messages in and out and executes the effects a turn produces.

pub mod followup;
pub mod outbox;
pub mod runner;
pub mod session;
pub mod transport;

pub use followup::{follow_up_text, FollowUpScheduler};
pub use outbox::SendQueue;
pub use runner::ChatRunner;
pub use session::SessionService;
pub use transport::{
    ChatTransport, InboundMessage, NoopChatTransport, OutboundMessage, ReconnectPolicy,
    TransportError, MAX_QUICK_REPLIES,
};
