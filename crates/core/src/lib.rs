pub mod catalog;
pub mod config;
pub mod dialogue;
pub mod domain;
pub mod errors;
pub mod extract;
pub mod finalize;
pub mod money;
pub mod priority;
pub mod status;
pub mod store;

pub use catalog::{Catalog, ItemFamily, ItemId};
pub use dialogue::{DialogueEngine, Effect, QuickReply, Reply, Step, TurnContext};
pub use domain::conversation::{Conversation, DialogueState};
pub use domain::order::{Order, OrderLine, OrderType, PaymentMethod, Pending};
pub use errors::{BackendError, StatusError};
pub use extract::{ExtractedLine, ExtractedOrder, OrderExtractor};
pub use finalize::{
    build_submission, confirmation_message, normalize_phone, submission_failed_message,
    OrderBackend, OrderSubmission, SubmissionItem, SubmissionReceipt,
};
pub use money::{cents_to_decimal, format_brl, Cents};
pub use priority::{PrioritizedConversation, PriorityRegistry};
pub use status::{StoreStatus, StoreStatusCache, StoreStatusSource};
pub use store::ConversationStore;
