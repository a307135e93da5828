//! Server-side sessions.
//!
//! State handed to handlers plus the store contract it persists through.

mod state;
mod store;

pub use state::{Session, SessionRecord, SessionValue, Status, generate_token, store_key};
pub(crate) use state::CommitPlan;
pub use store::{MemoryStore, SessionStore};
