//! Storage contracts and their in-memory implementations.

mod snippets;
mod users;

pub use snippets::{MemorySnippetStore, Snippet, SnippetStore};
pub use users::{MemoryUserStore, User, UserStore};
