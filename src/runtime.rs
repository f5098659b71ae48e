//! Runtime for executing conversations
//!
//! Everything with side effects: persistence and transport ports, the
//! default in-memory store, keyboard removal and the engine that executes
//! resolved effects.

mod engine;
mod keyboard;
mod memory;
pub mod traits;


pub use engine::{ConversationEngine, EngineBuilder, Outcome, RunSummary};
pub use keyboard::KeyboardRemover;
pub use memory::InMemoryStore;
pub use traits::*;
