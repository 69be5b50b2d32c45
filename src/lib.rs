// TodoStore - persistent todo list over a pluggable key-value backend

pub mod config;
pub mod error;
pub mod kv;
pub mod render;
pub mod store;
pub mod task;

// Re-export main types for convenience
pub use error::{Result, TodoError};
pub use kv::{FileKv, KvStore, MemoryKv, SqliteKv};
pub use store::{STORAGE_KEY, TaskStore};
pub use task::{Stats, Task, escape_html, now_ms};
