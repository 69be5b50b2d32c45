//! Example 01: Basic Usage
//!
//! This example walks through the task list operations (add, toggle, rename,
//! delete, stats) over the in-memory backend, then shows the same list
//! surviving a reopen with the SQLite backend.
//!
//! Run with: cargo run --example 01_basic_usage

use eyre::Result;
use todostore::render::render;
use todostore::{MemoryKv, SqliteKv, TaskStore};

fn main() -> Result<()> {
    println!("TodoStore Basic Usage Example");
    println!("=============================\n");

    let mut store = TaskStore::open(MemoryKv::new())?;

    // ADD: new tasks go to the front of the list
    println!("1. ADD - Creating three tasks...");
    let milk = store.add("Buy milk")?;
    let dog = store.add("Walk the dog")?;
    store.add("Water the plants")?;
    println!("{}", render(store.tasks(), store.stats()));

    // Input is escaped before storage
    println!("2. ADD - Text is HTML-escaped before storage...");
    let escaped = store.add("Read \"Dune\" & <i>Hyperion</i>")?;
    println!("   Stored text: {}\n", escaped.text);

    // Empty input is rejected and nothing changes
    println!("3. ADD - Whitespace-only input is rejected...");
    match store.add("   ") {
        Ok(_) => println!("   Unexpected: task was created"),
        Err(e) => println!("   Rejected: {}\n", e),
    }

    // TOGGLE: flip completion
    println!("4. TOGGLE - Completing 'Buy milk'...");
    store.toggle(milk.id)?;
    println!("{}", render(store.tasks(), store.stats()));

    // RENAME: replace the text of an existing task
    println!("5. RENAME - Rewording 'Walk the dog'...");
    store.rename(dog.id, "Walk the dog twice")?;
    println!("{}", render(store.tasks(), store.stats()));

    // DELETE: remove by id
    println!("6. DELETE - Removing 'Buy milk'...");
    store.delete(milk.id)?;
    println!("{}", render(store.tasks(), store.stats()));

    // PERSISTENCE: the same operations against SQLite survive a reopen
    println!("7. PERSISTENCE - Reopening a SQLite-backed store...");
    let temp_dir = tempfile::tempdir()?;
    let db_path = temp_dir.path().join("tasks.db");

    {
        let mut store = TaskStore::open(SqliteKv::open(&db_path)?)?;
        store.add("Persisted task")?;
    }

    let store = TaskStore::open(SqliteKv::open(&db_path)?)?;
    println!("   Tasks after reopen: {}", store.stats().total);
    println!("{}", render(store.tasks(), store.stats()));

    println!("Example complete!");
    Ok(())
}
