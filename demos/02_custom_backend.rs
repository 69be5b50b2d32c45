//! Example 02: Custom Backend
//!
//! The store persists through the `KvStore` trait, so any string-keyed
//! storage can stand in for the built-in backends. This example implements
//! a backend that counts writes, making the write-through behavior visible:
//! every successful mutation rewrites the list exactly once.
//!
//! Run with: cargo run --example 02_custom_backend

use eyre::Result;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use todostore::{KvStore, TaskStore};

/// In-memory backend that keeps a shared write counter.
#[derive(Clone, Default)]
struct CountingKv {
    entries: Rc<RefCell<HashMap<String, String>>>,
    writes: Rc<RefCell<usize>>,
}

impl KvStore for CountingKv {
    fn get(&self, key: &str) -> todostore::Result<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> todostore::Result<()> {
        *self.writes.borrow_mut() += 1;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

fn main() -> Result<()> {
    println!("TodoStore Custom Backend Example");
    println!("================================\n");

    // Keep a handle on the backend before the store takes ownership
    let kv = CountingKv::default();
    let writes = Rc::clone(&kv.writes);
    let entries = Rc::clone(&kv.entries);

    let mut store = TaskStore::open(kv)?;
    println!("Writes after open: {}", writes.borrow());

    println!("\nAdding two tasks...");
    let first = store.add("Learn the KvStore trait")?;
    store.add("Wire it to real storage")?;
    println!("Writes so far: {}", writes.borrow());

    println!("\nToggling one task...");
    store.toggle(first.id)?;
    println!("Writes so far: {}", writes.borrow());

    println!("\nToggling an unknown id (no-op, no write)...");
    store.toggle(999)?;
    println!("Writes so far: {}", writes.borrow());

    println!("\nRaw persisted document:");
    for (key, value) in entries.borrow().iter() {
        println!("  {} => {}", key, value);
    }

    println!("\nExample complete!");
    Ok(())
}
