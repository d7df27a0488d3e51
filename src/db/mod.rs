//! Persistence module split across logical submodules. Every store operation
//! opens its own connection, so a write followed by a reload spans two
//! connections.

mod columns;
mod connection;
mod content;
mod subjects;

/// Everything outside this module goes through [`Store`]; the row-level
/// helpers stay private to their submodules.
pub use connection::Store;
