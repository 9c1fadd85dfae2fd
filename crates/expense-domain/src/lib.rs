//! expense-domain
//!
//! Pure data types for the expense ledger (entries, raw rows, queries, results).
//! No I/O, no parsing of user commands, no storage. Only data types and core enums.

pub mod category;
pub mod common;
pub mod contact;
pub mod entry;
pub mod money;
pub mod query;
pub mod row;

pub use category::*;
pub use common::*;
pub use contact::*;
pub use entry::*;
pub use money::*;
pub use query::*;
pub use row::*;
