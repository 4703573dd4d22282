//! contas-domain
//!
//! Pure domain models (Transaction, Category).
//! No I/O, no backend, no presentation. Only data types and core enums.

pub mod category;
pub mod common;
pub mod transaction;

pub use category::*;
pub use common::*;
pub use transaction::*;
