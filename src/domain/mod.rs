//! Plain data types shared by the core engines, storage and the shell.

pub mod common;
pub mod transaction;

pub use common::{Displayable, Identifiable};
pub use transaction::Transaction;
