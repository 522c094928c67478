//! Repository implementations.
//!
//! One repository per aggregate: inventory (products + stock), transactions
//! (sales + items), alerts (low-stock notifications). Pool-holding methods
//! serve standalone reads; `*_on` associated functions take an explicit
//! connection so the engine can compose them into one unit of work.

pub mod alert;
pub mod inventory;
pub mod transaction;
