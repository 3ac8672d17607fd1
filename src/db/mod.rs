pub mod bingo_queries;
pub mod memory;
pub mod store;

pub use bingo_queries::PgBingoStore;
pub use memory::InMemoryStore;
pub use store::{BingoStore, BoardKey, EventSquares, SlotReplacement};
