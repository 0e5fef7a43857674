pub mod pool;

pub use pool::{close_pool, create_pool};
