//! Memory Layer - In-Memory State Management
//!
//! 标识符索引的内存实现

mod identifier_index;

pub use identifier_index::InMemoryIdentifierIndex;
