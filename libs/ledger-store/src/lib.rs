//! Backend'ы хранилища документов и gateway с таймаутами перед ними.

pub mod gateway;
pub mod memory;
pub mod mongo;

pub use gateway::StoreGateway;
pub use memory::MemoryStore;
pub use mongo::{MongoConfig, MongoStore};
