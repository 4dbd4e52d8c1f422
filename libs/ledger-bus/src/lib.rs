//! Backend'ы шины сообщений: NATS для развёртывания и in-process bus для
//! тестов. Построчный publisher работает с любым из них.

pub mod memory;
pub mod nats;
pub mod publisher;

pub use memory::{MemoryBus, MemorySubscription, OverflowPolicy};
pub use nats::{NatsBus, NatsConfig, NatsSubscription};
pub use publisher::{PublishReport, publish_lines};
