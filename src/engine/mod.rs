pub mod memory_store;
pub mod orchestrator;
pub mod ready_index;
#[cfg(test)]
pub mod integration_tests;

pub use memory_store::InMemoryStore;
pub use orchestrator::Orchestrator;
pub use ready_index::ReadyIndex;
