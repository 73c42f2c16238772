//! Application record storage adapters

mod memory;

pub use memory::InMemoryApplicationRepository;
