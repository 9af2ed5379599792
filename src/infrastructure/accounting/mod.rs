mod in_memory_accounting;

pub use in_memory_accounting::InMemoryAccounting;
