//! Account/device stores.

mod backend;
mod memory;

pub use backend::AccountStore;
pub use memory::MemoryStore;
