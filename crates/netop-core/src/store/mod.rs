// ── Storage backends ──

mod collection;
mod demo;
mod memory;
mod remote;

pub use memory::InMemoryStore;
pub use remote::RemoteStore;
