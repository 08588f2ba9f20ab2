#[cfg(any(target_arch = "wasm32", target_os = "android"))]
pub mod bundle;
pub mod definition;
pub mod loader;

pub use definition::TestDefinition;
pub use loader::{ContentLoader, DirectoryContent, MemoryContent};
