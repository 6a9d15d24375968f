#![allow(clippy::missing_errors_doc)]

mod commands;
mod fallback;
mod host;
#[cfg(any(test, feature = "testing"))]
mod memory;
mod paths;
mod system;

pub use commands::{HideWindow, capture_output};
pub use fallback::FallbackChain;
pub use host::{HomeDirError, HostSystem};
#[cfg(any(test, feature = "testing"))]
pub use memory::MemorySystem;
pub use paths::{BACKUP_DIR_NAME, InstallLayout};
pub use system::{CommandOutput, HostOs, PathInfo, System, is_permission_denied};
