//! Actor message definitions.
//!
//! ```text
//! WatchActor --OrchestratorMsg--> Orchestrator --ReloadMsg--> ReloadActor
//! ```

use std::path::PathBuf;

use crate::actor::watch::ChangeKind;
use crate::core::SourceCategory;

/// Messages to the orchestrator actor.
#[derive(Debug)]
pub enum OrchestratorMsg {
    /// A single source file inside a unit changed.
    SourceFile {
        path: PathBuf,
        category: SourceCategory,
        kind: ChangeKind,
    },
    /// A shared global file changed: refresh the whole category.
    GlobalChanged { category: SourceCategory },
    /// A new unit directory appeared and its settle delay elapsed.
    UnitAdded { name: String },
    /// A unit directory was deleted.
    UnitRemoved { name: String },
    /// Something was removed under the sizes tree: sweep the output for
    /// orphans after the debounce window.
    ScheduleReconcile,
    /// Shutdown
    Shutdown,
}

/// Messages to the reload actor.
pub enum ReloadMsg {
    /// Tell connected browsers to reload.
    Reload { reason: String },
    /// Register a new WebSocket client.
    AddClient(std::net::TcpStream),
    /// Shutdown
    Shutdown,
}
