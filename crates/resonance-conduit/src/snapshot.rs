//! Binary persistence for a [`ConduitModule`].
//!
//! Only node positions and their adjacency flags are stored, together with
//! the configuration and tick counter. Network caches are never written:
//! every loaded node starts invalid and rediscovers its network on its first
//! tick.

use resonance_core::fixed::Ticks;
use resonance_core::pos::{CellPos, SideMask};
use serde::{Deserialize, Serialize};

use crate::config::ConduitConfig;
use crate::node::ConduitNode;
use crate::watcher::ConduitModule;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a conduit module snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0x5E50_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every snapshot, checked before the payload is used.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Module tick at the time the snapshot was taken.
    pub tick: Ticks,
}

impl SnapshotHeader {
    pub fn new(tick: Ticks) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            tick,
        }
    }

    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Payload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
struct NodeRecord {
    pos: CellPos,
    connections: SideMask,
}

#[derive(Debug, Serialize, Deserialize)]
struct ModuleSnapshot {
    header: SnapshotHeader,
    config: ConduitConfig,
    nodes: Vec<NodeRecord>,
}

/// Decode only far enough to return the header.
pub fn read_snapshot_header(data: &[u8]) -> Result<SnapshotHeader, DeserializeError> {
    let snapshot: ModuleSnapshot =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    Ok(snapshot.header)
}

impl ConduitModule {
    /// Encode every node's position and adjacency flags.
    pub fn serialize(&self) -> Result<Vec<u8>, SerializeError> {
        let snapshot = ModuleSnapshot {
            header: SnapshotHeader::new(self.current_tick()),
            config: self.config().clone(),
            nodes: self
                .nodes()
                .map(|n| NodeRecord {
                    pos: n.pos(),
                    connections: n.connections(),
                })
                .collect(),
        };
        bitcode::serialize(&snapshot).map_err(|e| SerializeError::Encode(e.to_string()))
    }

    /// Decode a module written by [`serialize`](Self::serialize).
    ///
    /// The header is validated before any node is rebuilt. Restored nodes
    /// keep their flags but their caches are invalid.
    pub fn deserialize(data: &[u8]) -> Result<Self, DeserializeError> {
        let snapshot: ModuleSnapshot =
            bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
        snapshot.header.validate()?;

        tracing::debug!(
            nodes = snapshot.nodes.len(),
            tick = snapshot.header.tick,
            "conduit module restored"
        );
        let nodes = snapshot
            .nodes
            .into_iter()
            .map(|r| ConduitNode::with_connections(r.pos, r.connections));
        Ok(ConduitModule::from_parts(
            snapshot.config,
            nodes,
            snapshot.header.tick,
        ))
    }
}
