pub mod config;
pub mod error;
pub mod index;
pub mod ingest;
pub mod models;
pub mod query;
pub mod record;
pub mod storage;
pub mod suggest;
pub mod vault;

pub use config::Config;
pub use error::VaultError;
pub use index::{ScanSummary, VaultIndex};
pub use ingest::{ingest, IngestOutcome, IngestRequest};
pub use models::{Connection, Edge, EdgeType, Neighbor, Node, NodeMeta, NodeType};
pub use query::{GraphView, NodeFilter, VaultStats};
pub use storage::{FileStore, RecordStore, StorageError};
pub use suggest::{suggest_connections, Draft, Suggestion};
pub use vault::{NewNode, NodeUpdate, Vault};
