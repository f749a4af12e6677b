//! Trackable resources.

use super::tri::TriU64;

/// One trackable resource: a (type, name, id, count) tuple.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tres {
    /// Resource class, e.g. `cpu`, `mem`, `gres`.
    pub r#type: Option<String>,
    /// Sub-name within the class, e.g. `gpu` under `gres`.
    pub name: Option<String>,
    pub id: u32,
    pub count: TriU64,
}
