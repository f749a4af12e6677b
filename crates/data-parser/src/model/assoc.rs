//! Account/user association records.

use super::tri::TriU32;

/// Full association record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    pub id: u32,
    pub cluster: Option<String>,
    pub account: Option<String>,
    pub user: Option<String>,
    pub partition: Option<String>,
    /// QoS names available to this association.
    pub qos: Vec<String>,
    pub default_qos: u32,
    pub shares_raw: TriU32,
    pub max_jobs: TriU32,
    pub max_tres_per_job: Option<String>,
}

/// The four-field key (plus resolved id) used to reference an
/// association from other records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssocShort {
    pub cluster: Option<String>,
    pub account: Option<String>,
    pub user: Option<String>,
    pub partition: Option<String>,
    pub id: u32,
}
