//! Database models for servers and server groups.

use crate::types::{GroupId, ServerId};

/// Database response for a server group (cluster)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerGroupDBResponse {
    pub id: GroupId,
    pub name: String,
}

/// Database response for a server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerDBResponse {
    pub id: ServerId,
    pub group_id: GroupId,
}
