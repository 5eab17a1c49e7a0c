//! Common type definitions.
//!
//! Entity ids are plain integers assigned by the deployment database; the aliases below keep
//! signatures readable and make it obvious which table an id belongs to.
//!
//! - [`ApplyId`]: deployment request (apply) identifier
//! - [`ProjectId`]: project identifier
//! - [`GroupId`]: server group (cluster) identifier
//! - [`ServerId`]: server identifier
//! - [`UserId`]: user account identifier

pub type ApplyId = i64;
pub type ProjectId = i64;
pub type GroupId = i64;
pub type ServerId = i64;
pub type UserId = i64;

/// Parse a comma separated id list as stored in `syd_project.online_cluster`.
///
/// Blank entries are ignored; any other unparseable entry is an error.
pub fn parse_id_list(raw: &str) -> Result<Vec<GroupId>, std::num::ParseIntError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}
