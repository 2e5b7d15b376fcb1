use sea_orm::FromQueryResult;
use serde::{Deserialize, Serialize};

/// Raw projection of a `{prefix}posts` row. `id` and `post_date_gmt` are cast in
/// the select so the row decodes the same way on MySQL and SQLite.
#[derive(Debug, Clone, FromQueryResult)]
pub struct PostRow {
    pub id: i64,
    pub post_title: String,
    pub post_name: String,
    pub post_type: String,
    pub post_status: String,
    pub guid: String,
    pub post_date_gmt: String,
}

/// A post as the job routes see it, independent of where it was loaded from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub id: u64,
    pub post_title: String,
    pub post_name: String,
    pub post_type: String,
    pub post_status: String,
    pub guid: String,
    /// `YYYY-MM-DD HH:MM:SS`, UTC.
    pub post_date_gmt: String,
}

impl TryFrom<PostRow> for JobRecord {
    type Error = std::num::TryFromIntError;

    fn try_from(row: PostRow) -> Result<Self, Self::Error> {
        Ok(JobRecord {
            id: u64::try_from(row.id)?,
            post_title: row.post_title,
            post_name: row.post_name,
            post_type: row.post_type,
            post_status: row.post_status,
            guid: row.guid,
            post_date_gmt: row.post_date_gmt,
        })
    }
}
