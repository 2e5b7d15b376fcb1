use sea_orm::FromQueryResult;

#[derive(Debug, Clone, FromQueryResult)]
pub struct MetaRow {
    pub meta_value: Option<String>,
}

/// A `{prefix}postmeta` row read for several posts at once. `post_id` is cast
/// in the select, as `ID` is for posts.
#[derive(Debug, Clone, FromQueryResult)]
pub struct PostMetaRow {
    pub post_id: i64,
    pub meta_key: Option<String>,
    pub meta_value: Option<String>,
}
