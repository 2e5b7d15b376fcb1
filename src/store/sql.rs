use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use sea_orm::sea_query::{Alias, Expr, Func, Order, Query, SelectStatement};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection,
    FromQueryResult,
};

use super::{JobQuery, MetaValues, Permalinks, PostStore};
use crate::date_query::MYSQL_DATETIME_FORMAT;
use crate::entities::{JobRecord, MetaRow, PostMetaRow, PostRow};
use crate::error::AppError;

/// Reads posts straight from the host's WordPress tables.
#[derive(Debug, Clone)]
pub struct SqlPostStore {
    db: DatabaseConnection,
    table_prefix: String,
    permalinks: Permalinks,
}

impl SqlPostStore {
    pub fn new(db: DatabaseConnection, table_prefix: impl Into<String>, permalinks: Permalinks) -> Self {
        Self {
            db,
            table_prefix: table_prefix.into(),
            permalinks,
        }
    }

    pub async fn connect(url: &str, table_prefix: &str, permalinks: Permalinks) -> Result<Self, AppError> {
        let mut options = ConnectOptions::new(url.to_string());
        options.sqlx_logging(false);
        let db = Database::connect(options).await?;
        Ok(Self::new(db, table_prefix, permalinks))
    }

    fn posts_table(&self) -> Alias {
        Alias::new(format!("{}posts", self.table_prefix))
    }

    fn postmeta_table(&self) -> Alias {
        Alias::new(format!("{}postmeta", self.table_prefix))
    }

    /// Signed integer and text type names for `CAST` on the connected backend.
    fn cast_types(&self) -> (&'static str, &'static str) {
        match self.db.get_database_backend() {
            DatabaseBackend::MySql => ("SIGNED", "CHAR"),
            _ => ("INTEGER", "TEXT"),
        }
    }

    fn select_posts(&self) -> SelectStatement {
        // Zero dates on drafts would not decode as datetimes, so read them as text.
        let (int_type, text_type) = self.cast_types();

        Query::select()
            .expr_as(
                Func::cast_as(Expr::col(Alias::new("ID")), Alias::new(int_type)),
                Alias::new("id"),
            )
            .columns([
                Alias::new("post_title"),
                Alias::new("post_name"),
                Alias::new("post_type"),
                Alias::new("post_status"),
                Alias::new("guid"),
            ])
            .expr_as(
                Func::cast_as(Expr::col(Alias::new("post_date_gmt")), Alias::new(text_type)),
                Alias::new("post_date_gmt"),
            )
            .from(self.posts_table())
            .to_owned()
    }

    async fn load_posts(&self, select: &SelectStatement) -> Result<Vec<JobRecord>, AppError> {
        let stmt = self.db.get_database_backend().build(select);
        tracing::debug!(sql = %stmt, "querying posts");
        PostRow::find_by_statement(stmt)
            .all(&self.db)
            .await?
            .into_iter()
            .map(to_record)
            .collect()
    }
}

fn to_record(row: PostRow) -> Result<JobRecord, AppError> {
    let id = row.id;
    JobRecord::try_from(row)
        .map_err(|e| AppError::InternalError(format!("post id {} out of range: {}", id, e)))
}

fn format_bound(at: NaiveDateTime) -> String {
    at.format(MYSQL_DATETIME_FORMAT).to_string()
}

#[async_trait]
impl PostStore for SqlPostStore {
    async fn fetch_by_id(&self, id: u64) -> Result<Option<JobRecord>, AppError> {
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };

        let mut select = self.select_posts();
        select
            .and_where(Expr::col(Alias::new("ID")).eq(id))
            .limit(1);

        Ok(self.load_posts(&select).await?.into_iter().next())
    }

    async fn query(&self, query: &JobQuery) -> Result<Vec<JobRecord>, AppError> {
        let mut select = self.select_posts();
        select
            .and_where(Expr::col(Alias::new("post_type")).eq(query.post_type.clone()))
            .and_where(Expr::col(Alias::new("post_status")).is_in(query.post_statuses.clone()));

        if let Some(date_query) = &query.date_query {
            let Some(range) = date_query.resolve(Utc::now().naive_utc()) else {
                tracing::debug!(?date_query, "unresolvable date filter, nothing matches");
                return Ok(Vec::new());
            };

            let column = || Expr::col(Alias::new("post_date_gmt"));
            if let Some(after) = range.after {
                let bound = format_bound(after);
                select.and_where(if range.inclusive {
                    column().gte(bound)
                } else {
                    column().gt(bound)
                });
            }
            if let Some(before) = range.before {
                let bound = format_bound(before);
                select.and_where(if range.inclusive {
                    column().lte(bound)
                } else {
                    column().lt(bound)
                });
            }
        }

        select
            .order_by(Alias::new("post_date_gmt"), Order::Desc)
            .order_by(Alias::new("ID"), Order::Desc)
            .limit(query.posts_per_page);

        self.load_posts(&select).await
    }

    async fn get_metadata(&self, post_id: u64, key: &str) -> Result<Option<String>, AppError> {
        let Ok(post_id) = i64::try_from(post_id) else {
            return Ok(None);
        };

        let select = Query::select()
            .column(Alias::new("meta_value"))
            .from(self.postmeta_table())
            .and_where(Expr::col(Alias::new("post_id")).eq(post_id))
            .and_where(Expr::col(Alias::new("meta_key")).eq(key))
            .order_by(Alias::new("meta_id"), Order::Asc)
            .limit(1)
            .to_owned();

        let stmt = self.db.get_database_backend().build(&select);
        let row = MetaRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.and_then(|row| row.meta_value))
    }

    async fn get_metadata_batch(
        &self,
        post_ids: &[u64],
        keys: &[&str],
    ) -> Result<MetaValues, AppError> {
        let post_ids: Vec<i64> = post_ids
            .iter()
            .filter_map(|&id| i64::try_from(id).ok())
            .collect();
        if post_ids.is_empty() || keys.is_empty() {
            return Ok(MetaValues::new());
        }

        let (int_type, _) = self.cast_types();
        let select = Query::select()
            .expr_as(
                Func::cast_as(Expr::col(Alias::new("post_id")), Alias::new(int_type)),
                Alias::new("post_id"),
            )
            .columns([Alias::new("meta_key"), Alias::new("meta_value")])
            .from(self.postmeta_table())
            .and_where(Expr::col(Alias::new("post_id")).is_in(post_ids))
            .and_where(Expr::col(Alias::new("meta_key")).is_in(keys.iter().map(|key| key.to_string())))
            .order_by(Alias::new("meta_id"), Order::Asc)
            .to_owned();

        let stmt = self.db.get_database_backend().build(&select);
        let rows = PostMetaRow::find_by_statement(stmt).all(&self.db).await?;

        // First row per pair wins, even when its value is NULL.
        let mut first: HashMap<(u64, String), Option<String>> = HashMap::new();
        for row in rows {
            let (Ok(post_id), Some(key)) = (u64::try_from(row.post_id), row.meta_key) else {
                continue;
            };
            first.entry((post_id, key)).or_insert(row.meta_value);
        }

        Ok(first
            .into_iter()
            .filter_map(|(pair, value)| value.map(|value| (pair, value)))
            .collect())
    }

    fn canonical_url(&self, record: &JobRecord) -> String {
        self.permalinks.job_url(record)
    }
}
