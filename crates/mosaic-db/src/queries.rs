use crate::Database;
use crate::filter::{Filter, Sort};
use crate::models::DocumentRow;
use anyhow::Result;
use chrono::{SecondsFormat, Utc};
use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, params_from_iter};
use tracing::debug;

impl Database {
    /// Insert a document body under a fresh id. Both timestamps are set to now.
    pub fn insert_document(&self, collection: &str, id: &str, body: &str) -> Result<DocumentRow> {
        let now = timestamp_now();
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO documents (collection, id, body, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?4)",
                (collection, id, body, &now),
            )?;
            Ok(DocumentRow {
                id: id.to_string(),
                body: body.to_string(),
                created_at: now.clone(),
                updated_at: now.clone(),
            })
        })
    }

    /// First document in insertion order matching `filter`.
    pub fn find_document(&self, collection: &str, filter: &Filter) -> Result<Option<DocumentRow>> {
        self.with_conn(|conn| {
            let mut rows = query_documents(conn, collection, filter, Sort::Insertion, Some(1))?;
            Ok(rows.pop())
        })
    }

    pub fn find_documents(
        &self,
        collection: &str,
        filter: &Filter,
        sort: Sort,
    ) -> Result<Vec<DocumentRow>> {
        self.with_conn(|conn| query_documents(conn, collection, filter, sort, None))
    }

    /// Delete the first document matching `filter`. Returns whether one existed.
    pub fn delete_document(&self, collection: &str, filter: &Filter) -> Result<bool> {
        self.with_conn(|conn| {
            let mut params = vec![SqlValue::Text(collection.to_string())];
            let predicate = filter.to_sql(&mut params);
            let sql = format!(
                "DELETE FROM documents WHERE seq = (
                     SELECT seq FROM documents
                     WHERE collection = ? AND {}
                     ORDER BY seq ASC
                     LIMIT 1
                 )",
                predicate
            );

            let deleted = conn.execute(&sql, params_from_iter(params))?;
            Ok(deleted > 0)
        })
    }
}

fn query_documents(
    conn: &Connection,
    collection: &str,
    filter: &Filter,
    sort: Sort,
    limit: Option<u32>,
) -> Result<Vec<DocumentRow>> {
    let mut params = vec![SqlValue::Text(collection.to_string())];
    let predicate = filter.to_sql(&mut params);
    let mut sql = format!(
        "SELECT id, body, created_at, updated_at FROM documents
         WHERE collection = ? AND {}
         ORDER BY {}",
        predicate,
        sort.to_sql()
    );
    if let Some(limit) = limit {
        sql.push_str(&format!(" LIMIT {}", limit));
    }

    debug!(collection, %sql, "query documents");

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt
        .query_map(params_from_iter(params), |row| {
            Ok(DocumentRow {
                id: row.get(0)?,
                body: row.get(1)?,
                created_at: row.get(2)?,
                updated_at: row.get(3)?,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// Fixed-width RFC 3339 so text ordering matches time ordering.
fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
