use std::marker::PhantomData;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, error};
use uuid::Uuid;

use mosaic_types::models::BaseRecord;

use crate::Database;
use crate::filter::{Filter, Sort};
use crate::models::DocumentRow;

/// A stored document together with the base record storage assigned to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Stored<T> {
    pub base: BaseRecord,
    pub doc: T,
}

/// Typed, async view over one named collection.
///
/// Every call runs the blocking SQLite work on `spawn_blocking`. A namespace
/// may hold documents of other shapes; reads skip any body that does not
/// deserialize as `T`.
pub struct Collection<T> {
    db: Arc<Database>,
    name: String,
    _doc: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
            name: self.name.clone(),
            _doc: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Send + 'static,
{
    pub fn new(db: Arc<Database>, name: impl Into<String>) -> Self {
        Self {
            db,
            name: name.into(),
            _doc: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn create_one(&self, doc: &T) -> Result<Uuid> {
        let body = serde_json::to_string(doc)?;
        let id = Uuid::new_v4();
        let sid = id.to_string();
        self.blocking(move |db, name| db.insert_document(name, &sid, &body))
            .await?;
        Ok(id)
    }

    pub async fn read_one(&self, filter: Filter) -> Result<Option<Stored<T>>> {
        filter.validate()?;
        let row = self
            .blocking(move |db, name| db.find_document(name, &filter))
            .await?;
        match row {
            Some(row) => decode(row),
            None => Ok(None),
        }
    }

    pub async fn read_many(&self, filter: Filter, sort: Sort) -> Result<Vec<Stored<T>>> {
        filter.validate()?;
        let rows = self
            .blocking(move |db, name| db.find_documents(name, &filter, sort))
            .await?;
        rows.into_iter()
            .filter_map(|row| decode(row).transpose())
            .collect()
    }

    /// True if any document in the namespace matches, whatever its shape.
    pub async fn exists(&self, filter: Filter) -> Result<bool> {
        filter.validate()?;
        let row = self
            .blocking(move |db, name| db.find_document(name, &filter))
            .await?;
        Ok(row.is_some())
    }

    pub async fn delete_one(&self, filter: Filter) -> Result<bool> {
        filter.validate()?;
        self.blocking(move |db, name| db.delete_document(name, &filter))
            .await
    }

    async fn blocking<F, R>(&self, f: F) -> Result<R>
    where
        F: FnOnce(&Database, &str) -> Result<R> + Send + 'static,
        R: Send + 'static,
    {
        let db = self.db.clone();
        let name = self.name.clone();
        tokio::task::spawn_blocking(move || f(&db, &name))
            .await
            .map_err(|e| {
                error!("spawn_blocking join error: {}", e);
                anyhow!("storage task failed: {}", e)
            })?
    }
}

fn decode<T: DeserializeOwned>(row: DocumentRow) -> Result<Option<Stored<T>>> {
    let id: Uuid = row
        .id
        .parse()
        .with_context(|| format!("corrupt document id '{}'", row.id))?;
    let doc = match serde_json::from_str(&row.body) {
        Ok(doc) => doc,
        Err(e) => {
            debug!(document = %row.id, "skipping document of another shape: {}", e);
            return Ok(None);
        }
    };

    Ok(Some(Stored {
        base: BaseRecord {
            id,
            created_at: parse_timestamp(&row.created_at)?,
            updated_at: parse_timestamp(&row.updated_at)?,
        },
        doc,
    }))
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    let ts = DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("corrupt timestamp '{}'", raw))?;
    Ok(ts.with_timezone(&Utc))
}
