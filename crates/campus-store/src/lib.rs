pub mod pooling;
pub mod seed;

mod query;
pub use query::Filter;

use std::path::Path;
use std::time::Duration;

use campus_common::{Collection, Record};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};
use serde_json::{Map, Value};
use tracing::{Instrument, debug, info, info_span};

pub use bson::oid::ObjectId;
use pooling::{AsyncConnectionHandle, AsyncConnectionPool, PoolError};
use query::FindQuery;

pub const MEMORY_DB_PATH: &str = ":memory:";

const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database not available. Check DATABASE_URL and DATABASE_NAME environment variables")]
    NotConfigured,
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error(transparent)]
    Database(#[from] rusqlite::Error),
    #[error("Could not encode document: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Stored document has an invalid id: {0}")]
    CorruptId(#[from] bson::oid::Error),
    #[error("Stored document {0} is not a JSON object")]
    NotAnObject(String),
}

/// A document as read back from the store, identifier kept apart from the fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    pub id: ObjectId,
    pub fields: Map<String, Value>,
}

impl StoredDocument {
    /// Shapes the document for clients: the raw `_id` key is dropped and the
    /// identifier is exposed as a plain string under `id`.
    pub fn into_item(self) -> Map<String, Value> {
        let mut item: Map<String, Value> = self
            .fields
            .into_iter()
            .filter(|(key, _)| key != "_id")
            .collect();
        item.insert("id".to_owned(), Value::String(self.id.to_hex()));
        item
    }
}

/// Long-lived handle over a SQLite file holding JSON documents grouped by
/// database name and collection.
#[derive(Clone, Debug)]
pub struct DocumentStore {
    name: String,
    pool: AsyncConnectionPool,
}

impl DocumentStore {
    /// Opens (or creates) the store behind `url`.
    ///
    /// `:memory:` yields a transient store; its pool is clamped to a single
    /// connection because every in-memory connection is a separate database.
    ///
    /// # Errors
    /// Fails if a connection can't be opened or the schema can't be created.
    pub fn open(url: &str, name: &str, pool_size: usize) -> Result<Self, StoreError> {
        let url = url.trim();
        let pool = if url == MEMORY_DB_PATH {
            AsyncConnectionPool::new(1, || {
                let conn = Connection::open_in_memory()?;
                init_schema(&conn)?;
                Ok(conn)
            })?
        } else {
            init_schema(&open_file(url)?)?;
            AsyncConnectionPool::new(pool_size, || open_file(url))?
        };

        info!(
            database = name,
            url,
            connections = pool.capacity(),
            "document store ready"
        );

        Ok(Self {
            name: name.to_owned(),
            pool,
        })
    }

    /// # Errors
    /// See [`DocumentStore::open`].
    pub fn in_memory(name: &str) -> Result<Self, StoreError> {
        Self::open(MEMORY_DB_PATH, name, 1)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    async fn connection(&self) -> Result<AsyncConnectionHandle, StoreError> {
        Ok(self
            .pool
            .acquire_timeout(ACQUIRE_TIMEOUT)
            .instrument(info_span!("conn.acquiring"))
            .await?)
    }

    /// Validated records go in through here.
    ///
    /// # Errors
    /// Fails on any pool, serialization or SQLite error.
    pub async fn insert<R: Record>(&self, record: &R) -> Result<ObjectId, StoreError> {
        let Value::Object(fields) = serde_json::to_value(record)? else {
            return Err(StoreError::NotAnObject(R::COLLECTION.to_string()));
        };
        self.insert_one(R::COLLECTION, fields).await
    }

    /// Stores `fields` as a new document, stamping `created_at` and `updated_at`.
    ///
    /// # Errors
    /// Fails on any pool, serialization or SQLite error.
    pub async fn insert_one(
        &self,
        collection: Collection,
        mut fields: Map<String, Value>,
    ) -> Result<ObjectId, StoreError> {
        let now = serde_json::to_value(Utc::now())?;
        fields.remove("_id");
        fields.insert("created_at".to_owned(), now.clone());
        fields.insert("updated_at".to_owned(), now);

        let id = ObjectId::new();
        let body = serde_json::to_string(&fields)?;

        let conn = self.connection().await?;
        {
            let query_span = info_span!("query.insert", collection = %collection);
            let _guard = query_span.enter();

            conn.execute(
                "insert into documents (id, database, collection, body) values (?1, ?2, ?3, ?4)",
                params![id.to_hex(), self.name, collection.as_str(), body],
            )?;
        }

        debug!(%id, %collection, "document inserted");
        Ok(id)
    }

    /// Returns up to `limit` documents matching `filter`, in insertion order.
    /// `None` means no limit.
    ///
    /// # Errors
    /// Fails on any pool or SQLite error, or if a stored row is unreadable.
    pub async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        limit: Option<u64>,
    ) -> Result<Vec<StoredDocument>, StoreError> {
        let query = FindQuery::new(&self.name, collection, filter, limit);

        let conn = self.connection().await?;
        let rows = {
            let query_span = info_span!("query.find", collection = %collection);
            let _guard = query_span.enter();
            query.execute(&conn)?
        };

        rows.into_iter()
            .map(|(id, body)| {
                let Value::Object(fields) = serde_json::from_str(&body)? else {
                    return Err(StoreError::NotAnObject(id));
                };
                Ok(StoredDocument {
                    id: ObjectId::parse_str(&id)?,
                    fields,
                })
            })
            .collect()
    }

    /// `true` when the collection holds at least one document.
    ///
    /// # Errors
    /// Fails on any pool or SQLite error.
    pub async fn has_documents(&self, collection: Collection) -> Result<bool, StoreError> {
        let conn = self.connection().await?;
        let found = conn
            .query_row(
                "select 1 from documents where database = ?1 and collection = ?2 limit 1",
                params![self.name, collection.as_str()],
                |_| Ok(()),
            )
            .optional()?;
        Ok(found.is_some())
    }

    /// Names of the collections that currently hold documents.
    ///
    /// # Errors
    /// Fails on any pool or SQLite error.
    pub async fn list_collection_names(&self) -> Result<Vec<String>, StoreError> {
        let conn = self.connection().await?;
        let mut statement = conn.prepare(
            "select distinct collection from documents where database = ?1 order by collection",
        )?;
        let names = statement
            .query_map([&self.name], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }

    pub fn close(&self) {
        self.pool.close();
    }
}

fn open_file(path: impl AsRef<Path>) -> Result<Connection, rusqlite::Error> {
    let conn = Connection::open(path)?;
    conn.busy_timeout(ACQUIRE_TIMEOUT)?;
    conn.pragma_update_and_check(None, "journal_mode", "wal", |_| Ok(()))?;
    Ok(conn)
}

fn init_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        create table if not exists documents (
            seq integer primary key autoincrement,
            id text not null unique,
            database text not null,
            collection text not null,
            body text not null
        );

        create index if not exists documents_by_collection
            on documents(database, collection, seq);
        ",
    )
}
