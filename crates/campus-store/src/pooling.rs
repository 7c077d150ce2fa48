use std::{
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use crossbeam::queue::ArrayQueue;
use rusqlite::Connection;
use tokio::{
    sync::{AcquireError, OwnedSemaphorePermit, Semaphore},
    time::timeout,
};

#[derive(Debug, thiserror::Error)]
pub enum PoolError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Pool capacity must be greater than 0")]
    EmptyPool,
    #[error("Timeout acquiring connection")]
    Timeout,
    #[error("Failed to acquire semaphore: {0}")]
    Acquire(#[from] AcquireError),
}

/// Fixed set of SQLite connections opened up front and handed out by value.
#[derive(Clone, Debug)]
struct ConnectionQueue {
    inner: Arc<ArrayQueue<Connection>>,
    closed: Arc<AtomicBool>,
}

#[derive(Debug)]
struct QueuedConnection {
    connection: Option<Connection>,
    inner: Arc<ArrayQueue<Connection>>,
    closed: Arc<AtomicBool>,
}

impl ConnectionQueue {
    fn new<F>(capacity: usize, conn_fn: F) -> Result<Self, PoolError>
    where
        F: Fn() -> Result<Connection, rusqlite::Error>,
    {
        if capacity == 0 {
            return Err(PoolError::EmptyPool);
        }

        let inner = Arc::new(ArrayQueue::new(capacity));
        for _ in 0..capacity {
            // The queue was sized to `capacity`, pushing can't overflow here.
            let _ = inner.push(conn_fn()?);
        }

        Ok(Self {
            inner,
            closed: Arc::new(AtomicBool::new(false)),
        })
    }

    fn try_get(&self) -> Option<QueuedConnection> {
        self.inner.pop().map(|connection| QueuedConnection {
            connection: Some(connection),
            inner: self.inner.clone(),
            closed: self.closed.clone(),
        })
    }

    fn drain(&self) {
        drain_queue(&self.inner);
    }
}

fn drain_queue(queue: &ArrayQueue<Connection>) {
    while let Some(conn) = queue.pop() {
        close_connection(conn);
    }
}

fn close_connection(conn: Connection) {
    if let Err((_, err)) = conn.close() {
        tracing::warn!("failed to close sqlite connection: {err}");
    }
}

impl Drop for QueuedConnection {
    fn drop(&mut self) {
        let Some(conn) = self.connection.take() else {
            return;
        };

        if self.closed.load(Ordering::Acquire) {
            close_connection(conn);
            return;
        }

        if self.inner.push(conn).is_err() {
            tracing::error!("connection returned to a full pool, dropping it");
        }

        // The pool may have closed while this connection was being pushed back.
        if self.closed.load(Ordering::Acquire) {
            drain_queue(&self.inner);
        }
    }
}

/// Connection pool shared by every request handler.
///
/// A semaphore with one permit per connection makes `acquire` wait instead of
/// failing when all connections are checked out.
#[derive(Clone, Debug)]
pub struct AsyncConnectionPool {
    queue: ConnectionQueue,
    semaphore: Arc<Semaphore>,
}

#[derive(Debug)]
pub struct AsyncConnectionHandle {
    connection: QueuedConnection,
    _permit: OwnedSemaphorePermit,
}

impl AsyncConnectionPool {
    /// Opens `capacity` connections using `conn_fn`.
    ///
    /// # Errors
    /// Fails when `capacity` is zero or any connection can't be opened.
    pub fn new<F>(capacity: usize, conn_fn: F) -> Result<Self, PoolError>
    where
        F: Fn() -> Result<Connection, rusqlite::Error>,
    {
        let queue = ConnectionQueue::new(capacity, conn_fn)?;
        let semaphore = Arc::new(Semaphore::new(capacity));

        Ok(Self { queue, semaphore })
    }

    pub fn capacity(&self) -> usize {
        self.queue.inner.capacity()
    }

    /// Connections currently sitting idle in the pool.
    pub fn available(&self) -> usize {
        self.queue.inner.len()
    }

    /// Waits until a connection is free.
    ///
    /// # Errors
    /// Returns an error if the pool was closed.
    pub async fn acquire(&self) -> Result<AsyncConnectionHandle, PoolError> {
        let permit = Semaphore::acquire_owned(self.semaphore.clone()).await?;
        let connection = self.queue.try_get().ok_or(PoolError::Timeout)?;

        Ok(AsyncConnectionHandle {
            connection,
            _permit: permit,
        })
    }

    /// # Errors
    /// Returns [`PoolError::Timeout`] if no connection frees up within `duration`.
    pub async fn acquire_timeout(
        &self,
        duration: Duration,
    ) -> Result<AsyncConnectionHandle, PoolError> {
        timeout(duration, self.acquire())
            .await
            .map_err(|_| PoolError::Timeout)?
    }

    /// Closes the semaphore and every idle connection. Connections still
    /// checked out are closed when their handle drops.
    pub fn close(&self) {
        self.queue.closed.store(true, Ordering::Release);
        self.semaphore.close();
        self.queue.drain();
    }

    pub fn is_closed(&self) -> bool {
        self.semaphore.is_closed()
    }
}

impl core::ops::Deref for AsyncConnectionHandle {
    type Target = Connection;
    fn deref(&self) -> &Self::Target {
        // Only `Drop` takes the connection out.
        self.connection
            .connection
            .as_ref()
            .unwrap_or_else(|| unreachable!("connection taken before drop"))
    }
}

impl AsRef<Connection> for AsyncConnectionHandle {
    fn as_ref(&self) -> &Connection {
        self
    }
}
