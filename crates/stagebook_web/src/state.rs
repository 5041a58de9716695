//! Shared application state.

use crate::error::ApiError;
use actix_web::web;
use rusqlite::Connection;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// One SQLite connection shared by every worker.
///
/// Store work runs on actix's blocking pool through [`AppState::run`]; the
/// lock is held for a single query or mutation and never across an await.
pub struct AppState {
    conn: Mutex<Connection>,
}

impl AppState {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    /// Runs `op` against the locked connection on the blocking thread pool.
    ///
    /// # Errors
    /// - Whatever `op` returns.
    /// - `ApiError::WorkerUnavailable` when the blocking task was cancelled.
    pub async fn run<T, F>(self: Arc<Self>, op: F) -> Result<T, ApiError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T, ApiError> + Send + 'static,
    {
        web::block(move || op(&self.conn())).await?
    }

    /// Locks the connection. A panic in another handler does not poison it:
    /// its open transaction was rolled back when dropped.
    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
