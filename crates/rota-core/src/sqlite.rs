//! SQLite-backed store.
//!
//! A single `rusqlite` connection is owned by a dedicated worker thread;
//! callers submit closures over an mpsc channel and await the reply on a
//! oneshot. All writes therefore serialize through one connection, and the
//! `UNIQUE` index over `(room_id, date, period)` backstops the
//! no-double-booking invariant even against writers outside this process.
//!
//! Dates are stored as `YYYY-MM-DD` text (lexicographic order matches
//! chronological order); instants as RFC 3339 text.

use std::path::PathBuf;
use std::sync::{Arc, Mutex, mpsc};
use std::thread::{self, JoinHandle};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{Connection, TransactionBehavior, params};
use tokio::sync::oneshot;

use crate::error::{Error, Result};
use crate::id::{BookingId, RoomId};
use crate::model::{Booking, Requester, Room, Slot};
use crate::store::{BookingStore, CommitResult, RoomCatalog};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct SqliteInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for SqliteInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                tracing::error!(error = %err, "Failed to send shutdown to DB thread");
            }
            if let Err(join_err) = handle.join() {
                tracing::error!(?join_err, "Failed to join DB thread");
            }
        }
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::storage_with_source("sqlite operation failed", err)
    }
}

/// Store backed by a SQLite database file.
///
/// Cheap to clone; all clones share the same worker thread.
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<SqliteInner>,
}

impl SqliteStore {
    /// Opens (creating and migrating as needed) the database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directory cannot be
    /// created, or if the migrations fail.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|err| {
                    Error::storage_with_source(
                        format!("failed to create database directory {}", parent.display()),
                        err,
                    )
                })?;
            }
        }
        Self::spawn_worker(move || Connection::open(&path))
    }

    /// Opens a private in-memory database.
    ///
    /// Each call creates an independent database; used by tests and debug
    /// runs that want real SQL semantics without a file.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be opened.
    pub fn open_in_memory() -> Result<Self> {
        Self::spawn_worker(Connection::open_in_memory)
    }

    fn spawn_worker<F>(open: F) -> Result<Self>
    where
        F: FnOnce() -> rusqlite::Result<Connection> + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();

        let worker = thread::Builder::new()
            .name("rota-db".into())
            .spawn(move || {
                let mut conn = match open() {
                    Ok(conn) => conn,
                    Err(err) => {
                        let _ = ready_tx.send(Err(Error::storage_with_source(
                            "failed to open SQLite database",
                            err,
                        )));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    tracing::warn!(error = %err, "Failed to enable WAL mode");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    tracing::warn!(error = %err, "Failed to enable foreign keys");
                }

                if ready_tx.send(run_migrations(&conn)).is_err() {
                    tracing::error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => task(&mut conn),
                        DbCommand::Shutdown => break,
                    }
                }

                tracing::debug!("Database thread shutting down");
            })
            .map_err(|err| {
                Error::storage_with_source("failed to spawn database worker thread", err)
            })?;

        ready_rx
            .recv()
            .map_err(|_| Error::storage("database worker exited before signaling readiness"))??;

        Ok(Self {
            inner: Arc::new(SqliteInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
        })
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                tracing::error!("DB caller dropped before receiving result");
            }
        }));

        self.inner
            .sender
            .send(command)
            .map_err(|_| Error::storage("database worker is not running"))?;

        reply_rx
            .await
            .map_err(|_| Error::storage("database thread terminated unexpectedly"))?
    }
}

fn run_migrations(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS rooms (
            id   INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS bookings (
            id               TEXT PRIMARY KEY,
            user_name        TEXT NOT NULL,
            user_email       TEXT NOT NULL,
            coordinator_name TEXT NOT NULL,
            created_at       TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS booking_slots (
            booking_id TEXT NOT NULL REFERENCES bookings(id) ON DELETE CASCADE,
            room_id    INTEGER NOT NULL REFERENCES rooms(id),
            date       TEXT NOT NULL,
            period     TEXT NOT NULL,
            PRIMARY KEY (booking_id, room_id, date, period)
        );
        CREATE UNIQUE INDEX IF NOT EXISTS booking_slots_slot_unique
            ON booking_slots (room_id, date, period);",
    )?;
    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|err| Error::storage(format!("invalid date '{value}' in store: {err}")))
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| Error::storage(format!("invalid datetime '{value}' in store: {err}")))
}

fn room_id_to_sql(id: RoomId) -> i64 {
    i64::from(id.get())
}

fn room_id_from_sql(value: i64) -> Result<RoomId> {
    u32::try_from(value)
        .map(RoomId::new)
        .map_err(|_| Error::storage(format!("room id {value} out of range")))
}

#[async_trait]
impl RoomCatalog for SqliteStore {
    async fn list_rooms(&self) -> Result<Vec<Room>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare("SELECT id, name FROM rooms ORDER BY id")?;
            let mut rows = stmt.query([])?;
            let mut rooms = Vec::new();
            while let Some(row) = rows.next()? {
                rooms.push(Room {
                    id: room_id_from_sql(row.get(0)?)?,
                    name: row.get(1)?,
                });
            }
            Ok(rooms)
        })
        .await
    }

    async fn room_exists(&self, id: RoomId) -> Result<bool> {
        let id = room_id_to_sql(id);
        self.execute(move |conn| {
            let exists = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM rooms WHERE id = ?1)",
                params![id],
                |row| row.get::<_, bool>(0),
            )?;
            Ok(exists)
        })
        .await
    }

    async fn seed_rooms(&self, rooms: &[Room]) -> Result<usize> {
        let rooms = rooms.to_vec();
        self.execute(move |conn| {
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let existing: i64 = tx.query_row("SELECT COUNT(*) FROM rooms", [], |row| row.get(0))?;
            if existing > 0 {
                return Ok(0);
            }
            for room in &rooms {
                tx.execute(
                    "INSERT INTO rooms (id, name) VALUES (?1, ?2)",
                    params![room_id_to_sql(room.id), room.name],
                )?;
            }
            tx.commit()?;
            Ok(rooms.len())
        })
        .await
    }
}

#[async_trait]
impl BookingStore for SqliteStore {
    async fn find_in_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<Booking>> {
        let start = start.to_string();
        let end = end.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT b.id, b.user_name, b.user_email, b.coordinator_name, b.created_at,
                        s.room_id, s.date, s.period
                 FROM bookings b
                 JOIN booking_slots s ON s.booking_id = b.id
                 WHERE b.id IN (
                     SELECT DISTINCT booking_id FROM booking_slots
                     WHERE date >= ?1 AND date <= ?2
                 )
                 ORDER BY b.id",
            )?;

            let mut rows = stmt.query(params![start, end])?;
            let mut groups: Vec<(BookingId, Requester, DateTime<Utc>, Vec<Slot>)> = Vec::new();
            while let Some(row) = rows.next()? {
                let id: BookingId = row.get::<_, String>(0)?.parse()?;
                let slot = Slot::new(
                    room_id_from_sql(row.get(5)?)?,
                    parse_date(&row.get::<_, String>(6)?)?,
                    row.get::<_, String>(7)?.parse()?,
                );
                match groups.last_mut() {
                    Some((last_id, _, _, slots)) if *last_id == id => slots.push(slot),
                    _ => groups.push((
                        id,
                        Requester {
                            user_name: row.get(1)?,
                            user_email: row.get(2)?,
                            coordinator_name: row.get(3)?,
                        },
                        parse_datetime(&row.get::<_, String>(4)?)?,
                        vec![slot],
                    )),
                }
            }

            Ok(groups
                .into_iter()
                .map(|(id, requester, created_at, slots)| {
                    Booking::from_parts(id, requester, slots, created_at)
                })
                .collect())
        })
        .await
    }

    async fn try_commit(&self, booking: Booking) -> Result<CommitResult> {
        self.execute(move |conn| {
            // Immediate transaction: the write lock is held across the
            // existence check and the inserts.
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

            let mut conflicts = Vec::new();
            {
                let mut stmt = tx.prepare(
                    "SELECT EXISTS(SELECT 1 FROM booking_slots
                     WHERE room_id = ?1 AND date = ?2 AND period = ?3)",
                )?;
                for slot in &booking.slots {
                    let taken: bool = stmt.query_row(
                        params![
                            room_id_to_sql(slot.room_id),
                            slot.date.to_string(),
                            slot.period.as_str()
                        ],
                        |row| row.get(0),
                    )?;
                    if taken {
                        conflicts.push(*slot);
                    }
                }
            }
            if !conflicts.is_empty() {
                return Ok(CommitResult::Conflict { slots: conflicts });
            }

            tx.execute(
                "INSERT INTO bookings (id, user_name, user_email, coordinator_name, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    booking.id.to_string(),
                    booking.requester.user_name,
                    booking.requester.user_email,
                    booking.requester.coordinator_name,
                    booking.created_at.to_rfc3339(),
                ],
            )?;
            for slot in &booking.slots {
                tx.execute(
                    "INSERT INTO booking_slots (booking_id, room_id, date, period)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![
                        booking.id.to_string(),
                        room_id_to_sql(slot.room_id),
                        slot.date.to_string(),
                        slot.period.as_str()
                    ],
                )?;
            }
            tx.commit()?;
            Ok(CommitResult::Committed(booking))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Period, default_rooms};
    use chrono::Utc;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn requester() -> Requester {
        Requester {
            user_name: "Ada Lovelace".to_string(),
            user_email: "ada@example.com".to_string(),
            coordinator_name: "Charles Babbage".to_string(),
        }
    }

    async fn seeded_store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().unwrap();
        store.seed_rooms(&default_rooms()).await.unwrap();
        store
    }

    #[tokio::test]
    async fn test_seed_rooms_only_fills_an_empty_catalog() -> anyhow::Result<()> {
        let store = seeded_store().await;
        assert_eq!(store.seed_rooms(&default_rooms()).await?, 0);

        let rooms = store.list_rooms().await?;
        assert_eq!(rooms.len(), 10);
        assert_eq!(rooms[2].name, "Lab Room 3");
        assert!(store.room_exists(RoomId::new(10)).await?);
        assert!(!store.room_exists(RoomId::new(11)).await?);
        Ok(())
    }

    #[tokio::test]
    async fn test_commit_then_conflict_on_same_slot() -> anyhow::Result<()> {
        let store = seeded_store().await;
        let contested = Slot::new(RoomId::new(1), date(2025, 3, 10), Period::Morning);

        let first = Booking::new(requester(), vec![contested], Utc::now());
        assert!(matches!(
            store.try_commit(first).await?,
            CommitResult::Committed(_)
        ));

        let second = Booking::new(requester(), vec![contested], Utc::now());
        match store.try_commit(second).await? {
            CommitResult::Conflict { slots } => assert_eq!(slots, vec![contested]),
            CommitResult::Committed(_) => panic!("double booking committed"),
        }
        Ok(())
    }

    #[tokio::test]
    async fn test_conflicting_batch_writes_nothing() -> anyhow::Result<()> {
        let store = seeded_store().await;
        let taken = Slot::new(RoomId::new(1), date(2025, 3, 10), Period::Morning);
        let free = Slot::new(RoomId::new(1), date(2025, 3, 11), Period::Morning);

        store
            .try_commit(Booking::new(requester(), vec![taken], Utc::now()))
            .await?;
        let result = store
            .try_commit(Booking::new(requester(), vec![taken, free], Utc::now()))
            .await?;
        assert!(matches!(result, CommitResult::Conflict { .. }));

        // The free slot stayed free.
        let retry = store
            .try_commit(Booking::new(requester(), vec![free], Utc::now()))
            .await?;
        assert!(matches!(retry, CommitResult::Committed(_)));
        Ok(())
    }

    #[tokio::test]
    async fn test_find_in_range_reassembles_bookings() -> anyhow::Result<()> {
        let store = seeded_store().await;
        let committed = Booking::new(
            requester(),
            vec![
                Slot::new(RoomId::new(2), date(2025, 3, 11), Period::Afternoon),
                Slot::new(RoomId::new(1), date(2025, 3, 14), Period::Morning),
            ],
            Utc::now(),
        );
        store.try_commit(committed.clone()).await?;

        let hits = store
            .find_in_range(date(2025, 3, 10), date(2025, 3, 14))
            .await?;
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, committed.id);
        assert_eq!(hits[0].slots, committed.slots);
        assert_eq!(hits[0].requester, committed.requester);

        let misses = store
            .find_in_range(date(2025, 3, 17), date(2025, 3, 21))
            .await?;
        assert!(misses.is_empty());
        Ok(())
    }
}
