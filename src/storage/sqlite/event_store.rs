use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::params;

use crate::domain::{LocalEventRow, NewLocalEvent};
use crate::errors::{EventsError, EventsResult};
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::{EventStore, LocalQuery};

pub struct SqliteEventStore {
    storage: SqliteStorage,
}

impl SqliteEventStore {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

const SEARCH_SQL: &str = "
SELECT e.id, e.title, e.start_time, e.price, e.location, e.description,
       e.image_url, e.seats_left, e.creator_id, c.name
FROM events e
LEFT JOIN categories c ON e.category_id = c.id
WHERE (?1 IS NULL OR instr(lower(e.title), lower(?1)) > 0)
  AND (?2 IS NULL OR instr(lower(e.location), lower(?2)) > 0)
  AND (?3 IS NULL OR e.category_id = ?3)
ORDER BY e.start_time IS NULL, e.start_time ASC
LIMIT ?4 OFFSET ?5";

impl EventStore for SqliteEventStore {
    fn search(
        &self,
        query: &LocalQuery,
        offset: u32,
        limit: u32,
    ) -> EventsResult<Vec<LocalEventRow>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare(SEARCH_SQL)?;

        let rows = stmt.query_map(
            params![
                query.keyword.as_deref().filter(|k| !k.is_empty()),
                query.location.as_deref().filter(|l| !l.is_empty()),
                query.category_id,
                limit,
                offset,
            ],
            |row| {
                let start_time: Option<String> = row.get(2)?;
                Ok(LocalEventRow {
                    id: row.get(0)?,
                    title: row.get(1)?,
                    start_time: start_time.as_deref().and_then(parse_timestamp),
                    price: row.get(3)?,
                    location: row.get(4)?,
                    description: row.get(5)?,
                    image_url: row.get(6)?,
                    seats_left: row.get(7)?,
                    creator_id: row.get(8)?,
                    category_name: row.get(9)?,
                })
            },
        )?;

        rows.collect::<Result<Vec<_>, _>>().map_err(EventsError::from)
    }

    fn resolve_category_id(&self, name: &str) -> EventsResult<Option<i64>> {
        let conn = self.storage.connection()?;
        let mut stmt = conn.prepare("SELECT id FROM categories WHERE lower(name) = lower(?1)")?;

        match stmt.query_row([name], |row| row.get(0)) {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(EventsError::from(e)),
        }
    }

    fn insert(&self, event: &NewLocalEvent) -> EventsResult<i64> {
        let conn = self.storage.connection()?;

        let category_id = match event.category.as_deref().filter(|c| !c.is_empty()) {
            Some(name) => {
                conn.execute("INSERT OR IGNORE INTO categories (name) VALUES (?1)", [name])?;
                let mut stmt =
                    conn.prepare("SELECT id FROM categories WHERE lower(name) = lower(?1)")?;
                let id: i64 = stmt.query_row([name], |row| row.get(0))?;
                Some(id)
            }
            None => None,
        };

        conn.execute(
            "INSERT INTO events (title, start_time, price, location, description, image_url, seats_left, creator_id, category_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                &event.title,
                event
                    .start_time
                    .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true)),
                event.price,
                &event.location,
                &event.description,
                &event.image_url,
                event.seats_left,
                event.creator_id.as_deref(),
                category_id,
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
