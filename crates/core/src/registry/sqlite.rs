//! SQLite-backed definition store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use super::store::{DefinitionFilter, DefinitionStore, StoreError};
use super::types::{BroadcastDefinition, CreateDefinitionRequest, UpdateDefinitionRequest};

/// SQLite-backed broadcast definition store.
pub struct SqliteDefinitionStore {
    conn: Mutex<Connection>,
}

impl SqliteDefinitionStore {
    /// Create a new SQLite store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Create an in-memory SQLite store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS broadcast_definitions (
                id TEXT PRIMARY KEY,
                nomination TEXT NOT NULL,
                day INTEGER NOT NULL,
                platform TEXT NOT NULL,
                platform_url TEXT NOT NULL,
                token TEXT,
                source_url TEXT NOT NULL,
                active INTEGER NOT NULL DEFAULT 1,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_definitions_nomination ON broadcast_definitions(nomination);
            CREATE INDEX IF NOT EXISTS idx_definitions_day ON broadcast_definitions(day);
            CREATE INDEX IF NOT EXISTS idx_definitions_platform ON broadcast_definitions(platform);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn build_where_clause(filter: &DefinitionFilter) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref nomination) = filter.nomination {
            conditions.push("nomination = ?");
            params.push(Box::new(nomination.clone()));
        }

        if let Some(day) = filter.day {
            conditions.push("day = ?");
            params.push(Box::new(day));
        }

        if let Some(ref platform) = filter.platform {
            conditions.push("platform = ?");
            params.push(Box::new(platform.clone()));
        }

        if let Some(active) = filter.active {
            conditions.push("active = ?");
            params.push(Box::new(active as i64));
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    fn row_to_definition(row: &rusqlite::Row) -> rusqlite::Result<BroadcastDefinition> {
        let id: String = row.get(0)?;
        let nomination: String = row.get(1)?;
        let day: i64 = row.get(2)?;
        let platform: String = row.get(3)?;
        let platform_url: String = row.get(4)?;
        let token: Option<String> = row.get(5)?;
        let source_url: String = row.get(6)?;
        let active: bool = row.get::<_, i64>(7)? != 0;
        let created_at_str: String = row.get(8)?;
        let updated_at_str: String = row.get(9)?;

        // Parse timestamps - use now if parsing fails (shouldn't happen with valid data)
        let created_at = DateTime::parse_from_rfc3339(&created_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        let updated_at = DateTime::parse_from_rfc3339(&updated_at_str)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now());

        Ok(BroadcastDefinition {
            id,
            nomination,
            day,
            platform,
            platform_url,
            token,
            source_url,
            active,
            created_at,
            updated_at,
        })
    }
}

impl DefinitionStore for SqliteDefinitionStore {
    fn create(&self, request: CreateDefinitionRequest) -> Result<BroadcastDefinition, StoreError> {
        let conn = self.conn.lock().unwrap();

        let id = uuid::Uuid::new_v4().to_string();
        let now = Utc::now();

        conn.execute(
            r#"
            INSERT INTO broadcast_definitions
                (id, nomination, day, platform, platform_url, token, source_url, active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
            params![
                id,
                request.nomination,
                request.day,
                request.platform,
                request.platform_url,
                request.token,
                request.source_url,
                request.active as i64,
                now.to_rfc3339(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(BroadcastDefinition {
            id,
            nomination: request.nomination,
            day: request.day,
            platform: request.platform,
            platform_url: request.platform_url,
            token: request.token,
            source_url: request.source_url,
            active: request.active,
            created_at: now,
            updated_at: now,
        })
    }

    fn get(&self, id: &str) -> Result<Option<BroadcastDefinition>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let mut stmt = conn
            .prepare(
                "SELECT id, nomination, day, platform, platform_url, token, source_url, active, created_at, updated_at
                 FROM broadcast_definitions WHERE id = ?1",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut rows = stmt
            .query_map(params![id], Self::row_to_definition)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match rows.next() {
            Some(Ok(definition)) => Ok(Some(definition)),
            Some(Err(e)) => Err(StoreError::Database(e.to_string())),
            None => Ok(None),
        }
    }

    fn list(&self, filter: &DefinitionFilter) -> Result<Vec<BroadcastDefinition>, StoreError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, mut sql_params) = Self::build_where_clause(filter);
        sql_params.push(Box::new(filter.limit));
        sql_params.push(Box::new(filter.offset));

        let sql = format!(
            "SELECT id, nomination, day, platform, platform_url, token, source_url, active, created_at, updated_at
             FROM broadcast_definitions {} ORDER BY nomination, day, platform LIMIT ? OFFSET ?",
            where_clause
        );

        let mut stmt = conn
            .prepare(&sql)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(
                rusqlite::params_from_iter(sql_params.iter().map(|p| p.as_ref())),
                Self::row_to_definition,
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn count(&self, filter: &DefinitionFilter) -> Result<i64, StoreError> {
        let conn = self.conn.lock().unwrap();

        let (where_clause, sql_params) = Self::build_where_clause(filter);
        let sql = format!(
            "SELECT COUNT(*) FROM broadcast_definitions {}",
            where_clause
        );

        conn.query_row(
            &sql,
            rusqlite::params_from_iter(sql_params.iter().map(|p| p.as_ref())),
            |row| row.get(0),
        )
        .map_err(|e| StoreError::Database(e.to_string()))
    }

    fn update(
        &self,
        id: &str,
        update: UpdateDefinitionRequest,
    ) -> Result<BroadcastDefinition, StoreError> {
        {
            let conn = self.conn.lock().unwrap();
            let now = Utc::now();

            let changed = conn
                .execute(
                    r#"
                    UPDATE broadcast_definitions SET
                        active = COALESCE(?2, active),
                        token = COALESCE(?3, token),
                        updated_at = ?4
                    WHERE id = ?1
                    "#,
                    params![
                        id,
                        update.active.map(|a| a as i64),
                        update.token,
                        now.to_rfc3339(),
                    ],
                )
                .map_err(|e| StoreError::Database(e.to_string()))?;

            if changed == 0 {
                return Err(StoreError::NotFound(id.to_string()));
            }
        }

        self.get(id)?.ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    fn delete(&self, id: &str) -> Result<BroadcastDefinition, StoreError> {
        let definition = self
            .get(id)?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        let conn = self.conn.lock().unwrap();
        conn.execute(
            "DELETE FROM broadcast_definitions WHERE id = ?1",
            params![id],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(definition)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::GroupKey;

    fn create_request(nomination: &str, day: i64, platform: &str) -> CreateDefinitionRequest {
        CreateDefinitionRequest {
            nomination: nomination.to_string(),
            day,
            platform: platform.to_string(),
            platform_url: format!("rtmp://{}.example/live", platform),
            token: Some("secret".to_string()),
            source_url: "rtsp://cam1".to_string(),
            active: true,
        }
    }

    #[test]
    fn test_create_and_get() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        let created = store.create(create_request("finals", 1, "youtube")).unwrap();

        let fetched = store.get(&created.id).unwrap().unwrap();
        assert_eq!(fetched.nomination, "finals");
        assert_eq!(fetched.day, 1);
        assert_eq!(fetched.platform, "youtube");
        assert_eq!(fetched.token.as_deref(), Some("secret"));
        assert!(fetched.active);
    }

    #[test]
    fn test_get_missing_returns_none() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        assert!(store.get("no-such-id").unwrap().is_none());
    }

    #[test]
    fn test_list_by_group_key() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        store.create(create_request("finals", 1, "youtube")).unwrap();
        store.create(create_request("finals", 1, "twitch")).unwrap();
        store.create(create_request("semis", 2, "youtube")).unwrap();

        let finals = store
            .list_for_group(&GroupKey::Nomination("finals".to_string()), true)
            .unwrap();
        assert_eq!(finals.len(), 2);

        let day2 = store.list_for_group(&GroupKey::Day(2), true).unwrap();
        assert_eq!(day2.len(), 1);
        assert_eq!(day2[0].nomination, "semis");

        let youtube = store
            .list_for_group(&GroupKey::Platform("youtube".to_string()), true)
            .unwrap();
        assert_eq!(youtube.len(), 2);

        let all = store.list_for_group(&GroupKey::All, true).unwrap();
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn test_group_resolution_respects_active_flag() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        let def = store.create(create_request("finals", 1, "youtube")).unwrap();
        store.create(create_request("finals", 1, "twitch")).unwrap();

        store
            .update(
                &def.id,
                UpdateDefinitionRequest {
                    active: Some(false),
                    token: None,
                },
            )
            .unwrap();

        let key = GroupKey::Nomination("finals".to_string());
        assert_eq!(store.list_for_group(&key, true).unwrap().len(), 1);
        assert_eq!(store.list_for_group(&key, false).unwrap().len(), 2);
    }

    #[test]
    fn test_update_token_keeps_other_fields() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        let def = store.create(create_request("finals", 1, "youtube")).unwrap();

        let updated = store
            .update(
                &def.id,
                UpdateDefinitionRequest {
                    active: None,
                    token: Some("rotated".to_string()),
                },
            )
            .unwrap();

        assert_eq!(updated.token.as_deref(), Some("rotated"));
        assert!(updated.active);
        assert_eq!(updated.source_url, "rtsp://cam1");
    }

    #[test]
    fn test_update_missing_fails() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        let result = store.update("no-such-id", UpdateDefinitionRequest::default());
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[test]
    fn test_delete() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        let def = store.create(create_request("finals", 1, "youtube")).unwrap();

        let deleted = store.delete(&def.id).unwrap();
        assert_eq!(deleted.id, def.id);
        assert!(store.get(&def.id).unwrap().is_none());
        assert!(matches!(
            store.delete(&def.id),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn test_count_with_filter() {
        let store = SqliteDefinitionStore::in_memory().unwrap();
        store.create(create_request("finals", 1, "youtube")).unwrap();
        store.create(create_request("finals", 2, "youtube")).unwrap();
        store.create(create_request("semis", 1, "twitch")).unwrap();

        let filter = DefinitionFilter::new().with_platform("youtube");
        assert_eq!(store.count(&filter).unwrap(), 2);
        assert_eq!(store.count(&DefinitionFilter::new()).unwrap(), 3);
    }
}
