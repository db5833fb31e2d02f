//! [`SqliteStore`]: the SQLite implementation of [`CareStore`].

use std::path::Path;

use carelog_core::{
  alert::{AlertDraft, AlertType, PersistedAlert},
  checkin::{Category, CheckIn, NewCheckIn, discriminant_for},
  child::{Child, ChildId, NewChild},
  date::DateKey,
  store::CareStore,
};
use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use crate::{
  Error, Result,
  encode::{
    ALERT_COLUMNS, CHECK_IN_COLUMNS, CHILD_COLUMNS, RawAlert, RawCheckIn, RawChild,
    encode_alert_types, encode_date, encode_dt, encode_local_dt, encode_suggestions, encode_uuid,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A carelog store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store; useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn alert(&self, alert_id: Uuid) -> Result<Option<PersistedAlert>> {
    let id_str = encode_uuid(alert_id);
    let raw = self.conn.call(move |conn| Ok(alert_by_id(conn, &id_str)?)).await?;
    raw.map(RawAlert::into_alert).transpose()
  }
}

fn alert_by_id(conn: &rusqlite::Connection, id: &str) -> rusqlite::Result<Option<RawAlert>> {
  conn
    .query_row(
      &format!("SELECT {ALERT_COLUMNS} FROM health_alerts WHERE alert_id = ?1"),
      rusqlite::params![id],
      RawAlert::from_row,
    )
    .optional()
}

// ─── CareStore impl ──────────────────────────────────────────────────────────

impl CareStore for SqliteStore {
  type Error = Error;

  // ── Children ──────────────────────────────────────────────────────────────

  async fn add_child(&self, input: NewChild) -> Result<Child> {
    let created_at = Utc::now();
    let name = input.name.clone();
    let birth_str = input.birth_date.map(|d| encode_date(DateKey::new(d)));
    let at_str = encode_dt(created_at);

    let child_id: ChildId = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO children (name, birth_date, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![name, birth_str, at_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(Child { child_id, name: input.name, birth_date: input.birth_date, created_at })
  }

  async fn get_child(&self, child_id: ChildId) -> Result<Option<Child>> {
    let raw: Option<RawChild> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {CHILD_COLUMNS} FROM children WHERE child_id = ?1"),
              rusqlite::params![child_id],
              RawChild::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawChild::into_child).transpose()
  }

  // ── Check-ins ─────────────────────────────────────────────────────────────

  async fn record_check_in(&self, input: NewCheckIn) -> Result<CheckIn> {
    let check_in = CheckIn {
      check_in_id: Uuid::new_v4(),
      child_id:    input.child_id,
      logged_at:   input.logged_at,
      recorded_at: Utc::now(),
      entry:       input.entry,
    };

    let id_str       = encode_uuid(check_in.check_in_id);
    let child_id     = check_in.child_id;
    let kind         = check_in.entry.discriminant().to_owned();
    let payload_str  = check_in.entry.to_json()?.to_string();
    let logged_str   = encode_local_dt(check_in.logged_at);
    let date_str     = encode_date(check_in.date_key());
    let recorded_str = encode_dt(check_in.recorded_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO check_ins (
             check_in_id, child_id, kind, payload_json, logged_at, local_date, recorded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            id_str,
            child_id,
            kind,
            payload_str,
            logged_str,
            date_str,
            recorded_str
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(check_in)
  }

  async fn check_ins_for_day(
    &self,
    child_id: ChildId,
    category: Category,
    date: DateKey,
  ) -> Result<Vec<CheckIn>> {
    let kind = discriminant_for(category);
    let date_str = encode_date(date);

    let raws: Vec<RawCheckIn> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {CHECK_IN_COLUMNS} FROM check_ins
           WHERE child_id = ?1 AND kind = ?2 AND local_date = ?3
           ORDER BY logged_at, recorded_at"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![child_id, kind, date_str], RawCheckIn::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCheckIn::into_check_in).collect()
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  async fn upsert_alert(&self, draft: AlertDraft) -> Result<PersistedAlert> {
    let new_id_str      = encode_uuid(Uuid::new_v4());
    let child_id        = draft.child_id;
    let analysis_date   = draft.analysis_date;
    let alert_type      = draft.alert_type.as_str();
    let severity        = draft.severity.as_str();
    let suggestions_str = encode_suggestions(&draft.suggestions)?;
    let analysis_str    = encode_date(draft.analysis_date);
    let start_str       = encode_date(draft.data_period_start);
    let end_str         = encode_date(draft.data_period_end);
    let now_str         = encode_dt(Utc::now());
    let title           = draft.title;
    let description     = draft.description;

    let raw: Option<RawAlert> = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO health_alerts (
             alert_id, child_id, alert_type, title, description, severity,
             suggestions_json, analysis_date, data_period_start, data_period_end,
             is_read, read_at, created_at, updated_at, deleted_at, superseded_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0, NULL, ?11, ?11, NULL, NULL)
           ON CONFLICT (child_id, alert_type, analysis_date) DO UPDATE SET
             title             = excluded.title,
             description       = excluded.description,
             severity          = excluded.severity,
             suggestions_json  = excluded.suggestions_json,
             data_period_start = excluded.data_period_start,
             data_period_end   = excluded.data_period_end,
             updated_at        = excluded.updated_at,
             superseded_at     = NULL",
          rusqlite::params![
            new_id_str,
            child_id,
            alert_type,
            title,
            description,
            severity,
            suggestions_str,
            analysis_str,
            start_str,
            end_str,
            now_str,
          ],
        )?;

        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ALERT_COLUMNS} FROM health_alerts
                 WHERE child_id = ?1 AND alert_type = ?2 AND analysis_date = ?3"
              ),
              rusqlite::params![child_id, alert_type, analysis_str],
              RawAlert::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    match raw {
      Some(raw) => raw.into_alert(),
      None => Err(Error::MissingRow(format!("{child_id}/{alert_type}/{analysis_date}"))),
    }
  }

  async fn supersede_alerts(
    &self,
    child_id: ChildId,
    analysis_date: DateKey,
    keep: Vec<AlertType>,
  ) -> Result<u64> {
    let date_str = encode_date(analysis_date);
    let keep_str = encode_alert_types(&keep)?;
    let now_str  = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE health_alerts
           SET superseded_at = ?3,
               updated_at    = ?3
           WHERE child_id = ?1
             AND analysis_date = ?2
             AND deleted_at IS NULL
             AND superseded_at IS NULL
             AND alert_type NOT IN (SELECT value FROM json_each(?4))",
          rusqlite::params![child_id, date_str, now_str, keep_str],
        )?)
      })
      .await?;

    Ok(changed as u64)
  }

  async fn list_alerts(&self, child_id: ChildId) -> Result<Vec<PersistedAlert>> {
    let raws: Vec<RawAlert> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ALERT_COLUMNS} FROM health_alerts
           WHERE child_id = ?1 AND deleted_at IS NULL AND superseded_at IS NULL
           ORDER BY created_at DESC, rowid DESC"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![child_id], RawAlert::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlert::into_alert).collect()
  }

  async fn unread_count(&self, child_id: ChildId) -> Result<u64> {
    let count: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM health_alerts
           WHERE child_id = ?1
             AND deleted_at IS NULL
             AND superseded_at IS NULL
             AND is_read = 0",
          rusqlite::params![child_id],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(u64::try_from(count).unwrap_or_default())
  }

  async fn set_read(&self, alert_id: Uuid, is_read: bool) -> Result<Option<PersistedAlert>> {
    let id_str  = encode_uuid(alert_id);
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE health_alerts
           SET is_read    = ?2,
               read_at    = CASE WHEN ?2 THEN COALESCE(read_at, ?3) ELSE NULL END,
               updated_at = ?3
           WHERE alert_id = ?1 AND deleted_at IS NULL AND superseded_at IS NULL",
          rusqlite::params![id_str, is_read, now_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.alert(alert_id).await
  }

  async fn soft_delete_alert(&self, alert_id: Uuid) -> Result<Option<PersistedAlert>> {
    let id_str  = encode_uuid(alert_id);
    let now_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE health_alerts SET deleted_at = COALESCE(deleted_at, ?2) WHERE alert_id = ?1",
          rusqlite::params![id_str, now_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Ok(None);
    }
    self.alert(alert_id).await
  }
}
