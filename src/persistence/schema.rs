//! `SQLite` schema bootstrap logic.
//!
//! All table definitions use `CREATE TABLE IF NOT EXISTS` — safe to
//! re-run on every server startup. Produces a convergent result.

use sqlx::SqlitePool;

use crate::Result;

/// Apply all table definitions to the connected `SQLite` database.
///
/// # Errors
///
/// Returns `AppError::Db` if any DDL statement fails.
pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<()> {
    let ddl = r"
CREATE TABLE IF NOT EXISTS project (
    id                   TEXT PRIMARY KEY NOT NULL,
    name                 TEXT NOT NULL,
    batch_size           INTEGER NOT NULL DEFAULT 30,
    required_irr_voters  INTEGER NOT NULL DEFAULT 0,
    current_training_set INTEGER NOT NULL DEFAULT 0,
    created_at           TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS label (
    id          TEXT PRIMARY KEY NOT NULL,
    project_id  TEXT NOT NULL REFERENCES project(id),
    name        TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS item (
    id               TEXT PRIMARY KEY NOT NULL,
    project_id       TEXT NOT NULL REFERENCES project(id),
    text             TEXT NOT NULL,
    reliability_flag INTEGER NOT NULL DEFAULT 0,
    sensitive_flag   INTEGER NOT NULL DEFAULT 0,
    state            TEXT NOT NULL DEFAULT 'available'
                     CHECK(state IN ('available','assigned','admin_queued','recycled')),
    created_at       TEXT NOT NULL
);

-- Primary key on item_id enforces at most one active assignment per item.
CREATE TABLE IF NOT EXISTS assignment (
    item_id     TEXT PRIMARY KEY NOT NULL REFERENCES item(id),
    coder       TEXT NOT NULL,
    assigned_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS queue_entry (
    item_id     TEXT NOT NULL REFERENCES item(id),
    queue_type  TEXT NOT NULL CHECK(queue_type IN ('admin')),
    project_id  TEXT NOT NULL REFERENCES project(id),
    reason      TEXT NOT NULL CHECK(reason IN ('irr','skipped','explicit')),
    queued_at   TEXT NOT NULL,
    PRIMARY KEY (item_id, queue_type)
);

CREATE TABLE IF NOT EXISTS labeling_record (
    id               TEXT PRIMARY KEY NOT NULL,
    item_id          TEXT NOT NULL REFERENCES item(id),
    label_id         TEXT NOT NULL REFERENCES label(id),
    coder            TEXT NOT NULL,
    training_set     INTEGER NOT NULL DEFAULT 0,
    time_to_label_ms INTEGER,
    was_skipped      INTEGER NOT NULL DEFAULT 0,
    reason           TEXT NOT NULL DEFAULT '',
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS reliability_vote (
    id         TEXT PRIMARY KEY NOT NULL,
    item_id    TEXT NOT NULL REFERENCES item(id),
    coder      TEXT NOT NULL,
    label_id   TEXT REFERENCES label(id),
    reason     TEXT NOT NULL DEFAULT '',
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS recycle_entry (
    item_id     TEXT PRIMARY KEY NOT NULL REFERENCES item(id),
    recycled_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS change_log (
    id             TEXT PRIMARY KEY NOT NULL,
    project_id     TEXT NOT NULL REFERENCES project(id),
    item_id        TEXT NOT NULL REFERENCES item(id),
    coder          TEXT NOT NULL,
    old_label_name TEXT NOT NULL,
    new_label_name TEXT NOT NULL,
    changed_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_lock (
    project_id TEXT PRIMARY KEY NOT NULL REFERENCES project(id),
    coder      TEXT NOT NULL,
    locked_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_item_project_state ON item(project_id, state);
CREATE INDEX IF NOT EXISTS idx_assignment_coder ON assignment(coder);
CREATE INDEX IF NOT EXISTS idx_queue_project ON queue_entry(project_id, queue_type);
CREATE INDEX IF NOT EXISTS idx_record_item ON labeling_record(item_id);
CREATE INDEX IF NOT EXISTS idx_record_coder ON labeling_record(coder);
CREATE INDEX IF NOT EXISTS idx_vote_item ON reliability_vote(item_id);
CREATE INDEX IF NOT EXISTS idx_change_log_project ON change_log(project_id);
";

    sqlx::raw_sql(ddl).execute(pool).await?;
    Ok(())
}
