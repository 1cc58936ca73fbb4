//! SQL schemas for the three matric SQLite stores.
//!
//! Each schema is executed once at connection startup; idempotent thanks to
//! `CREATE TABLE IF NOT EXISTS`. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Store A — applicant biodata, admission records, and the per-epoch
/// student-number counter.
pub const ADMISSIONS_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS applicants (
    applicant_id INTEGER PRIMARY KEY,
    surname      TEXT NOT NULL,
    other_names  TEXT NOT NULL,
    email        TEXT NOT NULL,
    phone_no     TEXT
);

-- Proof of admission. Append-only; the pipeline never updates or deletes.
CREATE TABLE IF NOT EXISTS admissions (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    applicant_id INTEGER NOT NULL REFERENCES applicants(applicant_id),
    scheme_id    INTEGER NOT NULL,
    program_id   INTEGER NOT NULL,
    stdno        TEXT    NOT NULL UNIQUE,
    admitted_by  INTEGER NOT NULL,
    created_at   TEXT    NOT NULL,    -- ISO 8601 UTC; store-assigned
    UNIQUE (applicant_id, scheme_id, program_id)
);

-- One row per two-digit epoch year, bumped with a single
-- UPDATE ... RETURNING inside a transaction.
CREATE TABLE IF NOT EXISTS stdno_counters (
    epoch_year   INTEGER PRIMARY KEY,
    last_counter INTEGER NOT NULL
);

CREATE INDEX IF NOT EXISTS admissions_applicant_idx ON admissions(applicant_id);

PRAGMA user_version = 1;
";

/// Store B — the postgraduate-institute system: identities and the rows
/// provisioned alongside them.
pub const INSTITUTE_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS identities (
    identity_id   INTEGER PRIMARY KEY AUTOINCREMENT,
    login         TEXT NOT NULL UNIQUE,   -- the student number
    password_hash TEXT NOT NULL,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    role          TEXT NOT NULL DEFAULT 'student',
    status        TEXT NOT NULL DEFAULT 'active',
    created_at    TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS profiles (
    profile_id  INTEGER PRIMARY KEY AUTOINCREMENT,
    identity_id INTEGER NOT NULL UNIQUE REFERENCES identities(identity_id),
    full_name   TEXT NOT NULL,
    stdno       TEXT NOT NULL UNIQUE,
    email       TEXT NOT NULL,            -- the applicant's real address
    phone       TEXT,
    program_id  INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS workspaces (
    workspace_id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity_id  INTEGER NOT NULL REFERENCES identities(identity_id),
    title        TEXT NOT NULL,
    description  TEXT NOT NULL,
    start_date   TEXT NOT NULL,
    deadline     TEXT NOT NULL,
    created_by   INTEGER NOT NULL,
    status       TEXT NOT NULL DEFAULT 'open',
    CHECK (deadline > start_date)
);

CREATE TABLE IF NOT EXISTS workspace_members (
    membership_id INTEGER PRIMARY KEY AUTOINCREMENT,
    identity_id   INTEGER NOT NULL REFERENCES identities(identity_id),
    workspace_id  INTEGER NOT NULL REFERENCES workspaces(workspace_id),
    is_leader     INTEGER NOT NULL DEFAULT 0,
    UNIQUE (identity_id, workspace_id)
);

PRAGMA user_version = 1;
";

/// Store C — back-office management users and their login audit trail.
pub const DIRECTORY_SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS staff_users (
    user_id          INTEGER PRIMARY KEY AUTOINCREMENT,
    staff_id         INTEGER NOT NULL,
    email            TEXT NOT NULL UNIQUE,
    password_hash    TEXT NOT NULL,
    system_generated INTEGER NOT NULL DEFAULT 1,
    created_by       INTEGER NOT NULL,
    created_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS login_events (
    login_id     INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id      INTEGER NOT NULL REFERENCES staff_users(user_id),
    client_addr  TEXT,
    logged_in_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS login_events_user_idx ON login_events(user_id);

PRAGMA user_version = 1;
";
