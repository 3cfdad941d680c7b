//! SQL schema for the paperflow SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS faculty (
    faculty_id  TEXT PRIMARY KEY,
    full_name   TEXT NOT NULL,
    details     TEXT NOT NULL DEFAULT '{}',   -- JSON-encoded ProfileDetails
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS assignments (
    assignment_id         TEXT PRIMARY KEY,
    faculty_id            TEXT NOT NULL,
    faculty_name          TEXT NOT NULL,
    subject_code          TEXT NOT NULL,
    subject_name          TEXT NOT NULL,
    regulation            TEXT NOT NULL,
    role                  TEXT NOT NULL,   -- as entered
    role_key              TEXT NOT NULL,   -- trimmed lowercase
    response              TEXT,            -- NULL | 'yes' | 'no'
    question_paper_status TEXT NOT NULL DEFAULT 'pending',
    created_at            TEXT NOT NULL,   -- fixed-width RFC 3339 UTC
    deadline_date         TEXT NOT NULL,   -- YYYY-MM-DD
    assigned_by           TEXT NOT NULL,
    UNIQUE (faculty_id, subject_code, role_key),
    CHECK  (response IS NULL OR response IN ('yes', 'no')),
    CHECK  (question_paper_status IN ('pending', 'submitted', 'approved', 'rejected'))
);

-- Papers are never deleted and outlive their assignment, so assignment_id
-- carries no foreign key. At most one paper per assignment.
CREATE TABLE IF NOT EXISTS question_papers (
    paper_id                TEXT PRIMARY KEY,
    assignment_id           TEXT NOT NULL UNIQUE,
    faculty_id              TEXT NOT NULL,
    role                    TEXT NOT NULL,
    role_key                TEXT NOT NULL,
    exam_name               TEXT NOT NULL,
    department              TEXT NOT NULL,
    semester                TEXT NOT NULL,
    subject_code            TEXT NOT NULL,
    subject_title           TEXT NOT NULL,
    regulation              TEXT NOT NULL,
    time                    TEXT NOT NULL,
    max_marks               TEXT NOT NULL,
    part_a                  TEXT NOT NULL,   -- JSON array of question text
    part_b                  TEXT NOT NULL,
    part_c                  TEXT NOT NULL,
    scrutinizer_id          TEXT,
    scrutinizer_name        TEXT,
    scrutiny_request_status TEXT NOT NULL DEFAULT 'pending',
    scrutiny_status         TEXT NOT NULL DEFAULT 'pending',
    scrutiny_remarks        TEXT,
    created_at              TEXT NOT NULL,
    CHECK  (scrutiny_request_status IN ('pending', 'accepted', 'rejected')),
    CHECK  (scrutiny_status IN ('pending', 'approved', 'rejected'))
);

CREATE INDEX IF NOT EXISTS assignments_faculty_idx  ON assignments(faculty_id);
CREATE INDEX IF NOT EXISTS assignments_created_idx  ON assignments(created_at);
CREATE INDEX IF NOT EXISTS papers_scrutinizer_idx   ON question_papers(scrutinizer_id);

PRAGMA user_version = 1;
";
