//! SQL schema for the kindred SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS persons (
    person_id     TEXT PRIMARY KEY,
    first_name    TEXT NOT NULL,
    middle_name   TEXT,
    last_name     TEXT NOT NULL,
    email         TEXT UNIQUE,       -- trimmed + lowercased, NULL when absent
    gender        TEXT NOT NULL,     -- 'male' | 'female' | 'other'
    date_of_birth TEXT,              -- YYYY-MM-DD
    father_id     TEXT REFERENCES persons(person_id) ON DELETE SET NULL,
    mother_id     TEXT REFERENCES persons(person_id) ON DELETE SET NULL,
    location      TEXT,
    is_deceased   INTEGER NOT NULL DEFAULT 0,
    created_at    TEXT NOT NULL      -- RFC 3339 UTC
);

-- Marriage / partnership. Always written as a reciprocal pair.
CREATE TABLE IF NOT EXISTS direct_relationships (
    subject_id        TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    related_id        TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    relationship_type TEXT NOT NULL, -- 'husband' | 'wife' | 'partner'
    PRIMARY KEY (subject_id, related_id),
    CHECK (subject_id != related_id)
);

-- Leveled kinship. Always written as a pair with negated levels.
CREATE TABLE IF NOT EXISTS indirect_relationships (
    subject_id         TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    related_id         TEXT NOT NULL REFERENCES persons(person_id) ON DELETE CASCADE,
    relationship_level INTEGER NOT NULL, -- positive = related is an ancestor
    relationship_type  TEXT NOT NULL,
    lineage            TEXT NOT NULL DEFAULT 'lineal',
    subcategory        TEXT NOT NULL DEFAULT 'blood',
    PRIMARY KEY (subject_id, related_id),
    CHECK (subject_id != related_id)
);

CREATE TABLE IF NOT EXISTS relationship_types (
    name            TEXT PRIMARY KEY,
    level           INTEGER NOT NULL,
    gender          TEXT NOT NULL,   -- 'male' | 'female' | 'neutral'
    category        TEXT NOT NULL,   -- 'direct' | 'indirect'
    subcategory     TEXT NOT NULL,
    lineage         TEXT NOT NULL,
    reciprocal_name TEXT NOT NULL,
    is_active       INTEGER NOT NULL DEFAULT 1,
    sort_order      INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS persons_father_idx  ON persons(father_id);
CREATE INDEX IF NOT EXISTS persons_mother_idx  ON persons(mother_id);
CREATE INDEX IF NOT EXISTS direct_related_idx   ON direct_relationships(related_id);
CREATE INDEX IF NOT EXISTS indirect_related_idx ON indirect_relationships(related_id);

PRAGMA user_version = 1;
";
