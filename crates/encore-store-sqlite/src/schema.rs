//! SQL schema for the Encore SQLite store.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Every per-user row: the profile, collectibles, and library side
-- records. The sort key is the encoded RecordKey; the typed columns
-- exist only for the collectible rows that need them.
CREATE TABLE IF NOT EXISTS user_records (
    pk          TEXT NOT NULL,   -- user id
    sk          TEXT NOT NULL,   -- encoded RecordKey
    created     TEXT NOT NULL,   -- ISO 8601 UTC; store-assigned
    updated     TEXT NOT NULL,   -- bumped on accumulator increments
    streamed_ms INTEGER,         -- collectibles only
    status      TEXT,            -- 'readyToMint' | 'minted' | NULL
    payload     TEXT NOT NULL DEFAULT '{}',
    PRIMARY KEY (pk, sk)
);

-- Global artist directory: artist rows and directory-side collectible
-- markers, keyed by artist id.
CREATE TABLE IF NOT EXISTS artist_records (
    pk      TEXT NOT NULL,       -- artist id
    sk      TEXT NOT NULL,       -- encoded RecordKey
    created TEXT NOT NULL,
    updated TEXT NOT NULL,
    payload TEXT NOT NULL DEFAULT '{}',
    PRIMARY KEY (pk, sk)
);

CREATE INDEX IF NOT EXISTS user_records_updated_idx ON user_records(pk, updated);

PRAGMA user_version = 1;
";
