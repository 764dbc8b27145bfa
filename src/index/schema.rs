use super::*;

pub(super) const PRAGMAS: &str = "
PRAGMA foreign_keys = ON;
PRAGMA synchronous = OFF;
PRAGMA locking_mode = EXCLUSIVE;
PRAGMA journal_mode = TRUNCATE;
";

pub(super) const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS blocks (
  block_id INTEGER PRIMARY KEY,
  hash BLOB NOT NULL UNIQUE,
  height INTEGER NOT NULL UNIQUE,
  parent_hash BLOB NOT NULL,
  parent_id INTEGER REFERENCES blocks (block_id)
);

CREATE TABLE IF NOT EXISTS transactions (
  transaction_id INTEGER PRIMARY KEY,
  hash BLOB NOT NULL UNIQUE,
  body BLOB,
  proof BLOB
);

CREATE TABLE IF NOT EXISTS block_transactions (
  block_id INTEGER NOT NULL REFERENCES blocks (block_id),
  transaction_id INTEGER NOT NULL REFERENCES transactions (transaction_id),
  PRIMARY KEY (block_id, transaction_id)
);

CREATE TABLE IF NOT EXISTS names (
  name_id INTEGER PRIMARY KEY,
  name TEXT NOT NULL UNIQUE COLLATE NOCASE
);

CREATE TABLE IF NOT EXISTS payloads (
  payload_id INTEGER PRIMARY KEY,
  type INTEGER NOT NULL,
  data BLOB NOT NULL,
  address TEXT,
  UNIQUE (type, data)
);

CREATE TABLE IF NOT EXISTS accounts (
  account_id INTEGER PRIMARY KEY,
  transaction_id INTEGER NOT NULL UNIQUE REFERENCES transactions (transaction_id),
  name_id INTEGER NOT NULL REFERENCES names (name_id),
  number INTEGER NOT NULL,
  collision_hash TEXT NOT NULL,
  emoji INTEGER NOT NULL,
  collision_count INTEGER NOT NULL DEFAULT 0,
  collision_length INTEGER NOT NULL DEFAULT 0
);

CREATE INDEX IF NOT EXISTS accounts_by_name_and_number ON accounts (name_id, number);

CREATE TABLE IF NOT EXISTS account_payloads (
  account_id INTEGER NOT NULL REFERENCES accounts (account_id),
  payload_id INTEGER NOT NULL REFERENCES payloads (payload_id),
  PRIMARY KEY (account_id, payload_id)
);

CREATE TABLE IF NOT EXISTS rejection_reasons (
  reason_id INTEGER PRIMARY KEY,
  label TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS registration_rejections (
  transaction_id INTEGER NOT NULL REFERENCES transactions (transaction_id),
  position INTEGER NOT NULL,
  reason_id INTEGER NOT NULL REFERENCES rejection_reasons (reason_id),
  PRIMARY KEY (transaction_id, position)
);

CREATE TABLE IF NOT EXISTS service_status (
  status_id INTEGER PRIMARY KEY CHECK (status_id = 0),
  chain_tip_height INTEGER NOT NULL,
  chain_tip_hash BLOB
);
";

/// Create missing tables and seed the reason codes and service status.
pub(super) fn initialize(connection: &mut Connection, chain: Chain) -> rusqlite::Result<()> {
  connection.execute_batch(PRAGMAS)?;

  let transaction = connection.transaction()?;

  transaction.execute_batch(SCHEMA)?;

  for flaw in Flaw::ALL {
    transaction.execute(
      "INSERT OR IGNORE INTO rejection_reasons (reason_id, label) VALUES (?1, ?2)",
      params![flaw.code(), flaw.label()],
    )?;
  }

  transaction.execute(
    "INSERT OR IGNORE INTO service_status (status_id, chain_tip_height, chain_tip_hash)
     VALUES (0, ?1, NULL)",
    params![i64::from(chain.first_registration_height()) - 1],
  )?;

  transaction.commit()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn connection() -> Connection {
    let mut connection = Connection::open_in_memory().unwrap();
    initialize(&mut connection, Chain::Bitcoincash).unwrap();
    connection
  }

  #[test]
  fn initialize_is_idempotent() {
    let mut connection = connection();
    initialize(&mut connection, Chain::Bitcoincash).unwrap();

    assert_eq!(
      connection
        .query_row("SELECT COUNT(*) FROM service_status", [], |row| row
          .get::<_, i64>(0))
        .unwrap(),
      1
    );
  }

  #[test]
  fn status_is_seeded_below_first_height() {
    assert_eq!(
      connection()
        .query_row(
          "SELECT chain_tip_height, chain_tip_hash FROM service_status",
          [],
          |row| Ok((row.get::<_, u32>(0)?, row.get::<_, Option<Vec<u8>>>(1)?))
        )
        .unwrap(),
      (563_719, None)
    );
  }

  #[test]
  fn reasons_are_seeded() {
    let connection = connection();

    let mut statement = connection
      .prepare("SELECT reason_id, label FROM rejection_reasons ORDER BY reason_id")
      .unwrap();

    let reasons = statement
      .query_map([], |row| Ok((row.get::<_, u8>(0)?, row.get::<_, String>(1)?)))
      .unwrap()
      .collect::<rusqlite::Result<Vec<(u8, String)>>>()
      .unwrap();

    assert_eq!(
      reasons,
      [
        (1, "INVALID_NAME".into()),
        (2, "MISSING_PAYLOAD".into()),
        (3, "INVALID_PAYLOAD_LENGTH".into()),
        (4, "MALFORMED_SCRIPT".into()),
      ]
    );
  }

  #[test]
  fn names_are_unique_regardless_of_case() {
    let connection = connection();

    connection
      .execute("INSERT INTO names (name) VALUES ('Alice')", [])
      .unwrap();

    assert!(
      connection
        .execute("INSERT INTO names (name) VALUES ('alice')", [])
        .is_err()
    );
  }

  #[test]
  fn foreign_keys_are_enforced() {
    assert!(
      connection()
        .execute(
          "INSERT INTO block_transactions (block_id, transaction_id) VALUES (1, 1)",
          []
        )
        .is_err()
    );
  }
}
