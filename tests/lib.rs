#![allow(clippy::type_complexity)]

use {
  self::{command_builder::CommandBuilder, test_server::TestServer},
  bitcoin::{ScriptBuf, Transaction, consensus},
  calus::{PassSummary, Status, subcommand::server::Trigger},
  cashaccount::{Artifact, CollisionTable, Flaw, Identity, Payload, PayloadKind, Registration},
  mockcore::Handle,
  pretty_assertions::assert_eq as pretty_assert_eq,
  regex::Regex,
  reqwest::{StatusCode, blocking::Response},
  rusqlite::Connection,
  std::{
    fs,
    net::TcpListener,
    process::{Child, Command, Stdio},
    sync::Arc,
    thread,
    time::{Duration, Instant},
  },
  tempfile::TempDir,
};

mod command_builder;

mod decode;
mod status;

/// Makes every account insert fail, simulating a broken store.
const FAILING_ACCOUNT_INSERT: &str =
  "CREATE TRIGGER fail BEFORE INSERT ON accounts BEGIN SELECT RAISE(ABORT, 'boom'); END;";

fn key_hash(byte: u8) -> Payload {
  Payload {
    kind: PayloadKind::KeyHash,
    data: vec![byte; 20],
  }
}

fn registration(name: &str, payloads: Vec<Payload>) -> Transaction {
  mockcore::transaction(&[Registration {
    name: name.into(),
    payloads,
    flaws: Vec::new(),
  }
  .encipher()])
}

/// An `OP_RETURN` with the registration prefix followed by raw pushes.
fn raw_registration(segments: &[&[u8]]) -> Transaction {
  let mut script = Registration::PREFIX.to_vec();

  for segment in segments {
    cashaccount::script::push(&mut script, segment);
  }

  mockcore::transaction(&[ScriptBuf::from_bytes(script)])
}

/// Open the index database left behind by a finished `calus` process.
fn open_index(tempdir: &TempDir) -> Connection {
  Connection::open(tempdir.path().join("index.sqlite3")).unwrap()
}

fn blob_hex(connection: &Connection, sql: &str) -> Vec<String> {
  let mut statement = connection.prepare(sql).unwrap();

  statement
    .query_map([], |row| row.get::<_, String>(0))
    .unwrap()
    .map(|hex| hex.unwrap().to_lowercase())
    .collect()
}
