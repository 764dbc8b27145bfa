//! Types for interoperating with Cash Account registrations.

use {
  bitcoin::{
    ScriptBuf, Transaction,
    hashes::{Hash, sha256},
  },
  byteorder::{BigEndian, ByteOrder},
  derive_more::Display,
  regex::Regex,
  serde::{Deserialize, Serialize},
  std::{
    collections::BTreeMap,
    str::FromStr,
    sync::LazyLock,
  },
  thiserror::Error,
};

pub use {
  artifact::Artifact, collision::Collision, collision::CollisionTable, flaw::Flaw,
  identity::CollisionHash, identity::Identity, payload::Payload, payload::PayloadKind,
  registration::Registration, script::MalformedScript,
};

pub mod cashaddr;
pub mod script;

mod artifact;
mod collision;
mod flaw;
mod identity;
mod payload;
mod registration;
