#![allow(clippy::result_large_err, clippy::too_many_arguments)]

use {
  self::{
    arguments::Arguments,
    error::{ResultExt, SnafuError},
    index::entry::{AccountEntry, BlockEntries, BlockEntry, PayloadEntry, RejectionEntry, TransactionEntry},
    options::Options,
    subcommand::{OutputFormat, Subcommand, SubcommandResult},
  },
  anyhow::{Context, Error, anyhow, bail, ensure},
  bitcoin::{
    BlockHash, Transaction, Txid,
    block::Header,
    consensus::{self, encode::deserialize_hex},
    hashes::Hash,
  },
  bitcoincore_rpc::{Client, RpcApi},
  cashaccount::{Artifact, Collision, CollisionTable, Flaw, Identity, Registration},
  clap::Parser,
  log::log_enabled,
  rayon::prelude::*,
  rusqlite::{Connection, OptionalExtension, params},
  serde::{Deserialize, Serialize},
  serde_json::{Value, json},
  snafu::Snafu,
  std::{
    collections::BTreeMap,
    env,
    fmt::{self, Display, Formatter},
    fs,
    io::{self, IsTerminal},
    path::{Path, PathBuf},
    process,
    str::FromStr,
    sync::{
      Arc, Mutex,
      atomic::{self, AtomicBool},
    },
    thread,
    time::{Duration, Instant},
  },
};

pub use self::{
  chain::Chain,
  index::{Index, Pass, PassSummary, Status},
  settings::{Settings, Storage},
};

pub mod arguments;
mod chain;
mod error;
pub mod index;
pub mod options;
pub mod settings;
pub mod subcommand;

type Result<T = (), E = Error> = std::result::Result<T, E>;
type SnafuResult<T = (), E = SnafuError> = std::result::Result<T, E>;

static SHUTTING_DOWN: AtomicBool = AtomicBool::new(false);

/// Ask running passes and servers to stop at the next opportunity.
pub fn shut_down() {
  SHUTTING_DOWN.store(true, atomic::Ordering::Relaxed);
}

fn shutting_down() -> bool {
  SHUTTING_DOWN.load(atomic::Ordering::Relaxed)
}

trait IntoOption<T> {
  fn into_option(self) -> Result<Option<T>, bitcoincore_rpc::Error>;
}

impl<T> IntoOption<T> for Result<T, bitcoincore_rpc::Error> {
  fn into_option(self) -> Result<Option<T>, bitcoincore_rpc::Error> {
    use bitcoincore_rpc::jsonrpc::error::{Error as JsonRpcError, RpcError};

    match self {
      Ok(ok) => Ok(Some(ok)),
      Err(bitcoincore_rpc::Error::JsonRpc(JsonRpcError::Rpc(RpcError { code: -8, .. }))) => {
        Ok(None)
      }
      Err(bitcoincore_rpc::Error::JsonRpc(JsonRpcError::Rpc(RpcError { message, .. })))
        if message.ends_with("not found") =>
      {
        Ok(None)
      }
      Err(err) => Err(err),
    }
  }
}

pub fn main() {
  env_logger::init();

  ctrlc::set_handler(move || {
    if SHUTTING_DOWN.fetch_or(true, atomic::Ordering::Relaxed) {
      process::exit(1);
    }

    eprintln!("Shutting down gracefully. Press <CTRL-C> again to shutdown immediately.");
  })
  .expect("Error setting <CTRL-C> handler");

  let args = Arguments::parse();

  let format = args.options.format;

  match args.run() {
    Err(err) => {
      eprintln!("error: {err}");

      if let SnafuError::Anyhow { err } = &err {
        for (i, err) in err.chain().skip(1).enumerate() {
          if i == 0 {
            eprintln!();
            eprintln!("because:");
          }

          eprintln!("- {err}");
        }

        if env::var_os("RUST_BACKTRACE")
          .map(|val| val == "1")
          .unwrap_or_default()
        {
          eprintln!("{}", err.backtrace());
        }
      }

      process::exit(1);
    }
    Ok(output) => {
      if let Some(output) = output {
        output.print(format.unwrap_or_default());
      }
    }
  }
}
