use super::*;

#[derive(Debug, Snafu)]
#[snafu(context(suffix(false)), visibility(pub(crate)))]
pub enum SnafuError {
  #[snafu(display("{err}"))]
  Anyhow { err: anyhow::Error },
  #[snafu(display("Failed to fetch block {height}: {err}"))]
  ChainFetch { height: u32, err: anyhow::Error },
  #[snafu(display("Failed to parse config file `{}`", path.display()))]
  ConfigParse {
    path: PathBuf,
    source: serde_yaml::Error,
  },
  #[snafu(display("Failed to read config file `{}`", path.display()))]
  ConfigRead { path: PathBuf, source: io::Error },
  #[snafu(display("Invalid chain `{chain}`"))]
  InvalidChain { chain: String },
  #[snafu(display("Failed to persist block {height}"))]
  Persistence {
    height: u32,
    source: rusqlite::Error,
  },
  #[snafu(display(
    "Chain reorganization at height {height}: expected parent {expected} but block builds on {actual}"
  ))]
  Reorg {
    height: u32,
    expected: BlockHash,
    actual: BlockHash,
  },
}

impl SnafuError {
  /// Errors after which the index must not keep building on its state.
  pub fn is_fatal(&self) -> bool {
    matches!(self, Self::Persistence { .. })
  }
}

impl From<Error> for SnafuError {
  fn from(err: Error) -> SnafuError {
    match err.downcast::<SnafuError>() {
      Ok(err) => err,
      Err(err) => Self::Anyhow { err },
    }
  }
}

/// We currently use `anyhow` for error handling but are migrating to typed
/// errors using `snafu`. This trait exists to provide access to
/// `snafu::ResultExt::{context, with_context}`, which are otherwise shadowed
/// by `anyhow::Context::{context, with_context}`. Once the migration is
/// complete, this trait can be deleted, and `snafu::ResultExt` used directly.
pub(crate) trait ResultExt<T, E>: Sized {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat;
}

impl<T, E> ResultExt<T, E> for std::result::Result<T, E> {
  fn snafu_context<C, E2>(self, context: C) -> Result<T, E2>
  where
    C: snafu::IntoError<E2, Source = E>,
    E2: std::error::Error + snafu::ErrorCompat,
  {
    use snafu::ResultExt;
    self.context(context)
  }
}
