use {
  self::{
    entry::Entry,
    fetcher::{BlockData, Fetcher},
    updater::Updater,
  },
  super::*,
};

pub(crate) mod entry;
mod fetcher;
mod schema;
mod updater;
mod writer;

/// Counters describing one indexing pass.
#[derive(Debug, Default, PartialEq, Clone, Serialize, Deserialize)]
pub struct PassSummary {
  pub blocks: u64,
  pub transactions: u64,
  pub registrations: u64,
  pub rejections: u64,
  pub inclusion_proofs: u64,
  pub rpc_calls: u64,
  pub elapsed: f64,
}

impl Display for PassSummary {
  fn fmt(&self, f: &mut Formatter) -> fmt::Result {
    write!(
      f,
      "{} blocks, {} transactions, {} registrations, {} rejections, {} inclusion proofs, {} RPC calls in {:.3}s",
      self.blocks,
      self.transactions,
      self.registrations,
      self.rejections,
      self.inclusion_proofs,
      self.rpc_calls,
      self.elapsed,
    )
  }
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pass {
  AlreadyRunning,
  Completed(PassSummary),
}

#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct Status {
  pub chain: Chain,
  pub height: u32,
  pub hash: Option<BlockHash>,
  pub running: bool,
  pub software: String,
  pub version: String,
}

/// The last block whose registrations are fully stored.
#[derive(Debug, PartialEq, Clone, Copy)]
pub(crate) struct ChainTip {
  pub(crate) height: u32,
  pub(crate) hash: Option<BlockHash>,
}

/// Held while a pass runs. Dropping it lets the next pass start.
pub struct PassGuard {
  running: Arc<AtomicBool>,
}

impl Drop for PassGuard {
  fn drop(&mut self) {
    self.running.store(false, atomic::Ordering::Release);
  }
}

pub struct Index {
  client: Client,
  connection: Mutex<Connection>,
  path: PathBuf,
  running: Arc<AtomicBool>,
  settings: Settings,
}

impl Index {
  pub fn open(settings: &Settings) -> Result<Self> {
    let client = settings.bitcoin_rpc_client()?;

    let path = settings.index()?;

    if let Some(parent) = path.parent() {
      fs::create_dir_all(parent).with_context(|| {
        format!(
          "failed to create data dir `{}`",
          parent.display()
        )
      })?;
    }

    let mut connection = Connection::open(&path)
      .with_context(|| format!("failed to open index `{}`", path.display()))?;

    schema::initialize(&mut connection, settings.chain())
      .with_context(|| format!("failed to initialize index `{}`", path.display()))?;

    log::info!("Opened index at `{}`", path.display());

    Ok(Self {
      client,
      connection: Mutex::new(connection),
      path,
      running: Arc::new(AtomicBool::new(false)),
      settings: settings.clone(),
    })
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  pub fn is_running(&self) -> bool {
    self.running.load(atomic::Ordering::Acquire)
  }

  /// Claim the right to run a pass, unless one is already running.
  pub fn begin_pass(&self) -> Option<PassGuard> {
    self
      .running
      .compare_exchange(
        false,
        true,
        atomic::Ordering::AcqRel,
        atomic::Ordering::Acquire,
      )
      .ok()
      .map(|_| PassGuard {
        running: self.running.clone(),
      })
  }

  /// Index every block the node has that the index does not, unless a pass
  /// is already running.
  pub fn update(&self) -> Result<Pass> {
    let Some(guard) = self.begin_pass() else {
      log::info!("Ignoring update request, a pass is already running");
      return Ok(Pass::AlreadyRunning);
    };

    self.run_pass(guard, false).map(Pass::Completed)
  }

  /// Like `update`, rendering a progress bar on an interactive terminal.
  pub fn update_with_progress_bar(&self) -> Result<Pass> {
    let Some(guard) = self.begin_pass() else {
      return Ok(Pass::AlreadyRunning);
    };

    self.run_pass(guard, true).map(Pass::Completed)
  }

  pub fn run_pass(&self, guard: PassGuard, progress_bar: bool) -> Result<PassSummary> {
    let result = Updater::new(self, progress_bar).update_index();
    drop(guard);
    result
  }

  pub fn status(&self) -> Result<Status> {
    let tip = self.chain_tip()?;

    Ok(Status {
      chain: self.settings.chain(),
      height: tip.height,
      hash: tip.hash,
      running: self.is_running(),
      software: env!("CARGO_PKG_NAME").into(),
      version: env!("CARGO_PKG_VERSION").into(),
    })
  }

  pub(crate) fn chain_tip(&self) -> Result<ChainTip> {
    let connection = self.lock()?;

    let (height, hash) = connection.query_row(
      "SELECT chain_tip_height, chain_tip_hash FROM service_status WHERE status_id = 0",
      [],
      |row| Ok((row.get::<_, u32>(0)?, row.get::<_, Option<[u8; 32]>>(1)?)),
    )?;

    Ok(ChainTip {
      height,
      hash: hash.map(BlockHash::load),
    })
  }

  pub(crate) fn persist(&self, entries: &BlockEntries) -> SnafuResult {
    let mut connection = self.lock()?;

    writer::persist(&mut connection, entries).snafu_context(error::Persistence {
      height: entries.block.height,
    })
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
    self
      .connection
      .lock()
      .map_err(|_| anyhow!("index connection lock poisoned"))
  }
}
