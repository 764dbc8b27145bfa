use {
  super::*,
  indicatif::{ProgressBar, ProgressStyle},
};

/// What the validator made of one transaction, before collisions are known.
enum Outcome {
  Account {
    txid: Txid,
    body: Option<Vec<u8>>,
    name: String,
    identity: Identity,
    payloads: Vec<PayloadEntry>,
    flaws: Vec<Flaw>,
  },
  Rejected {
    txid: Txid,
    flaw: Flaw,
  },
}

pub(crate) struct Updater<'index> {
  index: &'index Index,
  progress_bar: bool,
  summary: PassSummary,
}

impl<'index> Updater<'index> {
  pub(crate) fn new(index: &'index Index, progress_bar: bool) -> Self {
    Self {
      index,
      progress_bar,
      summary: PassSummary::default(),
    }
  }

  pub(crate) fn update_index(mut self) -> Result<PassSummary> {
    let start = Instant::now();
    let index = self.index;
    let mut fetcher = Fetcher::new(&index.client);

    let result = self.index_blocks(&mut fetcher);

    self.summary.rpc_calls = fetcher.calls;
    self.summary.elapsed = start.elapsed().as_secs_f64();

    match &result {
      Ok(()) => log::info!("Indexing pass complete: {}", self.summary),
      Err(err) => log::error!("Indexing pass stopped: {err}; {}", self.summary),
    }

    result.map(|()| self.summary)
  }

  fn index_blocks(&mut self, fetcher: &mut Fetcher) -> Result {
    let mut progress_bar = self.progress_bar()?;

    loop {
      if shutting_down() {
        log::info!("Stopping indexing pass for shutdown");
        break;
      }

      let tip = self.index.chain_tip()?;

      let height = tip.height + 1;

      let Some(block) = fetcher
        .fetch_block(height)
        .map_err(|err| SnafuError::ChainFetch { height, err })?
      else {
        log::info!("No block at height {height}, index is up to date");
        break;
      };

      if let Some(expected) = tip.hash
        && block.header.prev_blockhash != expected
      {
        return Err(
          SnafuError::Reorg {
            height,
            expected,
            actual: block.header.prev_blockhash,
          }
          .into(),
        );
      }

      let entries = self.index_block(fetcher, block)?;

      self.index.persist(&entries)?;

      self.summary.blocks += 1;

      log::info!(
        "Indexed block {height} ({}) with {} registrations and {} rejections",
        entries.block.hash,
        entries.accounts.len(),
        entries.rejections.len(),
      );

      if let Some(progress_bar) = &mut progress_bar {
        progress_bar.inc(1);
      }
    }

    if let Some(progress_bar) = progress_bar {
      progress_bar.finish_and_clear();
    }

    Ok(())
  }

  fn progress_bar(&self) -> Result<Option<ProgressBar>> {
    if cfg!(test)
      || !self.progress_bar
      || log_enabled!(log::Level::Info)
      || !io::stderr().is_terminal()
    {
      return Ok(None);
    }

    let height = self.index.chain_tip()?.height;
    let Ok(count) = self.index.client.get_block_count() else {
      log::warn!("Failed to fetch block count");
      return Ok(None);
    };

    let progress_bar = ProgressBar::new(count);
    progress_bar.set_position(height.into());
    progress_bar.set_style(
      ProgressStyle::with_template("[indexing blocks] {wide_bar} {pos}/{len}")?,
    );

    Ok(Some(progress_bar))
  }

  /// Validate every transaction of `block` and turn the results into rows.
  fn index_block(&mut self, fetcher: &mut Fetcher, block: BlockData) -> Result<BlockEntries> {
    let chain = self.index.settings.chain();
    let prefix = chain.cashaddr_prefix();
    let hash = block.hash;
    let full = self.index.settings.storage() == Storage::Full;

    let number = chain.account_number(block.height).with_context(|| {
      format!(
        "block {} is below the account number offset {}",
        block.height,
        chain.number_offset()
      )
    })?;

    let outcomes = block
      .txdata
      .par_iter()
      .filter_map(|(transaction, txid)| {
        let Some(artifact) = Registration::decipher(transaction) else {
          log::debug!("Discarding {txid}: not a registration");
          return None;
        };

        Some(match artifact {
          Artifact::Registration(registration) => Outcome::Account {
            txid: *txid,
            body: full.then(|| consensus::serialize(transaction)),
            identity: Identity::new(hash, *txid),
            payloads: registration
              .payloads
              .iter()
              .map(|payload| PayloadEntry {
                tag: payload.kind.tag(),
                data: payload.data.clone(),
                address: payload.address(prefix),
              })
              .collect(),
            name: registration.name,
            flaws: registration.flaws,
          },
          Artifact::Rejection(flaw) => {
            log::info!("Rejecting {txid}: {flaw}");
            Outcome::Rejected { txid: *txid, flaw }
          }
        })
      })
      .collect::<Vec<Outcome>>();

    let mut table = CollisionTable::default();

    for outcome in &outcomes {
      if let Outcome::Account { name, identity, .. } = outcome {
        table.insert(name, &identity.collision_hash);
      }
    }

    for (name, collision_hash) in table.full_collisions() {
      log::warn!(
        "Accounts named `{name}` in block {} share collision hash {collision_hash}",
        block.height
      );
    }

    let mut proofs = if full {
      let txids = outcomes
        .iter()
        .filter_map(|outcome| match outcome {
          Outcome::Account { txid, .. } => Some(*txid),
          Outcome::Rejected { .. } => None,
        })
        .collect::<Vec<Txid>>();

      fetcher
        .fetch_inclusion_proofs(hash, &txids)
        .map_err(|err| SnafuError::ChainFetch {
          height: block.height,
          err,
        })?
    } else {
      BTreeMap::new()
    };

    self.summary.transactions += u64::try_from(block.txdata.len())?;
    self.summary.inclusion_proofs += u64::try_from(proofs.len())?;

    let mut entries = BlockEntries {
      block: BlockEntry {
        hash,
        height: block.height,
        parent: block.header.prev_blockhash,
      },
      transactions: Vec::new(),
      rejections: Vec::new(),
      accounts: Vec::new(),
    };

    for outcome in outcomes {
      match outcome {
        Outcome::Account {
          txid,
          body,
          name,
          identity,
          payloads,
          flaws,
        } => {
          log::info!(
            "Registration {name}#{number}.{} in {txid}",
            identity.collision_hash
          );

          entries.transactions.push(TransactionEntry {
            txid,
            body,
            proof: proofs.remove(&txid),
          });

          entries.rejections.extend(
            flaws
              .into_iter()
              .map(|flaw| RejectionEntry { txid, flaw }),
          );

          entries.accounts.push(AccountEntry {
            txid,
            collision: table.collision(&name, &identity.collision_hash),
            name,
            number,
            identity,
            payloads,
          });
        }
        Outcome::Rejected { txid, flaw } => {
          entries.transactions.push(TransactionEntry {
            txid,
            body: None,
            proof: None,
          });
          entries.rejections.push(RejectionEntry { txid, flaw });
        }
      }
    }

    self.summary.registrations += u64::try_from(entries.accounts.len())?;
    self.summary.rejections += u64::try_from(entries.rejections.len())?;

    Ok(entries)
  }
}
