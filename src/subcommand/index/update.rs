use super::*;

pub(crate) fn run(settings: Settings) -> SubcommandResult {
  let index = Index::open(&settings)?;

  match index.update_with_progress_bar()? {
    Pass::Completed(summary) => Ok(Some(Box::new(summary))),
    Pass::AlreadyRunning => bail!("an indexing pass is already running"),
  }
}
