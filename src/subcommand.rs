use {super::*, clap::ValueEnum};

pub mod decode;
pub mod index;
pub mod server;
pub mod status;

#[derive(Debug, Parser)]
pub enum Subcommand {
  #[command(about = "Decode the registration carried by a transaction")]
  Decode(decode::Decode),
  #[command(subcommand, about = "Index commands")]
  Index(index::IndexSubcommand),
  #[command(about = "Run the indexing server")]
  Server(server::Server),
  #[command(about = "Print the indexed chain tip")]
  Status,
}

impl Subcommand {
  pub(crate) fn run(self, settings: Settings) -> SubcommandResult {
    match self {
      Self::Decode(decode) => decode.run(settings),
      Self::Index(index) => index.run(settings),
      Self::Server(server) => server.run(settings),
      Self::Status => status::run(settings),
    }
  }
}

pub trait Output: Send {
  fn print(&self, format: OutputFormat);
}

impl<T> Output for T
where
  T: Serialize + Send,
{
  fn print(&self, format: OutputFormat) {
    match format {
      OutputFormat::Json => serde_json::to_writer_pretty(io::stdout(), self).ok(),
      OutputFormat::Yaml => serde_yaml::to_writer(io::stdout(), self).ok(),
      OutputFormat::Minify => serde_json::to_writer(io::stdout(), self).ok(),
    };
    println!();
  }
}

pub(crate) type SubcommandResult = Result<Option<Box<dyn Output>>>;

#[derive(Clone, Copy, Debug, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
  #[default]
  Json,
  Yaml,
  Minify,
}
