use {super::*, bitcoincore_rpc::jsonrpc, clap::ValueEnum};

/// How much ledger data the index keeps besides the registrations themselves.
#[derive(Default, ValueEnum, Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Storage {
  #[default]
  Minimal,
  Full,
}

#[derive(Default, Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields, rename_all = "kebab-case")]
pub struct Settings {
  bitcoin_rpc_password: Option<String>,
  bitcoin_rpc_timeout: Option<String>,
  bitcoin_rpc_url: Option<String>,
  bitcoin_rpc_username: Option<String>,
  chain: Option<Chain>,
  config: Option<PathBuf>,
  cookie_file: Option<PathBuf>,
  data_dir: Option<PathBuf>,
  index: Option<PathBuf>,
  storage: Option<Storage>,
}

impl Settings {
  pub fn load(options: Options) -> Result<Settings> {
    let mut env = BTreeMap::<String, String>::new();

    for (var, value) in env::vars_os() {
      let Some(var) = var.to_str() else {
        continue;
      };

      let Some(key) = var.strip_prefix("CALUS_") else {
        continue;
      };

      env.insert(
        key.into(),
        value.into_string().map_err(|value| {
          anyhow!(
            "environment variable `{var}` not valid unicode: `{}`",
            value.to_string_lossy()
          )
        })?,
      );
    }

    Self::merge(options, env)
  }

  pub fn merge(options: Options, env: BTreeMap<String, String>) -> Result<Self> {
    let settings = Settings::from_options(options).or(Settings::from_env(env)?);

    let config_path = match &settings.config {
      Some(path) => Some(path.clone()),
      None => {
        let path = settings.clone().or_defaults()?.data_dir()?.join("calus.yaml");
        path.exists().then_some(path)
      }
    };

    let config = match config_path {
      Some(path) => serde_yaml::from_reader(
        fs::File::open(&path).snafu_context(error::ConfigRead { path: path.clone() })?,
      )
      .snafu_context(error::ConfigParse { path })?,
      None => Settings::default(),
    };

    let settings = settings.or(config).or_defaults()?;

    ensure!(
      settings.bitcoin_rpc_username.is_some() == settings.bitcoin_rpc_password.is_some(),
      "must set both bitcoin RPC username and password, or neither"
    );

    settings.bitcoin_rpc_timeout()?;

    Ok(settings)
  }

  pub fn from_options(options: Options) -> Self {
    Self {
      bitcoin_rpc_password: options.bitcoin_rpc_password,
      bitcoin_rpc_timeout: options.bitcoin_rpc_timeout,
      bitcoin_rpc_url: options.bitcoin_rpc_url,
      bitcoin_rpc_username: options.bitcoin_rpc_username,
      chain: options
        .regtest
        .then_some(Chain::BitcoincashRegtest)
        .or(options.testnet.then_some(Chain::BitcoincashTestnet))
        .or(options.chain_argument),
      config: options.config,
      cookie_file: options.cookie_file,
      data_dir: options.data_dir,
      index: options.index,
      storage: options.storage,
    }
  }

  pub fn from_env(env: BTreeMap<String, String>) -> Result<Self> {
    let get_string = |key: &str| env.get(key).cloned();

    let get_path = |key: &str| env.get(key).map(PathBuf::from);

    let get_chain = |key: &str| {
      env
        .get(key)
        .map(|chain| chain.parse::<Chain>())
        .transpose()
        .with_context(|| format!("failed to parse environment variable CALUS_{key} as chain"))
    };

    let get_storage = |key: &str| {
      env
        .get(key)
        .map(|storage| Storage::from_str(storage, true).map_err(|err| anyhow!(err)))
        .transpose()
        .with_context(|| format!("failed to parse environment variable CALUS_{key} as storage"))
    };

    Ok(Self {
      bitcoin_rpc_password: get_string("BITCOIN_RPC_PASSWORD"),
      bitcoin_rpc_timeout: get_string("BITCOIN_RPC_TIMEOUT"),
      bitcoin_rpc_url: get_string("BITCOIN_RPC_URL"),
      bitcoin_rpc_username: get_string("BITCOIN_RPC_USERNAME"),
      chain: get_chain("CHAIN")?,
      config: get_path("CONFIG"),
      cookie_file: get_path("COOKIE_FILE"),
      data_dir: get_path("DATA_DIR"),
      index: get_path("INDEX"),
      storage: get_storage("STORAGE")?,
    })
  }

  pub fn or(self, source: Settings) -> Self {
    Self {
      bitcoin_rpc_password: self.bitcoin_rpc_password.or(source.bitcoin_rpc_password),
      bitcoin_rpc_timeout: self.bitcoin_rpc_timeout.or(source.bitcoin_rpc_timeout),
      bitcoin_rpc_url: self.bitcoin_rpc_url.or(source.bitcoin_rpc_url),
      bitcoin_rpc_username: self.bitcoin_rpc_username.or(source.bitcoin_rpc_username),
      chain: self.chain.or(source.chain),
      config: self.config.or(source.config),
      cookie_file: self.cookie_file.or(source.cookie_file),
      data_dir: self.data_dir.or(source.data_dir),
      index: self.index.or(source.index),
      storage: self.storage.or(source.storage),
    }
  }

  pub fn or_defaults(self) -> Result<Self> {
    let chain = self.chain.unwrap_or_default();

    let data_dir = match &self.data_dir {
      Some(data_dir) => data_dir.clone(),
      None => chain.join_with_data_dir(
        dirs::data_dir()
          .context("could not get data dir")?
          .join("calus"),
      ),
    };

    let index = self
      .index
      .clone()
      .unwrap_or_else(|| data_dir.join("index.sqlite3"));

    Ok(Self {
      bitcoin_rpc_password: self.bitcoin_rpc_password,
      bitcoin_rpc_timeout: Some(
        self
          .bitcoin_rpc_timeout
          .unwrap_or_else(|| "5s".into()),
      ),
      bitcoin_rpc_url: Some(
        self
          .bitcoin_rpc_url
          .unwrap_or_else(|| format!("127.0.0.1:{}", chain.default_rpc_port())),
      ),
      bitcoin_rpc_username: self.bitcoin_rpc_username,
      chain: Some(chain),
      config: self.config,
      cookie_file: self.cookie_file,
      data_dir: Some(data_dir),
      index: Some(index),
      storage: Some(self.storage.unwrap_or_default()),
    })
  }

  pub fn chain(&self) -> Chain {
    self.chain.unwrap_or_default()
  }

  pub fn data_dir(&self) -> Result<PathBuf> {
    self.data_dir.clone().context("data dir not set")
  }

  pub fn index(&self) -> Result<PathBuf> {
    self.index.clone().context("index path not set")
  }

  pub fn storage(&self) -> Storage {
    self.storage.unwrap_or_default()
  }

  pub fn bitcoin_rpc_url(&self) -> String {
    self
      .bitcoin_rpc_url
      .clone()
      .unwrap_or_else(|| format!("127.0.0.1:{}", self.chain().default_rpc_port()))
  }

  pub fn bitcoin_rpc_timeout(&self) -> Result<Duration> {
    let timeout = self.bitcoin_rpc_timeout.as_deref().unwrap_or("5s");

    humantime::parse_duration(timeout)
      .with_context(|| format!("invalid bitcoin RPC timeout `{timeout}`"))
  }

  pub fn bitcoin_rpc_client(&self) -> Result<Client> {
    let url = self.bitcoin_rpc_url();

    let builder = jsonrpc::simple_http::SimpleHttpTransport::builder()
      .url(&url)
      .with_context(|| format!("invalid bitcoin RPC url `{url}`"))?
      .timeout(self.bitcoin_rpc_timeout()?);

    let builder = match (
      &self.bitcoin_rpc_username,
      &self.bitcoin_rpc_password,
      &self.cookie_file,
    ) {
      (Some(username), Some(password), _) => builder.auth(username, Some(password)),
      (_, _, Some(cookie_file)) => {
        let cookie = fs::read_to_string(cookie_file)
          .with_context(|| format!("failed to read cookie file `{}`", cookie_file.display()))?;
        builder.cookie_auth(cookie.trim())
      }
      _ => builder,
    };

    log::info!("Connecting to Bitcoin Cash node at {url}");

    Ok(Client::from_jsonrpc(jsonrpc::Client::with_transport(
      builder.build(),
    )))
  }
}
