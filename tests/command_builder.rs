use {super::*, serde::de::DeserializeOwned};

enum Expected {
  String(String),
  Regex(Regex),
  Ignore,
}

impl Expected {
  fn regex(pattern: &str) -> Self {
    Self::Regex(Regex::new(&format!("^(?s){pattern}$")).unwrap())
  }

  #[track_caller]
  fn assert_match(&self, output: &str) {
    match self {
      Self::String(string) => pretty_assert_eq!(output, string),
      Self::Regex(regex) => assert!(
        regex.is_match(output),
        "output did not match regex `{regex}`:\n{output}",
      ),
      Self::Ignore => {}
    }
  }
}

pub(crate) struct CommandBuilder {
  args: Vec<String>,
  core_url: Option<String>,
  expected_exit_code: i32,
  expected_stderr: Expected,
  expected_stdout: Expected,
  tempdir: Arc<TempDir>,
}

impl CommandBuilder {
  pub(crate) fn new(args: &str) -> Self {
    Self {
      args: args.split_whitespace().map(String::from).collect(),
      core_url: None,
      expected_exit_code: 0,
      expected_stderr: Expected::String(String::new()),
      expected_stdout: Expected::String(String::new()),
      tempdir: Arc::new(TempDir::new().unwrap()),
    }
  }

  pub(crate) fn core(self, core: &Handle) -> Self {
    Self {
      core_url: Some(core.url()),
      ..self
    }
  }

  pub(crate) fn temp_dir(self, tempdir: Arc<TempDir>) -> Self {
    Self { tempdir, ..self }
  }

  pub(crate) fn write(self, path: &str, contents: impl AsRef<[u8]>) -> Self {
    fs::write(self.tempdir.path().join(path), contents).unwrap();
    self
  }

  pub(crate) fn expected_exit_code(self, expected_exit_code: i32) -> Self {
    Self {
      expected_exit_code,
      ..self
    }
  }

  pub(crate) fn expected_stderr(self, expected_stderr: &str) -> Self {
    Self {
      expected_stderr: Expected::String(expected_stderr.into()),
      ..self
    }
  }

  pub(crate) fn stderr_regex(self, pattern: &str) -> Self {
    Self {
      expected_stderr: Expected::regex(pattern),
      ..self
    }
  }

  pub(crate) fn stdout_regex(self, pattern: &str) -> Self {
    Self {
      expected_stdout: Expected::regex(pattern),
      ..self
    }
  }

  fn command(&self) -> Command {
    let mut command = Command::new(env!("CARGO_BIN_EXE_calus"));

    if let Some(core_url) = &self.core_url {
      command.args(["--bitcoin-rpc-url", core_url.as_str()]);
    }

    command
      .env_remove("RUST_LOG")
      .arg("--data-dir")
      .arg(self.tempdir.path())
      .args(&self.args)
      .current_dir(self.tempdir.path())
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());

    command
  }

  #[track_caller]
  pub(crate) fn run_and_extract_stdout(self) -> String {
    let output = self.command().output().unwrap();

    let stdout = String::from_utf8(output.stdout).unwrap();
    let stderr = String::from_utf8(output.stderr).unwrap();

    if output.status.code() != Some(self.expected_exit_code) {
      panic!(
        "Test failed: {}\nstdout:\n{stdout}\nstderr:\n{stderr}",
        output.status
      );
    }

    self.expected_stderr.assert_match(&stderr);
    self.expected_stdout.assert_match(&stdout);

    stdout
  }

  #[track_caller]
  pub(crate) fn run_and_deserialize_output<T: DeserializeOwned>(self) -> T {
    let stdout = Self {
      expected_stdout: Expected::Ignore,
      ..self
    }
    .run_and_extract_stdout();

    serde_json::from_str(&stdout)
      .unwrap_or_else(|err| panic!("failed to deserialize `{stdout}`: {err}"))
  }
}
