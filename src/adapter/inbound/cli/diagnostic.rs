//! Miette-based error diagnostics for CLI error presentation.
//!
//! Turns crate errors into reports with a code, a help line and, for TOML
//! syntax errors, the offending region of the configuration file.

use std::fmt::Display;
use std::path::Path;

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

use crate::error::{ConfigError as CrateConfigError, Error};

/// Configuration error with source location context.
#[derive(Debug, Error, Diagnostic)]
#[error("{message}")]
#[diagnostic(code(dustsweep::config))]
pub struct ConfigError {
    pub message: String,

    #[source_code]
    pub src: NamedSource<String>,

    #[label("here")]
    pub span: SourceSpan,

    #[help]
    pub help: Option<String>,
}

impl ConfigError {
    #[must_use]
    pub fn new(
        message: impl Into<String>,
        name: impl AsRef<str>,
        src: impl Into<String>,
        offset: usize,
        len: usize,
    ) -> Self {
        Self {
            message: message.into(),
            src: NamedSource::new(name, src.into()),
            span: (offset, len).into(),
            help: None,
        }
    }

    #[must_use]
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }
}

/// Any other failure, with a code per error family.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    pub message: String,
    pub code: &'static str,
    pub help: Option<String>,
}

impl Diagnostic for CommandError {
    fn code<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        Some(Box::new(self.code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn Display + 'a>> {
        self.help
            .as_ref()
            .map(|help| Box::new(help) as Box<dyn Display + 'a>)
    }
}

/// Build a printable report for `err`.
///
/// `config` is the file the failed command read, used to show where a TOML
/// syntax error sits.
pub fn report(err: Error, config: Option<&Path>) -> miette::Report {
    if let Error::Config(CrateConfigError::Parse(ref parse)) = err {
        if let Some(diagnostic) = config.and_then(|path| parse_diagnostic(parse, path)) {
            return diagnostic.into();
        }
    }

    let (code, help) = classify(&err);
    CommandError {
        message: err.to_string(),
        code,
        help,
    }
    .into()
}

fn parse_diagnostic(parse: &toml::de::Error, path: &Path) -> Option<ConfigError> {
    let span = parse.span()?;
    let src = std::fs::read_to_string(path).ok()?;
    let len = span.end.saturating_sub(span.start).max(1);
    Some(
        ConfigError::new(
            parse.message().to_string(),
            path.display().to_string(),
            src,
            span.start,
            len,
        )
        .with_help("fix the TOML syntax, then run `dustsweep check config`"),
    )
}

fn classify(err: &Error) -> (&'static str, Option<String>) {
    match err {
        Error::Config(CrateConfigError::ReadFile(_)) => (
            "dustsweep::config",
            Some("create one with `dustsweep config init` or pass --config".to_string()),
        ),
        Error::Config(CrateConfigError::UnknownChain(_)) => (
            "dustsweep::config",
            Some("`dustsweep chains` lists the supported names".to_string()),
        ),
        Error::Config(CrateConfigError::UnknownRoute(_)) => (
            "dustsweep::config",
            Some(
                "known routes: direct, unwrap, odos, sushiswap, stargate, relay".to_string(),
            ),
        ),
        Error::Config(CrateConfigError::WalletEntry { .. }) => (
            "dustsweep::wallets",
            Some("each line is `private_key` or `private_key,destination`".to_string()),
        ),
        Error::Config(_) => (
            "dustsweep::config",
            Some("run `dustsweep check config` for details".to_string()),
        ),
        Error::Http(_) | Error::Rpc(_) | Error::Timeout(_) | Error::RateLimited(_) => (
            "dustsweep::connection",
            Some("check your network connection and RPC endpoints".to_string()),
        ),
        Error::Io(io) if io.kind() == std::io::ErrorKind::Interrupted => {
            ("dustsweep::interrupted", None)
        }
        _ => ("dustsweep::error", None),
    }
}
