use rust_decimal::Decimal;
use thiserror::Error;

/// Configuration-related errors with structured variants.
///
/// Always fatal: raised at load time or when a policy is resolved against
/// live state and turns out to be malformed. Never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("malformed value expression '{from}'..'{to}': {reason}")]
    ValueExpression {
        from: String,
        to: String,
        reason: String,
    },

    #[error("unknown chain '{0}'")]
    UnknownChain(String),

    #[error("unknown route provider '{0}'")]
    UnknownRoute(String),

    #[error("invalid wallet entry #{line}: {reason}")]
    WalletEntry { line: usize, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Transaction execution errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecutionError {
    #[error("transaction {tx_hash} reverted")]
    Reverted { tx_hash: String },

    #[error("transaction {tx_hash} status unknown after {waited_secs}s")]
    StatusUnknown { tx_hash: String, waited_secs: u64 },

    #[error("route simulation failed: {0}")]
    SimulationFailed(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),

    #[error("nonce or fee conflict: {0}")]
    NonceConflict(String),

    #[error("insufficient balance: {0}")]
    InsufficientBalance(String),

    #[error("no signer for wallet {0}")]
    UnknownSigner(String),
}

/// Economic vetoes: the market says no, retrying would not help.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VetoError {
    #[error("unit price {price} below floor {floor}")]
    PriceBelowFloor { price: Decimal, floor: Decimal },

    #[error("no price available to check against floor {floor}")]
    PriceUnknown { floor: Decimal },

    #[error("slippage too high: {actual} > {max}")]
    SlippageTooHigh { actual: Decimal, max: Decimal },

    #[error("route fee {fee} exceeds limit {limit}")]
    RouteFeeTooHigh { fee: String, limit: String },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Veto(#[from] VetoError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("RPC error: {0}")]
    Rpc(String),

    #[error("operation timed out: {0}")]
    Timeout(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    #[error("parse error: {0}")]
    Parse(String),
}

impl Error {
    /// True for transient external failures that a fixed-interval retry can
    /// plausibly clear: network, RPC flakiness, rate limits, nonce races.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Http(_) | Self::Rpc(_) | Self::Timeout(_) | Self::RateLimited(_) => true,
            Self::Execution(ExecutionError::NonceConflict(_))
            | Self::Execution(ExecutionError::SimulationFailed(_)) => true,
            Self::Config(_)
            | Self::Veto(_)
            | Self::Execution(_)
            | Self::Json(_)
            | Self::Io(_)
            | Self::Url(_)
            | Self::Parse(_) => false,
        }
    }

    /// True for configuration errors, the only kind that aborts a run.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        // dialoguer::Error wraps an IO error
        Error::Io(std::io::Error::other(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn transient_errors_are_retryable() {
        assert!(Error::Rpc("connection reset".into()).is_retryable());
        assert!(Error::Timeout("quote".into()).is_retryable());
        assert!(Error::RateLimited("429".into()).is_retryable());
        assert!(Error::from(ExecutionError::NonceConflict("nonce too low".into())).is_retryable());
    }

    #[test]
    fn validation_errors_are_fatal() {
        let config = Error::from(ConfigError::MissingField { field: "to_chain" });
        assert!(!config.is_retryable());
        assert!(config.is_config());

        let veto = Error::from(VetoError::SlippageTooHigh {
            actual: dec!(0.10),
            max: dec!(0.05),
        });
        assert!(!veto.is_retryable());

        let reverted = Error::from(ExecutionError::Reverted {
            tx_hash: "0xabc".into(),
        });
        assert!(!reverted.is_retryable());
    }
}
