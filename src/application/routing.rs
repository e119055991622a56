//! Route lookup by name and priority-ordered quoting with fallback.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, info};

use super::retry::RetryPolicy;
use crate::domain::quote::{Quote, QuoteResponse, RouteRequest, Unavailable};
use crate::error::{ConfigError, Result};
use crate::port::outbound::route::RouteProvider;

/// Named route providers available to a run.
#[derive(Clone, Default)]
pub struct RouteRegistry {
    providers: HashMap<&'static str, Arc<dyn RouteProvider>>,
}

impl RouteRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, provider: Arc<dyn RouteProvider>) {
        self.providers.insert(provider.name(), provider);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<dyn RouteProvider>> {
        self.providers.get(name).cloned()
    }

    /// Providers for `names`, in the given order.
    pub fn resolve(&self, names: &[String]) -> std::result::Result<Vec<Arc<dyn RouteProvider>>, ConfigError> {
        names
            .iter()
            .map(|name| {
                let key = name.trim().to_lowercase();
                self.get(&key).ok_or_else(|| ConfigError::UnknownRoute(name.clone()))
            })
            .collect()
    }

    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.providers.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// The winning route, or why there was none.
pub enum RouteSelection {
    Found {
        provider: Arc<dyn RouteProvider>,
        quote: Quote,
    },
    NoRoute(Vec<(String, Unavailable)>),
}

/// Ask each provider in order and return the first available quote.
///
/// A provider that declines, or keeps failing past the retry budget, hands
/// over to the next one. Configuration errors abort the selection.
pub async fn select_route(
    providers: &[Arc<dyn RouteProvider>],
    request: &RouteRequest,
    retry: &RetryPolicy,
) -> Result<RouteSelection> {
    let mut declines = Vec::with_capacity(providers.len());

    for provider in providers {
        let name = provider.name();
        let response = match retry.run(name, || provider.quote(request)).await {
            Ok(Some(response)) => response,
            Ok(None) => QuoteResponse::Unavailable(Unavailable::Other("unreachable".into())),
            Err(err) if err.is_config() => return Err(err),
            Err(err) => QuoteResponse::Unavailable(Unavailable::Other(err.to_string())),
        };

        match response {
            QuoteResponse::Available(quote) => {
                info!(
                    chain = %request.chain,
                    provider = name,
                    amount_in = %request.amount_in,
                    amount_out = %quote.amount_out,
                    "Route quoted"
                );
                return Ok(RouteSelection::Found {
                    provider: Arc::clone(provider),
                    quote,
                });
            }
            QuoteResponse::Unavailable(reason) => {
                debug!(chain = %request.chain, provider = name, reason = %reason, "Route unavailable");
                declines.push((name.to_string(), reason));
            }
        }
    }

    Ok(RouteSelection::NoRoute(declines))
}
