//! Per-symbol fan-out with isolated failures.
//!
//! Every symbol in a batch gets its own `Result`; one symbol failing (or
//! panicking) never affects the others. Results come back in request order.

use crate::domain::error::SwingscanError;

/// Market suffix stripped from symbols in output keys.
pub const MARKET_SUFFIX: &str = ".NS";

/// Upper bound on symbols processed concurrently.
pub const MAX_PARALLEL_SYMBOLS: usize = 8;

pub fn display_symbol(symbol: &str) -> String {
    symbol.replace(MARKET_SUFFIX, "")
}

#[derive(Debug)]
pub struct SymbolResult<T> {
    pub symbol: String,
    pub result: Result<T, SwingscanError>,
}

impl<T> SymbolResult<T> {
    pub fn display_symbol(&self) -> String {
        display_symbol(&self.symbol)
    }
}

pub fn run_per_symbol<T, F>(symbols: &[String], work: F) -> Vec<SymbolResult<T>>
where
    T: Send,
    F: Fn(&str) -> Result<T, SwingscanError> + Sync,
{
    let mut results = Vec::with_capacity(symbols.len());
    for chunk in symbols.chunks(MAX_PARALLEL_SYMBOLS) {
        std::thread::scope(|scope| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|symbol| {
                    let work = &work;
                    (symbol, scope.spawn(move || work(symbol)))
                })
                .collect();

            for (symbol, handle) in handles {
                let result = handle.join().unwrap_or_else(|_| {
                    Err(SwingscanError::Provider {
                        reason: format!("worker for {symbol} panicked"),
                    })
                });
                if let Err(e) = &result {
                    tracing::warn!(%symbol, error = %e, "symbol failed");
                }
                results.push(SymbolResult {
                    symbol: symbol.clone(),
                    result,
                });
            }
        });
    }
    results
}
