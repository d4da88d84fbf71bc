//! Symbol Normalization
//!
//! Polygon tickers spell share classes with a slash (`BRK/A`); bucket keys use
//! a period (`BRK.A`) since the slash doubles as the key separator.

/// Map a raw ticker to its canonical bucket-key form.
///
/// The first `/` is replaced with `.`; all other characters pass through.
/// Total over any input string, and idempotent once normalized.
#[must_use]
pub fn canonical(raw: &str) -> String {
    raw.replacen('/', ".", 1)
}

/// Check whether a raw ticker carries a class separator.
///
/// Bar aggregation rejects such symbols outright rather than normalizing
/// them; see the bar ingest handler.
#[must_use]
pub fn has_class_separator(raw: &str) -> bool {
    raw.contains('/')
}
