//! Polygon Wire Message Parsing
//!
//! Lenient field extraction over Polygon's JSON event payloads. The feed is
//! best-effort: a missing or type-mismatched field resolves to the zero value
//! and never raises, so partial or garbled messages still flow through the
//! pipeline rather than being dropped.
//!
//! # Wire Format
//!
//! Events arrive as JSON objects tagged with an `ev` field, usually batched
//! into arrays:
//!
//! ```json
//! [{"ev":"AM","sym":"AAPL","o":150.0,"h":151.0,"l":149.5,"c":150.5,
//!   "v":10000,"s":1700000000000},
//!  {"ev":"T","sym":"BRK/A","p":300.0,"s":5,"c":[12,51],"t":1700000000123},
//!  {"ev":"Q","sym":"MSFT","bp":300.1,"ap":300.2,"bs":10,"as":12,
//!   "t":1700000059999}]
//! ```

use serde_json::Value;

/// Event tag for minute aggregates.
pub const EVENT_AGGREGATE: &str = "AM";

/// Event tag for trades.
pub const EVENT_TRADE: &str = "T";

/// Event tag for quotes.
pub const EVENT_QUOTE: &str = "Q";

/// Event tag for connection status messages.
pub const EVENT_STATUS: &str = "status";

/// A raw Polygon event, borrowed from the decoded payload.
///
/// Wraps a JSON value and exposes zero-defaulting accessors for the typed
/// fields each handler needs.
#[derive(Debug, Clone, Copy)]
pub struct RawEvent<'a> {
    value: &'a Value,
}

impl<'a> RawEvent<'a> {
    /// Wrap a decoded JSON value.
    #[must_use]
    pub const fn new(value: &'a Value) -> Self {
        Self { value }
    }

    /// The `ev` tag, empty when absent.
    #[must_use]
    pub fn event_type(&self) -> &'a str {
        self.str_field("ev")
    }

    /// A string field, empty when absent or mismatched.
    #[must_use]
    pub fn str_field(&self, name: &str) -> &'a str {
        self.value.get(name).and_then(Value::as_str).unwrap_or("")
    }

    /// A float field, zero when absent or mismatched.
    ///
    /// Numeric strings are accepted; the feed occasionally quotes numbers.
    #[must_use]
    pub fn f64_field(&self, name: &str) -> f64 {
        match self.value.get(name) {
            Some(v) => v
                .as_f64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
                .unwrap_or(0.0),
            None => 0.0,
        }
    }

    /// An integer field, zero when absent or mismatched.
    #[must_use]
    pub fn i64_field(&self, name: &str) -> i64 {
        match self.value.get(name) {
            Some(v) => v
                .as_i64()
                .or_else(|| v.as_str().and_then(|s| s.trim().parse().ok()))
                .unwrap_or(0),
            None => 0,
        }
    }

    /// The condition-code list from field `c`.
    ///
    /// Each element parses to an integer; numeric strings are trimmed and
    /// parsed, anything else parses to zero. Absent or non-array fields give
    /// an empty list.
    #[must_use]
    pub fn condition_codes(&self) -> Vec<i64> {
        let Some(codes) = self.value.get("c").and_then(Value::as_array) else {
            return Vec::new();
        };

        codes
            .iter()
            .map(|code| {
                code.as_i64()
                    .or_else(|| code.as_str().and_then(|s| s.trim().parse().ok()))
                    .unwrap_or(0)
            })
            .collect()
    }
}

/// Decode a payload into individual event values.
///
/// Payloads are either a single event object or an array of them. Malformed
/// JSON decodes to null, which flows through the zero-defaulting accessors
/// rather than erroring.
#[must_use]
pub fn decode_events(payload: &[u8]) -> Vec<Value> {
    let decoded: Value = serde_json::from_slice(payload).unwrap_or(Value::Null);
    match decoded {
        Value::Array(events) => events,
        other => vec![other],
    }
}
