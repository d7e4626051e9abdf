//! Request identifiers.
//!
//! Every request the dispatcher sees gets a [`RequestId`]. A caller may pass
//! its own id in the [`REQUEST_ID_HEADER`] header so that a request can be
//! followed across services; anything that is not a valid ULID is ignored
//! and replaced with a freshly minted id.
//!
//! The id shows up as the `request_id` field of every dispatch log event and
//! is available to handlers through [`Context`](crate::dispatcher::Context).
//! It serializes as its 26-character Crockford base32 text.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Header a caller may use to propagate its own request id.
///
/// Lookups through [`RequestHead::header`](crate::server::RequestHead::header)
/// ignore case, so `X-Reqid` matches as well.
pub const REQUEST_ID_HEADER: &str = "x-reqid";

/// Request identifier backed by ULID, carried in every dispatch log event.
///
/// ULIDs sort by creation time, so ids minted by one process order the same
/// way its log lines do.
#[derive(Clone, Copy, Eq, PartialEq, Hash, Debug)]
pub struct RequestId(pub ulid::Ulid);

impl RequestId {
    /// Mint a new id from the current time and a random component.
    ///
    /// # Returns
    ///
    /// A [`RequestId`] that is unique for all practical purposes.
    #[must_use]
    pub fn new() -> Self {
        Self(ulid::Ulid::new())
    }

    /// Reuse the caller's id when it parses, otherwise mint a new one.
    ///
    /// # Arguments
    ///
    /// * `header_value` - Value of the [`REQUEST_ID_HEADER`] header, if the
    ///   request carried one.
    ///
    /// # Returns
    ///
    /// The parsed caller id, or a new id when the header is missing or not a
    /// valid ULID.
    #[must_use]
    pub fn from_header_or_new(header_value: Option<&str>) -> Self {
        header_value
            .and_then(|s| s.parse::<RequestId>().ok())
            .unwrap_or_default()
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl FromStr for RequestId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ulid::Ulid::from_string(s).map(RequestId)
    }
}

impl Serialize for RequestId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for RequestId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse::<RequestId>()
            .map_err(|_| serde::de::Error::custom("invalid request id"))
    }
}
