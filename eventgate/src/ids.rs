//! Tagged identifiers in the gateway's wire format
//!
//! Every identifier the gateway mints follows the same shape:
//! `<prefix>-<base36 millis>-<6 random base36 chars>`. Event ids use the
//! `evt` prefix, request ids `req`, correlation ids `err`. The millisecond
//! component makes ids time-sortable; the random suffix disambiguates ids
//! minted in the same millisecond.

use http::Request;
use rand::Rng;
use tower_http::request_id::{MakeRequestId, RequestId as TowerRequestId};

const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Encode a non-negative integer as lowercase base36.
pub fn base36(mut n: u128) -> String {
    if n == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while n > 0 {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).expect("base36 alphabet is ASCII")
}

/// Six random base36 characters.
pub fn random_suffix() -> String {
    let mut rng = rand::rng();
    (0..6)
        .map(|_| BASE36[rng.random_range(0..36)] as char)
        .collect()
}

/// Mint an id of the form `<prefix>-<base36 millis>-<6 random>`.
pub fn tagged_id(prefix: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u128;
    format!("{}-{}-{}", prefix, base36(millis), random_suffix())
}

/// Mint an event id (`evt-…`).
pub fn event_id() -> String {
    tagged_id("evt")
}

/// Mint a correlation id (`err-…`) attached to 500 responses and their logs.
pub fn correlation_id() -> String {
    tagged_id("err")
}

/// A `MakeRequestId` implementation minting `req-…` ids for tower-http.
///
/// `SetRequestIdLayer` only invokes this when the inbound request carries no
/// `x-request-id` header, so an upstream trace id always wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct MakeGatewayRequestId;

impl MakeRequestId for MakeGatewayRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<TowerRequestId> {
        let id = tagged_id("req");
        let value = http::HeaderValue::from_str(&id).ok()?;
        Some(TowerRequestId::new(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base36_encoding() {
        assert_eq!(base36(0), "0");
        assert_eq!(base36(35), "z");
        assert_eq!(base36(36), "10");
        assert_eq!(base36(1_700_000_000_000), "loyw3v28");
    }

    #[test]
    fn test_tagged_id_shape() {
        let id = tagged_id("evt");
        let parts: Vec<&str> = id.split('-').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0], "evt");
        assert!(!parts[1].is_empty());
        assert_eq!(parts[2].len(), 6);
        assert!(parts[2].chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
    }

    #[test]
    fn test_ids_are_distinct() {
        let a = event_id();
        let b = event_id();
        assert_ne!(a, b);
    }

    #[test]
    fn test_make_gateway_request_id() {
        let mut maker = MakeGatewayRequestId;
        let request = http::Request::builder().body(()).unwrap();
        let id = maker.make_request_id(&request).unwrap();
        assert!(id.header_value().to_str().unwrap().starts_with("req-"));
    }
}
