//! Domain-separated SHA-256 content hashes.
//!
//! Every digest is computed as
//! `SHA-256("route-forge:" || domain || ":v1" || (len_le64 || part)*)`, so
//! the same bytes hashed for different purposes never collide and the
//! algorithm version is bound into every value.

use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha2::{Digest, Sha256};

use super::error::Error;
use crate::model::{Route, RouteSet};

const PREFIX: &str = "sha256:";

const DOMAIN_ARTIFACT: &[u8] = b"artifact";
const DOMAIN_RAW_INPUT: &[u8] = b"raw-input";
const DOMAIN_ROUTE: &[u8] = b"route";
const DOMAIN_ROUTE_SET: &[u8] = b"route-set";

/// A 256-bit content hash, rendered as `sha256:<hex>`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Hashes a sequence of length-prefixed parts under `domain`.
    pub fn with_domain(domain: &[u8], parts: &[&[u8]]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(b"route-forge:");
        hasher.update(domain);
        hasher.update(b":v1");
        for part in parts {
            hasher.update((part.len() as u64).to_le_bytes());
            hasher.update(part);
        }
        Self(hasher.finalize().into())
    }

    /// Hash of a written artifact's exact bytes.
    pub fn of_artifact(bytes: &[u8]) -> Self {
        Self::with_domain(DOMAIN_ARTIFACT, &[bytes])
    }

    /// Hash of a raw model output as interpreted by `adapter`.
    pub fn of_raw_input(adapter: &str, bytes: &[u8]) -> Self {
        Self::with_domain(DOMAIN_RAW_INPUT, &[adapter.as_bytes(), bytes])
    }

    /// Hash of one route's canonical JSON encoding.
    pub fn of_route(route: &Route) -> Result<Self, Error> {
        let bytes = serde_json::to_vec(route)?;
        Ok(Self::with_domain(DOMAIN_ROUTE, &[&bytes]))
    }

    /// Hash of a whole route set. Independent of the order targets were
    /// inserted in and of the order routes appear within a target.
    pub fn of_route_set(set: &RouteSet) -> Result<Self, Error> {
        let mut parts: Vec<Vec<u8>> = Vec::with_capacity(set.route_count() + set.target_count());
        for (target_id, routes) in set.iter() {
            parts.push(target_id.as_bytes().to_vec());
            let mut ordered: Vec<&Route> = routes.iter().collect();
            ordered.sort_by_key(|r| r.rank);
            for route in ordered {
                parts.push(Self::of_route(route)?.0.to_vec());
            }
            parts.push(Vec::new());
        }
        let borrowed: Vec<&[u8]> = parts.iter().map(Vec::as_slice).collect();
        Ok(Self::with_domain(DOMAIN_ROUTE_SET, &borrowed))
    }

    pub fn of_file(path: &Path) -> Result<Self, Error> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::of_artifact(&bytes))
    }

    pub fn of_raw_file(adapter: &str, path: &Path) -> Result<Self, Error> {
        let bytes = fs::read(path).map_err(|e| Error::io(path, e))?;
        Ok(Self::of_raw_input(adapter, &bytes))
    }

    /// First 12 hex digits, for display.
    pub fn short(&self) -> String {
        self.to_hex()[..12].to_string()
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{PREFIX}{}", self.to_hex())
    }
}

impl fmt::Debug for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentHash({})", self.short())
    }
}

impl FromStr for ContentHash {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::InvalidHash(s.to_string());
        let digits = s.strip_prefix(PREFIX).ok_or_else(invalid)?;
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(digits, &mut bytes).map_err(|_| invalid())?;
        Ok(Self(bytes))
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}
