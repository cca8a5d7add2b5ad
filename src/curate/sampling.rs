use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::model::Route;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown sampling strategy: '{0}' (use top-k, random-k or by-length)")]
pub struct ParseStrategyError(String);

/// How to reduce a deduplicated route list to at most `k` routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SamplingStrategy {
    /// The `k` best-ranked routes.
    TopK,
    /// `k` routes chosen by a seeded, content-derived ordering.
    RandomK,
    /// Round-robin over route depth, shortest first.
    ByLength,
}

impl fmt::Display for SamplingStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SamplingStrategy::TopK => write!(f, "top-k"),
            SamplingStrategy::RandomK => write!(f, "random-k"),
            SamplingStrategy::ByLength => write!(f, "by-length"),
        }
    }
}

impl FromStr for SamplingStrategy {
    type Err = ParseStrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "top-k" | "topk" => Ok(SamplingStrategy::TopK),
            "random-k" | "randomk" | "random" => Ok(SamplingStrategy::RandomK),
            "by-length" | "length" => Ok(SamplingStrategy::ByLength),
            _ => Err(ParseStrategyError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub strategy: SamplingStrategy,
    pub k: usize,
    /// Only consulted by [`SamplingStrategy::RandomK`].
    #[serde(default)]
    pub seed: u64,
}

impl SamplingConfig {
    pub fn new(strategy: SamplingStrategy, k: usize) -> Self {
        Self {
            strategy,
            k,
            seed: 0,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Keeps at most `config.k` routes. The survivors are returned in rank order
/// with their ranks untouched.
pub fn sample(routes: Vec<Route>, config: &SamplingConfig) -> Vec<Route> {
    let k = config.k;
    if routes.len() <= k {
        return routes;
    }

    let mut kept = match config.strategy {
        SamplingStrategy::TopK => {
            let mut routes = routes;
            routes.sort_by_key(|r| r.rank);
            routes.truncate(k);
            routes
        }
        SamplingStrategy::RandomK => {
            let mut keyed: Vec<([u8; 32], Route)> = routes
                .into_iter()
                .map(|r| (shuffle_key(config.seed, &r), r))
                .collect();
            keyed.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.rank.cmp(&b.1.rank)));
            keyed.into_iter().take(k).map(|(_, r)| r).collect()
        }
        SamplingStrategy::ByLength => round_robin_by_depth(routes, k),
    };
    kept.sort_by_key(|r| r.rank);
    kept
}

fn shuffle_key(seed: u64, route: &Route) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(seed.to_le_bytes());
    hasher.update((route.rank as u64).to_le_bytes());
    hasher.update(route.signature().as_bytes());
    hasher.finalize().into()
}

fn round_robin_by_depth(routes: Vec<Route>, k: usize) -> Vec<Route> {
    let mut by_depth: BTreeMap<usize, VecDeque<Route>> = BTreeMap::new();
    for route in routes {
        by_depth.entry(route.depth()).or_default().push_back(route);
    }
    for bucket in by_depth.values_mut() {
        bucket.make_contiguous().sort_by_key(|r| r.rank);
    }

    let mut kept = Vec::with_capacity(k);
    while kept.len() < k {
        let before = kept.len();
        for bucket in by_depth.values_mut() {
            if kept.len() == k {
                break;
            }
            if let Some(route) = bucket.pop_front() {
                kept.push(route);
            }
        }
        if kept.len() == before {
            break;
        }
    }
    kept
}
