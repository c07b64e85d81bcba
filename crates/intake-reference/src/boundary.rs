//! Boundary layers keyed by (region, stratum).

use std::collections::BTreeMap;

use crate::geometry::Boundary;

/// Normalized lookup key: trimmed, lowercased region and stratum.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BoundaryKey {
    pub region: String,
    pub stratum: String,
}

impl BoundaryKey {
    pub fn new(region: &str, stratum: &str) -> Self {
        Self {
            region: normalize(region),
            stratum: normalize(stratum),
        }
    }
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Stratum name variants mapped to the name used in the boundary layer
/// (for example `Bay` to `Bays`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StratumAliases {
    map: BTreeMap<String, String>,
}

impl StratumAliases {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_alias(mut self, variant: &str, canonical: &str) -> Self {
        self.insert(variant, canonical);
        self
    }

    pub fn insert(&mut self, variant: &str, canonical: &str) {
        self.map.insert(normalize(variant), normalize(canonical));
    }

    /// Canonical form of `stratum`; unknown names map to themselves.
    pub fn resolve(&self, stratum: &str) -> String {
        let key = normalize(stratum);
        self.map.get(&key).cloned().unwrap_or(key)
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: AsRef<str>, V: AsRef<str>> FromIterator<(K, V)> for StratumAliases {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut aliases = Self::new();
        for (variant, canonical) in iter {
            aliases.insert(variant.as_ref(), canonical.as_ref());
        }
        aliases
    }
}

/// Immutable map from (region, stratum) to a boundary.
///
/// Aliases apply to layer keys when the lookup is built and to every query,
/// so a variant spelling on either side lands on the same entry.
#[derive(Debug, Clone, Default)]
pub struct BoundaryLookup {
    layers: BTreeMap<BoundaryKey, Boundary>,
    aliases: StratumAliases,
}

impl BoundaryLookup {
    pub fn new<I>(layers: I, aliases: StratumAliases) -> Self
    where
        I: IntoIterator<Item = (String, String, Boundary)>,
    {
        let mut merged: BTreeMap<BoundaryKey, Boundary> = BTreeMap::new();
        for (region, stratum, boundary) in layers {
            let key = BoundaryKey::new(&region, &aliases.resolve(&stratum));
            let entry = merged.entry(key).or_default();
            for polygon in boundary.polygons() {
                entry.push(polygon.clone());
            }
        }
        tracing::debug!(boundaries = merged.len(), "built boundary lookup");
        Self {
            layers: merged,
            aliases,
        }
    }

    pub fn get(&self, region: &str, stratum: &str) -> Option<&Boundary> {
        let key = BoundaryKey::new(region, &self.aliases.resolve(stratum));
        self.layers.get(&key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &BoundaryKey> {
        self.layers.keys()
    }

    pub fn len(&self) -> usize {
        self.layers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}
