//! Release diff: provider releases minus already-recorded seen keys.

use std::collections::HashSet;

use castwatch_core::release::{Release, SeenKey};

/// The releases whose [`SeenKey`] is not in `seen`, in input order.
pub fn new_releases<'a>(releases: &'a [Release], seen: &HashSet<SeenKey>) -> Vec<&'a Release> {
  releases
    .iter()
    .filter(|r| !seen.contains(&r.seen_key()))
    .collect()
}
