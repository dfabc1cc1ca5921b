/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A partial order over the simple paths into a sink.
//!
//! The relation is kept transitively closed at all times: every
//! assertion is followed by propagation to a fixed point. All entries
//! flipped by one assertion form a batch, and
//! [`PathPartialOrder::undo_last_assertion`] resets exactly one batch,
//! which is the backtracking primitive the searches are built on.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::fmt;

use path_algebra::NodeId;
use path_algebra::Path;
use serde::Deserialize;
use serde::Serialize;

/// How one path relates to another.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Related {
    LessThan,
    EqualTo,
    GreaterThan,
    Unknown,
}

impl Related {
    /// The relation seen from the other side.
    pub fn dual(self) -> Self {
        match self {
            Related::LessThan => Related::GreaterThan,
            Related::GreaterThan => Related::LessThan,
            other => other,
        }
    }

    pub fn is_known(self) -> bool {
        self != Related::Unknown
    }
}

impl fmt::Display for Related {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Related::LessThan => "<",
            Related::EqualTo => "=",
            Related::GreaterThan => ">",
            Related::Unknown => "?",
        };
        write!(f, "{}", s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OrderError {
    #[error("{p} and {q} are already ordered")]
    AlreadyOrdered { p: Path, q: Path },

    #[error("{0} is not one of the ordered paths")]
    UnknownPath(Path),

    #[error("no assertion to undo")]
    NothingToUndo,
}

type Pair = (usize, usize);

/// Pairwise relation over a fixed set of paths.
///
/// Entry `[i][j]` says how path `i` relates to path `j`; entries
/// `[i][j]` and `[j][i]` are always duals. Proper suffixes are seeded
/// below the paths that continue into them and can never be retracted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PathPartialOrder {
    paths: Vec<Path>,
    indices: HashMap<Path, usize>,
    by_source: BTreeMap<NodeId, Vec<usize>>,
    relation: Vec<Vec<Related>>,
    batches: Vec<Vec<Pair>>,
}

impl PathPartialOrder {
    /// Build the order over `paths`, seeding suffixes. Duplicates and
    /// empty paths are ignored.
    pub fn new(paths: impl IntoIterator<Item = Path>) -> Self {
        let mut unique = Vec::new();
        let mut indices = HashMap::new();
        for p in paths {
            if !p.is_empty() && !indices.contains_key(&p) {
                indices.insert(p.clone(), unique.len());
                unique.push(p);
            }
        }

        let n = unique.len();
        let mut by_source: BTreeMap<NodeId, Vec<usize>> = BTreeMap::new();
        for (i, p) in unique.iter().enumerate() {
            if let Some(source) = p.first() {
                by_source.entry(source).or_default().push(i);
            }
        }

        let mut relation = vec![vec![Related::Unknown; n]; n];
        for (i, row) in relation.iter_mut().enumerate() {
            row[i] = Related::EqualTo;
        }

        let mut order = Self {
            paths: unique,
            indices,
            by_source,
            relation,
            batches: Vec::new(),
        };

        let mut seeds = Vec::new();
        for (pi, p) in order.paths.iter().enumerate() {
            for start in 1..p.len() {
                if let Some(&qi) = order.indices.get(&p.suffix(start)) {
                    seeds.push((qi, pi));
                }
            }
        }
        let mut flipped = Vec::new();
        for (qi, pi) in seeds {
            if !order.relation[qi][pi].is_known() {
                order.set(qi, pi, &mut flipped);
            }
        }
        // Seeds are permanent: close them but do not record a batch.
        order.propagate(flipped);
        order
    }

    pub fn paths(&self) -> &[Path] {
        &self.paths
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Sources with at least one path, ascending.
    pub fn sources(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.by_source.keys().copied()
    }

    /// Paths starting at `source`, in construction order.
    pub fn paths_from(&self, source: NodeId) -> Vec<&Path> {
        self.by_source
            .get(&source)
            .map(|ix| ix.iter().map(|&i| &self.paths[i]).collect())
            .unwrap_or_default()
    }

    pub fn index_of(&self, p: &Path) -> Result<usize, OrderError> {
        self.indices
            .get(p)
            .copied()
            .ok_or_else(|| OrderError::UnknownPath(p.clone()))
    }

    pub fn contains(&self, p: &Path) -> bool {
        self.indices.contains_key(p)
    }

    /// How `p` relates to `q`.
    pub fn relation(&self, p: &Path, q: &Path) -> Result<Related, OrderError> {
        Ok(self.relation[self.index_of(p)?][self.index_of(q)?])
    }

    /// Assert `p < q` and propagate its consequences as one batch.
    pub fn assert_order(&mut self, p: &Path, q: &Path) -> Result<(), OrderError> {
        let (pi, qi) = (self.index_of(p)?, self.index_of(q)?);
        if pi == qi || self.relation[pi][qi].is_known() {
            return Err(OrderError::AlreadyOrdered {
                p: p.clone(),
                q: q.clone(),
            });
        }
        let mut flipped = Vec::new();
        self.set(pi, qi, &mut flipped);
        let batch = self.propagate(flipped);
        tracing::trace!(%p, %q, flipped = batch.len(), "asserted order");
        self.batches.push(batch);
        Ok(())
    }

    /// Reset every entry flipped by the most recent assertion.
    pub fn undo_last_assertion(&mut self) -> Result<(), OrderError> {
        let batch = self.batches.pop().ok_or(OrderError::NothingToUndo)?;
        for (pi, qi) in batch {
            self.relation[pi][qi] = Related::Unknown;
            self.relation[qi][pi] = Related::Unknown;
        }
        Ok(())
    }

    fn set(&mut self, pi: usize, qi: usize, flipped: &mut Vec<Pair>) {
        self.relation[pi][qi] = Related::LessThan;
        self.relation[qi][pi] = Related::GreaterThan;
        flipped.push((pi, qi));
    }

    /// Close the relation over the pairs in `pending`, returning them
    /// together with every pair flipped on the way.
    fn propagate(&mut self, pending: Vec<Pair>) -> Vec<Pair> {
        let mut flipped = pending.clone();
        let mut worklist = pending;
        while let Some((pi, qi)) = worklist.pop() {
            for r in 0..self.paths.len() {
                if r == pi || r == qi {
                    continue;
                }
                // r < p < q
                if self.relation[r][pi] == Related::LessThan
                    && self.relation[r][qi] == Related::Unknown
                {
                    self.set(r, qi, &mut flipped);
                    worklist.push((r, qi));
                }
                // p < q < r
                if self.relation[qi][r] == Related::LessThan
                    && self.relation[pi][r] == Related::Unknown
                {
                    self.set(pi, r, &mut flipped);
                    worklist.push((pi, r));
                }
            }
        }
        flipped
    }

    /// Whether every pair of paths is ordered.
    pub fn is_total(&self) -> bool {
        self.relation
            .iter()
            .all(|row| row.iter().all(|r| r.is_known()))
    }

    /// The first unordered pair of paths sharing a source.
    pub fn next_unknown(&self) -> Option<(&Path, &Path)> {
        for ix in self.by_source.values() {
            for (a, &pi) in ix.iter().enumerate() {
                for &qi in &ix[a + 1..] {
                    if self.relation[pi][qi] == Related::Unknown {
                        return Some((&self.paths[pi], &self.paths[qi]));
                    }
                }
            }
        }
        None
    }

    /// The explicitly asserted pair of each batch, oldest first.
    pub fn assertions(&self) -> Vec<(Path, Path)> {
        self.batches
            .iter()
            .filter_map(|batch| batch.first())
            .map(|&(pi, qi)| (self.paths[pi].clone(), self.paths[qi].clone()))
            .collect()
    }

    /// Number of undoable batches.
    pub fn depth(&self) -> usize {
        self.batches.len()
    }

    /// Paths from `source`, ascending by the number of paths from
    /// `source` known to be below them, then by path.
    pub fn source_ordering(&self, source: NodeId) -> Vec<&Path> {
        let Some(ix) = self.by_source.get(&source) else {
            return Vec::new();
        };
        let mut keyed: Vec<(usize, &Path)> = ix
            .iter()
            .map(|&pi| {
                let height = ix
                    .iter()
                    .filter(|&&qi| self.relation[pi][qi] == Related::GreaterThan)
                    .count();
                (height, &self.paths[pi])
            })
            .collect();
        keyed.sort();
        keyed.into_iter().map(|(_, p)| p).collect()
    }
}

impl fmt::Display for PathPartialOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for source in self.sources() {
            let chain: Vec<String> = self
                .source_ordering(source)
                .into_iter()
                .map(|p| p.to_string())
                .collect();
            writeln!(f, "{}: {}", source, chain.join(" < "))?;
        }
        Ok(())
    }
}
