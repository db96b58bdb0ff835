//! Transitive partitioning of records under a pairwise match predicate.
//!
//! Records are the nodes of an implicit graph with an edge wherever
//! `is_match(a, b)` holds. [`find_partitions`] returns the connected
//! components of that graph as a dense id per record, without materializing
//! the edge set.
//!
//! # Component discovery
//!
//! The lowest unassigned position seeds a component. Growth is a depth-first
//! flood fill driven by an explicit frontier of [`Cursor`]s: the top cursor
//! scans the still-unassigned positions in order, asking
//! `is_match(origin, candidate)`. A matching candidate joins the component,
//! leaves the pool, and becomes the new top cursor, so expansion continues from
//! the newest member before older origins resume. The predicate need not be
//! transitive; the closure is a property of the fill.
//!
//! Components get sequential ids in discovery order.
//!
//! # Size cap
//!
//! With `max_size`, growth stops as soon as the component holds that many
//! members. Remaining matches are left for later components, so one true
//! cluster may be split across several ids.
//!
//! # Blocking
//!
//! [`find_partitions_blocked`] first groups records by an exact key and only
//! compares records within a group. Groups are solved in ascending key order
//! and each group's ids are shifted past every id already handed out, so the
//! numbering stays dense and reproducible.

#![allow(clippy::module_name_repetitions)]

use std::collections::{BTreeMap, BTreeSet};
use std::convert::Infallible;

use tracing::{debug, instrument};

/// Partition id per record position, dense in `0..partition_count()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partitions {
    ids: Vec<usize>,
    count: usize,
    comparisons: u64,
}

impl Partitions {
    /// Number of records covered.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Number of distinct partitions.
    #[must_use]
    pub const fn partition_count(&self) -> usize {
        self.count
    }

    /// How many times the match predicate was evaluated.
    #[must_use]
    pub const fn comparisons(&self) -> u64 {
        self.comparisons
    }

    /// Partition id of the record at `position`.
    #[must_use]
    pub fn partition_of(&self, position: usize) -> Option<usize> {
        self.ids.get(position).copied()
    }

    /// Partition ids indexed by record position.
    #[must_use]
    pub fn as_slice(&self) -> &[usize] {
        &self.ids
    }

    /// `(position, partition id)` pairs in record order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.ids.iter().copied().enumerate()
    }

    /// Record positions per partition id, each group in ascending order.
    #[must_use]
    pub fn groups(&self) -> Vec<Vec<usize>> {
        let mut groups = vec![Vec::new(); self.count];
        for (position, id) in self.iter() {
            groups[id].push(position);
        }
        groups
    }

    /// `(id, positions)` for every partition with more than one member, in
    /// partition id order.
    #[must_use]
    pub fn duplicate_groups(&self) -> Vec<(usize, Vec<usize>)> {
        self.groups()
            .into_iter()
            .enumerate()
            .filter(|(_, members)| members.len() > 1)
            .collect()
    }

    /// Project the assignment onto caller-chosen record identities.
    ///
    /// `records` must be the slice the partitions were computed from. When two
    /// records share a key, the later record's id wins.
    pub fn keyed<R, K, F>(&self, records: &[R], mut key: F) -> BTreeMap<K, usize>
    where
        K: Ord,
        F: FnMut(&R) -> K,
    {
        records
            .iter()
            .zip(self.ids.iter().copied())
            .map(|(record, id)| (key(record), id))
            .collect()
    }
}

/// Partition `records` into transitively matching components.
///
/// `max_size` caps the member count of any one component; `Some(0)` is
/// treated as `Some(1)`.
pub fn find_partitions<R, M>(records: &[R], mut is_match: M, max_size: Option<usize>) -> Partitions
where
    M: FnMut(&R, &R) -> bool,
{
    match try_find_partitions(records, |a, b| Ok::<_, Infallible>(is_match(a, b)), max_size) {
        Ok(partitions) => partitions,
        Err(never) => match never {},
    }
}

/// [`find_partitions`] restricted to records sharing the same `block_by` key.
pub fn find_partitions_blocked<R, K, M, B>(
    records: &[R],
    mut is_match: M,
    max_size: Option<usize>,
    block_by: B,
) -> Partitions
where
    K: Ord,
    M: FnMut(&R, &R) -> bool,
    B: FnMut(&R) -> K,
{
    let outcome = try_find_partitions_blocked(
        records,
        |a, b| Ok::<_, Infallible>(is_match(a, b)),
        max_size,
        block_by,
    );
    match outcome {
        Ok(partitions) => partitions,
        Err(never) => match never {},
    }
}

/// Fallible [`find_partitions`].
///
/// # Errors
///
/// The first error returned by `is_match`, unmodified. No partial result is
/// produced.
#[instrument(skip_all, fields(records = records.len()))]
pub fn try_find_partitions<R, E, M>(
    records: &[R],
    mut is_match: M,
    max_size: Option<usize>,
) -> Result<Partitions, E>
where
    M: FnMut(&R, &R) -> Result<bool, E>,
{
    let positions: Vec<usize> = (0..records.len()).collect();
    let mut assembler = Assembler::new(records.len());
    let block = solve_block(records, &positions, &mut is_match, cap(max_size))?;
    assembler.append(block);
    Ok(assembler.finish())
}

/// Fallible [`find_partitions_blocked`].
///
/// # Errors
///
/// The first error returned by `is_match`, unmodified.
#[instrument(skip_all, fields(records = records.len()))]
pub fn try_find_partitions_blocked<R, K, E, M, B>(
    records: &[R],
    mut is_match: M,
    max_size: Option<usize>,
    mut block_by: B,
) -> Result<Partitions, E>
where
    K: Ord,
    M: FnMut(&R, &R) -> Result<bool, E>,
    B: FnMut(&R) -> K,
{
    let mut blocks: BTreeMap<K, Vec<usize>> = BTreeMap::new();
    for (position, record) in records.iter().enumerate() {
        blocks.entry(block_by(record)).or_default().push(position);
    }
    debug!(blocks = blocks.len(), "grouped records into blocks");

    let cap = cap(max_size);
    let mut assembler = Assembler::new(records.len());
    for members in blocks.values() {
        let block = solve_block(records, members, &mut is_match, cap)?;
        assembler.append(block);
    }
    Ok(assembler.finish())
}

const fn cap(max_size: Option<usize>) -> Option<usize> {
    match max_size {
        Some(0) => Some(1),
        other => other,
    }
}

/// Local result of one block: components as global record positions.
struct BlockResult {
    components: Vec<Vec<usize>>,
    comparisons: u64,
}

/// Stitches block results into one dense global numbering.
struct Assembler {
    ids: Vec<usize>,
    next_id: usize,
    comparisons: u64,
}

impl Assembler {
    fn new(len: usize) -> Self {
        Self {
            ids: vec![0; len],
            next_id: 0,
            comparisons: 0,
        }
    }

    /// Shift the block's local ids by one past the highest id used so far.
    fn append(&mut self, block: BlockResult) {
        let offset = self.next_id;
        for (local_id, component) in block.components.iter().enumerate() {
            for &position in component {
                self.ids[position] = offset + local_id;
            }
        }
        self.next_id = offset + block.components.len();
        self.comparisons += block.comparisons;
    }

    fn finish(self) -> Partitions {
        debug!(
            partitions = self.next_id,
            comparisons = self.comparisons,
            "partitioned records"
        );
        Partitions {
            ids: self.ids,
            count: self.next_id,
            comparisons: self.comparisons,
        }
    }
}

/// A frontier entry: `origin` has been compared against every unassigned slot
/// below `next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    pub origin: usize,
    pub next: usize,
}

impl Cursor {
    #[must_use]
    pub const fn new(origin: usize) -> Self {
        Self { origin, next: 0 }
    }
}

/// Outcome of one [`grow_component`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Growth {
    /// Component members in join order.
    pub members: Vec<usize>,
    /// Cursors still holding unscanned candidates. Empty unless growth was
    /// stopped by the size cap.
    pub frontier: Vec<Cursor>,
    pub comparisons: u64,
}

/// Grow a component by depth-first flood fill over slots `0..len`.
///
/// `unassigned` is the pool of slots not yet in any component; members leave
/// it as they join. `members` must already hold the origins of `frontier`.
/// `is_match(origin, candidate)` is called with slot numbers.
///
/// # Errors
///
/// The first error returned by `is_match`.
pub fn grow_component<E, M>(
    mut members: Vec<usize>,
    mut frontier: Vec<Cursor>,
    unassigned: &mut BTreeSet<usize>,
    is_match: &mut M,
    max_size: Option<usize>,
) -> Result<Growth, E>
where
    M: FnMut(usize, usize) -> Result<bool, E>,
{
    let mut comparisons = 0;
    let full = |members: &[usize]| max_size.is_some_and(|max| members.len() >= max);

    while !full(&members) {
        let Some(cursor) = frontier.last_mut() else {
            break;
        };
        let Some(&candidate) = unassigned.range(cursor.next..).next() else {
            frontier.pop();
            continue;
        };
        cursor.next = candidate + 1;
        let origin = cursor.origin;

        comparisons += 1;
        if is_match(origin, candidate)? {
            unassigned.remove(&candidate);
            members.push(candidate);
            frontier.push(Cursor::new(candidate));
        }
    }

    Ok(Growth {
        members,
        frontier,
        comparisons,
    })
}

fn solve_block<R, E, M>(
    records: &[R],
    members: &[usize],
    is_match: &mut M,
    max_size: Option<usize>,
) -> Result<BlockResult, E>
where
    M: FnMut(&R, &R) -> Result<bool, E>,
{
    let mut unassigned: BTreeSet<usize> = (0..members.len()).collect();
    let mut compare = |a: usize, b: usize| is_match(&records[members[a]], &records[members[b]]);
    let mut components = Vec::new();
    let mut comparisons = 0;

    while let Some(seed) = unassigned.pop_first() {
        let growth = grow_component(
            vec![seed],
            vec![Cursor::new(seed)],
            &mut unassigned,
            &mut compare,
            max_size,
        )?;
        comparisons += growth.comparisons;
        components.push(growth.members.into_iter().map(|slot| members[slot]).collect());
    }

    Ok(BlockResult {
        components,
        comparisons,
    })
}
