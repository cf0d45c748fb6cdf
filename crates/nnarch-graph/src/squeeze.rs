// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Dense renumbering of reduced entries.

use std::collections::HashMap;

use thiserror::Error;
use tracing::instrument;

use crate::flatten::ReducedEntry;
use crate::ident::NodeId;

/// Error returned by [`squeeze_ids`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SqueezeError {
    /// An entry references a node that has not been renumbered yet.
    #[error("entry {entry} references {reference}, which is not an earlier entry")]
    ForwardReference {
        /// Original id of the referencing entry.
        entry: NodeId,
        /// Original id it references.
        reference: NodeId,
    },
}

/// Renumbers entries to `0..N` in their current order and rewrites every reference.
///
/// An entry may only reference entries that precede it; a self-reference is a
/// forward reference too.
#[instrument(skip_all, fields(entries = entries.len()))]
pub fn squeeze_ids(entries: Vec<ReducedEntry>) -> Result<Vec<ReducedEntry>, SqueezeError> {
    let mut old_to_new: HashMap<NodeId, NodeId> = HashMap::with_capacity(entries.len());
    let mut next: NodeId = 0;
    let mut squeezed = Vec::with_capacity(entries.len());

    for mut entry in entries {
        for reference in &mut entry.from {
            *reference = *old_to_new
                .get(reference)
                .ok_or(SqueezeError::ForwardReference {
                    entry: entry.id,
                    reference: *reference,
                })?;
        }
        old_to_new.insert(entry.id, next);
        entry.id = next;
        next += 1;
        squeezed.push(entry);
    }
    Ok(squeezed)
}
