// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

/// Node identifier.
///
/// Before renumbering this is the editor's `order` value; after
/// [`squeeze_ids`](crate::squeeze_ids) it is the dense position in the
/// architecture.
pub type NodeId = u64;

/// Opaque link identifier joining one producer output to one consumer input.
pub type LinkId = u64;
