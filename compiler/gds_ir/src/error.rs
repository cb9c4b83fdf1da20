use gds_lexer_core::LiteralError;

use crate::{LeafKind, NodeKind, Slot, TokenId};

/// Misuse of the direct tree-building API.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("`{text}` is not valid text for a {kind:?} token")]
    InvalidLiteral {
        kind: LeafKind,
        text: String,
        #[source]
        source: Option<LiteralError>,
    },
    #[error("token {0:?} is a leaf, not a node")]
    NotANode(TokenId),
    #[error("{kind:?} has no `{slot}` slot")]
    UnknownSlot { kind: NodeKind, slot: Slot },
    #[error("{0:?} does not hold list items")]
    NoItems(NodeKind),
    #[error("slot `{slot}` of {node:?} is already filled")]
    SlotOccupied { node: TokenId, slot: Slot },
    #[error("token {0:?} is not attached to a parent")]
    Detached(TokenId),
    #[error("attaching {token:?} under {node:?} would make a token its own ancestor")]
    Cycle { node: TokenId, token: TokenId },
}
