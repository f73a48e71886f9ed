//! Chess domain types, the rules-engine seam and its `shakmaty` backend.

mod rules;
mod standard;
mod types;

pub use rules::{IllegalMove, RulesEngine};
pub use standard::{ChessPosition, FenError, StandardChess};
pub use types::{DrawReason, GameStatus, Move, ParseNotationError, Piece, PieceKind, Side, Square};

/// Piece chosen when a manual move is ambiguous only by promotion.
pub const DEFAULT_PROMOTION: PieceKind = PieceKind::Queen;
