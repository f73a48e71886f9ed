//! Standard chess rules backed by `shakmaty`.

use super::rules::{IllegalMove, RulesEngine};
use super::types::{DrawReason, GameStatus, Move, Piece, PieceKind, Side, Square};
use derive_more::{Display, Error};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use shakmaty::fen::Fen;
use shakmaty::san::{San, SanPlus};
use shakmaty::uci::UciMove;
use shakmaty::{CastlingMode, Chess, Color, EnPassantMode, File, Position, Role};
use tracing::{debug, instrument, trace};

/// Error loading a position from FEN.
#[derive(Debug, Clone, Display, Error)]
#[display("FEN error: {} at {}:{}", message, file, line)]
pub struct FenError {
    /// Error message.
    pub message: String,
    /// Line number where error occurred.
    pub line: u32,
    /// Source file where error occurred.
    pub file: &'static str,
}

impl FenError {
    /// Creates a new FEN error.
    #[track_caller]
    #[instrument(skip(message))]
    pub fn new(message: impl Into<String>) -> Self {
        let loc = std::panic::Location::caller();
        Self {
            message: message.into(),
            line: loc.line(),
            file: loc.file(),
        }
    }
}

/// An immutable chess position.
///
/// Carries its FEN alongside the `shakmaty` board; equality and
/// serialization both go through the FEN.
#[derive(Debug, Clone)]
pub struct ChessPosition {
    inner: Chess,
    fen: String,
}

impl ChessPosition {
    fn wrap(inner: Chess) -> Self {
        let fen = Fen::from_position(inner.clone(), EnPassantMode::Legal).to_string();
        Self { inner, fen }
    }

    /// The standard starting position.
    pub fn initial() -> Self {
        Self::wrap(Chess::default())
    }

    /// Parses a position from FEN.
    #[instrument]
    pub fn from_fen(fen: &str) -> Result<Self, FenError> {
        let parsed: Fen = fen
            .trim()
            .parse()
            .map_err(|e| FenError::new(format!("Invalid FEN '{}': {}", fen, e)))?;
        let inner: Chess = parsed
            .into_position(CastlingMode::Standard)
            .map_err(|e| FenError::new(format!("Illegal position '{}': {}", fen, e)))?;
        Ok(Self::wrap(inner))
    }

    /// FEN of this position.
    pub fn fen(&self) -> &str {
        &self.fen
    }

    fn chess(&self) -> &Chess {
        &self.inner
    }
}

impl Default for ChessPosition {
    fn default() -> Self {
        Self::initial()
    }
}

impl PartialEq for ChessPosition {
    fn eq(&self, other: &Self) -> bool {
        self.fen == other.fen
    }
}

impl Eq for ChessPosition {}

impl std::fmt::Display for ChessPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.fen)
    }
}

impl Serialize for ChessPosition {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.fen)
    }
}

impl<'de> Deserialize<'de> for ChessPosition {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let fen = String::deserialize(deserializer)?;
        ChessPosition::from_fen(&fen).map_err(serde::de::Error::custom)
    }
}

// ─────────────────────────────────────────────────────────────
//  Conversions between shakmaty and domain types
// ─────────────────────────────────────────────────────────────

fn side_from_color(color: Color) -> Side {
    match color {
        Color::White => Side::First,
        Color::Black => Side::Second,
    }
}

fn kind_from_role(role: Role) -> PieceKind {
    match role {
        Role::Pawn => PieceKind::Pawn,
        Role::Knight => PieceKind::Knight,
        Role::Bishop => PieceKind::Bishop,
        Role::Rook => PieceKind::Rook,
        Role::Queen => PieceKind::Queen,
        Role::King => PieceKind::King,
    }
}

// Both square types print and parse as "e4".
fn square_from_shakmaty(square: shakmaty::Square) -> Option<Square> {
    square.to_string().parse().ok()
}

fn square_to_shakmaty(square: Square) -> Option<shakmaty::Square> {
    square.to_string().parse().ok()
}

/// Domain view of a `shakmaty` move; drops are not chess moves.
fn move_from_shakmaty(m: &shakmaty::Move) -> Option<Move> {
    match m {
        shakmaty::Move::Normal {
            from,
            to,
            promotion,
            ..
        } => Some(Move {
            from: square_from_shakmaty(*from)?,
            to: square_from_shakmaty(*to)?,
            promotion: promotion.map(kind_from_role),
        }),
        shakmaty::Move::EnPassant { from, to } => Some(Move::new(
            square_from_shakmaty(*from)?,
            square_from_shakmaty(*to)?,
        )),
        shakmaty::Move::Castle { king, rook } => {
            let king_dest = if rook.file() == File::H {
                shakmaty::Square::from_coords(File::G, rook.rank())
            } else {
                shakmaty::Square::from_coords(File::C, rook.rank())
            };
            Some(Move::new(
                square_from_shakmaty(*king)?,
                square_from_shakmaty(king_dest)?,
            ))
        }
        shakmaty::Move::Put { .. } => None,
    }
}

/// Standard chess, the engine behind every interactive session.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardChess;

impl StandardChess {
    /// Creates the engine.
    pub fn new() -> Self {
        Self
    }

    fn find_legal(&self, position: &ChessPosition, mv: &Move) -> Option<shakmaty::Move> {
        position
            .chess()
            .legal_moves()
            .into_iter()
            .find(|m| move_from_shakmaty(m).as_ref() == Some(mv))
    }
}

impl RulesEngine for StandardChess {
    type Position = ChessPosition;

    fn initial_position(&self) -> ChessPosition {
        ChessPosition::initial()
    }

    #[instrument(skip(self, position), fields(fen = %position.fen))]
    fn legal_moves(&self, position: &ChessPosition, origin: Option<Square>) -> Vec<Move> {
        let moves: Vec<Move> = position
            .chess()
            .legal_moves()
            .iter()
            .filter_map(move_from_shakmaty)
            .filter(|m| origin.is_none_or(|o| m.from == o))
            .collect();
        trace!(count = moves.len(), "Generated legal moves");
        moves
    }

    #[instrument(skip(self, position, mv), fields(fen = %position.fen, mv = %mv))]
    fn apply(
        &self,
        position: &ChessPosition,
        mv: &Move,
    ) -> Result<(ChessPosition, String), IllegalMove> {
        let legal = self
            .find_legal(position, mv)
            .ok_or(IllegalMove { attempted: *mv })?;

        let san = San::from_move(position.chess(), &legal);
        let next = position
            .chess()
            .clone()
            .play(&legal)
            .map_err(|_| IllegalMove { attempted: *mv })?;

        let suffix = if next.is_checkmate() {
            "#"
        } else if next.is_check() {
            "+"
        } else {
            ""
        };
        let notation = format!("{}{}", san, suffix);
        debug!(notation = %notation, "Move applied");

        Ok((ChessPosition::wrap(next), notation))
    }

    fn status(&self, position: &ChessPosition) -> GameStatus {
        let chess = position.chess();
        if chess.is_checkmate() {
            GameStatus::Checkmate(side_from_color(chess.turn()).opponent())
        } else if chess.is_stalemate() {
            GameStatus::Draw(DrawReason::Stalemate)
        } else if chess.is_insufficient_material() {
            GameStatus::Draw(DrawReason::InsufficientMaterial)
        } else if chess.halfmoves() >= 100 {
            GameStatus::Draw(DrawReason::FiftyMoveRule)
        } else {
            GameStatus::InProgress
        }
    }

    fn turn_to_move(&self, position: &ChessPosition) -> Side {
        side_from_color(position.chess().turn())
    }

    fn is_in_check(&self, position: &ChessPosition) -> bool {
        position.chess().is_check()
    }

    fn piece_at(&self, position: &ChessPosition, square: Square) -> Option<Piece> {
        let sq = square_to_shakmaty(square)?;
        position
            .chess()
            .board()
            .piece_at(sq)
            .map(|p| Piece::new(side_from_color(p.color), kind_from_role(p.role)))
    }

    /// Accepts coordinate notation (`e2e4`, `e7e8q`) and SAN (`e4`, `Nf3+`).
    #[instrument(skip(self, position), fields(fen = %position.fen))]
    fn parse_move(&self, position: &ChessPosition, text: &str) -> Option<Move> {
        let text = text.trim();
        let chess = position.chess();

        let resolved = UciMove::from_ascii(text.as_bytes())
            .ok()
            .and_then(|uci| uci.to_move(chess).ok())
            .or_else(|| {
                text.parse::<SanPlus>()
                    .ok()
                    .and_then(|san| san.san.to_move(chess).ok())
            });

        match resolved.as_ref().and_then(move_from_shakmaty) {
            Some(mv) => Some(mv),
            None => {
                debug!(text, "Text does not name a legal move");
                None
            }
        }
    }

    fn repetition_key(&self, position: &ChessPosition) -> Option<String> {
        // Placement, turn, castling rights, en passant square.
        Some(
            position
                .fen
                .split_whitespace()
                .take(4)
                .collect::<Vec<_>>()
                .join(" "),
        )
    }
}
