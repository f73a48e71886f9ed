//! Core domain types shared by the rules engine and the session.

use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::instrument;

/// One of the two players.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::EnumIter,
    strum::EnumString,
    strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Side {
    /// First player (white, moves first).
    #[strum(to_string = "white", serialize = "first")]
    #[serde(alias = "white")]
    First,
    /// Second player (black).
    #[strum(to_string = "black", serialize = "second")]
    #[serde(alias = "black")]
    Second,
}

impl Side {
    /// Returns the opponent side.
    pub fn opponent(self) -> Self {
        match self {
            Side::First => Side::Second,
            Side::Second => Side::First,
        }
    }

    /// Returns the display label ("White" / "Black").
    pub fn label(self) -> &'static str {
        match self {
            Side::First => "White",
            Side::Second => "Black",
        }
    }
}

/// Kind of chess piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum PieceKind {
    /// Pawn.
    Pawn,
    /// Knight.
    Knight,
    /// Bishop.
    Bishop,
    /// Rook.
    Rook,
    /// Queen.
    Queen,
    /// King.
    King,
}

impl PieceKind {
    /// Lowercase letter used in coordinate notation (`p`, `n`, ...).
    pub fn letter(self) -> char {
        match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        }
    }

    /// Parses a coordinate-notation letter, case-insensitive.
    pub fn from_letter(c: char) -> Option<Self> {
        match c.to_ascii_lowercase() {
            'p' => Some(PieceKind::Pawn),
            'n' => Some(PieceKind::Knight),
            'b' => Some(PieceKind::Bishop),
            'r' => Some(PieceKind::Rook),
            'q' => Some(PieceKind::Queen),
            'k' => Some(PieceKind::King),
            _ => None,
        }
    }
}

/// A piece standing on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_new::new)]
pub struct Piece {
    /// Owner of the piece.
    pub side: Side,
    /// What the piece is.
    pub kind: PieceKind,
}

impl Piece {
    /// FEN-style character: uppercase for white, lowercase for black.
    pub fn symbol(self) -> char {
        let c = self.kind.letter();
        match self.side {
            Side::First => c.to_ascii_uppercase(),
            Side::Second => c,
        }
    }
}

/// A square on the 8x8 board.
///
/// Indexed 0..64 with a1 = 0, b1 = 1, ..., h8 = 63.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Square(u8);

impl Square {
    /// Creates a square from file (0 = a) and rank (0 = rank 1).
    pub fn from_coords(file: u8, rank: u8) -> Option<Self> {
        (file < 8 && rank < 8).then_some(Square(rank * 8 + file))
    }

    /// Board index 0..64.
    pub fn index(self) -> u8 {
        self.0
    }

    /// File, 0 = a.
    pub fn file(self) -> u8 {
        self.0 % 8
    }

    /// Rank, 0 = rank 1.
    pub fn rank(self) -> u8 {
        self.0 / 8
    }
}

impl std::fmt::Display for Square {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let file = (b'a' + self.file()) as char;
        let rank = (b'1' + self.rank()) as char;
        write!(f, "{}{}", file, rank)
    }
}

/// Error parsing a square or move from text.
#[derive(Debug, Clone, PartialEq, Eq, Display, derive_more::Error)]
#[display("Cannot parse '{}' as {}", input, expected)]
pub struct ParseNotationError {
    /// The rejected input.
    pub input: String,
    /// What was expected.
    pub expected: &'static str,
}

impl FromStr for Square {
    type Err = ParseNotationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseNotationError {
            input: s.to_string(),
            expected: "a square",
        };
        let bytes = s.trim().as_bytes();
        if bytes.len() != 2 {
            return Err(err());
        }
        let file = bytes[0].to_ascii_lowercase();
        let rank = bytes[1];
        if !(b'a'..=b'h').contains(&file) || !(b'1'..=b'8').contains(&rank) {
            return Err(err());
        }
        Square::from_coords(file - b'a', rank - b'1').ok_or_else(err)
    }
}

impl TryFrom<String> for Square {
    type Error = ParseNotationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Square> for String {
    fn from(square: Square) -> Self {
        square.to_string()
    }
}

/// A move: origin, destination and optional promotion choice.
///
/// Castling is written as the king's move (e1g1, e1c1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    /// Origin square.
    pub from: Square,
    /// Destination square.
    pub to: Square,
    /// Piece chosen on promotion.
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Creates a non-promoting move.
    #[instrument]
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            promotion: None,
        }
    }

    /// Creates a promoting move.
    pub fn with_promotion(from: Square, to: Square, promotion: PieceKind) -> Self {
        Self {
            from,
            to,
            promotion: Some(promotion),
        }
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.from, self.to)?;
        if let Some(kind) = self.promotion {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}

impl FromStr for Move {
    type Err = ParseNotationError;

    /// Parses coordinate notation: `e2e4`, `e7e8q`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let err = || ParseNotationError {
            input: s.to_string(),
            expected: "a coordinate move",
        };
        if !s.is_ascii() || !(4..=5).contains(&s.len()) {
            return Err(err());
        }
        let from: Square = s[0..2].parse().map_err(|_| err())?;
        let to: Square = s[2..4].parse().map_err(|_| err())?;
        let promotion = match s[4..].chars().next() {
            Some(c) => Some(PieceKind::from_letter(c).ok_or_else(err)?),
            None => None,
        };
        Ok(Self {
            from,
            to,
            promotion,
        })
    }
}

/// Why a game was drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
pub enum DrawReason {
    /// Side to move has no legal move and is not in check.
    #[display("stalemate")]
    Stalemate,
    /// Same position occurred three times.
    #[display("threefold repetition")]
    Repetition,
    /// Neither side can deliver mate.
    #[display("insufficient material")]
    InsufficientMaterial,
    /// Fifty moves without capture or pawn move.
    #[display("fifty-move rule")]
    FiftyMoveRule,
    /// Any other draw the engine reports.
    #[display("draw")]
    Other,
}

/// Terminal status of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GameStatus {
    /// Play continues.
    InProgress,
    /// The given side delivered mate.
    Checkmate(Side),
    /// Drawn for the given reason.
    Draw(DrawReason),
}

impl GameStatus {
    /// Returns true for checkmate or draw.
    pub fn is_over(self) -> bool {
        !matches!(self, GameStatus::InProgress)
    }

    /// Returns the winner if there is one.
    pub fn winner(self) -> Option<Side> {
        match self {
            GameStatus::Checkmate(side) => Some(side),
            _ => None,
        }
    }
}

impl std::fmt::Display for GameStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::InProgress => write!(f, "In progress"),
            GameStatus::Checkmate(winner) => write!(f, "Checkmate, {} wins", winner.label()),
            GameStatus::Draw(reason) => write!(f, "Draw by {}", reason),
        }
    }
}
