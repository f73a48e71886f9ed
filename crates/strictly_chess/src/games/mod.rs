//! Game rules consumed by the session.

pub mod chess;
