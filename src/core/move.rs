// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::*;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum MoveParseError {
    #[error("invalid move length: {0}")]
    InvalidLength(usize),
    #[error("invalid square: {0}")]
    InvalidSquare(#[from] SquareParseError),
    #[error("invalid promotion piece: {0}")]
    InvalidPromotion(char),
}

/// A move, as requested by a player. A move only records where a piece comes from, where it goes to, and what a
/// pawn becomes when it reaches the far rank; everything else (captures, castling, en-passant) is a property of the
/// position the move is played in.
///
/// `promotion` is only consulted for pawn moves that land on the last rank. If it is absent on such a move, the
/// pawn becomes a queen.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub promotion: Option<PieceKind>,
}

impl Move {
    /// Constructs a new move from the source square to the destination square.
    pub fn new(from: Square, to: Square) -> Move {
        Move {
            from,
            to,
            promotion: None,
        }
    }

    /// Constructs a new move from the source square to the destination square, promoting the moving pawn to the
    /// given piece kind.
    pub fn promotion(from: Square, to: Square, promotion: PieceKind) -> Move {
        Move {
            from,
            to,
            promotion: Some(promotion),
        }
    }

    /// Returns an UCI-compatible string representation of this move, e.g. `e2e4` or `e7e8q`.
    pub fn as_uci(self) -> String {
        match self.promotion {
            Some(kind) => format!("{}{}{}", self.from, self.to, kind),
            None => format!("{}{}", self.from, self.to),
        }
    }

    /// Parses the UCI representation of a move into a Move. Accepted strings match
    /// `^[a-h][1-8][a-h][1-8][qnbr]?$`.
    pub fn from_uci(move_str: &str) -> Result<Move, MoveParseError> {
        if !move_str.is_ascii() || !(4..=5).contains(&move_str.len()) {
            return Err(MoveParseError::InvalidLength(move_str.chars().count()));
        }

        let from = move_str[0..2].parse::<Square>()?;
        let to = move_str[2..4].parse::<Square>()?;
        let promotion = match move_str[4..].chars().next() {
            None => None,
            Some('n') => Some(PieceKind::Knight),
            Some('b') => Some(PieceKind::Bishop),
            Some('r') => Some(PieceKind::Rook),
            Some('q') => Some(PieceKind::Queen),
            Some(c) => return Err(MoveParseError::InvalidPromotion(c)),
        };

        Ok(Move {
            from,
            to,
            promotion,
        })
    }
}

impl FromStr for Move {
    type Err = MoveParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Move::from_uci(s)
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_uci())
    }
}

impl fmt::Debug for Move {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(f, "{} ({:?} -> {:?})", self.as_uci(), self.from, self.to)
    }
}
