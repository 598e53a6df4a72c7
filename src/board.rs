// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Raw piece storage. A `Board` knows where pieces are and nothing about the rules that move them.

use std::fmt::{self, Write};

use crate::core::{self, *};

/// An 8x8 grid of squares, each of which is either empty or holds one piece.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Board {
    squares: [Option<Piece>; 64],
}

impl Board {
    /// A board with no pieces on it.
    pub fn empty() -> Board {
        Board { squares: [None; 64] }
    }

    /// The standard initial arrangement of pieces.
    pub fn starting() -> Board {
        const BACK_RANK: [PieceKind; 8] = [
            PieceKind::Rook,
            PieceKind::Knight,
            PieceKind::Bishop,
            PieceKind::Queen,
            PieceKind::King,
            PieceKind::Bishop,
            PieceKind::Knight,
            PieceKind::Rook,
        ];

        let mut board = Board::empty();
        for color in core::colors() {
            for (file, &kind) in BACK_RANK.iter().enumerate() {
                let file = file as i8;
                if let Ok(home) = Square::new(file, color.home_rank() as i8) {
                    board.set(home, Some(Piece::new(color, kind)));
                }
                if let Ok(pawn) = Square::new(file, color.pawn_rank() as i8) {
                    board.set(pawn, Some(Piece::new(color, PieceKind::Pawn)));
                }
            }
        }

        board
    }

    pub fn get(&self, square: Square) -> Option<Piece> {
        self.squares[square.as_u8() as usize]
    }

    pub fn set(&mut self, square: Square, piece: Option<Piece>) {
        self.squares[square.as_u8() as usize] = piece;
    }

    /// Empties a square, returning whatever was on it.
    pub fn take(&mut self, square: Square) -> Option<Piece> {
        self.squares[square.as_u8() as usize].take()
    }

    pub fn is_empty(&self, square: Square) -> bool {
        self.get(square).is_none()
    }

    /// Whether or not the given signed coordinates fall on the board.
    pub fn in_bounds(file: i8, rank: i8) -> bool {
        core::in_bounds(file, rank)
    }

    /// Iterates all occupied squares in storage order.
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        core::squares().filter_map(move |sq| self.get(sq).map(|piece| (sq, piece)))
    }

    /// Returns the square of the given color's king. If there is more than one, the first in storage order wins.
    pub fn king(&self, color: Color) -> Option<Square> {
        self.pieces()
            .find(|&(_, piece)| piece == Piece::new(color, PieceKind::King))
            .map(|(sq, _)| sq)
    }

    pub fn count(&self, piece: Piece) -> usize {
        self.pieces().filter(|&(_, p)| p == piece).count()
    }

    /// Returns the piece placement field of a FEN string describing this board: ranks in storage order separated by
    /// `/`, with runs of empty squares collapsed into a digit.
    pub fn placement(&self) -> String {
        let mut buf = String::new();
        for rank in 0..8 {
            let mut empty_squares = 0;
            for file in 0..8 {
                let piece = Square::new(file, rank).ok().and_then(|sq| self.get(sq));
                if let Some(piece) = piece {
                    if empty_squares != 0 {
                        let _ = write!(&mut buf, "{}", empty_squares);
                    }
                    let _ = write!(&mut buf, "{}", piece);
                    empty_squares = 0;
                } else {
                    empty_squares += 1;
                }
            }

            if empty_squares != 0 {
                let _ = write!(&mut buf, "{}", empty_squares);
            }

            if rank != 7 {
                buf.push('/');
            }
        }

        buf
    }
}

impl Default for Board {
    fn default() -> Self {
        Board::starting()
    }
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Board({})", self.placement())
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in 0..8 {
            for file in 0..8 {
                match Square::new(file, rank).ok().and_then(|sq| self.get(sq)) {
                    Some(piece) => write!(f, " {} ", piece)?,
                    None => write!(f, " . ")?,
                }
            }

            writeln!(f, "| {}", 8 - rank)?;
        }

        for _ in 0..8 {
            write!(f, "---")?;
        }

        writeln!(f)?;
        for file in 'a'..='h' {
            write!(f, " {} ", file)?;
        }

        writeln!(f)?;
        Ok(())
    }
}
