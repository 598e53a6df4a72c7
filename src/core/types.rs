// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::{convert::TryFrom, fmt, str::FromStr};

use bitflags::bitflags;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SquareParseError {
    #[error("square out of bounds: file {0}, rank {1}")]
    OutOfBounds(i8, i8),
    #[error("invalid square: {0:?}")]
    InvalidAlgebraic(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PieceParseError {
    #[error("invalid char: {0}")]
    InvalidChar(char),
}

/// A square on the chessboard.
///
/// Squares are stored rank-major starting from the rank nearest Black's back rank: index 0 is a8, index 7 is h8
/// and index 63 is h1. Consequently rank 0 is the eighth rank in algebraic notation and rank 7 is the first. The
/// algebraic view is only used when printing or parsing squares.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square(pub(in crate::core) u8);

impl Square {
    /// Creates a new Square from a file and a storage rank, both in `[0, 7]`.
    pub fn new(file: i8, rank: i8) -> Result<Square, SquareParseError> {
        if !in_bounds(file, rank) {
            return Err(SquareParseError::OutOfBounds(file, rank));
        }

        Ok(Square::of(file as u8, rank as u8))
    }

    pub(in crate::core) const fn of(file: u8, rank: u8) -> Square {
        Square(rank * 8 + file)
    }

    /// Returns the file of this square, 0 being the a-file.
    pub const fn file(self) -> u8 {
        self.0 & 7
    }

    /// Returns the storage rank of this square, 0 being the eighth rank.
    pub const fn rank(self) -> u8 {
        self.0 >> 3
    }

    /// Returns the square displaced by the given file and rank deltas, or None if that walks off of the board.
    pub fn offset(self, file_delta: i8, rank_delta: i8) -> Option<Square> {
        Square::new(self.file() as i8 + file_delta, self.rank() as i8 + rank_delta).ok()
    }

    /// Returns the closest square in the given direction, if there is one.
    pub fn towards(self, dir: Direction) -> Option<Square> {
        let (file_delta, rank_delta) = dir.as_offset();
        self.offset(file_delta, rank_delta)
    }

    pub const fn as_u8(self) -> u8 {
        self.0
    }
}

/// Returns whether or not the given signed coordinates fall on the board.
pub fn in_bounds(file: i8, rank: i8) -> bool {
    (0..8).contains(&file) && (0..8).contains(&rank)
}

impl TryFrom<u8> for Square {
    type Error = SquareParseError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value >= 64 {
            return Err(SquareParseError::OutOfBounds(
                (value & 7) as i8,
                (value >> 3) as i8,
            ));
        }

        Ok(Square(value))
    }
}

impl FromStr for Square {
    type Err = SquareParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || SquareParseError::InvalidAlgebraic(s.to_string());
        let mut chars = s.chars();
        let (file, rank) = match (chars.next(), chars.next(), chars.next()) {
            (Some(f @ 'a'..='h'), Some(r @ '1'..='8'), None) => (f, r),
            _ => return Err(invalid()),
        };

        let file = file as u8 - b'a';
        let rank = 7 - (rank as u8 - b'1');
        Ok(Square::of(file, rank))
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let file = (b'a' + self.file()) as char;
        let rank = (b'8' - self.rank()) as char;
        write!(f, "{}{}", file, rank)
    }
}

pub const A8: Square = Square(0);
pub const B8: Square = Square(1);
pub const C8: Square = Square(2);
pub const D8: Square = Square(3);
pub const E8: Square = Square(4);
pub const F8: Square = Square(5);
pub const G8: Square = Square(6);
pub const H8: Square = Square(7);
pub const A7: Square = Square(8);
pub const B7: Square = Square(9);
pub const C7: Square = Square(10);
pub const D7: Square = Square(11);
pub const E7: Square = Square(12);
pub const F7: Square = Square(13);
pub const G7: Square = Square(14);
pub const H7: Square = Square(15);
pub const A6: Square = Square(16);
pub const B6: Square = Square(17);
pub const C6: Square = Square(18);
pub const D6: Square = Square(19);
pub const E6: Square = Square(20);
pub const F6: Square = Square(21);
pub const G6: Square = Square(22);
pub const H6: Square = Square(23);
pub const A5: Square = Square(24);
pub const B5: Square = Square(25);
pub const C5: Square = Square(26);
pub const D5: Square = Square(27);
pub const E5: Square = Square(28);
pub const F5: Square = Square(29);
pub const G5: Square = Square(30);
pub const H5: Square = Square(31);
pub const A4: Square = Square(32);
pub const B4: Square = Square(33);
pub const C4: Square = Square(34);
pub const D4: Square = Square(35);
pub const E4: Square = Square(36);
pub const F4: Square = Square(37);
pub const G4: Square = Square(38);
pub const H4: Square = Square(39);
pub const A3: Square = Square(40);
pub const B3: Square = Square(41);
pub const C3: Square = Square(42);
pub const D3: Square = Square(43);
pub const E3: Square = Square(44);
pub const F3: Square = Square(45);
pub const G3: Square = Square(46);
pub const H3: Square = Square(47);
pub const A2: Square = Square(48);
pub const B2: Square = Square(49);
pub const C2: Square = Square(50);
pub const D2: Square = Square(51);
pub const E2: Square = Square(52);
pub const F2: Square = Square(53);
pub const G2: Square = Square(54);
pub const H2: Square = Square(55);
pub const A1: Square = Square(56);
pub const B1: Square = Square(57);
pub const C1: Square = Square(58);
pub const D1: Square = Square(59);
pub const E1: Square = Square(60);
pub const F1: Square = Square(61);
pub const G1: Square = Square(62);
pub const H1: Square = Square(63);

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    White,
    Black,
}

impl Color {
    pub fn toggle(self) -> Color {
        match self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    /// The storage rank delta of a single pawn step for this color.
    pub const fn pawn_direction(self) -> i8 {
        match self {
            Color::White => -1,
            Color::Black => 1,
        }
    }

    /// The storage rank this color's pawns start on.
    pub const fn pawn_rank(self) -> u8 {
        match self {
            Color::White => 6,
            Color::Black => 1,
        }
    }

    /// The storage rank this color's pawns promote on.
    pub const fn promotion_rank(self) -> u8 {
        match self {
            Color::White => 0,
            Color::Black => 7,
        }
    }

    /// The storage rank this color's king and rooks start on.
    pub const fn home_rank(self) -> u8 {
        match self {
            Color::White => 7,
            Color::Black => 0,
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Color::White => write!(f, "white"),
            Color::Black => write!(f, "black"),
        }
    }
}

#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum PieceKind {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}

impl PieceKind {
    /// Whether or not a pawn may promote to this kind of piece.
    pub fn is_promotion_target(self) -> bool {
        matches!(
            self,
            PieceKind::Knight | PieceKind::Bishop | PieceKind::Rook | PieceKind::Queen
        )
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };

        write!(f, "{}", c)
    }
}

/// An occupant of a square. Empty squares are represented as `None` wherever a square's contents are returned.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub color: Color,
    pub kind: PieceKind,
}

impl Piece {
    pub const fn new(color: Color, kind: PieceKind) -> Piece {
        Piece { color, kind }
    }

    pub fn is_white(self) -> bool {
        self.color == Color::White
    }
}

impl TryFrom<char> for Piece {
    type Error = PieceParseError;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        let kind = match value.to_ascii_lowercase() {
            'p' => PieceKind::Pawn,
            'n' => PieceKind::Knight,
            'b' => PieceKind::Bishop,
            'r' => PieceKind::Rook,
            'q' => PieceKind::Queen,
            'k' => PieceKind::King,
            _ => return Err(PieceParseError::InvalidChar(value)),
        };

        let color = if value.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };

        Ok(Piece { color, kind })
    }
}

impl fmt::Display for Piece {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let c = match self.kind {
            PieceKind::Pawn => 'p',
            PieceKind::Knight => 'n',
            PieceKind::Bishop => 'b',
            PieceKind::Rook => 'r',
            PieceKind::Queen => 'q',
            PieceKind::King => 'k',
        };

        match self.color {
            Color::White => write!(f, "{}", c.to_ascii_uppercase()),
            Color::Black => write!(f, "{}", c),
        }
    }
}

/// Compass directions as seen from White's side of the board.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
}

impl Direction {
    /// Returns the (file, storage rank) delta of one step in this direction. North walks towards the eighth rank,
    /// which is storage rank 0.
    pub const fn as_offset(self) -> (i8, i8) {
        match self {
            Direction::North => (0, -1),
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (1, 1),
            Direction::South => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (-1, -1),
        }
    }
}

bitflags! {
    pub struct CastleStatus: u8 {
        const NONE = 0;
        const WHITE_KINGSIDE = 0b0000_0001;
        const WHITE_QUEENSIDE =0b0000_0010;
        const WHITE = Self::WHITE_KINGSIDE.bits | Self::WHITE_QUEENSIDE.bits;
        const BLACK_KINGSIDE = 0b0000_0100;
        const BLACK_QUEENSIDE = 0b0000_1000;
        const BLACK = Self::BLACK_KINGSIDE.bits | Self::BLACK_QUEENSIDE.bits;
    }
}

impl CastleStatus {
    pub fn kingside(color: Color) -> CastleStatus {
        match color {
            Color::White => CastleStatus::WHITE_KINGSIDE,
            Color::Black => CastleStatus::BLACK_KINGSIDE,
        }
    }

    pub fn queenside(color: Color) -> CastleStatus {
        match color {
            Color::White => CastleStatus::WHITE_QUEENSIDE,
            Color::Black => CastleStatus::BLACK_QUEENSIDE,
        }
    }

    pub fn both(color: Color) -> CastleStatus {
        match color {
            Color::White => CastleStatus::WHITE,
            Color::Black => CastleStatus::BLACK,
        }
    }
}

impl fmt::Display for CastleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return write!(f, "-");
        }

        for (flag, c) in [
            (CastleStatus::WHITE_KINGSIDE, 'K'),
            (CastleStatus::WHITE_QUEENSIDE, 'Q'),
            (CastleStatus::BLACK_KINGSIDE, 'k'),
            (CastleStatus::BLACK_QUEENSIDE, 'q'),
        ] {
            if self.contains(flag) {
                write!(f, "{}", c)?;
            }
        }

        Ok(())
    }
}

macro_rules! type_iterator {
    ($name:ident, $type:ident, $max:expr) => {
        pub struct $name(u8, u8);

        impl Iterator for $name {
            type Item = $type;

            fn next(&mut self) -> Option<Self::Item> {
                if self.0 >= self.1 {
                    None
                } else {
                    let next = self.0;
                    self.0 += 1;
                    Some($type(next))
                }
            }
        }

        impl ::std::iter::DoubleEndedIterator for $name {
            fn next_back(&mut self) -> Option<Self::Item> {
                if self.1 <= self.0 {
                    None
                } else {
                    let next = self.1 - 1;
                    self.1 -= 1;
                    Some($type(next))
                }
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name(0, $max)
            }
        }
    };
}

type_iterator!(AllSquares, Square, 64);

/// Iterates every square in storage order, a8 through h1.
pub fn squares() -> AllSquares {
    AllSquares::default()
}

pub fn colors() -> ::std::vec::IntoIter<Color> {
    vec![Color::White, Color::Black].into_iter()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_orientation() {
        assert_eq!(0, A8.file());
        assert_eq!(0, A8.rank());
        assert_eq!(7, H1.file());
        assert_eq!(7, H1.rank());
        assert_eq!(E2, Square::new(4, 6).unwrap());
    }

    #[test]
    fn algebraic_roundtrip() {
        for sq in squares() {
            let parsed: Square = sq.to_string().parse().unwrap();
            assert_eq!(sq, parsed);
        }

        assert_eq!("e4", E4.to_string());
        assert_eq!("a8", A8.to_string());
        assert_eq!("h1", H1.to_string());
    }

    #[test]
    fn out_of_bounds() {
        assert_eq!(
            SquareParseError::OutOfBounds(8, 0),
            Square::new(8, 0).unwrap_err()
        );
        assert_eq!(
            SquareParseError::OutOfBounds(0, -1),
            Square::new(0, -1).unwrap_err()
        );
        assert!(Square::try_from(64u8).is_err());
        assert!("i1".parse::<Square>().is_err());
        assert!("a9".parse::<Square>().is_err());
        assert!("a10".parse::<Square>().is_err());
    }

    #[test]
    fn offsets() {
        assert_eq!(Some(E3), E2.towards(Direction::North));
        assert_eq!(None, A1.towards(Direction::West));
        assert_eq!(None, H8.towards(Direction::NorthEast));
        assert_eq!(Some(F3), E1.offset(1, -2));
    }

    #[test]
    fn piece_chars() {
        let piece = Piece::try_from('N').unwrap();
        assert_eq!(Piece::new(Color::White, PieceKind::Knight), piece);
        assert!(piece.is_white());
        assert_eq!("N", piece.to_string());

        let piece = Piece::try_from('q').unwrap();
        assert_eq!(Piece::new(Color::Black, PieceKind::Queen), piece);
        assert!(!piece.is_white());
        assert_eq!("q", piece.to_string());

        assert_eq!(
            PieceParseError::InvalidChar('x'),
            Piece::try_from('x').unwrap_err()
        );
    }

    #[test]
    fn castle_status_order() {
        assert_eq!("KQkq", (CastleStatus::WHITE | CastleStatus::BLACK).to_string());
        assert_eq!(
            "Kq",
            (CastleStatus::WHITE_KINGSIDE | CastleStatus::BLACK_QUEENSIDE).to_string()
        );
        assert_eq!("-", CastleStatus::NONE.to_string());
    }
}
