// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::fmt::{self, Write};

use derive_more::Display;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    board::Board,
    core::{self, *},
    movegen,
};

/// The result of the game as of a position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[display(fmt = "ongoing")]
    Ongoing,
    #[display(fmt = "checkmate")]
    Checkmate,
    #[display(fmt = "stalemate")]
    Stalemate,
    #[display(fmt = "draw by repetition")]
    DrawByRepetition,
    #[display(fmt = "draw by fifty-move rule")]
    DrawByFiftyMove,
}

impl GameStatus {
    pub fn is_terminal(self) -> bool {
        self != GameStatus::Ongoing
    }
}

/// Reasons a move can be refused by `Position::make_move`.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum IllegalMoveError {
    #[error("no piece on {0}")]
    NoPiece(Square),
    #[error("the piece on {0} does not belong to the side to move")]
    WrongColor(Square),
    #[error("illegal move: {0}")]
    IllegalDestination(Move),
    #[error("cannot promote to {0:?}")]
    InvalidPromotion(PieceKind),
    #[error("the game is over ({0})")]
    GameOver(GameStatus),
}

/// A position, representing a chess game that has progressed up to this point: the board, whose turn it is, and all
/// of the state the rules need that can't be read off of the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Position {
    /// The pieces.
    board: Board,
    /// The en-passant square, if the previous move was a double pawn push.
    en_passant_square: Option<Square>,
    /// The halfmove clock, or the progress to a draw by the 50-move Rule.
    halfmove_clock: u32,
    /// The fullmove number, starting at 1 and incremented after every Black move.
    fullmove_number: u32,
    /// Castle status for both players.
    castle_status: CastleStatus,
    /// Color whose turn it is to move.
    side_to_move: Color,
    /// Whether the game has ended, and how.
    status: GameStatus,
}

impl Position {
    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn piece_at(&self, square: Square) -> Option<Piece> {
        self.board.get(square)
    }

    pub fn en_passant_square(&self) -> Option<Square> {
        self.en_passant_square
    }

    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    pub fn side_to_move(&self) -> Color {
        self.side_to_move
    }

    pub fn castle_status(&self) -> CastleStatus {
        self.castle_status
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub(crate) fn set_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    pub fn can_castle_kingside(&self, color: Color) -> bool {
        self.castle_status.contains(CastleStatus::kingside(color))
    }

    pub fn can_castle_queenside(&self, color: Color) -> bool {
        self.castle_status.contains(CastleStatus::queenside(color))
    }

    pub fn king(&self, color: Color) -> Option<Square> {
        self.board.king(color)
    }
}

impl Position {
    /// The standard starting position.
    pub fn from_start_position() -> Position {
        Position {
            board: Board::starting(),
            en_passant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            castle_status: CastleStatus::WHITE | CastleStatus::BLACK,
            side_to_move: Color::White,
            status: GameStatus::Ongoing,
        }
    }

    /// Returns whether or not the king of the given color is attacked.
    pub fn is_check(&self, color: Color) -> bool {
        movegen::is_check(&self.board, color)
    }

    /// Returns the squares the piece on `from` may legally move to. Empty if `from` does not hold a piece of the
    /// side to move.
    pub fn legal_moves(&self, from: Square) -> Vec<Square> {
        movegen::legal_moves(self, from)
    }

    /// Legality test for any move, ignoring whether the game is over.
    pub fn is_legal(&self, mov: Move) -> bool {
        self.validate(mov).is_ok()
    }

    /// Classifies this position from the point of view of the side to move. Repetitions are a property of a game's
    /// history rather than of a single position, so this never returns `DrawByRepetition`.
    fn classify(&self) -> GameStatus {
        if !movegen::has_legal_moves(self) {
            if self.is_check(self.side_to_move) {
                GameStatus::Checkmate
            } else {
                GameStatus::Stalemate
            }
        } else if self.halfmove_clock >= 100 {
            GameStatus::DrawByFiftyMove
        } else {
            GameStatus::Ongoing
        }
    }
}

//
// Make move and associated state update functions.
//

impl Position {
    /// Plays a move on the position, updating all internal state to reflect the effects of the move, and returns
    /// the status of the game afterwards.
    ///
    /// Legality is always recomputed from the current position. If the move is refused, the position is left exactly
    /// as it was.
    pub fn make_move(&mut self, mov: Move) -> Result<GameStatus, IllegalMoveError> {
        if self.status.is_terminal() {
            return Err(IllegalMoveError::GameOver(self.status));
        }

        let (piece, promotion) = self.validate(mov)?;
        self.apply(piece, mov.from, mov.to, promotion);
        self.status = self.classify();
        Ok(self.status)
    }

    /// Checks that `mov` is legal here, returning the moving piece and, for a pawn reaching the last rank, the piece
    /// it becomes.
    fn validate(&self, mov: Move) -> Result<(Piece, Option<PieceKind>), IllegalMoveError> {
        let piece = self
            .board
            .get(mov.from)
            .ok_or(IllegalMoveError::NoPiece(mov.from))?;
        if piece.color != self.side_to_move {
            return Err(IllegalMoveError::WrongColor(mov.from));
        }

        if !movegen::legal_moves(self, mov.from).contains(&mov.to) {
            return Err(IllegalMoveError::IllegalDestination(mov));
        }

        let promotion = if piece.kind == PieceKind::Pawn
            && mov.to.rank() == piece.color.promotion_rank()
        {
            let kind = mov.promotion.unwrap_or(PieceKind::Queen);
            if !kind.is_promotion_target() {
                return Err(IllegalMoveError::InvalidPromotion(kind));
            }

            Some(kind)
        } else {
            None
        };

        Ok((piece, promotion))
    }

    /// Moves `piece` from `from` to `to` and updates every piece of state that follows from that. The move must
    /// already be known to be legal.
    fn apply(&mut self, piece: Piece, from: Square, to: Square, promotion: Option<PieceKind>) {
        let us = self.side_to_move;

        // En-passant moves are the only case when the piece being captured does not lie on the destination square.
        let en_passant_victim =
            movegen::en_passant_victim(&self.board, from, to, self.en_passant_square);
        let is_capture = self.board.get(to).is_some() || en_passant_victim.is_some();
        if let Some(victim) = en_passant_victim {
            self.board.set(victim, None);
        }

        self.board.set(from, None);
        let piece_to_add = match promotion {
            Some(kind) => Piece::new(us, kind),
            None => piece,
        };
        self.board.set(to, Some(piece_to_add));

        // Castles are encoded as the king's two-square hop. The rook moves to the square the king passed over.
        if piece.kind == PieceKind::King && (to.file() as i8 - from.file() as i8).abs() == 2 {
            let (rook_file, rook_target_file) = if to.file() > from.file() {
                (7, 5)
            } else {
                (0, 3)
            };
            let rank = from.rank() as i8;
            if let (Ok(rook_square), Ok(rook_target)) =
                (Square::new(rook_file, rank), Square::new(rook_target_file, rank))
            {
                let rook = self.board.take(rook_square);
                self.board.set(rook_target, rook);
            }
        }

        // Moving the king gives up both castles. Anything leaving or landing on a corner gives up that corner's
        // castle, which covers rooks moving away as well as rooks being captured at home.
        if piece.kind == PieceKind::King {
            self.castle_status &= !CastleStatus::both(us);
        }
        self.castle_status &= !corner_castle_mask(from);
        self.castle_status &= !corner_castle_mask(to);

        self.en_passant_square = if piece.kind == PieceKind::Pawn
            && (to.rank() as i8 - from.rank() as i8).abs() == 2
        {
            Square::new(from.file() as i8, (from.rank() as i8 + to.rank() as i8) / 2).ok()
        } else {
            None
        };

        if is_capture || piece.kind == PieceKind::Pawn {
            self.halfmove_clock = 0;
        } else {
            self.halfmove_clock = self.halfmove_clock.saturating_add(1);
        }

        if us == Color::Black {
            self.fullmove_number = self.fullmove_number.saturating_add(1);
        }

        self.side_to_move = us.toggle();
    }
}

/// The castle right tied to a rook's starting corner, if `square` is one.
fn corner_castle_mask(square: Square) -> CastleStatus {
    match square {
        A1 => CastleStatus::WHITE_QUEENSIDE,
        H1 => CastleStatus::WHITE_KINGSIDE,
        A8 => CastleStatus::BLACK_QUEENSIDE,
        H8 => CastleStatus::BLACK_KINGSIDE,
        _ => CastleStatus::NONE,
    }
}

//
// Perft, the move path enumeration used to check move generation against known node counts.
//

impl Position {
    /// Counts the leaf nodes of the legal move tree rooted at this position, `depth` plies deep. Terminal statuses
    /// are not consulted; a position without legal moves simply has no children.
    pub fn perft(&self, depth: u32) -> u64 {
        if depth == 0 {
            return 1;
        }

        let mut moves = Vec::new();
        movegen::generate_moves(self, &mut moves);
        if depth == 1 {
            return moves.len() as u64;
        }

        moves
            .into_iter()
            .map(|mov| self.child(mov).perft(depth - 1))
            .sum()
    }

    /// Splits `perft(depth)` by root move, in move generation order.
    pub fn divide(&self, depth: u32) -> Vec<(Move, u64)> {
        let mut moves = Vec::new();
        movegen::generate_moves(self, &mut moves);
        moves
            .into_iter()
            .map(|mov| (mov, self.child(mov).perft(depth.saturating_sub(1))))
            .collect()
    }

    /// The position after a move produced by the move generator.
    fn child(&self, mov: Move) -> Position {
        let mut child = self.clone();
        if let Some(piece) = self.board.get(mov.from) {
            let promotion = if piece.kind == PieceKind::Pawn
                && mov.to.rank() == piece.color.promotion_rank()
            {
                Some(mov.promotion.unwrap_or(PieceKind::Queen))
            } else {
                None
            };
            child.apply(piece, mov.from, mov.to, promotion);
        }

        child
    }
}

//
// FEN parsing and generation.
//
// The routines in this block are oriented around FEN, a simple notation for chess positions.
// Positions can be created by parsing FEN and FEN can be produced from particular positions.
//

/// Possible errors that can arise when parsing a FEN string into a `Position`.
#[derive(Clone, PartialEq, Eq, Debug, Error)]
pub enum FenParseError {
    #[error("expected 6 fields, found {0}")]
    WrongFieldCount(usize),
    #[error("expected 8 ranks, found {0}")]
    WrongRankCount(usize),
    #[error("invalid digit")]
    InvalidDigit,
    #[error("file does not sum to 8")]
    FileDoesNotSumToEight,
    #[error("unknown piece: {0}")]
    UnknownPiece(char),
    #[error("invalid side to move")]
    InvalidSideToMove,
    #[error("invalid castle")]
    InvalidCastle,
    #[error("invalid en-passant")]
    InvalidEnPassant,
    #[error("invalid halfmove")]
    InvalidHalfmove,
    #[error("invalid fullmove")]
    InvalidFullmove,
    #[error("{0} must have exactly one king")]
    InvalidKingCount(Color),
    #[error("the side not to move is in check")]
    OpponentInCheck,
}

pub const START_POSITION_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

impl Position {
    /// Constructs a new position from a FEN representation of a board position.
    pub fn from_fen(fen: impl AsRef<str>) -> Result<Position, FenParseError> {
        fn eat_placement(field: &str) -> Result<Board, FenParseError> {
            let ranks: Vec<_> = field.split('/').collect();
            if ranks.len() != 8 {
                return Err(FenParseError::WrongRankCount(ranks.len()));
            }

            let mut board = Board::empty();
            for (rank, rank_str) in ranks.into_iter().enumerate() {
                let mut file = 0;
                for c in rank_str.chars() {
                    // digits 1 through 8 indicate empty squares.
                    if let Some(value) = c.to_digit(10) {
                        if !(1..=8).contains(&value) {
                            return Err(FenParseError::InvalidDigit);
                        }

                        file += value as i8;
                        if file > 8 {
                            return Err(FenParseError::FileDoesNotSumToEight);
                        }

                        continue;
                    }

                    // if it's not a digit, it represents a piece.
                    let piece = Piece::try_from(c).map_err(|_| FenParseError::UnknownPiece(c))?;
                    let square = Square::new(file, rank as i8)
                        .map_err(|_| FenParseError::FileDoesNotSumToEight)?;
                    board.set(square, Some(piece));
                    file += 1;
                }

                if file != 8 {
                    return Err(FenParseError::FileDoesNotSumToEight);
                }
            }

            Ok(board)
        }

        fn eat_side_to_move(field: &str) -> Result<Color, FenParseError> {
            match field {
                "w" => Ok(Color::White),
                "b" => Ok(Color::Black),
                _ => Err(FenParseError::InvalidSideToMove),
            }
        }

        fn eat_castle_status(field: &str) -> Result<CastleStatus, FenParseError> {
            if field == "-" {
                return Ok(CastleStatus::NONE);
            }

            let mut status = CastleStatus::NONE;
            for c in field.chars() {
                let flag = match c {
                    'K' => CastleStatus::WHITE_KINGSIDE,
                    'Q' => CastleStatus::WHITE_QUEENSIDE,
                    'k' => CastleStatus::BLACK_KINGSIDE,
                    'q' => CastleStatus::BLACK_QUEENSIDE,
                    _ => return Err(FenParseError::InvalidCastle),
                };

                if status.contains(flag) {
                    return Err(FenParseError::InvalidCastle);
                }

                status |= flag;
            }

            Ok(status)
        }

        fn eat_en_passant(field: &str) -> Result<Option<Square>, FenParseError> {
            if field == "-" {
                return Ok(None);
            }

            let square = field
                .parse::<Square>()
                .map_err(|_| FenParseError::InvalidEnPassant)?;

            // Only the third and sixth ranks can ever be passed over by a double pawn push.
            match square.rank() {
                2 | 5 => Ok(Some(square)),
                _ => Err(FenParseError::InvalidEnPassant),
            }
        }

        fn eat_clock(field: &str, err: FenParseError) -> Result<u32, FenParseError> {
            if field.is_empty() || !field.chars().all(|c| c.is_ascii_digit()) {
                return Err(err);
            }

            field.parse::<u32>().map_err(|_| err)
        }

        let fields: Vec<_> = fen.as_ref().split_whitespace().collect();
        if fields.len() != 6 {
            return Err(FenParseError::WrongFieldCount(fields.len()));
        }

        let board = eat_placement(fields[0])?;
        let side_to_move = eat_side_to_move(fields[1])?;
        let castle_status = eat_castle_status(fields[2])?;
        let en_passant_square = eat_en_passant(fields[3])?;
        let halfmove_clock = eat_clock(fields[4], FenParseError::InvalidHalfmove)?;
        let fullmove_number = eat_clock(fields[5], FenParseError::InvalidFullmove)?;
        if fullmove_number == 0 {
            return Err(FenParseError::InvalidFullmove);
        }

        for color in core::colors() {
            if board.count(Piece::new(color, PieceKind::King)) != 1 {
                return Err(FenParseError::InvalidKingCount(color));
            }
        }

        // The previous move would have had to leave its own king attacked.
        if movegen::is_check(&board, side_to_move.toggle()) {
            return Err(FenParseError::OpponentInCheck);
        }

        let mut pos = Position {
            board,
            en_passant_square,
            halfmove_clock,
            fullmove_number,
            castle_status,
            side_to_move,
            status: GameStatus::Ongoing,
        };
        pos.status = pos.classify();
        Ok(pos)
    }

    pub fn as_fen(&self) -> String {
        let mut buf = self.repetition_key();
        let _ = write!(
            &mut buf,
            " {} {}",
            self.halfmove_clock(),
            self.fullmove_number()
        );
        buf
    }

    /// The first four FEN fields: placement, side to move, castle status and en-passant square. Two positions with
    /// the same key count as the same position for the purposes of repetition.
    pub fn repetition_key(&self) -> String {
        let mut buf = self.board.placement();
        buf.push(' ');
        match self.side_to_move() {
            Color::White => buf.push('w'),
            Color::Black => buf.push('b'),
        }
        let _ = write!(&mut buf, " {} ", self.castle_status);
        if let Some(ep_square) = self.en_passant_square() {
            let _ = write!(&mut buf, "{}", ep_square);
        } else {
            buf.push('-');
        }
        buf
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.board)?;
        writeln!(f, "{}", self.as_fen())
    }
}

impl Default for Position {
    fn default() -> Self {
        Position::from_start_position()
    }
}
