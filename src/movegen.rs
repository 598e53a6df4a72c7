// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! Move generation. Pseudo-legal destinations are generated per piece by walking the board; legal moves are the
//! pseudo-legal ones that do not leave the mover's king attacked.
//!
//! Destinations are produced in a stable order: the piece's direction list, then distance along each direction.
//! Nothing outside of tests should rely on that order.

use crate::board::Board;
use crate::core::*;
use crate::Position;

const ROOK_DIRECTIONS: [Direction; 4] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
];

const BISHOP_DIRECTIONS: [Direction; 4] = [
    Direction::NorthEast,
    Direction::SouthWest,
    Direction::SouthEast,
    Direction::NorthWest,
];

const QUEEN_DIRECTIONS: [Direction; 8] = [
    Direction::North,
    Direction::South,
    Direction::East,
    Direction::West,
    Direction::NorthEast,
    Direction::SouthWest,
    Direction::SouthEast,
    Direction::NorthWest,
];

const KNIGHT_OFFSETS: [(i8, i8); 8] = [
    (2, 1),
    (2, -1),
    (-2, 1),
    (-2, -1),
    (1, 2),
    (-1, 2),
    (1, -2),
    (-1, -2),
];

const PROMOTION_KINDS: [PieceKind; 4] = [
    PieceKind::Queen,
    PieceKind::Rook,
    PieceKind::Bishop,
    PieceKind::Knight,
];

/// Generates the pseudo-legal destinations of the piece on `from`, not including castles. Does nothing if `from` is
/// empty.
pub fn generate_pseudolegal(
    board: &Board,
    from: Square,
    en_passant: Option<Square>,
    moves: &mut Vec<Square>,
) {
    let piece = match board.get(from) {
        Some(piece) => piece,
        None => return,
    };

    match piece.kind {
        PieceKind::Pawn => generate_pawn_moves(board, from, piece.color, en_passant, moves),
        PieceKind::Knight => {
            for (file_delta, rank_delta) in KNIGHT_OFFSETS {
                generate_step(board, piece.color, from.offset(file_delta, rank_delta), moves);
            }
        }
        PieceKind::King => {
            for dir in QUEEN_DIRECTIONS {
                generate_step(board, piece.color, from.towards(dir), moves);
            }
        }
        PieceKind::Bishop => generate_slides(board, from, piece.color, &BISHOP_DIRECTIONS, moves),
        PieceKind::Rook => generate_slides(board, from, piece.color, &ROOK_DIRECTIONS, moves),
        PieceKind::Queen => generate_slides(board, from, piece.color, &QUEEN_DIRECTIONS, moves),
    }
}

fn generate_step(board: &Board, us: Color, target: Option<Square>, moves: &mut Vec<Square>) {
    if let Some(target) = target {
        match board.get(target) {
            Some(occupant) if occupant.color == us => {}
            _ => moves.push(target),
        }
    }
}

fn generate_slides(
    board: &Board,
    from: Square,
    us: Color,
    directions: &[Direction],
    moves: &mut Vec<Square>,
) {
    for &dir in directions {
        let mut cursor = from.towards(dir);
        while let Some(target) = cursor {
            match board.get(target) {
                None => moves.push(target),
                Some(occupant) => {
                    if occupant.color != us {
                        moves.push(target);
                    }
                    break;
                }
            }

            cursor = target.towards(dir);
        }
    }
}

fn generate_pawn_moves(
    board: &Board,
    from: Square,
    us: Color,
    en_passant: Option<Square>,
    moves: &mut Vec<Square>,
) {
    let up = us.pawn_direction();

    // Single and double pushes. The double push needs both squares clear.
    if let Some(single) = from.offset(0, up) {
        if board.is_empty(single) {
            moves.push(single);
            if from.rank() == us.pawn_rank() {
                if let Some(double) = single.offset(0, up) {
                    if board.is_empty(double) {
                        moves.push(double);
                    }
                }
            }
        }
    }

    // Captures, including en-passant.
    for file_delta in [-1, 1] {
        let target = match from.offset(file_delta, up) {
            Some(target) => target,
            None => continue,
        };

        match board.get(target) {
            Some(occupant) if occupant.color != us => moves.push(target),
            Some(_) => {}
            None => {
                if en_passant_victim(board, from, target, en_passant).is_some() {
                    moves.push(target);
                }
            }
        }
    }
}

/// If moving the piece on `from` to `to` is an en-passant capture, returns the square of the pawn that it captures.
///
/// This is the case when a pawn moves diagonally onto the (empty) en-passant target, the target lies on the rank a
/// pawn of that color captures en-passant onto, and an enemy pawn stands beside `from` on the target's file.
pub(crate) fn en_passant_victim(
    board: &Board,
    from: Square,
    to: Square,
    en_passant: Option<Square>,
) -> Option<Square> {
    let pawn = board.get(from).filter(|p| p.kind == PieceKind::Pawn)?;
    if en_passant != Some(to) || !board.is_empty(to) || from.file() == to.file() {
        return None;
    }

    // The passed-over square is behind the enemy pawn, which in turn is two steps away from its start rank.
    let them = pawn.color.toggle();
    let capture_rank = them.pawn_rank() as i8 + them.pawn_direction();
    if to.rank() as i8 != capture_rank
        || from.rank() as i8 != capture_rank - pawn.color.pawn_direction()
    {
        return None;
    }

    let victim = Square::new(to.file() as i8, from.rank() as i8).ok()?;
    match board.get(victim) {
        Some(p) if p == Piece::new(them, PieceKind::Pawn) => Some(victim),
        _ => None,
    }
}

/// Generates the two-square king hops of every castle available to the king on `from`.
fn generate_castles(pos: &Position, from: Square, moves: &mut Vec<Square>) {
    for kingside in [true, false] {
        if let Some(target) = castle_target(pos, from, kingside) {
            moves.push(target);
        }
    }
}

fn castle_target(pos: &Position, from: Square, kingside: bool) -> Option<Square> {
    let board = pos.board();
    let king = board.get(from).filter(|p| p.kind == PieceKind::King)?;
    let us = king.color;
    let home = us.home_rank() as i8;
    let (right, rook_file, between, path): (CastleStatus, i8, &[i8], [i8; 3]) = if kingside {
        (CastleStatus::kingside(us), 7, &[5, 6][..], [4, 5, 6])
    } else {
        (CastleStatus::queenside(us), 0, &[1, 2, 3][..], [4, 3, 2])
    };

    if !pos.castle_status().contains(right) || from != Square::new(4, home).ok()? {
        return None;
    }

    let rook_square = Square::new(rook_file, home).ok()?;
    if board.get(rook_square) != Some(Piece::new(us, PieceKind::Rook)) {
        return None;
    }

    for &file in between {
        if !board.is_empty(Square::new(file, home).ok()?) {
            return None;
        }
    }

    // The king may not castle out of, through, or into check. Try the king on each square of its path.
    for file in path {
        let square = Square::new(file, home).ok()?;
        let mut scratch = board.clone();
        scratch.set(from, None);
        scratch.set(square, Some(king));
        if is_check(&scratch, us) {
            return None;
        }
    }

    Square::new(path[2], home).ok()
}

/// Returns whether or not the king of the given color is attacked on this board. A board without such a king is
/// never in check.
///
/// This generates pseudo-legal moves for every enemy piece and looks for one landing on the king. Legality is not
/// considered; a pinned piece still gives check.
pub fn is_check(board: &Board, color: Color) -> bool {
    let king = match board.king(color) {
        Some(king) => king,
        None => return false,
    };

    let mut destinations = Vec::new();
    for (square, piece) in board.pieces() {
        if piece.color == color {
            continue;
        }

        destinations.clear();
        generate_pseudolegal(board, square, None, &mut destinations);
        if destinations.contains(&king) {
            return true;
        }
    }

    false
}

/// Returns whether the pseudo-legal move `from` -> `to` leaves the mover's king safe. The move is played out on a
/// scratch copy of the board, including removal of a pawn captured en-passant.
fn is_legal_given_pseudolegal(
    board: &Board,
    from: Square,
    to: Square,
    en_passant: Option<Square>,
) -> bool {
    let piece = match board.get(from) {
        Some(piece) => piece,
        None => return false,
    };

    let mut scratch = board.clone();
    if let Some(victim) = en_passant_victim(board, from, to, en_passant) {
        scratch.set(victim, None);
    }

    scratch.set(from, None);
    scratch.set(to, Some(piece));
    !is_check(&scratch, piece.color)
}

/// Returns the legal destinations of the piece on `from`. The result is empty if `from` does not hold a piece of the
/// side to move.
pub fn legal_moves(pos: &Position, from: Square) -> Vec<Square> {
    let board = pos.board();
    let piece = match board.get(from) {
        Some(piece) if piece.color == pos.side_to_move() => piece,
        _ => return Vec::new(),
    };

    let mut moves = Vec::new();
    generate_pseudolegal(board, from, pos.en_passant_square(), &mut moves);
    if piece.kind == PieceKind::King {
        generate_castles(pos, from, &mut moves);
    }

    moves.retain(|&to| is_legal_given_pseudolegal(board, from, to, pos.en_passant_square()));
    moves
}

/// Generates every legal move for the side to move, in storage order of the moving pieces. Pawn moves onto the last
/// rank are expanded into one move per promotion piece.
pub fn generate_moves(pos: &Position, moves: &mut Vec<Move>) {
    let us = pos.side_to_move();
    for (from, piece) in pos.board().pieces() {
        if piece.color != us {
            continue;
        }

        for to in legal_moves(pos, from) {
            if piece.kind == PieceKind::Pawn && to.rank() == us.promotion_rank() {
                for kind in PROMOTION_KINDS {
                    moves.push(Move::promotion(from, to, kind));
                }
            } else {
                moves.push(Move::new(from, to));
            }
        }
    }
}

/// Returns whether or not the side to move has at least one legal move.
pub fn has_legal_moves(pos: &Position) -> bool {
    let us = pos.side_to_move();
    pos.board()
        .pieces()
        .filter(|&(_, piece)| piece.color == us)
        .any(|(from, _)| !legal_moves(pos, from).is_empty())
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::{generate_moves, generate_pseudolegal, is_check, legal_moves};
    use crate::core::*;
    use crate::Position;

    fn assert_moves_generated(fen: &'static str, from: Square, expected: &[Square]) {
        let pos = Position::from_fen(fen).unwrap();
        let moves = legal_moves(&pos, from);
        let generated: HashSet<_> = moves.iter().copied().collect();
        let expected_set: HashSet<_> = expected.iter().copied().collect();
        if generated != expected_set || moves.len() != expected.len() {
            println!("{}", pos);
            println!("generated: {:?}", moves);
            println!("expected:  {:?}", expected);
            panic!("move lists differ for {}", from);
        }
    }

    fn assert_moves_contains(fen: &'static str, from: Square, expected: &[Square]) {
        let pos = Position::from_fen(fen).unwrap();
        let moves = legal_moves(&pos, from);
        for sq in expected {
            if !moves.contains(sq) {
                println!("{}", pos);
                println!("moves: {:?}", moves);
                panic!("move {}{} was not generated", from, sq);
            }
        }
    }

    fn assert_moves_does_not_contain(fen: &'static str, from: Square, banned: &[Square]) {
        let pos = Position::from_fen(fen).unwrap();
        let moves = legal_moves(&pos, from);
        for sq in banned {
            if moves.contains(sq) {
                println!("{}", pos);
                panic!("move list contained banned move: {}{}", from, sq);
            }
        }
    }

    #[test]
    fn start_position_has_twenty_moves() {
        let pos = Position::from_start_position();
        let mut moves = Vec::new();
        generate_moves(&pos, &mut moves);
        assert_eq!(20, moves.len());
    }

    #[test]
    fn empty_or_enemy_square_has_no_moves() {
        let pos = Position::from_start_position();
        assert!(legal_moves(&pos, E4).is_empty());
        assert!(legal_moves(&pos, E7).is_empty());
    }

    mod pawns {
        use super::*;

        #[test]
        fn white_pawn_smoke_test() {
            assert_moves_generated("4k3/8/8/8/5P2/8/8/4K3 w - - 0 1", F4, &[F5]);
        }

        #[test]
        fn black_pawn_smoke_test() {
            assert_moves_generated("4k3/8/8/5p2/8/8/8/4K3 b - - 0 1", F5, &[F4]);
        }

        #[test]
        fn white_pawn_blocked() {
            assert_moves_generated("4k3/8/6p1/6P1/8/8/8/4K3 w - - 0 1", G5, &[]);
        }

        #[test]
        fn double_pawn_push_smoke() {
            assert_moves_generated("4k3/8/8/8/8/8/2P5/4K3 w - - 0 1", C2, &[C3, C4]);
            assert_moves_generated("4k3/2p5/8/8/8/8/8/4K3 b - - 0 1", C7, &[C6, C5]);
        }

        #[test]
        fn no_double_pawn_push_when_blocked() {
            assert_moves_generated("4k3/8/8/8/8/4p3/4P3/4K3 w - - 0 1", E2, &[]);
            assert_moves_generated("4k3/8/8/8/4p3/8/4P3/4K3 w - - 0 1", E2, &[E3]);
        }

        #[test]
        fn no_double_pawn_push_off_start_rank() {
            assert_moves_generated("4k3/8/8/8/8/4P3/8/4K3 w - - 0 1", E3, &[E4]);
        }

        #[test]
        fn captures() {
            assert_moves_generated(
                "4k3/8/8/8/8/3b1r2/4P3/4K3 w - - 0 1",
                E2,
                &[E3, E4, D3, F3],
            );
        }

        #[test]
        fn no_capture_of_own_pieces() {
            assert_moves_generated("4k3/8/8/8/8/3N1B2/4P3/4K3 w - - 0 1", E2, &[E3, E4]);
        }

        #[test]
        fn en_passant() {
            assert_moves_generated("4k3/8/8/3pP3/8/8/8/4K3 w - d6 0 1", E5, &[E6, D6]);
        }

        #[test]
        fn kiwipete_bug_1() {
            assert_moves_contains(
                "r3k2r/p1ppqpb1/bn2pnp1/3PN3/Pp2P3/2N2Q1p/1PPBBPPP/R3K2R b KQkq a3 0 1",
                B4,
                &[A3],
            );
        }

        #[test]
        fn illegal_en_passant() {
            // this can happen if we are sloppy about validating the legality
            // of EP-moves
            assert_moves_does_not_contain("4k3/8/4p3/8/8/8/5P2/4K3 w - e6 0 1", F2, &[E3]);
        }

        #[test]
        fn en_passant_exposing_king() {
            // capturing en-passant removes both pawns from the fifth rank and
            // opens the rook's line to the king.
            assert_moves_generated("4k3/8/8/K2pP2r/8/8/8/8 w - d6 0 1", E5, &[E6]);
        }

        #[test]
        fn promotion_moves_expand() {
            let pos = Position::from_fen("4k3/1P6/8/8/8/8/8/4K3 w - - 0 1").unwrap();
            let mut moves = Vec::new();
            generate_moves(&pos, &mut moves);
            let promos: Vec<_> = moves.into_iter().filter(|m| m.from == B7).collect();
            assert_eq!(
                vec![
                    Move::promotion(B7, B8, PieceKind::Queen),
                    Move::promotion(B7, B8, PieceKind::Rook),
                    Move::promotion(B7, B8, PieceKind::Bishop),
                    Move::promotion(B7, B8, PieceKind::Knight),
                ],
                promos
            );
        }
    }

    mod sliders {
        use super::*;

        #[test]
        fn bishop_smoke_test() {
            assert_moves_generated(
                "4k3/8/8/8/3B4/8/8/K7 w - - 0 1",
                D4,
                &[E5, F6, G7, H8, C3, B2, E3, F2, G1, C5, B6, A7],
            );
        }

        #[test]
        fn bishop_smoke_capture() {
            assert_moves_generated(
                "4k3/8/8/2p1p3/3B4/2p1p3/8/K7 w - - 0 1",
                D4,
                &[E5, C3, E3, C5],
            );
        }

        #[test]
        fn rook_blocked_by_own_piece() {
            assert_moves_generated(
                "4k3/8/8/8/8/8/P7/R3K3 w - - 0 1",
                A1,
                &[B1, C1, D1],
            );
        }

        #[test]
        fn queen_generation_order() {
            let pos = Position::from_fen("4k3/8/8/8/8/8/1P6/QN2K3 w - - 0 1").unwrap();
            assert_eq!(vec![A2, A3, A4, A5, A6, A7, A8], legal_moves(&pos, A1));
        }

        #[test]
        fn rook_pin() {
            let pos = Position::from_fen("4k3/8/4r3/8/8/4B3/4K3/8 w - - 0 1").unwrap();
            assert!(legal_moves(&pos, E3).is_empty());

            let pos = Position::from_fen("4k3/8/4r3/8/8/4B3/4K3/8 b - - 0 1").unwrap();
            assert!(legal_moves(&pos, E6).contains(&E3));
        }
    }

    mod steppers {
        use super::*;

        #[test]
        fn knight_in_corner() {
            assert_moves_generated("4k3/8/8/8/8/8/8/N3K3 w - - 0 1", A1, &[C2, B3]);
        }

        #[test]
        fn knight_jumps() {
            assert_moves_generated(
                "4k3/8/8/8/3N4/8/8/4K3 w - - 0 1",
                D4,
                &[F5, F3, B5, B3, E6, C6, E2, C2],
            );
        }

        #[test]
        fn king_avoids_attacked_squares() {
            assert_moves_generated("4k3/8/8/8/8/8/r7/4K3 w - - 0 1", E1, &[D1, F1]);
        }

        #[test]
        fn king_captures_unprotected() {
            assert_moves_generated("4k3/8/8/8/8/8/8/3rK3 w - - 0 1", E1, &[D1, E2, F2]);
            assert_moves_generated("4k3/8/8/8/8/8/8/r2rK3 w - - 0 1", E1, &[E2, F2]);
        }
    }

    mod castling {
        use super::*;

        #[test]
        fn both_sides() {
            assert_moves_contains("4k3/8/8/8/8/8/8/R3K2R w KQ - 0 1", E1, &[G1, C1]);
            assert_moves_contains("r3k2r/8/8/8/8/8/8/4K3 b kq - 0 1", E8, &[G8, C8]);
        }

        #[test]
        fn requires_rights() {
            assert_moves_does_not_contain("4k3/8/8/8/8/8/8/R3K2R w - - 0 1", E1, &[G1, C1]);
            assert_moves_does_not_contain("4k3/8/8/8/8/8/8/R3K2R w K - 0 1", E1, &[C1]);
        }

        #[test]
        fn blocked() {
            assert_moves_does_not_contain("4k3/8/8/8/8/8/8/R3KB1R w KQ - 0 1", E1, &[G1]);
            assert_moves_does_not_contain("4k3/8/8/8/8/8/8/RN2K2R w KQ - 0 1", E1, &[C1]);
        }

        #[test]
        fn through_check() {
            assert_moves_does_not_contain("4k3/8/8/8/8/8/5r2/R3K2R w KQ - 0 1", E1, &[G1]);
            assert_moves_does_not_contain("4k3/8/8/8/8/8/3r4/R3K2R w KQ - 0 1", E1, &[C1]);
        }

        #[test]
        fn out_of_check() {
            assert_moves_does_not_contain("4k3/8/8/8/8/8/4r3/R3K2R w KQ - 0 1", E1, &[G1, C1]);
        }

        #[test]
        fn into_check() {
            assert_moves_does_not_contain("4k3/8/8/8/8/8/6r1/R3K2R w KQ - 0 1", E1, &[G1]);
        }

        #[test]
        fn queenside_b_file_attack_is_fine() {
            assert_moves_contains("4k3/8/8/8/8/8/1r6/R3K3 w Q - 0 1", E1, &[C1]);
        }
    }

    mod check {
        use super::*;

        #[test]
        fn pawn_check() {
            let pos = Position::from_fen("4k3/8/8/8/8/8/3p4/4K3 w - - 0 1").unwrap();
            assert!(is_check(pos.board(), Color::White));
            assert!(!is_check(pos.board(), Color::Black));
        }

        #[test]
        fn pawn_push_does_not_check() {
            let pos = Position::from_fen("4k3/8/8/8/8/4p3/8/4K3 w - - 0 1").unwrap();
            assert!(!is_check(pos.board(), Color::White));
        }

        #[test]
        fn blocked_slider_does_not_check() {
            let pos = Position::from_fen("4k3/8/8/8/8/8/4N3/4r1K1 w - - 0 1").unwrap();
            assert!(is_check(pos.board(), Color::White));
            let pos = Position::from_fen("4k3/8/8/8/8/8/8/r3N1K1 w - - 0 1").unwrap();
            assert!(!is_check(pos.board(), Color::White));
        }

        #[test]
        fn pinned_piece_still_checks() {
            // the knight on d3 is pinned to its own king, but it still attacks e1.
            let pos = Position::from_fen("3k4/8/8/8/8/3n4/8/3RK3 w - - 0 1").unwrap();
            assert!(is_check(pos.board(), Color::White));
        }

        #[test]
        fn pseudolegal_ignores_pins() {
            let pos = Position::from_fen("4k3/8/4r3/8/8/4B3/4K3/8 w - - 0 1").unwrap();
            let mut moves = Vec::new();
            generate_pseudolegal(pos.board(), E3, None, &mut moves);
            assert!(moves.contains(&D4));
        }
    }
}
