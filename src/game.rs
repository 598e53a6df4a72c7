// Copyright 2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use crate::{
    core::{Color, Move, Square},
    history::HistoryLog,
    position::{FenParseError, GameStatus, IllegalMoveError, Position},
};

/// A game in progress: the current position plus every position that led to it. Unlike a `Position`, a `Game` knows
/// enough about its past to detect repetitions and to step backwards and forwards through the moves played.
#[derive(Clone, Debug)]
pub struct Game {
    /// Always equal to the position under the history cursor.
    position: Position,
    history: HistoryLog,
}

impl Game {
    /// A new game from the standard starting position.
    pub fn new() -> Game {
        Game::from_position(Position::from_start_position())
    }

    pub fn from_fen(fen: impl AsRef<str>) -> Result<Game, FenParseError> {
        Position::from_fen(fen).map(Game::from_position)
    }

    pub fn from_position(position: Position) -> Game {
        Game {
            history: HistoryLog::new(position.clone()),
            position,
        }
    }

    pub fn position(&self) -> &Position {
        &self.position
    }

    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        self.position.status()
    }

    pub fn side_to_move(&self) -> Color {
        self.position.side_to_move()
    }

    pub fn as_fen(&self) -> String {
        self.position.as_fen()
    }

    pub fn legal_moves(&self, from: Square) -> Vec<Square> {
        self.position.legal_moves(from)
    }

    pub fn is_check(&self, color: Color) -> bool {
        self.position.is_check(color)
    }

    /// Plays a move on the current position and records the result. A position reached for the third time along the
    /// current line of play ends the game as a draw, unless the move already ended it some other way.
    ///
    /// If the cursor is not at the newest position, the moves after the cursor are forgotten.
    pub fn make_move(&mut self, mov: Move) -> Result<GameStatus, IllegalMoveError> {
        let mut status = self.position.make_move(mov)?;
        let seen = self
            .history
            .repetition_count(&self.position.repetition_key());
        if status == GameStatus::Ongoing && seen + 1 >= 3 {
            status = GameStatus::DrawByRepetition;
            self.position.set_status(status);
        }

        self.history.record(self.position.clone(), mov);
        Ok(status)
    }

    /// Moves one position forward in the history and returns the position reached, or `None` if already at the
    /// newest position.
    pub fn advance(&mut self) -> Option<&Position> {
        self.position = self.history.advance()?.clone();
        Some(&self.position)
    }

    /// Moves one position back in the history and returns the position reached, or `None` if already at the initial
    /// position.
    pub fn retreat(&mut self) -> Option<&Position> {
        self.position = self.history.retreat()?.clone();
        Some(&self.position)
    }

    pub fn has_next(&self) -> bool {
        self.history.has_next()
    }

    pub fn has_prev(&self) -> bool {
        self.history.has_prev()
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
