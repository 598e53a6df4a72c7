// Copyright 2017-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! The `e4` chess rules engine.
//!
//! `e4` knows the rules of chess and nothing else: it tracks positions, decides which moves are legal, plays them,
//! and notices when a game is over. Positions are read and written as FEN. A `Game` adds a navigable history on top
//! of a `Position`, and the `protocol` module plays a game over any line-oriented text stream.

pub mod board;
pub mod core;
pub mod game;
pub mod history;
pub mod movegen;
pub mod position;
pub mod protocol;

pub use crate::game::Game;
pub use crate::position::{FenParseError, GameStatus, IllegalMoveError, Position};
