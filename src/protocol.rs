// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! A line-oriented session for playing a game over a text stream.
//!
//! The peer sends one move per line in UCI notation (`e2e4`, `e7e8q`), optionally prefixed by the color sending it
//! (`white e2e4`). Every accepted move is answered with the FEN of the resulting position; anything that is refused
//! is answered with the literal `ERROR`. A handful of commands inspect or navigate the game:
//!
//! * `fen` replies with the current FEN,
//! * `status` replies with the current game status,
//! * `back` and `forward` step through the history and reply with the FEN reached,
//! * `new` restarts from the session's initial position,
//! * `quit` ends the session.

use std::{
    fmt,
    io::{self, BufRead, Write},
};

use anyhow::anyhow;
use tracing::{debug, info, warn};

use crate::{
    core::{Color, Move},
    game::Game,
    position::{GameStatus, Position},
};

/// A single line sent back to the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reply {
    Fen(String),
    Status(GameStatus),
    Error,
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Reply::Fen(fen) => write!(f, "{}", fen),
            Reply::Status(status) => write!(f, "{}", status),
            Reply::Error => write!(f, "ERROR"),
        }
    }
}

/// One game being played over the protocol.
pub struct Session {
    game: Game,
    initial: Position,
}

impl Session {
    pub fn new(game: Game) -> Session {
        let initial = game
            .history()
            .get(0)
            .map(|node| node.position.clone())
            .unwrap_or_else(|| game.position().clone());
        Session { game, initial }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Handles one line of input, returning the reply to send, if any. Blank lines and `quit` produce no reply.
    pub fn handle_line(&mut self, line: &str) -> Option<Reply> {
        let components: Vec<_> = line.split_whitespace().collect();
        let (&command, arguments) = components.split_first()?;
        let reply = match (command, arguments) {
            ("quit", []) => return None,
            ("fen", []) => Reply::Fen(self.game.as_fen()),
            ("status", []) => Reply::Status(self.game.status()),
            ("back", []) => self.navigate(Game::retreat),
            ("forward", []) => self.navigate(Game::advance),
            ("new", []) => {
                info!("restarting game");
                self.game = Game::from_position(self.initial.clone());
                Reply::Fen(self.game.as_fen())
            }
            ("white", [mov]) => self.handle_move(Some(Color::White), mov),
            ("black", [mov]) => self.handle_move(Some(Color::Black), mov),
            (mov, []) => self.handle_move(None, mov),
            _ => {
                warn!("unrecognized command: {} {:?}", command, arguments);
                Reply::Error
            }
        };

        Some(reply)
    }

    fn navigate(&mut self, step: fn(&mut Game) -> Option<&Position>) -> Reply {
        if step(&mut self.game).is_some() {
            debug!("moved to history node {}", self.game.history().cursor());
            Reply::Fen(self.game.as_fen())
        } else {
            debug!("no history in that direction");
            Reply::Error
        }
    }

    fn handle_move(&mut self, sender: Option<Color>, text: &str) -> Reply {
        match self.try_move(sender, text) {
            Ok(status) => {
                info!("accepted move {} ({})", text, status);
                Reply::Fen(self.game.as_fen())
            }
            Err(e) => {
                warn!("rejected move {}: {}", text, e);
                Reply::Error
            }
        }
    }

    fn try_move(&mut self, sender: Option<Color>, text: &str) -> anyhow::Result<GameStatus> {
        let mov = Move::from_uci(text)?;
        if let Some(color) = sender {
            if color != self.game.side_to_move() {
                return Err(anyhow!("{} is not on move", color));
            }
        }

        Ok(self.game.make_move(mov)?)
    }
}

/// Runs a session to completion: sends the FEN of the starting position, then answers each line of `input` until
/// `quit` or end of input.
pub fn run<R: BufRead, W: Write>(game: Game, input: R, mut output: W) -> io::Result<()> {
    let mut session = Session::new(game);
    info!("session started from {}", session.game().as_fen());
    writeln!(output, "{}", session.game().as_fen())?;
    output.flush()?;
    for maybe_line in input.lines() {
        let line = maybe_line?;
        if line.trim() == "quit" {
            info!("peer quit");
            break;
        }

        if let Some(reply) = session.handle_line(&line) {
            writeln!(output, "{}", reply)?;
            output.flush()?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{run, Reply, Session};
    use crate::{game::Game, position::GameStatus};

    fn transcript(input: &str) -> Vec<String> {
        let mut output = Vec::new();
        run(Game::new(), input.as_bytes(), &mut output).unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect()
    }

    mod session {
        use super::{Reply, Session};
        use crate::{game::Game, position::GameStatus};

        #[test]
        fn move_replies_with_fen() {
            let mut session = Session::new(Game::new());
            assert_eq!(
                Some(Reply::Fen(
                    "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1".to_owned()
                )),
                session.handle_line("e2e4")
            );
        }

        #[test]
        fn rejections() {
            let mut session = Session::new(Game::new());
            for line in ["e2e5", "e7e5", "e2", "z9z9", "e2e4 e7e5", "hello there", "black e2e4"] {
                assert_eq!(Some(Reply::Error), session.handle_line(line), "{}", line);
            }
            assert_eq!(Game::new().as_fen(), session.game().as_fen());
        }

        #[test]
        fn colored_moves() {
            let mut session = Session::new(Game::new());
            assert!(matches!(session.handle_line("white e2e4"), Some(Reply::Fen(_))));
            assert_eq!(Some(Reply::Error), session.handle_line("white e7e5"));
            assert!(matches!(session.handle_line("black e7e5"), Some(Reply::Fen(_))));
        }

        #[test]
        fn blank_lines_ignored() {
            let mut session = Session::new(Game::new());
            assert_eq!(None, session.handle_line(""));
            assert_eq!(None, session.handle_line("   "));
        }

        #[test]
        fn navigation() {
            let mut session = Session::new(Game::new());
            let start = session.game().as_fen();
            assert_eq!(Some(Reply::Error), session.handle_line("back"));
            session.handle_line("e2e4");
            let after = session.game().as_fen();

            assert_eq!(Some(Reply::Fen(start)), session.handle_line("back"));
            assert_eq!(Some(Reply::Fen(after)), session.handle_line("forward"));
            assert_eq!(Some(Reply::Error), session.handle_line("forward"));
        }

        #[test]
        fn new_restarts_from_initial_position() {
            let fen = "4k3/8/8/8/8/8/4P3/4K3 w - - 0 1";
            let mut session = Session::new(Game::from_fen(fen).unwrap());
            session.handle_line("e2e4");
            assert_eq!(Some(Reply::Fen(fen.to_owned())), session.handle_line("new"));
            assert!(!session.game().has_prev());
        }

        #[test]
        fn status() {
            let mut session = Session::new(Game::new());
            assert_eq!(
                Some(Reply::Status(GameStatus::Ongoing)),
                session.handle_line("status")
            );
            for mov in ["f2f3", "e7e5", "g2g4", "d8h4"] {
                session.handle_line(mov);
            }
            assert_eq!(
                Some(Reply::Status(GameStatus::Checkmate)),
                session.handle_line("status")
            );
            assert_eq!(Some(Reply::Error), session.handle_line("e1f2"));
        }
    }

    #[test]
    fn reply_display() {
        assert_eq!("ERROR", Reply::Error.to_string());
        assert_eq!("checkmate", Reply::Status(GameStatus::Checkmate).to_string());
        assert_eq!(
            "8/8/8/8/8/8/8/8 w - - 0 1",
            Reply::Fen("8/8/8/8/8/8/8/8 w - - 0 1".to_owned()).to_string()
        );
    }

    #[test]
    fn full_session() {
        let lines = transcript("e2e4\n\nfoo\nfen\nblack e7e5\nquit\ne2e4\n");
        assert_eq!(
            vec![
                "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1",
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
                "ERROR",
                "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1",
                "rnbqkbnr/pppp1ppp/8/4p3/4P3/8/PPPP1PPP/RNBQKBNR w KQkq e6 0 2",
            ],
            lines
        );
    }

    #[test]
    fn session_ends_with_input() {
        let lines = transcript("d2d4\n");
        assert_eq!(2, lines.len());
        assert_eq!(
            Some(&"rnbqkbnr/pppppppp/8/8/3P4/8/PPP1PPPP/RNBQKBNR b KQkq d3 0 1".to_owned()),
            lines.last()
        );
    }

    #[test]
    fn new_session_per_game() {
        let mut a = Session::new(Game::new());
        let b = Session::new(Game::new());
        a.handle_line("e2e4");
        assert_ne!(a.game().as_fen(), b.game().as_fen());
    }
}
