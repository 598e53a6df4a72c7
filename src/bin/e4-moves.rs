// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use e4::{core::Move, movegen, GameStatus, Position};
use serde::Serialize;
use structopt::StructOpt;

/// Lists the legal moves of a position.
#[derive(Debug, StructOpt)]
struct Options {
    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,

    /// Print a JSON report instead of one move per line.
    #[structopt(long)]
    json: bool,
}

#[derive(Serialize)]
struct Report {
    fen: String,
    side_to_move: String,
    status: GameStatus,
    in_check: bool,
    moves: Vec<String>,
}

fn main() -> anyhow::Result<()> {
    let ops = Options::from_args();
    let pos = Position::from_fen(&ops.fen)?;
    let mut moves: Vec<Move> = Vec::new();
    movegen::generate_moves(&pos, &mut moves);
    if !ops.json {
        for mov in moves {
            println!("{}", mov.as_uci());
        }

        return Ok(());
    }

    let report = Report {
        fen: pos.as_fen(),
        side_to_move: pos.side_to_move().to_string(),
        status: pos.status(),
        in_check: pos.is_check(pos.side_to_move()),
        moves: moves.iter().map(|m| m.as_uci()).collect(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
