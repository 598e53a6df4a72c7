// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::time::Instant;

use e4::Position;
use structopt::StructOpt;

/// Counts the move paths of a position to a fixed depth.
#[derive(Debug, StructOpt)]
struct Options {
    /// The depth to enumerate to.
    #[structopt(short, long)]
    depth: u32,

    /// Print the count below each root move as well as the total.
    #[structopt(long)]
    divide: bool,

    /// FEN representation of the position to analyze.
    #[structopt(name = "FEN")]
    fen: String,
}

fn main() -> anyhow::Result<()> {
    let ops = Options::from_args();
    let pos = Position::from_fen(&ops.fen)?;
    let start = Instant::now();
    let count = if ops.divide {
        let mut total = 0;
        for (mov, nodes) in pos.divide(ops.depth) {
            println!("{}: {}", mov.as_uci(), nodes);
            total += nodes;
        }
        println!();
        total
    } else {
        pos.perft(ops.depth)
    };

    println!("{}", count);
    eprintln!("{:.3}s", start.elapsed().as_secs_f64());
    Ok(())
}
