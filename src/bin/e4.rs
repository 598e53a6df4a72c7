// Copyright 2021-2022 Sean Gillespie.
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

use std::io;

use e4::{protocol, Game};
use structopt::StructOpt;
use tracing_subscriber::{filter::LevelFilter, EnvFilter, FmtSubscriber};

/// Plays a game over standard input and output, one move per line.
#[derive(Debug, StructOpt)]
struct Options {
    /// FEN of the position to start from, instead of the standard starting position.
    #[structopt(long)]
    fen: Option<String>,
}

fn main() -> anyhow::Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(LevelFilter::WARN)
        .with_env_filter(EnvFilter::from_env("E4_LOG"))
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let ops = Options::from_args();
    let game = match ops.fen {
        Some(fen) => Game::from_fen(fen)?,
        None => Game::new(),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    protocol::run(game, stdin.lock(), stdout.lock())?;
    Ok(())
}
