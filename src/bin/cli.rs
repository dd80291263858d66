// Line-oriented driver: reads coordinate moves from stdin, reports each
// outcome, and prints the FEN plus final result on demand or at the end.

use arbiter::logger::init_logging;
use arbiter::{Color, Game, GameResult};
use std::io::{self, BufRead};
use tracing::info;

fn main() {
    init_logging("logs/arbiter.log", "arbiter=info");

    let mut game = match parse_args() {
        Ok(game) => game,
        Err(msg) => {
            eprintln!("{}", msg);
            std::process::exit(2);
        }
    };

    info!(fen = %game.fen(), "session started");

    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l.trim().to_string(),
            Err(_) => break,
        };
        if line.is_empty() {
            continue;
        }

        for token in line.split_whitespace() {
            match token {
                "quit" => {
                    print_summary(&game);
                    return;
                }
                "fen" => println!("{}", game.fen()),
                "d" | "display" => print_board(&game),
                mv => match game.apply_uci(mv) {
                    Ok(outcome) => {
                        println!("ok {} {:?}", mv, outcome.check);
                        if outcome.result.is_terminal() {
                            print_summary(&game);
                            return;
                        }
                    }
                    Err(e) => println!("error: {}", e),
                },
            }
        }
    }

    print_summary(&game);
}

fn parse_args() -> Result<Game, String> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.as_slice() {
        [] => Ok(Game::new()),
        [flag, fen] if flag == "--fen" => Game::from_fen(fen),
        _ => Err("usage: arbiter [--fen \"<FEN>\"]".to_string()),
    }
}

fn print_board(game: &Game) {
    let grid = game.position();
    for rank in (0..8).rev() {
        let row: String = grid[rank]
            .iter()
            .map(|c| format!("{} ", c))
            .collect::<String>();
        println!("{} {}", rank + 1, row.trim_end());
    }
    println!("  a b c d e f g h");
}

fn print_summary(game: &Game) {
    println!("{}", game.fen());
    match game.game_result() {
        GameResult::InProgress => {
            let side = if game.is_in_check(Color::White) || game.is_in_check(Color::Black) {
                " (check)"
            } else {
                ""
            };
            println!("result: in progress{}", side);
        }
        result => println!("result: {:?}", result),
    }
    if !game.history().is_empty() {
        println!("moves: {}", game.history());
    }
}
