// src/game.rs
//
// The public facade. Callers speak files and ranks; everything below the
// facade works on squares and bitboards.

use crate::board::{Board, Color, Piece};
use crate::error::MoveError;
use crate::moves::attacks::in_check;
use crate::moves::execute::{apply_move, apply_promotion, MoveOutcome};
use crate::moves::tables::tables;
use crate::square::Square;
use crate::status::GameResult;

/// One chess game, validated move by move from the initial position (or
/// a loaded FEN) until a terminal result.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    history: String,
}

impl Game {
    /// A fresh game from the standard starting position.
    pub fn new() -> Self {
        Game {
            board: Board::new(),
            history: String::new(),
        }
    }

    /// Start from an arbitrary position.
    pub fn from_fen(fen: &str) -> Result<Self, String> {
        let mut board = Board::new_empty();
        board.set_fen(fen)?;
        Ok(Game {
            board,
            history: String::new(),
        })
    }

    /// Play a whole game from a whitespace-separated coordinate move
    /// list, e.g. `"e2e4 e7e5 g1f3"`. Promotions carry a trailing piece
    /// letter (`e7e8q`). Fails on the first illegal or malformed move,
    /// reporting its ply.
    pub fn from_moves(moves: &str) -> Result<Self, MoveError> {
        let mut game = Game::new();
        for token in moves.split_whitespace() {
            game.apply_uci(token)?;
        }
        Ok(game)
    }

    /// Apply one move given as files `a..h` and ranks `1..8`.
    pub fn apply_move(
        &mut self,
        from_file: char,
        from_rank: u8,
        to_file: char,
        to_rank: u8,
    ) -> Result<MoveOutcome, MoveError> {
        let (from, to) = self.squares(from_file, from_rank, to_file, to_rank)?;
        let outcome = apply_move(&mut self.board, from, to)?;
        self.push_history(&format!("{}{}", from, to));
        Ok(outcome)
    }

    /// Apply a promotion; `promotion` is one of `q`, `r`, `b`, `n`.
    pub fn apply_promotion(
        &mut self,
        from_file: char,
        from_rank: u8,
        to_file: char,
        to_rank: u8,
        promotion: char,
    ) -> Result<MoveOutcome, MoveError> {
        let (from, to) = self.squares(from_file, from_rank, to_file, to_rank)?;
        let piece = Piece::from_promotion_char(promotion).ok_or(MoveError::InvalidPromotion {
            mv: format!("{}{}{}", from, to, promotion),
            ply: self.board.ply + 1,
        })?;
        let outcome = apply_promotion(&mut self.board, from, to, piece)?;
        self.push_history(&format!("{}{}{}", from, to, promotion));
        Ok(outcome)
    }

    /// Apply one coordinate-notation token: `e2e4` or `e7e8q`.
    pub fn apply_uci(&mut self, token: &str) -> Result<MoveOutcome, MoveError> {
        let chars: Vec<char> = token.chars().collect();
        match chars.len() {
            4 | 5 => {
                let from_file = chars[0];
                let from_rank = (chars[1] as u8).wrapping_sub(b'0');
                let to_file = chars[2];
                let to_rank = (chars[3] as u8).wrapping_sub(b'0');
                if chars.len() == 4 {
                    self.apply_move(from_file, from_rank, to_file, to_rank)
                } else {
                    self.apply_promotion(from_file, from_rank, to_file, to_rank, chars[4])
                }
            }
            _ => Err(MoveError::InvalidPattern {
                mv: token.to_string(),
                ply: self.board.ply + 1,
            }),
        }
    }

    /// 8x8 glyph grid; row 0 is rank 1 (White's back rank), `.` = empty.
    pub fn position(&self) -> [[char; 8]; 8] {
        self.board.position_grid()
    }

    pub fn fen(&self) -> String {
        self.board.to_fen()
    }

    pub fn game_result(&self) -> GameResult {
        self.board.game_result
    }

    pub fn is_in_check(&self, color: Color) -> bool {
        in_check(color, &self.board, tables())
    }

    /// Is `color` the side that has been checkmated?
    pub fn is_checkmate(&self, color: Color) -> bool {
        match self.board.game_result {
            GameResult::WhiteWinsCheckmate => color == Color::Black,
            GameResult::BlackWinsCheckmate => color == Color::White,
            _ => false,
        }
    }

    pub fn is_stalemate(&self) -> bool {
        self.board.game_result == GameResult::Stalemate
    }

    pub fn is_draw_by_repetition(&self) -> bool {
        self.board.game_result == GameResult::DrawByRepetition
    }

    pub fn is_draw_by_50_move(&self) -> bool {
        self.board.game_result == GameResult::DrawByFiftyMove
    }

    pub fn is_draw_by_insufficient_material(&self) -> bool {
        self.board.game_result == GameResult::DrawByInsufficientMaterial
    }

    /// The accepted moves so far, space separated, in the notation they
    /// were supplied in.
    pub fn history(&self) -> &str {
        &self.history
    }

    /// Read-only view of the underlying position record.
    pub fn board(&self) -> &Board {
        &self.board
    }

    fn squares(
        &self,
        from_file: char,
        from_rank: u8,
        to_file: char,
        to_rank: u8,
    ) -> Result<(Square, Square), MoveError> {
        let err = || MoveError::InvalidPattern {
            mv: format!("{}{}{}{}", from_file, from_rank, to_file, to_rank),
            ply: self.board.ply + 1,
        };
        let from = Square::from_file_rank(from_file, from_rank).ok_or_else(err)?;
        let to = Square::from_file_rank(to_file, to_rank).ok_or_else(err)?;
        Ok((from, to))
    }

    fn push_history(&mut self, token: &str) {
        if !self.history.is_empty() {
            self.history.push(' ');
        }
        self.history.push_str(token);
    }
}

impl Default for Game {
    fn default() -> Self {
        Game::new()
    }
}
