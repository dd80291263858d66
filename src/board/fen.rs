use super::fen_tables::{pc_index, CHAR_TO_PC, PC_TO_CHAR};
use super::{Board, Color, Piece, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ, EMPTY_SQ};
use crate::square::Square;
use crate::status::GameResult;

impl Board {
    /// Forsyth-Edwards notation for the current position.
    pub fn to_fen(&self) -> String {
        let mut fen = String::with_capacity(90);

        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let val = self.piece_on_sq[(rank * 8 + file) as usize];
                if val == EMPTY_SQ {
                    empty += 1;
                } else {
                    if empty > 0 {
                        fen.push((b'0' + empty) as char);
                        empty = 0;
                    }
                    let piece = Piece::from_u8(val & 0b111);
                    let color = Color::from_u8((val >> 3) & 1);
                    fen.push(PC_TO_CHAR[pc_index(piece, color)]);
                }
            }
            if empty > 0 {
                fen.push((b'0' + empty) as char);
            }
            if rank != 0 {
                fen.push('/');
            }
        }

        fen.push(' ');
        fen.push(match self.side_to_move {
            Color::White => 'w',
            Color::Black => 'b',
        });

        fen.push(' ');
        if self.castling_rights == 0 {
            fen.push('-');
        } else {
            if self.has_castling(CASTLE_WK) {
                fen.push('K');
            }
            if self.has_castling(CASTLE_WQ) {
                fen.push('Q');
            }
            if self.has_castling(CASTLE_BK) {
                fen.push('k');
            }
            if self.has_castling(CASTLE_BQ) {
                fen.push('q');
            }
        }

        fen.push(' ');
        match self.en_passant {
            Some(sq) => fen.push_str(&sq.to_string()),
            None => fen.push('-'),
        }

        fen.push(' ');
        fen.push_str(&self.halfmove_clock.to_string());
        fen.push(' ');
        fen.push_str(&self.fullmove_number.to_string());

        fen
    }

    /// The 8x8 glyph grid; row 0 is rank 1 (White's back rank), `.` = empty.
    pub fn position_grid(&self) -> [[char; 8]; 8] {
        let mut grid = [['.'; 8]; 8];
        for rank in 0..8 {
            for file in 0..8 {
                let val = self.piece_on_sq[rank * 8 + file];
                if val != EMPTY_SQ {
                    let piece = Piece::from_u8(val & 0b111);
                    let color = Color::from_u8((val >> 3) & 1);
                    grid[rank][file] = PC_TO_CHAR[pc_index(piece, color)];
                }
            }
        }
        grid
    }

    /// Load a position from a FEN string, replacing all prior state.
    ///
    /// The loaded position is seeded into the repetition table with one
    /// occurrence, and the game is considered in progress.
    pub fn set_fen(&mut self, fen: &str) -> Result<(), String> {
        let fields: Vec<&str> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(format!("FEN must have 6 fields, got {}: {}", fields.len(), fen));
        }

        let mut board = Board::new_empty();

        // 1) Piece placement, rank 8 down to rank 1.
        let ranks: Vec<&str> = fields[0].split('/').collect();
        if ranks.len() != 8 {
            return Err(format!("FEN placement must have 8 ranks: {}", fields[0]));
        }
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i as u8;
            let mut file = 0u8;
            for c in rank_str.chars() {
                if let Some(skip) = c.to_digit(10) {
                    if skip == 0 || skip > 8 {
                        return Err(format!("invalid empty-square count in FEN: {}", c));
                    }
                    file += skip as u8;
                } else {
                    let (piece, color) = CHAR_TO_PC
                        .get(c as usize)
                        .copied()
                        .flatten()
                        .ok_or_else(|| format!("invalid piece glyph in FEN: {}", c))?;
                    if file > 7 {
                        return Err(format!("rank overflow in FEN rank: {}", rank_str));
                    }
                    let sq = Square::from_coords(rank, file);
                    board.set_bb(color, piece, board.bb(color, piece) | sq.bb());
                    file += 1;
                }
            }
            if file != 8 {
                return Err(format!("rank {} does not describe 8 files: {}", rank + 1, rank_str));
            }
        }

        if board.pieces(Piece::King, Color::White).count_ones() != 1
            || board.pieces(Piece::King, Color::Black).count_ones() != 1
        {
            return Err("FEN must place exactly one king per side".to_string());
        }

        // 2) Side to move.
        board.side_to_move = match fields[1] {
            "w" => Color::White,
            "b" => Color::Black,
            other => return Err(format!("invalid side-to-move field: {}", other)),
        };

        // 3) Castling rights.
        if fields[2] != "-" {
            for c in fields[2].chars() {
                board.castling_rights |= match c {
                    'K' => CASTLE_WK,
                    'Q' => CASTLE_WQ,
                    'k' => CASTLE_BK,
                    'q' => CASTLE_BQ,
                    other => return Err(format!("invalid castling field char: {}", other)),
                };
            }
        }

        // 4) En passant target.
        board.en_passant = match fields[3] {
            "-" => None,
            sq => {
                let square: Square = sq.parse()?;
                if square.rank() != 2 && square.rank() != 5 {
                    return Err(format!("en passant square on impossible rank: {}", sq));
                }
                Some(square)
            }
        };

        // 5) + 6) Clocks.
        board.halfmove_clock = fields[4]
            .parse()
            .map_err(|_| format!("invalid halfmove clock: {}", fields[4]))?;
        board.fullmove_number = fields[5]
            .parse()
            .map_err(|_| format!("invalid fullmove number: {}", fields[5]))?;
        if board.fullmove_number == 0 {
            return Err("fullmove number starts at 1".to_string());
        }
        board.ply = (board.fullmove_number - 1) * 2
            + if board.side_to_move == Color::Black { 1 } else { 0 };

        board.game_result = GameResult::InProgress;
        board.refresh_zobrist();
        board.position_freq.insert(board.zobrist, 1);

        *self = board;
        Ok(())
    }
}
