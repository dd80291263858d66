// src/status.rs
//
// Terminal-state adjudication, run once after every applied move.

use crate::bitboard::BitboardExt;
use crate::board::{Board, Color, Piece};
use crate::moves::attacks::{attacks_of_color, can_any_piece_move, AttackScope};
use crate::moves::tables::AttackTables;
use crate::square::Square;
use arrayvec::ArrayVec;
use serde::{Deserialize, Serialize};

/// How the last applied move affected the opponent king.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckType {
    NoCheck,
    DirectCheck,
    DiscoveryCheck,
    DoubleCheck,
}

/// Terminal state of a game. Anything but `InProgress` is sticky: once
/// set, every further move attempt fails with `GameOver`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    InProgress,
    WhiteWinsCheckmate,
    BlackWinsCheckmate,
    Stalemate,
    DrawByRepetition,
    DrawByInsufficientMaterial,
    DrawByFiftyMove,
}

impl GameResult {
    #[inline(always)]
    pub fn is_terminal(self) -> bool {
        self != GameResult::InProgress
    }

    #[inline(always)]
    pub fn is_draw(self) -> bool {
        matches!(
            self,
            GameResult::Stalemate
                | GameResult::DrawByRepetition
                | GameResult::DrawByInsufficientMaterial
                | GameResult::DrawByFiftyMove
        )
    }
}

/// Decide whether the position reached by `mover`'s last move ends the
/// game, and record the verdict on the board.
///
/// Expects the post-move state: side flipped, hash refreshed, repetition
/// table incremented, check squares recorded.
pub fn adjudicate(board: &mut Board, check: CheckType, mover: Color, tables: &AttackTables) {
    if board.position_freq.get(&board.zobrist) == Some(&3) {
        board.game_result = GameResult::DrawByRepetition;
        return;
    }

    let defender = mover.opposite();

    if check == CheckType::NoCheck {
        if insufficient_material(board) {
            board.game_result = GameResult::DrawByInsufficientMaterial;
            return;
        }
        if !king_has_escape(board, mover, check, tables)
            && !can_any_piece_move(defender, board, tables)
        {
            board.game_result = GameResult::Stalemate;
            return;
        }
        if board.halfmove_clock == 100 {
            board.game_result = GameResult::DrawByFiftyMove;
        }
        return;
    }

    // The defender is in check.
    if king_has_escape(board, mover, check, tables) {
        if board.halfmove_clock == 100 {
            board.game_result = GameResult::DrawByFiftyMove;
        }
        return;
    }

    let mate = if check == CheckType::DoubleCheck {
        // Only a king move answers a double check, and there is none.
        true
    } else {
        let checker = match check {
            CheckType::DirectCheck => board.direct_check_square,
            CheckType::DiscoveryCheck => board.discovery_check_square,
            _ => unreachable!(),
        }
        .expect("check reported without a checker square");
        let checker_kind = board
            .piece_type_at(checker)
            .expect("checker square is empty");

        let defense = attacks_of_color(
            defender,
            AttackScope {
                obey_pins: true,
                include_king: false,
                pawn_pushes: true,
            },
            board,
            tables,
        );

        if checker_kind == Piece::Knight {
            // A knight check cannot be interposed against.
            defense & checker.bb() == 0
        } else {
            // Capture the checker or interpose anywhere between it and
            // the king. For an adjacent checker the mask degenerates to
            // the capture alone.
            let king = board.king_square(defender);
            let block_or_capture = tables.range_mask(king.index(), checker.index()) & !king.bb();
            defense & block_or_capture == 0
        }
    };

    if mate {
        board.game_result = match mover {
            Color::White => GameResult::WhiteWinsCheckmate,
            Color::Black => GameResult::BlackWinsCheckmate,
        };
        return;
    }

    if board.halfmove_clock == 100 {
        board.game_result = GameResult::DrawByFiftyMove;
    }
}

/// Can the defender king step (or capture) its way out?
fn king_has_escape(board: &Board, mover: Color, check: CheckType, tables: &AttackTables) -> bool {
    let defender = mover.opposite();
    let king = board.king_square(defender);
    let own = board.occupancy(defender);

    let attacked = attacks_of_color(
        mover,
        AttackScope {
            obey_pins: false,
            include_king: true,
            pawn_pushes: false,
        },
        board,
        tables,
    );

    // Squares the king could in principle go to.
    let candidates: ArrayVec<Square, 8> = tables.king[king.index() as usize]
        .squares()
        .filter(|esc| !own.is_set(esc.index()) && !attacked.is_set(esc.index()))
        .collect();
    if candidates.is_empty() {
        return false;
    }
    if check == CheckType::NoCheck {
        return true;
    }

    let direct = match check {
        CheckType::DirectCheck | CheckType::DoubleCheck => board.direct_check_square,
        _ => None,
    };
    let discovery = match check {
        CheckType::DiscoveryCheck | CheckType::DoubleCheck => board.discovery_check_square,
        _ => None,
    };

    // A slider's attack set stops at the king, so squares behind the king
    // on the checking ray look safe in `attacked`; rule them out here.
    // The checker's own square lies on its ray and is vetoed with the rest.
    candidates.into_iter().any(|esc| {
        if let Some(c) = direct {
            if slider_ray_covers(c, king, esc, board) {
                return false;
            }
        }
        if let Some(c) = discovery {
            if slider_ray_covers(c, king, esc, board) {
                return false;
            }
        }
        true
    })
}

/// Does the slider on `checker` keep `escape` on its checking line
/// through `king`? False for non-sliders.
fn slider_ray_covers(checker: Square, king: Square, escape: Square, board: &Board) -> bool {
    match board.piece_type_at(checker) {
        Some(Piece::Bishop | Piece::Rook | Piece::Queen) => {}
        _ => return false,
    }

    let (r1, f1) = (checker.rank() as i8, checker.file() as i8);
    let (r2, f2) = (king.rank() as i8, king.file() as i8);
    let (r3, f3) = (escape.rank() as i8, escape.file() as i8);

    (r1 == r2 && r2 == r3)
        || (f1 == f2 && f2 == f3)
        || ((r1 - r2).abs() == (f1 - f2).abs() && (r1 - r3).abs() == (f1 - f3).abs())
}

/// Dead-position test: neither side can ever deliver mate.
pub fn insufficient_material(board: &Board) -> bool {
    // Any pawn, rook or queen means mating material exists.
    let heavy = board.bb(Color::White, Piece::Pawn)
        | board.bb(Color::Black, Piece::Pawn)
        | board.bb(Color::White, Piece::Rook)
        | board.bb(Color::Black, Piece::Rook)
        | board.bb(Color::White, Piece::Queen)
        | board.bb(Color::Black, Piece::Queen);
    if heavy != 0 {
        return false;
    }

    let wb = board.bb(Color::White, Piece::Bishop);
    let bb = board.bb(Color::Black, Piece::Bishop);
    let wn = board.bb(Color::White, Piece::Knight).count_ones();
    let bn = board.bb(Color::Black, Piece::Knight).count_ones();
    let w_minors = wb.count_ones() + wn;
    let b_minors = bb.count_ones() + bn;

    // K vs K, or one lone minor against a bare king.
    if (w_minors <= 1 && b_minors == 0) || (b_minors <= 1 && w_minors == 0) {
        return true;
    }

    // One bishop each on same-colored squares.
    if wn == 0 && bn == 0 && wb.count_ones() == 1 && bb.count_ones() == 1 {
        let shade = |sq: Square| (sq.rank() + sq.file()) & 1;
        let w_sq = wb.lsb_square().expect("bishop bitboard is empty");
        let b_sq = bb.lsb_square().expect("bishop bitboard is empty");
        if shade(w_sq) == shade(b_sq) {
            return true;
        }
    }

    false
}
