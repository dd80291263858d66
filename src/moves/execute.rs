// src/moves/execute.rs
//
// Move validation and state mutation. Every handler validates the piece's
// movement pattern and path, applies the move tentatively to the boards,
// rolls back if the mover's own king would be attacked, and only then
// commits the side effects (en passant, castling rights, clocks, hash,
// repetition table, check typing, adjudication).

use crate::board::{Board, Color, Piece, CASTLE_BK, CASTLE_BQ, CASTLE_WK, CASTLE_WQ};
use crate::error::MoveError;
use crate::moves::attacks::{attacks_from, attacks_of_color, in_check, AttackScope};
use crate::moves::pins::{scan_pin, PinDirection};
use crate::moves::tables::{tables, AttackTables};
use crate::square::Square;
use crate::status::{adjudicate, CheckType, GameResult};
use tracing::debug;

/// What a successfully applied move produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveOutcome {
    pub check: CheckType,
    pub result: GameResult,
}

/// Attempt context for error reporting: the move text and the 1-based ply.
struct MoveCtx {
    from: Square,
    to: Square,
    promotion: Option<Piece>,
    ply: u32,
}

impl MoveCtx {
    fn text(&self) -> String {
        match self.promotion {
            Some(p) => format!("{}{}{}", self.from, self.to, promotion_char(p)),
            None => format!("{}{}", self.from, self.to),
        }
    }

    fn ply(&self) -> u32 {
        self.ply + 1
    }

    fn game_over(&self) -> MoveError {
        MoveError::GameOver { mv: self.text(), ply: self.ply() }
    }
    fn empty_source(&self) -> MoveError {
        MoveError::EmptySource { mv: self.text(), ply: self.ply() }
    }
    fn wrong_turn(&self) -> MoveError {
        MoveError::WrongTurn { mv: self.text(), ply: self.ply() }
    }
    fn invalid_pattern(&self) -> MoveError {
        MoveError::InvalidPattern { mv: self.text(), ply: self.ply() }
    }
    fn blocked(&self) -> MoveError {
        MoveError::BlockedMove { mv: self.text(), ply: self.ply() }
    }
    fn exposes_king(&self) -> MoveError {
        MoveError::MoveExposesOwnKing { mv: self.text(), ply: self.ply() }
    }
    fn invalid_castle(&self, reason: &'static str) -> MoveError {
        MoveError::InvalidCastle { mv: self.text(), ply: self.ply(), reason }
    }
    fn invalid_promotion(&self) -> MoveError {
        MoveError::InvalidPromotion { mv: self.text(), ply: self.ply() }
    }
}

fn promotion_char(piece: Piece) -> char {
    match piece {
        Piece::Queen => 'q',
        Piece::Rook => 'r',
        Piece::Bishop => 'b',
        Piece::Knight => 'n',
        _ => '?',
    }
}

#[inline(always)]
fn remove_piece(board: &mut Board, color: Color, piece: Piece, sq: Square) {
    let new_bb = board.bb(color, piece) & !sq.bb();
    board.set_bb(color, piece, new_bb);
}

#[inline(always)]
fn place_piece(board: &mut Board, color: Color, piece: Piece, sq: Square) {
    let new_bb = board.bb(color, piece) | sq.bb();
    board.set_bb(color, piece, new_bb);
}

/// Everything `finish` needs to know about a validated move.
#[derive(Clone, Copy)]
struct Applied {
    captured: Option<(Color, Piece, Square)>,
    double_push: bool,
}

/// Tentatively perform the move and verify the mover's king is safe.
/// On failure everything is rolled back and the board is untouched.
fn apply_and_verify(
    board: &mut Board,
    color: Color,
    moved: Piece,
    landed: Piece,
    from: Square,
    to: Square,
    captured: Option<(Color, Piece, Square)>,
    tables: &AttackTables,
) -> bool {
    if let Some((cap_color, cap_piece, cap_sq)) = captured {
        remove_piece(board, cap_color, cap_piece, cap_sq);
    }
    remove_piece(board, color, moved, from);
    place_piece(board, color, landed, to);

    if in_check(color, board, tables) {
        remove_piece(board, color, landed, to);
        place_piece(board, color, moved, from);
        if let Some((cap_color, cap_piece, cap_sq)) = captured {
            place_piece(board, cap_color, cap_piece, cap_sq);
        }
        return false;
    }
    true
}

fn preflight(board: &Board, ctx: &MoveCtx) -> Result<(Color, Piece), MoveError> {
    if board.game_result.is_terminal() {
        return Err(ctx.game_over());
    }
    let (color, piece) = board.piece_at(ctx.from).ok_or_else(|| ctx.empty_source())?;
    if color != board.side_to_move {
        return Err(ctx.wrong_turn());
    }
    if ctx.from == ctx.to {
        return Err(ctx.invalid_pattern());
    }
    Ok((color, piece))
}

#[inline]
fn king_start(color: Color) -> Square {
    match color {
        Color::White => Square::from_index(4),
        Color::Black => Square::from_index(60),
    }
}

/// Validate and apply one non-promoting move.
#[tracing::instrument(level = "trace", skip_all, fields(from = %from, to = %to))]
pub fn apply_move(board: &mut Board, from: Square, to: Square) -> Result<MoveOutcome, MoveError> {
    let t = tables();
    let ctx = MoveCtx { from, to, promotion: None, ply: board.ply };

    let (color, piece) = preflight(board, &ctx)?;

    // A king sliding two files from its start square asks to castle.
    // This takes priority over the destination checks so that a blocked
    // castle reports as a castling failure.
    if piece == Piece::King
        && from == king_start(color)
        && from.rank() == to.rank()
        && (from.file() as i8 - to.file() as i8).abs() == 2
    {
        let rook_to = try_castle(board, color, from, to, &ctx, t)?;
        let applied = Applied { captured: None, double_push: false };
        return Ok(finish(board, color, piece, piece, from, to, applied, Some(rook_to), t));
    }

    if board.color_at(to) == Some(color) {
        return Err(ctx.blocked());
    }
    // Kings are never capturable; a position offering one is corrupt.
    if board.piece_type_at(to) == Some(Piece::King) {
        return Err(ctx.blocked());
    }

    let applied = match piece {
        Piece::Pawn => pawn_move(board, color, from, to, &ctx, t)?,
        Piece::Knight => knight_move(board, color, from, to, &ctx, t)?,
        Piece::Bishop | Piece::Rook | Piece::Queen => {
            slider_move(board, color, piece, from, to, &ctx, t)?
        }
        Piece::King => king_move(board, color, from, to, &ctx, t)?,
    };

    Ok(finish(board, color, piece, piece, from, to, applied, None, t))
}

/// Validate and apply a promotion. `promotion` must be a queen, rook,
/// bishop or knight; the pawn must step from its seventh rank onto the
/// eighth (mirrored for Black).
#[tracing::instrument(level = "trace", skip_all, fields(from = %from, to = %to))]
pub fn apply_promotion(
    board: &mut Board,
    from: Square,
    to: Square,
    promotion: Piece,
) -> Result<MoveOutcome, MoveError> {
    let t = tables();
    let ctx = MoveCtx { from, to, promotion: Some(promotion), ply: board.ply };

    let (color, piece) = preflight(board, &ctx)?;

    if board.color_at(to) == Some(color) {
        return Err(ctx.blocked());
    }
    if board.piece_type_at(to) == Some(Piece::King) {
        return Err(ctx.blocked());
    }
    if piece != Piece::Pawn {
        return Err(ctx.invalid_promotion());
    }
    if !matches!(
        promotion,
        Piece::Queen | Piece::Rook | Piece::Bishop | Piece::Knight
    ) {
        return Err(ctx.invalid_promotion());
    }
    let (need_from, need_to) = match color {
        Color::White => (6, 7),
        Color::Black => (1, 0),
    };
    if from.rank() != need_from || to.rank() != need_to {
        return Err(ctx.invalid_promotion());
    }

    let file_shift = to.file() as i8 - from.file() as i8;
    if file_shift.abs() > 1 {
        return Err(ctx.invalid_pattern());
    }

    let captured = if file_shift == 0 {
        if board.occ_all & to.bb() != 0 {
            return Err(ctx.blocked());
        }
        None
    } else {
        match board.piece_at(to) {
            Some((cap_color, cap_piece)) => Some((cap_color, cap_piece, to)),
            None => return Err(ctx.invalid_pattern()),
        }
    };

    if !apply_and_verify(board, color, Piece::Pawn, promotion, from, to, captured, t) {
        return Err(ctx.exposes_king());
    }

    let applied = Applied { captured, double_push: false };
    Ok(finish(board, color, Piece::Pawn, promotion, from, to, applied, None, t))
}

fn pawn_move(
    board: &mut Board,
    color: Color,
    from: Square,
    to: Square,
    ctx: &MoveCtx,
    t: &AttackTables,
) -> Result<Applied, MoveError> {
    let forward = match color {
        Color::White => to.rank() as i8 - from.rank() as i8,
        Color::Black => from.rank() as i8 - to.rank() as i8,
    };
    let file_shift = to.file() as i8 - from.file() as i8;

    let start_rank = match color {
        Color::White => 1,
        Color::Black => 6,
    };
    if !(1..=2).contains(&forward)
        || file_shift.abs() > 1
        || (forward == 2 && (file_shift != 0 || from.rank() != start_rank))
    {
        return Err(ctx.invalid_pattern());
    }

    // Reaching the back rank without naming a promotion piece is refused.
    let back_rank = match color {
        Color::White => 7,
        Color::Black => 0,
    };
    if to.rank() == back_rank {
        return Err(ctx.invalid_promotion());
    }

    let mut captured = None;
    let mut double_push = false;

    if file_shift == 0 {
        if forward == 2 {
            let skipped = skipped_square(color, from);
            if board.occ_all & (skipped.bb() | to.bb()) != 0 {
                return Err(ctx.blocked());
            }
            double_push = true;
        } else if board.occ_all & to.bb() != 0 {
            return Err(ctx.blocked());
        }
    } else {
        // Diagonal step: a capture, or the en passant target.
        if let Some((cap_color, cap_piece)) = board.piece_at(to) {
            captured = Some((cap_color, cap_piece, to));
        } else if board.en_passant == Some(to) {
            let victim = Square::from_coords(from.rank(), to.file());
            captured = Some((color.opposite(), Piece::Pawn, victim));
        } else {
            return Err(ctx.invalid_pattern());
        }
    }

    if !apply_and_verify(board, color, Piece::Pawn, Piece::Pawn, from, to, captured, t) {
        return Err(ctx.exposes_king());
    }
    Ok(Applied { captured, double_push })
}

#[inline]
fn skipped_square(color: Color, from: Square) -> Square {
    match color {
        Color::White => Square::from_index(from.index() + 8),
        Color::Black => Square::from_index(from.index() - 8),
    }
}

fn knight_move(
    board: &mut Board,
    color: Color,
    from: Square,
    to: Square,
    ctx: &MoveCtx,
    t: &AttackTables,
) -> Result<Applied, MoveError> {
    let dr = (to.rank() as i8 - from.rank() as i8).abs();
    let df = (to.file() as i8 - from.file() as i8).abs();
    if !((dr == 1 && df == 2) || (dr == 2 && df == 1)) {
        return Err(ctx.invalid_pattern());
    }

    let captured = board
        .piece_at(to)
        .map(|(cap_color, cap_piece)| (cap_color, cap_piece, to));
    if !apply_and_verify(board, color, Piece::Knight, Piece::Knight, from, to, captured, t) {
        return Err(ctx.exposes_king());
    }
    Ok(Applied { captured, double_push: false })
}

fn slider_move(
    board: &mut Board,
    color: Color,
    piece: Piece,
    from: Square,
    to: Square,
    ctx: &MoveCtx,
    t: &AttackTables,
) -> Result<Applied, MoveError> {
    let dr = (to.rank() as i8 - from.rank() as i8).abs();
    let df = (to.file() as i8 - from.file() as i8).abs();
    let pattern_ok = match piece {
        Piece::Bishop => dr == df,
        Piece::Rook => dr == 0 || df == 0,
        Piece::Queen => dr == 0 || df == 0 || dr == df,
        _ => unreachable!("slider_move called for {:?}", piece),
    };
    if !pattern_ok {
        return Err(ctx.invalid_pattern());
    }

    // The squares strictly between source and destination must be empty.
    let path = t.range_mask(from.index(), to.index()) & !from.bb() & !to.bb();
    if path & board.occ_all != 0 {
        return Err(ctx.blocked());
    }

    let captured = board
        .piece_at(to)
        .map(|(cap_color, cap_piece)| (cap_color, cap_piece, to));
    if !apply_and_verify(board, color, piece, piece, from, to, captured, t) {
        return Err(ctx.exposes_king());
    }
    Ok(Applied { captured, double_push: false })
}

fn king_move(
    board: &mut Board,
    color: Color,
    from: Square,
    to: Square,
    ctx: &MoveCtx,
    t: &AttackTables,
) -> Result<Applied, MoveError> {
    let dr = (to.rank() as i8 - from.rank() as i8).abs();
    let df = (to.file() as i8 - from.file() as i8).abs();
    if dr > 1 || df > 1 {
        return Err(ctx.invalid_pattern());
    }

    let captured = board
        .piece_at(to)
        .map(|(cap_color, cap_piece)| (cap_color, cap_piece, to));
    if !apply_and_verify(board, color, Piece::King, Piece::King, from, to, captured, t) {
        return Err(ctx.exposes_king());
    }
    Ok(Applied { captured, double_push: false })
}

/// Validate a castle request and move both pieces. Returns the rook's
/// destination square on success.
fn try_castle(
    board: &mut Board,
    color: Color,
    from: Square,
    to: Square,
    ctx: &MoveCtx,
    t: &AttackTables,
) -> Result<Square, MoveError> {
    let kingside = to.file() > from.file();

    let right = match (color, kingside) {
        (Color::White, true) => CASTLE_WK,
        (Color::White, false) => CASTLE_WQ,
        (Color::Black, true) => CASTLE_BK,
        (Color::Black, false) => CASTLE_BQ,
    };
    if !board.has_castling(right) {
        return Err(ctx.invalid_castle("castling right lost"));
    }

    let (rook_from, rook_to) = match (color, kingside) {
        (Color::White, true) => (Square::from_index(7), Square::from_index(5)), // h1, f1
        (Color::White, false) => (Square::from_index(0), Square::from_index(3)), // a1, d1
        (Color::Black, true) => (Square::from_index(63), Square::from_index(61)), // h8, f8
        (Color::Black, false) => (Square::from_index(56), Square::from_index(59)), // a8, d8
    };
    if board.bb(color, Piece::Rook) & rook_from.bb() == 0 {
        return Err(ctx.invalid_castle("rook is not on its starting square"));
    }

    // All squares strictly between king and rook must be empty. On the
    // queenside that includes the knight square next to the rook.
    let between = t.range_mask(from.index(), rook_from.index()) & !from.bb() & !rook_from.bb();
    if between & board.occ_all != 0 {
        return Err(ctx.invalid_castle("pieces between king and rook"));
    }

    // The king's start, passage and destination squares must be safe.
    // Raw attack squares: a pinned enemy piece still guards its squares.
    let enemy_attacks = attacks_of_color(
        color.opposite(),
        AttackScope {
            obey_pins: false,
            include_king: true,
            pawn_pushes: false,
        },
        board,
        t,
    );
    let king_path = t.range_mask(from.index(), to.index());
    if king_path & enemy_attacks != 0 {
        return Err(ctx.invalid_castle("king path is attacked"));
    }

    // Safe by construction; no rollback point needed.
    remove_piece(board, color, Piece::King, from);
    place_piece(board, color, Piece::King, to);
    remove_piece(board, color, Piece::Rook, rook_from);
    place_piece(board, color, Piece::Rook, rook_to);

    Ok(rook_to)
}

/// Commit side effects for a validated, already-applied move and return
/// its outcome. `moved` is the kind that left `from` (a pawn when
/// promoting), `landed` the kind now standing on `to`.
fn finish(
    board: &mut Board,
    color: Color,
    moved: Piece,
    landed: Piece,
    from: Square,
    to: Square,
    applied: Applied,
    castle_rook_to: Option<Square>,
    t: &AttackTables,
) -> MoveOutcome {
    // En passant: set on a double push, cleared by anything else.
    board.en_passant = if applied.double_push {
        Some(skipped_square(color, from))
    } else {
        None
    };

    // Castling rights: a king move drops both, a rook leaving its corner
    // drops one, and so does capturing a rook on its corner.
    let mut rights_to_clear = 0u8;
    if moved == Piece::King {
        rights_to_clear |= match color {
            Color::White => CASTLE_WK | CASTLE_WQ,
            Color::Black => CASTLE_BK | CASTLE_BQ,
        };
    }
    if moved == Piece::Rook {
        rights_to_clear |= corner_right(color, from);
    }
    if let Some((cap_color, Piece::Rook, cap_sq)) = applied.captured {
        rights_to_clear |= corner_right(cap_color, cap_sq);
    }
    board.castling_rights &= !rights_to_clear;

    if applied.captured.is_some() || moved == Piece::Pawn {
        board.halfmove_clock = 0;
    } else {
        board.halfmove_clock += 1;
    }
    board.ply += 1;
    if color == Color::Black {
        board.fullmove_number += 1;
    }
    board.side_to_move = color.opposite();

    board.refresh_zobrist();
    *board.position_freq.entry(board.zobrist).or_insert(0) += 1;

    board.direct_check_square = None;
    board.discovery_check_square = None;
    let check = classify_check(board, color, landed, from, to, castle_rook_to, t);

    adjudicate(board, check, color, t);

    debug!(
        mv = %ctx_text(from, to, moved, landed),
        check = ?check,
        result = ?board.game_result,
        "applied move"
    );

    MoveOutcome {
        check,
        result: board.game_result,
    }
}

fn ctx_text(from: Square, to: Square, moved: Piece, landed: Piece) -> String {
    if moved == Piece::Pawn && landed != Piece::Pawn {
        format!("{}{}{}", from, to, promotion_char(landed))
    } else {
        format!("{}{}", from, to)
    }
}

#[inline]
fn corner_right(color: Color, sq: Square) -> u8 {
    match (color, sq.index()) {
        (Color::White, 0) => CASTLE_WQ,  // a1
        (Color::White, 7) => CASTLE_WK,  // h1
        (Color::Black, 56) => CASTLE_BQ, // a8
        (Color::Black, 63) => CASTLE_BK, // h8
        _ => 0,
    }
}

/// Classify the check the finished move delivers, recording the checker
/// squares on the board.
fn classify_check(
    board: &mut Board,
    color: Color,
    landed: Piece,
    from: Square,
    to: Square,
    castle_rook_to: Option<Square>,
    t: &AttackTables,
) -> CheckType {
    let enemy = color.opposite();
    let enemy_king = board.pieces(Piece::King, enemy);

    // Castling can only check through the rook's new square.
    if let Some(rook_to) = castle_rook_to {
        if t.rook_attacks(rook_to.index(), board.occ_all) & enemy_king != 0 {
            board.direct_check_square = Some(rook_to);
            return CheckType::DirectCheck;
        }
        return CheckType::NoCheck;
    }

    let mut check = CheckType::NoCheck;

    // Direct: the piece now on `to` reaches the enemy king. A king move
    // never checks directly.
    if landed != Piece::King {
        let direct = attacks_from(landed, color, to, board.occ_all, t);
        if direct & enemy_king != 0 {
            board.direct_check_square = Some(to);
            check = CheckType::DirectCheck;
        }
    }

    // Discovery: the vacated square now scans as "pinned" against the
    // enemy king, which means the departure unmasked one of our sliders.
    let scan = scan_pin(enemy, from, board, t);
    if scan.direction != PinDirection::None {
        board.discovery_check_square = scan.attacker;
        check = match check {
            CheckType::NoCheck => CheckType::DiscoveryCheck,
            _ => CheckType::DoubleCheck,
        };
    }

    check
}
