//! tests/status_tests.rs
//! Terminal adjudication: checkmates, stalemate, and every draw.

use arbiter::{CheckType, Color, Game, GameResult};

fn game_from(fen: &str) -> Game {
    Game::from_fen(fen).expect("valid FEN")
}

#[test]
fn fools_mate() {
    let g = Game::from_moves("f2f3 e7e5 g2g4 d8h4").unwrap();
    assert_eq!(g.game_result(), GameResult::BlackWinsCheckmate);
    assert!(g.is_checkmate(Color::White));
    assert!(!g.is_checkmate(Color::Black));
    assert!(g.is_in_check(Color::White));
}

#[test]
fn scholars_mate() {
    let g = Game::from_moves("e2e4 e7e5 f1c4 b8c6 d1h5 g8f6 h5f7").unwrap();
    assert_eq!(g.game_result(), GameResult::WhiteWinsCheckmate);
    assert!(g.is_checkmate(Color::Black));
}

#[test]
fn back_rank_mate() {
    let mut g = game_from("6k1/5ppp/8/8/8/8/8/R3K3 w - - 0 1");
    let outcome = g.apply_move('a', 1, 'a', 8).unwrap();
    assert_eq!(outcome.check, CheckType::DirectCheck);
    assert_eq!(outcome.result, GameResult::WhiteWinsCheckmate);
}

#[test]
fn check_is_not_mate_when_the_king_can_step_off_the_ray() {
    let mut g = game_from("4k3/8/8/8/8/8/8/R3K3 w - - 0 1");
    let outcome = g.apply_move('a', 1, 'a', 8).unwrap();
    assert_eq!(outcome.check, CheckType::DirectCheck);
    assert_eq!(outcome.result, GameResult::InProgress);
}

#[test]
fn smothered_knight_mate() {
    let mut g = game_from("6rk/6pp/8/6N1/8/8/8/4K3 w - - 0 1");
    let outcome = g.apply_move('g', 5, 'f', 7).unwrap();
    assert_eq!(outcome.check, CheckType::DirectCheck);
    assert_eq!(outcome.result, GameResult::WhiteWinsCheckmate);
}

#[test]
fn knight_check_answered_by_capture_is_no_mate() {
    // Same net, but the rook sits on f8 and can take the knight.
    let mut g = game_from("5r1k/6pp/8/6N1/8/8/8/4K3 w - - 0 1");
    let outcome = g.apply_move('g', 5, 'f', 7).unwrap();
    assert_eq!(outcome.check, CheckType::DirectCheck);
    assert_eq!(outcome.result, GameResult::InProgress);
}

#[test]
fn interposition_averts_mate() {
    // Back-rank check, but the b3 rook can drop to b8.
    let mut g = game_from("6k1/5ppp/8/8/8/1r6/8/R3K3 w - - 0 1");
    let outcome = g.apply_move('a', 1, 'a', 8).unwrap();
    assert_eq!(outcome.check, CheckType::DirectCheck);
    assert_eq!(outcome.result, GameResult::InProgress);
}

#[test]
fn blocked_interposer_does_not_avert_mate() {
    // The same rook behind its own g7 pawn never reaches the back rank.
    let mut g = game_from("6k1/5ppp/8/8/8/6r1/8/R3K3 w - - 0 1");
    let outcome = g.apply_move('a', 1, 'a', 8).unwrap();
    assert_eq!(outcome.result, GameResult::WhiteWinsCheckmate);
}

#[test]
fn adjacent_slider_checker_scores_as_mate() {
    // Rh7 checks from next to the cornered king; the bishop covers g8
    // and g7 falls under the rook. Every remaining candidate square,
    // the rook's own included, lies on the checking file and is vetoed.
    let mut g = game_from("7k/R7/8/8/8/1B6/8/4K3 w - - 0 1");
    let outcome = g.apply_move('a', 7, 'h', 7).unwrap();
    assert_eq!(outcome.check, CheckType::DirectCheck);
    assert_eq!(outcome.result, GameResult::WhiteWinsCheckmate);
}

#[test]
fn discovered_check_is_classified() {
    let mut g = game_from("4k3/8/8/8/4B3/8/8/4R1K1 w - - 0 1");
    let outcome = g.apply_move('e', 4, 'c', 2).unwrap();
    assert_eq!(outcome.check, CheckType::DiscoveryCheck);
    assert_eq!(
        g.board().discovery_check_square.map(|s| s.to_string()),
        Some("e1".to_string())
    );
    assert_eq!(g.board().direct_check_square, None);
}

#[test]
fn double_check_mate() {
    // The knight jump to d6 checks by itself and unmasks the e1 rook.
    let mut g = game_from("3qkb2/3p1p2/8/8/4N3/8/8/4RK2 w - - 0 1");
    let outcome = g.apply_move('e', 4, 'd', 6).unwrap();
    assert_eq!(outcome.check, CheckType::DoubleCheck);
    assert_eq!(outcome.result, GameResult::WhiteWinsCheckmate);
}

#[test]
fn stalemate_queen_boxes_the_king() {
    let mut g = game_from("7k/8/6K1/5Q2/8/8/8/8 w - - 0 1");
    let outcome = g.apply_move('f', 5, 'f', 7).unwrap();
    assert_eq!(outcome.check, CheckType::NoCheck);
    assert_eq!(outcome.result, GameResult::Stalemate);
    assert!(g.is_stalemate());
}

#[test]
fn not_stalemate_while_a_pawn_can_push() {
    let mut g = game_from("7k/8/6K1/5Q2/8/8/p7/8 w - - 0 1");
    let outcome = g.apply_move('f', 5, 'f', 7).unwrap();
    assert_eq!(outcome.result, GameResult::InProgress);
}

#[test]
fn threefold_repetition_by_knight_shuffle() {
    // Both knights bounce until the start position has
    // appeared three times.
    let g = Game::from_moves("g1f3 g8f6 f3g1 f6g8 g1f3 g8f6 f3g1 f6g8").unwrap();
    assert_eq!(g.game_result(), GameResult::DrawByRepetition);
    assert!(g.is_draw_by_repetition());
}

#[test]
fn two_occurrences_are_not_yet_a_draw() {
    // Seven plies of shuffling reach the start squares twice, not thrice.
    let g = Game::from_moves("g1f3 g8f6 f3g1 f6g8 g1f3 g8f6 f3g1").unwrap();
    assert_eq!(g.game_result(), GameResult::InProgress);
}

#[test]
fn fifty_move_rule_fires_at_one_hundred_plies() {
    let mut g = game_from("4k3/8/8/8/8/8/8/R3K3 w - - 99 70");
    let outcome = g.apply_move('e', 1, 'd', 1).unwrap();
    assert_eq!(outcome.result, GameResult::DrawByFiftyMove);
    assert!(g.is_draw_by_50_move());
}

#[test]
fn capture_resets_the_fifty_move_countdown() {
    let mut g = game_from("4k3/8/8/8/8/8/4n3/R3K3 w - - 99 70");
    // Kxe2 is a capture on the hundredth ply: the clock restarts
    // instead of the draw firing.
    let outcome = g.apply_move('e', 1, 'e', 2).unwrap();
    assert_eq!(outcome.result, GameResult::InProgress);
    assert_eq!(g.board().halfmove_clock, 0);
}

#[test]
fn insufficient_material_after_last_capture() {
    // Bishop takes the last black piece: bare king vs king and bishop.
    let mut g = game_from("4k3/8/8/8/8/8/3n4/2B1K3 w - - 0 1");
    let outcome = g.apply_move('c', 1, 'd', 2).unwrap();
    assert_eq!(outcome.result, GameResult::DrawByInsufficientMaterial);
    assert!(g.is_draw_by_insufficient_material());
}

#[test]
fn queen_on_the_board_is_never_insufficient() {
    let mut g = game_from("4k3/8/8/8/8/8/3n4/2Q1K3 w - - 0 1");
    let outcome = g.apply_move('c', 1, 'd', 2).unwrap();
    assert_eq!(outcome.result, GameResult::InProgress);
}

#[test]
fn check_status_queries() {
    let mut g = Game::new();
    assert!(!g.is_in_check(Color::White));
    assert!(!g.is_in_check(Color::Black));
    g.apply_move('e', 2, 'e', 4).unwrap();
    g.apply_move('f', 7, 'f', 6).unwrap();
    let outcome = g.apply_move('d', 1, 'h', 5).unwrap();
    assert_eq!(outcome.check, CheckType::DirectCheck);
    assert!(g.is_in_check(Color::Black));
    assert!(!g.is_in_check(Color::White));
}
