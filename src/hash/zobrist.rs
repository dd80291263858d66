// src/hash/zobrist.rs
//
// Position hashing for repetition detection. The engine recomputes the
// hash after every applied move rather than maintaining it incrementally;
// at one hash per ply the recompute cost is irrelevant next to the
// simplicity it buys.

use crate::board::{Board, Color, Piece};
use once_cell::sync::OnceCell;
use rand::{rngs::StdRng, RngCore, SeedableRng};

// Fixed seed: identical positions must hash identically across runs.
const ZOBRIST_SEED: u64 = 0x9E37_79B9_AAAC_5C87;

pub struct ZobristKeys {
    /// [piece_index][square] with White P..K = 0..5, Black p..k = 6..11.
    pub piece: [[u64; 64]; 12],
    /// One key per rights combination, indexed by the K,Q,k,q bitfield.
    pub castling: [u64; 16],
    /// a..h => 0..7.
    pub ep_file: [u64; 8],
    /// XORed in when White is to move.
    pub side_to_move: u64,
}

/// Global keys, generated once from the fixed seed.
pub fn zobrist_keys() -> &'static ZobristKeys {
    static KEYS: OnceCell<ZobristKeys> = OnceCell::new();
    KEYS.get_or_init(|| generate_keys(StdRng::seed_from_u64(ZOBRIST_SEED)))
}

fn generate_keys(mut rng: StdRng) -> ZobristKeys {
    #[inline]
    fn non_zero(rng: &mut StdRng) -> u64 {
        // avoid zero keys to reduce degenerate collisions
        let mut v = rng.next_u64();
        while v == 0 {
            v = rng.next_u64();
        }
        v
    }

    let mut keys = ZobristKeys {
        piece: [[0u64; 64]; 12],
        castling: [0u64; 16],
        ep_file: [0u64; 8],
        side_to_move: 0,
    };

    for piece in 0..12 {
        for sq in 0..64 {
            keys.piece[piece][sq] = non_zero(&mut rng);
        }
    }
    for combo in 0..16 {
        keys.castling[combo] = non_zero(&mut rng);
    }
    for file in 0..8 {
        keys.ep_file[file] = non_zero(&mut rng);
    }
    keys.side_to_move = non_zero(&mut rng);

    keys
}

/// Full hash of a position: piece placement, side to move, castling
/// rights combination and en-passant file (when a target square is set).
pub fn compute(board: &Board) -> u64 {
    let keys = zobrist_keys();
    let mut hash: u64 = 0;

    const COLORS: [Color; 2] = [Color::White, Color::Black];
    const PIECES: [Piece; 6] = [
        Piece::Pawn,
        Piece::Knight,
        Piece::Bishop,
        Piece::Rook,
        Piece::Queen,
        Piece::King,
    ];

    for &color in &COLORS {
        for &piece in &PIECES {
            let piece_index = color as usize * 6 + piece as usize;
            let mut bb = board.bb(color, piece);
            while bb != 0 {
                let sq = bb.trailing_zeros() as usize;
                hash ^= keys.piece[piece_index][sq];
                bb &= bb - 1;
            }
        }
    }

    if board.side_to_move == Color::White {
        hash ^= keys.side_to_move;
    }

    hash ^= keys.castling[board.castling_rights as usize & 0xF];

    if let Some(ep) = board.en_passant {
        hash ^= keys.ep_file[ep.file() as usize];
    }

    hash
}
