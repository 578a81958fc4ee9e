//! Piece-piece collision detection, separation and merging
//!
//! One pass over every unordered pair per tick. Separations move pieces
//! immediately, so later pairs in the same pass see the corrected positions.
//! Merges and annihilations are only recorded during the pass and applied
//! afterwards by rebuilding the piece list, which keeps indices stable while
//! iterating.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::piece::Piece;
use super::tier::{Tier, TierTable};
use crate::consts::SEPARATION_FACTOR;

/// Structural change produced by a same-tier collision
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MergeOutcome {
    /// Two pieces of `from` became one piece of `into` at `pos`
    Merged {
        from: Tier,
        into: Tier,
        pos: Vec2,
        id: u32,
    },
    /// Two terminal-tier pieces vanished
    Annihilated { tier: Tier, pos: Vec2 },
}

/// Result of one collision pass
#[derive(Debug, Clone, Default)]
pub struct CollisionResult {
    /// Points earned this pass
    pub points: u64,
    pub outcomes: Vec<MergeOutcome>,
    /// Number of different-tier pairs pushed apart
    pub separations: u32,
}

/// Borrow two distinct pieces mutably, `i < j`
fn pair_mut(pieces: &mut [Piece], i: usize, j: usize) -> (&mut Piece, &mut Piece) {
    debug_assert!(i < j);
    let (head, tail) = pieces.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

/// Push two overlapping pieces apart along the line between their centers.
///
/// Each piece moves by `overlap * SEPARATION_FACTOR` in opposite directions.
/// Coincident centers are split vertically, `a` upward.
pub fn separate(a: &mut Piece, b: &mut Piece, overlap: f32) {
    let dir = (a.pos - b.pos).try_normalize().unwrap_or(Vec2::NEG_Y);
    let adjust = dir * (overlap * SEPARATION_FACTOR);
    a.pos += adjust;
    b.pos -= adjust;
}

/// Resolve all collisions among `pieces` in a single pass.
///
/// `next_id` allocates ids for merged pieces. A piece consumed by a merge or
/// annihilation is skipped for the rest of the pass. The surviving order is
/// the original order, with each merge result taking the slot of the
/// lower-index source piece.
pub fn resolve_collisions(
    pieces: &mut Vec<Piece>,
    tiers: &TierTable,
    mut next_id: impl FnMut() -> u32,
) -> CollisionResult {
    let n = pieces.len();
    let mut result = CollisionResult::default();
    let mut consumed = vec![false; n];
    let mut replacements: Vec<Option<Piece>> = vec![None; n];

    for i in 0..n {
        for j in (i + 1)..n {
            if consumed[i] || consumed[j] {
                continue;
            }

            let (a, b) = pair_mut(pieces, i, j);
            if !a.overlaps(b) {
                continue;
            }

            a.mark_settled();
            b.mark_settled();

            if a.tier() != b.tier() {
                let overlap = a.radius() + b.radius() - a.pos.distance(b.pos);
                separate(a, b, overlap);
                result.separations += 1;
                continue;
            }

            let tier = a.tier();
            let pos = (a.pos + b.pos) * 0.5;
            consumed[i] = true;
            consumed[j] = true;
            result.points += tiers.score(tier);

            match tiers.successor(tier) {
                Some(into) => {
                    let merged = Piece::new(next_id(), into, pos, tiers);
                    log::trace!("Merge {:?} + {:?} -> {:?} at {}", tier, tier, into, pos);
                    result.outcomes.push(MergeOutcome::Merged {
                        from: tier,
                        into,
                        pos,
                        id: merged.id,
                    });
                    replacements[i] = Some(merged);
                }
                None => {
                    log::trace!("Annihilate {:?} pair at {}", tier, pos);
                    result.outcomes.push(MergeOutcome::Annihilated { tier, pos });
                }
            }
        }
    }

    if !result.outcomes.is_empty() {
        let old = std::mem::take(pieces);
        pieces.reserve(n);
        for (idx, piece) in old.into_iter().enumerate() {
            if let Some(merged) = replacements[idx].take() {
                pieces.push(merged);
            } else if !consumed[idx] {
                pieces.push(piece);
            }
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use proptest::prelude::*;

    fn tiers() -> TierTable {
        TierTable::from_config(&GameConfig::default()).unwrap()
    }

    fn ids(start: u32) -> impl FnMut() -> u32 {
        let mut next = start;
        move || {
            let id = next;
            next += 1;
            id
        }
    }

    #[test]
    fn test_same_tier_pair_merges_at_midpoint() {
        let t = tiers();
        let r0 = t.radius(Tier(0));
        let a = Vec2::new(800.0, 600.0);
        let b = a + Vec2::new(r0 * 1.5, 0.0);
        let mut pieces = vec![
            Piece::new(1, Tier(0), a, &t),
            Piece::new(2, Tier(0), b, &t),
        ];

        let result = resolve_collisions(&mut pieces, &t, ids(100));

        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].tier(), Tier(1));
        assert_eq!(pieces[0].pos, (a + b) * 0.5);
        assert_eq!(pieces[0].id, 100);
        assert_eq!(result.points, t.score(Tier(0)));
        assert_eq!(
            result.outcomes,
            vec![MergeOutcome::Merged {
                from: Tier(0),
                into: Tier(1),
                pos: (a + b) * 0.5,
                id: 100,
            }]
        );
    }

    #[test]
    fn test_terminal_pair_annihilates() {
        let t = tiers();
        let top = t.terminal();
        let mut pieces = vec![
            Piece::new(1, top, Vec2::new(800.0, 600.0), &t),
            Piece::new(2, top, Vec2::new(900.0, 600.0), &t),
            Piece::new(3, Tier(0), Vec2::new(100.0, 100.0), &t),
        ];

        let result = resolve_collisions(&mut pieces, &t, ids(100));

        assert_eq!(pieces.len(), 1);
        assert_eq!(pieces[0].id, 3);
        assert_eq!(result.points, t.score(top));
        assert!(matches!(
            result.outcomes[0],
            MergeOutcome::Annihilated { tier, .. } if tier == top
        ));
    }

    #[test]
    fn test_different_tiers_separate_symmetrically() {
        let t = tiers();
        let a0 = Vec2::new(800.0, 600.0);
        let b0 = Vec2::new(850.0, 600.0);
        let mut pieces = vec![
            Piece::new(1, Tier(0), a0, &t),
            Piece::new(2, Tier(1), b0, &t),
        ];

        let result = resolve_collisions(&mut pieces, &t, ids(100));

        assert_eq!(pieces.len(), 2);
        assert_eq!(result.points, 0);
        assert_eq!(result.separations, 1);
        // overlap = 25 + 35 - 50 = 10, each moves 10 / 6
        let da = pieces[0].pos - a0;
        let db = pieces[1].pos - b0;
        assert!((da.x + 10.0 / 6.0).abs() < 1e-4);
        assert!((db.x - 10.0 / 6.0).abs() < 1e-4);
        assert_eq!(da.y, 0.0);
        assert!(pieces.iter().all(|p| p.is_settled()));
    }

    #[test]
    fn test_coincident_centers_split_vertically() {
        let t = tiers();
        let p = Vec2::new(800.0, 600.0);
        let mut pieces = vec![Piece::new(1, Tier(0), p, &t), Piece::new(2, Tier(1), p, &t)];

        resolve_collisions(&mut pieces, &t, ids(100));

        assert!(pieces[0].pos.y < p.y);
        assert!(pieces[1].pos.y > p.y);
        assert_eq!(pieces[0].pos.x, p.x);
    }

    #[test]
    fn test_touching_pieces_do_not_collide() {
        let t = tiers();
        let mut pieces = vec![
            Piece::new(1, Tier(0), Vec2::new(800.0, 600.0), &t),
            Piece::new(2, Tier(0), Vec2::new(850.0, 600.0), &t),
        ];

        let result = resolve_collisions(&mut pieces, &t, ids(100));

        assert_eq!(pieces.len(), 2);
        assert!(result.outcomes.is_empty());
        assert!(!pieces[0].is_settled());
    }

    #[test]
    fn test_chain_of_three_merges_once() {
        let t = tiers();
        let mut pieces = vec![
            Piece::new(1, Tier(0), Vec2::new(800.0, 600.0), &t),
            Piece::new(2, Tier(0), Vec2::new(830.0, 600.0), &t),
            Piece::new(3, Tier(0), Vec2::new(860.0, 600.0), &t),
        ];

        let result = resolve_collisions(&mut pieces, &t, ids(100));

        // First pair wins; the third piece waits for the next tick
        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.points, 1);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].tier(), Tier(1));
        assert_eq!(pieces[0].pos, Vec2::new(815.0, 600.0));
        assert_eq!(pieces[1].id, 3);
    }

    #[test]
    fn test_consumed_piece_skips_later_separation() {
        let t = tiers();
        let c0 = Vec2::new(790.0, 650.0);
        let mut pieces = vec![
            Piece::new(1, Tier(0), Vec2::new(800.0, 600.0), &t),
            Piece::new(2, Tier(0), Vec2::new(830.0, 600.0), &t),
            Piece::new(3, Tier(1), c0, &t),
        ];
        // The first piece also overlaps the larger one below it
        assert!(pieces[0].overlaps(&pieces[2]));
        assert!(!pieces[1].overlaps(&pieces[2]));

        let result = resolve_collisions(&mut pieces, &t, ids(100));

        assert_eq!(result.outcomes.len(), 1);
        assert_eq!(result.separations, 0);
        assert_eq!(pieces.len(), 2);
        assert_eq!(pieces[0].tier(), Tier(1));
        assert_eq!(pieces[1].id, 3);
        assert_eq!(pieces[1].pos, c0);
        assert!(!pieces[1].is_settled());
    }

    #[test]
    fn test_replacement_keeps_lower_slot() {
        let t = tiers();
        let mut pieces = vec![
            Piece::new(1, Tier(2), Vec2::new(700.0, 900.0), &t),
            Piece::new(2, Tier(4), Vec2::new(1000.0, 300.0), &t),
            Piece::new(3, Tier(2), Vec2::new(760.0, 900.0), &t),
            Piece::new(4, Tier(5), Vec2::new(1200.0, 100.0), &t),
        ];

        resolve_collisions(&mut pieces, &t, ids(100));

        let order: Vec<u32> = pieces.iter().map(|p| p.id).collect();
        assert_eq!(order, vec![100, 2, 4]);
        assert_eq!(pieces[0].tier(), Tier(3));
    }

    #[test]
    fn test_two_merges_in_one_pass() {
        let t = tiers();
        let mut pieces = vec![
            Piece::new(1, Tier(0), Vec2::new(700.0, 900.0), &t),
            Piece::new(2, Tier(0), Vec2::new(720.0, 900.0), &t),
            Piece::new(3, Tier(1), Vec2::new(1000.0, 900.0), &t),
            Piece::new(4, Tier(1), Vec2::new(1040.0, 900.0), &t),
        ];

        let result = resolve_collisions(&mut pieces, &t, ids(100));

        assert_eq!(pieces.len(), 2);
        assert_eq!(result.points, t.score(Tier(0)) + t.score(Tier(1)));
        assert_eq!(pieces[0].tier(), Tier(1));
        assert_eq!(pieces[1].tier(), Tier(2));
    }

    proptest! {
        #[test]
        fn prop_separation_is_equal_and_opposite(
            ax in 0.0f32..100.0,
            ay in 0.0f32..100.0,
            bx in 0.0f32..100.0,
            by in 0.0f32..100.0,
        ) {
            let t = tiers();
            let a0 = Vec2::new(ax, ay);
            let b0 = Vec2::new(bx, by);
            let mut pieces = vec![
                Piece::new(1, Tier(0), a0, &t),
                Piece::new(2, Tier(3), b0, &t),
            ];

            resolve_collisions(&mut pieces, &t, ids(100));

            prop_assert_eq!(pieces.len(), 2);
            let da = pieces[0].pos - a0;
            let db = pieces[1].pos - b0;
            prop_assert!((da + db).length() < 1e-3);
        }

        #[test]
        fn prop_merge_removes_exactly_one(
            tier in 0u8..7,
            offset in 0.1f32..20.0,
        ) {
            let t = tiers();
            let mut pieces = vec![
                Piece::new(1, Tier(tier), Vec2::new(500.0, 500.0), &t),
                Piece::new(2, Tier(tier), Vec2::new(500.0 + offset, 500.0), &t),
            ];

            let result = resolve_collisions(&mut pieces, &t, ids(100));

            prop_assert_eq!(pieces.len(), 1);
            prop_assert_eq!(pieces[0].tier(), Tier(tier + 1));
            prop_assert_eq!(result.points, t.score(Tier(tier)));
        }
    }
}
