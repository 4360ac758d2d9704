// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

use async_graphql::SimpleObject;
use linera_sdk::linera_base_types::{AccountOwner, Amount};
use linera_sdk::views::{linera_views, RegisterView, RootView, ViewStorageContext};
use lottery::{LotteryError, MINIMUM_STAKE};
use serde::{Deserialize, Serialize};

/// The application state for the Lottery.
#[derive(RootView)]
#[view(context = ViewStorageContext)]
pub struct LotteryState {
    /// The identity allowed to pick a winner, fixed at instantiation.
    pub operator: RegisterView<Option<AccountOwner>>,
    /// The current round.
    pub round: RegisterView<Round>,
}

/// One open round of the lottery: the entrants and their pooled stakes.
#[derive(Debug, Clone, Serialize, Deserialize, SimpleObject)]
pub struct Round {
    /// Entrants in entry order. Each accepted stake appends one entry, so the
    /// same owner appears once per entry.
    pub players: Vec<AccountOwner>,
    /// Sum of all stakes accepted since the last payout.
    pub pool: Amount,
}

impl Default for Round {
    fn default() -> Self {
        Round {
            players: Vec::new(),
            pool: Amount::ZERO,
        }
    }
}

/// The outcome of a draw: who won and what they are owed.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(dead_code)]
pub struct Payout {
    pub winner: AccountOwner,
    pub prize: Amount,
}

#[allow(dead_code)]
impl Round {
    /// Admits `player` with `stake`. Stakes below [`MINIMUM_STAKE`] are
    /// rejected before anything is recorded.
    pub fn enter(&mut self, player: AccountOwner, stake: Amount) -> Result<(), LotteryError> {
        if stake < MINIMUM_STAKE {
            return Err(LotteryError::InsufficientStake {
                stake,
                minimum: MINIMUM_STAKE,
            });
        }
        self.players.push(player);
        self.pool = self.pool.saturating_add(stake);
        Ok(())
    }

    /// Picks the winner for `seed`, empties the round and returns the payout.
    /// The caller is responsible for actually transferring the prize; on a
    /// failed transfer the block aborts and the round is left untouched.
    pub fn draw(&mut self, seed: u64) -> Result<Payout, LotteryError> {
        if self.players.is_empty() {
            return Err(LotteryError::EmptyRound);
        }
        let winner = self.players[winner_index(seed, self.players.len())].clone();
        let prize = self.pool;
        self.players.clear();
        self.pool = Amount::ZERO;
        Ok(Payout { winner, prize })
    }
}

/// Checks that `caller` is the recorded operator.
#[allow(dead_code)]
pub fn ensure_operator(
    operator: Option<AccountOwner>,
    caller: Option<AccountOwner>,
) -> Result<(), LotteryError> {
    match (operator, caller) {
        (Some(operator), Some(caller)) if operator == caller => Ok(()),
        _ => Err(LotteryError::Unauthorized),
    }
}

/// Derives the draw seed from block context that entrants cannot predict when
/// they enter: the block timestamp, the block height and the entry count.
#[allow(dead_code)]
pub fn draw_seed(timestamp_micros: u64, block_height: u64, player_count: u64) -> u64 {
    timestamp_micros
        .wrapping_add(block_height)
        .wrapping_add(player_count)
}

/// Reduces a draw seed to an index into the player list.
fn winner_index(seed: u64, player_count: usize) -> usize {
    (seed % player_count as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(seed: u8) -> AccountOwner {
        AccountOwner::Address20([seed; 20])
    }

    #[test]
    fn enter_records_player_and_stake() {
        let mut round = Round::default();

        round.enter(owner(1), MINIMUM_STAKE).unwrap();

        assert_eq!(round.players, vec![owner(1)]);
        assert_eq!(round.pool, MINIMUM_STAKE);
    }

    #[test]
    fn enter_keeps_entry_order() {
        let mut round = Round::default();

        round.enter(owner(1), Amount::from_tokens(1)).unwrap();
        round.enter(owner(2), Amount::from_tokens(1)).unwrap();
        round.enter(owner(3), Amount::from_tokens(1)).unwrap();

        assert_eq!(round.players, vec![owner(1), owner(2), owner(3)]);
        assert_eq!(round.pool, Amount::from_tokens(3));
    }

    #[test]
    fn repeat_entries_are_recorded_individually() {
        let mut round = Round::default();

        round.enter(owner(1), Amount::from_tokens(1)).unwrap();
        round.enter(owner(2), Amount::from_tokens(2)).unwrap();
        round.enter(owner(1), Amount::from_tokens(3)).unwrap();

        assert_eq!(round.players, vec![owner(1), owner(2), owner(1)]);
        assert_eq!(round.pool, Amount::from_tokens(6));
    }

    #[test]
    fn enter_below_minimum_changes_nothing() {
        let mut round = Round::default();
        let stake = Amount::from_attos(10);

        let result = round.enter(owner(1), stake);

        assert_eq!(
            result,
            Err(LotteryError::InsufficientStake {
                stake,
                minimum: MINIMUM_STAKE,
            })
        );
        assert!(round.players.is_empty());
        assert_eq!(round.pool, Amount::ZERO);
    }

    #[test]
    fn enter_at_exact_minimum_is_accepted() {
        let mut round = Round::default();

        assert!(round.enter(owner(1), MINIMUM_STAKE).is_ok());
        assert_eq!(round.players.len(), 1);
    }

    #[test]
    fn draw_on_empty_round_is_rejected() {
        let mut round = Round::default();

        assert_eq!(round.draw(42), Err(LotteryError::EmptyRound));
        assert!(round.players.is_empty());
        assert_eq!(round.pool, Amount::ZERO);
    }

    #[test]
    fn draw_pays_full_pool_and_resets_the_round() {
        let mut round = Round::default();
        round.enter(owner(1), Amount::from_tokens(1)).unwrap();
        round.enter(owner(2), Amount::from_tokens(2)).unwrap();
        round.enter(owner(3), Amount::from_tokens(3)).unwrap();

        let payout = round.draw(4).unwrap();

        // seed 4 over 3 players selects index 1
        assert_eq!(payout.winner, owner(2));
        assert_eq!(payout.prize, Amount::from_tokens(6));
        assert!(round.players.is_empty());
        assert_eq!(round.pool, Amount::ZERO);
    }

    #[test]
    fn draw_reduces_the_seed_modulo_the_player_count() {
        for seed in 0..12 {
            let mut round = Round::default();
            round.enter(owner(1), Amount::from_tokens(1)).unwrap();
            round.enter(owner(2), Amount::from_tokens(1)).unwrap();
            round.enter(owner(3), Amount::from_tokens(1)).unwrap();

            let payout = round.draw(seed).unwrap();

            assert_eq!(payout.winner, owner((seed % 3) as u8 + 1));
        }
    }

    #[test]
    fn draw_with_a_single_player_pays_that_player() {
        let mut round = Round::default();
        round.enter(owner(7), Amount::from_tokens(2)).unwrap();

        let payout = round.draw(u64::MAX).unwrap();

        assert_eq!(payout.winner, owner(7));
        assert_eq!(payout.prize, Amount::from_tokens(2));
    }

    #[test]
    fn round_accepts_entries_again_after_a_draw() {
        let mut round = Round::default();
        round.enter(owner(1), Amount::from_tokens(1)).unwrap();
        round.draw(0).unwrap();

        round.enter(owner(2), MINIMUM_STAKE).unwrap();

        assert_eq!(round.players, vec![owner(2)]);
        assert_eq!(round.pool, MINIMUM_STAKE);
    }

    #[test]
    fn only_the_operator_passes_the_operator_check() {
        assert!(ensure_operator(Some(owner(1)), Some(owner(1))).is_ok());
        assert_eq!(
            ensure_operator(Some(owner(1)), Some(owner(2))),
            Err(LotteryError::Unauthorized)
        );
        assert_eq!(
            ensure_operator(Some(owner(1)), None),
            Err(LotteryError::Unauthorized)
        );
        assert_eq!(
            ensure_operator(None, Some(owner(1))),
            Err(LotteryError::Unauthorized)
        );
    }

    #[test]
    fn draw_seed_is_deterministic_in_its_inputs() {
        assert_eq!(draw_seed(1_000, 5, 3), draw_seed(1_000, 5, 3));
        assert_ne!(draw_seed(1_000, 5, 3), draw_seed(1_000, 5, 4));
        assert_ne!(draw_seed(1_000, 5, 3), draw_seed(1_001, 5, 3));
    }

    #[test]
    fn draw_seed_wraps_instead_of_overflowing() {
        // Must not panic even with overflow checks enabled.
        let _ = draw_seed(u64::MAX, u64::MAX, u64::MAX);
    }
}
