// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

/*! ABI of the Lottery Application */

use async_graphql::{Request, Response};
use linera_sdk::linera_base_types::{AccountOwner, Amount, ContractAbi, ServiceAbi};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum stake required to enter a round: 0.01 of the base token.
pub const MINIMUM_STAKE: Amount = Amount::from_attos(10_000_000_000_000_000);

pub struct LotteryAbi;

impl ContractAbi for LotteryAbi {
    type Operation = Operation;
    type Response = LotteryResponse;
}

impl ServiceAbi for LotteryAbi {
    type Query = Request;
    type QueryResponse = Response;
}

#[derive(Debug, Deserialize, Serialize)]
pub enum Operation {
    /// Enter the current round by staking `amount` (at least [`MINIMUM_STAKE`]).
    /// The stake is transferred from the signer into the chain pool.
    Enter { amount: Amount },
    /// Draw a winner, pay the whole pool to them and reset the round.
    /// Only the operator may do this.
    PickWinner,

    // Query operations for round state
    /// Get the entrants of the current round, in entry order
    GetPlayers,
    /// Get the pooled stakes of the current round
    GetPool,
    /// Get the operator identity fixed at instantiation
    GetOperator,
}

#[derive(Debug, Deserialize, Serialize)]
pub enum LotteryResponse {
    Ok,
    Players(Vec<AccountOwner>),
    Pool(Amount),
    Operator(AccountOwner),
    WinnerPicked {
        winner: AccountOwner,
        prize: Amount,
    },
}

/// Why a lottery operation was refused. The contract surfaces these by
/// aborting the executing block, so a refused operation leaves no state
/// change behind.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LotteryError {
    /// `Enter` was called with a stake below [`MINIMUM_STAKE`].
    #[error("stake of {stake} is below the minimum stake of {minimum}")]
    InsufficientStake { stake: Amount, minimum: Amount },
    /// `PickWinner` was called by someone other than the operator.
    #[error("only the operator may pick a winner")]
    Unauthorized,
    /// `PickWinner` was called while the round has no players.
    #[error("cannot pick a winner for a round with no players")]
    EmptyRound,
}
