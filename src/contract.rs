// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use linera_sdk::{
    linera_base_types::{Account, AccountOwner, WithContractAbi},
    views::{RootView, View},
    Contract, ContractRuntime,
};
use lottery::{LotteryAbi, LotteryResponse, Operation};

use self::state::{draw_seed, ensure_operator, LotteryState};

pub struct LotteryContract {
    state: LotteryState,
    runtime: ContractRuntime<Self>,
}

linera_sdk::contract!(LotteryContract);

impl WithContractAbi for LotteryContract {
    type Abi = LotteryAbi;
}

impl Contract for LotteryContract {
    type Message = ();
    type Parameters = ();
    type InstantiationArgument = ();
    type EventValue = ();

    async fn load(runtime: ContractRuntime<Self>) -> Self {
        let state = LotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LotteryContract { state, runtime }
    }

    async fn instantiate(&mut self, _argument: Self::InstantiationArgument) {
        // Whoever instantiates the application becomes the operator, for good.
        let operator = self
            .runtime
            .authenticated_signer()
            .expect("Authentication required to instantiate the lottery");
        self.state.operator.set(Some(operator));
    }

    async fn execute_operation(&mut self, operation: Self::Operation) -> Self::Response {
        match operation {
            Operation::Enter { amount } => {
                let player = self
                    .runtime
                    .authenticated_signer()
                    .expect("Authentication required to enter the lottery");

                let mut round = self.state.round.get().clone();
                if let Err(err) = round.enter(player.clone(), amount) {
                    panic!("Failed to enter the lottery: {err}");
                }

                // The stake moves into the chain pool only once the entry is
                // accepted; an aborted transfer rolls the entry back with it.
                let pool_account = self.pool_account();
                self.runtime.transfer(player, pool_account, amount);
                self.state.round.set(round);
                LotteryResponse::Ok
            }

            Operation::PickWinner => {
                let caller = self.runtime.authenticated_signer();
                if let Err(err) = ensure_operator(self.state.operator.get().clone(), caller) {
                    panic!("Failed to pick a winner: {err}");
                }

                let mut round = self.state.round.get().clone();
                let seed = draw_seed(
                    self.runtime.system_time().micros(),
                    self.runtime.block_height().into(),
                    round.players.len() as u64,
                );
                let payout = match round.draw(seed) {
                    Ok(payout) => payout,
                    Err(err) => panic!("Failed to pick a winner: {err}"),
                };

                // Pay the whole pool out of the chain balance. If the transfer
                // cannot be completed the block aborts and the round survives
                // untouched.
                let winner_account = Account {
                    chain_id: self.runtime.chain_id(),
                    owner: payout.winner.clone(),
                };
                self.runtime
                    .transfer(AccountOwner::CHAIN, winner_account, payout.prize);
                self.state.round.set(round);
                LotteryResponse::WinnerPicked {
                    winner: payout.winner,
                    prize: payout.prize,
                }
            }

            Operation::GetPlayers => {
                LotteryResponse::Players(self.state.round.get().players.clone())
            }

            Operation::GetPool => LotteryResponse::Pool(self.state.round.get().pool),

            Operation::GetOperator => {
                let operator = self
                    .state
                    .operator
                    .get()
                    .clone()
                    .expect("Operator is set at instantiation");
                LotteryResponse::Operator(operator)
            }
        }
    }

    async fn execute_message(&mut self, _message: Self::Message) {
        panic!("Lottery application doesn't support any cross-chain messages");
    }

    async fn store(mut self) {
        self.state.save().await.expect("Failed to save state");
    }
}

impl LotteryContract {
    /// The chain account holding the pooled stakes of the current round.
    fn pool_account(&mut self) -> Account {
        Account {
            chain_id: self.runtime.chain_id(),
            owner: AccountOwner::CHAIN,
        }
    }
}
