// Copyright (c) Zefchain Labs, Inc.
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(target_arch = "wasm32", no_main)]

mod state;

use std::sync::Arc;

use async_graphql::{EmptySubscription, Object, Request, Response, Schema};
use linera_sdk::{
    linera_base_types::{AccountOwner, Amount, WithServiceAbi},
    views::View,
    Service, ServiceRuntime,
};
use lottery::{LotteryAbi, Operation, MINIMUM_STAKE};

use self::state::{LotteryState, Round};

pub struct LotteryService {
    state: LotteryState,
    runtime: Arc<ServiceRuntime<Self>>,
}

linera_sdk::service!(LotteryService);

impl WithServiceAbi for LotteryService {
    type Abi = LotteryAbi;
}

impl Service for LotteryService {
    type Parameters = ();

    async fn new(runtime: ServiceRuntime<Self>) -> Self {
        let state = LotteryState::load(runtime.root_view_storage_context())
            .await
            .expect("Failed to load state");
        LotteryService {
            state,
            runtime: Arc::new(runtime),
        }
    }

    async fn handle_query(&self, request: Request) -> Response {
        let schema = Schema::build(
            QueryRoot {
                round: self.state.round.get().clone(),
                operator: self.state.operator.get().clone(),
            },
            MutationRoot {
                runtime: self.runtime.clone(),
            },
            EmptySubscription,
        )
        .finish();
        schema.execute(request).await
    }
}

/// Query root exposing the persisted round state.
struct QueryRoot {
    round: Round,
    operator: Option<AccountOwner>,
}

#[Object]
impl QueryRoot {
    /// The current round: entrants and pooled stakes.
    async fn round(&self) -> Round {
        self.round.clone()
    }

    /// Entrants of the current round, in entry order, duplicates included.
    async fn players(&self) -> Vec<AccountOwner> {
        self.round.players.clone()
    }

    /// Number of entries in the current round.
    async fn player_count(&self) -> u64 {
        self.round.players.len() as u64
    }

    /// Pooled stakes awaiting the next draw.
    async fn pool(&self) -> Amount {
        self.round.pool
    }

    /// The identity allowed to pick a winner, fixed at instantiation.
    async fn operator(&self) -> Option<AccountOwner> {
        self.operator.clone()
    }

    /// The smallest stake accepted by `enter`.
    async fn minimum_stake(&self) -> Amount {
        MINIMUM_STAKE
    }
}

struct MutationRoot {
    runtime: Arc<ServiceRuntime<LotteryService>>,
}

#[Object]
impl MutationRoot {
    /// Enter the current round with a stake.
    async fn enter(&self, amount: String) -> String {
        self.runtime.schedule_operation(&Operation::Enter {
            amount: amount.parse::<Amount>().unwrap_or_default(),
        });
        "Enter operation scheduled".to_string()
    }

    /// Draw a winner and reset the round (operator only).
    async fn pick_winner(&self) -> String {
        self.runtime.schedule_operation(&Operation::PickWinner);
        "PickWinner operation scheduled".to_string()
    }
}
