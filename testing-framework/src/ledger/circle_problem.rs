//! In-process circle problem contract.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use log::debug;
use parking_lot::Mutex;
use primitive_types::U256;
use serde_json::{json, Value};
use std::sync::Arc;

use randao_common::circle::{Circle, CircleError, ProblemConfig, ProblemState};
use randao_common::crypto::Address;
use randao_common::ledger::{
    CircleProblemLedger, EmittedEvent, EventKind, InsertAttempt, LedgerEvent,
};
use randao_common::utils::u256_to_hex;

use super::chain::ChainState;

fn big_number(value: &U256) -> Value {
    json!({ "type": "BigNumber", "hex": u256_to_hex(value) })
}

/// Authoritative circle problem. Owns its own `ProblemState`; one
/// insertion transaction runs the candidate generator with
/// `attempts_per_tx` iterations.
#[derive(Clone)]
pub struct CircleProblemContract {
    address: Address,
    sender: Address,
    deploy_seed: U256,
    attempts_per_tx: u64,
    state: Arc<Mutex<ProblemState>>,
    chain: Arc<Mutex<ChainState>>,
}

impl CircleProblemContract {
    pub(crate) fn deploy(
        chain: Arc<Mutex<ChainState>>,
        deployer: Address,
        seed: U256,
        config: ProblemConfig,
        max_circles: usize,
        attempts_per_tx: u64,
    ) -> Result<Self> {
        if attempts_per_tx == 0 {
            bail!("attempts per transaction must be positive");
        }
        let state = ProblemState::new(config, seed, max_circles)
            .context("Failed to deploy circle problem")?;

        let address = {
            let mut chain = chain.lock();
            let address = chain.create_address(&deployer);
            let receipt = chain.commit(deployer, Vec::new());
            debug!(
                "circle problem deployed at {} in block {} (seed {})",
                address,
                receipt.block_number,
                u256_to_hex(&seed)
            );
            address
        };

        Ok(Self {
            address,
            sender: deployer,
            deploy_seed: seed,
            attempts_per_tx,
            state: Arc::new(Mutex::new(state)),
            chain,
        })
    }

    pub fn deploy_seed(&self) -> U256 {
        self.deploy_seed
    }

    pub fn attempts_per_tx(&self) -> u64 {
        self.attempts_per_tx
    }

    pub fn config(&self) -> ProblemConfig {
        *self.state.lock().config()
    }

    /// Copy of the contract's current state.
    pub fn state(&self) -> ProblemState {
        self.state.lock().clone()
    }

    /// Storage read as an ethers client returns it:
    /// `[seed, [[x, y, r], ..], max_circles, is_finished]` with BigNumbers.
    fn snapshot_value(state: &ProblemState) -> Value {
        let circles: Vec<Value> = state
            .accepted_circles()
            .iter()
            .map(|c| json!([big_number(&c.x), big_number(&c.y), big_number(&c.radius)]))
            .collect();
        json!([
            big_number(&state.seed()),
            circles,
            big_number(&U256::from(state.max_circles())),
            state.is_finished(),
        ])
    }
}

#[async_trait]
impl CircleProblemLedger for CircleProblemContract {
    fn address(&self) -> Address {
        self.address
    }

    async fn problem_snapshot(&self) -> Result<Value> {
        Ok(Self::snapshot_value(&self.state.lock()))
    }

    async fn maximum_circle_count(&self) -> Result<u64> {
        Ok(self.state.lock().max_circles() as u64)
    }

    async fn submit_insert_attempt(&self) -> Result<InsertAttempt> {
        let mut state = self.state.lock();
        if state.is_finished() {
            bail!("execution reverted: circle problem already finished");
        }

        match state.generate_candidate(self.attempts_per_tx) {
            Ok(proposal) => state
                .apply(&proposal)
                .context("execution reverted: proposal rejected")?,
            Err(CircleError::Exhausted { budget, next_seed }) => {
                debug!("no circle within {} attempts, chain moves on", budget);
                state.reseed(next_seed)?;
            }
            Err(e) => return Err(e).context("execution reverted"),
        }

        let is_finished = state.is_finished();
        let circle_count = state.circle_count() as u64;
        let receipt = self.chain.lock().commit(
            self.sender,
            vec![(
                self.address,
                LedgerEvent::AttemptInsertingCircle {
                    is_finished,
                    circle_count,
                },
            )],
        );

        Ok(InsertAttempt {
            receipt,
            is_finished,
            circle_count,
        })
    }

    async fn validate_solution(&self, x: U256, y: U256, radius: U256) -> Result<bool> {
        let state = self.state.lock();
        Ok(state.validate_solution(&Circle::new(x, y, radius)).is_ok())
    }

    async fn query_events(
        &self,
        kind: EventKind,
        from_block: u64,
        to_block: u64,
    ) -> Result<Vec<EmittedEvent>> {
        Ok(self.chain.lock().events(&self.address, kind, from_block, to_block))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn deploy(max_circles: usize, attempts: u64) -> CircleProblemContract {
        let chain = Arc::new(Mutex::new(ChainState::new(0, HashMap::new())));
        CircleProblemContract::deploy(
            chain,
            Address::new([1; 20]),
            U256::from(1234u64),
            ProblemConfig::square(1000, 10, 100),
            max_circles,
            attempts,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_attempts_until_finished() {
        let contract = deploy(3, 64);
        let mut attempts = 0;
        loop {
            let attempt = contract.submit_insert_attempt().await.unwrap();
            attempts += 1;
            assert!(attempt.circle_count <= 3);
            if attempt.is_finished {
                assert_eq!(attempt.circle_count, 3);
                break;
            }
            assert!(attempts < 100);
        }
        assert!(contract.submit_insert_attempt().await.is_err());
        assert_eq!(contract.state().circle_count(), 3);
    }

    #[tokio::test]
    async fn test_attempt_emits_event_in_its_block() {
        let contract = deploy(2, 64);
        let attempt = contract.submit_insert_attempt().await.unwrap();
        let events = contract
            .query_events(
                EventKind::AttemptInsertingCircle,
                attempt.receipt.block_number,
                attempt.receipt.block_number,
            )
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(
            events[0].event,
            LedgerEvent::AttemptInsertingCircle {
                is_finished: attempt.is_finished,
                circle_count: attempt.circle_count,
            }
        );
    }

    #[tokio::test]
    async fn test_snapshot_parses_back() {
        let contract = deploy(2, 64);
        contract.submit_insert_attempt().await.unwrap();
        let value = contract.problem_snapshot().await.unwrap();
        let parsed = ProblemState::from_value(contract.config(), &value).unwrap();
        assert_eq!(parsed, contract.state());
    }

    #[tokio::test]
    async fn test_validate_solution_matches_state() {
        let contract = deploy(4, 64);
        contract.submit_insert_attempt().await.unwrap();
        let accepted = contract.state().accepted_circles()[0];
        assert!(!contract
            .validate_solution(accepted.x, accepted.y, accepted.radius)
            .await
            .unwrap());
        assert!(!contract
            .validate_solution(U256::from(5u64), U256::from(500u64), U256::from(10u64))
            .await
            .unwrap());
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let chain = Arc::new(Mutex::new(ChainState::new(0, HashMap::new())));
        assert!(CircleProblemContract::deploy(
            chain,
            Address::new([1; 20]),
            U256::zero(),
            ProblemConfig::default(),
            2,
            0
        )
        .is_err());
    }
}
