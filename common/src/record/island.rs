use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{Account, InventoryError};
use crate::crypto::Address;

pub type IslandId = u64;

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct Island {
    pub island_id: IslandId,
    pub owner: Address,
}

/// How many islands to hand out.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum IslandPlan {
    /// `n` islands for every account
    PerAccount(usize),
    /// `n` islands in total, dealt round-robin starting at the first account
    Total(usize),
}

impl IslandPlan {
    pub fn island_count(&self, accounts: usize) -> usize {
        match self {
            IslandPlan::PerAccount(n) => n.saturating_mul(accounts),
            IslandPlan::Total(n) => *n,
        }
    }
}

/// Explicit island id allocation. Ids are handed out in increasing order
/// starting at 1, skipping any id already claimed, and every id has exactly
/// one owner.
#[derive(Clone, Debug)]
pub struct IslandAllocator {
    next: IslandId,
    owners: BTreeMap<IslandId, Address>,
}

impl Default for IslandAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl IslandAllocator {
    pub fn new() -> Self {
        Self {
            next: 1,
            owners: BTreeMap::new(),
        }
    }

    /// Next free id, now owned by `owner`.
    pub fn allocate(&mut self, owner: Address) -> IslandId {
        while self.owners.contains_key(&self.next) {
            self.next += 1;
        }
        let island_id = self.next;
        self.owners.insert(island_id, owner);
        self.next += 1;
        island_id
    }

    /// Claim a specific id.
    pub fn claim(&mut self, island_id: IslandId, owner: Address) -> Result<(), InventoryError> {
        if let Some(current) = self.owners.get(&island_id) {
            return Err(InventoryError::IslandIdCollision {
                island_id,
                owner: *current,
                requested_by: owner,
            });
        }
        self.owners.insert(island_id, owner);
        Ok(())
    }

    pub fn owner_of(&self, island_id: IslandId) -> Option<Address> {
        self.owners.get(&island_id).copied()
    }

    pub fn islands(&self) -> Vec<Island> {
        self.owners
            .iter()
            .map(|(island_id, owner)| Island {
                island_id: *island_id,
                owner: *owner,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }
}

/// Deal islands to `accounts` round-robin and return every account's
/// owned set afterwards.
pub fn assign_islands(
    accounts: &mut [Account],
    plan: IslandPlan,
    allocator: &mut IslandAllocator,
) -> Result<BTreeMap<Address, BTreeSet<IslandId>>, InventoryError> {
    let count = plan.island_count(accounts.len());
    if count > 0 && accounts.is_empty() {
        return Err(InventoryError::NoAccounts);
    }

    let total = accounts.len();
    for n in 0..count {
        let account = &mut accounts[n % total];
        let island_id = allocator.allocate(account.address());
        account.add_island(island_id);
        debug!("island {} assigned to {}", island_id, account.address());
    }

    Ok(accounts
        .iter()
        .map(|account| (account.address(), account.owned_islands().clone()))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{generate_accounts, KeySource};

    #[test]
    fn test_allocator_skips_claimed_ids() {
        let mut allocator = IslandAllocator::new();
        let owner = Address::new([1; 20]);
        allocator.claim(2, owner).unwrap();
        allocator.claim(3, owner).unwrap();
        assert_eq!(allocator.allocate(owner), 1);
        assert_eq!(allocator.allocate(owner), 4);
        assert_eq!(allocator.len(), 4);
    }

    #[test]
    fn test_claim_collision() {
        let mut allocator = IslandAllocator::new();
        let a = Address::new([1; 20]);
        let b = Address::new([2; 20]);
        let id = allocator.allocate(a);
        assert_eq!(
            allocator.claim(id, b),
            Err(InventoryError::IslandIdCollision {
                island_id: id,
                owner: a,
                requested_by: b
            })
        );
        // Re-claiming for the same owner is a collision too
        assert!(allocator.claim(id, a).is_err());
    }

    #[test]
    fn test_total_plan_round_robin() {
        let mut accounts = generate_accounts(3, &KeySource::default()).unwrap();
        let mut allocator = IslandAllocator::new();
        let mapping = assign_islands(&mut accounts, IslandPlan::Total(4), &mut allocator).unwrap();

        assert_eq!(mapping.len(), 3);
        assert_eq!(accounts[0].owned_islands(), &BTreeSet::from([1, 4]));
        assert_eq!(accounts[1].owned_islands(), &BTreeSet::from([2]));
        assert_eq!(accounts[2].owned_islands(), &BTreeSet::from([3]));
        assert_eq!(allocator.owner_of(4), Some(accounts[0].address()));
    }

    #[test]
    fn test_per_account_plan() {
        let mut accounts = generate_accounts(2, &KeySource::default()).unwrap();
        let mut allocator = IslandAllocator::new();
        assign_islands(&mut accounts, IslandPlan::PerAccount(3), &mut allocator).unwrap();
        assert!(accounts.iter().all(|a| a.owned_islands().len() == 3));
        assert_eq!(allocator.len(), 6);
    }

    #[test]
    fn test_no_accounts() {
        let mut allocator = IslandAllocator::new();
        assert_eq!(
            assign_islands(&mut [], IslandPlan::Total(1), &mut allocator),
            Err(InventoryError::NoAccounts)
        );
        assert!(assign_islands(&mut [], IslandPlan::Total(0), &mut allocator)
            .unwrap()
            .is_empty());
    }
}
