//! End-to-end contract behavior through the service, on both backends.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use ramdisk_state::{
    ActionOutcome, Authority, ClaimBasis, ContractError, InMemoryRegistry, Ramdisk,
};
use ramdisk_store::{Database, DatabaseConfig, FileBackend, InMemoryBackend, StorageBackend};
use ramdisk_test_utils::{
    CrashInjector, CrashPoint, CrashingBackend, TEST_MAX_NODE_BYTES, TestDir, test_limits_config,
};
use ramdisk_types::{Action, ErrorCode, Name, Owner, Transaction, VolumeUsage};

fn name(s: &str) -> Name {
    s.parse().unwrap()
}

fn registry() -> InMemoryRegistry {
    InMemoryRegistry::new()
        .with_account(name("alice"))
        .with_account(name("bob"))
        .with_account(name("taken"))
        .with_bid(name("open"), name("alice"), 500)
        .with_bid(name("won"), name("alice"), -500)
}

fn service<B: StorageBackend>(db: Database<B>) -> Ramdisk<B, InMemoryRegistry> {
    Ramdisk::builder().db(Arc::new(db)).registry(registry()).limits(test_limits_config()).build()
}

fn memory() -> Ramdisk<InMemoryBackend, InMemoryRegistry> {
    service(Database::open_in_memory().unwrap())
}

fn code(err: &ContractError) -> ErrorCode {
    err.code()
}

// ============================================================================
// Claims
// ============================================================================

#[test]
fn test_claim_rules() {
    let ramdisk = memory();
    let alice = name("alice");
    let auth = Authority::new([alice]);

    assert_eq!(ramdisk.claim(&auth, alice, name("abcdefghijkl")).unwrap(), ClaimBasis::Unrestricted);
    assert_eq!(ramdisk.claim(&auth, alice, alice).unwrap(), ClaimBasis::OwnName);
    assert_eq!(ramdisk.claim(&auth, alice, name("data.alice")).unwrap(), ClaimBasis::ParentOwner);
    assert_eq!(ramdisk.claim(&auth, alice, name("won")).unwrap(), ClaimBasis::AuctionWinner);
    assert_eq!(ramdisk.claim(&auth, alice, name("free")).unwrap(), ClaimBasis::Unregistered);

    let err = ramdisk.claim(&auth, alice, name("open")).unwrap_err();
    assert_eq!(code(&err), ErrorCode::AuctionOpen);
    let err = ramdisk.claim(&auth, alice, name("taken")).unwrap_err();
    assert_eq!(code(&err), ErrorCode::SuffixUnowned);
    let err = ramdisk.claim(&auth, alice, name("data.bob")).unwrap_err();
    assert_eq!(code(&err), ErrorCode::SuffixUnowned);
}

#[test]
fn test_claim_by_losing_bidder_is_rejected() {
    let ramdisk = memory();
    let bob = name("bob");
    let err = ramdisk.claim(&Authority::new([bob]), bob, name("won")).unwrap_err();
    assert_eq!(code(&err), ErrorCode::WrongBidder);
    assert!(ramdisk.volume(name("won")).unwrap().is_none());
}

#[test]
fn test_claim_is_unique_and_records_claimant() {
    let ramdisk = memory();
    let (alice, bob) = (name("alice"), name("bob"));
    let volume = name("sharedvolume");

    ramdisk.claim(&Authority::new([alice]), alice, volume).unwrap();
    let err = ramdisk.claim(&Authority::new([bob]), bob, volume).unwrap_err();
    assert_eq!(code(&err), ErrorCode::NamespaceAlreadyClaimed);

    let record = ramdisk.volume(volume).unwrap().unwrap();
    assert_eq!(record.owner, Owner::Active(alice));
    assert_eq!(record.payer, alice);
}

#[test]
fn test_claim_requires_claimant_authority() {
    let ramdisk = memory();
    let err = ramdisk.claim(&Authority::new([name("bob")]), name("alice"), name("alice")).unwrap_err();
    assert_eq!(code(&err), ErrorCode::MissingAuthority);
}

// ============================================================================
// Volume lifecycle
// ============================================================================

#[test]
fn test_frozen_volume_rejects_every_mutation() {
    let ramdisk = memory();
    let alice = name("alice");
    let auth = Authority::new([alice]);
    ramdisk.claim(&auth, alice, alice).unwrap();
    ramdisk.set_node(&auth, alice, alice, 1, b"keep").unwrap();
    ramdisk.freeze(&auth, alice, alice).unwrap();

    let record = ramdisk.volume(alice).unwrap().unwrap();
    assert!(record.owner.is_frozen());
    assert_eq!(record.payer, alice);

    let failures = [
        ramdisk.set_node(&auth, alice, alice, 2, b"x").map(|_| ()),
        ramdisk.delete_node(&auth, alice, alice, 1).map(|_| ()),
        ramdisk.delete_range(&auth, alice, alice, 0, 10).map(|_| ()),
        ramdisk.delete_contiguous(&auth, alice, alice, 1, 1).map(|_| ()),
        ramdisk.reset(&auth, alice, alice).map(|_| ()),
        ramdisk.delete(&auth, alice, alice).map(|_| ()),
        ramdisk.freeze(&auth, alice, alice),
    ];
    for result in failures {
        assert_eq!(code(&result.unwrap_err()), ErrorCode::NotOwner);
    }
    assert_eq!(ramdisk.node(alice, 1).unwrap().unwrap().data, b"keep");
}

#[test]
fn test_delete_then_reclaim_starts_empty() {
    let ramdisk = memory();
    let alice = name("alice");
    let auth = Authority::new([alice]);
    ramdisk.claim(&auth, alice, alice).unwrap();
    for id in 0..4 {
        ramdisk.set_node(&auth, alice, alice, id, b"v").unwrap();
    }

    assert_eq!(ramdisk.delete(&auth, alice, alice).unwrap(), 4);
    assert!(ramdisk.volume(alice).unwrap().is_none());
    assert_eq!(ramdisk.volume_usage(alice).unwrap(), None);

    ramdisk.claim(&auth, alice, alice).unwrap();
    assert!(ramdisk.list_nodes(alice, None, 100).unwrap().is_empty());
}

#[test]
fn test_operations_on_missing_volume() {
    let ramdisk = memory();
    let alice = name("alice");
    let auth = Authority::new([alice]);
    let err = ramdisk.set_node(&auth, alice, alice, 1, b"x").unwrap_err();
    assert_eq!(code(&err), ErrorCode::NamespaceNotFound);
    let err = ramdisk.reset(&auth, alice, alice).unwrap_err();
    assert_eq!(code(&err), ErrorCode::NamespaceNotFound);
}

#[test]
fn test_non_owner_cannot_write() {
    let ramdisk = memory();
    let (alice, bob) = (name("alice"), name("bob"));
    ramdisk.claim(&Authority::new([alice]), alice, alice).unwrap();

    let err = ramdisk.set_node(&Authority::new([bob]), bob, alice, 1, b"x").unwrap_err();
    assert_eq!(code(&err), ErrorCode::NotOwner);
    let err = ramdisk.set_node(&Authority::new([bob]), alice, alice, 1, b"x").unwrap_err();
    assert_eq!(code(&err), ErrorCode::MissingAuthority);
}

// ============================================================================
// Nodes
// ============================================================================

#[test]
fn test_node_size_limit() {
    let ramdisk = memory();
    let alice = name("alice");
    let auth = Authority::new([alice]);
    ramdisk.claim(&auth, alice, alice).unwrap();

    let at_limit = vec![7u8; TEST_MAX_NODE_BYTES];
    assert!(ramdisk.set_node(&auth, alice, alice, 1, &at_limit).unwrap());

    let over = vec![7u8; TEST_MAX_NODE_BYTES + 1];
    let err = ramdisk.set_node(&auth, alice, alice, 2, &over).unwrap_err();
    assert_eq!(code(&err), ErrorCode::InvalidArgument);
    assert!(ramdisk.node(alice, 2).unwrap().is_none());

    assert!(ramdisk.set_node(&auth, alice, alice, 3, b"").unwrap());
    assert_eq!(ramdisk.node(alice, 3).unwrap().unwrap().data, b"");
}

#[test]
fn test_namespaces_are_isolated() {
    let ramdisk = memory();
    let (alice, bob) = (name("alice"), name("bob"));
    let (auth_a, auth_b) = (Authority::new([alice]), Authority::new([bob]));
    ramdisk.claim(&auth_a, alice, alice).unwrap();
    ramdisk.claim(&auth_b, bob, bob).unwrap();

    for id in [0, 1, 2, u64::MAX] {
        ramdisk.set_node(&auth_a, alice, alice, id, b"a").unwrap();
        ramdisk.set_node(&auth_b, bob, bob, id, b"b").unwrap();
    }

    assert_eq!(ramdisk.delete_range(&auth_a, alice, alice, 0, u64::MAX).unwrap(), 4);
    assert_eq!(ramdisk.delete_contiguous(&auth_a, alice, alice, 0, 10).unwrap(), 0);
    assert_eq!(ramdisk.list_nodes(bob, None, 10).unwrap().len(), 4);
    assert_eq!(ramdisk.node(bob, u64::MAX).unwrap().unwrap().data, b"b");

    assert_eq!(ramdisk.reset(&auth_b, bob, bob).unwrap(), 4);
    assert_eq!(ramdisk.volume_usage(bob).unwrap(), Some(VolumeUsage::default()));
}

#[test]
fn test_range_and_contiguous_deletes() {
    let ramdisk = memory();
    let alice = name("alice");
    let auth = Authority::new([alice]);
    ramdisk.claim(&auth, alice, alice).unwrap();
    for id in [1, 2, 3, 5, 8, 9] {
        ramdisk.set_node(&auth, alice, alice, id, b"n").unwrap();
    }

    assert_eq!(ramdisk.delete_range(&auth, alice, alice, 9, 1).unwrap(), 0);
    assert_eq!(ramdisk.delete_contiguous(&auth, alice, alice, 1, 100).unwrap(), 3);
    assert_eq!(ramdisk.delete_range(&auth, alice, alice, 4, 8).unwrap(), 2);

    let remaining: Vec<u64> =
        ramdisk.list_nodes(alice, None, 10).unwrap().into_iter().map(|n| n.id).collect();
    assert_eq!(remaining, vec![9]);
}

// ============================================================================
// Transactions
// ============================================================================

#[test]
fn test_failed_transaction_leaves_file_untouched() {
    let dir = TestDir::new();
    let ramdisk = service(Database::open(dir.db_path()).unwrap());
    let alice = name("alice");
    let auth = Authority::new([alice]);
    ramdisk.claim(&auth, alice, alice).unwrap();
    ramdisk.set_node(&auth, alice, alice, 1, b"before").unwrap();

    let before = std::fs::read(dir.db_path()).unwrap();
    let tx = Transaction::new([alice])
        .with_action(Action::SetNode { owner: alice, volume: alice, id: 1, data: b"after".to_vec() })
        .with_action(Action::SetNode { owner: alice, volume: alice, id: 2, data: b"new".to_vec() })
        .with_action(Action::Claim { claimant: alice, volume: alice });

    let err = ramdisk.execute(&tx).unwrap_err();
    assert_eq!(err.action_index(), Some(2));
    assert_eq!(code(&err), ErrorCode::NamespaceAlreadyClaimed);
    assert!(matches!(err.root(), ContractError::NamespaceAlreadyClaimed { .. }));

    assert_eq!(std::fs::read(dir.db_path()).unwrap(), before);
    assert_eq!(ramdisk.node(alice, 1).unwrap().unwrap().data, b"before");
    assert!(ramdisk.node(alice, 2).unwrap().is_none());
}

#[test]
fn test_transaction_sees_its_own_writes() {
    let ramdisk = memory();
    let alice = name("alice");
    let tx = Transaction::new([alice])
        .with_action(Action::Claim { claimant: alice, volume: alice })
        .with_action(Action::SetNode { owner: alice, volume: alice, id: 4, data: vec![1] })
        .with_action(Action::SetNode { owner: alice, volume: alice, id: 5, data: vec![2] })
        .with_action(Action::DeleteContiguous { owner: alice, volume: alice, start: 4, count: 5 })
        .with_action(Action::Freeze { owner: alice, volume: alice });

    let outcomes = ramdisk.execute(&tx).unwrap();
    assert_eq!(outcomes[3], ActionOutcome::NodesDeleted { removed: 2 });
    assert_eq!(outcomes[4], ActionOutcome::Frozen);
    assert!(ramdisk.volume(alice).unwrap().unwrap().owner.is_frozen());
}

#[test]
fn test_commit_failure_leaves_state_unchanged() {
    let injector = CrashInjector::new(CrashPoint::AfterWrite);
    let backend = CrashingBackend::new(InMemoryBackend::new(), Arc::clone(&injector));
    let db = Database::with_backend(backend, DatabaseConfig::default()).unwrap();
    let ramdisk = service(db);
    let alice = name("alice");
    let auth = Authority::new([alice]);
    ramdisk.claim(&auth, alice, alice).unwrap();

    injector.arm();
    let err = ramdisk.set_node(&auth, alice, alice, 1, b"lost").unwrap_err();
    assert!(injector.has_crashed());
    assert_eq!(code(&err), ErrorCode::StorageIo);
    assert!(ramdisk.node(alice, 1).unwrap().is_none());

    assert!(ramdisk.set_node(&auth, alice, alice, 1, b"kept").unwrap());
    assert_eq!(ramdisk.node(alice, 1).unwrap().unwrap().data, b"kept");
}

// ============================================================================
// Persistence
// ============================================================================

#[test]
fn test_reopen_restores_volumes_and_nodes() {
    let dir = TestDir::new();
    let alice = name("alice");
    let auth = Authority::new([alice]);
    {
        let ramdisk = service(Database::open(dir.db_path()).unwrap());
        ramdisk.claim(&auth, alice, alice).unwrap();
        ramdisk.claim(&auth, alice, name("logs.alice")).unwrap();
        ramdisk.set_node(&auth, alice, alice, 7, b"seven").unwrap();
        ramdisk.set_node(&auth, alice, name("logs.alice"), 7, b"log").unwrap();
        ramdisk.freeze(&auth, alice, name("logs.alice")).unwrap();
    }

    let ramdisk = service(Database::open(dir.db_path()).unwrap());
    assert_eq!(ramdisk.volume(alice).unwrap().unwrap().owner, Owner::Active(alice));
    assert!(ramdisk.volume(name("logs.alice")).unwrap().unwrap().owner.is_frozen());
    assert_eq!(ramdisk.node(alice, 7).unwrap().unwrap().data, b"seven");
    assert_eq!(
        ramdisk.volume_usage(name("logs.alice")).unwrap(),
        Some(VolumeUsage { node_count: 1, data_bytes: 3 })
    );
}

#[test]
fn test_corrupted_file_is_rejected() {
    let dir = TestDir::new();
    let alice = name("alice");
    {
        let ramdisk = service(Database::open(dir.db_path()).unwrap());
        ramdisk.claim(&Authority::new([alice]), alice, alice).unwrap();
    }
    let mut bytes = std::fs::read(dir.db_path()).unwrap();
    let middle = bytes.len() / 2;
    bytes[middle] ^= 0x40;
    std::fs::write(dir.db_path(), bytes).unwrap();

    let err = Database::<FileBackend>::open(dir.db_path()).err().unwrap();
    assert!(err.is_corruption());
}

#[test]
fn test_second_handle_on_same_file_is_rejected() {
    let dir = TestDir::new();
    let alice = name("alice");
    let auth = Authority::new([alice]);

    let ramdisk = service(Database::open(dir.db_path()).unwrap());
    ramdisk.claim(&auth, alice, alice).unwrap();

    // A second handle would replay the claim against its own stale snapshot.
    let err = Database::<FileBackend>::open(dir.db_path()).err().unwrap();
    assert!(matches!(err, ramdisk_store::Error::Locked { .. }), "got {err}");
    assert!(!err.is_corruption());

    drop(ramdisk);
    let ramdisk = service(Database::open(dir.db_path()).unwrap());
    let err = ramdisk.claim(&auth, alice, alice).unwrap_err();
    assert_eq!(code(&err), ErrorCode::NamespaceAlreadyClaimed);
}
