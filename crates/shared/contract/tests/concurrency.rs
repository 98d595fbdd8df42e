pub mod fixtures;

use fixtures::*;
use polycase_contract::prelude::*;
use std::sync::{Arc, Barrier};
use std::thread;

const THREADS: usize = 16;

#[test]
fn test_concurrent_misses_build_once() {
    let resolver = Arc::new(resolver(ContractPolicies::default()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let contracts: Vec<_> = (0..THREADS)
        .map(|_| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                resolver.contract_for::<Person>(NamingConvention::SnakeCase).unwrap()
            })
        })
        .collect::<Vec<_>>()
        .into_iter()
        .map(|handle| handle.join().unwrap())
        .collect();

    assert_eq!(resolver.builds(), 1);
    assert!(contracts.iter().all(|contract| Arc::ptr_eq(contract, &contracts[0])));
}

#[test]
fn test_concurrent_requests_keep_their_own_convention() {
    let resolver = Arc::new(resolver(ContractPolicies::LENIENT));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let resolver = Arc::clone(&resolver);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                let (label, key) =
                    if i % 2 == 0 { ("kebab-case", "first-name") } else { ("snake_case", "first_name") };
                barrier.wait();
                for _ in 0..100 {
                    let json = request_scope(headers(label), || resolver.to_value(&ada())).unwrap();
                    assert_eq!(json[key], "Ada", "{label}");
                    assert_eq!(json.as_object().map(serde_json::Map::len), Some(4));
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(resolver.builds(), 2);
    assert_eq!(resolver.cache().unwrap().len(), 2);
}

#[test]
fn test_concurrent_failed_builds_report_the_build_error() {
    let resolver = Arc::new(resolver(ContractPolicies::default()));

    for _ in 0..20 {
        let barrier = Arc::new(Barrier::new(THREADS));
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let resolver = Arc::clone(&resolver);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    resolver.contract_for::<Clashing>(NamingConvention::SnakeCase).unwrap_err()
                })
            })
            .collect();

        for handle in handles {
            let err = handle.join().unwrap();
            assert!(matches!(err, ContractError::DuplicateMember { .. }), "{err}");
        }
    }

    assert_eq!(resolver.builds(), 0);
    assert_eq!(resolver.cache().unwrap().len(), 0);
}
