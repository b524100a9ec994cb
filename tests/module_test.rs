// Public API surface tests
use chainex_core::*;

#[test]
fn test_all_modules_loaded() {
    let _config = CoreConfig::default();
    let _cache = RecoveryCache::default();
    let _decompressor = BoundedDecompressor::default();
    let _core = Core::new(Digest::hash(b"chain"));

    println!("OK: All modules loaded successfully");
}

#[test]
fn test_error_handling() {
    assert!("not hex".parse::<Digest>().is_err());
    assert!("UPPER".parse::<Name>().is_err());
    assert!(PackedTransaction::from_bytes(&[0xff]).is_err());
    assert_eq!(Compression::try_from(7).unwrap_err(), ChainError::UnknownCompression(7));
    assert!(matches!(
        Transaction::default().get_transaction_sender(),
        Err(ChainError::PreconditionViolation(_))
    ));

    println!("OK: Error handling test passed");
}

#[test]
fn test_empty_packed_transaction() {
    let packed = PackedTransaction::new();
    assert_eq!(packed.compression().unwrap(), Compression::None);
    assert!(packed.get_context_free_data().unwrap().is_empty());
    assert!(matches!(packed.get_transaction(), Err(ChainError::MalformedEncoding(_))));
    // four length/tag fields: signatures (8) + tag (1) + cfd (8) + trx (8)
    assert_eq!(packed.get_billable_size().unwrap(), 25);
}

#[test]
fn test_transaction_json_roundtrip() {
    let json = r#"{
        "header": {
            "expiration": 1900000000,
            "ref_block_num": 7,
            "ref_block_prefix": 99,
            "max_net_usage_words": 0,
            "max_cpu_usage_ms": 0,
            "delay_sec": 0
        },
        "context_free_actions": [],
        "actions": [{
            "account": "chainex",
            "name": "issue",
            "authorization": [{ "actor": "bisbpa", "permission": "active" }],
            "data": [1, 2, 3]
        }],
        "fee_multiple_level": 10000
    }"#;
    let tx: Transaction = serde_json::from_str(json).unwrap();
    assert_eq!(tx.get_transaction_sender().unwrap().to_string(), "bisbpa");
    assert_eq!(tx.get_transaction_fee(&FeeSchedule::default()).unwrap(), DEFAULT_FEE_PER_ACTION);

    let back: Transaction = serde_json::from_str(&serde_json::to_string(&tx).unwrap()).unwrap();
    assert_eq!(back, tx);
    assert_eq!(back.id().unwrap(), tx.id().unwrap());
}

#[test]
fn test_config_drives_core() {
    let config = CoreConfig::from_json_str(r#"{ "recovery_cache_capacity": 3, "fee": { "base_fee_per_action": 2 } }"#)
        .unwrap();
    let core = Core::with_config(Digest::hash(b"chain"), &config);
    assert_eq!(core.recovery_cache().capacity(), 3);
    assert_eq!(core.fee_schedule().base_fee_per_action, Amount::new(2));
}

#[test]
fn test_different_transactions_different_ids() {
    let a = Transaction {
        fee_multiple_level: 1,
        ..Default::default()
    };
    let b = Transaction {
        fee_multiple_level: 2,
        ..Default::default()
    };
    assert_ne!(a.id().unwrap(), b.id().unwrap());

    println!("OK: Different transactions produce different ids test passed");
}
