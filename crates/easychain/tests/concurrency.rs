//! Concurrent use of a single ledger.

use std::sync::Arc;

use anyhow::Result;

use easychain::store::MemoryStore;
use easychain::{Ledger, LedgerConfig};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_records_form_one_unforked_block() -> Result<()> {
    let ledger = Arc::new(Ledger::new("busy", MemoryStore::new(), LedgerConfig::default()));

    let mut handles = Vec::new();
    for task in 0..8 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                ledger.record(format!("task {} message {}", task, i)).await?;
            }
            Ok::<_, easychain::LedgerError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    assert_eq!(ledger.pending_len().await, 200);
    ledger.commit().await?;
    ledger.validate().await?;

    let chain = ledger.snapshot().await;
    assert_eq!(chain.len(), 1);
    let messages = chain.blocks()[0].messages();
    assert_eq!(messages.len(), 200);
    assert_eq!(messages[0].prev_hash, None);
    for pair in messages.windows(2) {
        assert_eq!(pair[1].prev_hash, pair[0].hash());
    }
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commits_keep_chain_linear() -> Result<()> {
    let store = Arc::new(MemoryStore::new());
    let config = LedgerConfig {
        persist_on_commit: true,
        ..LedgerConfig::default()
    };
    let ledger = Arc::new(Ledger::open("linear", store.clone(), config).await?);

    let mut handles = Vec::new();
    for task in 0..6 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            for i in 0..5 {
                ledger.record(format!("{}:{}", task, i)).await?;
                ledger.commit().await?;
            }
            Ok::<_, easychain::LedgerError>(())
        }));
    }
    for handle in handles {
        handle.await??;
    }

    ledger.validate().await?;
    let chain = ledger.snapshot().await;
    assert_eq!(chain.message_count(), 30);
    assert!(chain.len() <= 30);

    // Saves may finish out of order; a final persist brings the store level.
    ledger.persist().await?;
    let reopened = Ledger::open("linear", store, LedgerConfig::default()).await?;
    assert_eq!(reopened.head_hash().await, ledger.head_hash().await);
    Ok(())
}
