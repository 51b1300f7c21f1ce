mod common;

use common::{done, start, token, FlakyHistory, Harness, DOC};
use folio_persist::{InMemoryPersistenceClient, PersistenceClient};
use folio_session::{
    FailureReason, LifecycleState, LoadSource, SessionConfig, SessionError, SessionUpdate,
};
use folio_types::{HighlightContext, MessageRole, StreamEvent, ThreadId};
use std::sync::Arc;
use std::time::Duration;

/// One thread per entry, each holding a single user message
async fn seeded_store(threads: &[(&str, &str)]) -> InMemoryPersistenceClient {
    let store = InMemoryPersistenceClient::new();
    for (thread_id, content) in threads.iter().copied() {
        store.insert_thread_with_id(thread_id, DOC, None).await;
        store
            .append_message(thread_id, MessageRole::User, content, None)
            .await
            .unwrap();
        // Distinct creation times
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    store
}

fn contents(messages: &[folio_types::Message]) -> Vec<String> {
    messages.iter().map(|m| m.content.clone()).collect()
}

async fn wait_switching(h: &Harness) -> LifecycleState {
    for _ in 0..100 {
        let snapshot = h.handle.snapshot().await.unwrap();
        if matches!(snapshot.state, LifecycleState::Switching { .. }) {
            return snapshot.state;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("switch was never deferred");
}

#[tokio::test]
async fn test_new_thread_is_idempotent() {
    let h = Harness::new().await;

    assert_eq!(h.handle.new_thread().await.unwrap(), ThreadId::Pending);
    assert_eq!(h.handle.new_thread().await.unwrap(), ThreadId::Pending);

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, LifecycleState::PendingNew);
    assert_eq!(snapshot.active, Some(ThreadId::Pending));
    assert!(snapshot.messages.is_empty());
}

#[tokio::test]
async fn test_empty_and_concurrent_sends_are_rejected() {
    let h = Harness::new().await;

    assert!(matches!(
        h.handle.send_message("   ").await,
        Err(SessionError::EmptyMessage)
    ));

    let _tx = h.backend.expect_stream().await;
    h.handle.send_message("first").await.unwrap();
    assert!(matches!(
        h.handle.send_message("second").await,
        Err(SessionError::SendInFlight(ThreadId::Pending))
    ));
}

#[tokio::test]
async fn test_pending_thread_migrates_exactly_once() {
    let mut h = Harness::new().await;
    let real = ThreadId::real("th-1");

    let tx = h.backend.expect_stream().await;
    let receipt = h.handle.send_message("What is this paper about?").await.unwrap();
    assert_eq!(receipt.thread, ThreadId::Pending);

    tx.send(start("th-1")).await.unwrap();
    match h.wait_migrated().await {
        SessionUpdate::ThreadMigrated { thread_id, .. } => assert_eq!(thread_id, "th-1"),
        other => panic!("unexpected update: {:?}", other),
    }

    // One slot, under the new identity
    let cache = h.handle.cache().clone();
    assert!(!cache.contains(&ThreadId::Pending).await);
    let slot = cache.get(&real).await;
    assert_eq!(contents(&slot), vec!["What is this paper about?"]);
    assert!(slot.iter().all(|m| m.thread_id == real));

    tx.send(token("It is about ")).await.unwrap();
    tx.send(token("proteins.")).await.unwrap();
    tx.send(done()).await.unwrap();

    match h.wait_completed().await {
        SessionUpdate::SendCompleted { thread, message } => {
            assert_eq!(thread, real);
            assert_eq!(message.content, "It is about proteins.");
            assert_eq!(message.referenced_pages(), vec![2]);
        }
        other => panic!("unexpected update: {:?}", other),
    }

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, LifecycleState::Active("th-1".to_string()));
    assert_eq!(snapshot.messages.len(), 2);
    assert!(snapshot.messages.iter().all(|m| m.thread_id == real));
    assert_eq!(snapshot.threads[0].id, "th-1");

    // A later start on the now-real thread never migrates again
    let tx = h.backend.expect_stream().await;
    h.handle.send_message("And the method?").await.unwrap();
    tx.send(start("th-other")).await.unwrap();
    tx.send(done()).await.unwrap();
    h.wait_completed().await;

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.active, Some(real.clone()));
    assert!(!cache.contains(&ThreadId::real("th-other")).await);
    assert_eq!(cache.len().await, 1);

    let requests = h.backend.requests().await;
    assert_eq!(requests[0].thread_id, None);
    assert_eq!(requests[0].document_id, DOC);
    assert_eq!(requests[1].thread_id.as_deref(), Some("th-1"));
}

#[tokio::test]
async fn test_tokens_are_applied_in_order() {
    let mut h = Harness::new().await;
    let tx = h.backend.expect_stream().await;
    h.handle.send_message("spell it").await.unwrap();

    tx.send(start("th-1")).await.unwrap();
    for fragment in ["A", "B", "C"] {
        tx.send(token(fragment)).await.unwrap();
    }

    for (expected, total) in [("A", 1), ("B", 2), ("C", 3)] {
        h.wait_for(|u| {
            matches!(
                u,
                SessionUpdate::StreamingContent { delta, length, .. }
                    if delta == expected && *length == total
            )
        })
        .await;
    }
    assert_eq!(
        h.handle.snapshot().await.unwrap().streaming.as_deref(),
        Some("ABC")
    );

    tx.send(done()).await.unwrap();
    match h.wait_completed().await {
        SessionUpdate::SendCompleted { message, .. } => assert_eq!(message.content, "ABC"),
        other => panic!("unexpected update: {:?}", other),
    }
}

#[tokio::test]
async fn test_undrained_updates_do_not_stall_the_session() {
    let h = Harness::new().await;
    let tx = h.backend.expect_stream().await;
    h.handle.send_message("write a lot").await.unwrap();

    tx.send(start("th-1")).await.unwrap();
    for _ in 0..1100 {
        tx.send(token("x")).await.unwrap();
    }

    // Nothing reads `h.updates` here
    let streamed = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let snapshot = h.handle.snapshot().await.unwrap();
            let length = snapshot.streaming.map(|s| s.len()).unwrap_or(0);
            if length == 1100 {
                return length;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("session stopped answering");
    assert_eq!(streamed, 1100);

    let pin = tokio::time::timeout(Duration::from_secs(1), h.handle.add_pin("p", 1))
        .await
        .expect("session stopped answering");
    assert!(pin.is_ok());
}

#[tokio::test]
async fn test_server_error_rolls_back_and_keeps_pins() {
    let store = seeded_store(&[("t-1", "earlier question")]).await;
    let mut h = Harness::with_store(store, SessionConfig::default()).await;

    h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();
    h.wait_for(|u| matches!(u, SessionUpdate::MessagesLoaded { messages, .. } if !messages.is_empty()))
        .await;
    let before = h.handle.snapshot().await.unwrap().messages;

    h.handle.add_pin("Figure 2 shows", 4).await.unwrap();
    let tx = h.backend.expect_stream().await;
    h.handle.send_message("Explain the figure").await.unwrap();
    tx.send(Ok(StreamEvent::Error {
        content: "model overloaded".to_string(),
    }))
    .await
    .unwrap();

    match h.wait_failed().await {
        SessionUpdate::SendFailed {
            thread,
            reason,
            message,
        } => {
            assert_eq!(thread, ThreadId::real("t-1"));
            assert_eq!(reason, FailureReason::Server);
            assert_eq!(message, "model overloaded");
        }
        other => panic!("unexpected update: {:?}", other),
    }

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.messages, before);
    assert_eq!(snapshot.pins.len(), 1);
    assert!(!snapshot.is_streaming());
}

#[tokio::test]
async fn test_connection_failure_on_pending_thread() {
    let mut h = Harness::new().await;
    h.backend.expect_failure("connection refused").await;

    h.handle.send_message("hello").await.unwrap();

    match h.wait_failed().await {
        SessionUpdate::SendFailed { reason, .. } => assert_eq!(reason, FailureReason::Transport),
        other => panic!("unexpected update: {:?}", other),
    }
    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.messages.is_empty());
    assert_eq!(snapshot.state, LifecycleState::PendingNew);
    assert!(h.handle.cache().thread_ids().await.iter().all(|t| t.is_pending()));
}

#[tokio::test]
async fn test_failure_after_migration_keeps_real_identity() {
    let mut h = Harness::new().await;
    let tx = h.backend.expect_stream().await;
    h.handle.send_message("hello").await.unwrap();

    tx.send(start("th-9")).await.unwrap();
    tx.send(token("partial")).await.unwrap();
    h.wait_migrated().await;
    drop(tx);

    match h.wait_failed().await {
        SessionUpdate::SendFailed { thread, reason, .. } => {
            assert_eq!(thread, ThreadId::real("th-9"));
            assert_eq!(reason, FailureReason::Transport);
        }
        other => panic!("unexpected update: {:?}", other),
    }

    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.active, Some(ThreadId::real("th-9")));
    assert!(snapshot.messages.is_empty());
    assert!(!h.handle.cache().contains(&ThreadId::Pending).await);
}

#[tokio::test]
async fn test_idle_stream_times_out() {
    let config = SessionConfig::default().with_idle_timeout(Duration::from_millis(100));
    let mut h = Harness::with_config(config).await;

    let _tx = h.backend.expect_stream().await;
    h.handle.send_message("anyone there?").await.unwrap();

    match h.wait_failed().await {
        SessionUpdate::SendFailed { reason, .. } => assert_eq!(reason, FailureReason::Timeout),
        other => panic!("unexpected update: {:?}", other),
    }
    assert!(h.handle.snapshot().await.unwrap().messages.is_empty());
}

#[tokio::test]
async fn test_pins_travel_structured_and_clear_on_success() {
    let mut h = Harness::new().await;
    h.handle.add_pin("The loss decreases", 3).await.unwrap();
    h.handle.add_pin("Table 1", 5).await.unwrap();
    h.handle.set_page_context(Some(12)).await.unwrap();

    let tx = h.backend.expect_stream().await;
    h.handle.send_message("Explain this").await.unwrap();
    tx.send(start("th-1")).await.unwrap();
    tx.send(done()).await.unwrap();
    h.wait_completed().await;

    let request = &h.backend.requests().await[0];
    assert_eq!(request.query, "Explain this");
    assert_eq!(request.page_context, Some(12));
    assert_eq!(
        request.highlight_contexts,
        Some(vec![
            HighlightContext { text: "The loss decreases".to_string(), page: 3 },
            HighlightContext { text: "Table 1".to_string(), page: 5 },
        ])
    );

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.pins.is_empty());
    assert_eq!(snapshot.messages[0].content, "Explain this");
    assert_eq!(snapshot.messages[0].pinned_contexts().len(), 2);
}

#[tokio::test]
async fn test_remove_pin() {
    let h = Harness::new().await;
    let pin = h.handle.add_pin("excerpt", 1).await.unwrap();

    assert!(h.handle.remove_pin(pin.id).await.unwrap());
    assert!(!h.handle.remove_pin(pin.id).await.unwrap());
    assert!(h.handle.snapshot().await.unwrap().pins.is_empty());
}

#[tokio::test]
async fn test_response_lands_on_its_thread_after_switching_away() {
    let store = seeded_store(&[("t-1", "seed"), ("t-2", "other")]).await;
    let mut h = Harness::with_store(store.clone(), SessionConfig::default()).await;

    h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();
    h.wait_for(|u| matches!(u, SessionUpdate::MessagesLoaded { messages, .. } if !messages.is_empty()))
        .await;

    let tx = h.backend.expect_stream().await;
    h.handle.send_message("q1").await.unwrap();
    tx.send(Ok(StreamEvent::Start { thread_id: None, title: None }))
        .await
        .unwrap();
    tx.send(token("A")).await.unwrap();
    h.wait_for(|u| matches!(u, SessionUpdate::StreamingContent { delta, .. } if delta == "A"))
        .await;

    let outcome = h.handle.switch_thread(ThreadId::real("t-2")).await.unwrap();
    assert_eq!(outcome.source, LoadSource::History);

    // The server persists the exchange before reporting completion
    store
        .append_message("t-1", MessageRole::User, "q1", None)
        .await
        .unwrap();
    store
        .append_message("t-1", MessageRole::Assistant, "AB", None)
        .await
        .unwrap();
    tx.send(token("B")).await.unwrap();
    tx.send(done()).await.unwrap();

    match h.wait_completed().await {
        SessionUpdate::SendCompleted { thread, message } => {
            assert_eq!(thread, ThreadId::real("t-1"));
            assert_eq!(message.content, "AB");
        }
        other => panic!("unexpected update: {:?}", other),
    }
    assert_eq!(h.handle.snapshot().await.unwrap().active, Some(ThreadId::real("t-2")));

    let outcome = h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();
    assert_eq!(outcome.source, LoadSource::Cache);
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(contents(&snapshot.messages), vec!["seed", "q1", "AB"]);
}

#[tokio::test]
async fn test_reconciliation_adopts_server_copies() {
    let store = seeded_store(&[("t-1", "seed")]).await;
    let mut h = Harness::with_store(store.clone(), SessionConfig::default()).await;

    h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();
    h.wait_for(|u| matches!(u, SessionUpdate::MessagesLoaded { messages, .. } if !messages.is_empty()))
        .await;

    let tx = h.backend.expect_stream().await;
    h.handle.send_message("q").await.unwrap();
    store
        .append_message("t-1", MessageRole::User, "q", None)
        .await
        .unwrap();
    store
        .append_message("t-1", MessageRole::Assistant, "answer", None)
        .await
        .unwrap();
    tx.send(token("answer")).await.unwrap();
    tx.send(done()).await.unwrap();
    h.wait_completed().await;

    let reconciled = h
        .wait_for(|u| {
            matches!(u, SessionUpdate::MessagesLoaded { messages, .. }
                if messages.len() == 3 && messages.iter().all(|m| !m.id.is_temp()))
        })
        .await;
    match reconciled {
        SessionUpdate::MessagesLoaded { thread, messages } => {
            assert_eq!(thread, ThreadId::real("t-1"));
            assert_eq!(contents(&messages), vec!["seed", "q", "answer"]);
        }
        other => panic!("unexpected update: {:?}", other),
    }
}

#[tokio::test]
async fn test_switch_waits_for_pending_thread_identity() {
    let store = seeded_store(&[("t-2", "other")]).await;
    let mut h = Harness::with_store(store, SessionConfig::default()).await;

    let tx = h.backend.expect_stream().await;
    h.handle.send_message("hello").await.unwrap();

    let handle = h.handle.clone();
    let switch = tokio::spawn(async move { handle.switch_thread(ThreadId::real("t-2")).await });

    assert_eq!(
        wait_switching(&h).await,
        LifecycleState::Switching {
            from: Some(ThreadId::Pending),
            to: ThreadId::real("t-2"),
        }
    );
    assert!(matches!(
        h.handle.send_message("again").await,
        Err(SessionError::SwitchInProgress)
    ));

    tx.send(start("th-new")).await.unwrap();
    let outcome = switch.await.unwrap().unwrap();
    assert_eq!(outcome.thread, ThreadId::real("t-2"));
    assert_eq!(outcome.source, LoadSource::History);

    // The flushed messages went to the server identity, never to a stale pending slot
    let cache = h.handle.cache().clone();
    assert!(!cache.contains(&ThreadId::Pending).await);
    assert_eq!(contents(&cache.get(&ThreadId::real("th-new")).await), vec!["hello"]);

    tx.send(token("X")).await.unwrap();
    tx.send(done()).await.unwrap();
    match h.wait_completed().await {
        SessionUpdate::SendCompleted { thread, .. } => assert_eq!(thread, ThreadId::real("th-new")),
        other => panic!("unexpected update: {:?}", other),
    }
    assert_eq!(
        contents(&cache.get(&ThreadId::real("th-new")).await),
        vec!["hello", "X"]
    );
    assert_eq!(h.handle.snapshot().await.unwrap().active, Some(ThreadId::real("t-2")));
}

#[tokio::test]
async fn test_later_switch_supersedes_deferred_one() {
    let store = seeded_store(&[("t-2", "two"), ("t-3", "three")]).await;
    let h = Harness::with_store(store, SessionConfig::default()).await;

    let tx = h.backend.expect_stream().await;
    h.handle.send_message("hello").await.unwrap();

    let handle = h.handle.clone();
    let first = tokio::spawn(async move { handle.switch_thread(ThreadId::real("t-2")).await });
    wait_switching(&h).await;

    let handle = h.handle.clone();
    let second = tokio::spawn(async move { handle.switch_thread(ThreadId::real("t-3")).await });

    assert!(matches!(
        first.await.unwrap(),
        Err(SessionError::SwitchSuperseded)
    ));

    tx.send(start("th-new")).await.unwrap();
    let outcome = second.await.unwrap().unwrap();
    assert_eq!(outcome.thread, ThreadId::real("t-3"));
}

#[tokio::test]
async fn test_deferred_switch_completes_when_stream_errors_before_start() {
    let store = seeded_store(&[("t-2", "other")]).await;
    let mut h = Harness::with_store(store, SessionConfig::default()).await;

    let tx = h.backend.expect_stream().await;
    h.handle.send_message("hello").await.unwrap();

    let handle = h.handle.clone();
    let switch = tokio::spawn(async move { handle.switch_thread(ThreadId::real("t-2")).await });
    wait_switching(&h).await;

    tx.send(Ok(StreamEvent::Error {
        content: "model overloaded".to_string(),
    }))
    .await
    .unwrap();

    let outcome = switch.await.unwrap().unwrap();
    assert_eq!(outcome.thread, ThreadId::real("t-2"));
    assert_eq!(outcome.source, LoadSource::History);
    match h.wait_failed().await {
        SessionUpdate::SendFailed { thread, reason, .. } => {
            assert_eq!(thread, ThreadId::Pending);
            assert_eq!(reason, FailureReason::Server);
        }
        other => panic!("unexpected update: {:?}", other),
    }

    // Flushed under the pending identity, without the rolled-back message
    let cache = h.handle.cache().clone();
    assert!(cache.contains(&ThreadId::Pending).await);
    assert!(cache.get(&ThreadId::Pending).await.is_empty());
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, LifecycleState::Active("t-2".to_string()));
}

#[tokio::test]
async fn test_deferred_switch_completes_when_stream_times_out() {
    let store = seeded_store(&[("t-2", "other")]).await;
    let config = SessionConfig::default().with_idle_timeout(Duration::from_millis(200));
    let h = Harness::with_store(store, config).await;

    let _tx = h.backend.expect_stream().await;
    h.handle.send_message("hello").await.unwrap();

    let handle = h.handle.clone();
    let switch = tokio::spawn(async move { handle.switch_thread(ThreadId::real("t-2")).await });
    wait_switching(&h).await;

    let outcome = tokio::time::timeout(Duration::from_secs(5), switch)
        .await
        .expect("switch never completed")
        .unwrap()
        .unwrap();
    assert_eq!(outcome.thread, ThreadId::real("t-2"));
    assert!(h.handle.cache().get(&ThreadId::Pending).await.is_empty());
}

#[tokio::test]
async fn test_failed_history_load_is_retried_on_return() {
    let store = seeded_store(&[("t-1", "seed"), ("t-2", "other")]).await;
    let flaky = Arc::new(FlakyHistory::new(store.clone(), 1));
    let mut h = Harness::with_persistence(store, flaky.clone(), SessionConfig::default()).await;

    let outcome = h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();
    assert_eq!(outcome.source, LoadSource::History);
    for _ in 0..100 {
        if flaky.failures_left() == 0 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert_eq!(flaky.failures_left(), 0);

    h.handle.switch_thread(ThreadId::real("t-2")).await.unwrap();
    h.wait_for(|u| {
        matches!(u, SessionUpdate::MessagesLoaded { thread, messages }
            if thread == &ThreadId::real("t-2") && !messages.is_empty())
    })
    .await;

    let outcome = h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();
    assert_eq!(outcome.source, LoadSource::History);
    match h
        .wait_for(|u| {
            matches!(u, SessionUpdate::MessagesLoaded { thread, messages }
                if thread == &ThreadId::real("t-1") && !messages.is_empty())
        })
        .await
    {
        SessionUpdate::MessagesLoaded { messages, .. } => {
            assert_eq!(contents(&messages), vec!["seed"]);
        }
        other => panic!("unexpected update: {:?}", other),
    }
}

#[tokio::test]
async fn test_delete_active_thread_rehomes_to_newest() {
    let store = seeded_store(&[("t-a", "a"), ("t-b", "b"), ("t-c", "c")]).await;
    let h = Harness::with_store(store.clone(), SessionConfig::default()).await;

    h.handle.switch_thread(ThreadId::real("t-c")).await.unwrap();
    let active = h.handle.delete_thread(ThreadId::real("t-c")).await.unwrap();

    assert_eq!(active, Some(ThreadId::real("t-b")));
    assert!(store.get_thread("t-c").await.unwrap().is_none());

    let snapshot = h.handle.snapshot().await.unwrap();
    assert!(snapshot.threads.iter().all(|t| t.id != "t-c"));
    assert!(!h.handle.cache().contains(&ThreadId::real("t-c")).await);
}

#[tokio::test]
async fn test_delete_last_thread_returns_to_pending() {
    let store = seeded_store(&[("t-1", "only")]).await;
    let h = Harness::with_store(store, SessionConfig::default()).await;

    h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();
    let active = h.handle.delete_thread(ThreadId::real("t-1")).await.unwrap();

    assert_eq!(active, Some(ThreadId::Pending));
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.state, LifecycleState::PendingNew);
    assert!(snapshot.messages.is_empty());
}

#[tokio::test]
async fn test_delete_pending_thread_is_local() {
    let store = seeded_store(&[("t-1", "x")]).await;
    let h = Harness::with_store(store.clone(), SessionConfig::default()).await;

    let active = h.handle.delete_thread(ThreadId::Pending).await.unwrap();

    assert_eq!(active, Some(ThreadId::real("t-1")));
    assert_eq!(store.thread_count().await, 1);
}

#[tokio::test]
async fn test_deleting_streaming_thread_cancels_response() {
    let store = seeded_store(&[("t-1", "seed")]).await;
    let mut h = Harness::with_store(store, SessionConfig::default()).await;
    h.handle.switch_thread(ThreadId::real("t-1")).await.unwrap();

    let _tx = h.backend.expect_stream().await;
    h.handle.send_message("question").await.unwrap();
    h.handle.delete_thread(ThreadId::real("t-1")).await.unwrap();

    match h.wait_failed().await {
        SessionUpdate::SendFailed { reason, .. } => assert_eq!(reason, FailureReason::Cancelled),
        other => panic!("unexpected update: {:?}", other),
    }
    assert!(!h.handle.cache().contains(&ThreadId::real("t-1")).await);
}

#[tokio::test]
async fn test_delete_unknown_thread_reports_not_found() {
    let h = Harness::new().await;
    let result = h.handle.delete_thread(ThreadId::real("missing")).await;
    assert!(matches!(result, Err(SessionError::Persist(_))));
}

#[tokio::test]
async fn test_rename_and_refresh_threads() {
    let store = seeded_store(&[("t-1", "x")]).await;
    let h = Harness::with_store(store.clone(), SessionConfig::default()).await;

    let renamed = h.handle.rename_thread("t-1", "Key results").await.unwrap();
    assert_eq!(renamed.display_title(), "Key results");
    let snapshot = h.handle.snapshot().await.unwrap();
    assert_eq!(snapshot.threads[0].display_title(), "Key results");

    store.create_thread(DOC, None).await.unwrap();
    let threads = h.handle.refresh_threads().await.unwrap();
    assert_eq!(threads.len(), 2);
}
