//! End-to-end runtime tests: real registry, real session loops, in-memory
//! capabilities.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use {
    apiary_queue::MemoryJobQueue,
    apiary_responder::{EchoResponder, Responder},
    apiary_runtime::{Capabilities, Orchestrator, pipeline},
    apiary_store::{BotConfig, MemoryStore},
    apiary_transport::{InboundEvent, MemoryTransport, SenderInfo},
    apiary_workflows::{Trigger, WorkflowRule, WorkflowStep},
    async_trait::async_trait,
    secrecy::Secret,
    std::{sync::Arc, time::Duration},
    tokio::sync::Notify,
    uuid::Uuid,
};

struct World {
    transport: Arc<MemoryTransport>,
    store: Arc<MemoryStore>,
    orchestrator: Orchestrator,
}

fn world() -> World {
    let transport = Arc::new(MemoryTransport::new());
    let store = Arc::new(MemoryStore::new());
    let orchestrator = Orchestrator::new(Capabilities {
        transport: transport.clone(),
        store: store.clone(),
        responder: Arc::new(EchoResponder),
        queue: Arc::new(MemoryJobQueue::new()),
    });
    World { transport, store, orchestrator }
}

fn bot(token: &str, ai_enabled: bool) -> BotConfig {
    BotConfig {
        id: Uuid::new_v4(),
        account_id: Uuid::new_v4(),
        username: Some(format!("bot-{token}")),
        token: Secret::new(token.to_owned()),
        ai_enabled,
        ..Default::default()
    }
}

fn message(chat_id: i64, body: &str) -> InboundEvent {
    let sender =
        SenderInfo { user_id: 42, username: Some("ada".into()), display_name: None };
    InboundEvent::from_text(chat_id, sender, body)
}

async fn wait_until(what: &str, check: impl Fn() -> bool) {
    for _ in 0..400 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

// Holds the first generate() call until released, so the test can line up
// queued events and a stop behind an in-flight one.
struct GatedResponder {
    started: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl Responder for GatedResponder {
    async fn generate(
        &self,
        _: &str,
        user_text: &str,
        _: &str,
    ) -> apiary_responder::Result<String> {
        self.started.notify_one();
        self.release.notified().await;
        Ok(format!("reply to {user_text}"))
    }
}

#[tokio::test]
async fn events_route_to_their_own_tenant() {
    let w = world();
    let alpha = bot("tok-alpha", true);
    let beta = bot("tok-beta", true);
    let (alpha_account, beta_account) = (alpha.account_id, beta.account_id);
    w.store.add_bot(alpha.clone());
    w.store.add_bot(beta.clone());

    w.orchestrator.start_all_active().await.unwrap();

    assert!(w.transport.push("tok-alpha", message(100, "ping tenant one")).await);
    assert!(w.transport.push("tok-beta", message(200, "ping tenant two")).await);

    wait_until("both replies", || w.transport.sent().len() == 2).await;
    assert_eq!(w.transport.sent_texts(100), vec!["Echo: ping tenant one".to_owned()]);
    assert_eq!(w.transport.sent_texts(200), vec!["Echo: ping tenant two".to_owned()]);

    wait_until("both context rows", || w.store.conversations().len() == 2).await;
    let rows = w.store.conversations();
    let alpha_row = rows.iter().find(|c| c.account_id == alpha_account).unwrap();
    let beta_row = rows.iter().find(|c| c.account_id == beta_account).unwrap();
    assert_eq!(alpha_row.context["last_user_message"], "ping tenant one");
    assert_eq!(beta_row.context["last_user_message"], "ping tenant two");
}

#[tokio::test]
async fn stopping_one_tenant_leaves_the_other_live() {
    let w = world();
    let alpha = bot("tok-alpha", true);
    let beta = bot("tok-beta", true);
    let alpha_id = alpha.id;
    w.store.add_bot(alpha);
    w.store.add_bot(beta);
    w.orchestrator.start_all_active().await.unwrap();

    w.orchestrator.stop(alpha_id);
    wait_until("alpha released", || !w.transport.is_subscribed("tok-alpha")).await;

    assert!(!w.transport.push("tok-alpha", message(100, "anyone home?")).await);
    assert!(w.transport.push("tok-beta", message(200, "still here")).await);
    wait_until("beta reply", || !w.transport.sent_texts(200).is_empty()).await;
    assert_eq!(w.transport.sent_texts(200), vec!["Echo: still here".to_owned()]);
    assert_eq!(w.orchestrator.active_count(), 1);
}

#[tokio::test]
async fn stop_all_releases_every_subscription() {
    let w = world();
    for token in ["tok-1", "tok-2", "tok-3"] {
        w.store.add_bot(bot(token, false));
    }
    w.orchestrator.start_all_active().await.unwrap();
    assert_eq!(w.orchestrator.active_count(), 3);

    w.orchestrator.shutdown();

    assert_eq!(w.orchestrator.active_count(), 0);
    for token in ["tok-1", "tok-2", "tok-3"] {
        wait_until("subscription released", || !w.transport.is_subscribed(token)).await;
        assert!(!w.transport.push(token, message(1, "hello?")).await);
    }
}

#[tokio::test]
async fn stop_during_an_in_flight_event_drops_queued_events() {
    let transport = Arc::new(MemoryTransport::new());
    let started = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let orchestrator = Orchestrator::new(Capabilities {
        transport: transport.clone(),
        store: Arc::new(MemoryStore::new()),
        responder: Arc::new(GatedResponder {
            started: started.clone(),
            release: release.clone(),
        }),
        queue: Arc::new(MemoryJobQueue::new()),
    });
    let config = bot("tok-1", true);
    let bot_id = config.id;
    orchestrator.start(config).await.unwrap();

    assert!(transport.push("tok-1", message(7, "first")).await);
    started.notified().await;

    // These land in the subscription buffer while "first" is in flight.
    for n in 1..=4 {
        assert!(transport.push("tok-1", message(7, &format!("queued {n}"))).await);
    }
    orchestrator.stop(bot_id);
    assert_eq!(orchestrator.active_count(), 0);
    release.notify_one();

    // The loop finishes the in-flight event, then observes the stop and
    // releases its subscription without touching the queued events.
    wait_until("subscription released", || !transport.is_subscribed("tok-1")).await;
    assert_eq!(transport.sent_texts(7), vec!["reply to first".to_owned()]);
}

#[tokio::test]
async fn workflow_triggers_fire_through_the_loop() {
    let w = world();
    let mut config = bot("tok-1", false);
    config.welcome_message = Some("Welcome!".into());
    let bot_id = config.id;
    w.store.add_bot(config);
    w.store.add_workflow(bot_id, WorkflowRule {
        id: Uuid::new_v4(),
        name: "Greeting flow".into(),
        description: Some("Welcomes new customers".into()),
        trigger: Trigger::Command { command: "/start".into() },
        steps: vec![WorkflowStep { kind: "message".into(), label: Some("Send intro".into()) }],
    });
    w.store.add_workflow(bot_id, WorkflowRule {
        id: Uuid::new_v4(),
        name: "Order intake".into(),
        description: None,
        trigger: Trigger::Message { pattern: "order".into() },
        steps: vec![],
    });
    w.orchestrator.start_all_active().await.unwrap();

    // /start: welcome plus exactly one announcement, for the command rule.
    assert!(w.transport.push("tok-1", message(7, "/start")).await);
    wait_until("start replies", || w.transport.sent_texts(7).len() == 2).await;
    let sent = w.transport.sent_texts(7);
    assert_eq!(sent[0], "Welcome!");
    assert!(sent[1].contains("Greeting flow"));

    // Unrelated text with AI off: nothing is sent.
    assert!(w.transport.push("tok-1", message(7, "just browsing")).await);
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(w.transport.sent_texts(7).len(), 2);

    // Matching text: the message rule announces, case-insensitively.
    assert!(w.transport.push("tok-1", message(7, "I want to ORDER pizza")).await);
    wait_until("order announcement", || w.transport.sent_texts(7).len() == 3).await;
    let sent = w.transport.sent_texts(7);
    assert!(sent[2].contains("Order intake"));
}

#[tokio::test]
async fn callbacks_ack_through_the_loop() {
    let w = world();
    let config = bot("tok-1", false);
    let account_id = config.account_id;
    w.store.add_bot(config);
    w.orchestrator.start_all_active().await.unwrap();

    let sender = SenderInfo { user_id: 42, username: None, display_name: None };
    let event = InboundEvent::callback(7, sender, "cb-1", "choice:blue");
    assert!(w.transport.push("tok-1", event).await);

    wait_until("callback ack", || !w.transport.acks().is_empty()).await;
    assert_eq!(
        w.transport.acks(),
        vec![("cb-1".to_owned(), pipeline::CALLBACK_ACK.to_owned())]
    );
    let rows = w.store.conversations();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].account_id, account_id);
    assert_eq!(rows[0].context["last_callback"], "choice:blue");
}
