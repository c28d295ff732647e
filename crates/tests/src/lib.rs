//! # Integration Tests
//!
//! End-to-end tests across the workspace crates.
//!
//! Covers:
//! - Sample configuration loading
//! - Router scenarios on the mock transport (budgets, retry, shutdown, faults)
//! - HTTP delivery against a local fake vendor

#[cfg(test)]
mod contract_tests {
    use contracts::{MessageType, TransportConfig};

    #[test]
    fn test_contracts_compile() {
        let _ = contracts::ConfigVersion::V1;
        assert_eq!(MessageType::ALL.len(), 3);
        assert_eq!(TransportConfig::default().kind(), "http");
    }

    #[test]
    fn test_sample_config_loads() {
        let path =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/router.toml");
        let blueprint = config_loader::ConfigLoader::load_from_path(&path).unwrap();

        assert_eq!(blueprint.vendors.len(), 3);
        assert_eq!(blueprint.vendor("ACL").unwrap().budget, 20);
        assert_eq!(blueprint.vendor("ValueFirst").unwrap().budget, 1);
        assert_eq!(blueprint.vendor("Twilio").unwrap().budget, 10);

        let otp = blueprint.preference(MessageType::Otp).unwrap();
        let order: Vec<_> = otp.candidates.iter().map(|c| c.vendor.as_str()).collect();
        assert_eq!(order, vec!["ACL", "ValueFirst"]);

        assert!(config_loader::ConfigLoader::warnings(&blueprint).is_empty());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{
        CandidateConfig, Message, MessageType, PreferenceConfig, RouterBlueprint, RouterSettings,
        TransportConfig, VendorSpec,
    };
    use router::{MockTransport, RouterContext, RouterHandle};

    /// Blueprint with one OTP preference list over `vendors`, in order
    fn blueprint(vendors: &[(&str, u64)]) -> RouterBlueprint {
        let mut router = RouterSettings::default();
        router.retry_poll_interval_ms = 2;
        router.drain_timeout_ms = 5_000;

        RouterBlueprint {
            version: Default::default(),
            router,
            transport: TransportConfig::Mock {
                latency_ms: 0,
                fail_every: 0,
            },
            vendors: vendors
                .iter()
                .enumerate()
                .map(|(i, (name, budget))| {
                    VendorSpec::new(
                        i as u32 + 1,
                        *name,
                        *budget,
                        format!("http://127.0.0.1:{}/", 8081 + i),
                    )
                })
                .collect(),
            preferences: vec![PreferenceConfig {
                message_type: MessageType::Otp,
                candidates: vendors
                    .iter()
                    .map(|(name, _)| CandidateConfig {
                        vendor: name.to_string(),
                        weight: 50.0,
                    })
                    .collect(),
            }],
        }
    }

    fn start(
        blueprint: &RouterBlueprint,
        transport: MockTransport,
    ) -> (RouterHandle<MockTransport>, Arc<MockTransport>) {
        let transport = Arc::new(transport);
        let router = RouterContext::with_transport(blueprint, Arc::clone(&transport))
            .unwrap()
            .start();
        (router, transport)
    }

    fn msg(id: u64, message_type: MessageType) -> Message {
        Message::new(id, message_type, format!("{} test", id), id.to_string())
    }

    async fn wait_until(mut check: impl FnMut() -> bool) -> bool {
        for _ in 0..500 {
            if check() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }

    /// Two concurrent messages over A(1), B(1): one reservation each, never
    /// more than one on either, both back to zero afterwards.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_two_vendors_budget_one_each() {
        let bp = blueprint(&[("A", 1), ("B", 1)]);
        let (router, transport) =
            start(&bp, MockTransport::new().with_latency(Duration::from_millis(200)));

        let sender = router.sender();
        sender.send(msg(1, MessageType::Otp)).await.unwrap();
        sender.send(msg(2, MessageType::Otp)).await.unwrap();
        drop(sender);

        let metrics = Arc::clone(router.metrics());
        assert!(wait_until(|| metrics.snapshot().dispatched == 2).await);
        assert_eq!(router.ledger().utilized("A"), Some(1));
        assert_eq!(router.ledger().utilized("B"), Some(1));
        assert_eq!(router.retry_depth(MessageType::Otp), 0);

        let report = router.drain(Duration::from_secs(5)).await;

        assert_eq!(report.metrics.delivered, 2);
        assert_eq!(transport.load("A").calls, 1);
        assert_eq!(transport.load("B").calls, 1);
        assert_eq!(transport.load("A").peak, 1);
        assert_eq!(transport.load("B").peak, 1);
        assert!(report.vendors.iter().all(|v| v.utilized == 0));
    }

    /// A(0): nothing is ever selected, the message waits in the retry queue
    /// and shutdown abandons it without touching the vendor.
    #[tokio::test]
    async fn test_zero_budget_waits_then_shuts_down_cleanly() {
        let mut bp = blueprint(&[("A", 0)]);
        bp.router.retry_poll_interval_ms = 20;
        let (router, transport) = start(&bp, MockTransport::new());

        router.sender().send(msg(1, MessageType::Otp)).await.unwrap();

        assert!(wait_until(|| router.retry_depth(MessageType::Otp) == 1).await);
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(router.retry_depth(MessageType::Otp), 1);

        let report = router.shutdown().await;

        assert_eq!(report.dispatch.queued, 1);
        assert_eq!(report.metrics.abandoned, 1);
        assert_eq!(report.metrics.retry_depth, 0);
        assert_eq!(report.metrics.in_flight, 0);
        assert_eq!(transport.calls(), 0);
        assert_eq!(report.vendors[0].utilized, 0);
    }

    /// Injected failures never leak a reservation.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_failures_do_not_leak_reservations() {
        let bp = blueprint(&[("A", 3), ("B", 2)]);
        let (router, transport) = start(
            &bp,
            MockTransport::new()
                .fail_every(3)
                .with_latency(Duration::from_millis(2)),
        );

        let sender = router.sender();
        for id in 0..300 {
            sender.send(msg(id, MessageType::Otp)).await.unwrap();
        }
        drop(sender);

        let report = router.drain(Duration::from_secs(10)).await;

        assert!(report.drained);
        assert_eq!(report.metrics.received, 300);
        assert_eq!(report.metrics.completed(), 300);
        assert_eq!(report.metrics.failed, 100);
        assert_eq!(report.metrics.delivered, 200);
        assert!(transport.load("A").peak <= 3);
        assert!(transport.load("B").peak <= 2);
        assert!(report.vendors.iter().all(|v| v.utilized == 0));
    }

    /// Calls that outlive the delivery timeout release their reservation.
    #[tokio::test]
    async fn test_timeouts_do_not_leak_reservations() {
        let mut bp = blueprint(&[("A", 2)]);
        bp.router.delivery_timeout_ms = 10;
        let (router, _transport) =
            start(&bp, MockTransport::new().with_latency(Duration::from_secs(5)));

        let sender = router.sender();
        for id in 0..6 {
            sender.send(msg(id, MessageType::Otp)).await.unwrap();
        }
        drop(sender);

        let report = router.drain(Duration::from_secs(5)).await;

        assert!(report.drained);
        assert_eq!(report.metrics.timed_out, 6);
        assert_eq!(report.metrics.dispatched + report.metrics.retry_dispatched, 6);
        assert_eq!(report.vendors[0].utilized, 0);
    }

    /// A queued message goes out soon after a reservation is released.
    #[tokio::test]
    async fn test_queued_messages_picked_up_after_release() {
        let bp = blueprint(&[("A", 1)]);
        let (router, transport) =
            start(&bp, MockTransport::new().with_latency(Duration::from_millis(30)));

        let sender = router.sender();
        for id in 0..3 {
            sender.send(msg(id, MessageType::Otp)).await.unwrap();
        }
        drop(sender);

        let report = tokio::time::timeout(
            Duration::from_secs(2),
            router.drain(Duration::from_secs(2)),
        )
        .await
        .expect("queued messages should be delivered in bounded time");

        assert_eq!(report.dispatch.dispatched, 1);
        assert_eq!(report.dispatch.queued, 2);
        assert_eq!(report.metrics.retry_dispatched, 2);
        assert_eq!(report.metrics.delivered, 3);
        assert_eq!(transport.load("A").peak, 1);
    }

    /// A message type without a preference list is rejected; the router keeps going.
    #[tokio::test]
    async fn test_unknown_message_type_rejected() {
        let bp = blueprint(&[("A", 5)]);
        let (router, transport) = start(&bp, MockTransport::new());

        let sender = router.sender();
        sender.send(msg(1, MessageType::Accept)).await.unwrap();
        sender.send(msg(2, MessageType::Otp)).await.unwrap();
        drop(sender);

        let report = router.drain(Duration::from_secs(2)).await;

        assert_eq!(report.dispatch.rejected, 1);
        assert_eq!(report.dispatch.dispatched, 1);
        assert_eq!(report.metrics.delivered, 1);
        assert_eq!(transport.calls(), 1);
    }

    /// Sample configuration on the mock transport: OTP fills ACL before
    /// ValueFirst, accept only ever uses Twilio.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sample_config_priority_routing() {
        let path =
            std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/router.toml");
        let mut bp = config_loader::ConfigLoader::load_from_path(&path).unwrap();
        bp.router.retry_poll_interval_ms = 1;

        let (router, transport) =
            start(&bp, MockTransport::new().with_latency(Duration::from_millis(5)));

        let sender = router.sender();
        for id in 0..200 {
            let message_type = if id % 4 == 0 {
                MessageType::Accept
            } else {
                MessageType::Otp
            };
            sender.send(msg(id, message_type)).await.unwrap();
        }
        drop(sender);

        let report = router.drain(Duration::from_secs(10)).await;

        assert!(report.drained);
        assert_eq!(report.metrics.delivered, 200);
        assert_eq!(transport.load("Twilio").calls, 50);
        assert_eq!(
            transport.load("ACL").calls + transport.load("ValueFirst").calls,
            150
        );
        assert!(transport.load("ACL").calls >= transport.load("ValueFirst").calls);
        assert!(transport.load("ACL").peak <= 20);
        assert!(transport.load("ValueFirst").peak <= 1);
        assert!(transport.load("Twilio").peak <= 10);
    }
}

#[cfg(test)]
mod http_tests {
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use contracts::{Message, MessageType, RouterBlueprint};
    use router::{HttpTransport, RouterContext};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Fake vendor answering every request with `status_line`
    async fn fake_vendor(status_line: &'static str) -> (String, Arc<AtomicU64>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicU64::new(0));

        let counter = Arc::clone(&hits);
        tokio::spawn(async move {
            loop {
                let Ok((mut stream, _)) = listener.accept().await else {
                    break;
                };
                let counter = Arc::clone(&counter);
                tokio::spawn(async move {
                    let mut buf = vec![0u8; 4096];
                    if stream.read(&mut buf).await.unwrap_or(0) == 0 {
                        return;
                    }
                    counter.fetch_add(1, Ordering::Relaxed);
                    let response = format!(
                        "HTTP/1.1 {}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                        status_line
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });

        (format!("http://{}/", addr), hits)
    }

    fn blueprint(ok_locator: &str, failing_locator: &str) -> RouterBlueprint {
        let json = format!(
            r#"{{
                "router": {{ "retry_poll_interval_ms": 2, "delivery_timeout_ms": 2000 }},
                "vendors": [
                    {{ "id": 1, "name": "Good", "budget": 2, "locator": "{ok_locator}" }},
                    {{ "id": 2, "name": "Broken", "budget": 2, "locator": "{failing_locator}" }}
                ],
                "preferences": [
                    {{ "message_type": "otp", "candidates": [{{ "vendor": "Good" }}] }},
                    {{ "message_type": "accept", "candidates": [{{ "vendor": "Broken" }}] }}
                ]
            }}"#
        );
        config_loader::ConfigLoader::load_from_str(&json, config_loader::ConfigFormat::Json)
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_http_delivery_end_to_end() {
        let (ok_locator, ok_hits) = fake_vendor("200 OK").await;
        let (bad_locator, bad_hits) = fake_vendor("500 Internal Server Error").await;
        let bp = blueprint(&ok_locator, &bad_locator);

        let transport = Arc::new(HttpTransport::new(Duration::from_secs(1)).unwrap());
        let router = RouterContext::with_transport(&bp, transport)
            .unwrap()
            .start();

        let sender = router.sender();
        for id in 0..10 {
            let message_type = if id < 8 {
                MessageType::Otp
            } else {
                MessageType::Accept
            };
            sender
                .send(Message::new(id, message_type, "hello", id.to_string()))
                .await
                .unwrap();
        }
        drop(sender);

        let report = router.drain(Duration::from_secs(10)).await;

        assert!(report.drained);
        assert_eq!(report.metrics.delivered, 8);
        assert_eq!(report.metrics.failed, 2);
        assert_eq!(ok_hits.load(Ordering::Relaxed), 8);
        assert_eq!(bad_hits.load(Ordering::Relaxed), 2);
        assert!(report.vendors.iter().all(|v| v.utilized == 0));
    }
}
