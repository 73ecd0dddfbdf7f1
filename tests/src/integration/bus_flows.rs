//! # Bus Flows
//!
//! Emitter and subscriber connected through the in-memory channel bus.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use pipeline_core::{
        AdapterReport, Metrics, PipelineError, Subscriber, SubscriberApi, SubscriberBusAdapter,
        Target, TargetRegistry,
    };
    use shared_bus::{ChannelFilter, InMemoryChannelBus, Publisher};
    use shared_crypto::XChaChaProvider;

    use crate::fixtures::*;

    #[tokio::test]
    async fn test_widget_flow_end_to_end() {
        let bus = Arc::new(InMemoryChannelBus::new());
        let subscriber = Arc::new(subscriber());

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        subscriber
            .targets()
            .register::<TestEmitterV2_0>(Target::record::<TestModel>())
            .register::<TestEmitterV1_1>(Target::typed_action(move |p: &TestEmitterV1_1| {
                sink.lock().push(p.clone());
                Ok(())
            }));

        let adapter = SubscriberBusAdapter::new(
            &bus,
            Arc::clone(&subscriber),
            ChannelFilter::prefix(format!("{NAMESPACE}-{STAGE}-")),
        )
        .unwrap();
        let consumer = tokio::spawn(adapter.run());

        emitter(Arc::clone(&bus))
            .emit_created(&TestEmitter {
                foo: "bar".to_string(),
            })
            .await
            .unwrap();
        bus.close();

        let report = consumer.await.unwrap();
        assert_eq!(report, AdapterReport { handled: 2, failed: 0, lagged: 0 });
        assert_eq!(
            seen.lock().as_slice(),
            &[TestEmitterV1_1 {
                foo: "bar".to_string(),
                extra: "hi".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_adapter_only_sees_its_major_channel() {
        let bus = Arc::new(InMemoryChannelBus::new());
        let adapter = SubscriberBusAdapter::new(
            &bus,
            Arc::new(subscriber()),
            ChannelFilter::channels(["harrys-test-v2-test_emitters"]),
        )
        .unwrap();
        let consumer = tokio::spawn(adapter.run());

        emitter(Arc::clone(&bus))
            .emit_updated(&TestEmitter {
                foo: "bar".to_string(),
            })
            .await
            .unwrap();
        bus.close();

        assert_eq!(
            consumer.await.unwrap(),
            AdapterReport { handled: 1, failed: 0, lagged: 0 }
        );
    }

    #[tokio::test]
    async fn test_foreign_tenant_cannot_be_opened() {
        let bus = Arc::new(InMemoryChannelBus::new());
        let mut subscription = bus.subscribe(ChannelFilter::all()).unwrap();

        emitter(Arc::clone(&bus))
            .emit_created(&TestModelWithTable {
                foo: "bar".to_string(),
                tenant: Some("acme".to_string()),
            })
            .await
            .unwrap();

        // Knows only the default key.
        let outsider = Subscriber::new(
            Arc::new(XChaChaProvider::with_default_key(secret_key())),
            catalog(),
            Arc::new(TargetRegistry::new()),
        );

        let message = subscription.recv().await.unwrap();
        let err = outsider.handle_bytes(&message.payload).await.unwrap_err();
        assert!(matches!(err, PipelineError::DecryptionFailure { .. }));

        let insider = subscriber();
        assert!(insider.handle_bytes(&message.payload).await.is_ok());
    }

    #[tokio::test]
    async fn test_slow_consumer_reports_lost_envelopes() {
        let bus = Arc::new(InMemoryChannelBus::with_capacity(1));
        let metrics = Arc::new(Metrics::new());
        let adapter =
            SubscriberBusAdapter::new(&bus, Arc::new(subscriber()), ChannelFilter::all())
                .unwrap()
                .with_metrics(metrics.clone());

        let emitter = emitter(Arc::clone(&bus));
        for i in 0..3 {
            let report = emitter
                .emit_created(&TestEmitter { foo: format!("bar-{i}") })
                .await
                .unwrap();
            assert_eq!(report.published.len(), 2);
        }
        bus.close();

        let report = tokio::spawn(adapter.run()).await.unwrap();
        assert_eq!(
            report,
            AdapterReport {
                handled: 1,
                failed: 0,
                lagged: 5
            }
        );
        assert_eq!(metrics.snapshot().envelopes_lagged, 5);
    }

    #[tokio::test]
    async fn test_unreadable_message_does_not_stop_consumer() {
        let bus = Arc::new(InMemoryChannelBus::new());
        let adapter =
            SubscriberBusAdapter::new(&bus, Arc::new(subscriber()), ChannelFilter::all()).unwrap();
        let consumer = tokio::spawn(adapter.run());

        bus.publish("harrys-test-v1-test_emitters", b"not an envelope".to_vec())
            .await
            .unwrap();
        emitter(Arc::clone(&bus))
            .emit_created(&DefaultEmitter {
                foo: "bar".to_string(),
            })
            .await
            .unwrap();
        bus.close();

        assert_eq!(
            consumer.await.unwrap(),
            AdapterReport { handled: 1, failed: 1, lagged: 0 }
        );
    }
}
