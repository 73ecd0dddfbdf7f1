//! # Subscribe Flows
//!
//! Validation, decryption, version detection and target routing of
//! envelopes produced by a real emitter.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use proptest::prelude::*;

    use pipeline_core::{
        EncryptedEnvelope, EventKind, HandleOutcome, PipelineError, PipelineVersion,
        SubscriberApi, Target, VersionedPayload,
    };

    use crate::fixtures::*;

    async fn emitted<S: pipeline_core::PipelineSource>(source: &S) -> Vec<EncryptedEnvelope> {
        let publisher = Arc::new(RecordingPublisher::default());
        emitter(Arc::clone(&publisher))
            .emit_created(source)
            .await
            .unwrap();
        publisher.envelopes()
    }

    fn test_emitter(foo: &str) -> TestEmitter {
        TestEmitter {
            foo: foo.to_string(),
        }
    }

    // =========================================================================
    // DECODE
    // =========================================================================

    #[tokio::test]
    async fn test_detects_version_from_type_info() {
        let envelopes = emitted(&test_emitter("bar")).await;
        let subscriber = subscriber();

        let v1 = subscriber.decode_payload(&envelopes[0]).unwrap();
        let v2 = subscriber.decode_payload(&envelopes[1]).unwrap();

        assert_eq!(v1.version(), PipelineVersion::new(1, 1));
        assert_eq!(v2.version(), PipelineVersion::new(2, 0));
        assert_eq!(v2.event_kind(), Some(EventKind::Created));
        assert_eq!(
            v2.downcast_ref::<TestEmitterV2_0>(),
            Some(&TestEmitterV2_0 {
                foo: "bar".to_string()
            })
        );
    }

    #[tokio::test]
    async fn test_envelope_with_only_salt_and_iv_never_routes() {
        let subscriber = subscriber();
        let counter = CallCounter::default();
        let hits = counter.clone();
        subscriber
            .targets()
            .register::<TestEmitterV2_0>(Target::action(move |_| {
                hits.hit();
                Ok(())
            }));

        let envelope = EncryptedEnvelope {
            salt: "00".repeat(16),
            iv: "00".repeat(24),
            ..Default::default()
        };
        let err = subscriber.handle_envelope(&envelope).await.unwrap_err();

        assert!(matches!(err, PipelineError::MalformedEnvelope { .. }));
        assert_eq!(counter.count(), 0);
    }

    #[tokio::test]
    async fn test_garbage_bytes_are_malformed() {
        let err = subscriber()
            .handle_bytes(&[0xff, 0xff, 0xff])
            .await
            .unwrap_err();
        assert!(matches!(err, PipelineError::MalformedEnvelope { .. }));
    }

    #[tokio::test]
    async fn test_tampered_ciphertext_fails_decryption() {
        let mut envelope = emitted(&test_emitter("bar")).await.remove(1);
        envelope.ciphertext.push_str("00");

        let err = subscriber().handle_envelope(&envelope).await.unwrap_err();
        assert!(matches!(err, PipelineError::DecryptionFailure { .. }));
    }

    #[tokio::test]
    async fn test_unregistered_type_is_unresolved() {
        let mut envelope = emitted(&test_emitter("bar")).await.remove(1);
        envelope.type_info = Some("test_pipeline.Gizmo_3_0".to_string());

        let err = subscriber().handle_envelope(&envelope).await.unwrap_err();
        match err {
            PipelineError::UnresolvedPayloadType { type_info } => {
                assert_eq!(type_info, "test_pipeline.Gizmo_3_0");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_mismatched_schema_fails_decode() {
        let mut envelope = emitted(&test_emitter("bar")).await.remove(1);
        envelope.type_info = Some(TestEmitterV1_1::TYPE_NAME.to_string());

        let err = subscriber().handle_envelope(&envelope).await.unwrap_err();
        assert!(matches!(err, PipelineError::DecodeFailure { .. }));
    }

    // =========================================================================
    // ROUTING
    // =========================================================================

    #[tokio::test]
    async fn test_no_target_is_ignored() {
        let envelopes = emitted(&test_emitter("bar")).await;
        let outcome = subscriber().handle_envelope(&envelopes[1]).await.unwrap();
        assert!(matches!(outcome, HandleOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_record_target_constructs_and_saves() {
        let envelopes = emitted(&test_emitter("bar")).await;
        let subscriber = subscriber();
        subscriber
            .targets()
            .register::<TestEmitterV2_0>(Target::record::<TestModel>());

        let outcome = subscriber.handle_envelope(&envelopes[1]).await.unwrap();
        let model = outcome.record::<TestModel>().unwrap();
        assert_eq!(model.foo, "bar");
        assert!(model.persisted);
    }

    #[tokio::test]
    async fn test_record_save_failure_surfaces() {
        let envelopes = emitted(&test_emitter("")).await;
        let subscriber = subscriber();
        subscriber
            .targets()
            .register::<TestEmitterV2_0>(Target::record::<TestModel>());

        let err = subscriber.handle_envelope(&envelopes[1]).await.unwrap_err();
        assert!(matches!(err, PipelineError::TargetPersistFailure { .. }));
        assert!(err.to_string().contains("foo can't be blank"));
    }

    #[tokio::test]
    async fn test_action_target_invoked_once() {
        let envelopes = emitted(&test_emitter("bar")).await;
        let subscriber = subscriber();
        let counter = CallCounter::default();
        let hits = counter.clone();
        subscriber
            .targets()
            .register::<TestEmitterV2_0>(Target::typed_action(move |p: &TestEmitterV2_0| {
                assert_eq!(p.foo, "bar");
                hits.hit();
                Ok(())
            }));

        let outcome = subscriber.handle_envelope(&envelopes[1]).await.unwrap();
        assert!(matches!(outcome, HandleOutcome::ActionInvoked));
        assert_eq!(counter.count(), 1);

        // The 1_1 envelope has no target of its own.
        let outcome = subscriber.handle_envelope(&envelopes[0]).await.unwrap();
        assert!(matches!(outcome, HandleOutcome::Ignored));
        assert_eq!(counter.count(), 1);
    }

    #[tokio::test]
    async fn test_action_error_surfaces() {
        let envelopes = emitted(&test_emitter("bar")).await;
        let subscriber = subscriber();
        subscriber
            .targets()
            .register::<TestEmitterV2_0>(Target::action(|_| anyhow::bail!("downstream offline")));

        let err = subscriber.handle_envelope(&envelopes[1]).await.unwrap_err();
        assert!(matches!(err, PipelineError::TargetActionFailure { .. }));
    }

    #[tokio::test]
    async fn test_registering_none_removes_target() {
        let envelopes = emitted(&test_emitter("bar")).await;
        let subscriber = subscriber();
        subscriber
            .targets()
            .register::<TestEmitterV2_0>(Target::record::<TestModel>())
            .register_name(TestEmitterV2_0::TYPE_NAME, None);

        let outcome = subscriber.handle_envelope(&envelopes[1]).await.unwrap();
        assert!(matches!(outcome, HandleOutcome::Ignored));
    }

    #[tokio::test]
    async fn test_transport_bytes_round_trip() {
        let publisher = Arc::new(RecordingPublisher::default());
        emitter(Arc::clone(&publisher))
            .emit_updated(&TestModelWithTable::new("bar"))
            .await
            .unwrap();

        let subscriber = subscriber();
        let counter = CallCounter::default();
        let hits = counter.clone();
        subscriber
            .targets()
            .register::<TestModelWithTableV1_1>(Target::typed_action(
                move |p: &TestModelWithTableV1_1| {
                    assert_eq!(p.extra, "hi");
                    hits.hit();
                    Ok(())
                },
            ));

        for (_, bytes) in publisher.calls() {
            subscriber.handle_bytes(&bytes).await.unwrap();
        }
        assert_eq!(counter.count(), 1);
    }

    // =========================================================================
    // PROPERTIES
    // =========================================================================

    proptest! {
        #[test]
        fn prop_emitted_payload_decodes_to_source(foo in "[a-zA-Z0-9 ]{0,64}") {
            let emitter = emitter(Arc::new(RecordingPublisher::default()));
            let subscriber = subscriber();

            let envelope = emitter
                .create_envelope(&test_emitter(&foo), PipelineVersion::new(2, 0), None)
                .unwrap();
            let decoded = subscriber.decode_payload(&envelope).unwrap();

            prop_assert_eq!(decoded.version(), PipelineVersion::new(2, 0));
            prop_assert_eq!(
                decoded.downcast_ref::<TestEmitterV2_0>().map(|p| p.foo.as_str()),
                Some(foo.as_str())
            );
        }
    }
}
