//! # Emit Flows
//!
//! Channel naming, version discovery and per-version publishing.

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pipeline_core::{
        EmitterApi, EventKind, FailureStage, PipelineError, PipelineVersion, VersionedPayload,
    };

    use crate::fixtures::*;

    // =========================================================================
    // CHANNEL NAMING
    // =========================================================================

    #[test]
    fn test_channel_for_table_backed_source() {
        let naming = naming();
        assert_eq!(
            naming.channel_for::<TestModelWithTable>(PipelineVersion::DEFAULT),
            "harrys-test-v1-test_model_with_tables"
        );
    }

    #[test]
    fn test_minor_version_shares_major_channel() {
        let naming = naming();
        let v2_1 = PipelineVersion::parse("2_1").unwrap();
        let v2 = PipelineVersion::parse("2").unwrap();

        assert_eq!(
            naming.channel_for::<TestEmitter>(v2_1),
            naming.channel_for::<TestEmitter>(v2)
        );
        assert_eq!(
            naming.channel_for::<TestEmitter>(v2_1),
            "harrys-test-v2-test_emitters"
        );
    }

    // =========================================================================
    // VERSION DISCOVERY
    // =========================================================================

    #[test]
    fn test_explicit_versions_only() {
        let emitter = emitter(Arc::new(RecordingPublisher::default()));
        let versions: Vec<_> = emitter
            .schemas()
            .versions_for::<TestEmitter>()
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(
            versions,
            vec![PipelineVersion::new(1, 1), PipelineVersion::new(2, 0)]
        );
    }

    #[test]
    fn test_default_producer_is_1_0() {
        let emitter = emitter(Arc::new(RecordingPublisher::default()));
        let versions: Vec<_> = emitter
            .schemas()
            .versions_for::<DefaultEmitter>()
            .unwrap()
            .into_iter()
            .collect();

        assert_eq!(versions, vec![PipelineVersion::DEFAULT]);
    }

    #[tokio::test]
    async fn test_discovery_runs_once_per_type() {
        let emitter = emitter(Arc::new(RecordingPublisher::default()));
        let model = TestModelWithTable::new("bar");

        for _ in 0..3 {
            emitter.emit_updated(&model).await.unwrap();
        }
        assert_eq!(emitter.schemas().discoveries(), 1);
    }

    // =========================================================================
    // PUBLISHING
    // =========================================================================

    #[tokio::test]
    async fn test_default_emitter_publishes_one_decryptable_envelope() {
        let publisher = Arc::new(RecordingPublisher::default());
        let emitter = emitter(Arc::clone(&publisher));

        emitter
            .emit_created(&DefaultEmitter {
                foo: "bar".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(publisher.channels(), vec!["harrys-test-v1-default_emitters"]);

        let envelope = &publisher.envelopes()[0];
        assert_eq!(envelope.type_info(), Some(DefaultEmitterV1_0::TYPE_NAME));
        assert_eq!(envelope.owner_info, None);

        let payload = DefaultEmitterV1_0::decode(&decrypt(envelope)).unwrap();
        assert_eq!(
            payload,
            DefaultEmitterV1_0 {
                foo: "bar".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_two_versions_go_to_two_channels() {
        let publisher = Arc::new(RecordingPublisher::default());
        let emitter = emitter(Arc::clone(&publisher));

        let report = emitter
            .emit(
                &TestEmitter {
                    foo: "bar".to_string(),
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(
            report.channels(),
            vec!["harrys-test-v1-test_emitters", "harrys-test-v2-test_emitters"]
        );

        let envelopes = publisher.envelopes();
        let v1_1 = TestEmitterV1_1::decode(&decrypt(&envelopes[0])).unwrap();
        assert_eq!(v1_1.extra, "hi");

        let v2_0 = TestEmitterV2_0::decode(&decrypt(&envelopes[1])).unwrap();
        assert_eq!(v2_0.foo, "bar");
        assert!(envelopes.iter().all(|e| e.event_kind.is_none()));
    }

    #[tokio::test]
    async fn test_lifecycle_triggers_stamp_event_kind() {
        let publisher = Arc::new(RecordingPublisher::default());
        let emitter = emitter(Arc::clone(&publisher));
        let model = TestModelWithTable::new("bar");

        emitter.emit_created(&model).await.unwrap();
        emitter.emit_updated(&model).await.unwrap();
        emitter.emit_deleted(&model).await.unwrap();

        let kinds: Vec<_> = publisher
            .envelopes()
            .iter()
            .map(|e| e.event_kind)
            .collect();
        assert_eq!(
            kinds,
            vec![
                Some(EventKind::Created),
                Some(EventKind::Created),
                Some(EventKind::Updated),
                Some(EventKind::Updated),
                Some(EventKind::Deleted),
                Some(EventKind::Deleted),
            ]
        );
    }

    #[tokio::test]
    async fn test_salt_and_iv_differ_per_envelope() {
        let publisher = Arc::new(RecordingPublisher::default());
        let emitter = emitter(Arc::clone(&publisher));
        let model = TestModelWithTable::new("bar");

        emitter.emit_created(&model).await.unwrap();
        emitter.emit_created(&model).await.unwrap();

        let envelopes = publisher.envelopes();
        assert_ne!(envelopes[0].iv, envelopes[2].iv);
        assert_ne!(envelopes[0].salt, envelopes[2].salt);
    }

    #[tokio::test]
    async fn test_failing_channel_does_not_block_others() {
        let publisher = Arc::new(RecordingPublisher::rejecting("-v1-"));
        let emitter = emitter(Arc::clone(&publisher));

        let err = emitter
            .emit_created(&TestEmitter {
                foo: "bar".to_string(),
            })
            .await
            .unwrap_err();

        assert_eq!(publisher.channels(), vec!["harrys-test-v2-test_emitters"]);
        match err {
            PipelineError::PartialPublishFailure {
                published,
                failures,
                ..
            } => {
                assert_eq!(published, vec![PipelineVersion::new(2, 0)]);
                assert_eq!(failures.len(), 1);
                assert_eq!(failures[0].version, PipelineVersion::new(1, 1));
                assert_eq!(failures[0].stage, FailureStage::Publish);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_owner_key_selected_by_source() {
        let publisher = Arc::new(RecordingPublisher::default());
        let emitter = emitter(Arc::clone(&publisher));
        let model = TestModelWithTable {
            foo: "bar".to_string(),
            tenant: Some("acme".to_string()),
        };

        emitter.emit_created(&model).await.unwrap();

        let envelope = &publisher.envelopes()[0];
        assert_eq!(envelope.owner_info.as_deref(), Some("acme"));
        let payload = TestModelWithTableV1_0::decode(&decrypt(envelope)).unwrap();
        assert_eq!(payload.foo, "bar");
    }

    #[tokio::test]
    async fn test_unknown_owner_fails_at_encrypt() {
        let publisher = Arc::new(RecordingPublisher::default());
        let emitter = emitter(Arc::clone(&publisher));
        let model = TestModelWithTable {
            foo: "bar".to_string(),
            tenant: Some("globex".to_string()),
        };

        let err = emitter.emit_created(&model).await.unwrap_err();
        assert!(publisher.calls().is_empty());
        match err {
            PipelineError::PartialPublishFailure { failures, .. } => {
                assert_eq!(failures.len(), 2);
                assert!(failures.iter().all(|f| f.stage == FailureStage::Encrypt));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_create_envelope_for_single_version() {
        let emitter = emitter(Arc::new(RecordingPublisher::default()));
        let envelope = emitter
            .create_envelope(
                &TestEmitter {
                    foo: "bar".to_string(),
                },
                PipelineVersion::new(2, 0),
                Some(EventKind::Updated),
            )
            .unwrap();

        assert_eq!(envelope.type_info(), Some(TestEmitterV2_0::TYPE_NAME));
        assert_eq!(envelope.event_kind, Some(EventKind::Updated));
    }

    #[test]
    fn test_create_envelope_rejects_undeclared_version() {
        let emitter = emitter(Arc::new(RecordingPublisher::default()));
        let err = emitter
            .create_envelope(
                &TestEmitter {
                    foo: "bar".to_string(),
                },
                PipelineVersion::DEFAULT,
                None,
            )
            .unwrap_err();

        assert!(matches!(err, PipelineError::UnknownVersion { .. }));
    }
}
