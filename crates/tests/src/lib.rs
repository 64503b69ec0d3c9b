//! # Integration Tests
//!
//! 集成测试与端到端测试。
//!
//! 负责：
//! - 合约快照测试
//! - 完整转换流程测试（采集 → 分段 → 同步 → 分发）
//! - 数据集输出布局验证

#[cfg(test)]
mod contract_tests {
    #[test]
    fn test_contracts_compile() {
        // 验证 contracts crate 可编译
        let _ = contracts::ConfigVersion::V1;
    }
}

#[cfg(test)]
mod conversion_tests {
    use bytes::Bytes;
    use contracts::{ImageSample, JointSample};
    use sync_core::{
        compute_action_deltas, detect_episodes, joint_positions, split_by_episodes, synchronize,
        DEFAULT_MAX_OFFSET_MS,
    };

    fn joint(timestamp_ns: i64, marker: f64) -> JointSample {
        JointSample {
            timestamp_ns,
            names: vec!["shoulder".into(), "elbow".into(), "wrist".into()],
            position: vec![marker, -marker, marker * 0.5],
            velocity: None,
        }
    }

    fn joint_stream(start_ns: i64, interval_ns: i64, count: usize) -> Vec<JointSample> {
        (0..count)
            .map(|i| joint(start_ns + i as i64 * interval_ns, i as f64 * 0.01))
            .collect()
    }

    fn image_stream(start_ns: i64, interval_ns: i64, count: usize) -> Vec<ImageSample> {
        (0..count)
            .map(|i| ImageSample {
                timestamp_ns: start_ns + i as i64 * interval_ns,
                width: 4,
                height: 4,
                data: Bytes::from(vec![(i % 256) as u8; 48]),
            })
            .collect()
    }

    /// 典型录制：500 Hz 关节流对 30 Hz 相机流，30 fps 输出
    #[test]
    fn test_typical_recording_alignment() {
        let joints = joint_stream(0, 2_000_000, 5000);
        let images = image_stream(0, 33_333_333, 300);

        let result = synchronize(&joints, &images, 30.0, DEFAULT_MAX_OFFSET_MS).unwrap();

        assert!(
            (250..=310).contains(&result.frame_count()),
            "frame_count = {}",
            result.frame_count()
        );
        // Dense joints: nearest sample is at most 1 ms away
        assert!(result.max_joint_offset_ms <= 1.0 + 1e-9);
        // Camera stream is on the output cadence already
        assert!(result.max_image_offset_ms <= DEFAULT_MAX_OFFSET_MS);

        // Frame indices are contiguous from zero
        for (i, frame) in result.frames.iter().enumerate() {
            assert_eq!(frame.frame_index, i as u64);
        }
    }

    /// 多段录制：间隙切分后逐段同步
    #[test]
    fn test_multi_episode_recording() {
        // Two 5 s segments with a 10 s silence between them
        let mut joints = joint_stream(0, 10_000_000, 500);
        joints.extend(joint_stream(15_000_000_000, 10_000_000, 500));

        let mut images = image_stream(0, 33_333_333, 150);
        images.extend(image_stream(15_000_000_000, 33_333_333, 150));

        let bounds = detect_episodes(&joints, 2.0).unwrap();
        assert_eq!(bounds.len(), 2);
        assert_eq!(bounds[0].start_idx, 0);
        assert_eq!(bounds[0].end_idx, 499);
        assert_eq!(bounds[1].start_idx, 500);
        assert_eq!(bounds[1].end_idx, 999);

        let episodes = split_by_episodes(&joints, images, &bounds).unwrap();
        assert_eq!(episodes.len(), 2);

        for streams in &episodes {
            assert_eq!(streams.joints.len(), 500);
            assert_eq!(streams.images.len(), 150);

            let result =
                synchronize(&streams.joints, &streams.images, 30.0, DEFAULT_MAX_OFFSET_MS)
                    .unwrap();
            assert!(result.frame_count() > 100, "{}", result.frame_count());
            assert_eq!(result.ticks_dropped, 0);
        }
    }

    /// 动作增量：逐帧累加应回到末帧绝对位置
    #[test]
    fn test_action_deltas_telescope_to_final_state() {
        let joints = joint_stream(0, 33_333_333, 60);
        let states: Vec<_> = joints.iter().map(joint_positions).collect();

        let deltas = compute_action_deltas(&states).unwrap();
        assert_eq!(deltas.len(), states.len());

        // Terminal delta is the zero vector
        assert!(deltas.last().unwrap().iter().all(|&v| v == 0.0));

        // first + sum(deltas) == last
        let mut accumulated = states[0].clone();
        for delta in &deltas {
            accumulated += delta;
        }
        let last = states.last().unwrap();
        for (a, b) in accumulated.iter().zip(last.iter()) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    /// 无重叠的流：合法的空结果而非错误
    #[test]
    fn test_disjoint_streams_yield_empty_episode() {
        let joints = joint_stream(0, 10_000_000, 100);
        let images = image_stream(60_000_000_000, 33_333_333, 30);

        let result = synchronize(&joints, &images, 30.0, DEFAULT_MAX_OFFSET_MS).unwrap();
        assert!(result.is_empty());
        assert_eq!(result.ticks_dropped, 0);
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    const MINIMAL_TOML: &str = r#"
        [dataset]
        name = "pick_place_demo"

        [topics]
        joint_states = "/joint_states"
        camera = "/camera/color/image_raw"
    "#;

    #[test]
    fn test_minimal_config_gets_defaults() {
        let blueprint = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();

        assert_eq!(blueprint.dataset.name, "pick_place_demo");
        assert_eq!(blueprint.dataset.robot_type, "unknown");
        assert_eq!(blueprint.sync.fps, 30.0);
        assert_eq!(blueprint.sync.max_offset_ms, 34.0);
        assert_eq!(blueprint.sync.gap_threshold_s, 2.0);
        assert!(blueprint.sinks.is_empty());
    }

    #[test]
    fn test_same_topic_for_both_streams_rejected() {
        let toml = r#"
            [dataset]
            name = "demo"

            [topics]
            joint_states = "/tf"
            camera = "/tf"
        "#;
        assert!(ConfigLoader::load_from_str(toml, ConfigFormat::Toml).is_err());
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;

    use contracts::{EpisodeRecord, FrameRow, SinkConfig, SinkType, SynchronizationResult};
    use dispatcher::create_dispatcher;
    use ingestion::{IngestionPipeline, MockCaptureSource};
    use sync_core::{
        compute_action_deltas, detect_episodes, joint_positions, split_by_episodes, synchronize,
        DEFAULT_MAX_OFFSET_MS,
    };
    use tokio::sync::mpsc;

    /// 从同步结果组装一条训练分段
    fn build_record(episode_index: u64, fps: f64, result: &SynchronizationResult) -> EpisodeRecord {
        let states: Vec<_> = result
            .frames
            .iter()
            .map(|f| joint_positions(&f.joint))
            .collect();
        let actions = compute_action_deltas(&states).unwrap();

        let frames = result
            .frames
            .iter()
            .zip(actions)
            .map(|(frame, action)| FrameRow {
                frame_index: frame.frame_index,
                timestamp_s: frame.frame_index as f64 / fps,
                state: frame.joint.position.clone(),
                action: action.iter().copied().collect(),
                image: frame.image.clone(),
            })
            .collect();

        EpisodeRecord {
            episode_index,
            fps,
            frames,
        }
    }

    /// End-to-end test: MockCaptureSource -> collect -> sync -> Dispatcher
    ///
    /// 验证完整的数据流：
    /// 1. MockCaptureSource 生成关节与图像样本
    /// 2. collect 按话题归集并排序
    /// 3. detect/split/synchronize 产出对齐帧
    /// 4. Dispatcher 将 EpisodeRecord 分发到 sinks
    #[tokio::test]
    async fn test_e2e_mock_conversion() {
        // Setup: two mock topics, 5 s of recording each
        let mut pipeline = IngestionPipeline::new(4096);
        pipeline.register_source(
            Box::new(MockCaptureSource::joint_states("/joint_states", 100.0, 500)),
            None,
        );
        pipeline.register_source(
            Box::new(MockCaptureSource::camera("/camera", 30.0, 150, 32, 24)),
            None,
        );

        let rx = pipeline.take_receiver().unwrap();
        pipeline.start_all();
        pipeline.close_input();

        let samples = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            ingestion::collect(rx),
        )
        .await
        .expect("collection timed out")
        .unwrap();

        assert_eq!(samples.joints.len(), 500);
        assert_eq!(samples.images.len(), 150);

        // Episode detection and alignment
        let bounds = detect_episodes(&samples.joints, 2.0).unwrap();
        assert_eq!(bounds.len(), 1);

        let episodes = split_by_episodes(&samples.joints, samples.images, &bounds).unwrap();
        let result = synchronize(
            &episodes[0].joints,
            &episodes[0].images,
            30.0,
            DEFAULT_MAX_OFFSET_MS,
        )
        .unwrap();
        assert!(result.frame_count() > 100, "{}", result.frame_count());

        // Dispatch to a log sink
        let (tx, dispatch_rx) = mpsc::channel::<EpisodeRecord>(10);
        let sink_configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 50,
            params: HashMap::new(),
        }];

        let dispatcher = create_dispatcher(sink_configs, dispatch_rx).await.unwrap();
        let dispatcher_handle = dispatcher.spawn();

        let record = build_record(0, 30.0, &result);
        assert_eq!(record.frames.len(), result.frame_count());
        tx.send(record).await.unwrap();

        drop(tx);
        tokio::time::timeout(std::time::Duration::from_secs(2), dispatcher_handle)
            .await
            .expect("dispatcher timed out")
            .unwrap();
    }

    /// 带间隙的录制切分为两个分段
    #[tokio::test]
    async fn test_e2e_gap_splits_recording() {
        let mut pipeline = IngestionPipeline::new(8192);
        pipeline.register_source(
            Box::new(
                MockCaptureSource::joint_states("/joint_states", 100.0, 1000)
                    .with_gap(500, 5_000_000_000),
            ),
            None,
        );
        // The camera gap is 50 ns longer than the joint gap so the first
        // post-gap frame (sample 150, at 4_999_999_950 ns before the shift)
        // lands exactly on the second segment's joint start at 10 s instead
        // of inside the silence, where the splitter would discard it
        pipeline.register_source(
            Box::new(
                MockCaptureSource::camera("/camera", 30.0, 300, 16, 12)
                    .with_gap(150, 5_000_000_050),
            ),
            None,
        );

        let rx = pipeline.take_receiver().unwrap();
        pipeline.start_all();
        pipeline.close_input();

        let samples = tokio::time::timeout(
            std::time::Duration::from_secs(5),
            ingestion::collect(rx),
        )
        .await
        .expect("collection timed out")
        .unwrap();

        let bounds = detect_episodes(&samples.joints, 2.0).unwrap();
        assert_eq!(bounds.len(), 2);

        let episodes = split_by_episodes(&samples.joints, samples.images, &bounds).unwrap();
        for streams in &episodes {
            assert_eq!(streams.joints.len(), 500);
            assert_eq!(streams.images.len(), 150);

            let result =
                synchronize(&streams.joints, &streams.images, 30.0, DEFAULT_MAX_OFFSET_MS)
                    .unwrap();
            assert!(result.frame_count() > 100);
        }
    }

    /// 文件 sink 端到端：数据集目录布局
    #[tokio::test]
    async fn test_e2e_file_sink_layout() {
        let dir = tempfile::tempdir().unwrap();
        let base_path = dir.path().to_str().unwrap().to_string();

        let joints: Vec<_> = (0..100)
            .map(|i| contracts::JointSample {
                timestamp_ns: i * 33_333_333,
                names: vec!["j0".into()],
                position: vec![i as f64 * 0.01],
                velocity: None,
            })
            .collect();
        let images: Vec<_> = (0..100)
            .map(|i| contracts::ImageSample {
                timestamp_ns: i * 33_333_333,
                width: 4,
                height: 4,
                data: bytes::Bytes::from(vec![0u8; 48]),
            })
            .collect();

        let result = synchronize(&joints, &images, 30.0, DEFAULT_MAX_OFFSET_MS).unwrap();
        assert!(!result.is_empty());

        let (tx, dispatch_rx) = mpsc::channel::<EpisodeRecord>(10);
        let sink_configs = vec![SinkConfig {
            name: "dataset".to_string(),
            sink_type: SinkType::File,
            queue_capacity: 10,
            params: HashMap::from([("base_path".to_string(), base_path.clone())]),
        }];

        let dispatcher = create_dispatcher(sink_configs, dispatch_rx).await.unwrap();
        let dispatcher_handle = dispatcher.spawn();

        tx.send(build_record(0, 30.0, &result)).await.unwrap();
        drop(tx);

        tokio::time::timeout(std::time::Duration::from_secs(5), dispatcher_handle)
            .await
            .expect("dispatcher timed out")
            .unwrap();

        let base = dir.path();
        assert!(base.join("manifest.json").exists());
        assert!(base.join("episode_000000").join("episode.json").exists());
        assert!(base.join("episode_000000").join("meta.json").exists());
        assert!(base
            .join("episode_000000")
            .join("frames")
            .join("frame_000000.png")
            .exists());
    }

    /// Dispatcher 多 sink 扇出
    #[tokio::test]
    async fn test_dispatcher_multiple_sinks() {
        let (tx, rx) = mpsc::channel::<EpisodeRecord>(10);

        let sink_configs = vec![
            SinkConfig {
                name: "log1".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: 50,
                params: HashMap::new(),
            },
            SinkConfig {
                name: "log2".to_string(),
                sink_type: SinkType::Log,
                queue_capacity: 50,
                params: HashMap::new(),
            },
        ];

        let dispatcher = create_dispatcher(sink_configs, rx).await.unwrap();

        // Check metrics before running
        let metrics = dispatcher.metrics();
        assert_eq!(metrics.len(), 2);

        let handle = dispatcher.spawn();

        for i in 0..5 {
            let record = EpisodeRecord {
                episode_index: i,
                fps: 30.0,
                frames: Vec::new(),
            };
            tx.send(record).await.unwrap();
        }

        drop(tx);
        let _ = tokio::time::timeout(std::time::Duration::from_secs(2), handle).await;
    }
}
