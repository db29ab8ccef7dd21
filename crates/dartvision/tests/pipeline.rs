//! End-to-end pipeline check: scripted frames through the strike detector,
//! corner resolver, calibration transform, scoring mapper and game loop.

use std::sync::Mutex;
use std::time::Duration;

use dartvision::core::{GrayImage, GrayImageView};
use dartvision::game::CsvScoreLog;
use dartvision::{
    dart_channel, run_game_loop, CalibrationData, CancellationToken, DetectorParams,
    DetectorProvider, FeatureExtractor, FrameSize, FrameSource, Game, GameLoopConfig, GameMode,
    Player, ResolverParams, StrikeDetector,
};
use nalgebra::{Point2, Vector2};
use tempfile::TempDir;

const W: usize = 800;
const H: usize = 600;

/// Serves a scripted frame sequence, repeating the last frame forever.
struct ScriptedSource {
    frames: Mutex<Vec<GrayImage>>,
}

impl FrameSource for ScriptedSource {
    fn read(&self) -> GrayImage {
        let mut frames = self.frames.lock().expect("poisoned");
        if frames.len() > 1 {
            frames.remove(0)
        } else {
            frames[0].clone()
        }
    }
}

/// Stands in for the external corner detector: one shaft-aligned cluster
/// plus a noise point, as a real strike difference image would yield.
struct ShaftCorners;

impl FeatureExtractor for ShaftCorners {
    fn corners(
        &self,
        _image: &GrayImageView<'_>,
        _max_corners: usize,
        _quality: f32,
        _min_distance: f32,
    ) -> Vec<Point2<f32>> {
        vec![
            Point2::new(400.0, 100.0),
            Point2::new(405.0, 130.0),
            Point2::new(410.0, 160.0),
            Point2::new(900.0, 500.0),
        ]
    }
}

fn blank() -> GrayImage {
    GrayImage::new(W, H)
}

fn dart_frame() -> GrayImage {
    let mut frame = blank();
    for y in 100..130 {
        for x in 400..430 {
            frame.data[y * W + x] = 255;
        }
    }
    frame
}

fn zone_frame() -> GrayImage {
    let mut frame = blank();
    frame.data.fill(255);
    frame
}

/// Calibration whose transform is the identity: reference anchors are
/// placed directly on their destination points.
fn identity_calibration() -> CalibrationData {
    let mut data = CalibrationData::new(FrameSize::new(W as u32, H as u32));
    data.reference_points = data.destination_points();
    data.solve_transform([Vector2::zeros(); 4]).expect("solvable");
    data
}

#[test]
fn scripted_strike_wins_a_count_up_game() {
    let detector = StrikeDetector::new(identity_calibration(), ShaftCorners)
        .expect("calibrated")
        .with_params(DetectorParams {
            sample_interval: Duration::ZERO,
            settle_delay: Duration::ZERO,
            ..DetectorParams::default()
        })
        .with_resolver_params(ResolverParams {
            min_candidates: 3,
            min_on_line: 3,
            min_neighbors: 2,
            ..ResolverParams::default()
        });

    let source = ScriptedSource {
        frames: Mutex::new(vec![
            blank(),      // baseline
            blank(),      // quiet sample
            dart_frame(), // trigger
            dart_frame(), // settle frame
            dart_frame(), // baseline of the retrieval wait
            zone_frame(), // player retrieves the darts
        ]),
    };
    let mut provider = DetectorProvider { detector, source };

    let dir = TempDir::new().expect("tempdir");
    let log_path = dir.path().join("darts_log.csv");
    let mut sink = CsvScoreLog::new(&log_path);
    let (publisher, drain) = dart_channel();

    let mut game = Game::new(GameMode::FromZero { target: 20 }, vec![Player::new("ada")])
        .expect("players");

    run_game_loop(
        &mut game,
        &mut provider,
        &mut sink,
        &publisher,
        &CancellationToken::new(),
        &GameLoopConfig {
            turn_cooldown: Duration::ZERO,
        },
    );

    // The (400, 100) impact sits straight above the board center in the
    // outer single ring: a plain 20 that ends the count-up game.
    assert!(game.is_game_finished());
    assert_eq!(game.players[0].score, 20);

    let published = drain.drain();
    assert_eq!(published.len(), 1);
    assert_eq!(published[0].base, 20);
    assert_eq!(published[0].multiplier, 1);
    assert_eq!(published[0].correctly_detected, Some(true));

    let log = std::fs::read_to_string(&log_path).expect("log written");
    let lines: Vec<&str> = log.lines().collect();
    assert_eq!(lines.len(), 2, "header plus one dart");
    assert!(lines[1].contains("ada"));
    assert!(lines[1].contains(",20,1,"));
}

#[test]
fn uncalibrated_data_cannot_build_a_detector() {
    let data = CalibrationData::new(FrameSize::new(W as u32, H as u32));
    assert!(StrikeDetector::new(data, ShaftCorners).is_err());
}
