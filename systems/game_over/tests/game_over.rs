use image::{Rgb, RgbImage};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_rect_mut},
    rect::Rect,
};
use snake_autoplay_core::{GridGeometry, GridPosition};
use snake_autoplay_system_game_over::{GameOverDetector, GameOverTuning};

const RED: Rgb<u8> = Rgb([255, 0, 0]);
const PITCH: u32 = 20;

fn detector() -> GameOverDetector {
    GameOverDetector::new(
        GameOverTuning::default(),
        GridGeometry::new(PITCH).expect("positive pitch"),
    )
}

fn blank_frame() -> RgbImage {
    RgbImage::new(400, 300)
}

#[test]
fn food_sized_circle_at_food_cell_is_not_game_over() {
    let mut frame = blank_frame();
    draw_filled_circle_mut(&mut frame, (110, 110), 8, RED);

    assert!(!detector().is_game_over(&frame, Some(GridPosition::new(5, 5))));
    assert!(!detector().is_game_over(&frame, None));
}

#[test]
fn wide_red_banner_away_from_food_is_game_over() {
    let mut frame = blank_frame();
    draw_filled_rect_mut(&mut frame, Rect::at(100, 130).of_size(200, 40), RED);

    let inspection = detector().inspect(&frame, Some(GridPosition::new(1, 1)));

    assert!(inspection.red_area > 1200);
    let banner = inspection.banner.expect("banner should be recognised");
    assert!(banner.area > 1000.0);
    assert!(banner.circularity < 0.7);
    assert!(inspection.is_game_over());
}

#[test]
fn large_round_blob_is_not_mistaken_for_banner() {
    let mut frame = blank_frame();
    draw_filled_circle_mut(&mut frame, (200, 150), 30, RED);

    let inspection = detector().inspect(&frame, Some(GridPosition::new(0, 0)));

    assert!(inspection.red_area > 1200, "circle must pass the area gate");
    assert!(!inspection.is_game_over());
}

#[test]
fn banner_covering_food_cell_still_counts() {
    let mut frame = blank_frame();
    draw_filled_rect_mut(&mut frame, Rect::at(60, 100).of_size(240, 40), RED);

    assert!(detector().is_game_over(&frame, Some(GridPosition::new(5, 5))));
}

#[test]
fn banner_on_upper_end_of_hue_wheel_counts() {
    let mut frame = blank_frame();
    draw_filled_rect_mut(
        &mut frame,
        Rect::at(100, 130).of_size(200, 40),
        Rgb([255, 0, 40]),
    );

    assert!(detector().is_game_over(&frame, None));
}

#[test]
fn scattered_small_red_blobs_are_not_game_over() {
    let mut frame = blank_frame();
    for index in 0..8 {
        let x = 20 + index * 45;
        draw_filled_rect_mut(&mut frame, Rect::at(x, 40).of_size(18, 18), RED);
    }

    let inspection = detector().inspect(&frame, None);

    assert!(inspection.red_area > 1200, "blobs should exceed the area gate");
    assert!(!inspection.is_game_over());
}

#[test]
fn partially_occluded_banner_is_still_detected() {
    let mut frame = blank_frame();
    draw_filled_rect_mut(&mut frame, Rect::at(100, 130).of_size(200, 40), RED);
    draw_filled_rect_mut(
        &mut frame,
        Rect::at(180, 140).of_size(19, 19),
        Rgb([0, 255, 0]),
    );

    assert!(detector().is_game_over(&frame, None));
}

#[test]
fn thresholds_follow_configuration() {
    let mut frame = blank_frame();
    draw_filled_rect_mut(&mut frame, Rect::at(100, 130).of_size(200, 40), RED);

    let strict = GameOverDetector::new(
        GameOverTuning {
            min_red_area: 10_000,
            ..GameOverTuning::default()
        },
        GridGeometry::new(PITCH).expect("positive pitch"),
    );

    assert!(!strict.is_game_over(&frame, None));
}
