mod common;

use common::shifted_pair;
use stereocorr::{
    BBox, CorrelationConfig, CostMetric, DisparityMap, FlatCorrelator, NullFilter,
    StereoCorrError, SubtractedMean, Vec2,
};

const SIZE: usize = 64;

fn search() -> BBox {
    BBox::new(Vec2::new(-10, -10), Vec2::new(10, 10))
}

fn assert_interior_shift(map: &DisparityMap, shift: Vec2, margin: usize) {
    for y in margin..map.height() - margin {
        for x in margin..map.width() - margin {
            assert_eq!(
                map.get(x, y).unwrap().get(),
                Some(shift),
                "pixel ({x}, {y})"
            );
        }
    }
}

#[test]
fn flat_recovers_constant_shift_for_every_metric() {
    let shift = Vec2::new(3, -2);
    let pair = shifted_pair(SIZE, SIZE, shift, 7);
    for cost in [
        CostMetric::AbsoluteDifference,
        CostMetric::SquaredDifference,
        CostMetric::CrossCorrelation,
    ] {
        let config = CorrelationConfig {
            cost,
            ..CorrelationConfig::new(search(), Vec2::new(7, 7))
        };
        let correlator =
            FlatCorrelator::new(pair.left.view(), pair.right.view(), NullFilter, config).unwrap();
        let map = correlator
            .correlate(BBox::from_xywh(0, 0, SIZE as i32, SIZE as i32))
            .unwrap();
        assert_eq!((map.width(), map.height()), (SIZE, SIZE));
        assert_interior_shift(&map, shift, 3 + 3);
    }
}

#[test]
fn flat_output_matches_requested_region() {
    let pair = shifted_pair(SIZE, SIZE, Vec2::new(1, 1), 11);
    let config = CorrelationConfig::new(search(), Vec2::new(5, 5));
    let correlator =
        FlatCorrelator::new(pair.left.view(), pair.right.view(), NullFilter, config).unwrap();
    let bbox = BBox::from_xywh(13, 21, 17, 9);
    let map = correlator.correlate(bbox).unwrap();
    assert_eq!(map.size(), bbox.size());
    for px in map.pixels().iter().filter_map(|px| px.get()) {
        assert!(px.x >= -10 && px.x <= 10 && px.y >= -10 && px.y <= 10);
    }
    assert_interior_shift(&map, Vec2::new(1, 1), 0);
}

#[test]
fn consistency_keeps_a_clean_shift() {
    let shift = Vec2::new(-4, 2);
    let pair = shifted_pair(SIZE, SIZE, shift, 3);
    let config = CorrelationConfig {
        consistency_threshold: 0.0,
        ..CorrelationConfig::new(search(), Vec2::new(7, 7))
    };
    let correlator =
        FlatCorrelator::new(pair.left.view(), pair.right.view(), NullFilter, config).unwrap();
    let map = correlator.correlate(BBox::from_xywh(16, 16, 32, 32)).unwrap();
    assert_interior_shift(&map, shift, 0);
}

#[test]
fn prefiltered_images_still_match() {
    let shift = Vec2::new(2, 5);
    let pair = shifted_pair(SIZE, SIZE, shift, 5);
    let config = CorrelationConfig::new(search(), Vec2::new(7, 7));
    let filter = SubtractedMean { sigma: 2.0 };
    let correlator =
        FlatCorrelator::new(pair.left.view(), pair.right.view(), &filter, config).unwrap();
    let map = correlator.correlate(BBox::from_xywh(20, 20, 24, 24)).unwrap();
    assert_interior_shift(&map, shift, 0);
}

#[test]
fn invalid_configurations_are_rejected() {
    let pair = shifted_pair(16, 16, Vec2::new(0, 0), 1);
    let even = CorrelationConfig::new(search(), Vec2::new(6, 7));
    let err = FlatCorrelator::new(pair.left.view(), pair.right.view(), NullFilter, even).err();
    assert_eq!(
        err,
        Some(StereoCorrError::InvalidKernel {
            width: 6,
            height: 7
        })
    );

    let config = CorrelationConfig::new(search(), Vec2::new(3, 3));
    let correlator =
        FlatCorrelator::new(pair.left.view(), pair.right.view(), NullFilter, config).unwrap();
    assert!(correlator.correlate(BBox::from_xywh(4, 4, 0, 3)).is_err());
}
