use stereocorr::consistency::{cross_corr_consistency_check, ConsistencyCheck};
use stereocorr::{ConsistencyDistance, DisparityMap, MaskedDisparity, Vec2};

fn uniform(width: usize, height: usize, d: Vec2) -> DisparityMap {
    let mut map = DisparityMap::new_invalid(width, height);
    for y in 0..height {
        for x in 0..width {
            map.set(x, y, MaskedDisparity::valid(d));
        }
    }
    map
}

#[test]
fn only_pixels_beyond_the_threshold_are_invalidated() {
    let mut forward = uniform(5, 5, Vec2::new(1, 0));
    let mut reverse = uniform(7, 5, Vec2::new(-1, 0));
    // forward (1, 1) lands on reverse (2, 1): round trip of 2
    reverse.set(2, 1, MaskedDisparity::valid(Vec2::new(-3, 0)));
    // forward (3, 3) lands on reverse (4, 3): round trip of 1
    reverse.set(4, 3, MaskedDisparity::valid(Vec2::new(-2, 0)));
    let reverse_before = reverse.clone();

    let rejected = cross_corr_consistency_check(&mut forward, &reverse, 1.0);

    assert_eq!(rejected, 1);
    assert_eq!(reverse, reverse_before);
    for y in 0..5 {
        for x in 0..5 {
            let valid = forward.get(x, y).unwrap().valid;
            assert_eq!(valid, (x, y) != (1, 1), "({x}, {y})");
        }
    }
}

#[test]
fn negative_threshold_leaves_forward_untouched() {
    let mut forward = uniform(4, 4, Vec2::new(2, 2));
    let reverse = DisparityMap::new_invalid(4, 4);
    let before = forward.clone();
    assert_eq!(cross_corr_consistency_check(&mut forward, &reverse, -1.0), 0);
    assert_eq!(forward, before);
}

#[test]
fn invalid_or_missing_reverse_pixels_reject() {
    let mut forward = uniform(3, 1, Vec2::new(1, 0));
    let mut reverse = uniform(3, 1, Vec2::new(-1, 0));
    reverse.invalidate(1, 0);
    forward.invalidate(1, 0);
    let rejected = cross_corr_consistency_check(&mut forward, &reverse, 0.0);
    // (0,0) -> reverse (1,0) invalid; (2,0) -> reverse (3,0) outside.
    assert_eq!(rejected, 2);
    assert_eq!(forward.valid_count(), 0);
}

#[test]
fn euclidean_distance_checks_diagonal_round_trips() {
    let forward = uniform(2, 2, Vec2::new(0, 0));
    let reverse = uniform(2, 2, Vec2::new(1, 1));

    let mut per_axis = forward.clone();
    let check = ConsistencyCheck::new(1.0, ConsistencyDistance::PerAxis).unwrap();
    assert_eq!(check.apply(&mut per_axis, &reverse), 0);

    let mut euclidean = forward.clone();
    let check = ConsistencyCheck::new(1.0, ConsistencyDistance::Euclidean).unwrap();
    assert_eq!(check.apply(&mut euclidean, &reverse), 4);
    assert_eq!(euclidean.valid_count(), 0);
}
