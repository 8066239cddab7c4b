use stereocorr::{
    BBox, ImagePyramid, ImageView, MaskedDisparity, OwnedImage, StereoCorrError, Vec2,
};

#[test]
fn image_view_rejects_invalid_dimensions_and_stride() {
    let data = [0.0f32; 8];
    assert_eq!(
        ImageView::from_slice(&data, 0, 1).err(),
        Some(StereoCorrError::InvalidDimensions {
            width: 0,
            height: 1
        })
    );
    assert_eq!(
        ImageView::new(&data, 4, 1, 3).err(),
        Some(StereoCorrError::InvalidStride {
            width: 4,
            stride: 3
        })
    );
    assert_eq!(
        ImageView::from_slice(&data, 3, 3).err(),
        Some(StereoCorrError::BufferTooSmall { needed: 9, got: 8 })
    );
}

#[test]
fn roi_views_share_the_stride() {
    let data: Vec<f32> = (0..20).map(|v| v as f32).collect();
    let view = ImageView::new(&data, 4, 4, 5).unwrap();
    let roi = view.roi(1, 2, 2, 2).unwrap();
    assert_eq!(roi.stride(), 5);
    assert_eq!(roi.row(1), Some(&[16.0f32, 17.0][..]));
    assert!(matches!(
        view.roi(3, 3, 2, 1),
        Err(StereoCorrError::RoiOutOfBounds { .. })
    ));
}

#[test]
fn bbox_arithmetic() {
    let a = BBox::from_xywh(2, 3, 4, 5);
    assert_eq!(a.size(), Vec2::new(4, 5));
    assert_eq!(a.area(), 20);
    assert_eq!(a.expand(1), BBox::new(Vec2::new(1, 2), Vec2::new(7, 9)));
    assert_eq!(a * 2, BBox::new(Vec2::new(4, 6), Vec2::new(12, 16)));
    assert_eq!(a + Vec2::new(-2, 1), BBox::from_xywh(0, 4, 4, 5));
    let b = BBox::from_xywh(5, 0, 4, 4);
    assert_eq!(a.intersection(&b), Some(BBox::new(Vec2::new(5, 3), Vec2::new(6, 4))));
    assert_eq!(a.union(&b), BBox::new(Vec2::new(2, 0), Vec2::new(9, 8)));
    assert!(BBox::default().is_empty());
}

#[test]
fn masked_disparity_hides_invalid_values() {
    assert_eq!(MaskedDisparity::valid(Vec2::new(1, 2)).get(), Some(Vec2::new(1, 2)));
    assert_eq!(MaskedDisparity::invalid().get(), None);
}

#[test]
fn pyramid_levels_halve() {
    let base = OwnedImage::filled(64, 48, 3.0).unwrap();
    let pyramid = ImagePyramid::build(base, 3).unwrap();
    assert_eq!(pyramid.num_levels(), 4);
    let coarsest = pyramid.level(3).unwrap();
    assert_eq!((coarsest.width(), coarsest.height()), (8, 6));
    assert!(pyramid.level(4).is_none());
}
