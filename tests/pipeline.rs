//! Chains of filters applied through `FilterConfig`, the way a host would
//! run them.

use std::collections::{HashMap, HashSet};

use bitmap_transforms::{
    CacheKey, Color, ColorResolver, Direction, EllipseCrop, FilterConfig, Flip, FlipDirection,
    GaussianBlur, Mosaic, Padding, Shadow, Tint, Transform,
};
use ndarray::{s, Array3};

fn opaque_square(size: usize, px: [u8; 4]) -> Array3<u8> {
    let mut img = Array3::<u8>::zeros((size, size, 4));
    for y in 0..size {
        for x in 0..size {
            for c in 0..4 {
                img[[y, x, c]] = px[c];
            }
        }
    }
    img
}

fn apply_all(image: &Array3<u8>, chain: &[FilterConfig]) -> Array3<u8> {
    chain.iter().fold(image.clone(), |acc, filter| {
        filter.transform(acc.view()).unwrap()
    })
}

#[test]
fn padding_then_shadow_keeps_shadow_inside_bounds() {
    let img = opaque_square(40, [255, 0, 0, 255]);
    let chain: Vec<FilterConfig> = vec![
        Padding::uniform(8).into(),
        Shadow::new()
            .blur_radius(2.0)
            .elevation(4.0)
            .direction(Direction::SouthEast)
            .colour(Color::BLACK)
            .into(),
    ];
    let out = apply_all(&img, &chain);
    assert_eq!(out.dim(), (40, 40, 4));

    // Interior still red
    assert_eq!(out.slice(s![20, 20, ..]).to_vec(), vec![255, 0, 0, 255]);
    // Shadow falls below-right of the padded interior, on transparent padding
    let below_right = out[[34, 34, 3]];
    assert!(below_right > 0, "shadow missing: {below_right}");
    assert_eq!(out[[34, 34, 0]], 0);
    // Nothing up-left of the interior
    assert_eq!(out[[2, 2, 3]], 0);
}

#[test]
fn shadow_without_padding_is_clipped() {
    let img = opaque_square(20, [0, 0, 255, 255]);
    let out = Shadow::new().elevation(5.0).transform(img.view()).unwrap();
    assert_eq!(out, img);
}

#[test]
fn flip_twice_restores_source() {
    let mut img = Array3::<u8>::zeros((5, 7, 4));
    for (i, v) in img.iter_mut().enumerate() {
        *v = (i * 37 % 256) as u8;
    }
    let flip: FilterConfig = Flip::new(FlipDirection::Both).into();
    assert_eq!(apply_all(&img, &[flip, flip]), img);
}

#[test]
fn crop_then_tint_recolours_only_the_disc() {
    let img = opaque_square(50, [10, 200, 10, 255]);
    let chain: Vec<FilterConfig> = vec![
        EllipseCrop::new().circle_size_fraction(0.5).into(),
        Tint::new().colour(Color::WHITE).into(),
    ];
    let out = apply_all(&img, &chain);
    assert_eq!(out.slice(s![25, 25, ..]).to_vec(), vec![255, 255, 255, 255]);
    assert_eq!(out.slice(s![0, 0, ..]).to_vec(), vec![0, 0, 0, 0]);
}

#[test]
fn fingerprints_distinguish_every_configuration() {
    let configs: Vec<FilterConfig> = vec![
        EllipseCrop::new().into(),
        EllipseCrop::new().circle_size(10).into(),
        Flip::new(FlipDirection::Horizontal).into(),
        Flip::new(FlipDirection::Vertical).into(),
        GaussianBlur::new(3.0).into(),
        GaussianBlur::new(30.0).into(),
        Mosaic::new().by_width(10).into(),
        Mosaic::new().by_height(10).into(),
        Padding::uniform(3).into(),
        Shadow::new().elevation(3.0).into(),
        Tint::new().into(),
    ];
    let keys: HashSet<Vec<u8>> = configs.iter().map(FilterConfig::fingerprint).collect();
    assert_eq!(keys.len(), configs.len());

    let set: HashSet<FilterConfig> = configs.iter().copied().chain(configs.iter().copied()).collect();
    assert_eq!(set.len(), configs.len());
}

#[test]
fn blur_and_shadow_share_no_identifier() {
    assert_ne!(GaussianBlur::ID, Shadow::ID);
    assert!(GaussianBlur::new(2.0)
        .fingerprint()
        .starts_with(GaussianBlur::ID.as_bytes()));
}

#[test]
fn colour_resources_resolve_through_closures() {
    let palette: HashMap<u32, Color> = [(1, Color::WHITE), (2, Color::BLACK)].into_iter().collect();
    let lookup = |id: u32| palette.get(&id).copied();
    let resolver: &dyn ColorResolver = &lookup;

    let shadow = Shadow::new().colour_res(2, resolver).unwrap();
    assert_eq!(shadow.shadow_colour(), Color::BLACK);
    assert!(Tint::new().colour_res(3, resolver).is_err());
}

#[test]
fn config_survives_json() {
    let chain: Vec<FilterConfig> = vec![
        EllipseCrop::new().size(30, 20).angle(15.0).into(),
        GaussianBlur::new(40.0).into(),
        Shadow::new().direction(Direction::North).elevation(2.0).into(),
    ];
    let json = serde_json::to_string(&chain).unwrap();
    let back: Vec<FilterConfig> = serde_json::from_str(&json).unwrap();
    let keys: Vec<_> = chain.iter().map(FilterConfig::fingerprint).collect();
    let back_keys: Vec<_> = back.iter().map(FilterConfig::fingerprint).collect();
    assert_eq!(keys, back_keys);
}
