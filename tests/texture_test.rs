mod common;

use common::test_utils::TempAssets;
use windmill_ngin::{error::TextureError, resources::load_texture_data};

#[tokio::test]
async fn power_of_two_texture_gets_a_full_mip_chain() {
    let assets = TempAssets::new("tex-pot");
    let path = assets.write_png("brown.png", 512, 512);

    let data = load_texture_data(&path).await.unwrap();

    assert!(!data.power_of_two_warning());
    assert_eq!((data.width(), data.height()), (512, 512));
    assert_eq!(data.mip_level_count(), 10);
    let last = data.levels().last().unwrap();
    assert_eq!(last.dimensions(), (1, 1));
}

#[tokio::test]
async fn odd_sized_texture_warns_but_loads() {
    let assets = TempAssets::new("tex-npot");
    let path = assets.write_png("texture3.png", 500, 500);

    let data = load_texture_data(&path).await.unwrap();

    assert!(data.power_of_two_warning());
    assert_eq!(data.width(), 500);
    assert_eq!(data.mip_level_count(), 9);
    assert_eq!(data.levels()[1].dimensions(), (250, 250));
}

#[tokio::test]
async fn undecodable_bytes_are_a_decode_error() {
    let assets = TempAssets::new("tex-bad");
    let path = assets.write("brown.jpg", b"definitely not a jpeg");

    let err = load_texture_data(&path).await.unwrap_err();
    assert!(matches!(err, TextureError::Decode { .. }), "{err}");
}

#[tokio::test]
async fn missing_texture_is_an_io_error() {
    let assets = TempAssets::new("tex-missing");
    let err = load_texture_data(&assets.path("metal.jpg")).await.unwrap_err();
    assert!(matches!(err, TextureError::Io { .. }), "{err}");
}
