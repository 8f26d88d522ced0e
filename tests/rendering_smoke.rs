use blockprint::rendering::codec::{decode_bytes, encode_png};
use blockprint::{Pixel, PixelBuffer};

#[test]
fn smoke_png_round_trip_keeps_size_and_channels() {
    let mut buffer = PixelBuffer::new(256, 128);
    buffer.set(3, 4, Pixel::rgba(1.0, 0.0, 0.0, 1.0));
    let png = encode_png(&buffer).unwrap();
    let raw = decode_bytes(&png).unwrap();
    assert_eq!((raw.width, raw.height, raw.channels), (256, 128, 4));

    let decoded = raw.into_buffer().unwrap();
    assert_eq!(decoded.get(3, 4).unwrap().to_rgba8(), [255, 0, 0, 255]);
    assert_eq!(decoded.get(0, 0).unwrap().to_rgba8()[3], 0);
}

#[test]
fn smoke_scale_and_composite() {
    let mut sprite = PixelBuffer::filled(8, 4, Pixel::WHITE);
    sprite.scale_by(2.5).unwrap();
    assert_eq!((sprite.width(), sprite.height()), (20, 10));

    let mut canvas = PixelBuffer::new(16, 16);
    canvas.composite(&sprite, 10, -5);
    assert!(canvas.get(10, 0).unwrap().a > 0.99);
    assert_eq!(canvas.get(9, 0).unwrap().a, 0.0);
    assert_eq!(canvas.get(10, 5).unwrap().a, 0.0);
}

#[test]
fn smoke_garbage_bytes_fail_to_decode() {
    assert!(decode_bytes(b"definitely not a png").is_err());
}
