use export::{encode_to_path, EncodeSettings, OutputFormat};
use image::{Rgba, RgbaImage};

fn checkerboard(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        if (x / 4 + y / 4) % 2 == 0 {
            Rgba([240, 40, 40, 255])
        } else {
            Rgba([20, 20, 200, 255])
        }
    })
}

#[test]
fn encoded_files_keep_crop_dimensions() {
    let dir = tempfile::tempdir().unwrap();
    let image = checkerboard(37, 23);

    for format in [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Gif] {
        let settings = EncodeSettings {
            format,
            quality: 70,
            png_compression: 9,
        };
        let path = dir
            .path()
            .join(format!("screenshot-temp.{}", format.extension()));

        let written = encode_to_path(&image, &settings, &path).unwrap();
        assert_eq!(written, path);
        assert_eq!(
            image::image_dimensions(&path).unwrap(),
            (37, 23),
            "{format:?}"
        );
    }
}

#[test]
fn encoding_overwrites_previous_capture() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("screenshot-temp.png");
    let settings = EncodeSettings {
        format: OutputFormat::Png,
        ..EncodeSettings::default()
    };

    encode_to_path(&checkerboard(64, 64), &settings, &path).unwrap();
    encode_to_path(&checkerboard(8, 5), &settings, &path).unwrap();

    assert_eq!(image::image_dimensions(&path).unwrap(), (8, 5));
}

#[test]
fn missing_parent_directory_is_created() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("CapYap").join("screenshot-temp.jpg");

    encode_to_path(&checkerboard(10, 10), &EncodeSettings::default(), &path).unwrap();
    assert!(path.exists());
}

#[test]
fn png_keeps_pixels_exactly() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("exact.png");
    let image = checkerboard(16, 16);
    let settings = EncodeSettings {
        format: OutputFormat::Png,
        quality: 100,
        png_compression: 0,
    };

    encode_to_path(&image, &settings, &path).unwrap();
    let decoded = image::open(&path).unwrap().to_rgba8();
    assert_eq!(decoded, image);
}
