use std::fs;
use std::sync::Arc;

use glyphgrid::{Config, RenderError, ResourceManager, Rgba8};
use image::{Rgba, RgbaImage};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn asset_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for sub in ["fonts", "images", "shaders"] {
        fs::create_dir_all(dir.path().join("assets").join(sub)).unwrap();
    }
    dir
}

#[test]
fn repeated_loads_share_one_allocation() {
    let dir = asset_tree();
    fs::write(dir.path().join("assets/shaders/glyphs.wgsl"), "fn fs_main() {}").unwrap();
    let resources = ResourceManager::new(dir.path());

    let first = resources.load_shader("glyphs.wgsl").unwrap();
    fs::remove_file(dir.path().join("assets/shaders/glyphs.wgsl")).unwrap();
    let second = resources.load_shader("glyphs.wgsl").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(&*first, "fn fs_main() {}");
}

#[test]
fn concurrent_loads_resolve_to_the_same_resource() {
    let dir = asset_tree();
    fs::write(dir.path().join("assets/shaders/a.wgsl"), "// a").unwrap();
    let resources = ResourceManager::new(dir.path());

    let loaded: Vec<Arc<str>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| scope.spawn(|| resources.load_shader("a.wgsl").unwrap()))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert!(loaded.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
}

#[test]
fn missing_resources_fail_with_their_path() {
    let dir = asset_tree();
    let resources = ResourceManager::new(dir.path());
    match resources.load_shader("nope.wgsl").unwrap_err() {
        RenderError::Resource { kind, path, .. } => {
            assert_eq!(kind, "shader");
            assert!(path.ends_with("assets/shaders/nope.wgsl"));
        }
        other => panic!("unexpected error {other:?}"),
    }
    assert!(matches!(
        resources.load_image("nope.png"),
        Err(RenderError::Resource { kind: "image", .. })
    ));
}

#[test]
fn sub_images_are_cropped_and_bounds_checked() {
    let dir = asset_tree();
    let mut sheet = RgbaImage::new(4, 4);
    sheet.put_pixel(2, 1, Rgba([9, 8, 7, 255]));
    sheet.save(dir.path().join("assets/images/sheet.png")).unwrap();
    let resources = ResourceManager::new(dir.path());

    let sub = resources.load_sub_image("sheet.png", [1, 1, 2, 2]).unwrap();
    assert_eq!(sub.dimensions(), (2, 2));
    assert_eq!(sub.get_pixel(1, 0).0, [9, 8, 7, 255]);

    let err = resources.load_sub_image("sheet.png", [3, 3, 2, 2]).unwrap_err();
    assert!(matches!(
        err,
        RenderError::SubImageOutOfBounds {
            width: 4,
            height: 4,
            ..
        }
    ));
}

#[test]
fn configs_load_relative_to_the_root() {
    let dir = asset_tree();
    fs::write(
        dir.path().join("glyphgrid.toml"),
        "logicalWidth = 320\nlogicalHeight = 200\nclearColor = [1, 2, 3]\n",
    )
    .unwrap();
    let resources = ResourceManager::new(dir.path());
    let config = resources.load_config("glyphgrid.toml").unwrap();
    assert_eq!(config.scale, 1);
    assert_eq!(config.clear_color_rgba(), Rgba8::OPAQUE_BLACK);
    assert_eq!(config.grid_size(8, 8), (40, 25));
    assert!(Arc::ptr_eq(
        &config,
        &resources.load_config("glyphgrid.toml").unwrap()
    ));

    let direct = Config::load(dir.path().join("glyphgrid.toml")).unwrap();
    assert_eq!(direct, *config);
}

#[test]
fn malformed_config_is_a_resource_error() {
    let dir = asset_tree();
    fs::write(dir.path().join("bad.toml"), "logicalWidth = \"wide\"").unwrap();
    let resources = ResourceManager::new(dir.path());
    assert!(matches!(
        resources.load_config("bad.toml"),
        Err(RenderError::Resource { kind: "config", .. })
    ));
}

#[cfg(feature = "fonts")]
#[test]
fn unreadable_font_is_a_resource_error() {
    let dir = asset_tree();
    fs::write(dir.path().join("assets/fonts/broken.ttf"), b"not a font").unwrap();
    let resources = ResourceManager::new(dir.path());
    assert!(matches!(
        resources.load_face("broken.ttf", 16.0),
        Err(RenderError::Resource { kind: "font", .. })
    ));
}

#[test]
fn manager_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<ResourceManager>();
}
