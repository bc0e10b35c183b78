use assert_cmd::Command;
use predicates::prelude::*;

fn glyphgrid() -> Command {
    Command::cargo_bin("glyphgrid").unwrap()
}

#[test]
fn render_writes_png_of_grid_size() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("frame.png");
    glyphgrid()
        .args(["render", "--cols", "4", "--rows", "2", "--frames", "3", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("4x2 cells -> 32x32 px"));
    let image = image::open(&out).unwrap();
    assert_eq!((image.width(), image.height()), (32, 32));
}

#[test]
fn render_is_deterministic_per_seed() {
    let dir = tempfile::tempdir().unwrap();
    let a = dir.path().join("a.png");
    let b = dir.path().join("b.png");
    for out in [&a, &b] {
        glyphgrid()
            .args(["render", "--cols", "6", "--rows", "3", "--seed", "42", "--out"])
            .arg(out)
            .assert()
            .success();
    }
    assert_eq!(std::fs::read(&a).unwrap(), std::fs::read(&b).unwrap());
}

#[test]
fn render_takes_grid_size_and_scale_from_config() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("glyphgrid.toml");
    std::fs::write(
        &config,
        "logicalWidth = 64\nlogicalHeight = 32\nscale = 2\nclearColor = [0, 0, 64, 255]\n",
    )
    .unwrap();
    let out = dir.path().join("scaled.png");
    glyphgrid()
        .arg("render")
        .arg("--config")
        .arg(&config)
        .arg("--out")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("8x2 cells -> 128x64 px"));
    let image = image::open(&out).unwrap();
    assert_eq!((image.width(), image.height()), (128, 64));
}

#[test]
fn empty_grid_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    glyphgrid()
        .args(["render", "--cols", "0", "--rows", "5", "--out"])
        .arg(dir.path().join("none.png"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("no pixels"));
}

#[test]
fn ansi_prints_truecolor_escapes() {
    glyphgrid()
        .args(["ansi", "--cols", "5", "--rows", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1B[38;2;"))
        .stdout(predicate::str::contains("\x1B[48;2;"))
        .stdout(predicate::str::contains("\x1B[0m"));
}

#[test]
fn inspect_reports_vga_metrics() {
    glyphgrid()
        .arg("inspect")
        .assert()
        .success()
        .stdout(predicate::str::contains("palette: 16 colors"))
        .stdout(predicate::str::contains("cell 8x16"))
        .stdout(predicate::str::contains("atlas 760x16"))
        .stdout(predicate::str::contains("grid 80x25 -> 640x400 px"));
}

#[test]
fn atlas_is_saved_as_png() {
    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("atlas.png");
    glyphgrid().arg("atlas").arg("--out").arg(&out).assert().success();
    let image = image::open(&out).unwrap();
    assert_eq!((image.width(), image.height()), (760, 16));
}

#[test]
fn missing_font_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("assets/fonts")).unwrap();
    glyphgrid()
        .args(["inspect", "--font", "missing.ttf", "--assets"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.ttf"));
}

#[test]
fn size_without_a_font_is_rejected() {
    glyphgrid()
        .args(["inspect", "--size", "12"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--size 12 needs --font"));
}
