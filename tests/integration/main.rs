//! Integration tests for thumbcache

use std::path::{Path, PathBuf};

/// Write a small opaque PNG under `root`.
fn write_png(root: &Path, rel: &str, width: u32, height: u32) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    image::RgbImage::from_pixel(width, height, image::Rgb([90, 120, 150]))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    path
}

mod cli_tests {
    use super::*;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    /// Binary wired to a throwaway config so user settings never leak in.
    fn thumbcache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("thumbcache");
        cmd.arg("-c").arg(temp.path().join("config.toml"));
        cmd
    }

    #[test]
    fn help_displays() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("request-time cache"));
    }

    #[test]
    fn version_displays() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("thumbcache"));
    }

    #[test]
    fn key_derives_sorted_segment() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .args(["key", "/img/a.jpg?width=400&height=300"])
            .assert()
            .success()
            .stdout("height=300,width=400\n");
    }

    #[test]
    fn key_for_bare_url_is_fixed_literal() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .args(["key", "/img/a.jpg"])
            .assert()
            .success()
            .stdout("default\n");
    }

    #[test]
    fn key_hashed_is_hex() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .args(["key", "--hashed", "/img/a.jpg?width=400"])
            .assert()
            .success()
            .stdout(predicate::str::is_match("^[0-9a-f]{16}\n$").unwrap());
    }

    #[test]
    fn config_path_prints_override() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show_has_sections() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[assets]"));
    }

    #[test]
    fn config_set_roundtrips() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .args(["config", "set", "assets.serve_static", "true"])
            .assert()
            .success();

        thumbcache(&temp)
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("serve_static = true"));
    }

    #[test]
    fn config_set_unknown_key_fails() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .args(["config", "set", "assets.nope", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown configuration key"));
    }

    #[test]
    fn resolve_rejects_missing_root() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .arg("--root")
            .arg(temp.path().join("missing"))
            .args(["resolve", "/img/a.jpg?width=100"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Asset root"));
    }

    #[test]
    fn resolve_missing_asset_passes_through() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .arg("--root")
            .arg(temp.path())
            .args(["resolve", "/nope.jpg?width=100"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pass-through"));
    }

    #[test]
    fn cache_list_empty() {
        let temp = TempDir::new().unwrap();
        thumbcache(&temp)
            .arg("--root")
            .arg(temp.path())
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is empty"));
    }
}

mod pipeline_tests {
    use super::*;
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn thumbcache(temp: &TempDir) -> Command {
        let mut cmd = cargo_bin_cmd!("thumbcache");
        cmd.arg("-c").arg(temp.path().join("config.toml"));
        cmd.arg("--root").arg(temp.path().join("static"));
        cmd
    }

    #[test]
    fn miss_renders_then_hit_reuses() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("static");
        write_png(&root, "img/photo.png", 8, 6);
        let variant = root.join(".cache/width=4/img/photo.png");

        thumbcache(&temp)
            .args(["resolve", "/img/photo.png?width=4"])
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"));

        assert!(variant.is_file());
        let rendered = image::open(&variant).unwrap();
        assert_eq!((rendered.width(), rendered.height()), (4, 3));
        let first_mtime = std::fs::metadata(&variant).unwrap().modified().unwrap();

        thumbcache(&temp)
            .args(["resolve", "/img/photo.png?width=4"])
            .assert()
            .success()
            .stdout(predicate::str::contains("serve"));

        let second_mtime = std::fs::metadata(&variant).unwrap().modified().unwrap();
        assert_eq!(first_mtime, second_mtime, "fresh variant must not be rewritten");
    }

    #[test]
    fn svg_is_never_transformed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("static");
        std::fs::create_dir_all(&root).unwrap();
        std::fs::write(root.join("logo.svg"), b"<svg/>").unwrap();

        thumbcache(&temp)
            .args(["resolve", "/logo.svg?width=100"])
            .assert()
            .success()
            .stdout(predicate::str::contains("pass-through"));

        assert!(!root.join(".cache").exists());
    }

    #[test]
    fn plain_request_with_serve_static_serves_source() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("static");
        let source = write_png(&root, "img/photo.png", 8, 6);

        thumbcache(&temp)
            .args(["resolve", "--serve-static", "/img/photo.png"])
            .assert()
            .success()
            .stdout(predicate::str::contains(source.display().to_string()));

        assert!(!root.join(".cache").exists());
    }

    #[test]
    fn unreadable_source_degrades_to_source_path() {
        // a non-image squatting on a .png name: the engine fails, the
        // request still resolves to the source
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("static");
        std::fs::create_dir_all(root.join("img")).unwrap();
        std::fs::write(root.join("img/broken.png"), b"not a png").unwrap();

        thumbcache(&temp)
            .args(["resolve", "/img/broken.png?width=4"])
            .assert()
            .success()
            .stdout(predicate::str::contains("img/broken.png"))
            .stdout(predicate::str::contains("serve"));

        assert!(!root.join(".cache/width=4/img/broken.png").exists());
    }

    #[test]
    fn cache_list_and_clear_roundtrip() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("static");
        write_png(&root, "img/photo.png", 8, 6);

        thumbcache(&temp)
            .args(["resolve", "/img/photo.png?width=4"])
            .assert()
            .success();

        thumbcache(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("width=4"));

        thumbcache(&temp)
            .args(["cache", "clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("cleared"));

        thumbcache(&temp)
            .args(["cache", "list"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Cache is empty"));
    }

    #[test]
    fn flatten_produces_opaque_variant() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("static");
        let path = root.join("img/ghost.png");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        image::RgbaImage::from_pixel(8, 6, image::Rgba([10, 20, 30, 0]))
            .save_with_format(&path, image::ImageFormat::Png)
            .unwrap();

        thumbcache(&temp)
            .args(["resolve", "/img/ghost.png?width=4&flatten=true"])
            .assert()
            .success();

        let variant = root.join(".cache/flatten=true,width=4/img/ghost.png");
        assert!(variant.is_file());
        let rendered = image::open(&variant).unwrap();
        assert!(!rendered.color().has_alpha());
        // fully transparent pixels became the default black background
        assert_eq!(rendered.to_rgb8().get_pixel(0, 0).0, [0, 0, 0]);
    }
}
