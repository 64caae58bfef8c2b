//! Screenshot file naming.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

/// `screenshot_<YYYYMMDD_HHmmss>.png` for the given instant.
pub fn timestamped_filename(now: DateTime<Local>) -> String {
    format!("screenshot_{}.png", now.format("%Y%m%d_%H%M%S"))
}

/// Append `.png` unless the name already ends with it (any case).
pub fn ensure_png_suffix(name: &str) -> String {
    let has_suffix = name
        .len()
        .checked_sub(4)
        .and_then(|cut| name.get(cut..))
        .is_some_and(|tail| tail.eq_ignore_ascii_case(".png"));

    if has_suffix {
        name.to_string()
    } else {
        format!("{name}.png")
    }
}

/// The file name a screenshot is written under.  A missing or empty
/// request gets a timestamped name.
pub fn screenshot_filename(requested: Option<&str>) -> String {
    match requested.filter(|name| !name.is_empty()) {
        Some(name) => ensure_png_suffix(name),
        None => timestamped_filename(Local::now()),
    }
}

/// Absolute filenames are kept; relative ones land in `dir`.
pub fn resolve_output_path(dir: &Path, filename: &str) -> PathBuf {
    let path = Path::new(filename);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        dir.join(path)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDateTime, TimeZone};

    use super::*;

    #[test]
    fn test_png_suffix() {
        assert_eq!(ensure_png_suffix("shot"), "shot.png");
        assert_eq!(ensure_png_suffix("shot.PNG"), "shot.PNG");
        assert_eq!(ensure_png_suffix("shot.png"), "shot.png");
        assert_eq!(ensure_png_suffix("shot.jpg"), "shot.jpg.png");
        assert_eq!(ensure_png_suffix("png"), "png.png");
        assert_eq!(ensure_png_suffix("ü.png"), "ü.png");
    }

    #[test]
    fn test_timestamped_filename_format() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(timestamped_filename(at), "screenshot_20240309_070501.png");
    }

    #[test]
    fn test_generated_name_is_within_execution_window() {
        let before = Local::now().naive_local();
        let name = screenshot_filename(None);
        let after = Local::now().naive_local();

        let stamp = name
            .strip_prefix("screenshot_")
            .and_then(|s| s.strip_suffix(".png"))
            .unwrap();
        let parsed = NaiveDateTime::parse_from_str(stamp, "%Y%m%d_%H%M%S").unwrap();

        let floor = before.format("%Y%m%d_%H%M%S").to_string();
        let floor = NaiveDateTime::parse_from_str(&floor, "%Y%m%d_%H%M%S").unwrap();
        assert!(parsed >= floor && parsed <= after, "{name}");
    }

    #[test]
    fn test_empty_name_is_generated() {
        assert!(screenshot_filename(Some("")).starts_with("screenshot_"));
        assert_eq!(screenshot_filename(Some("a")), "a.png");
    }

    #[test]
    fn test_resolve_output_path() {
        let dir = std::env::temp_dir();
        assert_eq!(resolve_output_path(&dir, "x.png"), dir.join("x.png"));

        let absolute = dir.join("abs.png");
        let absolute_str = absolute.to_str().unwrap();
        assert_eq!(resolve_output_path(Path::new("/elsewhere"), absolute_str), absolute);
    }
}
