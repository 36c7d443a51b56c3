use include_dir::{include_dir, Dir};

static ASSETS: Dir = include_dir!("src/assets");

/// Returns an embedded seed asset as a UTF-8 string.
///
/// The assets ship inside the binary; a missing or non-UTF-8 file is a build
/// defect, so this panics rather than propagating an error.
pub fn asset_str(name: &str) -> &'static str {
    ASSETS
        .get_file(name)
        .unwrap_or_else(|| panic!("embedded asset not found: {name}"))
        .contents_utf8()
        .expect("embedded asset is not valid utf-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_seed_assets_present() {
        for name in [
            "products.json",
            "inventory.json",
            "sales_performance.json",
            "staff.json",
        ] {
            assert!(!asset_str(name).is_empty());
        }
    }
}
