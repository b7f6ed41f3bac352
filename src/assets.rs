use regex::Regex;
use std::sync::LazyLock;

static IMAGE_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(AppIcon|LaunchImage)(\d+x\d+)?(?:@(\dx))?(?:~(\w+))?\.png").unwrap()
});

static IDIOM_SUFFIX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"~\w+").unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    AppIcon,
    LaunchImage,
}

/// Metadata parsed out of a catalog image filename such as
/// `AppIcon60x60@2x~ipad.png`. Immutable once parsed.
#[derive(Debug, Clone)]
pub struct ImageDescriptor {
    pub filename: String,
    pub kind: AssetKind,
    /// Nominal point size, e.g. "60x60". Empty when the name carries none.
    pub nominal_size: String,
    /// Display scale token, e.g. "2x". Defaults to "1x".
    pub scale: String,
    /// Device idiom, e.g. "ipad". Defaults to "universal".
    pub idiom: String,
    /// Pixel width the compiled asset is expected to have, e.g. "120".
    pub expected_size: String,
}

impl ImageDescriptor {
    /// Filename with any `~idiom` token stripped, e.g.
    /// `LaunchImage@2x~ipad.png` -> `LaunchImage@2x.png`.
    pub fn universal_filename(&self) -> String {
        IDIOM_SUFFIX.replace(&self.filename, "").into_owned()
    }
}

/// Parses a filename into an [`ImageDescriptor`]. Returns `None` for names
/// that are not catalog images; callers skip those silently.
pub fn parse_image_name(name: &str) -> Option<ImageDescriptor> {
    let caps = IMAGE_NAME.captures(name)?;

    let kind = match caps.get(1).map(|m| m.as_str()) {
        Some("AppIcon") => AssetKind::AppIcon,
        _ => AssetKind::LaunchImage,
    };
    let nominal_size = caps.get(2).map(|m| m.as_str()).unwrap_or("");
    let scale = caps.get(3).map(|m| m.as_str()).unwrap_or("1x");
    let idiom = caps.get(4).map(|m| m.as_str()).unwrap_or("universal");

    Some(ImageDescriptor {
        filename: name.to_string(),
        kind,
        nominal_size: nominal_size.to_string(),
        scale: scale.to_string(),
        idiom: idiom.to_string(),
        expected_size: expected_pixel_size(nominal_size, scale),
    })
}

/// Pixel width the compiled variant should have: nominal width times the
/// leading scale digit. Falls back to the raw size if either part does not
/// parse, and to the empty string when the size is absent.
fn expected_pixel_size(nominal_size: &str, scale: &str) -> String {
    if nominal_size.is_empty() {
        return String::new();
    }

    let width = nominal_size.split('x').next().and_then(|w| w.parse::<u32>().ok());
    let multiplier = scale.chars().next().and_then(|c| c.to_digit(10));

    match (width, multiplier) {
        (Some(w), Some(m)) => (w * m).to_string(),
        _ => nominal_size.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_scaled_app_icon() {
        let d = parse_image_name("AppIcon60x60@2x.png").unwrap();
        assert_eq!(d.kind, AssetKind::AppIcon);
        assert_eq!(d.nominal_size, "60x60");
        assert_eq!(d.scale, "2x");
        assert_eq!(d.idiom, "universal");
        assert_eq!(d.expected_size, "120");
    }

    #[test]
    fn parses_launch_image_with_idiom() {
        let d = parse_image_name("LaunchImage@2x~ipad.png").unwrap();
        assert_eq!(d.kind, AssetKind::LaunchImage);
        assert_eq!(d.nominal_size, "");
        assert_eq!(d.scale, "2x");
        assert_eq!(d.idiom, "ipad");
        assert_eq!(d.expected_size, "");
    }

    #[test]
    fn scale_and_idiom_default() {
        let d = parse_image_name("AppIcon29x29.png").unwrap();
        assert_eq!(d.scale, "1x");
        assert_eq!(d.idiom, "universal");
        assert_eq!(d.expected_size, "29");
    }

    #[test]
    fn triple_scale_multiplies() {
        let d = parse_image_name("AppIcon60x60@3x.png").unwrap();
        assert_eq!(d.expected_size, "180");
    }

    #[test]
    fn non_catalog_names_return_none() {
        assert!(parse_image_name("random.txt").is_none());
        assert!(parse_image_name("Icon.png").is_none());
        assert!(parse_image_name("AppIcon60x60@2x.jpg").is_none());
    }

    #[test]
    fn strips_idiom_suffix() {
        let d = parse_image_name("LaunchImage@2x~iphone.png").unwrap();
        assert_eq!(d.universal_filename(), "LaunchImage@2x.png");

        let d = parse_image_name("LaunchImage.png").unwrap();
        assert_eq!(d.universal_filename(), "LaunchImage.png");
    }
}
