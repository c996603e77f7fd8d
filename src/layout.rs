//! Page geometry: where the image and the two label blocks go.
//!
//! All lengths are PDF points. Image placement is measured from the top-left
//! page corner; text blocks use the PDF convention of `x` from the left edge
//! and `y` from the bottom edge.

use crate::matcher::MatchedPair;
use crate::options::{FontSpec, Rgb, ScaleMode, ValidatedOptions};
use std::path::{Path, PathBuf};

pub const A4_WIDTH: f64 = 595.0;
pub const A4_HEIGHT: f64 = 842.0;
pub const PAGE_MARGIN: f64 = 10.0;

pub const SHADOW_OFFSET_X: f64 = 1.2;
pub const SHADOW_OFFSET_Y: f64 = -1.0;
pub const SHADOW_COLOR: Rgb = Rgb::MID_GRAY;
pub const SHADOW_OPACITY: f64 = 0.4;

/// Page size and the margin kept free on every side
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    pub fn a4() -> Self {
        Self {
            width: A4_WIDTH,
            height: A4_HEIGHT,
            margin: PAGE_MARGIN,
        }
    }

    pub fn usable_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn usable_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }
}

/// Sizes an image of `intrinsic` (width, height) for the given usable area.
///
/// `Fit` scales up or down by a single factor so the image touches the
/// tighter bound; `Absolute` ignores the aspect ratio.
pub fn scale_image(mode: ScaleMode, intrinsic: (f64, f64), usable: (f64, f64)) -> (f64, f64) {
    let (width, height) = intrinsic;
    let (usable_width, usable_height) = usable;
    match mode {
        ScaleMode::Absolute => (usable_width, usable_height),
        ScaleMode::Fit => {
            let factor = (usable_width / width).min(usable_height / height);
            (width * factor, height * factor)
        }
    }
}

/// The placed image
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePlacement {
    pub path: PathBuf,
    pub pixel_width: u32,
    pub pixel_height: u32,
    /// Distance from the left page edge
    pub left: f64,
    /// Distance from the top page edge
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

/// A block of label text at a fixed position
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub x: f64,
    /// Bottom edge of the block, from the bottom of the page
    pub y: f64,
    pub width: f64,
    pub color: Rgb,
    pub opacity: f64,
    pub font: FontSpec,
    pub centered: bool,
}

impl TextBlock {
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Everything needed to emit one output PDF
#[derive(Debug, Clone, PartialEq)]
pub struct PageLayout {
    pub title: String,
    pub output_path: PathBuf,
    pub page: PageGeometry,
    pub image: ImagePlacement,
    /// Drawn first, under the main block
    pub shadow: TextBlock,
    pub main: TextBlock,
}

/// `<base name>.pdf` inside `dir`
pub fn output_path(dir: &Path, base_name: &str) -> PathBuf {
    dir.join(format!("{}.pdf", base_name))
}

/// Lays out the page for one matched image.
///
/// `pixel_size` is the image's size in pixels, taken as points (72 dpi).
pub fn compose_page(
    pair: &MatchedPair,
    pixel_size: (u32, u32),
    options: &ValidatedOptions,
    output_dir: &Path,
) -> PageLayout {
    let page = PageGeometry::a4();
    let (pixel_width, pixel_height) = pixel_size;
    let (width, height) = scale_image(
        options.scale_mode,
        (f64::from(pixel_width), f64::from(pixel_height)),
        (page.usable_width(), page.usable_height()),
    );

    let image = ImagePlacement {
        path: pair.image.path.clone(),
        pixel_width,
        pixel_height,
        left: page.margin,
        top: page.margin,
        width,
        height,
    };

    let lines: Vec<String> = pair.record.label().split('\n').map(str::to_string).collect();
    let text_box = options.text_box;

    let main = TextBlock {
        lines,
        x: f64::from(text_box.x),
        y: f64::from(text_box.y),
        width: f64::from(text_box.width),
        color: options.color,
        opacity: 1.0,
        font: options.font.clone(),
        centered: options.center,
    };

    let shadow = TextBlock {
        x: main.x + SHADOW_OFFSET_X,
        y: main.y + SHADOW_OFFSET_Y,
        color: SHADOW_COLOR,
        opacity: SHADOW_OPACITY,
        ..main.clone()
    };

    PageLayout {
        title: pair.image.base_name.clone(),
        output_path: output_path(output_dir, &pair.image.base_name),
        page,
        image,
        shadow,
        main,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::csv_loader::CsvRecord;
    use crate::locator::ImageFile;
    use crate::options::RenderOptions;

    const TOLERANCE: f64 = 1e-9;

    fn pair(name: &str) -> MatchedPair {
        MatchedPair {
            image: ImageFile::new(PathBuf::from(format!("/photos/{}.jpg", name))).unwrap(),
            record: CsvRecord {
                image_name: name.to_string(),
                x: "10".to_string(),
                y: "20".to_string(),
            },
        }
    }

    fn options(mode: ScaleMode) -> ValidatedOptions {
        RenderOptions {
            scale_mode: mode,
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    #[test]
    fn test_usable_area_of_a4() {
        let page = PageGeometry::a4();
        assert_eq!(page.usable_width(), 575.0);
        assert_eq!(page.usable_height(), 822.0);
    }

    #[test]
    fn test_absolute_fills_usable_area() {
        for size in [(4000, 1000), (10, 900), (575, 822)] {
            let layout = compose_page(&pair("a"), size, &options(ScaleMode::Absolute), Path::new("/out"));
            assert_eq!(layout.image.width, 575.0);
            assert_eq!(layout.image.height, 822.0);
        }
    }

    #[test]
    fn test_fit_wide_image_is_width_bound() {
        let layout = compose_page(&pair("a"), (1600, 900), &options(ScaleMode::Fit), Path::new("/out"));

        assert!((layout.image.width - 575.0).abs() < TOLERANCE);
        assert!(layout.image.height <= 822.0);
        let aspect = layout.image.width / layout.image.height;
        assert!((aspect - 1600.0 / 900.0).abs() < 1e-6);
    }

    #[test]
    fn test_fit_tall_image_is_height_bound() {
        let (width, height) = scale_image(ScaleMode::Fit, (100.0, 1000.0), (575.0, 822.0));
        assert!((height - 822.0).abs() < TOLERANCE);
        assert!((width - 82.2).abs() < 1e-6);
    }

    #[test]
    fn test_fit_scales_small_images_up() {
        let (width, height) = scale_image(ScaleMode::Fit, (50.0, 50.0), (575.0, 822.0));
        assert!((width - 575.0).abs() < TOLERANCE);
        assert!((height - 575.0).abs() < TOLERANCE);
    }

    #[test]
    fn test_text_blocks() {
        let layout = compose_page(&pair("a"), (10, 10), &options(ScaleMode::Fit), Path::new("/out"));

        assert_eq!(layout.main.lines, vec!["a".to_string(), " X = 10, Y = 20".to_string()]);
        assert_eq!((layout.main.x, layout.main.y, layout.main.width), (50.0, 750.0, 500.0));
        assert_eq!(layout.main.color, Rgb::BLACK);
        assert_eq!(layout.main.opacity, 1.0);

        assert_eq!(layout.shadow.text(), layout.main.text());
        assert!((layout.shadow.x - 51.2).abs() < TOLERANCE);
        assert_eq!(layout.shadow.y, 749.0);
        assert_eq!(layout.shadow.width, layout.main.width);
        assert_eq!(layout.shadow.color, Rgb(128, 128, 128));
        assert_eq!(layout.shadow.opacity, 0.4);
    }

    #[test]
    fn test_shadow_shares_font_treatment() {
        let mut render = RenderOptions::default();
        render.font.bold = true;
        render.font.underline = true;
        render.center = true;
        render.color = Rgb(200, 0, 0);
        let layout = compose_page(&pair("a"), (10, 10), &render.validate().unwrap(), Path::new("/out"));

        assert_eq!(layout.shadow.font, layout.main.font);
        assert!(layout.shadow.centered && layout.main.centered);
        assert_eq!(layout.main.color, Rgb(200, 0, 0));
        assert_eq!(layout.shadow.color, SHADOW_COLOR);
    }

    #[test]
    fn test_output_named_after_image() {
        let mut matched = pair("scan");
        matched.image = ImageFile::new(PathBuf::from("/photos/Scan.PNG")).unwrap();
        let layout = compose_page(&matched, (10, 10), &options(ScaleMode::Fit), Path::new("/photos"));

        assert_eq!(layout.output_path, PathBuf::from("/photos/Scan.pdf"));
        assert_eq!(layout.image.left, PAGE_MARGIN);
        assert_eq!(layout.image.top, PAGE_MARGIN);
    }
}
