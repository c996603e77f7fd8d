//! Writes composed pages to PDF files.

use crate::error::{ConverterError, Result};
use crate::fonts::FontResolver;
use crate::layout::{PageGeometry, PageLayout, TextBlock};
use crate::options::Rgb;
use genpdf::{
    elements,
    error::{Error as GenpdfError, ErrorKind},
    fonts::FontCache,
    render::Area,
    style::{Color, Style},
    Context, Document, Element, Mm, Position, RenderResult, Scale, Size,
};
use std::fs;
use tracing::{debug, info};

const MM_PER_POINT: f64 = 25.4 / 72.0;

/// Anything that can turn a page layout into a file on disk
pub trait PdfEmitter {
    fn emit(&mut self, page: &PageLayout) -> Result<()>;
}

fn mm(points: f64) -> Mm {
    Mm::from(points * MM_PER_POINT)
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Renders pages with genpdf, using fonts found by a [`FontResolver`]
#[derive(Debug)]
pub struct GenpdfEmitter {
    fonts: FontResolver,
}

impl GenpdfEmitter {
    pub fn new(fonts: FontResolver) -> Self {
        Self { fonts }
    }

    /// Builds the PDF in memory
    pub fn render(&mut self, layout: &PageLayout) -> Result<Vec<u8>> {
        let resolved = self.fonts.resolve(&layout.main.font.family)?;
        if resolved.fell_back {
            info!(
                "Font '{}' unavailable, using '{}' for {}",
                layout.main.font.family,
                resolved.family,
                layout.title
            );
        }

        let decoded = image::open(&layout.image.path).map_err(|e| ConverterError::ImageDecode {
            path: layout.image.path.clone(),
            reason: e.to_string(),
        })?;
        // genpdf cannot embed images with an alpha channel
        let flattened = image::DynamicImage::ImageRgb8(decoded.to_rgb8());
        let pdf_error = |e: GenpdfError| ConverterError::PdfGeneration {
            path: layout.output_path.clone(),
            reason: e.to_string(),
        };

        let page = &layout.page;
        let picture = elements::Image::from_dynamic_image(flattened)
            .map_err(pdf_error)?
            .with_dpi(72.0)
            .with_scale(Scale::new(
                layout.image.width / f64::from(layout.image.pixel_width),
                layout.image.height / f64::from(layout.image.pixel_height),
            ))
            .with_position(Position::new(mm(layout.image.left), mm(layout.image.top)));

        let mut doc = Document::new(resolved.fonts);
        doc.set_title(layout.title.clone());
        doc.set_minimal_conformance();
        doc.set_paper_size(Size::new(mm(page.width), mm(page.height)));
        doc.set_font_size(layout.main.font.size);
        // No page decorator: the element works in absolute page coordinates

        doc.push(LabelledPage {
            picture,
            blocks: [layout.shadow.clone(), layout.main.clone()],
            page: *page,
        });

        let mut buffer = Vec::new();
        doc.render(&mut buffer).map_err(pdf_error)?;
        debug!("Rendered {} ({} bytes)", layout.title, buffer.len());
        Ok(buffer)
    }
}

impl PdfEmitter for GenpdfEmitter {
    fn emit(&mut self, layout: &PageLayout) -> Result<()> {
        let bytes = self.render(layout)?;
        fs::write(&layout.output_path, bytes)
            .map_err(|e| ConverterError::filesystem(&layout.output_path, e))?;
        info!("Wrote {}", layout.output_path.display());
        Ok(())
    }
}

/// One page: the picture, then each text block on top of it in order
struct LabelledPage {
    picture: elements::Image,
    blocks: [TextBlock; 2],
    page: PageGeometry,
}

impl Element for LabelledPage {
    fn render(
        &mut self,
        context: &Context,
        area: Area<'_>,
        style: Style,
    ) -> std::result::Result<RenderResult, GenpdfError> {
        self.picture.render(context, area.clone(), style)?;
        for block in &self.blocks {
            draw_block(&context.font_cache, &area, style, block, &self.page)?;
        }

        let mut result = RenderResult::default();
        result.size = area.size();
        Ok(result)
    }
}

/// Distance from the top of the page to the bottom of `block`
fn block_bottom(block: &TextBlock, page: &PageGeometry) -> Mm {
    mm(page.height - block.y)
}

fn draw_block(
    font_cache: &FontCache,
    area: &Area<'_>,
    base: Style,
    block: &TextBlock,
    page: &PageGeometry,
) -> std::result::Result<(), GenpdfError> {
    let ink = color(block.color.flatten_on_white(block.opacity));
    let mut style = base.with_font_size(block.font.size).with_color(ink);
    if block.font.bold {
        style = style.bold();
    }
    if block.font.italic {
        style = style.italic();
    }

    let line_height = style.line_height(font_cache);
    let mut top = block_bottom(block, page);
    for _ in &block.lines {
        top = top - line_height;
    }

    let left = mm(block.x);
    let box_width = mm(block.width);
    for line in &block.lines {
        let line_width = style.str_width(font_cache, line);
        let x = if block.centered {
            left + (box_width - line_width) / 2.0
        } else {
            left
        };

        if !area.print_str(font_cache, Position::new(x, top), style, line)? {
            return Err(GenpdfError::new(
                format!("label line {:?} at y = {} does not fit on the page", line, block.y),
                ErrorKind::PageSizeExceeded,
            ));
        }
        if block.font.underline {
            let rule = top + line_height;
            area.draw_line(
                vec![Position::new(x, rule), Position::new(x + line_width, rule)],
                Style::new().with_color(ink),
            );
        }
        top = top + line_height;
    }
    Ok(())
}
