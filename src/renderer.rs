//! # Widget Face Rendering
//!
//! This module draws a [`WidgetView`] either onto any `embedded-graphics`
//! draw target (the widget face, saved as PNG by the host) or as ASCII text
//! for development in a terminal.
//!
//! ## Layout
//! - **Content area**: everything above the indicator strip. Shows the
//!   dot-matrix sprite, the name and number, or the wrapped description.
//! - **Indicator strip**: bottom 24 px with one dot per page, the current page
//!   in white and the others in translucent white.

use crate::dot_matrix::DotMatrixParams;
use crate::pager::Page;
use crate::widget::WidgetView;
use embedded_graphics::{
    mono_font::{
        iso_8859_1::{FONT_10X20, FONT_6X10},
        MonoTextStyle,
    },
    pixelcolor::Rgb888,
    prelude::*,
    primitives::{Circle, PrimitiveStyle},
    text::{Alignment, Text},
};
use image::{Rgba, RgbaImage};

/// Height of the page indicator strip
const INDICATOR_HEIGHT: u32 = 24;
/// Page indicator dot diameter
const INDICATOR_DIAMETER: u32 = 8;
/// Distance between indicator dot centres
const INDICATOR_SPACING: i32 = 16;
/// Inner margin of the content area
const MARGIN: u32 = 8;
/// Description line advance for FONT_6X10
const LINE_HEIGHT: u32 = 12;
/// Cells per line in the ASCII description page
const ASCII_COLUMNS: usize = 40;

/// RGBA image wrapped as an `embedded-graphics` draw target.
pub struct FaceCanvas {
    image: RgbaImage,
}

impl FaceCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }
}

impl OriginDimensions for FaceCanvas {
    fn size(&self) -> Size {
        Size::new(self.image.width(), self.image.height())
    }
}

impl DrawTarget for FaceCanvas {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            let (Ok(x), Ok(y)) = (u32::try_from(point.x), u32::try_from(point.y)) else {
                continue;
            };
            if x < self.image.width() && y < self.image.height() {
                self.image
                    .put_pixel(x, y, Rgba([color.r(), color.g(), color.b(), 0xFF]));
            }
        }
        Ok(())
    }
}

/// Render a widget face of `width × height` pixels.
pub fn render_face(view: &WidgetView, width: u32, height: u32, background: Rgba<u8>) -> RgbaImage {
    let mut canvas = FaceCanvas::new(width, height);
    draw_face(view, &mut canvas, background).unwrap_or_else(|never| match never {});
    canvas.into_image()
}

/// Draw a widget face onto any RGB draw target, filling its whole bounding box.
pub fn draw_face<D>(view: &WidgetView, display: &mut D, background: Rgba<u8>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let bg = flatten(background, Rgb888::BLACK);
    display.clear(bg)?;

    let size = display.bounding_box().size;
    let content = Size::new(size.width, size.height.saturating_sub(INDICATOR_HEIGHT));

    match view.page {
        Page::Image => match &view.image {
            Some(image) => draw_sprite(display, image, content, bg)?,
            None => draw_centered(display, "NO IMAGE", content, bg)?,
        },
        Page::Name => {
            let centre = Point::new(content.width as i32 / 2, content.height as i32 / 2);
            let name_style = MonoTextStyle::new(&FONT_10X20, Rgb888::WHITE);
            let number_style = MonoTextStyle::new(&FONT_6X10, Rgb888::WHITE);
            Text::with_alignment(&view.name, centre, name_style, Alignment::Center).draw(display)?;
            Text::with_alignment(
                &view.number,
                centre + Point::new(0, 18),
                number_style,
                Alignment::Center,
            )
            .draw(display)?;
        }
        Page::Description => draw_description(display, &view.description, content)?,
    }

    draw_indicators(display, view, size, bg)
}

fn draw_sprite<D>(display: &mut D, image: &RgbaImage, area: Size, bg: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let (width, height) = fit(image.width(), image.height(), area.width, area.height);
    if width == 0 || height == 0 {
        return Ok(());
    }
    let left = (area.width - width) / 2;
    let top = (area.height - height) / 2;

    let pixels = (0..height).flat_map(move |dy| {
        (0..width).map(move |dx| {
            let sx = dx * image.width() / width;
            let sy = dy * image.height() / height;
            Pixel(
                Point::new((left + dx) as i32, (top + dy) as i32),
                flatten(*image.get_pixel(sx, sy), bg),
            )
        })
    });
    display.draw_iter(pixels)
}

fn draw_centered<D>(display: &mut D, text: &str, area: Size, bg: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let dim = flatten(Rgba([0xFF, 0xFF, 0xFF, 0x55]), bg);
    let style = MonoTextStyle::new(&FONT_6X10, dim);
    let centre = Point::new(area.width as i32 / 2, area.height as i32 / 2);
    Text::with_alignment(text, centre, style, Alignment::Center).draw(display)?;
    Ok(())
}

fn draw_description<D>(display: &mut D, description: &str, area: Size) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let columns = (area.width.saturating_sub(2 * MARGIN) / 6).max(1) as usize;
    let max_lines = (area.height.saturating_sub(MARGIN) / LINE_HEIGHT) as usize;
    let style = MonoTextStyle::new(&FONT_6X10, Rgb888::WHITE);

    for (row, line) in wrap_lines(description, columns, max_lines).iter().enumerate() {
        let baseline = MARGIN + 8 + row as u32 * LINE_HEIGHT;
        Text::new(line, Point::new(MARGIN as i32, baseline as i32), style).draw(display)?;
    }
    Ok(())
}

fn draw_indicators<D>(display: &mut D, view: &WidgetView, size: Size, bg: Rgb888) -> Result<(), D::Error>
where
    D: DrawTarget<Color = Rgb888>,
{
    let centre_y = size.height as i32 - INDICATOR_HEIGHT as i32 / 2;
    let centre_x = size.width as i32 / 2;

    for (slot, color) in view.page_dots().into_iter().enumerate() {
        let x = centre_x + (slot as i32 - 1) * INDICATOR_SPACING;
        Circle::with_center(Point::new(x, centre_y), INDICATOR_DIAMETER)
            .into_styled(PrimitiveStyle::with_fill(flatten(color, bg)))
            .draw(display)?;
    }
    Ok(())
}

/// Largest nearest-neighbour size of `(w, h)` that fits `(max_w, max_h)`.
///
/// Whole-number upscales only, so dots stay the same size as each other.
fn fit(w: u32, h: u32, max_w: u32, max_h: u32) -> (u32, u32) {
    if w == 0 || h == 0 {
        return (0, 0);
    }
    let ratio = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
    let ratio = if ratio >= 1.0 { ratio.floor() } else { ratio };
    (
        ((w as f32 * ratio) as u32).min(max_w),
        ((h as f32 * ratio) as u32).min(max_h),
    )
}

/// Composite an RGBA colour over an opaque background.
fn flatten(color: Rgba<u8>, bg: Rgb888) -> Rgb888 {
    let [r, g, b, a] = color.0;
    let alpha = u32::from(a);
    let mix = |s: u8, d: u8| ((u32::from(s) * alpha + u32::from(d) * (255 - alpha) + 127) / 255) as u8;
    Rgb888::new(mix(r, bg.r()), mix(g, bg.g()), mix(b, bg.b()))
}

/// Greedy word wrap to `columns` characters per line.
///
/// Words longer than a line are split. At most `max_lines` lines are
/// returned; when text is cut, the last line ends in `...`.
pub fn wrap_lines(text: &str, columns: usize, max_lines: usize) -> Vec<String> {
    let columns = columns.max(1);
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();
        while !word.is_empty() {
            let used = current.chars().count();
            let gap = usize::from(used > 0);
            if used + gap + word.len() <= columns {
                if gap == 1 {
                    current.push(' ');
                }
                current.extend(word.drain(..));
            } else if used > 0 {
                lines.push(std::mem::take(&mut current));
            } else {
                current.extend(word.drain(..columns));
                lines.push(std::mem::take(&mut current));
            }
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        if let Some(last) = lines.last_mut() {
            let keep = columns.saturating_sub(3);
            let mut cut: String = last.chars().take(keep).collect();
            cut.push_str("...");
            *last = cut;
        }
    }
    lines
}

/// ASCII rendering of a widget view for terminal development mode.
pub fn format_ascii(view: &WidgetView, params: &DotMatrixParams) -> String {
    let mut out = String::new();

    match view.page {
        Page::Image => match &view.image {
            Some(image) => {
                for gy in 0..params.grid_height {
                    let row: String = (0..params.grid_width)
                        .map(|gx| {
                            let x = ((gx as f32 + 0.5) * image.width() as f32 / params.grid_width as f32) as u32;
                            let y = ((gy as f32 + 0.5) * image.height() as f32 / params.grid_height as f32) as u32;
                            let pixel = image.get_pixel(x.min(image.width() - 1), y.min(image.height() - 1));
                            if *pixel == params.background { "  " } else { "● " }
                        })
                        .collect();
                    out.push_str(row.trim_end());
                    out.push('\n');
                }
            }
            None => out.push_str("(no image)\n"),
        },
        Page::Name => {
            out.push_str(&view.name);
            out.push('\n');
            out.push_str(&view.number);
            out.push('\n');
        }
        Page::Description => {
            for line in wrap_lines(&view.description, ASCII_COLUMNS, usize::MAX) {
                out.push_str(&line);
                out.push('\n');
            }
        }
    }

    let dots: Vec<&str> = Page::ALL
        .iter()
        .map(|&page| if page == view.page { "●" } else { "○" })
        .collect();
    out.push('\n');
    out.push_str(&dots.join(" "));
    out.push('\n');
    out
}

/// Print a widget view to stdout.
pub fn draw_ascii(view: &WidgetView, params: &DotMatrixParams) {
    print!("{}", format_ascii(view, params));
}
