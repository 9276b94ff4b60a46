use raylib::prelude::*;

use crate::constants::*;
use crate::slide::Slide;
use crate::texture_loader::TextureCache;

pub trait SlideRenderer<T> {
    type Output;

    fn render(&self, slide: &T, compact: bool) -> Self::Output;
}

const DEFAULT_BACKGROUND: Color = Color::new(0xFF, 0xFF, 0xFF, 0xFF);
const DEFAULT_TITLE_COLOR: Color = Color::new(0x11, 0x18, 0x27, 0xFF);
const DEFAULT_DESCRIPTION_COLOR: Color = Color::new(0x4B, 0x55, 0x63, 0xFF);
const DEFAULT_BUTTON_BG: Color = Color::new(0xF7, 0xB5, 0x46, 0xFF);
const DEFAULT_BUTTON_TEXT: Color = Color::new(0x11, 0x18, 0x27, 0xFF);

const DEFAULT_TITLE_SIZE: f32 = 56.0;
const DEFAULT_DESCRIPTION_SIZE: f32 = 24.0;
const DEFAULT_PADDING_X: f32 = 96.0;
const DEFAULT_PADDING_Y: f32 = 64.0;
const COMPACT_SCALE: f32 = 0.6;
const MIN_FONT_SIZE: f32 = 8.0;
const GLYPH_WIDTH: f32 = 0.55; // Average glyph width of the default font, relative to its size
const LINE_SPACING: f32 = 1.2;
const BLOCK_GAP: f32 = 24.0;

#[derive(Debug, Clone)]
pub struct TextBlock {
    pub lines: Vec<String>,
    pub origin: Vector2,
    pub font_size: i32,
    pub line_height: f32,
    pub color: Color,
}

impl TextBlock {
    pub fn height(&self) -> f32 {
        self.lines.len() as f32 * self.line_height
    }
}

#[derive(Debug, Clone)]
pub struct ButtonBlock {
    pub label: String,
    pub rect: Rectangle,
    pub font_size: i32,
    pub background: Color,
    pub text_color: Color,
}

/// Placement of everything one slide shows.
#[derive(Debug, Clone)]
pub struct SlideFrame {
    pub background: Color,
    pub background_image: Option<String>,
    pub hero_image: Option<(String, Rectangle)>,
    pub title: Option<TextBlock>,
    pub description: Option<TextBlock>,
    pub button: Option<ButtonBlock>,
}

#[derive(Debug, Clone, Copy)]
pub struct LayoutRenderer {
    pub width: f32,
    pub height: f32,
}

impl Default for LayoutRenderer {
    fn default() -> Self {
        Self {
            width: RENDER_WIDTH as f32,
            height: RENDER_HEIGHT as f32,
        }
    }
}

impl SlideRenderer<Slide> for LayoutRenderer {
    type Output = SlideFrame;

    fn render(&self, slide: &Slide, compact: bool) -> SlideFrame {
        let scale = if compact { COMPACT_SCALE } else { 1.0 };
        let pad_x = slide
            .number("contentPaddingX")
            .unwrap_or(DEFAULT_PADDING_X)
            .max(0.0)
            * scale;
        let pad_y = slide
            .number("contentPaddingY")
            .unwrap_or(DEFAULT_PADDING_Y)
            .max(0.0)
            * scale;

        // Text takes the left half when there is a hero image, the full width otherwise.
        let hero = slide.text("heroImageUrl").map(|url| {
            let rect = Rectangle::new(
                self.width / 2.0 + pad_x / 2.0,
                pad_y,
                (self.width / 2.0 - pad_x * 1.5).max(1.0),
                (self.height - pad_y * 2.0).max(1.0),
            );
            (url.to_string(), rect)
        });
        let column_width = if hero.is_some() {
            self.width / 2.0 - pad_x * 1.5
        } else {
            self.width - pad_x * 2.0
        }
        .max(1.0);

        let title = slide.text("title").map(|text| {
            let size = font_size(slide.number("titleFontSize"), DEFAULT_TITLE_SIZE, scale);
            text_block(
                text,
                size,
                column_width,
                color_attr(slide, "titleColor", DEFAULT_TITLE_COLOR),
            )
        });
        let description = slide.text("description").map(|text| {
            let size = font_size(
                slide.number("descriptionFontSize"),
                DEFAULT_DESCRIPTION_SIZE,
                scale,
            );
            text_block(
                text,
                size,
                column_width,
                color_attr(slide, "descriptionColor", DEFAULT_DESCRIPTION_COLOR),
            )
        });
        let button = slide.text("buttonText").map(|label| {
            let size = font_size(None, DEFAULT_DESCRIPTION_SIZE, scale);
            let width = text_width(label, size) + 48.0 * scale;
            let height = size + 24.0 * scale;
            ButtonBlock {
                label: label.to_string(),
                rect: Rectangle::new(0.0, 0.0, width, height),
                font_size: size as i32,
                background: color_attr(slide, "buttonBgColor", DEFAULT_BUTTON_BG),
                text_color: color_attr(slide, "buttonTextColor", DEFAULT_BUTTON_TEXT),
            }
        });

        let mut frame = SlideFrame {
            background: color_attr(slide, "backgroundColor", DEFAULT_BACKGROUND),
            background_image: slide.text("imageUrl").map(str::to_string),
            hero_image: hero,
            title,
            description,
            button,
        };
        stack_vertically(&mut frame, pad_x, self.height, BLOCK_GAP * scale);
        frame
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SummaryRenderer;

impl SlideRenderer<Slide> for SummaryRenderer {
    type Output = String;

    fn render(&self, slide: &Slide, compact: bool) -> String {
        let title = slide.text("title").unwrap_or("(untitled)");
        if compact && title.chars().count() > 40 {
            let short: String = title.chars().take(39).collect();
            format!("[{}] {short}…", slide.id)
        } else {
            format!("[{}] {title}", slide.id)
        }
    }
}

pub fn image_refs(slide: &Slide) -> impl Iterator<Item = &str> {
    ["imageUrl", "heroImageUrl"]
        .into_iter()
        .filter_map(move |key| slide.text(key))
}

/// Parses `#rgb` / `#rrggbb` / `#rrggbbaa`.
pub fn parse_hex_color(raw: &str) -> Option<Color> {
    let hex = raw.trim().strip_prefix('#')?;
    if !hex.is_ascii() {
        return None;
    }
    let channel = |s: &str| u8::from_str_radix(s, 16).ok();
    match hex.len() {
        3 => {
            let mut rgb = hex.chars().map(|c| channel(&c.to_string()).map(|v| v * 17));
            Some(Color::new(rgb.next()??, rgb.next()??, rgb.next()??, 0xFF))
        }
        6 => Some(Color::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            0xFF,
        )),
        8 => Some(Color::new(
            channel(&hex[0..2])?,
            channel(&hex[2..4])?,
            channel(&hex[4..6])?,
            channel(&hex[6..8])?,
        )),
        _ => None,
    }
}

fn color_attr(slide: &Slide, key: &str, default: Color) -> Color {
    slide.text(key).and_then(parse_hex_color).unwrap_or(default)
}

fn font_size(requested: Option<f32>, default: f32, scale: f32) -> f32 {
    (requested.unwrap_or(default) * scale).max(MIN_FONT_SIZE).round()
}

fn text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * GLYPH_WIDTH
}

fn text_block(text: &str, size: f32, max_width: f32, color: Color) -> TextBlock {
    let max_chars = ((max_width / (size * GLYPH_WIDTH)).floor() as usize).max(1);
    TextBlock {
        lines: wrap(text, max_chars),
        origin: Vector2::new(0.0, 0.0),
        font_size: size as i32,
        line_height: size * LINE_SPACING,
        color,
    }
}

pub fn wrap(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.lines() {
        let mut line = String::new();
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > max_chars {
                if !line.is_empty() {
                    lines.push(std::mem::take(&mut line));
                }
                lines.push(word.drain(..max_chars).collect());
            }
            let word: String = word.into_iter().collect();
            if word.is_empty() {
                continue;
            }
            let needed = if line.is_empty() {
                word.chars().count()
            } else {
                line.chars().count() + 1 + word.chars().count()
            };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
            }
            if !line.is_empty() {
                line.push(' ');
            }
            line.push_str(&word);
        }
        if !line.is_empty() {
            lines.push(line);
        }
    }
    lines
}

fn stack_vertically(frame: &mut SlideFrame, left: f32, surface_height: f32, gap: f32) {
    let blocks = frame
        .title
        .iter()
        .map(TextBlock::height)
        .chain(frame.description.iter().map(TextBlock::height))
        .chain(frame.button.iter().map(|b| b.rect.height));
    let (count, total) = blocks.fold((0usize, 0.0f32), |(n, h), block| (n + 1, h + block));
    let total = total + gap * count.saturating_sub(1) as f32;

    let mut y = ((surface_height - total) / 2.0).max(0.0);
    if let Some(title) = frame.title.as_mut() {
        title.origin = Vector2::new(left, y);
        y += title.height() + gap;
    }
    if let Some(description) = frame.description.as_mut() {
        description.origin = Vector2::new(left, y);
        y += description.height() + gap;
    }
    if let Some(button) = frame.button.as_mut() {
        button.rect.x = left;
        button.rect.y = y;
    }
}

/// Largest rectangle with the texture's aspect ratio that fits in `bounds`,
/// centred.
pub fn fit_contain(tex_width: f32, tex_height: f32, bounds: Rectangle) -> Rectangle {
    if tex_width <= 0.0 || tex_height <= 0.0 {
        return bounds;
    }
    let scale = (bounds.width / tex_width).min(bounds.height / tex_height);
    let width = tex_width * scale;
    let height = tex_height * scale;
    Rectangle::new(
        bounds.x + (bounds.width - width) / 2.0,
        bounds.y + (bounds.height - height) / 2.0,
        width,
        height,
    )
}

/// Source rectangle cropping the texture so it covers a `target` sized area.
pub fn crop_cover(
    tex_width: f32,
    tex_height: f32,
    target_width: f32,
    target_height: f32,
) -> Rectangle {
    let scale = (target_width / tex_width).max(target_height / tex_height);
    let width = target_width / scale;
    let height = target_height / scale;
    Rectangle::new((tex_width - width) / 2.0, (tex_height - height) / 2.0, width, height)
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ChromeHit {
    Previous,
    Next,
    Dot(usize),
}

#[derive(Debug, Clone, Copy)]
pub struct Chrome {
    pub len: usize,
    pub width: f32,
    pub height: f32,
}

impl Chrome {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            width: RENDER_WIDTH as f32,
            height: RENDER_HEIGHT as f32,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.len > 1
    }

    pub fn previous_center(&self) -> Vector2 {
        Vector2::new(ARROW_MARGIN + ARROW_RADIUS, self.height / 2.0)
    }

    pub fn next_center(&self) -> Vector2 {
        Vector2::new(self.width - ARROW_MARGIN - ARROW_RADIUS, self.height / 2.0)
    }

    pub fn dot_center(&self, index: usize) -> Vector2 {
        let row_width = DOT_SPACING * self.len.saturating_sub(1) as f32;
        let start = self.width / 2.0 - row_width / 2.0;
        Vector2::new(start + DOT_SPACING * index as f32, self.height - DOT_BOTTOM_MARGIN)
    }

    pub fn hit(&self, point: Vector2) -> Option<ChromeHit> {
        if !self.is_visible() {
            return None;
        }
        if within(point, self.previous_center(), ARROW_RADIUS) {
            return Some(ChromeHit::Previous);
        }
        if within(point, self.next_center(), ARROW_RADIUS) {
            return Some(ChromeHit::Next);
        }
        (0..self.len)
            .find(|&i| within(point, self.dot_center(i), DOT_SPACING / 2.0))
            .map(ChromeHit::Dot)
    }
}

fn within(point: Vector2, center: Vector2, radius: f32) -> bool {
    let dx = point.x - center.x;
    let dy = point.y - center.y;
    dx * dx + dy * dy <= radius * radius
}

pub fn fade(color: Color, opacity: f32) -> Color {
    Color::new(color.r, color.g, color.b, (color.a as f32 * opacity.clamp(0.0, 1.0)) as u8)
}

pub fn draw_frame(
    d: &mut RaylibDrawHandle,
    frame: &SlideFrame,
    opacity: f32,
    textures: &TextureCache,
) {
    let surface = Rectangle::new(0.0, 0.0, RENDER_WIDTH as f32, RENDER_HEIGHT as f32);
    d.draw_rectangle_rec(surface, fade(frame.background, opacity));

    if let Some(texture) = frame.background_image.as_deref().and_then(|p| textures.get(p)) {
        let (w, h) = (texture.width() as f32, texture.height() as f32);
        d.draw_texture_pro(
            texture,
            crop_cover(w, h, surface.width, surface.height),
            surface,
            Vector2::new(0.0, 0.0),
            0.0,
            fade(Color::WHITE, opacity),
        );
    }

    if let Some((path, bounds)) = &frame.hero_image {
        if let Some(texture) = textures.get(path) {
            let (w, h) = (texture.width() as f32, texture.height() as f32);
            d.draw_texture_pro(
                texture,
                Rectangle::new(0.0, 0.0, w, h),
                fit_contain(w, h, *bounds),
                Vector2::new(0.0, 0.0),
                0.0,
                fade(Color::WHITE, opacity),
            );
        }
    }

    for block in frame.title.iter().chain(frame.description.iter()) {
        for (i, line) in block.lines.iter().enumerate() {
            d.draw_text(
                line,
                block.origin.x as i32,
                (block.origin.y + i as f32 * block.line_height) as i32,
                block.font_size,
                fade(block.color, opacity),
            );
        }
    }

    if let Some(button) = &frame.button {
        d.draw_rectangle_rec(button.rect, fade(button.background, opacity));
        let inset = (button.rect.height - button.font_size as f32) / 2.0;
        d.draw_text(
            &button.label,
            (button.rect.x + inset * 2.0) as i32,
            (button.rect.y + inset) as i32,
            button.font_size,
            fade(button.text_color, opacity),
        );
    }
}

pub fn draw_chrome(d: &mut RaylibDrawHandle, chrome: &Chrome, current: usize) {
    if !chrome.is_visible() {
        return;
    }
    let button_bg = Color::new(0xFF, 0xFF, 0xFF, 0xB3);
    for (center, glyph) in [(chrome.previous_center(), "<"), (chrome.next_center(), ">")] {
        d.draw_circle(center.x as i32, center.y as i32, ARROW_RADIUS, button_bg);
        d.draw_text(glyph, center.x as i32 - 8, center.y as i32 - 14, 28, Color::DARKGRAY);
    }
    for i in 0..chrome.len {
        let center = chrome.dot_center(i);
        if i == current {
            d.draw_circle(center.x as i32, center.y as i32, DOT_ACTIVE_RADIUS, DEFAULT_BUTTON_BG);
        } else {
            d.draw_circle(center.x as i32, center.y as i32, DOT_RADIUS, button_bg);
        }
    }
}

pub fn draw_status(d: &mut RaylibDrawHandle, headline: &str, detail: &str, color: Color) {
    d.clear_background(Color::BLACK);
    let x = RENDER_WIDTH / 2 - measure_text(headline, 48) / 2;
    d.draw_text(headline, x, RENDER_HEIGHT / 2 - 48, 48, color);
    let x = RENDER_WIDTH / 2 - measure_text(detail, 24) / 2;
    d.draw_text(detail, x, RENDER_HEIGHT / 2 + 16, 24, Color::LIGHTGRAY);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rgba(c: Color) -> (u8, u8, u8, u8) {
        (c.r, c.g, c.b, c.a)
    }

    #[test]
    fn parses_hex_colors() {
        assert_eq!(parse_hex_color("#112233").map(rgba), Some((0x11, 0x22, 0x33, 0xFF)));
        assert_eq!(parse_hex_color("#fff").map(rgba), Some((0xFF, 0xFF, 0xFF, 0xFF)));
        assert_eq!(parse_hex_color(" #11223380 ").map(rgba), Some((0x11, 0x22, 0x33, 0x80)));
        assert!(parse_hex_color("112233").is_none());
        assert!(parse_hex_color("#12345").is_none());
        assert!(parse_hex_color("#ggg").is_none());
        assert!(parse_hex_color("rgb(1,2,3)").is_none());
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(wrap("the quick brown fox", 10), ["the quick", "brown fox"]);
        assert_eq!(wrap("abcdefghij", 4), ["abcd", "efgh", "ij"]);
        assert_eq!(wrap("one\ntwo", 20), ["one", "two"]);
        assert!(wrap("   ", 5).is_empty());
    }

    #[test]
    fn layout_reads_known_attributes() {
        let slide = Slide::new("s")
            .with("title", "Hello")
            .with("description", "World")
            .with("buttonText", "Shop now")
            .with("backgroundColor", "#000000")
            .with("titleColor", "#ff0000")
            .with("titleFontSize", 40);
        let frame = LayoutRenderer::default().render(&slide, false);

        assert_eq!(rgba(frame.background), (0, 0, 0, 0xFF));
        let title = frame.title.unwrap();
        assert_eq!(title.lines, ["Hello"]);
        assert_eq!(title.font_size, 40);
        assert_eq!(rgba(title.color), (0xFF, 0, 0, 0xFF));
        assert_eq!(frame.description.unwrap().lines, ["World"]);
        assert_eq!(frame.button.unwrap().label, "Shop now");
        assert!(frame.hero_image.is_none());
    }

    #[test]
    fn layout_falls_back_on_bad_values() {
        let slide = Slide::new("s")
            .with("title", "T")
            .with("backgroundColor", "tomato")
            .with("titleFontSize", "huge");
        let frame = LayoutRenderer::default().render(&slide, false);
        assert_eq!(rgba(frame.background), rgba(DEFAULT_BACKGROUND));
        assert_eq!(frame.title.unwrap().font_size, DEFAULT_TITLE_SIZE as i32);
        assert!(frame.button.is_none());
    }

    #[test]
    fn compact_layout_shrinks_fonts() {
        let slide = Slide::new("s").with("title", "Hello");
        let full = LayoutRenderer::default().render(&slide, false);
        let compact = LayoutRenderer::default().render(&slide, true);
        assert!(compact.title.unwrap().font_size < full.title.unwrap().font_size);
    }

    #[test]
    fn blocks_stack_top_to_bottom() {
        let slide = Slide::new("s")
            .with("title", "Title")
            .with("description", "Body")
            .with("buttonText", "Go");
        let frame = LayoutRenderer::default().render(&slide, false);
        let title = frame.title.unwrap();
        let description = frame.description.unwrap();
        let button = frame.button.unwrap();
        assert!(title.origin.y < description.origin.y);
        assert!(description.origin.y < button.rect.y);
        assert_eq!(title.origin.x, DEFAULT_PADDING_X);
    }

    #[test]
    fn hero_image_takes_right_half() {
        let slide = Slide::new("s").with("heroImageUrl", "hero.png").with("title", "T");
        let frame = LayoutRenderer::default().render(&slide, false);
        let (path, rect) = frame.hero_image.unwrap();
        assert_eq!(path, "hero.png");
        assert!(rect.x >= RENDER_WIDTH as f32 / 2.0);
    }

    #[test]
    fn summary_uses_id_and_title() {
        let slide = Slide::new("s7").with("title", "Autumn collection");
        assert_eq!(SummaryRenderer.render(&slide, false), "[s7] Autumn collection");
        assert_eq!(SummaryRenderer.render(&Slide::new("x"), false), "[x] (untitled)");

        let long = Slide::new("l").with("title", "a".repeat(60));
        assert_eq!(SummaryRenderer.render(&long, true).chars().count(), "[l] ".len() + 40);
    }

    #[test]
    fn image_refs_lists_present_images() {
        let slide = Slide::new("s").with("imageUrl", "bg.jpg").with("heroImageUrl", "");
        assert_eq!(image_refs(&slide).collect::<Vec<_>>(), ["bg.jpg"]);
    }

    #[test]
    fn contain_keeps_aspect_ratio() {
        let rect = fit_contain(200.0, 100.0, Rectangle::new(0.0, 0.0, 100.0, 100.0));
        assert_eq!((rect.x, rect.y, rect.width, rect.height), (0.0, 25.0, 100.0, 50.0));
    }

    #[test]
    fn cover_crops_the_long_side() {
        let src = crop_cover(200.0, 100.0, 100.0, 100.0);
        assert_eq!((src.x, src.y, src.width, src.height), (50.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn chrome_hit_testing() {
        let chrome = Chrome::new(3);
        assert_eq!(chrome.hit(chrome.previous_center()), Some(ChromeHit::Previous));
        assert_eq!(chrome.hit(chrome.next_center()), Some(ChromeHit::Next));
        assert_eq!(chrome.hit(chrome.dot_center(2)), Some(ChromeHit::Dot(2)));
        assert_eq!(chrome.hit(Vector2::new(RENDER_WIDTH as f32 / 2.0, 10.0)), None);
    }

    #[test]
    fn chrome_hidden_for_single_slide() {
        let chrome = Chrome::new(1);
        assert!(!chrome.is_visible());
        assert_eq!(chrome.hit(chrome.next_center()), None);
    }

    #[test]
    fn fade_scales_alpha() {
        assert_eq!(rgba(fade(Color::new(10, 20, 30, 200), 0.5)), (10, 20, 30, 100));
        assert_eq!(fade(Color::WHITE, 2.0).a, 255);
    }
}
