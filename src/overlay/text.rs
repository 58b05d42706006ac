//! Text shaping for overlays: font registration, greedy wrapping and line layout with Parley.

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::foundation::error::{RetouchError, RetouchResult};
use crate::overlay::model::TextContent;

/// RGBA8 brush color carried through Parley layouts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TextBrush {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl From<[u8; 4]> for TextBrush {
    fn from(c: [u8; 4]) -> Self {
        Self {
            r: c[0],
            g: c[1],
            b: c[2],
            a: c[3],
        }
    }
}

/// Raw font bytes keyed by the family name overlays refer to.
#[derive(Clone, Debug, Default)]
pub struct FontRegistry {
    fonts: BTreeMap<String, Arc<Vec<u8>>>,
}

impl FontRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `name`, replacing any previous entry. The bytes must contain at
    /// least one font family.
    pub fn register(&mut self, name: impl Into<String>, bytes: Vec<u8>) -> RetouchResult<()> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(RetouchError::validation("font name must be non-empty"));
        }
        let mut probe = parley::FontContext::default();
        let families = probe
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.clone()), None);
        if families.is_empty() {
            return Err(RetouchError::validation(format!(
                "no font families found in bytes for '{name}'"
            )));
        }
        self.fonts.insert(name, Arc::new(bytes));
        Ok(())
    }

    /// Bytes registered under `name`.
    pub fn get(&self, name: &str) -> Option<&Arc<Vec<u8>>> {
        self.fonts.get(name)
    }

    /// `true` when `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.fonts.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fonts.keys().map(String::as_str)
    }
}

/// Greedy word wrap. Tokens wider than `max_width` on their own are broken between characters,
/// which also covers scripts written without spaces. `\n` always starts a new line.
pub fn wrap_text(text: &str, max_width: f32, mut measure: impl FnMut(&str) -> f32) -> Vec<String> {
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let candidate = if current.is_empty() {
                word.to_string()
            } else {
                format!("{current} {word}")
            };
            if measure(&candidate) <= max_width {
                current = candidate;
                continue;
            }
            if !current.is_empty() {
                lines.push(std::mem::take(&mut current));
            }
            if measure(word) <= max_width {
                current = word.to_string();
                continue;
            }
            for ch in word.chars() {
                let mut next = current.clone();
                next.push(ch);
                if !current.is_empty() && measure(&next) > max_width {
                    lines.push(std::mem::take(&mut current));
                    current.push(ch);
                } else {
                    current = next;
                }
            }
        }
        lines.push(current);
    }
    lines
}

/// Resolved style for one overlay's text.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TextStyle {
    /// Font size in pixels.
    pub size_px: f32,
    /// CSS weight.
    pub weight: u16,
    /// Italic.
    pub italic: bool,
    /// Fill color.
    pub brush: TextBrush,
}

/// One laid-out line positioned inside the overlay box.
pub struct PositionedLine {
    /// Parley layout of the line.
    pub layout: parley::Layout<TextBrush>,
    /// Left edge inside the box, pixels.
    pub x: f32,
    /// Top edge inside the box, pixels.
    pub y: f32,
}

/// A wrapped, centered text block.
pub struct TextBlock {
    /// Lines top to bottom.
    pub lines: Vec<PositionedLine>,
    /// Font bytes for glyph rendering.
    pub font: vello_cpu::peniko::FontData,
}

/// Stateful helper for building Parley text layouts from registered fonts.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<TextBrush>,
    families: BTreeMap<String, (String, vello_cpu::peniko::FontData)>,
}

impl Default for TextLayoutEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayoutEngine {
    /// Fresh Parley contexts with no fonts.
    pub fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
            families: BTreeMap::new(),
        }
    }

    /// Engine with every font of `registry` loaded.
    pub fn from_registry(registry: &FontRegistry) -> RetouchResult<Self> {
        let mut out = Self::new();
        for name in registry.names() {
            if let Some(bytes) = registry.get(name) {
                out.register_font(name, bytes)?;
            }
        }
        Ok(out)
    }

    /// Load font bytes under `name`.
    pub fn register_font(&mut self, name: &str, bytes: &[u8]) -> RetouchResult<()> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(bytes.to_vec()), None);
        let family_id = families.first().map(|(id, _)| *id).ok_or_else(|| {
            RetouchError::validation(format!("no font families registered for '{name}'"))
        })?;
        let family_name = self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| RetouchError::validation("registered font family has no name"))?
            .to_string();
        let data =
            vello_cpu::peniko::FontData::new(vello_cpu::peniko::Blob::from(bytes.to_vec()), 0);
        self.families.insert(name.to_string(), (family_name, data));
        Ok(())
    }

    fn family(&self, name: &str) -> RetouchResult<(String, vello_cpu::peniko::FontData)> {
        self.families
            .get(name)
            .cloned()
            .ok_or_else(|| RetouchError::export(format!("font '{name}' is not registered")))
    }

    fn build(&mut self, family: &str, text: &str, style: &TextStyle) -> parley::Layout<TextBrush> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(Cow::Owned(family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(style.size_px));
        builder.push_default(parley::style::StyleProperty::FontWeight(
            parley::style::FontWeight::new(f32::from(style.weight)),
        ));
        if style.italic {
            builder.push_default(parley::style::StyleProperty::FontStyle(
                parley::style::FontStyle::Italic,
            ));
        }
        builder.push_default(parley::style::StyleProperty::Brush(style.brush));
        let mut layout: parley::Layout<TextBrush> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }

    /// Advance width of `text` on a single line.
    pub fn measure(&mut self, font: &str, text: &str, style: &TextStyle) -> RetouchResult<f32> {
        let (family, _) = self.family(font)?;
        Ok(self.build(&family, text, style).width())
    }

    /// Wrap `content` to `box_w` pixels and center it in a `box_w x box_h` box.
    pub fn layout_block(
        &mut self,
        content: &TextContent,
        box_w: f32,
        box_h: f32,
        canvas_h: u32,
    ) -> RetouchResult<TextBlock> {
        let size_px = (content.size / 100.0 * f64::from(canvas_h)) as f32;
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(RetouchError::export("text size resolves to zero pixels"));
        }
        let style = TextStyle {
            size_px,
            weight: content.weight,
            italic: content.italic,
            brush: TextBrush::from(content.color),
        };
        let (family, font) = self.family(&content.font)?;

        let wrapped = wrap_text(&content.content, box_w, |s| {
            self.build(&family, s, &style).width()
        });
        let mut laid = Vec::with_capacity(wrapped.len());
        let mut total_h = 0.0f32;
        for line in &wrapped {
            let layout = self.build(&family, line, &style);
            let h = if line.is_empty() {
                size_px * 1.2
            } else {
                layout.height()
            };
            total_h += h;
            laid.push((layout, h));
        }

        let mut y = (box_h - total_h) / 2.0;
        let mut lines = Vec::with_capacity(laid.len());
        for (layout, h) in laid {
            let x = (box_w - layout.width()) / 2.0;
            lines.push(PositionedLine { layout, x, y });
            y += h;
        }
        Ok(TextBlock { lines, font })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/overlay/text.rs"]
mod tests;
