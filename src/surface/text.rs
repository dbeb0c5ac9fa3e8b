use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use usvg::fontdb;

use crate::foundation::error::{HostError, HostResult};
use crate::surface::state::FontSpec;

/// Deferred source of the shared system font database.
pub type SystemFonts = Box<dyn FnOnce() -> Arc<fontdb::Database>>;

/// Font lookup by family name over configured directories and, optionally, system fonts.
///
/// The database is assembled on first use so frames that never draw text pay nothing.
pub struct FontBook {
    font_dirs: Vec<PathBuf>,
    system: Option<SystemFonts>,
    db: Option<fontdb::Database>,
}

impl FontBook {
    /// Build a book over `font_dirs`, layered on top of `system` when provided.
    pub fn new(font_dirs: Vec<PathBuf>, system: Option<SystemFonts>) -> Self {
        Self {
            font_dirs,
            system,
            db: None,
        }
    }

    /// A book with no fonts at all.
    pub fn empty() -> Self {
        Self::new(Vec::new(), None)
    }

    fn database(&mut self) -> &fontdb::Database {
        let font_dirs = &self.font_dirs;
        let system = &mut self.system;
        self.db.get_or_insert_with(|| {
            let mut db = match system.take() {
                Some(load) => (*load()).clone(),
                None => fontdb::Database::new(),
            };
            for dir in font_dirs {
                load_fonts_from_dir(&mut db, dir);
            }
            tracing::debug!(faces = db.len(), "font database ready");
            db
        })
    }

    /// Raw bytes and face index of the best face for `family`.
    pub(crate) fn face_bytes(&mut self, family: &str) -> Option<(Vec<u8>, u32)> {
        let db = self.database();
        let families = [generic_family(family), fontdb::Family::SansSerif];
        let query = fontdb::Query {
            families: &families,
            ..fontdb::Query::default()
        };
        let id = db
            .query(&query)
            .or_else(|| db.faces().next().map(|f| f.id))?;
        db.with_face_data(id, |data, index| (data.to_vec(), index))
    }
}

fn generic_family(name: &str) -> fontdb::Family<'_> {
    match name.to_ascii_lowercase().as_str() {
        "serif" => fontdb::Family::Serif,
        "sans-serif" => fontdb::Family::SansSerif,
        "monospace" => fontdb::Family::Monospace,
        "cursive" => fontdb::Family::Cursive,
        "fantasy" => fontdb::Family::Fantasy,
        _ => fontdb::Family::Name(name),
    }
}

fn load_fonts_from_dir(db: &mut fontdb::Database, dir: &Path) {
    let Ok(rd) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "font directory is not readable");
        return;
    };

    for entry in rd.flatten() {
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        let Some(ext) = path.extension().and_then(|s| s.to_str()) else {
            continue;
        };
        let ext = ext.to_ascii_lowercase();
        if ext != "ttf" && ext != "otf" && ext != "ttc" {
            continue;
        }
        if let Err(e) = db.load_font_file(&path) {
            tracing::warn!(path = %path.display(), error = %e, "skipping unreadable font");
        }
    }
}

/// Stateful helper for building Parley text layouts from registered font bytes.
pub(crate) struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<()>,
}

impl TextLayoutEngine {
    pub(crate) fn new() -> Self {
        Self {
            font_ctx: parley::FontContext::default(),
            layout_ctx: parley::LayoutContext::new(),
        }
    }

    /// Register font bytes and return the family name Parley knows them by.
    pub(crate) fn register(&mut self, font_bytes: Vec<u8>) -> HostResult<String> {
        let families = self
            .font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(font_bytes), None);
        let family_id = families
            .first()
            .map(|(id, _)| *id)
            .ok_or_else(|| HostError::render("no font families registered from font bytes"))?;

        Ok(self
            .font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| HostError::render("registered font family has no name"))?
            .to_string())
    }

    /// Lay out one unwrapped line of `text`.
    pub(crate) fn layout_line(
        &mut self,
        text: &str,
        family: &str,
        size_px: f32,
    ) -> parley::Layout<()> {
        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(family.to_string())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));

        let mut layout: parley::Layout<()> = builder.build(text);
        layout.break_all_lines(None);
        layout
    }
}

struct LoadedFont {
    data: vello_cpu::peniko::FontData,
    family: String,
}

/// Glyphs of one shaped string, positioned relative to the start of its alphabetic baseline.
pub(crate) struct ShapedText {
    pub(crate) font: vello_cpu::peniko::FontData,
    pub(crate) runs: Vec<ShapedRun>,
}

pub(crate) struct ShapedRun {
    pub(crate) size_px: f32,
    pub(crate) glyphs: Vec<vello_cpu::Glyph>,
}

/// Font resolution plus shaping shared by every surface of one host.
pub struct Typesetter {
    book: FontBook,
    engine: TextLayoutEngine,
    loaded: HashMap<String, Option<LoadedFont>>,
}

impl Typesetter {
    /// Create a typesetter over `book`.
    pub fn new(book: FontBook) -> Self {
        Self {
            book,
            engine: TextLayoutEngine::new(),
            loaded: HashMap::new(),
        }
    }

    /// Shape `text` in `font`. `None` when no usable face exists.
    pub(crate) fn shape(&mut self, font: &FontSpec, text: &str) -> HostResult<Option<ShapedText>> {
        if text.is_empty() {
            return Ok(None);
        }
        let key = font.family.to_ascii_lowercase();
        if !self.loaded.contains_key(&key) {
            let loaded = match self.book.face_bytes(&font.family) {
                Some((bytes, index)) => {
                    let family = self.engine.register(bytes.clone())?;
                    Some(LoadedFont {
                        data: vello_cpu::peniko::FontData::new(
                            vello_cpu::peniko::Blob::from(bytes),
                            index,
                        ),
                        family,
                    })
                }
                None => {
                    tracing::debug!(family = %font.family, "no font face available");
                    None
                }
            };
            self.loaded.insert(key.clone(), loaded);
        }
        let Some(Some(loaded)) = self.loaded.get(&key) else {
            return Ok(None);
        };

        let layout = self.engine.layout_line(text, &loaded.family, font.size_px);
        let first_baseline = layout
            .lines()
            .next()
            .map(|l| l.metrics().baseline)
            .unwrap_or(0.0);

        let mut runs = Vec::new();
        for line in layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };
                let mut x = run.offset();
                let y = run.baseline() - first_baseline;
                let glyphs = run
                    .glyphs()
                    .map(|g| {
                        let glyph = vello_cpu::Glyph {
                            id: g.id.into(),
                            x: x + g.x,
                            y: y - g.y,
                        };
                        x += g.advance;
                        glyph
                    })
                    .collect();
                runs.push(ShapedRun {
                    size_px: run.run().font_size(),
                    glyphs,
                });
            }
        }

        Ok(Some(ShapedText {
            font: loaded.data.clone(),
            runs,
        }))
    }
}
