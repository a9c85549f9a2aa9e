use std::collections::HashMap;

use ratatui::buffer::Buffer;
use ratatui::layout::Rect;

use crate::Row;

/// How one [`Row::Kind`] is rendered.
pub struct Template<R> {
    /// Populate the given area of the buffer with the row.
    pub configure: fn(&R, Rect, &mut Buffer),
    /// Lines the row needs.
    pub height: fn(&R) -> u16,
}

impl<R> Template<R> {
    #[must_use]
    pub const fn new(configure: fn(&R, Rect, &mut Buffer), height: fn(&R) -> u16) -> Self {
        Self { configure, height }
    }
}

// Not derived: that would require `R: Clone`.
impl<R> Clone for Template<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Template<R> {}

impl<R> core::fmt::Debug for Template<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Template").finish_non_exhaustive()
    }
}

/// Lookup table from [`Row::Kind`] to the [`Template`] rendering it.
///
/// Rows whose kind has no template are left blank.
pub struct Templates<R: Row> {
    templates: HashMap<R::Kind, Template<R>>,
}

impl<R: Row> Templates<R> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Register the `template` for `kind`, replacing a previous one.
    #[must_use]
    pub fn with(mut self, kind: R::Kind, template: Template<R>) -> Self {
        self.templates.insert(kind, template);
        self
    }

    #[must_use]
    pub fn get(&self, kind: R::Kind) -> Option<&Template<R>> {
        self.templates.get(&kind)
    }

    /// Lines needed for `row`. Rows without a template take one line.
    #[must_use]
    pub fn height(&self, row: &R) -> u16 {
        self.get(row.kind()).map_or(1, |template| (template.height)(row))
    }

    pub fn configure(&self, row: &R, area: Rect, buffer: &mut Buffer) {
        if let Some(template) = self.get(row.kind()) {
            (template.configure)(row, area, buffer);
        }
    }
}

impl<R: Row> Default for Templates<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Row> Clone for Templates<R> {
    fn clone(&self) -> Self {
        Self {
            templates: self.templates.clone(),
        }
    }
}

impl<R: Row> core::fmt::Debug for Templates<R> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_set().entries(self.templates.keys()).finish()
    }
}
