//! Extras

use rustc_hash::FxHashMap;

use crate::{
    input::{FieldKind, NumericField},
    packages::PackageId,
    pricing::Extras,
};

/// Which extra a keystroke targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtraKind {
    /// Extra photos
    Photos,

    /// Extra videos
    Videos,
}

/// Extra photo and video inputs for one package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtrasEntry {
    /// Extra photos input
    pub photos: NumericField,

    /// Extra videos input
    pub videos: NumericField,
}

impl Default for ExtrasEntry {
    fn default() -> Self {
        Self {
            photos: NumericField::new(FieldKind::ExtraPhotos),
            videos: NumericField::new(FieldKind::ExtraVideos),
        }
    }
}

impl ExtrasEntry {
    /// Counts for pricing; unset fields count as zero.
    ///
    /// # Errors
    ///
    /// Returns the kind of the first field holding a number too large to count.
    pub fn counts(&self) -> Result<Extras, FieldKind> {
        Ok(Extras::new(count_of(&self.photos)?, count_of(&self.videos)?))
    }

    fn field_mut(&mut self, kind: ExtraKind) -> &mut NumericField {
        match kind {
            ExtraKind::Photos => &mut self.photos,
            ExtraKind::Videos => &mut self.videos,
        }
    }
}

fn count_of(field: &NumericField) -> Result<u32, FieldKind> {
    if field.is_out_of_range() {
        return Err(field.kind());
    }

    Ok(field.count().unwrap_or(0))
}

/// Per-package extras inputs.
#[derive(Debug, Clone, Default)]
pub struct ExtrasSelection {
    entries: FxHashMap<PackageId, ExtrasEntry>,
}

impl ExtrasSelection {
    /// Create an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty entry for every package id.
    pub fn for_packages<'p>(ids: impl IntoIterator<Item = &'p PackageId>) -> Self {
        Self {
            entries: ids
                .into_iter()
                .map(|id| (id.clone(), ExtrasEntry::default()))
                .collect(),
        }
    }

    /// Entry for a package, if one exists.
    pub fn entry(&self, id: &PackageId) -> Option<&ExtrasEntry> {
        self.entries.get(id)
    }

    /// Apply a keystroke to one of a package's extras fields.
    pub fn input(&mut self, id: &PackageId, kind: ExtraKind, raw: &str) -> &ExtrasEntry {
        let entry = self.entries.entry(id.clone()).or_default();

        entry.field_mut(kind).input(raw);

        entry
    }

    /// Counts for pricing; unknown packages have no extras.
    ///
    /// # Errors
    ///
    /// Returns the kind of the first field holding a number too large to count.
    pub fn counts(&self, id: &PackageId) -> Result<Extras, FieldKind> {
        self.entry(id).map_or(Ok(Extras::default()), ExtrasEntry::counts)
    }

    /// First validation error for a package's extras.
    pub fn error(&self, id: &PackageId) -> Option<&'static str> {
        self.entry(id)
            .and_then(|entry| entry.photos.error().or_else(|| entry.videos.error()))
    }

    /// Reset a package's extras.
    pub fn reset(&mut self, id: &PackageId) {
        if let Some(entry) = self.entries.get_mut(id) {
            *entry = ExtrasEntry::default();
        }
    }

    /// Reset every package's extras.
    pub fn clear(&mut self) {
        self.entries.values_mut().for_each(|entry| *entry = ExtrasEntry::default());
    }
}
