//! The variant filename convention and `srcset` construction.
//!
//! Every variant lives next to its source and is named
//! `<basename>_<width>w.<format>`:
//!
//! ```text
//! /images/photo.png  @ 800, webp  →  /images/photo_800w.webp
//! hero.jpg           @ 400, avif  →  hero_400w.avif
//! ```
//!
//! The markup layer and the batch generator both rely on this exact string,
//! so it is produced in one place ([`variant_file_name`]) and used by both
//! the string-based [`variant_path`] (URLs, markup) and the `Path`-based
//! [`variant_file`] (on-disk generation).
//!
//! ## Base Name Rules
//!
//! The base name is the file name up to its last `.`, except when that dot
//! is the first character:
//! - `photo.png` → `photo`
//! - `archive.tar.gz` → `archive.tar`
//! - `.hidden` → `.hidden`
//! - `README` → `README`
//!
//! Paths without a file name (`"/images/"`) are not rejected; they produce a
//! degenerate name such as `/images/_800w.webp`.

use crate::types::Format;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Build a variant file name from its parts: `<stem>_<width>w.<format>`.
pub fn variant_file_name(stem: &str, width: u32, format: &Format) -> String {
    format!("{}_{}w.{}", stem, width, format)
}

/// Check a width list: non-empty, every entry positive.
pub fn validate_widths(widths: &[u32]) -> Result<(), NamingError> {
    if widths.is_empty() {
        return Err(NamingError::InvalidInput(
            "at least one width is required".into(),
        ));
    }
    widths.iter().try_for_each(|&w| check_width(w))
}

fn check_width(width: u32) -> Result<(), NamingError> {
    if width == 0 {
        return Err(NamingError::InvalidInput(
            "widths must be positive integers".into(),
        ));
    }
    Ok(())
}

/// Strip the extension from a file name (see the module docs for the rules).
fn base_name(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(0) | None => file_name,
        Some(dot) => &file_name[..dot],
    }
}

/// Derive the variant path for `original` at `width` in `format`.
///
/// The directory part (everything up to the last `/`) is kept verbatim.
pub fn variant_path(original: &str, width: u32, format: &Format) -> Result<String, NamingError> {
    check_width(width)?;
    let (dir, file_name) = match original.rfind('/') {
        Some(slash) => original.split_at(slash + 1),
        None => ("", original),
    };
    Ok(format!(
        "{}{}",
        dir,
        variant_file_name(base_name(file_name), width, format)
    ))
}

/// Same convention as [`variant_path`], for filesystem paths.
pub fn variant_file(source: &Path, width: u32, format: &Format) -> Result<PathBuf, NamingError> {
    check_width(width)?;
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(source.with_file_name(variant_file_name(&stem, width, format)))
}

/// Build a `srcset` attribute value: one `"<variant_path> <width>w"` token per
/// width, joined with `", "`, in the order given. Duplicates are kept.
///
/// An empty width list is rejected rather than producing an empty attribute.
pub fn srcset(original: &str, widths: &[u32], format: &Format) -> Result<String, NamingError> {
    validate_widths(widths)?;
    let tokens = widths
        .iter()
        .map(|&w| variant_path(original, w, format).map(|path| format!("{} {}w", path, w)))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(tokens.join(", "))
}

/// A file name recognized as following the variant convention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedVariant {
    /// Base name of the source the variant was derived from.
    pub base: String,
    pub width: u32,
    pub format: Format,
}

/// Recognize `<base>_<width>w.<format>` file names.
///
/// - `"photo_800w.webp"` → base="photo", width=800, format=webp
/// - `"my_photo_400w.avif"` → base="my_photo", width=400, format=avif
/// - `"photo_w.webp"`, `"photo_0w.webp"`, `"photo_800w.txt"`, `"photo.webp"` → `None`
pub fn parse_variant_name(file_name: &str) -> Option<ParsedVariant> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    let format = Format::new(ext).ok()?;
    let (base, suffix) = stem.rsplit_once('_')?;
    let digits = suffix.strip_suffix('w')?;
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let width = digits.parse::<u32>().ok().filter(|&w| w > 0)?;
    Some(ParsedVariant {
        base: base.to_string(),
        width,
        format,
    })
}

/// Infix marking a converter's in-progress output.
const STAGING_MARKER: &str = ".tmp-";

/// Temporary sibling of `output` for a converter to write into:
/// `photo_800w.webp` → `photo_800w.tmp-<tag>.webp`.
///
/// The extension is kept so converters that pick the encoder from it still
/// produce the right format.
pub fn staging_file(output: &Path, tag: u32) -> PathBuf {
    let name = output
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let staged = match name.rfind('.') {
        Some(dot) if dot > 0 => format!(
            "{}{}{}{}",
            &name[..dot],
            STAGING_MARKER,
            tag,
            &name[dot..]
        ),
        _ => format!("{}{}{}", name, STAGING_MARKER, tag),
    };
    output.with_file_name(staged)
}

/// The final file name a staging file stands for, or `None` if `file_name`
/// is not a staging file.
pub fn staged_target_name(file_name: &str) -> Option<String> {
    let start = file_name.rfind(STAGING_MARKER)?;
    let rest = &file_name[start + STAGING_MARKER.len()..];
    let tag_end = rest.find('.').unwrap_or(rest.len());
    let tag = &rest[..tag_end];
    if tag.is_empty() || !tag.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(format!("{}{}", &file_name[..start], &rest[tag_end..]))
}
