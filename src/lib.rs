//! # Responsive Variants
//!
//! Resized image variants for the web, and the markup that points at them.
//! Variants are produced by an external converter (ImageMagick's `convert`
//! by default) and found again purely by file name.
//!
//! # The Naming Convention
//!
//! Everything hangs off one deterministic rule:
//!
//! ```text
//! <dir>/<basename>_<width>w.<format>
//!
//! /images/photo.png  @ 800, webp  →  /images/photo_800w.webp
//! ```
//!
//! Because the rule is pure, markup can be rendered without touching the
//! filesystem and batch generation can decide what is already done with a
//! single `exists()` check. There is no manifest and no cache file.
//!
//! # Two Halves
//!
//! ```text
//! Offline   generate photos/  →  photos/*_<w>w.<fmt>   (external converter)
//! Runtime   img / picture     →  <img srcset=…>        (pure strings)
//! ```
//!
//! The halves share nothing but [`naming`] and [`config`], so the markup side
//! is usable from any web framework without pulling in process management.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`naming`] | Variant path derivation, `srcset` building, and the inverse recognizer |
//! | [`types`] | Shared types: `Format`, `VariantDescriptor`, per-item `Failure`s |
//! | [`config`] | `variants.toml` loading over stock defaults, validation |
//! | [`scan`] | Source discovery: single file or recursive directory walk |
//! | [`imaging`] | External converter: argument templates and process execution |
//! | [`generate`] | Batch generation: plan, skip/force, parallel conversion, summary |
//! | [`markup`] | `<img>` and `<picture>` rendering with Maud |
//! | [`output`] | CLI progress and summary formatting |
//!
//! # Design Decisions
//!
//! ## Shell Out, Don't Decode
//!
//! Pixel work belongs to a dedicated tool. The crate never decodes an image;
//! it only builds command lines and classifies exit statuses. The converter
//! and its argument template are configuration, so `vips`, `magick` or a
//! wrapper script work as well as `convert`.
//!
//! ## Fail the Batch Only When Nothing Can Work
//!
//! A missing converter aborts before any file is touched, since every item
//! would fail the same way. Everything else (a missing source, a corrupt
//! image, a hung conversion) is recorded in the summary and the batch moves on.
//!
//! ## Idempotent Reruns
//!
//! An existing output is skipped unless `force` is set, so rerunning after
//! adding a few photos only converts the new ones. Directory discovery also
//! ignores files that are variants of a sibling source, which keeps reruns
//! from deriving variants of variants.

pub mod config;
pub mod generate;
pub mod imaging;
pub mod markup;
pub mod naming;
pub mod output;
pub mod scan;
pub mod types;

#[cfg(test)]
pub(crate) mod test_helpers;
