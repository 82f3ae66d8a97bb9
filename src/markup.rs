//! `<img>` and `<picture>` markup for generated variants.
//!
//! Pure functions from (source path, passthrough attributes, options, config)
//! to [Maud](https://maud.lambda.xyz/) markup. Nothing here touches the
//! filesystem: the markup references variants by naming convention, whether
//! or not they have been generated yet.
//!
//! ## Output
//!
//! ```text
//! img("/images/photo.png", [alt="Dawn"], widths=[400, 800])
//!   <img src="/images/photo.png"
//!        srcset="/images/photo_400w.webp 400w, /images/photo_800w.webp 800w"
//!        alt="Dawn">
//!
//! picture("/images/photo.png", [alt="Dawn"], formats=[avif, webp], widths=[400])
//!   <picture>
//!     <source type="image/avif" srcset="/images/photo_400w.avif 400w">
//!     <source type="image/webp" srcset="/images/photo_400w.webp 400w">
//!     <img src="/images/photo.png" srcset="/images/photo_400w.webp 400w" alt="Dawn">
//!   </picture>
//! ```
//!
//! The original path is kept as `src` so browsers without `srcset` support
//! still load an image. Passthrough `src`, `srcset` and `sizes` attributes are
//! ignored; the generated values always win. All values are HTML-escaped.

use crate::config::VariantConfig;
use crate::naming::{self, NamingError};
use crate::types::Format;
use maud::{Markup, PreEscaped, html};
use std::fmt::Write;

/// Attribute names the component generates itself.
const RESERVED: &[&str] = &["src", "srcset", "sizes"];

/// Ordered passthrough HTML attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push((name.into(), value.into()));
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(n, v)| (n.into(), v.into()))
                .collect(),
        )
    }
}

/// Options for [`img`]. `None` fields fall back to the config defaults.
#[derive(Debug, Clone, Default)]
pub struct ImgOptions {
    pub widths: Option<Vec<u32>>,
    pub format: Option<Format>,
    /// Value for the `sizes` attribute.
    pub sizes: Option<String>,
}

/// Options for [`picture`]. An empty `formats` list means "the config format".
#[derive(Debug, Clone, Default)]
pub struct PictureOptions {
    pub widths: Option<Vec<u32>>,
    /// One `<source>` per format, in this order. The last one also feeds the `<img>`.
    pub formats: Vec<Format>,
    pub sizes: Option<String>,
}

fn validate_attribute_name(name: &str) -> Result<(), NamingError> {
    let bad = name.is_empty()
        || name
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '"' | '\'' | '<' | '>' | '/' | '='));
    if bad {
        return Err(NamingError::InvalidInput(format!(
            "invalid attribute name `{name}`"
        )));
    }
    Ok(())
}

/// Escape a value for use inside a double-quoted attribute.
fn escape(value: &str) -> String {
    html! { (value) }.into_string()
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {}=\"{}\"", name, escape(value));
}

/// Render the `<img>` element. Maud cannot express attribute names chosen at
/// runtime, so the tag is assembled by hand from escaped parts.
fn render_img(
    src: &str,
    srcset: &str,
    sizes: Option<&str>,
    attrs: &Attributes,
) -> Result<Markup, NamingError> {
    let mut out = String::from("<img");
    push_attr(&mut out, "src", src);
    push_attr(&mut out, "srcset", srcset);
    if let Some(sizes) = sizes {
        push_attr(&mut out, "sizes", sizes);
    }
    for (name, value) in attrs.iter() {
        validate_attribute_name(name)?;
        if RESERVED.iter().any(|r| r.eq_ignore_ascii_case(name)) {
            tracing::debug!(attribute = name, "ignoring reserved passthrough attribute");
            continue;
        }
        push_attr(&mut out, name, value);
    }
    out.push('>');
    Ok(PreEscaped(out))
}

/// Render an `<img>` with a `srcset` of the variants of `src`.
pub fn img(
    src: &str,
    attrs: &Attributes,
    options: &ImgOptions,
    config: &VariantConfig,
) -> Result<Markup, NamingError> {
    let widths = options.widths.as_deref().unwrap_or(&config.widths);
    let format = options.format.as_ref().unwrap_or(&config.format);
    let srcset = naming::srcset(src, widths, format)?;
    render_img(src, &srcset, options.sizes.as_deref(), attrs)
}

/// Render a `<picture>` with one `<source>` per format and an `<img>` fallback.
pub fn picture(
    src: &str,
    attrs: &Attributes,
    options: &PictureOptions,
    config: &VariantConfig,
) -> Result<Markup, NamingError> {
    let widths = options.widths.as_deref().unwrap_or(&config.widths);
    let formats: &[Format] = if options.formats.is_empty() {
        std::slice::from_ref(&config.format)
    } else {
        &options.formats
    };

    let sources = formats
        .iter()
        .map(|format| Ok((format.mime_type(), naming::srcset(src, widths, format)?)))
        .collect::<Result<Vec<_>, NamingError>>()?;

    // `formats` is never empty here
    let fallback_srcset = sources.last().map(|(_, s)| s.as_str()).unwrap_or_default();
    let sizes = options.sizes.as_deref();
    let img = render_img(src, fallback_srcset, sizes, attrs)?;

    Ok(html! {
        picture {
            @for (mime, srcset) in &sources {
                source type=(mime) srcset=(srcset) sizes=[sizes];
            }
            (img)
        }
    })
}
