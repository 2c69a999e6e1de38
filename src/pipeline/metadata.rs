//! Metadata extraction: page count, first-page geometry and content identity.
//!
//! The visible page area is what a viewer shows: the CropBox clipped to the
//! MediaBox, or the MediaBox alone when there is no usable CropBox. Both keys
//! are inheritable through the page tree, so lookups walk `/Parent` links.
//!
//! Parsing runs on the blocking pool; lopdf is synchronous and a large
//! document would otherwise stall a runtime worker.

use crate::config::InchPrecision;
use crate::error::PdfPressError;
use crate::identity::content_hash;
use crate::pipeline::input::looks_like_pdf;
use lopdf::{Document, Object, ObjectId};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Guard against cyclic `/Parent` chains in damaged files.
const MAX_TREE_DEPTH: usize = 64;

/// Derived, read-only facts about a PDF.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PdfMeta {
    /// Number of pages (always ≥ 1).
    pub page_count: u32,
    /// Length of the raw bytes.
    pub size_bytes: u64,
    /// Lowercase hex SHA-1 of the raw bytes.
    pub sha1: String,
    /// First page width in points.
    pub width: f64,
    /// First page height in points.
    pub height: f64,
    /// First page width in inches, e.g. `"8.5in"`.
    pub width_in: String,
    /// First page height in inches, e.g. `"11in"`.
    pub height_in: String,
}

impl PdfMeta {
    /// First-page dimensions, as consumed by the typesetting templates.
    pub fn geometry(&self) -> PageGeometry {
        PageGeometry {
            width: self.width,
            height: self.height,
            width_in: self.width_in.clone(),
            height_in: self.height_in.clone(),
        }
    }
}

/// Physical size of a page in points and formatted inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub width_in: String,
    pub height_in: String,
}

/// A PDF rectangle in user-space points, normalised so `x0 ≤ x1`, `y0 ≤ y1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub x0: f64,
    pub y0: f64,
    pub x1: f64,
    pub y1: f64,
}

impl BBox {
    pub fn new(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self {
            x0: ax.min(bx),
            y0: ay.min(by),
            x1: ax.max(bx),
            y1: ay.max(by),
        }
    }

    pub fn width(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn height(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Overlap of two boxes, or `None` when they do not overlap.
    pub fn intersect(&self, other: &BBox) -> Option<BBox> {
        let b = BBox {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        };
        (b.width() > 0.0 && b.height() > 0.0).then_some(b)
    }
}

/// Parses PDF bytes into a [`PdfMeta`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MetadataExtractor {
    precision: InchPrecision,
}

impl MetadataExtractor {
    pub fn new(precision: InchPrecision) -> Self {
        Self { precision }
    }

    /// Extract metadata on the blocking pool.
    pub async fn extract(&self, bytes: Arc<[u8]>) -> Result<PdfMeta, PdfPressError> {
        let this = *self;
        tokio::task::spawn_blocking(move || this.extract_blocking(&bytes))
            .await
            .map_err(|e| PdfPressError::Internal(format!("Metadata task panicked: {}", e)))?
    }

    /// Synchronous implementation of [`MetadataExtractor::extract`].
    pub fn extract_blocking(&self, bytes: &[u8]) -> Result<PdfMeta, PdfPressError> {
        if !looks_like_pdf(bytes) {
            let head: String = String::from_utf8_lossy(&bytes[..bytes.len().min(8)]).into();
            return Err(PdfPressError::UnreadablePdf {
                detail: format!("missing %PDF header (starts with {head:?})"),
            });
        }

        let doc = Document::load_mem(bytes).map_err(|e| PdfPressError::UnreadablePdf {
            detail: format!("failed to parse PDF: {e}"),
        })?;

        let pages = doc.get_pages();
        let first_page = match pages.values().next() {
            Some(&id) => id,
            None => {
                return Err(PdfPressError::UnreadablePdf {
                    detail: "document has no pages".into(),
                })
            }
        };

        let view = visible_box(&doc, first_page)?;
        let (width, height) = (view.width(), view.height());
        if !(width > 0.0 && height > 0.0) {
            return Err(PdfPressError::UnreadablePdf {
                detail: format!("degenerate page box {width}x{height}"),
            });
        }

        let meta = PdfMeta {
            page_count: pages.len() as u32,
            size_bytes: bytes.len() as u64,
            sha1: content_hash(bytes),
            width,
            height,
            width_in: self.precision.format_points(width),
            height_in: self.precision.format_points(height),
        };
        debug!(
            "PDF measured: {} pages, {}x{} pt, {} bytes",
            meta.page_count, meta.width, meta.height, meta.size_bytes
        );
        Ok(meta)
    }
}

/// The CropBox clipped to the MediaBox, falling back to the MediaBox.
fn visible_box(doc: &Document, page_id: ObjectId) -> Result<BBox, PdfPressError> {
    let media_obj = resolve_inherited(doc, page_id, b"MediaBox")?.ok_or_else(|| {
        PdfPressError::UnreadablePdf {
            detail: "MediaBox not found on first page or its ancestors".into(),
        }
    })?;
    let media = bbox_from_object(doc, media_obj)?;

    let crop = match resolve_inherited(doc, page_id, b"CropBox")? {
        Some(obj) => bbox_from_object(doc, obj).ok(),
        None => None,
    };

    Ok(crop.and_then(|c| c.intersect(&media)).unwrap_or(media))
}

/// Follow indirect references to the underlying object.
fn resolve<'a>(doc: &'a Document, mut obj: &'a Object) -> Result<&'a Object, PdfPressError> {
    for _ in 0..MAX_TREE_DEPTH {
        match obj {
            Object::Reference(id) => {
                obj = doc.get_object(*id).map_err(|e| PdfPressError::UnreadablePdf {
                    detail: format!("dangling reference {id:?}: {e}"),
                })?;
            }
            other => return Ok(other),
        }
    }
    Err(PdfPressError::UnreadablePdf {
        detail: "reference chain too deep".into(),
    })
}

/// Look up `key` on the page, walking up `/Parent` until found.
fn resolve_inherited<'a>(
    doc: &'a Document,
    page_id: ObjectId,
    key: &[u8],
) -> Result<Option<&'a Object>, PdfPressError> {
    let mut current = page_id;
    for _ in 0..MAX_TREE_DEPTH {
        let dict = doc
            .get_object(current)
            .and_then(|o| o.as_dict())
            .map_err(|e| PdfPressError::UnreadablePdf {
                detail: format!("bad page tree node {current:?}: {e}"),
            })?;

        if let Ok(value) = dict.get(key) {
            return Ok(Some(value));
        }

        match dict.get(b"Parent").and_then(|p| p.as_reference()) {
            Ok(parent) => current = parent,
            Err(_) => return Ok(None),
        }
    }
    Err(PdfPressError::UnreadablePdf {
        detail: "page tree too deep".into(),
    })
}

fn bbox_from_object(doc: &Document, obj: &Object) -> Result<BBox, PdfPressError> {
    let array = resolve(doc, obj)?
        .as_array()
        .map_err(|e| PdfPressError::UnreadablePdf {
            detail: format!("page box is not an array: {e}"),
        })?;
    if array.len() != 4 {
        return Err(PdfPressError::UnreadablePdf {
            detail: format!("expected 4-element page box, got {}", array.len()),
        });
    }
    let mut n = [0.0f64; 4];
    for (slot, item) in n.iter_mut().zip(array) {
        *slot = number(resolve(doc, item)?)?;
    }
    Ok(BBox::new(n[0], n[1], n[2], n[3]))
}

fn number(obj: &Object) -> Result<f64, PdfPressError> {
    match obj {
        Object::Integer(i) => Ok(*i as f64),
        Object::Real(f) => Ok(*f as f64),
        _ => Err(PdfPressError::UnreadablePdf {
            detail: format!("expected number in page box, got {obj:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::dictionary;

    /// Build a PDF whose pages all carry `media_box`, with an optional
    /// CropBox on the first page.
    fn make_pdf(page_count: usize, media_box: [i64; 4], crop_box: Option<[f32; 4]>) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id: ObjectId = doc.new_object_id();

        let mut kids: Vec<Object> = Vec::new();
        for i in 0..page_count {
            let mut page = dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => media_box.iter().map(|&v| v.into()).collect::<Vec<Object>>(),
            };
            if let (0, Some(crop)) = (i, crop_box) {
                page.set(
                    "CropBox",
                    crop.iter().map(|&v| Object::Real(v.into())).collect::<Vec<Object>>(),
                );
            }
            kids.push(doc.add_object(page).into());
        }

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => page_count as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).expect("failed to save test PDF");
        buf
    }

    #[test]
    fn letter_page_geometry() {
        let bytes = make_pdf(1, [0, 0, 612, 792], None);
        let meta = MetadataExtractor::default().extract_blocking(&bytes).unwrap();
        assert_eq!(meta.page_count, 1);
        assert_eq!(meta.width, 612.0);
        assert_eq!(meta.height, 792.0);
        assert_eq!(meta.width_in, "8.5in");
        assert_eq!(meta.height_in, "11in");
        assert_eq!(meta.size_bytes, bytes.len() as u64);
        assert_eq!(meta.sha1, content_hash(&bytes));
    }

    #[test]
    fn counts_every_page() {
        let bytes = make_pdf(7, [0, 0, 612, 792], None);
        let meta = MetadataExtractor::default().extract_blocking(&bytes).unwrap();
        assert_eq!(meta.page_count, 7);
    }

    #[test]
    fn crop_box_limits_visible_area() {
        let bytes = make_pdf(1, [0, 0, 612, 792], Some([36.0, 36.0, 576.0, 756.0]));
        let meta = MetadataExtractor::default().extract_blocking(&bytes).unwrap();
        assert_eq!(meta.width, 540.0);
        assert_eq!(meta.height, 720.0);
        assert_eq!(meta.width_in, "7.5in");
    }

    #[test]
    fn crop_box_is_clipped_to_media_box() {
        let bytes = make_pdf(1, [0, 0, 612, 792], Some([-100.0, 0.0, 1000.0, 792.0]));
        let meta = MetadataExtractor::default().extract_blocking(&bytes).unwrap();
        assert_eq!(meta.width, 612.0);
    }

    #[test]
    fn offset_and_flipped_media_box() {
        let bytes = make_pdf(1, [612, 892, 0, 100], None);
        let meta = MetadataExtractor::default().extract_blocking(&bytes).unwrap();
        assert_eq!(meta.width, 612.0);
        assert_eq!(meta.height, 792.0);
    }

    #[test]
    fn full_precision_policy() {
        let bytes = make_pdf(1, [0, 0, 595, 842], None);
        let meta = MetadataExtractor::new(InchPrecision::Full)
            .extract_blocking(&bytes)
            .unwrap();
        assert_eq!(meta.width_in, "8.263888888888889in");
    }

    #[test]
    fn degenerate_box_is_unreadable() {
        let bytes = make_pdf(1, [0, 0, 0, 792], None);
        let err = MetadataExtractor::default().extract_blocking(&bytes).unwrap_err();
        assert!(matches!(err, PdfPressError::UnreadablePdf { .. }));
    }

    #[test]
    fn zero_pages_is_unreadable() {
        let bytes = make_pdf(0, [0, 0, 612, 792], None);
        let err = MetadataExtractor::default().extract_blocking(&bytes).unwrap_err();
        assert!(matches!(err, PdfPressError::UnreadablePdf { .. }));
    }

    #[test]
    fn garbage_is_unreadable() {
        for bytes in [&b"<html>not a pdf</html>"[..], &b"%PDF-1.4\ngarbage"[..], &b""[..]] {
            let err = MetadataExtractor::default().extract_blocking(bytes).unwrap_err();
            assert!(matches!(err, PdfPressError::UnreadablePdf { .. }), "{err}");
        }
    }

    #[tokio::test]
    async fn async_extract_matches_blocking() {
        let bytes = make_pdf(2, [0, 0, 612, 792], None);
        let ex = MetadataExtractor::default();
        let a = ex.extract(Arc::from(bytes.clone())).await.unwrap();
        let b = ex.extract_blocking(&bytes).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn bbox_intersection() {
        let a = BBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BBox::new(5.0, 5.0, 20.0, 20.0);
        assert_eq!(a.intersect(&b), Some(BBox::new(5.0, 5.0, 10.0, 10.0)));
        assert_eq!(a.intersect(&BBox::new(11.0, 11.0, 12.0, 12.0)), None);
    }
}
