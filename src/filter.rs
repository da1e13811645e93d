use geo::BoundingRect;
use tracing::instrument;

use crate::{OcrResult, Region, TextSpan};

/// Drops regions that are too small to be a widget. Order is preserved.
#[instrument(level = "debug", skip(regions), fields(count = regions.len()))]
pub fn filter_regions(
    regions: Vec<Region>,
    min_width: i32,
    min_height: i32,
    min_area: i64,
) -> Vec<Region> {
    regions
        .into_iter()
        .filter(|region| {
            let keep = region.width >= min_width
                && region.height >= min_height
                && region.area() >= min_area;
            if !keep {
                log::trace!("Dropping region {region:?} below size thresholds");
            }
            keep
        })
        .collect()
}

/// Converts raw OCR output into text spans, keeping only confident, non-blank
/// results whose box is larger than `min_side` on both axes.
#[instrument(level = "debug", skip(results), fields(count = results.len()))]
pub fn filter_texts(results: Vec<OcrResult>, min_confidence: f32, min_side: i32) -> Vec<TextSpan> {
    results
        .into_iter()
        .filter(|result| result.confidence >= min_confidence)
        .filter_map(|result| {
            let text = result.text.trim();
            if text.is_empty() {
                return None;
            }
            let rect = result.bounds.bounding_rect()?;
            let span = TextSpan {
                text: text.to_string(),
                x: rect.min().x.floor() as i32,
                y: rect.min().y.floor() as i32,
                width: rect.width().floor() as i32,
                height: rect.height().floor() as i32,
                confidence: result.confidence,
            };
            if span.width <= min_side || span.height <= min_side {
                log::trace!("Dropping text {:?}: box too small", span.text);
                return None;
            }
            Some(span)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use geo::{coord, LineString, Polygon};

    use super::*;

    fn region(id: u32, width: i32, height: i32) -> Region {
        Region {
            id,
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    fn quad(x: f64, y: f64, width: f64, height: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::new(vec![
                coord! { x: x, y: y },
                coord! { x: x + width, y: y },
                coord! { x: x + width, y: y + height },
                coord! { x: x, y: y + height },
            ]),
            vec![],
        )
    }

    fn ocr(text: &str, confidence: f32) -> OcrResult {
        OcrResult {
            bounds: quad(10.0, 10.0, 60.0, 20.0),
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn region_thresholds_are_inclusive() {
        let kept = filter_regions(vec![region(1, 40, 20)], 40, 20, 800);
        assert_eq!(kept, vec![region(1, 40, 20)]);
    }

    #[test]
    fn narrow_region_is_dropped() {
        assert!(filter_regions(vec![region(1, 39, 100)], 40, 20, 800).is_empty());
    }

    #[test]
    fn area_threshold_applies_independently() {
        // 41 x 19 and 45 x 17 clear both sides but not the area
        let kept = filter_regions(
            vec![region(1, 41, 19), region(2, 40, 20), region(3, 45, 17)],
            40,
            10,
            800,
        );
        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), vec![2]);
    }

    #[test]
    fn degenerate_regions_are_dropped() {
        let input = vec![region(1, -50, 30), region(2, 0, 0), region(3, -50, -30)];
        assert!(filter_regions(input, 40, 20, 800).is_empty());
    }

    #[test]
    fn order_is_preserved() {
        let input = vec![region(3, 100, 40), region(1, 10, 10), region(2, 60, 30)];
        let kept = filter_regions(input, 40, 20, 800);
        assert_eq!(kept.iter().map(|r| r.id).collect::<Vec<_>>(), vec![3, 2]);
    }

    #[test]
    fn confidence_boundary_is_inclusive() {
        let spans = filter_texts(vec![ocr("Half", 0.5), ocr("Less", 0.49)], 0.5, 5);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Half");
    }

    #[test]
    fn blank_text_is_dropped_and_text_is_trimmed() {
        let spans = filter_texts(vec![ocr("   ", 0.9), ocr("  Name \n", 0.9)], 0.5, 5);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "Name");
    }

    #[test]
    fn quad_becomes_axis_aligned_box() {
        let skewed = Polygon::new(
            LineString::new(vec![
                coord! { x: 12.0, y: 30.5 },
                coord! { x: 88.7, y: 28.0 },
                coord! { x: 90.2, y: 51.0 },
                coord! { x: 11.4, y: 53.9 },
            ]),
            vec![],
        );
        let spans = filter_texts(
            vec![OcrResult {
                bounds: skewed,
                text: "Email".to_string(),
                confidence: 0.8,
            }],
            0.5,
            5,
        );
        let span = &spans[0];
        assert_eq!((span.x, span.y), (11, 28));
        assert_eq!((span.width, span.height), (78, 25));
    }

    #[test]
    fn tiny_boxes_are_noise() {
        let dust = OcrResult {
            bounds: quad(0.0, 0.0, 5.0, 40.0),
            text: ".".to_string(),
            confidence: 0.99,
        };
        let flat = OcrResult {
            bounds: quad(0.0, 0.0, 40.0, 5.0),
            text: "__".to_string(),
            confidence: 0.99,
        };
        let ok = OcrResult {
            bounds: quad(0.0, 0.0, 6.0, 6.0),
            text: "x".to_string(),
            confidence: 0.99,
        };
        let spans = filter_texts(vec![dust, flat, ok], 0.5, 5);
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].text, "x");
    }
}
