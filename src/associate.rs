use float_ord::FloatOrd;
use geo::{EuclideanDistance, Point};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{Region, TextSpan};

/// Per-region outcome of the association pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Assignment<'a> {
    Matched(&'a TextSpan),
    Unmatched,
}

impl<'a> Assignment<'a> {
    pub fn text(&self) -> &'a str {
        match self {
            Assignment::Matched(span) => span.text.as_str(),
            Assignment::Unmatched => "",
        }
    }

    pub fn span(&self) -> Option<&'a TextSpan> {
        match self {
            Assignment::Matched(span) => Some(span),
            Assignment::Unmatched => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssociationStrategy {
    /// Every region independently takes its closest span; a span may label
    /// several regions.
    #[default]
    Nearest,
    /// Closest pairs first, each region and each span used at most once.
    Exclusive,
}

pub fn centroid_distance(region: &Region, span: &TextSpan) -> f64 {
    Point::from(region.centroid()).euclidean_distance(&Point::from(span.centroid()))
}

/// Largest centroid distance (exclusive) at which a span may still label `region`.
pub fn proximity_bound(region: &Region, factor: f64) -> f64 {
    factor * region.width.max(region.height) as f64
}

/// Pairs every region with at most one text span. The output has one entry
/// per region, in region order.
#[instrument(
    level = "debug",
    skip(regions, texts),
    fields(regions = regions.len(), texts = texts.len())
)]
pub fn associate<'r, 't>(
    regions: &'r [Region],
    texts: &'t [TextSpan],
    proximity_factor: f64,
    strategy: AssociationStrategy,
) -> Vec<(&'r Region, Assignment<'t>)> {
    match strategy {
        AssociationStrategy::Nearest => regions
            .iter()
            .map(|region| (region, nearest(region, texts, proximity_factor)))
            .collect(),
        AssociationStrategy::Exclusive => exclusive(regions, texts, proximity_factor),
    }
}

#[instrument(level = "trace", skip(texts))]
fn nearest<'t>(region: &Region, texts: &'t [TextSpan], proximity_factor: f64) -> Assignment<'t> {
    // min_by_key keeps the first of equal distances
    let Some((span, distance)) = texts
        .iter()
        .map(|span| (span, centroid_distance(region, span)))
        .min_by_key(|(_, distance)| FloatOrd(*distance))
    else {
        return Assignment::Unmatched;
    };

    let bound = proximity_bound(region, proximity_factor);
    if distance < bound {
        log::trace!("Region {} matched {:?} at {distance:.1}", region.id, span.text);
        Assignment::Matched(span)
    } else {
        log::trace!(
            "Region {} closest text {:?} at {distance:.1} is outside {bound:.1}",
            region.id,
            span.text
        );
        Assignment::Unmatched
    }
}

fn exclusive<'r, 't>(
    regions: &'r [Region],
    texts: &'t [TextSpan],
    proximity_factor: f64,
) -> Vec<(&'r Region, Assignment<'t>)> {
    let mut candidates = Vec::new();
    for (region_index, region) in regions.iter().enumerate() {
        let bound = proximity_bound(region, proximity_factor);
        for (text_index, span) in texts.iter().enumerate() {
            let distance = centroid_distance(region, span);
            if distance < bound {
                candidates.push((region_index, text_index, distance));
            }
        }
    }
    // Stable sort: equal distances stay in region-then-span order.
    candidates.sort_by_key(|(_, _, distance)| FloatOrd(*distance));

    let mut assignments: Vec<Assignment<'t>> = vec![Assignment::Unmatched; regions.len()];
    let mut claimed = vec![false; texts.len()];
    for (region_index, text_index, _) in candidates {
        if claimed[text_index] || assignments[region_index] != Assignment::Unmatched {
            continue;
        }
        claimed[text_index] = true;
        assignments[region_index] = Assignment::Matched(&texts[text_index]);
    }

    regions.iter().zip(assignments).collect()
}
