use tracing::instrument;

use crate::{
    associate::{associate, Assignment},
    classify::Classifier,
    filter::{filter_regions, filter_texts},
    AssociatedComponent, DetectionOptions, OcrResult, Region, TextSpan, WidgetType,
};

/// The synchronous core: filters, association, classification and assembly
/// over one request's regions and OCR output. Holds no per-request state.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    options: DetectionOptions,
    classifier: Classifier,
}

impl Pipeline {
    pub fn new(options: DetectionOptions, classifier: Classifier) -> Self {
        Self {
            options,
            classifier,
        }
    }

    pub fn options(&self) -> &DetectionOptions {
        &self.options
    }

    #[instrument(level = "debug", skip_all, fields(regions = regions.len(), texts = texts.len()))]
    pub fn run(&self, regions: Vec<Region>, texts: Vec<OcrResult>) -> Vec<AssociatedComponent> {
        let DetectionOptions {
            min_width,
            min_height,
            min_area,
            min_confidence,
            min_text_side,
            ..
        } = self.options;
        let regions = filter_regions(regions, min_width, min_height, min_area);
        let spans = filter_texts(texts, min_confidence, min_text_side);
        log::debug!(
            "{} regions and {} text spans survived filtering",
            regions.len(),
            spans.len()
        );
        self.run_filtered(&regions, &spans)
    }

    /// Runs association and classification on already filtered input.
    #[instrument(level = "debug", skip_all)]
    pub fn run_filtered(
        &self,
        regions: &[Region],
        spans: &[TextSpan],
    ) -> Vec<AssociatedComponent> {
        let pairs = associate(
            regions,
            spans,
            self.options.proximity_factor,
            self.options.strategy,
        );
        let classified = pairs.into_iter().map(|(region, assignment)| {
            let widget = self.classifier.classify(region, assignment.text());
            (region, assignment, widget)
        });
        assemble(classified)
    }
}

/// Merges each region with its assignment and verdict, in input order.
pub fn assemble<'a, 't>(
    classified: impl IntoIterator<Item = (&'a Region, Assignment<'t>, WidgetType)>,
) -> Vec<AssociatedComponent> {
    classified
        .into_iter()
        .map(|(region, assignment, widget)| AssociatedComponent {
            id: region.id,
            widget,
            text: assignment.text().to_string(),
            x: region.x,
            y: region.y,
            width: region.width,
            height: region.height,
        })
        .collect()
}
