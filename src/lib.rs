use std::path::{Path, PathBuf};

pub mod annotate;
pub mod associate;
pub mod classify;
pub mod config;
mod error;
pub mod filter;
pub mod ocr;
pub mod pipeline;
pub mod proposal;
mod result;

use associate::AssociationStrategy;
use classify::{Classifier, Keywords};
pub use error::{Error, Result};
use ocr::TextExtractor;
use pipeline::Pipeline;
use proposal::{ArtifactProposer, RegionProposer};
pub use result::*;
use serde::{Deserialize, Serialize};
use tracing::instrument;

#[derive(Default)]
pub struct UiDetectorBuilder {
    proposer: Option<Box<dyn RegionProposer>>,
    extractor: Option<Box<dyn TextExtractor>>,
    options: DetectionOptions,
    keywords: Keywords,
    classifier: Option<Classifier>,
}

impl UiDetectorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn proposer(mut self, proposer: impl RegionProposer + 'static) -> Self {
        self.proposer = Some(Box::new(proposer));
        self
    }

    /// Without an extractor every region is classified from geometry alone.
    pub fn extractor(mut self, extractor: impl TextExtractor + 'static) -> Self {
        self.extractor = Some(Box::new(extractor));
        self
    }

    pub fn options(mut self, options: DetectionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn strategy(mut self, strategy: AssociationStrategy) -> Self {
        self.options.strategy = strategy;
        self
    }

    pub fn keywords(mut self, keywords: Keywords) -> Self {
        self.keywords = keywords;
        self
    }

    /// Replaces the default rule table; takes precedence over [`Self::keywords`].
    pub fn classifier(mut self, classifier: Classifier) -> Self {
        self.classifier = Some(classifier);
        self
    }

    #[instrument(skip(self))]
    pub fn build(self) -> UiDetector {
        let proposer: Box<dyn RegionProposer> = match self.proposer {
            Some(proposer) => proposer,
            None => {
                let output_root = PathBuf::from("output");
                log::debug!(
                    "No region proposer given, reading artifacts from {}",
                    output_root.display()
                );
                Box::new(ArtifactProposer::new(output_root))
            }
        };
        let classifier = self
            .classifier
            .unwrap_or_else(|| Classifier::new(&self.keywords));
        UiDetector {
            proposer,
            extractor: self.extractor,
            pipeline: Pipeline::new(self.options, classifier),
        }
    }
}

pub struct UiDetector {
    proposer: Box<dyn RegionProposer>,
    extractor: Option<Box<dyn TextExtractor>>,
    pipeline: Pipeline,
}

impl UiDetector {
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    /// Detects the components of one screenshot. Any collaborator failure
    /// aborts the whole request; there are no partial results.
    #[instrument(skip(self))]
    pub fn detect(&self, image: &Path) -> Result<Vec<AssociatedComponent>> {
        let (width, height) = image::image_dimensions(image).map_err(|source| Error::Image {
            path: image.to_path_buf(),
            source,
        })?;
        log::debug!("Screenshot {} is {width}x{height}", image.display());

        let regions = self.proposer.propose(image)?;
        let texts = match &self.extractor {
            Some(extractor) => extractor.recognize(image)?,
            None => Vec::new(),
        };
        Ok(self.pipeline.run(regions, texts))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionOptions {
    pub min_width: i32,
    pub min_height: i32,
    pub min_area: i64,
    pub min_confidence: f32,
    /// Text boxes must be strictly larger than this on both axes.
    pub min_text_side: i32,
    /// Match bound as a multiple of the region's longer side.
    pub proximity_factor: f64,
    pub strategy: AssociationStrategy,
}

impl Default for DetectionOptions {
    fn default() -> Self {
        Self {
            min_width: 40,
            min_height: 20,
            min_area: 800,
            min_confidence: 0.5,
            min_text_side: 5,
            proximity_factor: 1.5,
            strategy: AssociationStrategy::Nearest,
        }
    }
}
