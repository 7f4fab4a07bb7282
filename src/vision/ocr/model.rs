// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! PaddleOCR pipeline: detection, orientation, recognition

use anyhow::Result;
use image::DynamicImage;
use std::time::Instant;
use tracing::{debug, info};

use super::classification::{AngleClassifier, LineOrientation};
use super::config::OcrEngineConfig;
use super::detection::{DetectionParams, OcrDetectionModel};
use super::preprocessing::{
    crop_text_region, preprocess_for_classification, preprocess_for_detection,
    preprocess_for_recognition, PreprocessInfo,
};
use super::recognition::OcrRecognitionModel;
use crate::vision::engine::{Detection, OcrEngine, RecognizeOptions};

/// PaddleOCR model for text extraction
///
/// Combines text detection, optional orientation classification and text
/// recognition. Runs on CPU only.
#[derive(Debug, Clone)]
pub struct PaddleOcrModel {
    detector: OcrDetectionModel,
    classifier: Option<AngleClassifier>,
    recognizer: OcrRecognitionModel,
    det_input_size: u32,
    rec_score_threshold: f32,
}

impl PaddleOcrModel {
    /// Load all PaddleOCR models described by `config`
    ///
    /// The classifier is only loaded when `use_angle_cls` is set, and is then
    /// required.
    pub async fn load(config: &OcrEngineConfig) -> Result<Self> {
        config
            .validate()
            .map_err(|e| anyhow::anyhow!("Invalid OCR engine configuration: {}", e))?;

        debug!("Loading PaddleOCR models from {}", config.model_dir.display());

        let detector = OcrDetectionModel::new(
            config.det_model_path(),
            DetectionParams {
                threshold: config.det_threshold,
                box_threshold: config.box_threshold,
                unclip_ratio: config.unclip_ratio,
            },
            config.intra_threads,
        )
        .await?;

        let classifier = if config.use_angle_cls {
            Some(
                AngleClassifier::new(
                    config.cls_model_path(),
                    config.cls_threshold,
                    config.intra_threads,
                )
                .await?,
            )
        } else {
            None
        };

        let recognizer = OcrRecognitionModel::new(
            config.rec_model_path(),
            config.dict_path(),
            config.intra_threads,
        )
        .await?;

        Ok(Self {
            detector,
            classifier,
            recognizer,
            det_input_size: config.det_input_size,
            rec_score_threshold: config.rec_score_threshold,
        })
    }

    pub fn has_classifier(&self) -> bool {
        self.classifier.is_some()
    }

    /// Process an image and extract text lines in reading order
    pub fn process(
        &self,
        image: &DynamicImage,
        options: RecognizeOptions,
    ) -> Result<Vec<Detection>> {
        let start = Instant::now();

        let input = preprocess_for_detection(image, self.det_input_size);
        let info = PreprocessInfo::new(image, self.det_input_size);
        let boxes = self.detector.detect(&input)?;

        let mut detections = Vec::with_capacity(boxes.len());
        for text_box in &boxes {
            let polygon = text_box.corners().map(|[x, y]| {
                let (ox, oy) = info.map_to_original(x, y);
                [ox, oy]
            });

            let Some(mut crop) = crop_text_region(image, &polygon) else {
                continue;
            };

            if options.classify_angle {
                if let Some(classifier) = &self.classifier {
                    let orientation = classifier.classify(&preprocess_for_classification(&crop))?;
                    if orientation.orientation == LineOrientation::Rotated180 {
                        crop = crop.rotate180();
                    }
                }
            }

            let recognized = self.recognizer.recognize(&preprocess_for_recognition(&crop))?;
            if recognized.is_empty() || recognized.confidence < self.rec_score_threshold {
                debug!(
                    "Dropping line {:?} ({:.3})",
                    recognized.text, recognized.confidence
                );
                continue;
            }

            detections.push(Detection::new(
                polygon,
                recognized.text,
                recognized.confidence,
            ));
        }

        info!(
            "PaddleOCR: {} boxes, {} lines, {}ms",
            boxes.len(),
            detections.len(),
            start.elapsed().as_millis()
        );

        Ok(detections)
    }
}

impl OcrEngine for PaddleOcrModel {
    fn name(&self) -> &'static str {
        "paddleocr"
    }

    fn recognize(
        &self,
        image: &DynamicImage,
        options: RecognizeOptions,
    ) -> Result<Vec<Detection>> {
        self.process(image, options)
    }
}
