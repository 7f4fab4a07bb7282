// Version information for the OCR gateway

/// Service name reported by the liveness endpoint
pub const SERVICE_NAME: &str = "OCR Gateway";

/// Full version string with feature description
pub const VERSION: &str = "v1.0.0-url-ocr-2025-11-04";

/// Semantic version number
pub const VERSION_NUMBER: &str = "1.0.0";

/// Major version number
pub const VERSION_MAJOR: u32 = 1;

/// Minor version number
pub const VERSION_MINOR: u32 = 0;

/// Patch version number
pub const VERSION_PATCH: u32 = 0;

/// Build date
pub const BUILD_DATE: &str = "2025-11-04";

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "ocr-url",
    "ocr-batch",
    "paddleocr-onnx",
    "angle-classification",
    "ordered-batch-fanout",
    "readiness-reporting",
];

/// Get formatted version string for logging
pub fn get_version_string() -> String {
    format!("{} {} ({})", SERVICE_NAME, VERSION_NUMBER, BUILD_DATE)
}
