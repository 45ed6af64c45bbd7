//! Reflectance decomposition
//!
//! The numerical core: radiometric preprocessing, checkerchart calibration,
//! diffuse/specular separation, normal estimation and alignment, and roughness.

mod alignment;
mod calibration;
mod gradient_set;
mod normals;
mod preprocess;
mod roughness;
mod separation;


pub use alignment::{
    AlignedNormals, CANONICAL_AXIS, NormalSum, align_average_normal, apply_rotation,
    cross_product_matrix, masked_normal_sum, rodrigues_rotation, rotation_to_canonical,
};
pub use calibration::{
    CalibrationRatios, CheckerchartCalibration, CheckerchartRecord, apply_calibration,
    calibrate_set, masked_max, scale_to_unit_range,
};
pub use gradient_set::{
    GRADIENT_CAPTURE_COUNT, GradientIlluminationSet, GradientSource, SpecularGradients,
};
pub use normals::{NormalEstimation, NormalMap, VIEW_DIRECTION, estimate_normals, normal_from_gradients};
pub use preprocess::{
    DEFAULT_GAMMA, apply_gamma_correction, clamp, remove_ambient_illumination,
    remove_gamma_correction, set_negative_pixels_to_zero,
};
pub use roughness::{LobeVariance, estimate_roughness, lobe_variance, roughness_from_variance};
pub use separation::{AlbedoMaps, separate_diffuse_specular};
