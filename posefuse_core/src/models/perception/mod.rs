// posefuse_core/src/models/perception/mod.rs

pub mod landmark_sensor;

use crate::messages::RangeBearing;
use crate::types::Pose2D;
use dyn_clone::DynClone;
use std::fmt::Debug;

pub use landmark_sensor::SimulatedLandmarkSensor;

/// The contract for anything that turns a robot pose into landmark
/// observations for the SLAM engine.
///
/// The sensor owns association: every `RangeBearing` it returns must carry
/// the signature of the landmark it observed.
pub trait LandmarkSensor: DynClone + Debug + Send {
    /// Observes the landmarks visible from `pose`.
    fn observe(&mut self, pose: &Pose2D) -> Vec<RangeBearing>;

    /// Restores any internal state (such as a noise generator) to how it
    /// was at construction.
    fn reset(&mut self) {}

    /// Returns the maximum effective range of the sensor in meters.
    fn max_range(&self) -> f64;
}

// Make the trait object cloneable.
dyn_clone::clone_trait_object!(LandmarkSensor);
