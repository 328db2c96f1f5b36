// posefuse_core/src/models/measurement/mod.rs

pub mod range_bearing;

pub use range_bearing::RangeBearingModel;
