// posefuse_core/src/estimation/ekf_slam.rs

use std::collections::HashMap;

use nalgebra::{DMatrix, DVector, Matrix3};
use tracing::{debug, warn};

use crate::config::EkfSlamConfig;
use crate::error::EstimationError;
use crate::estimation::PoseEstimator;
use crate::mapping::Landmark;
use crate::messages::{RangeBearing, SlamSnapshot};
use crate::models::dynamics::{MotionModel, OdometryDelta, PlanarOdometryModel};
use crate::models::measurement::RangeBearingModel;
use crate::types::{Covariance, LandmarkId, Pose2D, State};
use crate::utils::angles::normalize_angle;
use crate::utils::linalg;

const ROBOT_DIM: usize = 3;

/// EKF-SLAM over a growing `[x, y, theta, l0x, l0y, ...]` state.
///
/// Landmarks are keyed by the caller's signature and only ever appended;
/// landmark `i` lives at state index `3 + 2i`.
#[derive(Debug, Clone)]
pub struct EkfSlamEngine {
    config: EkfSlamConfig,
    motion: PlanarOdometryModel,
    sensor_model: RangeBearingModel,
    state: State,
    covariance: Covariance,
    /// Slot order matches the state layout.
    landmarks: Vec<Landmark>,
    signatures: HashMap<LandmarkId, usize>,
    reference_pose: Option<Pose2D>,
}

impl EkfSlamEngine {
    pub fn new(config: EkfSlamConfig) -> Self {
        let motion = PlanarOdometryModel {
            noise_scale: config.motion_noise_scale,
        };
        let sensor_model =
            RangeBearingModel::new(config.range_noise, config.bearing_noise, config.min_range);
        let mut engine = Self {
            config,
            motion,
            sensor_model,
            state: DVector::zeros(ROBOT_DIM),
            covariance: DMatrix::zeros(ROBOT_DIM, ROBOT_DIM),
            landmarks: Vec::new(),
            signatures: HashMap::new(),
            reference_pose: None,
        };
        engine.reset();
        engine
    }

    // --- Accessors ---

    pub fn landmark_count(&self) -> usize {
        self.landmarks.len()
    }

    pub fn state_dim(&self) -> usize {
        self.state.len()
    }

    pub fn state_vector(&self) -> &State {
        &self.state
    }

    pub fn covariance(&self) -> &Covariance {
        &self.covariance
    }

    pub fn landmarks(&self) -> &[Landmark] {
        &self.landmarks
    }

    pub fn landmark(&self, id: LandmarkId) -> Option<&Landmark> {
        self.signatures.get(&id).and_then(|&slot| self.landmarks.get(slot))
    }

    /// Landmark at state slot `slot`, i.e. state index `3 + 2 * slot`.
    pub fn landmark_slot(&self, slot: usize) -> Result<&Landmark, EstimationError> {
        self.landmarks
            .get(slot)
            .ok_or(EstimationError::LandmarkSlotOutOfRange {
                slot,
                count: self.landmarks.len(),
            })
    }

    pub fn reference_pose(&self) -> Option<Pose2D> {
        self.reference_pose
    }

    /// Records the dead-reckoning pose for side-by-side reporting. It does
    /// not influence the filter.
    pub fn set_reference_pose(&mut self, pose: Pose2D) {
        self.reference_pose = Some(pose);
    }

    pub fn snapshot(&self) -> SlamSnapshot {
        SlamSnapshot {
            pose: self.pose(),
            landmarks: self.landmarks.clone(),
            state_dim: self.state_dim(),
            average_covariance: self.covariance.mean(),
            pose_covariance: self
                .covariance
                .fixed_view::<ROBOT_DIM, ROBOT_DIM>(0, 0)
                .into_owned(),
            reference_pose: self.reference_pose,
        }
    }

    // --- Filter Steps ---

    /// Propagates the robot by a body-frame increment.
    ///
    /// Only the robot block is propagated, as `F P Fᵀ + Q`. Robot-landmark
    /// cross terms are left as they are; every landmark variance is
    /// inflated by the drift factor.
    pub fn predict(&mut self, dx: f64, dy: f64, dtheta: f64) -> Result<SlamSnapshot, EstimationError> {
        let delta = OdometryDelta::new(dx, dy, dtheta);
        if !delta.is_finite() {
            return Err(EstimationError::NonFiniteInput("predict"));
        }

        let pose = self.pose();
        let n = self.state_dim();
        let f3: Matrix3<f64> = self.motion.calculate_jacobian(&pose, &delta);
        let q3: Matrix3<f64> = self.motion.process_noise(&delta);
        let f = DMatrix::from_column_slice(ROBOT_DIM, ROBOT_DIM, f3.as_slice());
        let q = DMatrix::from_column_slice(ROBOT_DIM, ROBOT_DIM, q3.as_slice());

        let p_rr = linalg::submatrix(&self.covariance, 0..ROBOT_DIM, 0..ROBOT_DIM)?;
        let f_p = linalg::multiply(&f, &p_rr)?;
        let p_rr = linalg::add(&linalg::multiply(&f_p, &linalg::transpose(&f))?, &q)?;

        // Nothing below can fail; commit.
        let next = self.motion.propagate(&pose, &delta);
        self.state[0] = next.x;
        self.state[1] = next.y;
        self.state[2] = next.theta;

        self.covariance
            .view_mut((0, 0), (ROBOT_DIM, ROBOT_DIM))
            .copy_from(&p_rr);
        for i in ROBOT_DIM..n {
            self.covariance[(i, i)] *= self.config.landmark_drift_factor;
        }

        Ok(self.snapshot())
    }

    /// Fuses a batch of range-bearing measurements, in order.
    ///
    /// Unseen signatures become new landmarks; known ones drive a standard
    /// EKF correction. Degenerate or non-finite measurements are logged and
    /// skipped without touching the state.
    pub fn update(&mut self, measurements: &[RangeBearing]) -> Result<SlamSnapshot, EstimationError> {
        for z in measurements {
            if !z.is_finite() {
                warn!(id = %z.id, "Skipping non-finite range-bearing measurement");
                continue;
            }
            if z.range < self.config.min_range {
                let err = EstimationError::DegenerateMeasurement {
                    id: z.id.0,
                    range: z.range,
                };
                warn!(error = %err, "Skipping measurement");
                continue;
            }

            match self.signatures.get(&z.id).copied() {
                None => self.add_landmark(z),
                Some(slot) => match self.correct(slot, z) {
                    Err(EstimationError::DegenerateMeasurement { id, range }) => {
                        warn!(id, range, "Landmark coincides with robot, skipping update");
                    }
                    other => other?,
                },
            }
        }
        Ok(self.snapshot())
    }

    fn add_landmark(&mut self, z: &RangeBearing) {
        let (lx, ly) = self.sensor_model.inverse_observation(&self.pose(), z);
        let slot = self.landmarks.len();
        let n = self.state_dim();
        let grown = n + 2;

        self.state.resize_vertically_mut(grown, 0.0);
        self.state[n] = lx;
        self.state[n + 1] = ly;

        // New rows and columns are zero: no cross-covariance with the robot.
        self.covariance.resize_mut(grown, grown, 0.0);
        self.covariance[(n, n)] = self.config.new_landmark_variance;
        self.covariance[(n + 1, n + 1)] = self.config.new_landmark_variance;

        self.landmarks.push(Landmark {
            id: z.id,
            x: lx,
            y: ly,
            observed_count: 1,
        });
        self.signatures.insert(z.id, slot);
        debug!(id = %z.id, slot, x = lx, y = ly, "Initialized landmark");
    }

    fn correct(&mut self, slot: usize, z: &RangeBearing) -> Result<(), EstimationError> {
        let n = self.state_dim();
        let col = ROBOT_DIM + 2 * slot;
        if col + 2 > n {
            return Err(EstimationError::LandmarkSlotOutOfRange {
                slot,
                count: self.landmarks.len(),
            });
        }
        let pose = self.pose();
        let landmark = (self.state[col], self.state[col + 1]);
        let degenerate = EstimationError::DegenerateMeasurement {
            id: z.id.0,
            range: z.range,
        };

        let z_pred = self
            .sensor_model
            .predict_measurement(&pose, landmark)
            .ok_or_else(|| degenerate.clone())?;
        let h = self
            .sensor_model
            .calculate_jacobian(&pose, landmark, slot, n)
            .ok_or(degenerate)?;
        let r = DMatrix::from_column_slice(2, 2, self.sensor_model.get_r().as_slice());

        // S = H P Hᵀ + R, K = P Hᵀ S⁻¹
        let p_ht = linalg::multiply(&self.covariance, &linalg::transpose(&h))?;
        let s = linalg::add(&linalg::multiply(&h, &p_ht)?, &r)?;
        let s_inv = linalg::invert2x2(&s)?;
        let k = linalg::multiply(&p_ht, &s_inv)?;

        let nu = self.sensor_model.innovation(z, &z_pred);
        let nu = DMatrix::from_column_slice(2, 1, nu.as_slice());
        let correction = linalg::multiply(&k, &nu)?;

        let i_kh = linalg::subtract(&linalg::identity(n), &linalg::multiply(&k, &h)?)?;
        let mut p = linalg::multiply(&i_kh, &self.covariance)?;
        linalg::symmetrize(&mut p)?;

        for i in 0..n {
            self.state[i] += correction[(i, 0)];
        }
        self.state[2] = normalize_angle(self.state[2]);
        self.covariance = p;

        self.refresh_landmarks();
        if let Some(lm) = self.landmarks.get_mut(slot) {
            lm.observed_count += 1;
        }
        Ok(())
    }

    /// Copies landmark positions back out of the state vector.
    fn refresh_landmarks(&mut self) {
        for (slot, lm) in self.landmarks.iter_mut().enumerate() {
            let col = ROBOT_DIM + 2 * slot;
            lm.x = self.state[col];
            lm.y = self.state[col + 1];
        }
    }
}

impl Default for EkfSlamEngine {
    fn default() -> Self {
        Self::new(EkfSlamConfig::default())
    }
}

impl PoseEstimator for EkfSlamEngine {
    fn pose(&self) -> Pose2D {
        Pose2D {
            x: self.state[0],
            y: self.state[1],
            theta: self.state[2],
        }
    }

    fn reset(&mut self) {
        self.state = DVector::zeros(ROBOT_DIM);
        self.covariance = DMatrix::from_diagonal_element(
            ROBOT_DIM,
            ROBOT_DIM,
            self.config.initial_pose_variance,
        );
        self.landmarks.clear();
        self.signatures.clear();
        self.reference_pose = None;
    }
}
