//! Servo offset compensation for the three-servo plate.
//!
//! The servos sit at 0°, 120° and 240° around the plate. A calibration
//! offset on servo 1 moves the plate purely along X; offsets on servos 2
//! and 3 project onto both axes.

/// X contribution of servos 2 and 3 (cos 120° = cos 240°).
pub const X_TILT_SERVO2_3: f32 = -0.5;

/// Y contribution of servo 2 (sin 120°).
pub const Y_TILT_SERVO2: f32 = 0.866;

/// Y contribution of servo 3 (sin 240°).
pub const Y_TILT_SERVO3: f32 = -0.866;

/// Per-servo calibration offsets compensating for assembly tolerance.
///
/// Applied to [`Hat::set_angles`](crate::Hat::set_angles) only. Raw servo
/// positions are sent uncorrected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ServoOffsets {
    pub servo1: i8,
    pub servo2: i8,
    pub servo3: i8,
}

impl ServoOffsets {
    /// Offsets for servos 1, 2 and 3.
    pub const fn new(servo1: i8, servo2: i8, servo3: i8) -> Self {
        Self {
            servo1,
            servo2,
            servo3,
        }
    }

    /// Compensated plate angles for a desired `(x, y)` tilt in degrees.
    ///
    /// No clipping: the result may fall outside the signed-byte range the
    /// frame can carry.
    pub fn apply(&self, x: i8, y: i8) -> (f32, f32) {
        let so1 = f32::from(self.servo1);
        let so2 = f32::from(self.servo2);
        let so3 = f32::from(self.servo3);

        let x = f32::from(x) + so1 + X_TILT_SERVO2_3 * so2 + X_TILT_SERVO2_3 * so3;
        let y = f32::from(y) + Y_TILT_SERVO2 * so2 + Y_TILT_SERVO3 * so3;
        (x, y)
    }

    /// The two payload values of a `SET_PLATE_ANGLES` frame.
    ///
    /// Fractions are truncated toward zero and the integer is written as a
    /// two's-complement byte, so values outside `[-128, 127]` wrap.
    pub fn plate_payload(&self, x: i8, y: i8) -> [i8; 2] {
        let (x, y) = self.apply(x, y);
        [wrap_to_i8(x), wrap_to_i8(y)]
    }
}

fn wrap_to_i8(value: f32) -> i8 {
    // `as i32` truncates toward zero; `as i8` keeps the low byte.
    value as i32 as i8
}
