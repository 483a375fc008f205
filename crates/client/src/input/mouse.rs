use crate::config::{AccelStyle, ClientConfig};

/// Second-stage multipliers applied while a mounted heavy weapon is in use,
/// replacing the squared sensitivity of the normal path so aiming stays
/// manageable.
const HEAVY_WEAPON_X_SCALE: f32 = 2.5;
const HEAVY_WEAPON_Y_SCALE: f32 = 2.0;

/// Double-buffered pointer delta accumulator. Motion events land in the write
/// buffer; sampling reads the completed buffer (or the average of both when
/// smoothing) and rotates. Tolerates events arriving on either side of the
/// frame's sample point.
#[derive(Debug, Default)]
pub struct MouseAccum {
    dx: [f32; 2],
    dy: [f32; 2],
    index: usize,
}

impl MouseAccum {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn motion(&mut self, dx: f32, dy: f32) {
        self.dx[self.index] += dx;
        self.dy[self.index] += dy;
    }

    /// Takes this frame's delta and rotates the buffers.
    pub fn take_frame_delta(&mut self, smooth: bool) -> (f32, f32) {
        let (mx, my) = if smooth {
            (
                (self.dx[0] + self.dx[1]) * 0.5,
                (self.dy[0] + self.dy[1]) * 0.5,
            )
        } else {
            (self.dx[self.index], self.dy[self.index])
        };

        self.index ^= 1;
        self.dx[self.index] = 0.0;
        self.dy[self.index] = 0.0;

        (mx, my)
    }
}

/// Applies the configured acceleration curve to a raw frame delta.
pub fn accelerate(
    mx: f32,
    my: f32,
    frame_msec: u32,
    config: &ClientConfig,
    heavy_weapon: bool,
) -> (f32, f32) {
    let frame_msec = frame_msec.max(1) as f32;

    if config.mouse_accel == 0.0 {
        return (mx * config.sensitivity, my * config.sensitivity);
    }

    match config.mouse_accel_style {
        AccelStyle::Legacy => {
            let rate = (mx * mx + my * my).sqrt() / frame_msec;
            let accel_sensitivity = config.sensitivity + rate * config.mouse_accel;

            let (mut mx, mut my) = (mx * accel_sensitivity, my * accel_sensitivity);
            if heavy_weapon {
                mx *= HEAVY_WEAPON_X_SCALE;
                my *= HEAVY_WEAPON_Y_SCALE;
            } else {
                mx *= accel_sensitivity;
                my *= accel_sensitivity;
            }

            if config.show_mouse_rate {
                log::debug!("rate: {rate}, accel sensitivity: {accel_sensitivity}");
            }
            (mx, my)
        }
        AccelStyle::Power => {
            // offset is the rate at which acceleration has doubled the
            // unaccelerated amplification; floored to keep the curve sane
            let offset = config
                .mouse_accel_offset
                .max(ClientConfig::MIN_ACCEL_OFFSET);

            let rate_x = mx.abs() / frame_msec;
            let rate_y = my.abs() / frame_msec;
            let power_x = (rate_x / offset).powf(config.mouse_accel);
            let power_y = (rate_y / offset).powf(config.mouse_accel);

            if config.show_mouse_rate {
                log::debug!(
                    "rate: ({rate_x}, {rate_y}), power: ({power_x}, {power_y})"
                );
            }
            (
                config.sensitivity * (mx + mx.signum() * power_x * offset),
                config.sensitivity * (my + my.signum() * power_y * offset),
            )
        }
    }
}
