//! Corrected ground distance between two position samples.

use crate::models::position::Position;

/// WGS84 semi-major axis, meters.
const WGS84_A: f64 = 6_378_137.0;
/// WGS84 semi-minor axis, meters.
const WGS84_B: f64 = 6_356_752.314245;
/// WGS84 flattening.
const WGS84_F: f64 = 1.0 / 298.257223563;

const EARTH_RADIUS_M: f64 = 6_371_000.0;

const CONVERGENCE_EPSILON: f64 = 1e-12;
pub const MAX_ITERATIONS: u32 = 100;

pub const CORRECTION_FACTOR: f64 = 1.15;

/// Corrected ground distance in meters. Always finite and non-negative for
/// finite inputs.
pub fn distance_m(a: &Position, b: &Position) -> f64 {
    distance_with_limit(a, b, MAX_ITERATIONS)
}

pub fn distance_with_limit(a: &Position, b: &Position, max_iterations: u32) -> f64 {
    let raw = vincenty_m(a, b, max_iterations).unwrap_or_else(|| haversine_m(a, b));
    raw * CORRECTION_FACTOR
}

/// Uncorrected ellipsoidal distance, or `None` when `max_iterations` is
/// exhausted before λ settles.
pub fn vincenty_m(a: &Position, b: &Position, max_iterations: u32) -> Option<f64> {
    let l = (b.longitude - a.longitude).to_radians();
    let u1 = ((1.0 - WGS84_F) * a.latitude.to_radians().tan()).atan();
    let u2 = ((1.0 - WGS84_F) * b.latitude.to_radians().tan()).atan();
    let (sin_u1, cos_u1) = u1.sin_cos();
    let (sin_u2, cos_u2) = u2.sin_cos();

    let mut lambda = l;
    let mut iterations = 0;

    loop {
        let (sin_lambda, cos_lambda) = lambda.sin_cos();
        let cross = cos_u1 * sin_u2 - sin_u1 * cos_u2 * cos_lambda;
        let sin_sigma = ((cos_u2 * sin_lambda).powi(2) + cross.powi(2)).sqrt();

        if sin_sigma == 0.0 {
            return Some(0.0);
        }

        let cos_sigma = sin_u1 * sin_u2 + cos_u1 * cos_u2 * cos_lambda;
        let sigma = sin_sigma.atan2(cos_sigma);
        let sin_alpha = cos_u1 * cos_u2 * sin_lambda / sin_sigma;
        let cos_sq_alpha = 1.0 - sin_alpha * sin_alpha;

        let mut cos_2sigma_m = cos_sigma - 2.0 * sin_u1 * sin_u2 / cos_sq_alpha;
        // Both points on the equator: cos²α is zero.
        if cos_2sigma_m.is_nan() {
            cos_2sigma_m = 0.0;
        }

        let c = WGS84_F / 16.0 * cos_sq_alpha * (4.0 + WGS84_F * (4.0 - 3.0 * cos_sq_alpha));
        let previous = lambda;
        lambda = l
            + (1.0 - c)
                * WGS84_F
                * sin_alpha
                * (sigma
                    + c * sin_sigma
                        * (cos_2sigma_m + c * cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)));

        iterations += 1;
        let converged = (lambda - previous).abs() <= CONVERGENCE_EPSILON;
        if !converged && iterations >= max_iterations {
            return None;
        }
        if !converged {
            continue;
        }

        let u_sq = cos_sq_alpha * (WGS84_A * WGS84_A - WGS84_B * WGS84_B) / (WGS84_B * WGS84_B);
        let big_a = 1.0 + u_sq / 16384.0 * (4096.0 + u_sq * (-768.0 + u_sq * (320.0 - 175.0 * u_sq)));
        let big_b = u_sq / 1024.0 * (256.0 + u_sq * (-128.0 + u_sq * (74.0 - 47.0 * u_sq)));
        let delta_sigma = big_b
            * sin_sigma
            * (cos_2sigma_m
                + big_b / 4.0
                    * (cos_sigma * (-1.0 + 2.0 * cos_2sigma_m * cos_2sigma_m)
                        - big_b / 6.0
                            * cos_2sigma_m
                            * (-3.0 + 4.0 * sin_sigma * sin_sigma)
                            * (-3.0 + 4.0 * cos_2sigma_m * cos_2sigma_m)));

        return Some((WGS84_B * big_a * (sigma - delta_sigma)).max(0.0));
    }
}

/// Great-circle distance on a sphere, meters. Uncorrected.
pub fn haversine_m(a: &Position, b: &Position) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.sqrt().atan2((1.0 - haversine).sqrt());

    EARTH_RADIUS_M * central_angle
}
