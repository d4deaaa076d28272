//! Heading continuity across the ±π discontinuity
//!
//! Headings reported by a positioning source are wrapped, so a subject
//! turning through north can jump from just under π to just over -π between
//! two fixes. Interpolating or rotating a marker across that jump spins it
//! the long way round. The history therefore stores *continuous* headings:
//! each new heading is expressed relative to the previous one by the
//! shortest angular difference, and the accumulated value may grow past ±π.

use std::f64::consts::{PI, TAU};

/// Map an angle into [0, 2π)
pub fn normalize_mod(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly 2π for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Fold an angular difference onto the short way round, into [-π, π]
pub fn shortest_delta(diff: f64) -> f64 {
    if diff.abs() <= PI {
        return diff;
    }
    (diff + PI).rem_euclid(TAU) - PI
}

/// Express a raw heading as a continuation of `previous`.
///
/// With no previous heading the raw value is taken as already continuous.
pub fn unwrap_heading(previous: Option<f64>, raw: f64) -> f64 {
    match previous {
        Some(prev) => prev + shortest_delta(raw - normalize_mod(prev)),
        None => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_mod_range() {
        assert_relative_eq!(normalize_mod(-PI / 2.0), 3.0 * PI / 2.0);
        assert_relative_eq!(normalize_mod(5.0 * PI), PI, epsilon = 1e-12);
        assert_eq!(normalize_mod(0.0), 0.0);
        assert!(normalize_mod(-1e-18) < TAU);
    }

    #[test]
    fn test_unwrap_crosses_south_the_short_way() {
        // 3.0 rad followed by -3.0 rad is a 0.28 rad turn, not a 6 rad one
        let heading = unwrap_heading(Some(3.0), -3.0);
        assert_relative_eq!(heading, 3.0 + (TAU - 6.0), epsilon = 1e-12);
        assert_relative_eq!(heading, 3.283, epsilon = 1e-3);
    }

    #[test]
    fn test_unwrap_small_turn_is_unchanged() {
        assert_relative_eq!(unwrap_heading(Some(0.5), 0.7), 0.7, epsilon = 1e-12);
        assert_relative_eq!(unwrap_heading(Some(0.5), 0.3), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_unwrap_keeps_accumulated_turns() {
        // two full clockwise laps already accumulated
        let prev = 2.0 * TAU + 0.1;
        let heading = unwrap_heading(Some(prev), 0.2);
        assert_relative_eq!(heading, prev + 0.1, epsilon = 1e-9);
    }

    #[test]
    fn test_unwrap_without_previous_uses_raw() {
        assert_eq!(unwrap_heading(None, -3.0), -3.0);
    }

    proptest! {
        #[test]
        fn prop_consecutive_headings_never_jump_more_than_pi(
            raw in proptest::collection::vec(-20.0f64..20.0, 1..64)
        ) {
            let mut previous: Option<f64> = None;
            for value in raw {
                let heading = unwrap_heading(previous, value);
                if let Some(prev) = previous {
                    prop_assert!((heading - prev).abs() <= PI + 1e-9);
                }
                previous = Some(heading);
            }
        }

        #[test]
        fn prop_unwrapped_heading_points_the_same_way(prev in -50.0f64..50.0, raw in -PI..PI) {
            let heading = unwrap_heading(Some(prev), raw);
            let direction_error = shortest_delta(normalize_mod(heading) - normalize_mod(raw));
            prop_assert!(direction_error.abs() < 1e-6);
        }
    }
}
