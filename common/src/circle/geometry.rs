use primitive_types::U256;
use serde::{Deserialize, Serialize};

use super::{CandidateRejection, CircleError};
use crate::config::{defaults, max_coordinate};
use crate::utils::abs_diff;

/// An accepted (or candidate) circle. All fields use ledger width.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Circle {
    pub x: U256,
    pub y: U256,
    pub radius: U256,
}

impl Circle {
    pub fn new(x: U256, y: U256, radius: U256) -> Self {
        Self { x, y, radius }
    }

    pub fn from_u64(x: u64, y: u64, radius: u64) -> Self {
        Self::new(U256::from(x), U256::from(y), U256::from(radius))
    }

    /// True when the covered discs intersect. Touching discs do not overlap.
    ///
    /// Callers must have checked the fields against `MAX_COORDINATE`
    /// (bounds check or snapshot validation) so the squares cannot overflow.
    pub fn overlaps(&self, other: &Circle) -> bool {
        let dx = abs_diff(&self.x, &other.x);
        let dy = abs_diff(&self.y, &other.y);
        let reach = self.radius + other.radius;
        dx * dx + dy * dy < reach * reach
    }

    pub(crate) fn within_range(&self) -> bool {
        let max = max_coordinate();
        self.x <= max && self.y <= max && self.radius <= max
    }
}

/// Area and radius range of a circle problem (inclusive bounds).
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProblemConfig {
    pub min_x: U256,
    pub max_x: U256,
    pub min_y: U256,
    pub max_y: U256,
    pub min_radius: U256,
    pub max_radius: U256,
}

impl Default for ProblemConfig {
    fn default() -> Self {
        Self {
            min_x: U256::from(defaults::MIN_X),
            max_x: U256::from(defaults::MAX_X),
            min_y: U256::from(defaults::MIN_Y),
            max_y: U256::from(defaults::MAX_Y),
            min_radius: U256::from(defaults::MIN_RADIUS),
            max_radius: U256::from(defaults::MAX_RADIUS),
        }
    }
}

impl ProblemConfig {
    /// Square area `[0, size] x [0, size]`
    pub fn square(size: u64, min_radius: u64, max_radius: u64) -> Self {
        Self {
            min_x: U256::zero(),
            max_x: U256::from(size),
            min_y: U256::zero(),
            max_y: U256::from(size),
            min_radius: U256::from(min_radius),
            max_radius: U256::from(max_radius),
        }
    }

    pub fn validate(&self) -> Result<(), CircleError> {
        let max = max_coordinate();
        let fields = [
            ("min_x", self.min_x),
            ("max_x", self.max_x),
            ("min_y", self.min_y),
            ("max_y", self.max_y),
            ("min_radius", self.min_radius),
            ("max_radius", self.max_radius),
        ];
        for (name, value) in fields {
            if value > max {
                return Err(CircleError::InvalidConfig(format!(
                    "{name} exceeds the maximum coordinate"
                )));
            }
        }

        if self.min_x >= self.max_x || self.min_y >= self.max_y {
            return Err(CircleError::InvalidConfig("empty area".to_string()));
        }
        if self.min_radius > self.max_radius {
            return Err(CircleError::InvalidConfig(
                "min_radius is greater than max_radius".to_string(),
            ));
        }

        let narrowest = std::cmp::min(self.max_x - self.min_x, self.max_y - self.min_y);
        if self.max_radius * U256::from(2u8) > narrowest {
            return Err(CircleError::InvalidConfig(
                "max_radius does not fit inside the area".to_string(),
            ));
        }
        Ok(())
    }

    // Number of distinct values each candidate field can take.
    // Never zero once `validate` has passed.
    pub(crate) fn span_x(&self) -> U256 {
        self.max_x - self.min_x + U256::one()
    }

    pub(crate) fn span_y(&self) -> U256 {
        self.max_y - self.min_y + U256::one()
    }

    pub(crate) fn span_radius(&self) -> U256 {
        self.max_radius - self.min_radius + U256::one()
    }

    /// Bounds and minimum radius only, no overlap.
    pub fn check_placement(&self, circle: &Circle) -> Result<(), CandidateRejection> {
        let r = circle.radius;
        let inside = |value: U256, min: U256, max: U256| {
            let low = match min.checked_add(r) {
                Some(low) => low,
                None => return false,
            };
            let high = match value.checked_add(r) {
                Some(high) => high,
                None => return false,
            };
            value >= low && high <= max
        };

        if !inside(circle.x, self.min_x, self.max_x) || !inside(circle.y, self.min_y, self.max_y) {
            return Err(CandidateRejection::OutOfBounds);
        }
        if r < self.min_radius {
            return Err(CandidateRejection::RadiusBelowMinimum);
        }
        Ok(())
    }
}

/// The acceptance predicate shared by the simulator and the contract.
///
/// Checked in order: bounds, minimum radius, overlap with each accepted
/// circle (first overlapping index is reported).
pub fn check_candidate(
    config: &ProblemConfig,
    accepted: &[Circle],
    candidate: &Circle,
) -> Result<(), CandidateRejection> {
    config.check_placement(candidate)?;
    if let Some(index) = accepted.iter().position(|c| c.overlaps(candidate)) {
        return Err(CandidateRejection::Overlaps { index });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ProblemConfig {
        ProblemConfig::square(1000, 10, 100)
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(ProblemConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_configs() {
        let mut cfg = config();
        cfg.max_x = cfg.min_x;
        assert!(matches!(cfg.validate(), Err(CircleError::InvalidConfig(_))));

        let mut cfg = config();
        cfg.min_radius = U256::from(200u64);
        assert!(cfg.validate().is_err());

        // 2 * 600 does not fit in 1000
        let cfg = ProblemConfig::square(1000, 10, 600);
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.max_y = U256::MAX;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_bounds() {
        let cfg = config();
        assert_eq!(check_candidate(&cfg, &[], &Circle::from_u64(10, 10, 10)), Ok(()));
        assert_eq!(check_candidate(&cfg, &[], &Circle::from_u64(990, 990, 10)), Ok(()));
        assert_eq!(
            check_candidate(&cfg, &[], &Circle::from_u64(9, 500, 10)),
            Err(CandidateRejection::OutOfBounds)
        );
        assert_eq!(
            check_candidate(&cfg, &[], &Circle::from_u64(500, 991, 10)),
            Err(CandidateRejection::OutOfBounds)
        );
    }

    #[test]
    fn test_bounds_overflow_is_out_of_bounds() {
        let cfg = config();
        let huge = Circle::new(U256::MAX, U256::from(500u64), U256::from(10u64));
        assert_eq!(check_candidate(&cfg, &[], &huge), Err(CandidateRejection::OutOfBounds));
        let huge_radius = Circle::new(U256::from(500u64), U256::from(500u64), U256::MAX);
        assert_eq!(
            check_candidate(&cfg, &[], &huge_radius),
            Err(CandidateRejection::OutOfBounds)
        );
    }

    #[test]
    fn test_bounds_checked_before_radius() {
        let cfg = config();
        assert_eq!(
            check_candidate(&cfg, &[], &Circle::from_u64(2, 500, 5)),
            Err(CandidateRejection::OutOfBounds)
        );
        assert_eq!(
            check_candidate(&cfg, &[], &Circle::from_u64(500, 500, 5)),
            Err(CandidateRejection::RadiusBelowMinimum)
        );
    }

    #[test]
    fn test_touching_circles_are_accepted() {
        let cfg = config();
        let accepted = [Circle::from_u64(100, 100, 30)];
        // 3-4-5 triangle: distance 50 == 30 + 20
        assert_eq!(check_candidate(&cfg, &accepted, &Circle::from_u64(130, 140, 20)), Ok(()));
        assert_eq!(
            check_candidate(&cfg, &accepted, &Circle::from_u64(130, 140, 21)),
            Err(CandidateRejection::Overlaps { index: 0 })
        );
    }

    #[test]
    fn test_first_overlapping_index_reported() {
        let cfg = config();
        let accepted = [
            Circle::from_u64(100, 100, 20),
            Circle::from_u64(500, 500, 20),
            Circle::from_u64(520, 500, 20),
        ];
        assert_eq!(
            check_candidate(&cfg, &accepted, &Circle::from_u64(510, 500, 15)),
            Err(CandidateRejection::Overlaps { index: 1 })
        );
    }

    #[test]
    fn test_overlap_is_symmetric() {
        let a = Circle::from_u64(100, 100, 30);
        let b = Circle::from_u64(120, 90, 15);
        assert!(a.overlaps(&b));
        assert!(b.overlaps(&a));
    }
}
