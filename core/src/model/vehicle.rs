use serde::Deserialize;

/// Planar point in millimetres; `y` is lateral, positive to the right.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn mirrored(self) -> Self {
        Self {
            x: self.x,
            y: -self.y,
        }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

/// Outline of the vehicle as four contours, stored in output winding order.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    front: Vec<Point>,
    left: Vec<Point>,
    right: Vec<Point>,
    back: Vec<Point>,
}

impl Profile {
    /// Builds the profile from measured front, right and back contours.
    ///
    /// The front contour is stored reversed and the back contour as measured.
    /// The left side is not measured: it is the right side mirrored about the
    /// longitudinal axis, in reverse order.
    pub fn from_authored(front: Vec<Point>, right: Vec<Point>, back: Vec<Point>) -> Self {
        let left = right.iter().rev().map(|p| p.mirrored()).collect();
        let front = front.into_iter().rev().collect();
        Self {
            front,
            left,
            right,
            back,
        }
    }

    pub fn front(&self) -> &[Point] {
        &self.front
    }

    pub fn left(&self) -> &[Point] {
        &self.left
    }

    pub fn right(&self) -> &[Point] {
        &self.right
    }

    pub fn back(&self) -> &[Point] {
        &self.back
    }
}

/// Overall vehicle geometry, already normalized to millimetres by the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleDimensions {
    pub length: f64,
    pub width: f64,
    pub front_overhang: Option<f64>,
    pub profile: Profile,
}

/// Identification of the vehicle under test.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VehicleInfo {
    pub year: String,
    pub number: String,
    pub oem: String,
    #[serde(default)]
    pub make: String,
    pub model: String,
    pub vin: String,
    pub sw_version: String,
}

impl VehicleInfo {
    /// Last two characters of the model year.
    pub fn short_year(&self) -> &str {
        let year = self.year.trim();
        let mut start = year.len();
        for (count, (idx, _)) in year.char_indices().rev().enumerate() {
            if count == 2 {
                break;
            }
            start = idx;
        }
        &year[start..]
    }

    /// `make model`, or just the model when no make is recorded.
    pub fn display_name(&self) -> String {
        if self.make.trim().is_empty() {
            self.model.clone()
        } else {
            format!("{} {}", self.make, self.model)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(f64, f64)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn left_side_is_right_side_mirrored_and_reversed() {
        let right = points(&[(0.0, 900.0), (1500.0, 910.0), (4200.0, 880.0)]);
        let profile = Profile::from_authored(Vec::new(), right, Vec::new());
        assert_eq!(
            profile.left(),
            points(&[(4200.0, -880.0), (1500.0, -910.0), (0.0, -900.0)]).as_slice()
        );
    }

    #[test]
    fn front_is_reversed_and_back_kept() {
        let front = points(&[(0.0, -800.0), (30.0, 0.0), (0.0, 800.0)]);
        let back = points(&[(4500.0, -700.0), (4520.0, 0.0), (4500.0, 700.0)]);
        let profile = Profile::from_authored(front, Vec::new(), back.clone());
        assert_eq!(
            profile.front(),
            points(&[(0.0, 800.0), (30.0, 0.0), (0.0, -800.0)]).as_slice()
        );
        assert_eq!(profile.back(), back.as_slice());
    }

    #[test]
    fn short_year_takes_last_two_characters() {
        let mut info = VehicleInfo {
            year: "2024".into(),
            number: "12345".into(),
            oem: "OEM1".into(),
            make: "Acme".into(),
            model: "X1".into(),
            vin: "VIN1".into(),
            sw_version: "1.0".into(),
        };
        assert_eq!(info.short_year(), "24");
        info.year = "7".into();
        assert_eq!(info.short_year(), "7");
        assert_eq!(info.display_name(), "Acme X1");
        info.make.clear();
        assert_eq!(info.display_name(), "X1");
    }
}
