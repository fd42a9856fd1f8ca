use crate::sample::Pose2d;

/// Where a point lands when projected onto a line segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentProjection {
    /// Distance along the segment from `start`, clamped to `[0, length]`.
    pub distance_along: f64,
    pub length: f64,
    /// Squared distance from the point to the clamped projection.
    pub distance_squared: f64,
}

impl SegmentProjection {
    /// Fraction of the segment covered by the projection, 0 for a zero-length segment.
    pub fn fraction(&self) -> f64 {
        if self.length > 0.0 {
            self.distance_along / self.length
        } else {
            0.0
        }
    }
}

/// Projects `point` onto the segment `start -> end` without extrapolating past either end.
pub fn project_onto_segment(point: &Pose2d, start: &Pose2d, end: &Pose2d) -> SegmentProjection {
    let length = start.distance_to(end);
    let diff = [point.x - start.x, point.y - start.y];

    if length <= 0.0 {
        return SegmentProjection {
            distance_along: 0.0,
            length,
            distance_squared: diff[0] * diff[0] + diff[1] * diff[1],
        };
    }

    let direction = [(end.x - start.x) / length, (end.y - start.y) / length];
    let distance_along = (diff[0] * direction[0] + diff[1] * direction[1]).clamp(0.0, length);

    let nearest = [
        start.x + direction[0] * distance_along,
        start.y + direction[1] * distance_along,
    ];
    let dx = point.x - nearest[0];
    let dy = point.y - nearest[1];

    SegmentProjection {
        distance_along,
        length,
        distance_squared: dx * dx + dy * dy,
    }
}
