use crate::geometry::Point;
use std::collections::VecDeque;
use std::time::Duration;
use tracing::trace;

/// A centroid sample with its session-relative timestamp.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimedPoint {
    pub point: Point,
    pub at: Duration,
}

/// Bounded, chronologically ordered history of hand positions.
///
/// Pushing beyond capacity evicts the oldest sample.
#[derive(Debug, Clone)]
pub struct Trail {
    samples: VecDeque<TimedPoint>,
    capacity: usize,
    evicted: u64,
}

impl Trail {
    /// Create a trail holding at most `capacity` samples.
    ///
    /// # Panics
    /// Panics when `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            panic!("Trail capacity must be greater than 0");
        }
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    pub fn push(&mut self, point: Point, at: Duration) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
            self.evicted += 1;
            trace!("Trail full, evicted oldest sample");
        }
        self.samples.push_back(TimedPoint { point, at });
    }

    pub fn latest(&self) -> Option<&TimedPoint> {
        self.samples.back()
    }

    /// The most recent `n` points, oldest first. Shorter when fewer exist.
    pub fn recent_points(&self, n: usize) -> Vec<Point> {
        let skip = self.samples.len().saturating_sub(n);
        self.samples.iter().skip(skip).map(|s| s.point).collect()
    }

    pub fn points(&self) -> impl Iterator<Item = &Point> + '_ {
        self.samples.iter().map(|s| &s.point)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of samples dropped because the trail was full
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Hand speed statistics. Display only; nothing depends on it for correctness.
#[derive(Debug, Clone)]
pub struct VelocityTracker {
    history: VecDeque<f64>,
    capacity: usize,
    max: f64,
}

impl VelocityTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            history: VecDeque::with_capacity(capacity.max(1)),
            capacity: capacity.max(1),
            max: 0.0,
        }
    }

    /// Record the speed between `previous` and `current`, in units per second.
    ///
    /// Returns `None` when the time delta is not positive.
    pub fn record(&mut self, previous: &TimedPoint, current: &TimedPoint) -> Option<f64> {
        let dt = current.at.checked_sub(previous.at)?.as_secs_f64();
        if dt <= 0.0 {
            return None;
        }

        let velocity = previous.point.distance(&current.point) / dt;
        if self.history.len() == self.capacity {
            self.history.pop_front();
        }
        self.history.push_back(velocity);
        if velocity > self.max {
            self.max = velocity;
        }
        Some(velocity)
    }

    pub fn current(&self) -> Option<f64> {
        self.history.back().copied()
    }

    pub fn max(&self) -> f64 {
        self.max
    }

    pub fn average(&self) -> Option<f64> {
        if self.history.is_empty() {
            None
        } else {
            Some(self.history.iter().sum::<f64>() / self.history.len() as f64)
        }
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn clear(&mut self) {
        self.history.clear();
        self.max = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_trail_evicts_oldest() {
        let mut trail = Trail::new(3);
        for i in 0..5 {
            trail.push(Point::new(i as f64, 0.0), ms(i * 10));
        }

        assert_eq!(trail.len(), 3);
        assert_eq!(trail.evicted(), 2);
        let xs: Vec<f64> = trail.points().map(|p| p.x).collect();
        assert_eq!(xs, vec![2.0, 3.0, 4.0]);
        assert_eq!(trail.latest().unwrap().at, ms(40));
    }

    #[test]
    fn test_recent_points_window() {
        let mut trail = Trail::new(10);
        for i in 0..6 {
            trail.push(Point::new(i as f64, i as f64), ms(i));
        }

        let recent = trail.recent_points(4);
        assert_eq!(recent.len(), 4);
        assert_eq!(recent[0], Point::new(2.0, 2.0));
        assert_eq!(recent[3], Point::new(5.0, 5.0));
        assert_eq!(trail.recent_points(100).len(), 6);
    }

    #[test]
    #[should_panic(expected = "Trail capacity must be greater than 0")]
    fn test_zero_capacity_rejected() {
        Trail::new(0);
    }

    #[test]
    fn test_velocity_history_bounded() {
        let mut tracker = VelocityTracker::new(2);
        let a = TimedPoint {
            point: Point::new(0.0, 0.0),
            at: ms(0),
        };
        let b = TimedPoint {
            point: Point::new(30.0, 40.0),
            at: ms(500),
        };
        let c = TimedPoint {
            point: Point::new(30.0, 50.0),
            at: ms(1000),
        };
        let d = TimedPoint {
            point: Point::new(30.0, 52.0),
            at: ms(1500),
        };

        assert_eq!(tracker.record(&a, &b), Some(100.0));
        assert_eq!(tracker.record(&b, &c), Some(20.0));
        assert_eq!(tracker.record(&c, &d), Some(4.0));

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.current(), Some(4.0));
        assert_eq!(tracker.max(), 100.0);
        assert_eq!(tracker.average(), Some(12.0));
    }

    #[test]
    fn test_velocity_ignores_non_positive_delta() {
        let mut tracker = VelocityTracker::new(5);
        let a = TimedPoint {
            point: Point::new(0.0, 0.0),
            at: ms(100),
        };
        let b = TimedPoint {
            point: Point::new(10.0, 0.0),
            at: ms(100),
        };
        assert_eq!(tracker.record(&a, &b), None);
        assert_eq!(tracker.record(&b, &a), None);
        assert!(tracker.is_empty());

        tracker.clear();
        assert_eq!(tracker.max(), 0.0);
    }
}
