use crate::error::ApiError;
use chrono::{DateTime, Duration, TimeZone};

/// Positive, whole-hour distance between two generated points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Step {
    hours: i64,
    duration: Duration,
}

impl Step {
    pub fn hours(hours: i64) -> Result<Self, ApiError> {
        if hours <= 0 {
            return Err(ApiError::InvalidStep(hours.to_string()));
        }
        let duration = Duration::try_hours(hours)
            .ok_or_else(|| ApiError::InvalidStep(hours.to_string()))?;
        Ok(Step { hours, duration })
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// ISO 8601 form, e.g. `PT1H`.
    pub fn name(&self) -> String {
        format!("PT{}H", self.hours)
    }
}

/// `from, from + step, from + 2*step, ...` while the point is `<= to + step`,
/// so the last point always lands at or after `to`. Empty when `from > to`.
#[derive(Debug, Clone)]
pub struct TimeSteps<T: TimeZone> {
    from: DateTime<T>,
    to: DateTime<T>,
    step: Step,
}

impl<T: TimeZone> TimeSteps<T> {
    pub fn new(from: DateTime<T>, to: DateTime<T>, step: Step) -> Self {
        TimeSteps { from, to, step }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    fn end(&self) -> DateTime<T> {
        self.to
            .clone()
            .checked_add_signed(self.step.duration())
            .unwrap_or_else(|| self.to.clone())
    }

    /// Number of points `iter()` yields, computed without walking the sequence.
    pub fn point_count(&self) -> u64 {
        if self.from > self.to {
            return 0;
        }
        let span = self.end().signed_duration_since(&self.from).num_seconds();
        let step = self.step.duration().num_seconds();
        u64::try_from(span / step).map_or(0, |n| n.saturating_add(1))
    }

    pub fn check_limit(&self, max: u64) -> Result<(), ApiError> {
        let count = self.point_count();
        if count > max {
            return Err(ApiError::TooManyPoints { count, max });
        }
        Ok(())
    }

    /// A fresh pass over the points; can be called any number of times.
    pub fn iter(&self) -> Iter<T> {
        let end = self.end();
        let next = if self.from <= self.to {
            Some(self.from.clone())
        } else {
            None
        };
        Iter {
            next,
            end,
            step: self.step.duration(),
        }
    }
}

impl<'a, T: TimeZone> IntoIterator for &'a TimeSteps<T> {
    type Item = DateTime<T>;
    type IntoIter = Iter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Iter<T: TimeZone> {
    next: Option<DateTime<T>>,
    end: DateTime<T>,
    step: Duration,
}

impl<T: TimeZone> Iterator for Iter<T> {
    type Item = DateTime<T>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next.take()?;
        if current > self.end {
            return None;
        }
        // Overflowing the representable range ends the sequence
        self.next = current.clone().checked_add_signed(self.step);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use chrono_tz::Europe::Madrid;

    fn at(raw: &str) -> DateTime<chrono_tz::Tz> {
        DateTime::parse_from_rfc3339(raw)
            .expect("valid timestamp")
            .with_timezone(&Madrid)
    }

    #[test]
    fn step_rejects_non_positive_hours() {
        assert!(matches!(Step::hours(0), Err(ApiError::InvalidStep(s)) if s == "0"));
        assert!(matches!(Step::hours(-3), Err(ApiError::InvalidStep(s)) if s == "-3"));
        assert!(Step::hours(i64::MAX).is_err());
    }

    #[test]
    fn step_name_is_iso_duration() {
        assert_eq!(Step::hours(1).expect("step").name(), "PT1H");
        assert_eq!(Step::hours(12).expect("step").name(), "PT12H");
    }

    #[test]
    fn includes_one_step_past_the_end() {
        let steps = TimeSteps::new(
            at("2023-01-01T00:00:00+01:00"),
            at("2023-01-01T02:00:00+01:00"),
            Step::hours(1).expect("step"),
        );
        let hours: Vec<u32> = steps.iter().map(|t| t.hour()).collect();
        assert_eq!(hours, vec![0, 1, 2, 3]);
    }

    #[test]
    fn first_is_from_last_is_at_or_after_to_and_spacing_is_exact() {
        let from = at("2023-03-10T05:30:00+01:00");
        let to = at("2023-03-12T01:00:00+01:00");
        let step = Step::hours(5).expect("step");
        let points: Vec<_> = TimeSteps::new(from.clone(), to.clone(), step).iter().collect();

        assert_eq!(points.first(), Some(&from));
        assert!(points.last().expect("non-empty") >= &to);
        for pair in points.windows(2) {
            assert_eq!(pair[1].signed_duration_since(&pair[0]), step.duration());
        }
    }

    #[test]
    fn equal_bounds_yield_two_points() {
        let t = at("2023-01-01T00:00:00+01:00");
        let steps = TimeSteps::new(t.clone(), t, Step::hours(1).expect("step"));
        assert_eq!(steps.iter().count(), 2);
    }

    #[test]
    fn reversed_range_is_empty() {
        let steps = TimeSteps::new(
            at("2023-01-01T02:00:00+01:00"),
            at("2023-01-01T01:30:00+01:00"),
            Step::hours(1).expect("step"),
        );
        assert_eq!(steps.iter().count(), 0);
    }

    #[test]
    fn iteration_is_restartable() {
        let steps = TimeSteps::new(
            at("2023-01-01T00:00:00+01:00"),
            at("2023-01-02T00:00:00+01:00"),
            Step::hours(6).expect("step"),
        );
        let first: Vec<_> = steps.iter().collect();
        let second: Vec<_> = (&steps).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
    }

    #[test]
    fn point_count_matches_iteration() {
        let cases = [
            ("2023-01-01T00:00:00+01:00", "2023-01-01T02:00:00+01:00", 1),
            ("2023-01-01T00:00:00+01:00", "2023-01-01T00:00:00+01:00", 1),
            ("2023-01-01T00:30:00+01:00", "2023-01-03T07:15:00+01:00", 5),
            ("2023-01-01T02:00:00+01:00", "2023-01-01T01:00:00+01:00", 1),
        ];
        for (from, to, hours) in cases {
            let steps = TimeSteps::new(at(from), at(to), Step::hours(hours).expect("step"));
            assert_eq!(
                steps.point_count(),
                steps.iter().count() as u64,
                "{} .. {} every {}h",
                from,
                to,
                hours
            );
        }
    }

    #[test]
    fn point_count_of_decades_is_not_walked() {
        let steps = TimeSteps::new(
            at("2000-01-01T00:00:00+01:00"),
            at("2030-01-01T00:00:00+01:00"),
            Step::hours(1).expect("step"),
        );
        // 10958 days, plus the start point and the trailing step
        assert_eq!(steps.point_count(), 10_958 * 24 + 2);
    }

    #[test]
    fn limit_is_inclusive() {
        let steps = TimeSteps::new(
            at("2023-01-01T00:00:00+01:00"),
            at("2023-01-01T02:00:00+01:00"),
            Step::hours(1).expect("step"),
        );
        assert!(steps.check_limit(4).is_ok());
        assert!(matches!(
            steps.check_limit(3),
            Err(ApiError::TooManyPoints { count: 4, max: 3 })
        ));
    }

    #[test]
    fn steps_are_absolute_across_dst_change() {
        // Madrid springs forward at 02:00 local on 2023-03-26
        let steps = TimeSteps::new(
            at("2023-03-26T00:00:00+01:00"),
            at("2023-03-26T03:00:00+02:00"),
            Step::hours(1).expect("step"),
        );
        let hours: Vec<u32> = steps.iter().map(|t| t.hour()).collect();
        assert_eq!(hours, vec![0, 1, 3, 4]);
    }
}
