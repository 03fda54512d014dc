use crate::error::AppError;
use crate::model::WorkHourSegment;
use crate::storage::WorkHourRepository;
use time::{Date, Weekday};

/// Weekly template of named work windows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkCalendar {
    segments: Vec<WorkHourSegment>,
}

impl WorkCalendar {
    pub fn new(segments: Vec<WorkHourSegment>) -> Self {
        Self { segments }
    }

    pub fn load<S: WorkHourRepository>(store: &S) -> Result<Self, AppError> {
        Ok(Self::new(store.work_hours()?))
    }

    /// Segments configured for `weekday`, earliest first.
    pub fn segments_for(&self, weekday: Weekday) -> Vec<WorkHourSegment> {
        let day = weekday.number_days_from_sunday();
        let mut segments: Vec<_> = self
            .segments
            .iter()
            .filter(|segment| segment.day_of_week == day)
            .cloned()
            .collect();
        segments.sort_by_key(|segment| segment.start_time);
        segments
    }

    pub fn segments_on(&self, date: Date) -> Vec<WorkHourSegment> {
        self.segments_for(date.weekday())
    }

    pub fn is_working_day(&self, date: Date) -> bool {
        !self.segments_on(date).is_empty()
    }
}
