use crate::domain::ports::Clock;
use chrono::{DateTime, Local, NaiveDate, Utc};

/// Wall clock; "today" is taken in the deployment's local time zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one calendar day, used for `--as-of` runs and tests.
///
/// `now()` still advances so that audit timestamps stay ordered.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    today: NaiveDate,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
