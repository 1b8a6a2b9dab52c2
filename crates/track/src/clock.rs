use std::cell::Cell;
use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

/// Source of timestamps for edits that carry no explicit date.
pub trait Clock: fmt::Debug {
	fn now(&self) -> DateTime<Utc>;
}

/// Wall-clock time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
	fn now(&self) -> DateTime<Utc> {
		Utc::now()
	}
}

/// A clock that only moves when told to.
#[derive(Debug, Clone)]
pub struct FixedClock {
	now: Cell<DateTime<Utc>>,
}

impl FixedClock {
	pub fn new(now: DateTime<Utc>) -> Self {
		Self { now: Cell::new(now) }
	}

	pub fn set(&self, now: DateTime<Utc>) {
		self.now.set(now);
	}

	pub fn advance(&self, by: TimeDelta) {
		self.now.set(self.now.get() + by);
	}
}

impl Clock for FixedClock {
	fn now(&self) -> DateTime<Utc> {
		self.now.get()
	}
}
