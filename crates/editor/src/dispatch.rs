/// Maximum corrective rounds run by a single dispatch.
pub const MAX_APPEND_ROUNDS: usize = 3;

/// Outcome of one dispatch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
	/// Corrective transactions applied after the dispatched one.
	pub corrective_rounds: usize,
	/// The last allowed round still produced a correction.
	pub reached_round_cap: bool,
}

impl DispatchReport {
	pub fn corrected(&self) -> bool {
		self.corrective_rounds > 0
	}
}
