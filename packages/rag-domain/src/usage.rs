use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
	pub prompt_tokens: u64,
	pub completion_tokens: u64,
	pub total_tokens: u64,
}
impl Usage {
	pub fn is_zero(&self) -> bool {
		self.total_tokens == 0 && self.prompt_tokens == 0 && self.completion_tokens == 0
	}
}
