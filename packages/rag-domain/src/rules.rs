use rag_config::ExpansionRule;

#[derive(Debug, Clone)]
pub struct CompiledRule {
	pub name: String,
	any: Vec<String>,
	all: Vec<String>,
	pub expansion: String,
}
impl CompiledRule {
	fn matches(&self, lowered_query: &str) -> bool {
		let any_ok =
			self.any.is_empty() || self.any.iter().any(|keyword| lowered_query.contains(keyword));
		let all_ok = self.all.iter().all(|keyword| lowered_query.contains(keyword));

		any_ok && all_ok
	}
}

/// Keyword-triggered query expansions, built once from configuration and never mutated.
#[derive(Debug, Clone, Default)]
pub struct ExpansionRules {
	rules: Vec<CompiledRule>,
}
impl ExpansionRules {
	pub fn compile(rules: &[ExpansionRule]) -> Self {
		let rules = rules
			.iter()
			.filter(|rule| !rule.expansion.trim().is_empty())
			.filter(|rule| !(rule.any.is_empty() && rule.all.is_empty()))
			.map(|rule| CompiledRule {
				name: rule.name.clone(),
				any: rule.any.iter().map(|keyword| keyword.to_lowercase()).collect(),
				all: rule.all.iter().map(|keyword| keyword.to_lowercase()).collect(),
				expansion: rule.expansion.trim().to_string(),
			})
			.collect();

		Self { rules }
	}

	pub fn len(&self) -> usize {
		self.rules.len()
	}

	pub fn is_empty(&self) -> bool {
		self.rules.is_empty()
	}

	/// Rules that fire for `query`, in table order.
	pub fn matching<'a>(&'a self, query: &str) -> Vec<&'a CompiledRule> {
		let lowered = query.to_lowercase();

		self.rules.iter().filter(|rule| rule.matches(&lowered)).collect()
	}
}
