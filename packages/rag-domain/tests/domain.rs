use rag_config::ExpansionRule;
use rag_domain::{
	conversation::{self, ConversationTurn, Role},
	identity, intent,
	rules::ExpansionRules,
	usage::Usage,
};

fn rule(name: &str, any: &[&str], all: &[&str], expansion: &str) -> ExpansionRule {
	ExpansionRule {
		name: name.to_string(),
		any: any.iter().map(|s| s.to_string()).collect(),
		all: all.iter().map(|s| s.to_string()).collect(),
		expansion: expansion.to_string(),
	}
}

#[test]
fn identity_ignores_case_punctuation_and_spacing() {
	let a = identity::content_identity("Kampus STMIK Tazkia, Bogor!", 200);
	let b = identity::content_identity("  kampus   stmik tazkia bogor ", 200);

	assert_eq!(a, b);
	assert_eq!(
		identity::normalize_for_identity("Hello,   World!\n\tAgain.", 200),
		"hello world again"
	);
}

#[test]
fn identity_only_hashes_the_prefix_window() {
	let shared = "a".repeat(200);
	let a = identity::content_identity(&format!("{shared} first tail"), 200);
	let b = identity::content_identity(&format!("{shared} second tail"), 200);

	assert_eq!(a, b);
	assert_eq!(identity::normalize_for_identity(&format!("{shared}xyz"), 200).chars().count(), 200);
	assert_ne!(a, identity::content_identity("different content", 200));
}

#[test]
fn identity_counts_characters_not_bytes() {
	let normalized = identity::normalize_for_identity("ééééé", 3);

	assert_eq!(normalized, "ééé");
}

#[test]
fn rules_fire_on_any_keyword() {
	let rules = ExpansionRules::compile(&[
		rule("location", &["lokasi", "di mana"], &[], "alamat kampus"),
		rule("program", &["jurusan"], &[], "daftar jurusan"),
	]);
	let fired = rules.matching("Di mana LOKASI kampus?");

	assert_eq!(fired.len(), 1);
	assert_eq!(fired[0].name, "location");
	assert_eq!(fired[0].expansion, "alamat kampus");
}

#[test]
fn co_occurrence_rules_need_every_keyword() {
	let scholarship = rule("scholarship", &[], &["beasiswa", "syarat"], "syarat beasiswa");
	let rules = ExpansionRules::compile(&[scholarship]);

	assert!(rules.matching("ada beasiswa?").is_empty());
	assert_eq!(rules.matching("apa syarat beasiswa prestasi").len(), 1);
}

#[test]
fn rules_keep_table_order() {
	let rules = ExpansionRules::compile(&[
		rule("second", &["biaya"], &[], "rincian biaya"),
		rule("first", &["jurusan"], &[], "daftar jurusan"),
	]);
	let names: Vec<&str> =
		rules.matching("biaya jurusan informatika").iter().map(|r| r.name.as_str()).collect();

	assert_eq!(names, vec!["second", "first"]);
}

#[test]
fn rules_without_keywords_are_dropped() {
	let rules = ExpansionRules::compile(&[rule("empty", &[], &[], "never")]);

	assert!(rules.is_empty());
}

#[test]
fn recent_turns_keeps_the_tail() {
	let history = vec![
		ConversationTurn::user("satu"),
		ConversationTurn::assistant("dua"),
		ConversationTurn::user("tiga"),
	];
	let recent = conversation::recent_turns(&history, 2);

	assert_eq!(recent.len(), 2);
	assert_eq!(recent[0].content, "dua");
	assert_eq!(conversation::recent_turns(&history, 10).len(), 3);
}

#[test]
fn turns_use_lowercase_roles_on_the_wire() {
	let turn: ConversationTurn =
		serde_json::from_value(serde_json::json!({ "role": "assistant", "content": "ok" }))
			.expect("Failed to decode turn.");

	assert_eq!(turn.role, Role::Assistant);
	assert_eq!(serde_json::to_value(Role::User).expect("Failed to encode role."), "user");
}

#[test]
fn referential_detection_is_case_insensitive() {
	let terms = vec!["tersebut".to_string()];

	assert!(intent::contains_referential_term("Syarat program TERSEBUT apa?", &terms));
	assert_eq!(
		intent::tokenize_words("Apa itu S1-Informatika?"),
		vec!["apa", "itu", "s1", "informatika"]
	);
}

#[test]
fn default_usage_is_zero() {
	assert!(Usage::default().is_zero());
	assert!(!Usage { prompt_tokens: 1, completion_tokens: 0, total_tokens: 1 }.is_zero());
}
