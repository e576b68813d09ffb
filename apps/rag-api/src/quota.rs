use std::{
	collections::HashMap,
	sync::{Arc, Mutex, PoisonError},
	time::{Duration, Instant},
};

use rag_config::Quota;
use rag_service::{BoxFuture, Usage};

/// Keys tracked before expired windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Per-caller request allowance. `check` runs before the pipeline, `consume` after it.
pub trait QuotaGate
where
	Self: Send + Sync,
{
	fn check<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool>;

	fn consume<'a>(&'a self, key: &'a str, usage: &'a Usage) -> BoxFuture<'a, ()>;
}

pub fn from_config(cfg: &Quota) -> Arc<dyn QuotaGate> {
	if cfg.enabled {
		Arc::new(FixedWindow::new(cfg.max_requests, Duration::from_secs(cfg.window_secs)))
	} else {
		Arc::new(Unlimited)
	}
}

pub struct Unlimited;
impl QuotaGate for Unlimited {
	fn check<'a>(&'a self, _key: &'a str) -> BoxFuture<'a, bool> {
		Box::pin(async { true })
	}

	fn consume<'a>(&'a self, _key: &'a str, _usage: &'a Usage) -> BoxFuture<'a, ()> {
		Box::pin(async {})
	}
}

#[derive(Debug, Clone, Copy)]
struct Window {
	started: Instant,
	used: u32,
}

/// In-memory counter that allows `max_requests` per key in each `window`.
///
/// Concurrent requests from one key can all pass `check` before any of them consumes, so the
/// limit may be overshot by the number of in-flight requests.
pub struct FixedWindow {
	max_requests: u32,
	window: Duration,
	windows: Mutex<HashMap<String, Window>>,
}
impl FixedWindow {
	pub fn new(max_requests: u32, window: Duration) -> Self {
		Self { max_requests, window, windows: Mutex::new(HashMap::new()) }
	}

	fn allowed_at(&self, key: &str, now: Instant) -> bool {
		let windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

		match windows.get(key) {
			Some(window) if now.duration_since(window.started) < self.window =>
				window.used < self.max_requests,
			_ => self.max_requests > 0,
		}
	}

	fn consume_at(&self, key: &str, now: Instant) {
		let mut windows = self.windows.lock().unwrap_or_else(PoisonError::into_inner);

		if windows.len() >= SWEEP_THRESHOLD {
			windows.retain(|_, window| now.duration_since(window.started) < self.window);
		}

		let window = windows.entry(key.to_string()).or_insert(Window { started: now, used: 0 });

		if now.duration_since(window.started) >= self.window {
			*window = Window { started: now, used: 0 };
		}

		window.used = window.used.saturating_add(1);
	}
}
impl QuotaGate for FixedWindow {
	fn check<'a>(&'a self, key: &'a str) -> BoxFuture<'a, bool> {
		let allowed = self.allowed_at(key, Instant::now());

		Box::pin(async move { allowed })
	}

	fn consume<'a>(&'a self, key: &'a str, _usage: &'a Usage) -> BoxFuture<'a, ()> {
		self.consume_at(key, Instant::now());

		Box::pin(async {})
	}
}
