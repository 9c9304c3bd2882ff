use wasm_bindgen::{closure::Closure, JsCast, UnwrapThrowExt};
use web_sys::{AddEventListenerOptions, Event, EventTarget};

/// DOM event listeners attached during one carousel binding, revocable as a single unit.
///
/// Listeners are removed either through [`revoke`](`ListenerBundle::revoke`) or when the bundle is
/// dropped, whichever comes first; their closures are dropped with them.
pub struct ListenerBundle {
	entries: Vec<ListenerEntry>,
	options_cache: [Option<AddEventListenerOptions>; 2],
}

struct ListenerEntry {
	target: EventTarget,
	event_type: &'static str,
	closure: Closure<dyn FnMut(Event)>,
}

impl ListenerBundle {
	#[must_use]
	pub fn new() -> Self {
		Self {
			entries: Vec::new(),
			options_cache: [None, None],
		}
	}

	pub fn add(&mut self, target: &EventTarget, event_type: &'static str, passive: bool, handler: impl FnMut(Event) + 'static) {
		let closure = Closure::wrap(Box::new(handler) as Box<dyn FnMut(Event)>);
		target
			.add_event_listener_with_callback_and_add_event_listener_options(event_type, closure.as_ref().unchecked_ref(), Self::cached_options(&mut self.options_cache, passive))
			.expect_throw("carousel-flow: Failed to attach event listener.");
		self.entries.push(ListenerEntry {
			target: target.clone(),
			event_type,
			closure,
		});
	}

	fn cached_options(options_cache: &mut [Option<AddEventListenerOptions>; 2], passive: bool) -> &AddEventListenerOptions {
		let entry = &mut options_cache[usize::from(passive)];
		if entry.is_none() {
			let mut options = AddEventListenerOptions::new();
			options.passive(passive);
			*entry = Some(options);
		}
		entry.as_ref().unwrap_throw()
	}

	/// Detaches every listener in the bundle. Idempotent.
	pub fn revoke(&mut self) {
		for entry in self.entries.drain(..) {
			entry
				.target
				.remove_event_listener_with_callback(entry.event_type, entry.closure.as_ref().unchecked_ref())
				.expect_throw("carousel-flow: Failed to detach event listener.");
		}
	}
}
impl Default for ListenerBundle {
	fn default() -> Self {
		Self::new()
	}
}
impl Drop for ListenerBundle {
	fn drop(&mut self) {
		self.revoke();
	}
}
