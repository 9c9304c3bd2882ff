use js_sys::Array;
use tracing::trace;
use wasm_bindgen::{closure::Closure, JsCast, UnwrapThrowExt};
use web_sys::{Element, HtmlElement, MutationObserver, MutationObserverInit, MutationRecord};

/// Cancellation token for a child-set observation started with [`watch`].
///
/// The underlying [***MutationObserver***](https://developer.mozilla.org/en-US/docs/Web/API/MutationObserver)
/// keeps delivering batches until [`cancel`](`ChildSetWatch::cancel`) is called or the token is dropped.
/// There is no implicit cancellation beyond that: if the watched parent is removed from the document,
/// the observation stays alive but silently inert, and cleaning it up remains the owner's job.
#[must_use = "dropping the token cancels the observation"]
pub struct ChildSetWatch {
	observer: MutationObserver,
	_callback: Closure<dyn FnMut(Array, MutationObserver)>,
}
impl ChildSetWatch {
	/// Permanently stops the observation. Later mutations produce no callbacks.
	pub fn cancel(&self) {
		self.observer.disconnect();
	}
}
impl Drop for ChildSetWatch {
	fn drop(&mut self) {
		self.observer.disconnect();
	}
}

/// Observes `parent`'s subtree and invokes `on_change` whenever the ordered set of descendants
/// matching `child_selector` actually changes, by identity and order.
///
/// Only structural ([***childList***](https://developer.mozilla.org/en-US/docs/Web/API/MutationRecord/type))
/// mutations are considered; attribute and character data churn never triggers a re-snapshot.
/// Batches whose re-snapshot equals the previous one are discarded without a callback, so a
/// re-render that ends up with the identical child sequence stays silent.
///
/// The callback runs before the new snapshot is stored: mutations caused downstream are compared
/// against the superseded snapshot, not a partially updated one.
pub fn watch<F: FnMut(&[HtmlElement]) + 'static>(parent: &Element, child_selector: &str, mut on_change: F) -> ChildSetWatch {
	let mut previous = matching_children(parent, child_selector);

	let callback = Closure::wrap(Box::new({
		let parent = parent.clone();
		let child_selector = child_selector.to_owned();
		move |records: Array, _observer: MutationObserver| {
			let structural = records.iter().any(|record| record.unchecked_into::<MutationRecord>().type_() == "childList");
			if !structural {
				return;
			}

			let current = matching_children(&parent, &child_selector);
			let unchanged = previous.len() == current.len() && previous.iter().zip(current.iter()).all(|(a, b)| a == b);
			if unchanged {
				trace!("Discarded batch without child set change ({} node(s) matching).", current.len());
				return;
			}

			// Invoke, then store.
			on_change(&current);
			previous = current;
		}
	}) as Box<dyn FnMut(Array, MutationObserver)>);

	let observer = MutationObserver::new(callback.as_ref().unchecked_ref()).expect_throw("carousel-flow: Failed to create `MutationObserver`.");
	let mut options = MutationObserverInit::new();
	options.child_list(true).subtree(true);
	observer.observe_with_options(parent, &options).expect_throw("carousel-flow: Failed to observe parent element.");

	ChildSetWatch { observer, _callback: callback }
}

pub(crate) fn matching_children(parent: &Element, selector: &str) -> Vec<HtmlElement> {
	let matches = parent.query_selector_all(selector).expect_throw("carousel-flow: Invalid child selector.");
	(0..matches.length()).filter_map(|i| matches.item(i)).filter_map(|node| node.dyn_into::<HtmlElement>().ok()).collect()
}
