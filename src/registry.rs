use crate::{
	descriptor::RootDescriptor,
	embla::EmblaEngine,
	engine::{CarouselEngine, CarouselHandle},
	listeners::ListenerBundle,
	watch::{self, ChildSetWatch},
};
use js_sys::{Object, Reflect};
use std::{cell::RefCell, rc::Rc};
use tracing::{debug, error, instrument, trace};
use wasm_bindgen::{JsCast, JsValue, UnwrapThrowExt};
use web_sys::{CustomEvent, CustomEventInit, Element, HtmlElement};

/// Selects carousel root candidates.
pub const ROOT_SELECTOR: &str = "[data-carousel-parent]";
/// Selects the slide container inside a root.
pub const CONTAINER_SELECTOR: &str = "[data-carousel-container]";
/// Selects the slides inside a container.
pub const SLIDE_SELECTOR: &str = "[data-carousel-slide]";

const NEXT_SELECTOR: &str = "[data-carousel-next]";
const PREV_SELECTOR: &str = "[data-carousel-prev]";

const CMS_MARKER_SELECTOR: &str = "[fs-cmsfilter-element],[fs-cmsload-element],[fs-cmssort-element]";
const CMS_MARKER_ATTRIBUTES: &[&str] = &["fs-cmsfilter-element", "fs-cmsload-element", "fs-cmssort-element"];

/// Namespace prefix of re-dispatched lifecycle events (`embla:<event>`).
pub const EVENT_NAMESPACE: &str = "embla";
/// Class toggled on next/prev controls that cannot currently navigate.
pub const DISABLED_CLASS: &str = "is-disable";

const INSTANCE_EXPANDO: &str = "emblaApi";

const SWIPE_EVENTS: &[&str] = &["mousedown", "mousemove", "mouseup", "touchstart", "touchmove", "touchend"];
const NAV_STATE_EVENTS: &[&str] = &["init", "reInit", "select"];

/// Whether a root's children may be replaced asynchronously after initial load.
///
/// Decided once per root at discovery time, from the nearest ancestor-or-descendant element
/// carrying a CMS list plugin marker attribute whose value contains the token `"list"`.
pub enum Governance {
	Static,
	Governed(Element),
}

/// Applies carousels to root elements and tracks their lifecycle.
///
/// A registry owns the process-wide state the protocol needs: the set of active bindings (at most
/// one per root element) and the child-set watch registrations of CMS-governed roots. It is a
/// cheaply cloneable handle; clones share the same state, which is how watch callbacks re-enter
/// [`apply`](`CarouselRegistry::apply`).
///
/// The carousel engine is injected at construction, so independent registries (and stub engines)
/// can coexist. Use [`embla`](`CarouselRegistry::embla`) for the production engine.
#[derive(Clone)]
pub struct CarouselRegistry {
	inner: Rc<RegistryInner>,
}

struct RegistryInner {
	engine: Rc<dyn CarouselEngine>,
	active: RefCell<Vec<ActiveBinding>>,
	watches: RefCell<Vec<ChildSetWatch>>,
}

struct ActiveBinding {
	root: HtmlElement,
	handle: Rc<dyn CarouselHandle>,
	listeners: ListenerBundle,
}

impl CarouselRegistry {
	#[must_use]
	pub fn new(engine: Rc<dyn CarouselEngine>) -> Self {
		Self {
			inner: Rc::new(RegistryInner {
				engine,
				active: RefCell::new(Vec::new()),
				watches: RefCell::new(Vec::new()),
			}),
		}
	}

	#[must_use]
	pub fn embla() -> Self {
		Self::new(Rc::new(EmblaEngine))
	}

	/// Finds all carousel root candidates under `scope` (default: the whole document), in
	/// document order. Read fresh on each call; nothing is cached across calls.
	pub fn discover(scope: Option<&Element>) -> impl Iterator<Item = HtmlElement> {
		let matches = match scope {
			Some(scope) => scope.query_selector_all(ROOT_SELECTOR),
			None => web_sys::window()
				.expect_throw("carousel-flow: No window.")
				.document()
				.expect_throw("carousel-flow: No document.")
				.query_selector_all(ROOT_SELECTOR),
		}
		.expect_throw("carousel-flow: Invalid root selector.");
		(0..matches.length()).filter_map(move |i| matches.item(i)).filter_map(|node| node.dyn_into::<HtmlElement>().ok())
	}

	/// Classifies `root` as CMS-governed or static.
	#[must_use]
	pub fn governance(root: &HtmlElement) -> Governance {
		let marker = root
			.closest(CMS_MARKER_SELECTOR)
			.expect_throw("carousel-flow: Invalid CMS marker selector.")
			.or_else(|| root.query_selector(CMS_MARKER_SELECTOR).expect_throw("carousel-flow: Invalid CMS marker selector."));
		match marker {
			Some(marker) if CMS_MARKER_ATTRIBUTES.iter().any(|attribute| marker.get_attribute(attribute).map_or(false, |value| value.contains("list"))) => Governance::Governed(marker),
			_ => Governance::Static,
		}
	}

	/// Discovers all roots in the document and applies each through
	/// [`apply_governed`](`CarouselRegistry::apply_governed`).
	pub fn bootstrap(&self) {
		let mut any = false;
		for root in Self::discover(None) {
			any = true;
			self.apply_governed(&root);
		}
		if !any {
			debug!("{} count is 0", ROOT_SELECTOR);
		}
	}

	/// Applies `root`, first registering a child-set watch on its governing element when it is
	/// CMS-governed: every detected child-set change re-applies all roots of the new snapshot,
	/// which is how carousels inside dynamically re-rendered list items get (re)bound.
	pub fn apply_governed(&self, root: &HtmlElement) {
		if let Governance::Governed(governing) = Self::governance(root) {
			self.watch_governed(&governing);
		}
		self.apply(root);
	}

	/// Applies every root currently under `scope`, skipping already-bound ones.
	///
	/// This is the hook for host glue reacting to a CMS list plugin's `renderitems` event: pass
	/// the plugin's `list` element as the scope.
	pub fn refresh(&self, scope: Option<&Element>) {
		for root in Self::discover(scope) {
			self.apply(&root);
		}
	}

	/// Binds a carousel to `root` unless one is already bound to it.
	///
	/// A missing container or missing slides is reported and skips this root only; other
	/// candidates of the same pass are unaffected.
	#[instrument(skip(self))]
	pub fn apply(&self, root: &HtmlElement) {
		if self.is_bound(root) {
			return;
		}

		let containers = root.query_selector_all(CONTAINER_SELECTOR).expect_throw("carousel-flow: Invalid container selector.");
		if containers.length() > 1 {
			error!("Expected exactly one {} but found {}!", CONTAINER_SELECTOR, containers.length());
			return;
		}
		let container = match containers.item(0).and_then(|node| node.dyn_into::<HtmlElement>().ok()) {
			Some(container) => container,
			None => {
				error!("{} wasn't found!", CONTAINER_SELECTOR);
				return;
			}
		};

		let slides = watch::matching_children(&container, SLIDE_SELECTOR);
		if slides.is_empty() {
			error!("{} wasn't found!", SLIDE_SELECTOR);
			return;
		}

		let descriptor = RootDescriptor::parse(root);
		let handle = self.inner.engine.create(root, &container, &slides, &descriptor);

		// The instance stays reachable for external scripts.
		Reflect::set(root.as_ref(), &JsValue::from_str(INSTANCE_EXPANDO), &handle.as_js()).expect_throw("carousel-flow: Failed to attach instance expando.");

		forward_events(root, &handle, &descriptor.exposed_events);

		let mut listeners = ListenerBundle::new();
		wire_controls(root, &handle, &mut listeners);

		self.inner.active.borrow_mut().push(ActiveBinding {
			root: root.clone(),
			handle,
			listeners,
		});
		trace!("Bound carousel ({} slide(s)).", slides.len());
	}

	#[must_use]
	pub fn is_bound(&self, root: &HtmlElement) -> bool {
		self.inner.active.borrow().iter().any(|binding| binding.root == *root)
	}

	/// The number of active bindings.
	#[must_use]
	pub fn len(&self) -> usize {
		self.inner.active.borrow().len()
	}

	#[must_use]
	pub fn is_empty(&self) -> bool {
		self.inner.active.borrow().is_empty()
	}

	/// Tears down the binding owned by `root`, if any.
	pub fn destroy(&self, root: &HtmlElement) {
		let binding = {
			let mut active = self.inner.active.borrow_mut();
			active.iter().position(|binding| binding.root == *root).map(|i| active.remove(i))
		};
		if let Some(binding) = binding {
			teardown(binding);
		}
	}

	/// Tears down every active binding and cancels every watch registration. No-op when empty.
	#[instrument(skip(self))]
	pub fn destroy_all(&self) {
		let bindings: Vec<ActiveBinding> = self.inner.active.borrow_mut().drain(..).collect();
		let binding_count = bindings.len();
		for binding in bindings {
			teardown(binding);
		}

		let watches: Vec<ChildSetWatch> = self.inner.watches.borrow_mut().drain(..).collect();
		let watch_count = watches.len();
		for watch in watches {
			watch.cancel();
		}
		debug!("Destroyed {} binding(s) and {} watch(es).", binding_count, watch_count);
	}

	/// [`destroy_all`](`CarouselRegistry::destroy_all`) followed by a fresh
	/// [`bootstrap`](`CarouselRegistry::bootstrap`) pass, for page-navigation hooks where the DOM
	/// is replaced without a full reload.
	pub fn reinit(&self) {
		self.destroy_all();
		self.bootstrap();
	}

	fn watch_governed(&self, governing: &Element) {
		let registry = self.clone();
		let watch = watch::watch(governing, ROOT_SELECTOR, move |roots| {
			for root in roots {
				registry.apply(root);
			}
		});
		self.inner.watches.borrow_mut().push(watch);
	}
}

fn teardown(mut binding: ActiveBinding) {
	binding.listeners.revoke();
	binding.handle.destroy();
	Reflect::delete_property(binding.root.unchecked_ref::<Object>(), &JsValue::from_str(INSTANCE_EXPANDO)).expect_throw("carousel-flow: Failed to remove instance expando.");
}

fn forward_events(root: &HtmlElement, handle: &Rc<dyn CarouselHandle>, events: &[&'static str]) {
	for &event in events {
		let root = root.clone();
		let detail = handle.as_js();
		handle.on(
			event,
			Box::new(move || {
				let payload = Object::new();
				Reflect::set(payload.as_ref(), &JsValue::from_str(EVENT_NAMESPACE), &detail).expect_throw("carousel-flow: Failed to assemble event detail.");
				let mut init = CustomEventInit::new();
				init.detail(payload.as_ref());
				let custom = CustomEvent::new_with_event_init_dict(&format!("{}:{}", EVENT_NAMESPACE, event), &init).expect_throw("carousel-flow: Failed to create custom event.");
				root.dispatch_event(&custom).expect_throw("carousel-flow: Failed to dispatch custom event.");
			}),
		);
	}
}

fn wire_controls(root: &HtmlElement, handle: &Rc<dyn CarouselHandle>, listeners: &mut ListenerBundle) {
	let next = query_control(root, NEXT_SELECTOR);
	let prev = query_control(root, PREV_SELECTOR);
	let (next, prev) = match (next, prev) {
		(Some(next), Some(prev)) => (next, prev),
		_ => return,
	};

	// Drag-initiating gestures on the controls must not reach the carousel's swipe recognition.
	for &control in &[&next, &prev] {
		for &event_type in SWIPE_EVENTS {
			let passive = event_type == "touchmove" || event_type == "mousemove";
			listeners.add(control, event_type, passive, |event| event.stop_propagation());
		}
	}

	{
		let handle = Rc::clone(handle);
		listeners.add(&next, "click", false, move |event| {
			event.stop_propagation();
			if handle.can_scroll_next() {
				handle.scroll_next();
			}
		});
	}
	{
		let handle = Rc::clone(handle);
		listeners.add(&prev, "click", false, move |event| {
			event.stop_propagation();
			if handle.can_scroll_prev() {
				handle.scroll_prev();
			}
		});
	}

	for &event in NAV_STATE_EVENTS {
		// The handle owns this subscription; a strong reference here would cycle.
		let handle_weak = Rc::downgrade(handle);
		let next = next.clone();
		let prev = prev.clone();
		handle.on(
			event,
			Box::new(move || {
				if let Some(handle) = handle_weak.upgrade() {
					adjust_controls(&next, &prev, &*handle);
				}
			}),
		);
	}
}

fn adjust_controls(next: &HtmlElement, prev: &HtmlElement, handle: &dyn CarouselHandle) {
	set_disabled(next, !handle.can_scroll_next());
	set_disabled(prev, !handle.can_scroll_prev());
}

fn set_disabled(control: &HtmlElement, disabled: bool) {
	let class_list = control.class_list();
	if disabled {
		class_list.add_1(DISABLED_CLASS)
	} else {
		class_list.remove_1(DISABLED_CLASS)
	}
	.expect_throw("carousel-flow: Failed to toggle control state.");
}

fn query_control(root: &HtmlElement, selector: &str) -> Option<HtmlElement> {
	root.query_selector(selector)
		.expect_throw("carousel-flow: Invalid control selector.")
		.and_then(|element| element.dyn_into().ok())
}
