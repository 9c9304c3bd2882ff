use crate::descriptor::RootDescriptor;
use std::rc::Rc;
use wasm_bindgen::JsValue;
use web_sys::HtmlElement;

/// Live handle to one carousel instance.
///
/// This is the capability surface the registry relies on; everything else the concrete widget
/// offers stays opaque. Event subscriptions registered through [`on`](`CarouselHandle::on`) live
/// exactly as long as the instance and are torn down by [`destroy`](`CarouselHandle::destroy`).
pub trait CarouselHandle {
	fn scroll_next(&self);
	fn scroll_prev(&self);
	fn can_scroll_next(&self) -> bool;
	fn can_scroll_prev(&self) -> bool;

	/// Subscribes `listener` to a named lifecycle event of the instance.
	fn on(&self, event: &'static str, listener: Box<dyn FnMut()>);

	fn destroy(&self);

	/// The instance as a JS value, for use as custom event detail and as the root's
	/// `emblaApi` expando property.
	fn as_js(&self) -> JsValue;
}

/// Instantiates carousels for the registry.
///
/// Injected into [`CarouselRegistry`](`crate::registry::CarouselRegistry`) so tests can substitute
/// a recording stub and several independent registries can coexist.
pub trait CarouselEngine {
	/// Binds a new carousel instance to `root`.
	///
	/// `container` is `root`'s single slide container, `slides` its matched slide elements in
	/// document order; both have been validated by the caller. `descriptor` carries the parsed
	/// per-root options, including whether an autoplay plugin is wanted.
	fn create(&self, root: &HtmlElement, container: &HtmlElement, slides: &[HtmlElement], descriptor: &RootDescriptor) -> Rc<dyn CarouselHandle>;
}
