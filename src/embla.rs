use crate::{
	descriptor::RootDescriptor,
	engine::{CarouselEngine, CarouselHandle},
};
use js_sys::{Array, Function, Object, Reflect};
use std::{cell::RefCell, rc::Rc};
use wasm_bindgen::{closure::Closure, prelude::wasm_bindgen, JsCast, JsValue, UnwrapThrowExt};
use web_sys::HtmlElement;

#[wasm_bindgen]
extern "C" {
	/// Instance API returned by the [***EmblaCarousel***](https://www.embla-carousel.com/api/) factory.
	pub type EmblaApi;

	#[wasm_bindgen(js_name = EmblaCarousel)]
	fn embla_carousel(root: &HtmlElement, options: &JsValue, plugins: &Array) -> EmblaApi;

	#[wasm_bindgen(js_name = EmblaCarouselAutoplay)]
	fn embla_carousel_autoplay(options: &JsValue) -> JsValue;

	#[wasm_bindgen(method)]
	fn on(this: &EmblaApi, event: &str, callback: &Function);

	#[wasm_bindgen(method)]
	fn destroy(this: &EmblaApi);

	#[wasm_bindgen(method, js_name = scrollNext)]
	fn scroll_next(this: &EmblaApi);

	#[wasm_bindgen(method, js_name = scrollPrev)]
	fn scroll_prev(this: &EmblaApi);

	#[wasm_bindgen(method, js_name = canScrollNext)]
	fn can_scroll_next(this: &EmblaApi) -> bool;

	#[wasm_bindgen(method, js_name = canScrollPrev)]
	fn can_scroll_prev(this: &EmblaApi) -> bool;
}

/// [`CarouselEngine`] implementation over the `EmblaCarousel` and `EmblaCarouselAutoplay`
/// UMD globals, which must be loaded before any carousel is applied.
pub struct EmblaEngine;
impl CarouselEngine for EmblaEngine {
	fn create(&self, root: &HtmlElement, container: &HtmlElement, slides: &[HtmlElement], descriptor: &RootDescriptor) -> Rc<dyn CarouselHandle> {
		let options = Object::new();
		set(&options, "loop", &JsValue::from_bool(descriptor.wrap_around));
		set(&options, "dragFree", &JsValue::from_bool(descriptor.drag_free));
		set(&options, "container", container.as_ref());
		set(&options, "slides", slides.iter().map(|slide| JsValue::from(slide.clone())).collect::<Array>().as_ref());
		set(&options, "align", &JsValue::from_str(descriptor.align.as_str()));
		set(&options, "startIndex", &JsValue::from_f64(f64::from(descriptor.start_index)));
		if descriptor.last_slide_center {
			// Omitting the key instead keeps Embla's default edge containment.
			set(&options, "containScroll", &JsValue::FALSE);
		}

		let plugins = Array::new();
		if descriptor.auto_play {
			let autoplay_options = Object::new();
			for key in &["stopOnFocusIn", "stopOnInteraction", "stopOnLastSnap", "stopOnMouseEnter"] {
				set(&autoplay_options, key, &JsValue::FALSE);
			}
			plugins.push(&embla_carousel_autoplay(autoplay_options.as_ref()));
		}

		let api = embla_carousel(root, options.as_ref(), &plugins);
		Rc::new(EmblaHandle {
			api,
			callbacks: RefCell::new(Vec::new()),
		})
	}
}

/// Owns the JS closures registered through `on`, so they are dropped together with the binding
/// rather than leaked per subscription.
struct EmblaHandle {
	api: EmblaApi,
	callbacks: RefCell<Vec<Closure<dyn FnMut()>>>,
}
impl CarouselHandle for EmblaHandle {
	fn scroll_next(&self) {
		self.api.scroll_next();
	}

	fn scroll_prev(&self) {
		self.api.scroll_prev();
	}

	fn can_scroll_next(&self) -> bool {
		self.api.can_scroll_next()
	}

	fn can_scroll_prev(&self) -> bool {
		self.api.can_scroll_prev()
	}

	fn on(&self, event: &'static str, listener: Box<dyn FnMut()>) {
		// Embla invokes callbacks with `(api, eventName)`; both are dropped at the shim boundary.
		let closure = Closure::wrap(listener);
		self.api.on(event, closure.as_ref().unchecked_ref());
		self.callbacks.borrow_mut().push(closure);
	}

	fn destroy(&self) {
		self.api.destroy();
	}

	fn as_js(&self) -> JsValue {
		let api: &JsValue = self.api.as_ref();
		api.clone()
	}
}

fn set(target: &Object, key: &str, value: &JsValue) {
	Reflect::set(target.as_ref(), &JsValue::from_str(key), value).expect_throw("carousel-flow: Failed to set carousel option.");
}
