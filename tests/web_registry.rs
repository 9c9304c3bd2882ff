use carousel_flow::{
	descriptor::{Align, RootDescriptor},
	engine::CarouselHandle,
	registry::{CarouselRegistry, Governance},
};
use std::{
	cell::Cell,
	rc::Rc,
};
use wasm_bindgen::{closure::Closure, JsCast, JsValue};
use wasm_bindgen_test::{wasm_bindgen_test, wasm_bindgen_test_configure};
use web_sys::CustomEvent;

wasm_bindgen_test_configure!(run_in_browser);

use support_::StubEngine;

fn registry_with_stub() -> (CarouselRegistry, Rc<StubEngine>) {
	support_::init_logging();
	support_::reset_body();
	let engine = Rc::new(StubEngine::default());
	(CarouselRegistry::new(engine.clone()), engine)
}

#[wasm_bindgen_test]
fn apply_twice_binds_once() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(3, false, &[]);

	registry.apply(&fixture.root);
	registry.apply(&fixture.root);

	assert_eq!(engine.created.borrow().len(), 1);
	assert_eq!(registry.len(), 1);
	assert!(registry.is_bound(&fixture.root));
}

#[wasm_bindgen_test]
fn missing_container_is_reported_and_skipped() {
	let (registry, engine) = registry_with_stub();
	let root = support_::element("div", &[("data-carousel-parent", "")]);
	support_::document().body().unwrap().append_child(&root).unwrap();

	registry.apply(&root);

	assert_eq!(engine.created.borrow().len(), 0);
	assert!(registry.is_empty());
}

#[wasm_bindgen_test]
fn ambiguous_containers_are_reported_and_skipped() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(2, false, &[]);
	let second_container = support_::element("div", &[("data-carousel-container", "")]);
	fixture.root.append_child(&second_container).unwrap();

	registry.apply(&fixture.root);

	assert_eq!(engine.created.borrow().len(), 0);
	assert!(registry.is_empty());
}

#[wasm_bindgen_test]
fn missing_slides_are_reported_and_skipped() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(0, false, &[]);

	registry.apply(&fixture.root);

	assert_eq!(engine.created.borrow().len(), 0);
	assert!(!registry.is_bound(&fixture.root));
}

#[wasm_bindgen_test]
fn broken_root_does_not_abort_the_pass() {
	let (registry, engine) = registry_with_stub();
	let broken = support_::fixture(0, false, &[]);
	let good = support_::fixture(2, false, &[]);

	registry.bootstrap();

	assert_eq!(engine.created.borrow().len(), 1);
	assert!(!registry.is_bound(&broken.root));
	assert!(registry.is_bound(&good.root));
}

#[wasm_bindgen_test]
fn descriptor_is_parsed_from_data_attributes() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(
		5,
		false,
		&[
			("data-drag-free", "true"),
			("data-loop", "true"),
			("data-auto-play", "true"),
			("data-embla-align", "end"),
			("data-embla-start-index", "2"),
			("data-embla-last-slide-center", "false"),
		],
	);

	registry.apply(&fixture.root);

	let created = engine.created.borrow();
	assert_eq!(
		created[0].descriptor,
		RootDescriptor {
			drag_free: true,
			wrap_around: true,
			auto_play: true,
			align: Align::End,
			start_index: 2,
			last_slide_center: false,
			exposed_events: vec![],
		}
	);
	assert_eq!(created[0].slides.len(), 5);
	assert_eq!(created[0].container, fixture.container);
}

#[wasm_bindgen_test]
fn descriptor_defaults_absorb_invalid_values() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(2, false, &[("data-embla-align", "diagonal"), ("data-embla-start-index", "three")]);

	registry.apply(&fixture.root);

	let created = engine.created.borrow();
	assert_eq!(created[0].descriptor.align, Align::Center);
	assert_eq!(created[0].descriptor.start_index, 0);
	assert!(created[0].descriptor.last_slide_center);
}

#[wasm_bindgen_test]
fn unrecognized_exposed_events_are_dropped() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(3, false, &[("data-embla-exposed-events", "select,bogus")]);

	registry.apply(&fixture.root);

	let handle = Rc::clone(&engine.created.borrow()[0]);
	assert_eq!(handle.subscribed_events(), vec!["select"]);
	assert_eq!(handle.descriptor.exposed_events, vec!["select"]);
}

#[wasm_bindgen_test]
fn exposed_events_are_forwarded_with_the_handle_as_detail() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(3, false, &[("data-embla-exposed-events", "select")]);

	registry.apply(&fixture.root);
	let handle = Rc::clone(&engine.created.borrow()[0]);

	let received = Rc::new(Cell::new(0));
	let detail_matches = Rc::new(Cell::new(false));
	let listener = Closure::wrap(Box::new({
		let received = Rc::clone(&received);
		let detail_matches = Rc::clone(&detail_matches);
		let expected = handle.as_js();
		move |event: web_sys::Event| {
			let event: CustomEvent = event.dyn_into().unwrap();
			let embla = js_sys::Reflect::get(&event.detail(), &JsValue::from_str("embla")).unwrap();
			detail_matches.set(embla == expected);
			received.set(received.get() + 1);
		}
	}) as Box<dyn FnMut(web_sys::Event)>);
	fixture
		.root
		.add_event_listener_with_callback("embla:select", listener.as_ref().unchecked_ref())
		.unwrap();

	handle.emit("select");

	assert_eq!(received.get(), 1);
	assert!(detail_matches.get());
	drop(listener);
}

#[wasm_bindgen_test]
fn autoplay_without_controls_binds_cleanly() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(5, false, &[("data-loop", "true"), ("data-auto-play", "true")]);

	registry.bootstrap();

	let created = engine.created.borrow();
	assert_eq!(created.len(), 1);
	assert!(created[0].descriptor.auto_play);
	assert!(created[0].descriptor.wrap_around);
	// No controls and no exposed events: nothing subscribes on the handle.
	assert!(created[0].subscribed_events().is_empty());
	assert!(registry.is_bound(&fixture.root));
}

#[wasm_bindgen_test]
fn instance_is_attached_to_the_root_and_removed_on_destroy() {
	let (registry, engine) = registry_with_stub();
	let fixture = support_::fixture(2, false, &[]);

	registry.apply(&fixture.root);
	let handle = Rc::clone(&engine.created.borrow()[0]);
	let expando = js_sys::Reflect::get(fixture.root.as_ref(), &JsValue::from_str("emblaApi")).unwrap();
	assert_eq!(expando, handle.as_js());

	registry.destroy(&fixture.root);
	let expando = js_sys::Reflect::get(fixture.root.as_ref(), &JsValue::from_str("emblaApi")).unwrap();
	assert!(expando.is_undefined());
	assert!(handle.destroyed.get());
	assert!(registry.is_empty());
}

#[wasm_bindgen_test]
fn destroy_all_then_bootstrap_reproduces_a_fresh_pass() {
	let (registry, engine) = registry_with_stub();
	let first = support_::fixture(2, false, &[]);
	let second = support_::fixture(3, false, &[]);

	registry.bootstrap();
	assert_eq!(registry.len(), 2);

	registry.destroy_all();
	assert!(registry.is_empty());
	assert!(engine.created.borrow().iter().all(|handle| handle.destroyed.get()));

	registry.bootstrap();
	assert_eq!(registry.len(), 2);
	assert_eq!(engine.created.borrow().len(), 4);
	assert!(registry.is_bound(&first.root));
	assert!(registry.is_bound(&second.root));
}

#[wasm_bindgen_test]
fn reinit_rebinds_the_replaced_dom() {
	let (registry, engine) = registry_with_stub();
	let stale = support_::fixture(2, false, &[]);
	registry.bootstrap();
	assert!(registry.is_bound(&stale.root));

	// Page navigation swaps the DOM without a reload.
	support_::reset_body();
	let fresh = support_::fixture(2, false, &[]);
	registry.reinit();

	assert_eq!(registry.len(), 1);
	assert!(registry.is_bound(&fresh.root));
	assert!(!registry.is_bound(&stale.root));
	assert!(engine.created.borrow()[0].destroyed.get());
}

#[wasm_bindgen_test]
fn destroy_all_on_empty_registry_is_a_no_op() {
	let (registry, _engine) = registry_with_stub();
	registry.destroy_all();
	assert!(registry.is_empty());
}

#[wasm_bindgen_test]
fn governance_is_detected_from_ancestor_and_descendant_markers() {
	let (_registry, _engine) = registry_with_stub();

	let wrapper = support_::governed_wrapper();
	let governed = support_::fixture_in(&wrapper, 2, false, &[]);
	assert!(matches!(CarouselRegistry::governance(&governed.root), Governance::Governed(_)));

	let with_marker_inside = support_::fixture(2, false, &[]);
	with_marker_inside
		.root
		.append_child(&support_::element("div", &[("fs-cmsfilter-element", "list-2")]))
		.unwrap();
	assert!(matches!(CarouselRegistry::governance(&with_marker_inside.root), Governance::Governed(_)));

	let plain = support_::fixture(2, false, &[]);
	assert!(matches!(CarouselRegistry::governance(&plain.root), Governance::Static));

	// Marker attribute present, but not a list instance.
	let other_wrapper = support_::element("div", &[("fs-cmsload-element", "loader")]);
	support_::document().body().unwrap().append_child(&other_wrapper).unwrap();
	let not_list = support_::fixture_in(&other_wrapper, 2, false, &[]);
	assert!(matches!(CarouselRegistry::governance(&not_list.root), Governance::Static));
}

#[wasm_bindgen_test]
async fn governed_roots_are_rebound_after_a_list_rerender() {
	let (registry, engine) = registry_with_stub();
	let wrapper = support_::governed_wrapper();
	support_::fixture_in(&wrapper, 2, false, &[]);

	registry.bootstrap();
	assert_eq!(registry.len(), 1);

	// The list plugin replaces its rendered items wholesale.
	wrapper.set_inner_html("");
	let rerendered = support_::fixture_in(&wrapper, 3, false, &[]);
	support_::tick().await;

	assert_eq!(engine.created.borrow().len(), 2);
	assert!(registry.is_bound(&rerendered.root));
	// The stale binding is not torn down implicitly.
	assert_eq!(registry.len(), 2);
}

#[wasm_bindgen_test]
async fn destroy_all_cancels_governed_watches() {
	let (registry, engine) = registry_with_stub();
	let wrapper = support_::governed_wrapper();
	support_::fixture_in(&wrapper, 2, false, &[]);

	registry.bootstrap();
	registry.destroy_all();

	wrapper.set_inner_html("");
	support_::fixture_in(&wrapper, 3, false, &[]);
	support_::tick().await;

	// No watch survives teardown, so the re-render binds nothing.
	assert_eq!(engine.created.borrow().len(), 1);
	assert!(registry.is_empty());
}

#[wasm_bindgen_test]
fn refresh_applies_within_scope_only() {
	let (registry, engine) = registry_with_stub();
	let scope = support_::element("div", &[]);
	support_::document().body().unwrap().append_child(&scope).unwrap();
	let inside = support_::fixture_in(&scope, 2, false, &[]);
	let outside = support_::fixture(2, false, &[]);

	registry.refresh(Some(scope.as_ref()));
	registry.refresh(Some(scope.as_ref()));

	assert_eq!(engine.created.borrow().len(), 1);
	assert!(registry.is_bound(&inside.root));
	assert!(!registry.is_bound(&outside.root));
}
