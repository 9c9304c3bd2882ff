use hashbrown::HashSet;
use web_sys::HtmlElement;

/// Embla lifecycle events that may be re-dispatched as DOM custom events.
///
/// Requests outside this list are dropped without a diagnostic.
pub const EXPOSED_EVENTS: &[&str] = &[
	"init",
	"reInit",
	"destroy",
	"select",
	"scroll",
	"settle",
	"resize",
	"slidesInView",
	"slidesChanged",
	"slideFocus",
	"pointerDown",
	"pointerUp",
];

/// Slide alignment within the carousel viewport.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
	Start,
	Center,
	End,
}
impl Align {
	#[must_use]
	pub fn as_str(self) -> &'static str {
		match self {
			Align::Start => "start",
			Align::Center => "center",
			Align::End => "end",
		}
	}
}
impl Default for Align {
	fn default() -> Self {
		Align::Center
	}
}

/// Per-root carousel configuration, string-encoded on the root element as `data-*` attributes
/// and parsed once per binding attempt.
///
/// | Attribute | Default | Field |
/// |---|---|---|
/// | `data-drag-free` | `false` | `drag_free` |
/// | `data-loop` | `false` | `wrap_around` |
/// | `data-auto-play` | `false` | `auto_play` |
/// | `data-embla-align` | `center` | `align` (unrecognized values fall back to the default) |
/// | `data-embla-start-index` | `0` | `start_index` (non-numeric values fall back to the default) |
/// | `data-embla-last-slide-center` | `true` | `last_slide_center` (only the literal `"false"` disables it) |
/// | `data-embla-exposed-events` | empty | `exposed_events` (comma-separated, filtered against [`EXPOSED_EVENTS`]) |
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RootDescriptor {
	pub drag_free: bool,
	pub wrap_around: bool,
	pub auto_play: bool,
	pub align: Align,
	pub start_index: u32,
	pub last_slide_center: bool,
	pub exposed_events: Vec<&'static str>,
}
impl RootDescriptor {
	#[must_use]
	pub fn parse(root: &HtmlElement) -> Self {
		let dataset = root.dataset();
		Self {
			drag_free: dataset.get("dragFree").as_deref() == Some("true"),
			wrap_around: dataset.get("loop").as_deref() == Some("true"),
			auto_play: dataset.get("autoPlay").as_deref() == Some("true"),
			align: match dataset.get("emblaAlign").as_deref() {
				Some("start") => Align::Start,
				Some("end") => Align::End,
				_ => Align::Center,
			},
			start_index: dataset.get("emblaStartIndex").and_then(|raw| raw.parse().ok()).unwrap_or(0),
			last_slide_center: dataset.get("emblaLastSlideCenter").as_deref() != Some("false"),
			exposed_events: dataset.get("emblaExposedEvents").map_or_else(Vec::new, |raw| filter_exposed_events(&raw)),
		}
	}
}

/// Entries must match an allow-listed name exactly; no whitespace trimming happens.
fn filter_exposed_events(raw: &str) -> Vec<&'static str> {
	let mut seen = HashSet::new();
	raw.split(',')
		.filter_map(|requested| EXPOSED_EVENTS.iter().copied().find(|known| *known == requested))
		.filter(|event| seen.insert(*event))
		.collect()
}
