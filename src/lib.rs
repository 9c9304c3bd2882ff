#![doc(html_root_url = "https://docs.rs/carousel-flow/0.0.1")]
#![warn(clippy::pedantic)]

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod descriptor;
pub mod embla;
pub mod engine;
pub mod listeners;
pub mod registry;
pub mod watch;
