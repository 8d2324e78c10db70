//! # pitchdic
//!
//! pitchdic renders Japanese pitch-accent diagrams and backs them with a
//! lazily-built lexical store of dictionary glosses and pitch-accent records.
//!
//! ## Examples
//!
//! ```
//! use pitchdic::diagram::{render, render_svg, SegmentKind};
//! use pitchdic::mora::segment;
//!
//! let mora = segment("しゅんかん");
//! assert_eq!(mora, ["しゅ", "ん", "か", "ん"]);
//!
//! let diagram = render("はし", "LHL");
//! let kinds: Vec<_> = diagram.segments.iter().map(|s| s.kind).collect();
//! assert_eq!(kinds, [SegmentKind::Rising, SegmentKind::Falling]);
//!
//! let svg = render_svg("はし", "LHL");
//! assert!(svg.starts_with("<svg class=\"pitch\""));
//! ```
//!
//! Stored readings and patterns come from a [`LexicalStore`]:
//!
//! ```no_run
//! use pitchdic::{LexicalStore, StoreConfig};
//!
//! let store = LexicalStore::new(StoreConfig::new("data"));
//! for diagram in store.pitch_diagrams("箸") {
//!     println!("{} {}", diagram.entry.kana, diagram.entry.pattern);
//! }
//! ```
#![deny(missing_docs)]

pub mod common;
pub mod diagram;
pub mod errors;
pub mod examples;
pub mod kanji;
pub mod mora;
pub mod pattern;
pub mod store;


pub use store::{LexicalStore, StoreConfig};

/// Version number of this library.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
