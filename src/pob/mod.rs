//! Path of Building import.
//!
//! A PoB export string is base64 (standard or URL-safe alphabet) over a zlib
//! stream over an XML document. [`parse_pob_build`] returns the character
//! attributes, the first passive tree spec and the equipped items;
//! [`blueprints_from_build`] turns those items into planner input.

pub mod blueprint;
pub mod decoder;
pub mod errors;
pub mod items;

pub use blueprint::{blueprint_from_item, blueprints_from_build, clean_affix, socket_blueprint};
pub use decoder::{coerce_attribute, decode_build_xml, parse_build_xml, parse_pob_build, PobBuild};
pub use errors::PobError;
pub use items::{parse_item_text, ItemAffixes, PobItem};
