//! Site-level glue data: branding settings, social links, and the image
//! library. Plain CRUD with no invariants, so these are repository
//! functions over the pool rather than part of the content storage trait.

pub mod images;
pub mod settings;
pub mod social;
