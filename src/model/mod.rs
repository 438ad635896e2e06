//! In-memory BOM model.
//!
//! The model always sits at [`SpecVersion::CANONICAL`]. Codecs lift older
//! documents into it on the way in, and the downgrade chain projects it onto
//! older versions on the way out.
//!
//! ```
//! use bom_tools::model::{Bom, Component, ComponentType, LicenseChoice, License};
//!
//! let mut component = Component::new(ComponentType::Library, "serde").with_version("1.0.200");
//! component.licenses.push(LicenseChoice::License(License::spdx("MIT")));
//!
//! let mut bom = Bom::new();
//! bom.components.push(component);
//! assert_eq!(bom.all_components().len(), 1);
//! ```

mod bom;
mod component;
mod license;
mod version;

pub use bom::*;
pub use component::*;
pub use license::{License, LicenseChoice, LicenseIdentity};
pub(crate) use license::RawLicense;
pub use version::{SpdxVersion, SpecVersion};
