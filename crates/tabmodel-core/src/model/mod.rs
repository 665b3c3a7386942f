pub mod collection;
pub mod facet;
pub mod kind;
pub mod object;
pub mod property;

pub use collection::{Collection, CollectionRef};
pub use facet::{Facet, FacetSet};
pub use kind::{ChildKind, ObjectKind};
pub use object::{EntityToken, ObjectHandle, ObjectId};
pub use property::{PropertyName, PropertyValue};
