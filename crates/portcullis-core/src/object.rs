//! Type-erased API objects
//!
//! Strategies are written against concrete types, but the request pipeline and the
//! list/watch matchers handle objects of any kind. [`Object`] is the erased view;
//! every `kube::Resource` with a static type gets it for free.

use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::Resource;
use std::any::Any;
use std::fmt;

use crate::error::{ApiError, Result};

/// An API object whose concrete kind is known only at runtime
pub trait Object: Any + Send + Sync + fmt::Debug {
    /// Kind name, e.g. `Route`
    fn object_kind(&self) -> String;

    /// Kind name without an instance
    fn static_kind() -> String
    where
        Self: Sized;

    fn object_meta(&self) -> &ObjectMeta;

    fn object_meta_mut(&mut self) -> &mut ObjectMeta;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T> Object for T
where
    T: Resource<DynamicType = ()> + Any + Send + Sync + fmt::Debug,
{
    fn object_kind(&self) -> String {
        T::kind(&()).into_owned()
    }

    fn static_kind() -> String {
        T::kind(&()).into_owned()
    }

    fn object_meta(&self) -> &ObjectMeta {
        self.meta()
    }

    fn object_meta_mut(&mut self) -> &mut ObjectMeta {
        self.meta_mut()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Borrow `obj` as `T`, failing with a type-mismatch error for any other kind
pub fn downcast_ref<T: Object>(obj: &dyn Object) -> Result<&T> {
    let found = obj.object_kind();
    obj.as_any()
        .downcast_ref::<T>()
        .ok_or_else(|| ApiError::TypeMismatch {
            expected: T::static_kind(),
            found,
        })
}

/// Mutably borrow `obj` as `T`, failing with a type-mismatch error for any other kind
pub fn downcast_mut<T: Object>(obj: &mut dyn Object) -> Result<&mut T> {
    let found = obj.object_kind();
    obj.as_any_mut()
        .downcast_mut::<T>()
        .ok_or_else(|| ApiError::TypeMismatch {
            expected: T::static_kind(),
            found,
        })
}

/// Object name, falling back to `generateName` for display purposes
pub fn display_name(meta: &ObjectMeta) -> String {
    meta.name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| meta.generate_name.clone())
        .unwrap_or_default()
}

#[cfg(test)]
pub(crate) mod testing {
    //! Minimal resources used by this crate's unit tests

    use super::*;
    use std::borrow::Cow;

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Widget {
        pub metadata: ObjectMeta,
        pub size: i64,
    }

    #[derive(Debug, Clone, Default, PartialEq)]
    pub struct Gadget {
        pub metadata: ObjectMeta,
    }

    macro_rules! test_resource {
        ($ty:ty, $kind:literal, $plural:literal) => {
            impl Resource for $ty {
                type DynamicType = ();
                type Scope = k8s_openapi::NamespaceResourceScope;

                fn kind(_: &()) -> Cow<'_, str> {
                    Cow::Borrowed($kind)
                }

                fn group(_: &()) -> Cow<'_, str> {
                    Cow::Borrowed("test.portcullis.io")
                }

                fn version(_: &()) -> Cow<'_, str> {
                    Cow::Borrowed("v1")
                }

                fn plural(_: &()) -> Cow<'_, str> {
                    Cow::Borrowed($plural)
                }

                fn meta(&self) -> &ObjectMeta {
                    &self.metadata
                }

                fn meta_mut(&mut self) -> &mut ObjectMeta {
                    &mut self.metadata
                }
            }
        };
    }

    test_resource!(Widget, "Widget", "widgets");
    test_resource!(Gadget, "Gadget", "gadgets");

    pub fn widget(namespace: &str, name: &str) -> Widget {
        Widget {
            metadata: ObjectMeta {
                name: Some(name.to_string()),
                namespace: Some(namespace.to_string()),
                ..Default::default()
            },
            size: 0,
        }
    }
}
