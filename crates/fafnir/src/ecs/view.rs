//! Component-set selection for [`World::view`](super::world::World::view).
//!
//! A [`ComponentSet`] is a tuple of component types used to filter entities,
//! e.g. `world.view::<(Transform, MeshRenderer)>()`. Single-component sets
//! are written as one-element tuples: `world.view::<(Parent,)>()`.

use std::any::TypeId;

pub trait ComponentSet {
    fn type_ids() -> Vec<TypeId>;
}

/// The empty set. Matches everything when used as an exclusion filter.
impl ComponentSet for () {
    fn type_ids() -> Vec<TypeId> {
        Vec::new()
    }
}

macro_rules! impl_component_set {
    ($($name:ident),+) => {
        impl<$($name: 'static + Send + Sync),+> ComponentSet for ($($name,)+) {
            fn type_ids() -> Vec<TypeId> {
                vec![$(TypeId::of::<$name>()),+]
            }
        }
    };
}

impl_component_set!(A);
impl_component_set!(A, B);
impl_component_set!(A, B, C);
impl_component_set!(A, B, C, D);
impl_component_set!(A, B, C, D, E);
impl_component_set!(A, B, C, D, E, F);
impl_component_set!(A, B, C, D, E, F, G);
impl_component_set!(A, B, C, D, E, F, G, H);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tuple_type_ids_in_order() {
        let ids = <(i32, f64)>::type_ids();
        assert_eq!(ids, vec![TypeId::of::<i32>(), TypeId::of::<f64>()]);
    }

    #[test]
    fn unit_set_is_empty() {
        assert!(<() as ComponentSet>::type_ids().is_empty());
    }
}
