//! Component Reflection
//!
//! User-defined components are exported through their fields rather than a
//! hand-written mapping. A component type describes its fields once
//! ([`FieldInfo`]: name, declared [`FieldType`], visibility [`FieldFlags`]) and
//! every instance reports the current value of each field as a
//! [`FieldValue`].
//!
//! Both [`FieldType`] and [`FieldValue`] are closed sums. Rust types map to them
//! through [`FieldKind`]; a type without a `FieldKind` impl cannot be used in a
//! component at all, and the few types that do have an impl but no portable
//! encoding map to `FieldType::Other` / `FieldValue::Unsupported` so the
//! encoder can reject them loudly.
//!
//! The [`thirdroom_component!`](crate::thirdroom_component) macro derives all of
//! this from a struct definition:
//!
//! ```rust,ignore
//! thirdroom_component! {
//!     #[derive(Debug, Clone, Default)]
//!     pub struct Door {
//!         pub open: bool,
//!         pub target: Option<NodeKey>,
//!         #[hide]
//!         pub cached_angle: f32,
//!     }
//! }
//! ```

use std::fmt;

use bitflags::bitflags;
use glam::{Vec2, Vec3, Vec4};

use crate::scene::NodeKey;

/// Field names the host's component base type already declares. A field with
/// one of these names is treated as inherited from the framework.
pub const FRAMEWORK_FIELDS: &[&str] = &[
    "enabled",
    "name",
    "tag",
    "hideFlags",
    "hide_flags",
    "useGUILayout",
    "use_gui_layout",
    "runInEditMode",
    "run_in_edit_mode",
];

bitflags! {
    /// Visibility markers of a reflected field.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u32 {
        /// Publicly visible.
        const PUBLIC     = 1 << 0;
        /// Explicitly excluded (`#[hide]`).
        const HIDDEN     = 1 << 1;
        /// Explicitly included (`#[serialize]`).
        const SERIALIZED = 1 << 2;
        /// Declared by the framework base type.
        const INHERITED  = 1 << 3;
        /// Marked deprecated (`#[obsolete]`).
        const DEPRECATED = 1 << 4;
    }
}

impl FieldFlags {
    /// Builds flags from a visibility and the marker attribute names used by
    /// [`thirdroom_component!`](crate::thirdroom_component).
    #[must_use]
    pub fn from_markers(name: &str, is_public: bool, markers: &[&str]) -> Self {
        let mut flags = FieldFlags::empty();
        if is_public {
            flags |= FieldFlags::PUBLIC;
        }
        if FRAMEWORK_FIELDS.contains(&name) {
            flags |= FieldFlags::INHERITED;
        }
        // other attributes (docs, lints) arrive here too and are not markers
        for marker in markers.iter().filter(|m| m.chars().all(|c| c.is_alphanumeric() || c == '_')) {
            match *marker {
                "hide" => flags |= FieldFlags::HIDDEN,
                "serialize" => flags |= FieldFlags::SERIALIZED,
                "inherited" => flags |= FieldFlags::INHERITED,
                "obsolete" => flags |= FieldFlags::DEPRECATED,
                other => log::warn!("Unknown component field marker #[{other}] on `{name}`"),
            }
        }
        flags
    }
}

/// Declared type of a reflected field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Bool,
    Int32,
    Float32,
    Vec2,
    Vec3,
    Vec4,
    /// Reference to another scene node.
    NodeRef,
    /// A type with no portable encoding.
    Other(&'static str),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => f.write_str("bool"),
            FieldType::Int32 => f.write_str("i32"),
            FieldType::Float32 => f.write_str("f32"),
            FieldType::Vec2 => f.write_str("Vec2"),
            FieldType::Vec3 => f.write_str("Vec3"),
            FieldType::Vec4 => f.write_str("Vec4"),
            FieldType::NodeRef => f.write_str("NodeRef"),
            FieldType::Other(name) => f.write_str(name),
        }
    }
}

/// Runtime value of a reflected field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Bool(bool),
    Int32(i32),
    Float32(f32),
    Vec2(Vec2),
    Vec3(Vec3),
    Vec4(Vec4),
    /// `None` is the "no object" sentinel.
    NodeRef(Option<NodeKey>),
    /// A value with no portable encoding; carries the runtime type name.
    Unsupported(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub ty: FieldType,
    pub flags: FieldFlags,
}

impl FieldInfo {
    #[must_use]
    pub const fn new(name: &'static str, ty: FieldType, flags: FieldFlags) -> Self {
        Self { name, ty, flags }
    }

    /// Whether the field takes part in the component schema.
    ///
    /// Precedence: explicit exclusion, explicit inclusion, framework-inherited
    /// exclusion, then public and not deprecated.
    #[must_use]
    pub fn is_schema_eligible(&self) -> bool {
        if self.flags.contains(FieldFlags::HIDDEN) {
            return false;
        }
        if self.flags.contains(FieldFlags::SERIALIZED) {
            return true;
        }
        if self.flags.contains(FieldFlags::INHERITED) {
            return false;
        }
        self.flags.contains(FieldFlags::PUBLIC) && !self.flags.contains(FieldFlags::DEPRECATED)
    }
}

// ============================================================================
// FieldKind: Rust type -> FieldType / FieldValue
// ============================================================================

/// Maps a Rust field type onto the reflected type system.
pub trait FieldKind {
    const FIELD_TYPE: FieldType;
    fn to_field_value(&self) -> FieldValue;
}

macro_rules! impl_field_kind {
    ($ty:ty, $variant:ident) => {
        impl FieldKind for $ty {
            const FIELD_TYPE: FieldType = FieldType::$variant;
            fn to_field_value(&self) -> FieldValue {
                FieldValue::$variant(*self)
            }
        }
    };
}

impl_field_kind!(bool, Bool);
impl_field_kind!(i32, Int32);
impl_field_kind!(f32, Float32);
impl_field_kind!(Vec2, Vec2);
impl_field_kind!(Vec3, Vec3);
impl_field_kind!(Vec4, Vec4);

impl FieldKind for Option<NodeKey> {
    const FIELD_TYPE: FieldType = FieldType::NodeRef;
    fn to_field_value(&self) -> FieldValue {
        FieldValue::NodeRef(*self)
    }
}

macro_rules! impl_unsupported_field_kind {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl FieldKind for $ty {
                const FIELD_TYPE: FieldType = FieldType::Other($name);
                fn to_field_value(&self) -> FieldValue {
                    FieldValue::Unsupported($name)
                }
            }
        )*
    };
}

impl_unsupported_field_kind! {
    String => "String",
    f64 => "f64",
    i64 => "i64",
    u32 => "u32",
    u64 => "u64",
    u8 => "u8",
}

// ============================================================================
// Component
// ============================================================================

/// A reflected user component instance.
pub trait Component: fmt::Debug + 'static {
    fn component_type(&self) -> ComponentType;

    /// Current value of the named field, `None` if the type has no such field.
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}

/// Static description of a component type.
pub trait ComponentDescriptor: Component + Default {
    const NAME: &'static str;

    fn fields() -> Vec<FieldInfo>;
}

/// A component type token: its name, its field list and a way to build the
/// default-constructed instance the schema reads default values from.
#[derive(Clone, Copy)]
pub struct ComponentType {
    name: &'static str,
    fields: fn() -> Vec<FieldInfo>,
    create_default: fn() -> Box<dyn Component>,
}

impl ComponentType {
    #[must_use]
    pub fn of<T: ComponentDescriptor>() -> Self {
        Self {
            name: T::NAME,
            fields: T::fields,
            create_default: || Box::new(T::default()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn fields(&self) -> Vec<FieldInfo> {
        (self.fields)()
    }

    /// Fields that take part in the schema, in declaration order.
    #[must_use]
    pub fn eligible_fields(&self) -> Vec<FieldInfo> {
        self.fields().into_iter().filter(FieldInfo::is_schema_eligible).collect()
    }

    #[must_use]
    pub fn create_default(&self) -> Box<dyn Component> {
        (self.create_default)()
    }
}

// Component types are identified by name within one export.
impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for ComponentType {}

impl fmt::Debug for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ComponentType").field(&self.name).finish()
    }
}

/// Declares a struct and derives [`Component`] / [`ComponentDescriptor`] for it.
///
/// Field markers (not emitted on the generated struct):
/// - `#[hide]`: never exported
/// - `#[serialize]`: always exported, even if private
/// - `#[inherited]`: declared by the framework base type
/// - `#[obsolete]`: deprecated, excluded unless `#[serialize]`
///
/// Any other field attribute, `///` docs included, is kept on the field.
///
/// The struct must implement `Default`; its default values become the schema
/// defaults.
#[macro_export]
macro_rules! thirdroom_component {
    (
        $(#[$struct_attr:meta])*
        $svis:vis struct $name:ident {
            $(
                $(#[$($field_attr:tt)*])*
                $fvis:vis $field:ident : $fty:ty
            ),* $(,)?
        }
    ) => {
        $crate::__thirdroom_component_struct! {
            [$(#[$struct_attr])* $svis struct $name]
            []
            $( { [$(#[$($field_attr)*])*] [] $fvis $field : $fty } )*
        }

        impl $crate::scene::component::Component for $name {
            fn component_type(&self) -> $crate::scene::component::ComponentType {
                $crate::scene::component::ComponentType::of::<$name>()
            }

            fn field_value(&self, field: &str) -> Option<$crate::scene::component::FieldValue> {
                match field {
                    $(
                        stringify!($field) => Some(
                            <$fty as $crate::scene::component::FieldKind>::to_field_value(&self.$field)
                        ),
                    )*
                    _ => None,
                }
            }
        }

        impl $crate::scene::component::ComponentDescriptor for $name {
            const NAME: &'static str = stringify!($name);

            fn fields() -> Vec<$crate::scene::component::FieldInfo> {
                vec![
                    $(
                        $crate::scene::component::FieldInfo::new(
                            stringify!($field),
                            <$fty as $crate::scene::component::FieldKind>::FIELD_TYPE,
                            $crate::scene::component::FieldFlags::from_markers(
                                stringify!($field),
                                stringify!($fvis) == "pub",
                                &[$(stringify!($($field_attr)*)),*],
                            ),
                        ),
                    )*
                ]
            }
        }
    };
}

/// Emits the struct for [`thirdroom_component!`] with field markers removed.
///
/// Each field arrives as `{ [pending attrs] [kept attrs] vis name: ty }` and
/// is moved into the done list once its pending attributes are used up.
#[doc(hidden)]
#[macro_export]
macro_rules! __thirdroom_component_struct {
    (
        [$(#[$struct_attr:meta])* $svis:vis struct $name:ident]
        [$($done:tt)*]
    ) => {
        $(#[$struct_attr])*
        $svis struct $name {
            $($done)*
        }
    };
    (
        $head:tt [$($done:tt)*]
        { [] [$($kept:tt)*] $fvis:vis $field:ident : $fty:ty }
        $($rest:tt)*
    ) => {
        $crate::__thirdroom_component_struct! {
            $head [$($done)* $($kept)* $fvis $field : $fty,] $($rest)*
        }
    };
    // a bare identifier is a marker
    (
        $head:tt $done:tt
        { [#[$marker:ident] $($attrs:tt)*] $kept:tt $fvis:vis $field:ident : $fty:ty }
        $($rest:tt)*
    ) => {
        $crate::__thirdroom_component_struct! {
            $head $done { [$($attrs)*] $kept $fvis $field : $fty } $($rest)*
        }
    };
    (
        $head:tt $done:tt
        { [#[$($attr:tt)*] $($attrs:tt)*] [$($kept:tt)*] $fvis:vis $field:ident : $fty:ty }
        $($rest:tt)*
    ) => {
        $crate::__thirdroom_component_struct! {
            $head $done { [$($attrs)*] [$($kept)* #[$($attr)*]] $fvis $field : $fty } $($rest)*
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    crate::thirdroom_component! {
        #[derive(Debug, Clone)]
        pub struct Lamp {
            pub on: bool,
            #[hide]
            pub flicker: f32,
            #[serialize]
            brightness: f32,
            pub enabled: bool,
            #[obsolete]
            pub old_color: Vec3,
        }
    }

    impl Default for Lamp {
        fn default() -> Self {
            Self {
                on: true,
                flicker: 0.0,
                brightness: 2.5,
                enabled: true,
                old_color: Vec3::ONE,
            }
        }
    }

    #[test]
    fn test_macro_field_flags() {
        let fields = Lamp::fields();
        assert_eq!(fields.len(), 5);
        assert!(fields[0].flags.contains(FieldFlags::PUBLIC));
        assert!(fields[1].flags.contains(FieldFlags::HIDDEN));
        assert!(!fields[2].flags.contains(FieldFlags::PUBLIC));
        assert!(fields[2].flags.contains(FieldFlags::SERIALIZED));
        assert!(fields[3].flags.contains(FieldFlags::INHERITED));
        assert!(fields[4].flags.contains(FieldFlags::DEPRECATED));
    }

    #[test]
    fn test_eligible_fields() {
        let ty = ComponentType::of::<Lamp>();
        let names: Vec<_> = ty.eligible_fields().iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["on", "brightness"]);
    }

    crate::thirdroom_component! {
        /// A lamp with documented fields.
        #[derive(Debug, Clone, Default)]
        pub struct DocumentedLamp {
            /// Whether the lamp starts switched on.
            pub on: bool,
            /// Flicker amount, editor only.
            #[hide]
            pub flicker: f32,
            #[serialize]
            /// Kept even though private.
            #[allow(dead_code)]
            brightness: f32,
        }
    }

    #[test]
    fn test_macro_accepts_field_docs() {
        let fields = DocumentedLamp::fields();
        let names: Vec<_> = fields.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["on", "flicker", "brightness"]);
        assert_eq!(fields[0].flags, FieldFlags::PUBLIC);
        assert_eq!(fields[1].flags, FieldFlags::PUBLIC | FieldFlags::HIDDEN);
        assert_eq!(fields[2].flags, FieldFlags::SERIALIZED);

        let lamp = DocumentedLamp::default();
        assert_eq!(lamp.field_value("brightness"), Some(FieldValue::Float32(0.0)));
    }

    #[test]
    fn test_field_value_lookup() {
        let lamp = Lamp::default();
        assert_eq!(lamp.field_value("brightness"), Some(FieldValue::Float32(2.5)));
        assert_eq!(lamp.field_value("missing"), None);
    }
}
