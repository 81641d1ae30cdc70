//! The schema registry.
//!
//! A [Registry] is built once through a [RegistryBuilder], validated, and is
//! read-only from then on. It holds no interior mutability, so a shared
//! reference can be used from any number of threads at once.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{
    codec::consts::MAX_VARIANTS,
    config::Config,
    err::{Result, SchemaError},
};

use super::{EnumLayout, RegistryEntry, SchemaCodec, StructLayout, TypeRef, Value, WireSchema};

/// Collects registry entries before validation.
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: BTreeMap<String, RegistryEntry>,
    conflicts: Vec<String>,
}

impl RegistryBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry.
    ///
    /// Returns `true` if `type_id` was not registered before. Registering the
    /// same layout twice is a no-op, registering a different one is reported
    /// by [RegistryBuilder::build].
    pub fn insert(&mut self, type_id: impl Into<String>, entry: RegistryEntry) -> bool {
        let type_id = type_id.into();

        match self.entries.get(&type_id) {
            Some(existing) => {
                if *existing != entry {
                    self.conflicts.push(type_id);
                }
                false
            }
            None => {
                self.entries.insert(type_id, entry);
                true
            }
        }
    }

    pub fn define_struct(&mut self, type_id: impl Into<String>, layout: StructLayout) -> &mut Self {
        self.insert(type_id, RegistryEntry::Struct(layout));
        self
    }

    pub fn define_enum(&mut self, type_id: impl Into<String>, layout: EnumLayout) -> &mut Self {
        self.insert(type_id, RegistryEntry::Enum(layout));
        self
    }

    /// Register `T` and every type it refers to.
    pub fn register<T: WireSchema>(&mut self) -> &mut Self {
        T::register(self);
        self
    }

    pub fn contains(&self, type_id: &str) -> bool {
        self.entries.contains_key(type_id)
    }

    /// Validate the collected entries and freeze them.
    pub fn build(self) -> std::result::Result<Registry, SchemaError> {
        if let Some(type_id) = self.conflicts.into_iter().next() {
            return Err(SchemaError::Duplicate(type_id));
        }

        let registry = Registry {
            entries: self.entries,
        };
        registry.validate().map_err(|e| {
            log::debug!("rejected schema: {}", e);
            e
        })?;
        log::debug!("built registry with {} entries", registry.len());

        Ok(registry)
    }
}

/// A validated, immutable mapping from type id to layout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Registry {
    entries: BTreeMap<String, RegistryEntry>,
}

/// Visit state during the containment cycle search.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    InProgress,
    Done,
}

impl Registry {
    /// Build a registry holding `T` and everything it refers to.
    pub fn of<T: WireSchema>() -> std::result::Result<Self, SchemaError> {
        let mut builder = RegistryBuilder::new();
        builder.register::<T>();
        builder.build()
    }

    /// Look up the entry for `type_id`.
    pub fn resolve(&self, type_id: &str) -> std::result::Result<&RegistryEntry, SchemaError> {
        self.entries
            .get(type_id)
            .ok_or_else(|| SchemaError::Unresolved(type_id.to_string()))
    }

    pub fn get(&self, type_id: &str) -> Option<&RegistryEntry> {
        self.entries.get(type_id)
    }

    /// Entry of a type that implements [WireSchema].
    pub fn entry_of<T: WireSchema>(&self) -> Option<&RegistryEntry> {
        match T::type_ref() {
            TypeRef::Named(type_id) => self.get(&type_id),
            _ => None,
        }
    }

    /// Registered type ids, sorted.
    pub fn type_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// A codec over this registry with the given decode options.
    pub fn codec(&self, config: Config) -> SchemaCodec<'_> {
        SchemaCodec::new(self, config)
    }

    /// Encode a root value of type `type_id`.
    pub fn serialize(&self, type_id: &str, value: &Value) -> Result<Vec<u8>> {
        self.codec(Config::default()).serialize(type_id, value)
    }

    /// Decode a root value of type `type_id`, which must span all of `bytes`.
    pub fn deserialize(&self, type_id: &str, bytes: &[u8]) -> Result<Value> {
        self.codec(Config::default()).deserialize(type_id, bytes)
    }

    /// Render the layout of `type_id`, e.g. `struct NestedStruct { count: u32, note: string }`.
    pub fn describe(&self, type_id: &str) -> Option<String> {
        self.get(type_id).map(|entry| match entry {
            RegistryEntry::Struct(layout) => format!("struct {} {}", type_id, layout),
            RegistryEntry::Enum(layout) => format!("enum {} {}", type_id, layout),
        })
    }

    /// Encoded size of `ty` when it is the same for every value.
    pub fn fixed_size(&self, ty: &TypeRef) -> std::result::Result<Option<usize>, SchemaError> {
        match ty {
            TypeRef::Primitive(kind) => Ok(kind.fixed_size()),
            TypeRef::FixedBytes(len) => Ok(Some(*len)),
            TypeRef::Sequence(_) | TypeRef::Option(_) => Ok(None),
            TypeRef::Named(type_id) => match self.resolve(type_id)? {
                RegistryEntry::Struct(layout) => self.layout_size(layout),
                RegistryEntry::Enum(layout) => {
                    let mut sizes = HashSet::new();
                    for variant in &layout.variants {
                        match self.layout_size(&variant.payload)? {
                            Some(size) => sizes.insert(size),
                            None => return Ok(None),
                        };
                    }

                    match sizes.len() {
                        1 => Ok(sizes.into_iter().next().map(|size| 1 + size)),
                        _ => Ok(None),
                    }
                }
            },
        }
    }

    fn layout_size(&self, layout: &StructLayout) -> std::result::Result<Option<usize>, SchemaError> {
        let mut total = 0;
        for field in &layout.fields {
            match self.fixed_size(&field.ty)? {
                Some(size) => total += size,
                None => return Ok(None),
            }
        }

        Ok(Some(total))
    }

    /// Check every reference resolves, enums fit a u8 discriminant, names are
    /// unique, and no type contains itself without an indirection.
    fn validate(&self) -> std::result::Result<(), SchemaError> {
        for (type_id, entry) in &self.entries {
            if let RegistryEntry::Enum(layout) = entry {
                if layout.variants.len() > MAX_VARIANTS {
                    return Err(SchemaError::TooManyVariants {
                        type_id: type_id.clone(),
                        count: layout.variants.len(),
                    });
                }

                let mut names = HashSet::new();
                for variant in &layout.variants {
                    if !names.insert(variant.name.as_str()) {
                        return Err(SchemaError::Duplicate(format!("{}::{}", type_id, variant.name)));
                    }
                }
            }

            for layout in entry.layouts() {
                let mut names = HashSet::new();
                for field in &layout.fields {
                    if !names.insert(field.name.as_str()) {
                        return Err(SchemaError::Duplicate(format!("{}.{}", type_id, field.name)));
                    }
                    self.check_resolves(&field.ty)?;
                }
            }
        }

        let mut marks = HashMap::new();
        for type_id in self.entries.keys() {
            self.check_containment(type_id, &mut marks)?;
        }

        // sizes are only computable once containment is known to be finite
        for (type_id, entry) in &self.entries {
            for layout in entry.layouts() {
                for field in &layout.fields {
                    self.check_element_sizes(type_id, &field.name, &field.ty)?;
                }
            }
        }

        Ok(())
    }

    /// Sequence elements must occupy at least one byte, or the count prefix
    /// alone would decide how much work a decode does.
    fn check_element_sizes(
        &self,
        type_id: &str,
        field: &str,
        ty: &TypeRef,
    ) -> std::result::Result<(), SchemaError> {
        match ty {
            TypeRef::Sequence(element) => {
                if self.fixed_size(element)? == Some(0) {
                    return Err(SchemaError::ZeroSizedElement {
                        owner: format!("{}.{}", type_id, field),
                        element: element.to_string(),
                    });
                }
                self.check_element_sizes(type_id, field, element)
            }
            TypeRef::Option(inner) => self.check_element_sizes(type_id, field, inner),
            TypeRef::Primitive(_) | TypeRef::FixedBytes(_) | TypeRef::Named(_) => Ok(()),
        }
    }

    fn check_resolves(&self, ty: &TypeRef) -> std::result::Result<(), SchemaError> {
        match ty {
            TypeRef::Primitive(_) | TypeRef::FixedBytes(_) => Ok(()),
            TypeRef::Sequence(inner) | TypeRef::Option(inner) => self.check_resolves(inner),
            TypeRef::Named(type_id) => self.resolve(type_id).map(|_| ()),
        }
    }

    /// Depth-first search over direct containment edges. Sequences and
    /// options bound recursion by the data, so they are not followed.
    fn check_containment<'r>(
        &'r self,
        type_id: &'r str,
        marks: &mut HashMap<&'r str, Mark>,
    ) -> std::result::Result<(), SchemaError> {
        match marks.get(type_id) {
            Some(Mark::Done) => return Ok(()),
            Some(Mark::InProgress) => {
                return Err(SchemaError::UnboundedRecursion(type_id.to_string()))
            }
            None => (),
        }

        marks.insert(type_id, Mark::InProgress);
        for layout in self.resolve(type_id)?.layouts() {
            for field in &layout.fields {
                if let TypeRef::Named(child) = &field.ty {
                    self.check_containment(child, marks)?;
                }
            }
        }
        marks.insert(type_id, Mark::Done);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::PrimitiveKind;

    fn nested_layout() -> StructLayout {
        StructLayout::new()
            .field("count", TypeRef::U32)
            .field("note", TypeRef::STRING)
    }

    #[test]
    fn test_build_and_resolve() {
        let mut builder = RegistryBuilder::new();
        builder
            .define_struct("NestedStruct", nested_layout())
            .define_enum(
                "SimpleEnum",
                EnumLayout::new()
                    .unit_variant("First")
                    .unit_variant("Second")
                    .unit_variant("Third"),
            );
        let registry = builder.build().unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.type_ids().collect::<Vec<_>>(),
            ["NestedStruct", "SimpleEnum"]
        );
        assert_eq!(
            registry.resolve("NestedStruct"),
            Ok(&RegistryEntry::Struct(nested_layout()))
        );
        assert_eq!(
            registry.resolve("Missing"),
            Err(SchemaError::Unresolved("Missing".to_string()))
        );
        assert_eq!(
            registry.describe("SimpleEnum").unwrap(),
            "enum SimpleEnum { First, Second, Third }"
        );
    }

    #[test]
    fn test_unresolved_reference() {
        let mut builder = RegistryBuilder::new();
        builder.define_struct(
            "Holder",
            StructLayout::new().field("keys", TypeRef::sequence(TypeRef::named("PubkeyBytes"))),
        );

        assert_eq!(
            builder.build(),
            Err(SchemaError::Unresolved("PubkeyBytes".to_string()))
        );
    }

    #[test]
    fn test_conflicting_definitions() {
        let mut builder = RegistryBuilder::new();
        assert!(builder.insert("A", RegistryEntry::Struct(nested_layout())));
        assert!(!builder.insert("A", RegistryEntry::Struct(nested_layout())));
        assert!(!builder.insert("A", RegistryEntry::Struct(StructLayout::new())));

        assert_eq!(builder.build(), Err(SchemaError::Duplicate("A".to_string())));

        let mut builder = RegistryBuilder::new();
        builder.define_struct(
            "B",
            StructLayout::new()
                .field("x", TypeRef::U8)
                .field("x", TypeRef::U16),
        );
        assert_eq!(builder.build(), Err(SchemaError::Duplicate("B.x".to_string())));
    }

    #[test]
    fn test_variant_limit() {
        let mut layout = EnumLayout::new();
        for i in 0..MAX_VARIANTS {
            layout = layout.unit_variant(format!("V{}", i));
        }

        let mut builder = RegistryBuilder::new();
        builder.define_enum("Wide", layout.clone());
        assert!(builder.build().is_ok());

        let mut builder = RegistryBuilder::new();
        builder.define_enum("TooWide", layout.unit_variant("Overflow"));
        assert_eq!(
            builder.build(),
            Err(SchemaError::TooManyVariants {
                type_id: "TooWide".to_string(),
                count: 257
            })
        );
    }

    #[test]
    fn test_sequence_of_zero_sized_elements() {
        let mut builder = RegistryBuilder::new();
        builder
            .define_struct("Unit", StructLayout::new())
            .define_struct(
                "Holder",
                StructLayout::new().field("items", TypeRef::sequence(TypeRef::named("Unit"))),
            );
        assert_eq!(
            builder.build(),
            Err(SchemaError::ZeroSizedElement {
                owner: "Holder.items".to_string(),
                element: "Unit".to_string(),
            })
        );

        // nested inside an option, and a fixed array of no bytes
        let mut builder = RegistryBuilder::new();
        builder.define_struct(
            "Nested",
            StructLayout::new().field(
                "maybe",
                TypeRef::option(TypeRef::sequence(TypeRef::sequence(TypeRef::fixed(0)))),
            ),
        );
        assert_eq!(
            builder.build(),
            Err(SchemaError::ZeroSizedElement {
                owner: "Nested.maybe".to_string(),
                element: "[u8; 0]".to_string(),
            })
        );

        // options always take their presence byte
        let mut builder = RegistryBuilder::new();
        builder
            .define_struct("Unit", StructLayout::new())
            .define_struct(
                "Holder",
                StructLayout::new().field(
                    "items",
                    TypeRef::sequence(TypeRef::option(TypeRef::named("Unit"))),
                ),
            );
        assert!(builder.build().is_ok());
    }

    #[test]
    fn test_recursion_needs_indirection() {
        // Node { children: Vec<Node> } terminates on the data
        let mut builder = RegistryBuilder::new();
        builder.define_struct(
            "Node",
            StructLayout::new()
                .field("value", TypeRef::U8)
                .field("children", TypeRef::sequence(TypeRef::named("Node")))
                .field("parent", TypeRef::option(TypeRef::named("Node"))),
        );
        assert!(builder.build().is_ok());

        // A { b: B }, B { a: A } never does
        let mut builder = RegistryBuilder::new();
        builder
            .define_struct("A", StructLayout::new().field("b", TypeRef::named("B")))
            .define_enum(
                "B",
                EnumLayout::new()
                    .unit_variant("Leaf")
                    .variant("Wrap", StructLayout::new().field("a", TypeRef::named("A"))),
            );
        assert!(matches!(
            builder.build(),
            Err(SchemaError::UnboundedRecursion(_))
        ));
    }

    #[test]
    fn test_fixed_size() {
        let mut builder = RegistryBuilder::new();
        builder
            .define_struct(
                "PubkeyBytes",
                StructLayout::new().field("bytes", TypeRef::fixed(32)),
            )
            .define_struct("NestedStruct", nested_layout())
            .define_enum(
                "Same",
                EnumLayout::new()
                    .variant("A", StructLayout::new().field("x", TypeRef::U64))
                    .variant("B", StructLayout::new().field("y", TypeRef::I64)),
            )
            .define_enum(
                "Ragged",
                EnumLayout::new()
                    .unit_variant("A")
                    .variant("B", StructLayout::new().field("y", TypeRef::U8)),
            );
        let registry = builder.build().unwrap();

        assert_eq!(registry.fixed_size(&TypeRef::named("PubkeyBytes")), Ok(Some(32)));
        assert_eq!(registry.fixed_size(&TypeRef::named("NestedStruct")), Ok(None));
        assert_eq!(registry.fixed_size(&TypeRef::named("Same")), Ok(Some(9)));
        assert_eq!(registry.fixed_size(&TypeRef::named("Ragged")), Ok(None));
        assert_eq!(
            registry.fixed_size(&TypeRef::Primitive(PrimitiveKind::Bool)),
            Ok(Some(1))
        );
    }
}
