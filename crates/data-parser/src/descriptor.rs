//! Parser descriptors: the immutable metadata records driving parse,
//! dump, schema generation, and the startup self-check.
//!
//! One descriptor exists per [`TypeId`]. A descriptor pairs metadata (its
//! model, linked-field tables, flag tables, prerequisites, schema base
//! type) with a [`VTable`] of monomorphized function pointers. Byte-offset
//! field addressing from the C lineage is replaced by accessor function
//! pointers that downcast the parent struct and hand back one field; the
//! one-descriptor-per-field table structure is unchanged.

use crate::args::ParserArgs;
use crate::error::ParseError;
use crate::resolvers::Needs;
use crate::version::ProtocolVersion;
use serde::Serialize;
use serde_json::Value;
use std::any::Any;

macro_rules! type_ids {
    ($($name:ident),* $(,)?) => {
        /// Closed enumeration naming every parser. `Invalid` is reserved
        /// and rejected by the entry points.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum TypeId {
            Invalid,
            $($name),*
        }

        impl TypeId {
            /// Every registerable id, for enumeration and the self-check.
            pub const ALL: &'static [TypeId] = &[$(TypeId::$name),*];

            pub fn name(self) -> &'static str {
                match self {
                    TypeId::Invalid => "Invalid",
                    $(TypeId::$name => stringify!($name)),*
                }
            }
        }
    };
}

type_ids! {
    // Leaf scalars
    String,
    CsvString,
    Bool,
    UInt16,
    UInt32,
    UInt64,
    Int32,
    Int64,
    Float64,
    // Tri-state wrapped numerics
    UInt16NoVal,
    UInt32NoVal,
    UInt64NoVal,
    Int64NoVal,
    Float64NoVal,
    Bool16NoVal,
    TimestampNoVal,
    // Specialized leaves
    Timestamp,
    SignalName,
    BitmapString,
    HostlistExpr,
    ProcessExitCode,
    MemoryPerCpu,
    MemoryPerNode,
    Nice,
    CoreSpec,
    ThreadSpec,
    Hold,
    QosId,
    QosName,
    AssocId,
    UserId,
    GroupId,
    TresString,
    TresNct,
    BurstBufferSize,
    // Flag arrays
    JobFlags,
    NodeStates,
    PartitionStates,
    QosFlags,
    ReservationFlags,
    JobShared,
    BurstBufferState,
    // Composites
    JobDescription,
    JobDescRequired,
    JobInfo,
    Node,
    Partition,
    Qos,
    QosLimits,
    Association,
    AssocShort,
    Tres,
    Reservation,
    BurstBufferStatus,
    BurstBufferJobEntry,
    // Containers and pointers
    QosList,
    TresList,
    AssocList,
    NodeList,
    PartitionList,
    ReservationList,
    BurstBufferEntryList,
    StringArray,
    UInt32Array,
    AssocShortPtr,
    BitmapPtr,
}

/// OpenAPI base type a descriptor maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenApiType {
    Invalid,
    Object,
    Array,
    String,
    Int32,
    Int64,
    Double,
    Bool,
    Number,
}

/// How a descriptor is interpreted by the engines.
#[derive(Debug, Clone, Copy)]
pub enum Model {
    /// Leaf with its own parse/dump pair operating on one field.
    Simple,
    /// Leaf pair operating on the whole enclosing struct.
    Complex,
    /// Struct walked through a linked-field table.
    Composite { fields: &'static [LinkedField] },
    /// Integer bitfield rendered as an array of named flags, or a single
    /// string when `single_flag`.
    FlagArray {
        bits: &'static [FlagBit],
        /// Native width in bits, for the self-check.
        width: u8,
        single_flag: bool,
    },
    /// Owned collection of `element` values.
    List { element: TypeId },
    /// Inline sequential array (NUL-terminated in the C lineage).
    NtArray { element: TypeId },
    /// Array of heap-owned elements (NUL-terminated pointer array in the
    /// C lineage).
    NtPtrArray { element: TypeId },
    /// Single-level nullable wrapper.
    Ptr { target: TypeId, allow_null: bool },
}

impl Model {
    pub fn kind_name(&self) -> &'static str {
        match self {
            Model::Simple => "simple",
            Model::Complex => "complex",
            Model::Composite { .. } => "composite",
            Model::FlagArray { .. } => "flag_array",
            Model::List { .. } => "list",
            Model::NtArray { .. } => "nt_array",
            Model::NtPtrArray { .. } => "nt_ptr_array",
            Model::Ptr { .. } => "ptr",
        }
    }
}

/// Entry kind of a linked-field table row.
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    /// Links one struct field (or a whole-struct projection) to a type.
    Linked { type_id: TypeId },
    /// Field no longer exists; accepted and ignored from old dialects.
    Removed { since: ProtocolVersion },
    /// Internal field, unreachable from wire keys.
    Skip,
}

/// Locates the native value a linked field operates on.
#[derive(Clone, Copy)]
pub enum FieldAccessor {
    /// One field of the parent struct.
    Field {
        get: fn(&dyn Any) -> Option<&dyn Any>,
        get_mut: fn(&mut dyn Any) -> Option<&mut dyn Any>,
    },
    /// The whole parent struct (complex projections).
    Whole,
    /// No native storage (removed / skip rows).
    None,
}

impl std::fmt::Debug for FieldAccessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldAccessor::Field { .. } => f.write_str("Field"),
            FieldAccessor::Whole => f.write_str("Whole"),
            FieldAccessor::None => f.write_str("None"),
        }
    }
}

/// One row of a composite descriptor's field table.
#[derive(Debug, Clone, Copy)]
pub struct LinkedField {
    /// Wire key in the enclosing dict.
    pub key: &'static str,
    /// Native field identifier, for diagnostics and overload grouping.
    pub native_name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    /// Sibling rows sharing `native_name` (1 = not overloaded).
    pub overloads: u8,
    /// Deprecation warning trigger; removal lives in `FieldKind::Removed`.
    pub deprecated: Option<ProtocolVersion>,
    pub accessor: FieldAccessor,
    pub description: &'static str,
}

impl LinkedField {
    pub const fn new(key: &'static str, native_name: &'static str, type_id: TypeId) -> Self {
        Self {
            key,
            native_name,
            kind: FieldKind::Linked { type_id },
            required: false,
            overloads: 1,
            deprecated: None,
            accessor: FieldAccessor::None,
            description: "",
        }
    }

    pub const fn removed(key: &'static str, since: ProtocolVersion) -> Self {
        Self {
            key,
            native_name: "",
            kind: FieldKind::Removed { since },
            required: false,
            overloads: 1,
            deprecated: None,
            accessor: FieldAccessor::None,
            description: "",
        }
    }

    pub const fn skip(native_name: &'static str) -> Self {
        Self {
            key: "",
            native_name,
            kind: FieldKind::Skip,
            required: false,
            overloads: 1,
            deprecated: None,
            accessor: FieldAccessor::None,
            description: "",
        }
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn overloaded(mut self, count: u8) -> Self {
        self.overloads = count;
        self
    }

    pub const fn deprecated_since(mut self, version: ProtocolVersion) -> Self {
        self.deprecated = Some(version);
        self
    }

    pub const fn with_accessor(mut self, accessor: FieldAccessor) -> Self {
        self.accessor = accessor;
        self
    }

    pub const fn whole(mut self) -> Self {
        self.accessor = FieldAccessor::Whole;
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

/// Matching rule of a flag table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    /// Present iff `(field & mask) & value == value`.
    Bit,
    /// Selected iff `(field & mask) == value`; at most one per table.
    Equal,
}

/// One row of a flag-array descriptor's bit table.
#[derive(Debug, Clone, Copy)]
pub struct FlagBit {
    pub kind: FlagKind,
    /// Wire token.
    pub name: &'static str,
    pub value: u64,
    pub mask: u64,
    /// Accepted on parse but omitted from dumps and the schema.
    pub hidden: bool,
    pub description: &'static str,
}

impl FlagBit {
    pub const fn bit(name: &'static str, value: u64) -> Self {
        Self {
            kind: FlagKind::Bit,
            name,
            value,
            mask: value,
            hidden: false,
            description: "",
        }
    }

    pub const fn equal(name: &'static str, value: u64, mask: u64) -> Self {
        Self {
            kind: FlagKind::Equal,
            name,
            value,
            mask,
            hidden: false,
            description: "",
        }
    }

    pub const fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

pub type ParseFn = fn(&mut dyn Any, &Value, &mut ParserArgs) -> Result<(), ParseError>;
/// `Ok(None)` omits the key from the enclosing dict (inactive overload
/// variants, removed fields, disabled codecs).
pub type DumpFn = fn(&dyn Any, &mut ParserArgs) -> Result<Option<Value>, ParseError>;
pub type NewFn = fn() -> Box<dyn Any>;

/// Monomorphized operation table of one descriptor.
#[derive(Clone, Copy)]
pub struct VTable {
    pub new: NewFn,
    pub parse: ParseFn,
    pub dump: DumpFn,
}

/// One registry entry.
pub struct Descriptor {
    pub type_id: TypeId,
    /// Wire-facing type name, for diagnostics and the schema.
    pub type_name: &'static str,
    /// Native Rust type name.
    pub native_name: &'static str,
    pub model: Model,
    pub needs: Needs,
    pub openapi: OpenApiType,
    pub description: &'static str,
    pub vtable: VTable,
}

impl Descriptor {
    pub(crate) const fn new(
        type_id: TypeId,
        type_name: &'static str,
        native_name: &'static str,
        model: Model,
        openapi: OpenApiType,
        vtable: VTable,
    ) -> Self {
        Self {
            type_id,
            type_name,
            native_name,
            model,
            needs: Needs::empty(),
            openapi,
            description: "",
            vtable,
        }
    }

    pub(crate) const fn with_needs(mut self, needs: Needs) -> Self {
        self.needs = needs;
        self
    }

    pub(crate) const fn describe(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }
}

impl std::fmt::Debug for Descriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Descriptor")
            .field("type_id", &self.type_id)
            .field("type_name", &self.type_name)
            .field("native_name", &self.native_name)
            .field("model", &self.model.kind_name())
            .field("needs", &self.needs)
            .field("openapi", &self.openapi)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_excludes_invalid() {
        assert!(!TypeId::ALL.contains(&TypeId::Invalid));
        assert!(TypeId::ALL.contains(&TypeId::JobDescription));
    }

    #[test]
    fn test_flag_bit_builders() {
        let b = FlagBit::bit("DRAIN", 0x10);
        assert_eq!(b.kind, FlagKind::Bit);
        assert_eq!(b.mask, 0x10);
        let e = FlagBit::equal("MIXED", 0x5, 0xf).hide();
        assert_eq!(e.kind, FlagKind::Equal);
        assert!(e.hidden);
    }

    #[test]
    fn test_linked_field_builders() {
        let f = LinkedField::new("nice", "nice", TypeId::Nice)
            .required()
            .overloaded(2);
        assert!(f.required);
        assert_eq!(f.overloads, 2);
        assert!(matches!(f.kind, FieldKind::Linked { type_id: TypeId::Nice }));
    }
}
