//! Burst buffer descriptor tables, fed by the plugin's line parser.

use crate::descriptor::{Descriptor, FlagBit, LinkedField, Model, OpenApiType, TypeId};
use crate::macros::{composite_vtable, field_of, flag_vtable, list_vtable};
use crate::model::burst::*;
use crate::model::{BurstBufferJobEntry, BurstBufferStatus};
use once_cell::sync::Lazy;

static BB_STATE_BITS: &[FlagBit] = &[
    FlagBit::equal("ALLOCATED", BB_STATE_ALLOCATED as u64, 0xffff),
    FlagBit::equal("STAGING_IN", BB_STATE_STAGING_IN as u64, 0xffff),
    FlagBit::equal("STAGED_IN", BB_STATE_STAGED_IN as u64, 0xffff),
    FlagBit::equal("RUNNING", BB_STATE_RUNNING as u64, 0xffff),
    FlagBit::equal("STAGING_OUT", BB_STATE_STAGING_OUT as u64, 0xffff),
    FlagBit::equal("STAGED_OUT", BB_STATE_STAGED_OUT as u64, 0xffff),
];

fn status_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("allocations", "allocations", TypeId::BurstBufferEntryList)
                .with_accessor(field_of!(BurstBufferStatus, allocations)),
            LinkedField::new("total_size", "total_size", TypeId::BurstBufferSize)
                .required()
                .with_accessor(field_of!(BurstBufferStatus, total_size)),
        ]
    });
    FIELDS.as_slice()
}

fn entry_fields() -> &'static [LinkedField] {
    static FIELDS: Lazy<Vec<LinkedField>> = Lazy::new(|| {
        vec![
            LinkedField::new("job_id", "job_id", TypeId::UInt32)
                .with_accessor(field_of!(BurstBufferJobEntry, job_id)),
            LinkedField::new("name", "name", TypeId::String)
                .with_accessor(field_of!(BurstBufferJobEntry, name))
                .describe("set for persistent buffers only"),
            LinkedField::new("size", "size", TypeId::BurstBufferSize)
                .with_accessor(field_of!(BurstBufferJobEntry, size)),
            LinkedField::new("state", "state", TypeId::BurstBufferState)
                .with_accessor(field_of!(BurstBufferJobEntry, state)),
            LinkedField::new("user_id", "user_id", TypeId::UInt32)
                .required()
                .with_accessor(field_of!(BurstBufferJobEntry, user_id)),
        ]
    });
    FIELDS.as_slice()
}

pub(crate) fn descriptors() -> Vec<Descriptor> {
    vec![
        Descriptor::new(
            TypeId::BurstBufferState,
            "BURST_BUFFER_STATE",
            "u16",
            Model::FlagArray {
                bits: BB_STATE_BITS,
                width: 16,
                single_flag: true,
            },
            OpenApiType::String,
            flag_vtable!(u16, TypeId::BurstBufferState),
        )
        .describe("stage lifecycle state"),
        Descriptor::new(
            TypeId::BurstBufferStatus,
            "BURST_BUFFER_STATUS",
            "BurstBufferStatus",
            Model::Composite {
                fields: status_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(BurstBufferStatus, TypeId::BurstBufferStatus),
        )
        .describe("snapshot reported by the external pool program"),
        Descriptor::new(
            TypeId::BurstBufferJobEntry,
            "BURST_BUFFER_JOB_ENTRY",
            "BurstBufferJobEntry",
            Model::Composite {
                fields: entry_fields(),
            },
            OpenApiType::Object,
            composite_vtable!(BurstBufferJobEntry, TypeId::BurstBufferJobEntry),
        ),
        Descriptor::new(
            TypeId::BurstBufferEntryList,
            "BURST_BUFFER_ENTRY_LIST",
            "Vec<BurstBufferJobEntry>",
            Model::List {
                element: TypeId::BurstBufferJobEntry,
            },
            OpenApiType::Array,
            list_vtable!(BurstBufferJobEntry, TypeId::BurstBufferEntryList),
        ),
    ]
}
