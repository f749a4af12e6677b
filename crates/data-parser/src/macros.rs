//! Table-building macros.
//!
//! The registry tables are declarative: every row wires metadata to
//! monomorphized function pointers. These macros generate the small shim
//! functions so the tables stay readable.

/// Accessor pair locating one field of a parent struct.
macro_rules! field_of {
    ($owner:ty, $field:ident) => {{
        fn get(parent: &dyn ::std::any::Any) -> Option<&dyn ::std::any::Any> {
            parent
                .downcast_ref::<$owner>()
                .map(|o| &o.$field as &dyn ::std::any::Any)
        }
        fn get_mut(parent: &mut dyn ::std::any::Any) -> Option<&mut dyn ::std::any::Any> {
            parent
                .downcast_mut::<$owner>()
                .map(|o| &mut o.$field as &mut dyn ::std::any::Any)
        }
        $crate::descriptor::FieldAccessor::Field { get, get_mut }
    }};
}

/// VTable for a leaf codec with typed parse/dump functions.
macro_rules! leaf_vtable {
    ($native:ty, $parse:path, $dump:path) => {{
        fn new() -> Box<dyn ::std::any::Any> {
            Box::new(<$native>::default())
        }
        fn parse(
            dst: &mut dyn ::std::any::Any,
            src: &::serde_json::Value,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<(), $crate::error::ParseError> {
            let dst = dst
                .downcast_mut::<$native>()
                .ok_or($crate::error::ParseError::NativeMismatch(stringify!($native)))?;
            $parse(dst, src, args)
        }
        fn dump(
            src: &dyn ::std::any::Any,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<Option<::serde_json::Value>, $crate::error::ParseError> {
            let src = src
                .downcast_ref::<$native>()
                .ok_or($crate::error::ParseError::NativeMismatch(stringify!($native)))?;
            $dump(src, args)
        }
        $crate::descriptor::VTable { new, parse, dump }
    }};
}

/// VTable routing a composite descriptor through the field-walk engine.
macro_rules! composite_vtable {
    ($native:ty, $id:expr) => {{
        fn new() -> Box<dyn ::std::any::Any> {
            Box::new(<$native>::default())
        }
        fn parse(
            dst: &mut dyn ::std::any::Any,
            src: &::serde_json::Value,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<(), $crate::error::ParseError> {
            $crate::composite::parse_struct($id, dst, src, args)
        }
        fn dump(
            src: &dyn ::std::any::Any,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<Option<::serde_json::Value>, $crate::error::ParseError> {
            $crate::composite::dump_struct($id, src, args)
        }
        $crate::descriptor::VTable { new, parse, dump }
    }};
}

/// VTable widening a native flag field to u64 for the flag-array engine.
macro_rules! flag_vtable {
    ($native:ty, $id:expr) => {{
        fn new() -> Box<dyn ::std::any::Any> {
            Box::new(<$native>::default())
        }
        fn parse(
            dst: &mut dyn ::std::any::Any,
            src: &::serde_json::Value,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<(), $crate::error::ParseError> {
            let dst = dst
                .downcast_mut::<$native>()
                .ok_or($crate::error::ParseError::NativeMismatch(stringify!($native)))?;
            let mut bits = *dst as u64;
            $crate::flags::parse_flags($id, &mut bits, src, args)?;
            *dst = bits as $native;
            Ok(())
        }
        fn dump(
            src: &dyn ::std::any::Any,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<Option<::serde_json::Value>, $crate::error::ParseError> {
            let src = src
                .downcast_ref::<$native>()
                .ok_or($crate::error::ParseError::NativeMismatch(stringify!($native)))?;
            $crate::flags::dump_flags($id, *src as u64, args)
        }
        $crate::descriptor::VTable { new, parse, dump }
    }};
}

/// VTable for a list (or inline array) of `$elem` values.
macro_rules! list_vtable {
    ($elem:ty, $id:expr) => {{
        fn new() -> Box<dyn ::std::any::Any> {
            Box::new(Vec::<$elem>::new())
        }
        fn parse(
            dst: &mut dyn ::std::any::Any,
            src: &::serde_json::Value,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<(), $crate::error::ParseError> {
            $crate::containers::parse_sequence::<$elem>($id, dst, src, args)
        }
        fn dump(
            src: &dyn ::std::any::Any,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<Option<::serde_json::Value>, $crate::error::ParseError> {
            $crate::containers::dump_sequence::<$elem>($id, src, args)
        }
        $crate::descriptor::VTable { new, parse, dump }
    }};
}

/// VTable for a nullable single-level pointer wrapper.
macro_rules! ptr_vtable {
    ($target:ty, $id:expr) => {{
        fn new() -> Box<dyn ::std::any::Any> {
            Box::new(Option::<$target>::None)
        }
        fn parse(
            dst: &mut dyn ::std::any::Any,
            src: &::serde_json::Value,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<(), $crate::error::ParseError> {
            $crate::containers::parse_ptr::<$target>($id, dst, src, args)
        }
        fn dump(
            src: &dyn ::std::any::Any,
            args: &mut $crate::args::ParserArgs,
        ) -> Result<Option<::serde_json::Value>, $crate::error::ParseError> {
            $crate::containers::dump_ptr::<$target>($id, src, args)
        }
        $crate::descriptor::VTable { new, parse, dump }
    }};
}

pub(crate) use {composite_vtable, field_of, flag_vtable, leaf_vtable, list_vtable, ptr_vtable};
