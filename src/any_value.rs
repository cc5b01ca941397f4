use crate::table::DispatchTable;
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// A dispatch table with its output type erased
///
/// The registry holds tables for many output types in a single map, so each
/// one is stored behind `dyn Any` together with the `TypeId` of its output.
#[derive(Clone)]
pub(crate) struct AnyTable {
    output_id: TypeId,
    output_name: &'static str,
    table: Arc<dyn Any + Send + Sync>,
}

impl AnyTable {
    pub(crate) fn new<R: 'static>(table: Arc<DispatchTable<R>>) -> Self {
        Self {
            output_id: TypeId::of::<R>(),
            output_name: type_name::<R>(),
            table,
        }
    }

    /// Check if the table's implementations return `R`
    pub(crate) fn is_output<R: 'static>(&self) -> bool {
        self.output_id == TypeId::of::<R>()
    }

    pub(crate) fn output_name(&self) -> &'static str {
        self.output_name
    }

    /// Get the typed table if its implementations return `R`
    pub(crate) fn downcast<R: 'static>(&self) -> Option<Arc<DispatchTable<R>>> {
        if !self.is_output::<R>() {
            return None;
        }
        Arc::clone(&self.table).downcast::<DispatchTable<R>>().ok()
    }
}
