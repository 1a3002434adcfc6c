//! The variable store: a flat value vector with a global region followed
//! by a row-major entity × property matrix.

use ali_asm::{Value, VAL_NIL};
use ali_module::ModuleHeader;

/// Run-time variables of a session.
///
/// The first `num_globals` slots hold globals (the leading
/// [`crate::NUM_RESERVED_GLOBALS`] of which belong to the engine); the
/// rest form the entity matrix, addressed as
/// `num_globals + num_properties * entity + offset`. Every slot starts as
/// `nil` and reverts to `nil` on [`Variables::clear`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variables {
    num_globals: usize,
    num_properties: usize,
    vals: Vec<Value>,
}

impl Variables {
    /// Allocate the store described by a module header, all slots `nil`.
    pub fn new(header: &ModuleHeader) -> Self {
        Variables {
            num_globals: header.num_globals,
            num_properties: header.num_properties,
            vals: vec![VAL_NIL; header.num_vars()],
        }
    }

    /// Total number of slots.
    pub fn len(&self) -> usize {
        self.vals.len()
    }

    /// Whether the store has no slots at all.
    pub fn is_empty(&self) -> bool {
        self.vals.is_empty()
    }

    /// Reset every slot to `nil`.
    pub fn clear(&mut self) {
        self.vals.fill(VAL_NIL);
    }

    /// Read a slot by flat index.
    pub fn get(&self, index: usize) -> Option<Value> {
        self.vals.get(index).copied()
    }

    /// Write a slot by flat index.
    pub fn set(&mut self, index: usize, value: Value) -> Option<()> {
        self.vals.get_mut(index).map(|slot| *slot = value)
    }

    /// Flat index of an entity's property slot, if it is in range.
    ///
    /// Both the entity number and the offset come straight from the
    /// story's bytecode, so the arithmetic is done wide and checked
    /// against the store's bounds.
    pub fn slot_index(&self, entity: Value, offset: i32) -> Option<usize> {
        let index = self.num_globals as i64
            + self.num_properties as i64 * entity as i64
            + offset as i64;
        usize::try_from(index)
            .ok()
            .filter(|&index| index < self.vals.len())
    }

    /// The raw slot vector.
    pub fn as_slice(&self) -> &[Value] {
        &self.vals
    }

    pub(crate) fn replace_all(&mut self, vals: Vec<Value>) {
        debug_assert_eq!(vals.len(), self.vals.len());
        self.vals = vals;
    }
}
