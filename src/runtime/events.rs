//! Runtime event stream payloads.

use crate::types::{Flavor, Operand};

/// Events emitted from the calculator command loop and its persistence worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalcEvent {
    /// An operation evaluated successfully.
    Evaluated {
        /// Call path.
        flavor: Flavor,
        /// Operation name.
        operation: &'static str,
        /// Computed result.
        result: Operand,
    },
    /// The operand stack changed size.
    StackChanged {
        /// New stack size.
        size: usize,
    },
    /// The coordinator finished a save (the stores may still have degraded).
    Persisted {
        /// Operation name.
        operation: &'static str,
    },
}
