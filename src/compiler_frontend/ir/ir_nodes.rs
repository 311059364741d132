//! ============================================================
//!                         IR Nodes
//! ============================================================
//! Region-structured IR for a single translation unit, as handed over by the
//! front end after lowering.
//!  - Every function body is one region
//!  - Regions hold ordered blocks, blocks hold ordered operations
//!  - Control constructs (scope, if, switch, loop) own their nested regions
//!  - Values are SSA ids; a declared storage slot is the value its
//!    `Declare` produces (its address)
//!
//! Nothing here is verified by this crate. The lifetime checker assumes a
//! well-formed module and reports broken preconditions as compiler errors.

use crate::compiler_frontend::source_location::TextLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

// ============================================================
// Stable IDs
// ============================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FunctionId(pub u32);

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "%{}", self.0)
    }
}

impl fmt::Display for FunctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn{}", self.0)
    }
}

// ============================================================
// Module
// ============================================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrModule {
    /// The source file every location in this module points into.
    #[serde(default)]
    pub source_path: PathBuf,
    pub functions: Vec<IrFunction>,
}

// ============================================================
// Functions
// ============================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrFunction {
    pub id: FunctionId,
    pub name: String,
    #[serde(default)]
    pub location: TextLocation,
    pub body: IrRegion,
}

// ============================================================
// Regions and Blocks
// ============================================================
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrRegion {
    pub blocks: Vec<IrBlock>,

    /// Spans the region's braces. `end_pos` is where its storage dies.
    #[serde(default)]
    pub location: TextLocation,
}

impl IrRegion {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IrBlock {
    pub operations: Vec<IrOperation>,
}

// ============================================================
// Operations
// ============================================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrOperation {
    pub kind: IrOperationKind,
    #[serde(default)]
    pub location: TextLocation,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum IrOperationKind {
    /// Reserve a local storage slot. `address` is the slot's identity.
    Declare {
        address: ValueId,
        name: String,
        is_pointer: bool,
        init: InitStyle,
    },

    Store {
        address: ValueId,
        value: ValueId,
    },

    Load {
        result: ValueId,
        address: ValueId,

        /// Set when the loaded pointer is read through,
        /// not just materialized to be passed around.
        is_deref: bool,
    },

    Constant {
        result: ValueId,
        value: ConstantValue,
    },

    Cast {
        result: ValueId,
        source: ValueId,
        kind: CastKind,
    },

    /// Pointer arithmetic / address of an element: `base + stride`.
    PtrStride {
        result: ValueId,
        base: ValueId,
        stride: ValueId,
    },

    // Control flow
    Scope {
        body: IrRegion,
    },

    If {
        then_region: IrRegion,
        else_region: Option<IrRegion>,
    },

    /// One region per case label, in source order.
    Switch {
        cases: Vec<IrRegion>,
    },

    Loop {
        kind: LoopKind,
        condition: IrRegion,
        body: IrRegion,
        step: Option<IrRegion>,
    },

    Yield {
        kind: YieldKind,
    },

    Return,

    /// Anything the lifetime checker does not model (calls, arithmetic, ...).
    Other {
        name: String,
        #[serde(default)]
        results: Vec<ValueId>,
    },
}

impl IrOperationKind {
    pub fn mnemonic(&self) -> &'static str {
        match self {
            IrOperationKind::Declare { .. } => "declare",
            IrOperationKind::Store { .. } => "store",
            IrOperationKind::Load { .. } => "load",
            IrOperationKind::Constant { .. } => "const",
            IrOperationKind::Cast { .. } => "cast",
            IrOperationKind::PtrStride { .. } => "ptr_stride",
            IrOperationKind::Scope { .. } => "scope",
            IrOperationKind::If { .. } => "if",
            IrOperationKind::Switch { .. } => "switch",
            IrOperationKind::Loop { .. } => "loop",
            IrOperationKind::Yield { .. } => "yield",
            IrOperationKind::Return => "return",
            IrOperationKind::Other { .. } => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InitStyle {
    Uninitialized,
    CInit,
    CallInit,
    ListInit,
}

impl InitStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            InitStyle::Uninitialized => "uninitialized",
            InitStyle::CInit => "cinit",
            InitStyle::CallInit => "callinit",
            InitStyle::ListInit => "listinit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstantValue {
    NullPtr,
    Int(i64),
    Bool(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CastKind {
    ArrayToPointerDecay,
    IntegralToPointer,
    Bitcast,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoopKind {
    /// condition, body, step
    For,
    /// condition, body
    While,
    /// body, condition
    DoWhile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum YieldKind {
    Plain,
    Fallthrough,
    Break,
    Continue,
}
