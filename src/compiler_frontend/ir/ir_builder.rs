//! IR Builder
//!
//! Programmatic construction of region-structured IR.
//!
//! Front ends that already produce the IR as data (e.g. JSON) do not need this.
//! It exists for embedders and tests that want to describe a function body
//! directly in Rust:
//!
//! ```ignore
//! let mut builder = IrBuilder::new("main.c");
//! builder.function("f", location(1), |body| {
//!     let x = body.declare_local("x", location(1));
//!     let p = body.declare_pointer("p", InitStyle::Uninitialized, location(2));
//!     body.store(p, x, location(2));
//!     body.deref(p, location(3));
//! });
//! let module = builder.finish();
//! ```
//!
//! This stage does NOT verify anything. Building a malformed body is allowed.

use crate::compiler_frontend::ir::ir_nodes::{
    CastKind, ConstantValue, FunctionId, InitStyle, IrBlock, IrFunction, IrModule, IrOperation,
    IrOperationKind, IrRegion, LoopKind, ValueId, YieldKind,
};
use crate::compiler_frontend::source_location::TextLocation;
use std::path::PathBuf;

// -------------------
// IR Builder Context
// -------------------
pub struct IrBuilder {
    // === Result being built ===
    module: IrModule,

    // === ID Counters ===
    values: ValueAllocator,
    next_function_id: u32,
}

impl IrBuilder {
    pub fn new(source_path: impl Into<PathBuf>) -> Self {
        IrBuilder {
            module: IrModule {
                source_path: source_path.into(),
                functions: Vec::new(),
            },
            values: ValueAllocator::default(),
            next_function_id: 0,
        }
    }

    /// Builds one function whose body is filled in by `build`.
    pub fn function(
        &mut self,
        name: &str,
        location: TextLocation,
        build: impl FnOnce(&mut RegionBuilder<'_>),
    ) -> FunctionId {
        let id = FunctionId(self.next_function_id);
        self.next_function_id += 1;

        let mut body = RegionBuilder::new(&mut self.values, location);
        build(&mut body);

        self.module.functions.push(IrFunction {
            id,
            name: name.to_owned(),
            location,
            body: body.finish(),
        });

        id
    }

    pub fn finish(self) -> IrModule {
        self.module
    }
}

#[derive(Debug, Default)]
struct ValueAllocator {
    next_value_id: u32,
}

impl ValueAllocator {
    fn fresh(&mut self) -> ValueId {
        let id = ValueId(self.next_value_id);
        self.next_value_id += 1;
        id
    }
}

// ----------------
// Region Builder
// ----------------
pub struct RegionBuilder<'a> {
    values: &'a mut ValueAllocator,
    blocks: Vec<IrBlock>,
    location: TextLocation,
}

impl<'a> RegionBuilder<'a> {
    fn new(values: &'a mut ValueAllocator, location: TextLocation) -> Self {
        RegionBuilder {
            values,
            blocks: vec![IrBlock::default()],
            location,
        }
    }

    fn finish(self) -> IrRegion {
        IrRegion {
            blocks: self.blocks,
            location: self.location,
        }
    }

    fn nested(
        &mut self,
        location: TextLocation,
        build: impl FnOnce(&mut RegionBuilder<'_>),
    ) -> IrRegion {
        let mut region = RegionBuilder::new(&mut *self.values, location);
        build(&mut region);
        region.finish()
    }

    fn push(&mut self, kind: IrOperationKind, location: TextLocation) {
        // The builder always keeps at least one block open.
        if let Some(block) = self.blocks.last_mut() {
            block.operations.push(IrOperation { kind, location });
        }
    }

    /// Sets where this region's closing delimiter sits.
    /// Scope-exit history for storage declared in here points at its end.
    pub fn closes_at(&mut self, location: TextLocation) {
        self.location = location;
    }

    /// Starts a new block at the end of this region.
    pub fn new_block(&mut self) {
        self.blocks.push(IrBlock::default());
    }

    // === Storage ===
    pub fn declare(
        &mut self,
        name: &str,
        is_pointer: bool,
        init: InitStyle,
        location: TextLocation,
    ) -> ValueId {
        let address = self.values.fresh();
        self.push(
            IrOperationKind::Declare {
                address,
                name: name.to_owned(),
                is_pointer,
                init,
            },
            location,
        );
        address
    }

    pub fn declare_local(&mut self, name: &str, location: TextLocation) -> ValueId {
        self.declare(name, false, InitStyle::Uninitialized, location)
    }

    pub fn declare_pointer(
        &mut self,
        name: &str,
        init: InitStyle,
        location: TextLocation,
    ) -> ValueId {
        self.declare(name, true, init, location)
    }

    pub fn store(&mut self, address: ValueId, value: ValueId, location: TextLocation) {
        self.push(IrOperationKind::Store { address, value }, location);
    }

    /// `p = nullptr;`
    pub fn store_null(&mut self, address: ValueId, location: TextLocation) {
        let null = self.constant(ConstantValue::NullPtr, location);
        self.store(address, null, location);
    }

    /// `p = &array[index];` with the array decayed to a pointer first.
    pub fn store_array_element(
        &mut self,
        address: ValueId,
        array: ValueId,
        location: TextLocation,
    ) {
        let decayed = self.cast(array, CastKind::ArrayToPointerDecay, location);
        let index = self.constant(ConstantValue::Int(0), location);
        let element = self.ptr_stride(decayed, index, location);
        self.store(address, element, location);
    }

    /// Loads the pointer value itself without reading through it.
    pub fn load(&mut self, address: ValueId, location: TextLocation) -> ValueId {
        self.load_with(address, false, location)
    }

    /// Loads a pointer in order to read through it (`*p`).
    pub fn deref(&mut self, address: ValueId, location: TextLocation) -> ValueId {
        self.load_with(address, true, location)
    }

    fn load_with(&mut self, address: ValueId, is_deref: bool, location: TextLocation) -> ValueId {
        let result = self.values.fresh();
        self.push(
            IrOperationKind::Load {
                result,
                address,
                is_deref,
            },
            location,
        );
        result
    }

    // === Values ===
    pub fn constant(&mut self, value: ConstantValue, location: TextLocation) -> ValueId {
        let result = self.values.fresh();
        self.push(IrOperationKind::Constant { result, value }, location);
        result
    }

    pub fn cast(&mut self, source: ValueId, kind: CastKind, location: TextLocation) -> ValueId {
        let result = self.values.fresh();
        self.push(
            IrOperationKind::Cast {
                result,
                source,
                kind,
            },
            location,
        );
        result
    }

    pub fn ptr_stride(
        &mut self,
        base: ValueId,
        stride: ValueId,
        location: TextLocation,
    ) -> ValueId {
        let result = self.values.fresh();
        self.push(
            IrOperationKind::PtrStride {
                result,
                base,
                stride,
            },
            location,
        );
        result
    }

    /// An operation outside the lifetime model (a call, arithmetic, ...).
    pub fn other(&mut self, name: &str, location: TextLocation) -> ValueId {
        let result = self.values.fresh();
        self.push(
            IrOperationKind::Other {
                name: name.to_owned(),
                results: vec![result],
            },
            location,
        );
        result
    }

    // === Control flow ===
    pub fn scope(&mut self, location: TextLocation, build: impl FnOnce(&mut RegionBuilder<'_>)) {
        let body = self.nested(location, build);
        self.push(IrOperationKind::Scope { body }, location);
    }

    pub fn if_then(
        &mut self,
        location: TextLocation,
        then_build: impl FnOnce(&mut RegionBuilder<'_>),
    ) {
        let then_region = self.nested(location, then_build);
        self.push(
            IrOperationKind::If {
                then_region,
                else_region: None,
            },
            location,
        );
    }

    pub fn if_else(
        &mut self,
        location: TextLocation,
        then_build: impl FnOnce(&mut RegionBuilder<'_>),
        else_build: impl FnOnce(&mut RegionBuilder<'_>),
    ) {
        let then_region = self.nested(location, then_build);
        let else_region = self.nested(location, else_build);
        self.push(
            IrOperationKind::If {
                then_region,
                else_region: Some(else_region),
            },
            location,
        );
    }

    pub fn switch(
        &mut self,
        location: TextLocation,
        build: impl FnOnce(&mut SwitchBuilder<'_, 'a>),
    ) {
        let mut switch = SwitchBuilder {
            parent: self,
            cases: Vec::new(),
            location,
        };
        build(&mut switch);

        let cases = switch.cases;
        self.push(IrOperationKind::Switch { cases }, location);
    }

    pub fn loop_(
        &mut self,
        kind: LoopKind,
        location: TextLocation,
        build: impl FnOnce(&mut LoopBuilder<'_, 'a>),
    ) {
        let mut builder = LoopBuilder {
            parent: self,
            condition: IrRegion {
                blocks: Vec::new(),
                location,
            },
            body: IrRegion {
                blocks: Vec::new(),
                location,
            },
            step: None,
            location,
        };
        build(&mut builder);

        let LoopBuilder {
            condition,
            body,
            step,
            ..
        } = builder;

        let step = match kind {
            LoopKind::For => Some(step.unwrap_or_else(|| IrRegion {
                blocks: Vec::new(),
                location,
            })),
            LoopKind::While | LoopKind::DoWhile => step,
        };

        self.push(
            IrOperationKind::Loop {
                kind,
                condition,
                body,
                step,
            },
            location,
        );
    }

    // === Terminators ===
    pub fn yield_(&mut self, kind: YieldKind, location: TextLocation) {
        self.push(IrOperationKind::Yield { kind }, location);
    }

    pub fn fallthrough(&mut self, location: TextLocation) {
        self.yield_(YieldKind::Fallthrough, location);
    }

    pub fn break_(&mut self, location: TextLocation) {
        self.yield_(YieldKind::Break, location);
    }

    pub fn return_(&mut self, location: TextLocation) {
        self.push(IrOperationKind::Return, location);
    }
}

pub struct SwitchBuilder<'p, 'a> {
    parent: &'p mut RegionBuilder<'a>,
    cases: Vec<IrRegion>,
    location: TextLocation,
}

impl SwitchBuilder<'_, '_> {
    /// Adds the next case region. End it with `fallthrough` to flow into the following case.
    pub fn case(&mut self, build: impl FnOnce(&mut RegionBuilder<'_>)) {
        let region = self.parent.nested(self.location, build);
        self.cases.push(region);
    }
}

pub struct LoopBuilder<'p, 'a> {
    parent: &'p mut RegionBuilder<'a>,
    condition: IrRegion,
    body: IrRegion,
    step: Option<IrRegion>,
    location: TextLocation,
}

impl LoopBuilder<'_, '_> {
    pub fn condition(&mut self, build: impl FnOnce(&mut RegionBuilder<'_>)) {
        self.condition = self.parent.nested(self.location, build);
    }

    pub fn body(&mut self, build: impl FnOnce(&mut RegionBuilder<'_>)) {
        self.body = self.parent.nested(self.location, build);
    }

    /// Only meaningful for `LoopKind::For`.
    pub fn step(&mut self, build: impl FnOnce(&mut RegionBuilder<'_>)) {
        self.step = Some(self.parent.nested(self.location, build));
    }
}
