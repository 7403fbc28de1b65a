//! Pass-through adapter for runtime internals.
//!
//! Every function here delegates to the runtime through [`VmInternals`];
//! the only computation is the absolute target for stack-limit expansion.

/// Internal runtime routines reached by the boundary layer.
///
/// Implemented by the runtime's state handle. Stack positions are slot
/// indices relative to the stack base.
pub trait VmInternals {
    /// Ensures room for `slots` more stack slots, growing the stack if needed.
    fn check_stack(&mut self, slots: i32);

    /// Index of the current stack top.
    fn stack_top(&self) -> usize;

    /// Raises the stack limit so that `target` is addressable.
    fn expand_stack_limit_to(&mut self, target: usize);

    /// Whether the function at call-frame `level` runs as native code.
    fn is_native(&self, level: i32) -> bool;
}

pub fn check_stack<V: VmInternals + ?Sized>(vm: &mut V, slots: i32) {
    vm.check_stack(slots);
}

/// Expands the stack limit to `slots` past the current top.
pub fn expand_stack_limit<V: VmInternals + ?Sized>(vm: &mut V, slots: i32) {
    let target = vm.stack_top().saturating_add_signed(slots as isize);
    vm.expand_stack_limit_to(target);
}

pub fn is_native<V: VmInternals + ?Sized>(vm: &V, level: i32) -> bool {
    vm.is_native(level)
}
