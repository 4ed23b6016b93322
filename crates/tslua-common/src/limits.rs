//! Centralized limits and thresholds for the tslua compiler.
//!
//! Recursion limits live here so the shape resolver and the emitter agree on
//! how deep a nested type or expression may go before they bail out.

// =============================================================================
// Recursion Depth Limits
// =============================================================================

/// Maximum depth for shape classification of nested types.
///
/// Unions of intersections of interfaces can nest, and interface heritage can
/// be cyclic in malformed programs. Past this depth the resolver answers
/// `Unrelated`, which routes the access through generic lowering.
pub const MAX_SHAPE_DEPTH: u32 = 64;

/// Maximum depth for expression and statement lowering.
///
/// ```typescript
/// const x = ((((((((arr[0])))))))); // ... 500 levels ...
/// ```
///
/// Each nested expression adds a frame to the lowering call stack.
pub const MAX_LOWERING_DEPTH: u32 = 500;
