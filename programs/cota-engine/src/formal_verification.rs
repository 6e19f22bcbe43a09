// ============================================================================
// FORMAL VERIFICATION & PROPERTY-BASED TESTS
// ============================================================================
//
// Run with: cargo test --lib formal_verification
//
// This module implements:
// 1. Property-based tests (invariants)
// 2. Fuzzing harnesses (edge cases)
// 3. Formal property assertions
// ============================================================================
