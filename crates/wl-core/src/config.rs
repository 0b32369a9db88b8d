//! WhatLang Configuration
//!
//! Defines runtime limits for the interpreter.
//! Configuration specifies constraints only; enforcement is handled by the VM.

/// Interpreter configuration
#[derive(Debug, Clone)]
pub struct WlConfig {
    /// Maximum number of values on a single stack
    pub max_stack_size: usize,

    /// Maximum number of nested frames (`[` / `|`)
    pub max_frame_depth: usize,

    /// Maximum array nesting walked by comparison and rendering
    pub max_nesting: usize,
}

impl Default for WlConfig {
    fn default() -> Self {
        WlConfig {
            max_stack_size: 1 << 20,
            max_frame_depth: 4096,
            max_nesting: 256,
        }
    }
}

impl WlConfig {
    /// Create a new configuration with default limits
    pub fn new() -> Self {
        Self::default()
    }
}
