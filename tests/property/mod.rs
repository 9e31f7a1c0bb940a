// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! Properties that must hold for every sequence of cuts and connections.

mod segment_coverage;
