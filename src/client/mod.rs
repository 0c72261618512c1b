// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 cfdot Authors

//! Client implementations for communicating with the BBS and Locket
//!
//! - [`factory`]: picks a transport for a validated endpoint and builds
//!   the client
//! - [`base`]: shared JSON-over-HTTP plumbing
//! - [`bbs`]: BBS RPCs and the LRP event stream
//! - [`locket`]: Locket RPCs
//! - [`error`]: client error types

pub mod base;
pub mod bbs;
pub mod error;
pub mod factory;
pub mod locket;
