// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O: backend client, uploads, media decoding, preferences and
//! annotation files.

pub mod backend;
pub mod media;
pub mod preferences;
pub mod serialization;
pub mod upload;
