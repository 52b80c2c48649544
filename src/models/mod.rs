// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Data model shared by the editor, renderer and backend client.

pub mod annotation;
pub mod image;
pub mod style;
