// SPDX-FileCopyrightText: 2026 Billowl Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQL query modules, one per table group.

pub mod bills;
pub mod lookups;
