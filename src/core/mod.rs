// Copyright (C) 2025 Berkay Yetgin
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.

pub mod actions;
pub mod config;
pub mod env;
pub mod error;
pub mod layout;
pub mod relaunch;
pub mod types;

pub use actions::*;
pub use config::*;
pub use env::*;
pub use error::*;
pub use layout::*;
pub use relaunch::*;
pub use types::*;
