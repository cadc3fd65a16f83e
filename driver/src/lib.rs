// Copyright 2024 Kevin Ludwig
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Command parsing and dispatch for the single-volume teaching file
//! system's script harness. The `svfs` binary (`src/main.rs`) is a thin
//! `input.txt`/`output.txt` shell around [`System`].

pub mod command;
pub mod system;

pub use command::Command;
pub use system::System;
