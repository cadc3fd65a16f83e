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

//! A concrete single-volume file system format: a 192-entry descriptor
//! table, a four-slot open-file table with a write-back buffer cache,
//! and a directory stored as the file at descriptor 0. [`Volume`] is
//! the crate's sole public entry point, implementing
//! `svfs_fs::FileSystem` over any `svfs_storage::BlockDevice`.

pub mod descriptor;
pub mod directory;
pub mod memory;
pub mod oft;
pub mod volume;

pub use descriptor::DescriptorTable;
pub use memory::ScratchMemory;
pub use oft::{Oft, OftSlot};
pub use volume::Volume;
