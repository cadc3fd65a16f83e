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

//! Block device abstraction for the single-volume file system.
//!
//! Unlike a real backing store, a block device here cannot fail: reads
//! and writes to an out-of-range block index are silent no-ops, per the
//! teaching model this crate implements.

pub const BLOCK_SIZE: usize = 512;

pub trait BlockDevice {
    /// Copies the contents of block `index` into `buffer`. A no-op if
    /// `index` is out of range for this device.
    fn read_block(&self, index: usize, buffer: &mut [u8; BLOCK_SIZE]);

    /// Overwrites block `index` with `buffer`. A no-op if `index` is out
    /// of range for this device.
    fn write_block(&mut self, index: usize, buffer: &[u8; BLOCK_SIZE]);
}
