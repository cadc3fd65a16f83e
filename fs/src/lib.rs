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

//! Shared types and the command-surface trait for the single-volume
//! file system. A concrete volume format (the `svfs_volume` crate)
//! implements [`FileSystem`] over a `svfs_storage::BlockDevice`.

pub use svfs_err::*;

/// Bytes per block, and per open-file buffer.
pub const BLOCK_SIZE: usize = 512;
/// Blocks in the volume this format assumes (fixed, not configurable).
pub const NUM_BLOCKS: usize = 64;
/// Total descriptor slots; index 0 is reserved for the directory.
pub const NUM_DESCRIPTORS: usize = 192;
/// Open-file-table slots; slot 0 is reserved for the directory.
pub const NUM_OFT_SLOTS: usize = 4;
/// Data blocks addressable by a single descriptor.
pub const MAX_FILE_BLOCKS: usize = 3;
/// Largest byte length a file may reach (`MAX_FILE_BLOCKS * BLOCK_SIZE`).
pub const MAX_FILE_SIZE: usize = MAX_FILE_BLOCKS * BLOCK_SIZE;
/// Largest permitted file name, in bytes.
pub const MAX_NAME_LEN: usize = 4;
/// Descriptor index that is always the directory.
pub const DIRECTORY_DESCRIPTOR: usize = 0;
/// Open-file-table slot that is always the directory.
pub const DIRECTORY_OFT_SLOT: usize = 0;
/// Block holding the directory's (sole) data block, fixed at init.
pub const DIRECTORY_DATA_BLOCK: u32 = 7;
/// Lowest block index the free-block oracle may ever return.
pub const FIRST_ALLOCATABLE_BLOCK: usize = 8;

/// A fixed-width file descriptor: a byte length and up to
/// [`MAX_FILE_BLOCKS`] data block numbers. `0` in a block slot means
/// "not yet allocated".
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
    pub length: u32,
    pub blocks: [u32; MAX_FILE_BLOCKS],
}

impl Descriptor {
    /// A descriptor is free when every field reads zero. Whether index 0
    /// (the directory) is additionally referenced by the directory
    /// itself is a fact about the directory, not the descriptor, so
    /// callers must also check that separately (see
    /// `svfs_volume::descriptor::DescriptorTable::find_free_descriptor`).
    pub fn is_blank(&self) -> bool {
        self.length == 0 && self.blocks == [0; MAX_FILE_BLOCKS]
    }
}

/// The command surface a concrete volume format exposes to a driver:
/// create/destroy/open/close/read/write/seek/listing, one method per
/// script command the driver's dispatcher understands.
pub trait FileSystem {
    /// Creates an empty file named `name`. Fails if the name is too
    /// long, already exists, or no descriptor is free.
    fn create(&mut self, name: &str) -> Result<()>;

    /// Removes `name` from the directory and releases its descriptor.
    /// Fails if the name does not exist or is currently open.
    fn destroy(&mut self, name: &str) -> Result<()>;

    /// Opens `name` into a free open-file-table slot, returning the slot
    /// index. Fails if the name does not exist, is already open, or no
    /// slot is free.
    fn open(&mut self, name: &str) -> Result<usize>;

    /// Flushes and invalidates the open-file-table slot at `slot`.
    fn close(&mut self, slot: usize) -> Result<()>;

    /// Reads up to `buffer.len()` bytes from `slot`'s cursor, returning
    /// the number of bytes actually read (may be less than requested at
    /// end of file).
    fn read(&mut self, slot: usize, buffer: &mut [u8]) -> Result<usize>;

    /// Writes `buffer` at `slot`'s cursor, returning the number of bytes
    /// actually written (may be less than `buffer.len()` if the volume
    /// runs out of free blocks).
    fn write(&mut self, slot: usize, buffer: &[u8]) -> Result<usize>;

    /// Repositions `slot`'s cursor to `position`, returning the new
    /// cursor. Fails if `position` exceeds the file's current length or
    /// the volume's maximum file size.
    fn seek(&mut self, slot: usize, position: usize) -> Result<usize>;

    /// Lists every live (non-tombstoned) directory entry as
    /// `(name, length)` pairs, in directory order.
    fn listing(&mut self) -> Vec<(String, u32)>;
}
