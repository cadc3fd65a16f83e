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

//! The 192-entry descriptor table and the free-block / free-descriptor
//! oracles. Freeness is never stored — it is derived by scanning, which
//! trades allocation speed for the absence of a bitmap/descriptor
//! coherence class of bugs.

use log::warn;
use svfs_fs::{
    Descriptor, DIRECTORY_DATA_BLOCK, DIRECTORY_DESCRIPTOR, FIRST_ALLOCATABLE_BLOCK, NUM_BLOCKS,
    NUM_DESCRIPTORS,
};

use crate::{directory, oft::OftSlot};

pub struct DescriptorTable {
    descriptors: [Descriptor; NUM_DESCRIPTORS],
}

impl DescriptorTable {
    pub fn new() -> Self {
        let mut descriptors = [Descriptor::default(); NUM_DESCRIPTORS];
        descriptors[DIRECTORY_DESCRIPTOR].blocks[0] = DIRECTORY_DATA_BLOCK;
        Self { descriptors }
    }

    pub fn read(&self, index: usize) -> Descriptor {
        self.descriptors[index]
    }

    pub fn write(&mut self, index: usize, descriptor: Descriptor) {
        self.descriptors[index] = descriptor;
    }

    /// Lowest block in `[FIRST_ALLOCATABLE_BLOCK, NUM_BLOCKS)` not
    /// referenced by any descriptor's block slots. O(descriptors × 3),
    /// uncached by design: trades allocation speed for eliminating a
    /// bitmap/descriptor coherence class of bugs.
    pub fn find_free_block(&self) -> Option<usize> {
        let free = (FIRST_ALLOCATABLE_BLOCK..NUM_BLOCKS).find(|&candidate| {
            !self
                .descriptors
                .iter()
                .any(|descriptor| descriptor.blocks.iter().any(|&block| block as usize == candidate))
        });
        if free.is_none() {
            warn!("block exhaustion: no free block in [{FIRST_ALLOCATABLE_BLOCK}, {NUM_BLOCKS})");
        }
        free
    }

    /// Lowest descriptor index in `1..NUM_DESCRIPTORS` that is both
    /// blank and unreferenced by the directory. Both conditions matter:
    /// a descriptor can be blank yet still be named by a stale directory
    /// entry in pathological sequences, and must not be reused until
    /// that entry is gone too.
    pub fn find_free_descriptor(&self, directory_slot: &OftSlot) -> Option<usize> {
        let free = (1..NUM_DESCRIPTORS).find(|&index| {
            self.descriptors[index].is_blank() && !directory::references(directory_slot, index)
        });
        if free.is_none() {
            warn!("descriptor exhaustion: no free descriptor in [1, {NUM_DESCRIPTORS})");
        }
        free
    }
}

impl Default for DescriptorTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_directory_slot() -> OftSlot {
        OftSlot::new()
    }

    #[test]
    fn root_descriptor_is_bootstrapped_to_block_seven() {
        let table = DescriptorTable::new();
        let root = table.read(DIRECTORY_DESCRIPTOR);
        assert_eq!(root.length, 0);
        assert_eq!(root.blocks[0], 7);
    }

    #[test]
    fn free_block_oracle_skips_reserved_and_referenced_blocks() {
        let mut table = DescriptorTable::new();
        let mut descriptor = Descriptor::default();
        descriptor.blocks[0] = 8;
        descriptor.blocks[1] = 9;
        table.write(1, descriptor);

        assert_eq!(table.find_free_block(), Some(10));
    }

    #[test]
    fn free_block_oracle_returns_none_when_exhausted() {
        let mut table = DescriptorTable::new();
        let mut index = 1;
        for block in FIRST_ALLOCATABLE_BLOCK..NUM_BLOCKS {
            let mut descriptor = Descriptor::default();
            descriptor.blocks[0] = block as u32;
            table.write(index, descriptor);
            index += 1;
        }
        assert_eq!(table.find_free_block(), None);
    }

    #[test]
    fn free_descriptor_oracle_requires_both_blank_and_unreferenced() {
        let mut table = DescriptorTable::new();
        let mut directory_slot = blank_directory_slot();
        // Descriptor 1 is blank but referenced by a directory entry: not free.
        directory::insert(&mut directory_slot, "foo", 1).unwrap();
        assert_ne!(table.find_free_descriptor(&directory_slot), Some(1));

        // Descriptor 2 is neither referenced nor blank: not free either.
        let mut dirty = Descriptor::default();
        dirty.length = 4;
        table.write(2, dirty);

        assert_eq!(table.find_free_descriptor(&directory_slot), Some(3));
    }
}
