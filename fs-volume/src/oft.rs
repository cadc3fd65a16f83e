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

//! The four-slot open-file table and the write-back buffer-cache swap
//! protocol at the heart of the volume format. Slot 0 is always the
//! directory and is never handed out by [`Oft::find_free_slot`].

use log::error;
use svfs_fs::{Error, Result, BLOCK_SIZE, NUM_OFT_SLOTS};
use svfs_storage::BlockDevice;

use crate::descriptor::DescriptorTable;

#[derive(Debug, Clone)]
pub struct OftSlot {
    pub valid: bool,
    pub descriptor_index: Option<usize>,
    pub buffer: [u8; BLOCK_SIZE],
    pub cursor: usize,
    pub cached_length: usize,
    pub loaded_block_index: usize,
}

impl OftSlot {
    pub fn new() -> Self {
        Self {
            valid: false,
            descriptor_index: None,
            buffer: [0; BLOCK_SIZE],
            cursor: 0,
            cached_length: 0,
            loaded_block_index: 0,
        }
    }
}

impl Default for OftSlot {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Oft {
    slots: [OftSlot; NUM_OFT_SLOTS],
}

impl Oft {
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| OftSlot::new()),
        }
    }

    /// Borrows a slot regardless of validity; used internally (e.g. by
    /// the directory, which is slot 0 and valid for the volume's whole
    /// lifetime) and by initialization, which must populate a slot
    /// before marking it valid.
    pub fn slot_raw(&self, index: usize) -> &OftSlot {
        &self.slots[index]
    }

    pub fn slot_raw_mut(&mut self, index: usize) -> &mut OftSlot {
        &mut self.slots[index]
    }

    /// Borrows a slot only if open, as every file operation other than
    /// `open` itself requires.
    pub fn slot(&self, index: usize) -> Result<&OftSlot> {
        self.slots
            .get(index)
            .filter(|slot| slot.valid)
            .ok_or(Error::InvalidSlot)
    }

    pub fn slot_mut(&mut self, index: usize) -> Result<&mut OftSlot> {
        self.slots
            .get_mut(index)
            .filter(|slot| slot.valid)
            .ok_or(Error::InvalidSlot)
    }

    pub fn is_open(&self, descriptor_index: usize) -> bool {
        self.slots
            .iter()
            .any(|slot| slot.valid && slot.descriptor_index == Some(descriptor_index))
    }

    /// Lowest slot index in `1..NUM_OFT_SLOTS` that is not currently
    /// valid. Slot 0 is reserved for the directory and is never
    /// returned.
    pub fn find_free_slot(&self) -> Option<usize> {
        (1..NUM_OFT_SLOTS).find(|&index| !self.slots[index].valid)
    }

    /// The buffer-cache swap: evicts `slot_index`'s currently loaded
    /// block (materializing a fresh block number if the evictee carried
    /// file bytes but had none assigned yet), persists the descriptor,
    /// then loads `new_block_index` (zero-filling if that logical block
    /// has never been materialized). Implemented as [`Oft::evict`]
    /// followed by [`Oft::load_block`]; `close` needs only the eviction
    /// half, since it never loads a replacement block.
    pub fn swap<BD: BlockDevice>(
        &mut self,
        slot_index: usize,
        new_block_index: usize,
        descriptors: &mut DescriptorTable,
        device: &mut BD,
    ) -> Result<()> {
        self.evict(slot_index, descriptors, device)?;
        self.load_block(slot_index, new_block_index, descriptors, device);
        Ok(())
    }

    /// Writes the slot's currently loaded block back to disk,
    /// allocating a block number first if the slot carries file bytes
    /// but its logical block was never materialized. A no-op if the
    /// slot's cached length is still zero. Used by `close` directly, and
    /// by [`Oft::swap`] as its first half.
    pub fn evict<BD: BlockDevice>(
        &mut self,
        slot_index: usize,
        descriptors: &mut DescriptorTable,
        device: &mut BD,
    ) -> Result<()> {
        let descriptor_index = self.slots[slot_index]
            .descriptor_index
            .expect("evict requires an open slot");
        let mut descriptor = descriptors.read(descriptor_index);

        let slot = &mut self.slots[slot_index];
        if slot.cached_length > 0 {
            let block_index = slot.loaded_block_index;
            let mut block = descriptor.blocks[block_index];
            if block == 0 {
                let free = descriptors.find_free_block().ok_or_else(|| {
                    error!(
                        "eviction of slot {slot_index} aborted: descriptor {descriptor_index} \
                         logical block {block_index} carries data but no block is free to materialize it"
                    );
                    Error::BlocksExhausted
                })?;
                block = free as u32;
                descriptor.blocks[block_index] = block;
            }
            device.write_block(block as usize, &slot.buffer);
            descriptors.write(descriptor_index, descriptor);
        }
        Ok(())
    }

    /// Points the slot at `new_block_index`, reading that logical
    /// block's disk contents in (or zero-filling, if it has never been
    /// materialized). Does not evict the previously loaded block —
    /// callers that need write-back must call [`Oft::evict`] first.
    pub fn load_block<BD: BlockDevice>(
        &mut self,
        slot_index: usize,
        new_block_index: usize,
        descriptors: &DescriptorTable,
        device: &BD,
    ) {
        let descriptor_index = self.slots[slot_index]
            .descriptor_index
            .expect("load_block requires an open slot");
        let descriptor = descriptors.read(descriptor_index);

        let slot = &mut self.slots[slot_index];
        slot.loaded_block_index = new_block_index;
        let new_block = descriptor.blocks[new_block_index];
        if new_block != 0 {
            device.read_block(new_block as usize, &mut slot.buffer);
        } else {
            slot.buffer = [0; BLOCK_SIZE];
        }
    }
}

impl Default for Oft {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use svfs_storage_memory::MemoryBlockDevice;

    use super::*;

    #[test]
    fn find_free_slot_never_returns_the_directory_slot() {
        let mut oft = Oft::new();
        for slot in oft.slots.iter_mut().skip(1) {
            slot.valid = true;
        }
        assert_eq!(oft.find_free_slot(), None);
    }

    #[test]
    fn swap_allocates_a_block_only_when_the_evictee_carried_bytes() {
        let mut oft = Oft::new();
        let mut descriptors = DescriptorTable::new();
        let mut device = MemoryBlockDevice::new();

        let slot = oft.slot_raw_mut(1);
        slot.valid = true;
        slot.descriptor_index = Some(5);
        slot.cached_length = 0;
        slot.loaded_block_index = 0;

        oft.swap(1, 1, &mut descriptors, &mut device).unwrap();
        assert_eq!(descriptors.read(5).blocks[0], 0);
        assert_eq!(oft.slot_raw(1).loaded_block_index, 1);

        let slot = oft.slot_raw_mut(1);
        slot.cached_length = 10;
        slot.buffer[0] = 0xAB;

        oft.swap(1, 2, &mut descriptors, &mut device).unwrap();
        let allocated = descriptors.read(5).blocks[1];
        assert_ne!(allocated, 0);

        let mut check = [0u8; BLOCK_SIZE];
        device.read_block(allocated as usize, &mut check);
        assert_eq!(check[0], 0xAB);
    }
}
