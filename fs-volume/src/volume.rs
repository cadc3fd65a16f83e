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

//! [`Volume`] wires the descriptor table, OFT, and directory together
//! behind the [`FileSystem`] trait, over a caller-supplied
//! [`BlockDevice`]. This is the crate's single entry point; everything
//! else in `fs-volume` exists to be composed here.

use svfs_fs::{
    Descriptor, Error, FileSystem, Result, BLOCK_SIZE, DIRECTORY_OFT_SLOT, MAX_FILE_SIZE,
    MAX_NAME_LEN,
};
use svfs_storage::BlockDevice;

use crate::{
    descriptor::DescriptorTable,
    directory,
    oft::{Oft, OftSlot},
};

pub struct Volume<BD: BlockDevice> {
    device: BD,
    descriptors: DescriptorTable,
    oft: Oft,
}

impl<BD: BlockDevice> Volume<BD> {
    /// Bootstraps a fresh volume over `device`: a blank descriptor table
    /// (root descriptor pinned to block 7) and the directory primed into
    /// OFT slot 0.
    pub fn new(device: BD) -> Self {
        let descriptors = DescriptorTable::new();
        let mut oft = Oft::new();
        directory::load(oft.slot_raw_mut(DIRECTORY_OFT_SLOT), &descriptors, &device);
        Self {
            device,
            descriptors,
            oft,
        }
    }

    /// Flushes the directory slot back to disk. Required before this
    /// volume is discarded and replaced — see the `in` command's
    /// fleet-level resource contract.
    pub fn finalize(&mut self) {
        let slot = self.oft.slot_raw_mut(DIRECTORY_OFT_SLOT);
        directory::save(slot, &mut self.descriptors, &mut self.device);
    }
}

impl<BD: BlockDevice> FileSystem for Volume<BD> {
    fn create(&mut self, name: &str) -> Result<()> {
        if name.len() > MAX_NAME_LEN {
            return Err(Error::NameTooLong);
        }
        if directory::find(self.oft.slot_raw(DIRECTORY_OFT_SLOT), name).is_some() {
            return Err(Error::NameExists);
        }
        let descriptor_index = self
            .descriptors
            .find_free_descriptor(self.oft.slot_raw(DIRECTORY_OFT_SLOT))
            .ok_or(Error::DescriptorsExhausted)?;

        let slot = self.oft.slot_raw_mut(DIRECTORY_OFT_SLOT);
        directory::insert(slot, name, descriptor_index)?;
        self.descriptors.write(descriptor_index, Descriptor::default());
        directory::save(
            self.oft.slot_raw_mut(DIRECTORY_OFT_SLOT),
            &mut self.descriptors,
            &mut self.device,
        );
        Ok(())
    }

    fn destroy(&mut self, name: &str) -> Result<()> {
        let descriptor_index =
            directory::find(self.oft.slot_raw(DIRECTORY_OFT_SLOT), name).ok_or(Error::NameNotFound)?;
        if self.oft.is_open(descriptor_index) {
            return Err(Error::FileOpen);
        }

        directory::delete(self.oft.slot_raw_mut(DIRECTORY_OFT_SLOT), name);
        // Data blocks are released implicitly: clearing the descriptor
        // drops its only references, and the free-block oracle derives
        // freeness by re-scanning descriptors. There is nothing else to do.
        self.descriptors.write(descriptor_index, Descriptor::default());
        directory::save(
            self.oft.slot_raw_mut(DIRECTORY_OFT_SLOT),
            &mut self.descriptors,
            &mut self.device,
        );
        Ok(())
    }

    fn open(&mut self, name: &str) -> Result<usize> {
        let descriptor_index =
            directory::find(self.oft.slot_raw(DIRECTORY_OFT_SLOT), name).ok_or(Error::NameNotFound)?;
        if self.oft.is_open(descriptor_index) {
            return Err(Error::FileOpen);
        }
        let slot_index = self.oft.find_free_slot().ok_or(Error::OftExhausted)?;

        let descriptor = self.descriptors.read(descriptor_index);
        let slot = self.oft.slot_raw_mut(slot_index);
        slot.valid = true;
        slot.descriptor_index = Some(descriptor_index);
        slot.cached_length = descriptor.length as usize;
        slot.cursor = 0;
        slot.loaded_block_index = 0;
        if descriptor.blocks[0] != 0 {
            self.device.read_block(descriptor.blocks[0] as usize, &mut slot.buffer);
        } else {
            slot.buffer = [0; BLOCK_SIZE];
        }
        Ok(slot_index)
    }

    fn close(&mut self, slot: usize) -> Result<()> {
        self.oft.slot(slot)?;
        self.oft.evict(slot, &mut self.descriptors, &mut self.device)?;

        let descriptor_index = self.oft.slot_raw(slot).descriptor_index.expect("validated above");
        let cached_length = self.oft.slot_raw(slot).cached_length;
        let mut descriptor = self.descriptors.read(descriptor_index);
        descriptor.length = cached_length as u32;
        self.descriptors.write(descriptor_index, descriptor);

        *self.oft.slot_raw_mut(slot) = OftSlot::new();
        Ok(())
    }

    fn read(&mut self, slot: usize, buffer: &mut [u8]) -> Result<usize> {
        self.oft.slot(slot)?;
        let mut total = 0;
        while total < buffer.len() {
            let (cursor, cached_length, loaded_block_index) = {
                let s = self.oft.slot_raw(slot);
                (s.cursor, s.cached_length, s.loaded_block_index)
            };
            if cursor >= cached_length || cursor >= MAX_FILE_SIZE {
                break;
            }
            let block_idx = cursor / BLOCK_SIZE;
            if block_idx != loaded_block_index {
                self.oft.swap(slot, block_idx, &mut self.descriptors, &mut self.device)?;
            }

            let offset = cursor % BLOCK_SIZE;
            let can = (buffer.len() - total)
                .min(BLOCK_SIZE - offset)
                .min(cached_length - cursor);

            let s = self.oft.slot_raw_mut(slot);
            buffer[total..total + can].copy_from_slice(&s.buffer[offset..offset + can]);
            s.cursor += can;
            total += can;
        }
        Ok(total)
    }

    fn write(&mut self, slot: usize, buffer: &[u8]) -> Result<usize> {
        self.oft.slot(slot)?;
        let mut total = 0;
        while total < buffer.len() {
            let (cursor, loaded_block_index) = {
                let s = self.oft.slot_raw(slot);
                (s.cursor, s.loaded_block_index)
            };
            if cursor >= MAX_FILE_SIZE {
                break;
            }
            let block_idx = cursor / BLOCK_SIZE;
            if block_idx != loaded_block_index {
                self.oft.swap(slot, block_idx, &mut self.descriptors, &mut self.device)?;
            }

            let offset = cursor % BLOCK_SIZE;
            let can = (buffer.len() - total).min(BLOCK_SIZE - offset);
            let cached_length = {
                let s = self.oft.slot_raw_mut(slot);
                s.buffer[offset..offset + can].copy_from_slice(&buffer[total..total + can]);
                s.cursor += can;
                s.cached_length = s.cached_length.max(s.cursor);
                s.cached_length
            };
            total += can;

            let descriptor_index = self.oft.slot_raw(slot).descriptor_index.expect("validated above");
            let mut descriptor = self.descriptors.read(descriptor_index);
            if descriptor.blocks[block_idx] == 0 {
                match self.descriptors.find_free_block() {
                    Some(free) => descriptor.blocks[block_idx] = free as u32,
                    // Exhausted mid-write: this iteration's bytes stay
                    // resident in the buffer (already counted in
                    // `total`) but are not flushed. Stop, do not error.
                    None => break,
                }
            }
            descriptor.length = cached_length as u32;
            self.descriptors.write(descriptor_index, descriptor);
            self.device
                .write_block(descriptor.blocks[block_idx] as usize, &self.oft.slot_raw(slot).buffer);
        }
        Ok(total)
    }

    fn seek(&mut self, slot: usize, position: usize) -> Result<usize> {
        let (cached_length, loaded_block_index) = {
            let s = self.oft.slot(slot)?;
            (s.cached_length, s.loaded_block_index)
        };
        if position > cached_length || position > MAX_FILE_SIZE {
            return Err(Error::InvalidArgument);
        }
        let target_block = position / BLOCK_SIZE;
        if target_block != loaded_block_index {
            self.oft.swap(slot, target_block, &mut self.descriptors, &mut self.device)?;
        }
        self.oft.slot_mut(slot)?.cursor = position;
        Ok(position)
    }

    fn listing(&mut self) -> Vec<(String, u32)> {
        directory::listing(self.oft.slot_raw(DIRECTORY_OFT_SLOT), &self.descriptors)
    }
}
