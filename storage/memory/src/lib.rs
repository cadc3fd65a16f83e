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

//! A 64×512-byte block device held entirely in process memory. There is
//! no persistence across process restarts: the volume is reconstructed
//! fresh on every `in` command.

use svfs_storage::{BlockDevice, BLOCK_SIZE};

pub const NUM_BLOCKS: usize = 64;

pub struct MemoryBlockDevice {
    blocks: Box<[[u8; BLOCK_SIZE]; NUM_BLOCKS]>,
}

impl MemoryBlockDevice {
    pub fn new() -> Self {
        Self {
            blocks: Box::new([[0u8; BLOCK_SIZE]; NUM_BLOCKS]),
        }
    }
}

impl Default for MemoryBlockDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl BlockDevice for MemoryBlockDevice {
    fn read_block(&self, index: usize, buffer: &mut [u8; BLOCK_SIZE]) {
        if let Some(block) = self.blocks.get(index) {
            buffer.copy_from_slice(block);
        }
    }

    fn write_block(&mut self, index: usize, buffer: &[u8; BLOCK_SIZE]) {
        if let Some(block) = self.blocks.get_mut(index) {
            block.copy_from_slice(buffer);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_a_block() {
        let mut device = MemoryBlockDevice::new();
        let mut src = [0u8; BLOCK_SIZE];
        src[0] = 0xAB;
        src[511] = 0xCD;
        device.write_block(3, &src);

        let mut dst = [0u8; BLOCK_SIZE];
        device.read_block(3, &mut dst);
        assert_eq!(dst, src);
    }

    #[test]
    fn out_of_range_access_is_a_silent_no_op() {
        let mut device = MemoryBlockDevice::new();
        let src = [0xFFu8; BLOCK_SIZE];
        device.write_block(NUM_BLOCKS, &src);

        let mut dst = [0x11u8; BLOCK_SIZE];
        device.read_block(NUM_BLOCKS, &mut dst);
        assert_eq!(dst, [0x11u8; BLOCK_SIZE]);
    }

    #[test]
    fn fresh_device_is_zero_filled() {
        let device = MemoryBlockDevice::new();
        let mut dst = [0xFFu8; BLOCK_SIZE];
        device.read_block(0, &mut dst);
        assert_eq!(dst, [0u8; BLOCK_SIZE]);
    }
}
