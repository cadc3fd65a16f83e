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

//! The directory is a regular file living at descriptor 0 and OFT slot
//! 0 — these functions operate directly on slot 0's buffer rather than
//! through the general read/write path, for efficiency and to avoid
//! recursive buffer management.
//!
//! Tombstones (deleted entries) are never compacted and never reused:
//! this is a known wart of the system being taught, preserved
//! deliberately for output compatibility.

use svfs_fs::{Error, Result, DIRECTORY_DESCRIPTOR, MAX_NAME_LEN};
use svfs_storage::BlockDevice;
use zerocopy::{big_endian::U32, FromBytes, IntoBytes, KnownLayout};

use crate::{descriptor::DescriptorTable, oft::OftSlot};

pub const ENTRY_SIZE: usize = core::mem::size_of::<RawEntry>();

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout)]
pub struct RawEntry {
    name: [u8; MAX_NAME_LEN],
    descriptor_index: U32,
}

fn entry_at(slot: &OftSlot, position: usize) -> RawEntry {
    RawEntry::read_from_bytes(&slot.buffer[position..position + ENTRY_SIZE])
        .expect("ENTRY_SIZE slice always matches RawEntry's layout")
}

fn write_entry_at(slot: &mut OftSlot, position: usize, entry: RawEntry) {
    slot.buffer[position..position + ENTRY_SIZE].copy_from_slice(entry.as_bytes());
}

fn is_tombstone(entry: &RawEntry) -> bool {
    entry.name == [0; MAX_NAME_LEN]
}

/// Extracts the logical name from a raw entry: the bytes before the
/// first NUL (or all four, if the name fills the field exactly).
fn entry_name(entry: &RawEntry) -> &str {
    let end = entry
        .name
        .iter()
        .position(|&b| b == 0)
        .unwrap_or(entry.name.len());
    core::str::from_utf8(&entry.name[..end]).unwrap_or("")
}

fn encode_name(name: &str) -> [u8; MAX_NAME_LEN] {
    let mut bytes = [0u8; MAX_NAME_LEN];
    bytes[..name.len()].copy_from_slice(name.as_bytes());
    bytes
}

/// Iterates over every 8-byte stride up to the directory's cached
/// length, tombstones included.
fn entries(slot: &OftSlot) -> impl Iterator<Item = (usize, RawEntry)> + '_ {
    (0..slot.cached_length)
        .step_by(ENTRY_SIZE)
        .map(|position| (position, entry_at(slot, position)))
}

/// Linear walk in 8-byte strides, matched by NUL-terminated name
/// equality. Returns the entry's descriptor index.
pub fn find(slot: &OftSlot, name: &str) -> Option<usize> {
    entries(slot)
        .find(|(_, entry)| !is_tombstone(entry) && entry_name(entry) == name)
        .map(|(_, entry)| entry.descriptor_index.get() as usize)
}

/// Whether any live directory entry names `descriptor_index`, tombstones
/// excluded implicitly (a tombstone's index field reads zero and 0 is
/// never handed out by `find_free_descriptor`).
pub fn references(slot: &OftSlot, descriptor_index: usize) -> bool {
    entries(slot).any(|(_, entry)| entry.descriptor_index.get() as usize == descriptor_index)
}

/// Appends `name -> descriptor_index` at the tail. Fails if the name
/// already exists or the single directory block has no room left.
pub fn insert(slot: &mut OftSlot, name: &str, descriptor_index: usize) -> Result<()> {
    if find(slot, name).is_some() {
        return Err(Error::NameExists);
    }
    if slot.cached_length + ENTRY_SIZE > slot.buffer.len() {
        return Err(Error::DirectoryFull);
    }

    let entry = RawEntry {
        name: encode_name(name),
        descriptor_index: U32::new(descriptor_index as u32),
    };
    write_entry_at(slot, slot.cached_length, entry);
    slot.cached_length += ENTRY_SIZE;
    Ok(())
}

/// Zeroes the named entry's 8 bytes in place (tombstoning it) and
/// returns its descriptor index. The directory's length is left
/// unchanged — later inserts keep appending past the tombstone.
pub fn delete(slot: &mut OftSlot, name: &str) -> Option<usize> {
    let (position, entry) = entries(slot).find(|(_, entry)| !is_tombstone(entry) && entry_name(entry) == name)?;
    write_entry_at(
        slot,
        position,
        RawEntry {
            name: [0; MAX_NAME_LEN],
            descriptor_index: U32::new(0),
        },
    );
    Some(entry.descriptor_index.get() as usize)
}

/// Every live entry's `(name, current length)`, tombstones skipped.
pub fn listing(slot: &OftSlot, descriptors: &DescriptorTable) -> Vec<(String, u32)> {
    entries(slot)
        .filter(|(_, entry)| !is_tombstone(entry))
        .map(|(_, entry)| {
            let length = descriptors.read(entry.descriptor_index.get() as usize).length;
            (entry_name(&entry).to_string(), length)
        })
        .collect()
}

/// Flushes slot 0's buffer to descriptor 0's sole data block and
/// persists `cached_length` into descriptor 0's length field. Descriptor
/// 0's block is fixed at init, so this never needs the free-block
/// oracle — the very first save tolerates `cached_length == 0` without
/// a special case.
pub fn save<BD: BlockDevice>(slot: &mut OftSlot, descriptors: &mut DescriptorTable, device: &mut BD) {
    let mut descriptor = descriptors.read(DIRECTORY_DESCRIPTOR);
    device.write_block(descriptor.blocks[0] as usize, &slot.buffer);
    descriptor.length = slot.cached_length as u32;
    descriptors.write(DIRECTORY_DESCRIPTOR, descriptor);
}

/// Reads descriptor 0's data block into slot 0's buffer and primes its
/// cached length, as `open`/init would for any other file — done once,
/// at volume construction, since the directory is opened for the
/// lifetime of the volume.
pub fn load<BD: BlockDevice>(slot: &mut OftSlot, descriptors: &DescriptorTable, device: &BD) {
    let descriptor = descriptors.read(DIRECTORY_DESCRIPTOR);
    slot.valid = true;
    slot.descriptor_index = Some(DIRECTORY_DESCRIPTOR);
    slot.cursor = 0;
    slot.loaded_block_index = 0;
    slot.cached_length = descriptor.length as usize;
    if descriptor.blocks[0] != 0 {
        device.read_block(descriptor.blocks[0] as usize, &mut slot.buffer);
    } else {
        slot.buffer = [0; svfs_fs::BLOCK_SIZE];
    }
}

#[cfg(test)]
mod tests {
    use svfs_storage_memory::MemoryBlockDevice;

    use super::*;
    use crate::oft::OftSlot;

    #[test]
    fn insert_then_find_round_trips() {
        let mut slot = OftSlot::new();
        insert(&mut slot, "abcd", 5).unwrap();
        assert_eq!(find(&slot, "abcd"), Some(5));
        assert_eq!(slot.cached_length, ENTRY_SIZE);
    }

    #[test]
    fn short_names_are_nul_padded_and_compare_by_nul_terminated_prefix() {
        let mut slot = OftSlot::new();
        insert(&mut slot, "a", 1).unwrap();
        assert_eq!(find(&slot, "a"), Some(1));
        assert_eq!(find(&slot, "ab"), None);
    }

    #[test]
    fn insert_rejects_duplicate_names() {
        let mut slot = OftSlot::new();
        insert(&mut slot, "foo", 1).unwrap();
        assert_eq!(insert(&mut slot, "foo", 2), Err(Error::NameExists));
    }

    #[test]
    fn delete_tombstones_without_shrinking_length() {
        let mut slot = OftSlot::new();
        insert(&mut slot, "foo", 1).unwrap();
        let before = slot.cached_length;
        assert_eq!(delete(&mut slot, "foo"), Some(1));
        assert_eq!(slot.cached_length, before);
        assert_eq!(find(&slot, "foo"), None);
    }

    #[test]
    fn listing_skips_tombstones_and_reports_current_length() {
        let mut slot = OftSlot::new();
        let mut descriptors = DescriptorTable::new();
        insert(&mut slot, "foo", 1).unwrap();
        insert(&mut slot, "bar", 2).unwrap();
        delete(&mut slot, "foo");

        let mut descriptor = descriptors.read(2);
        descriptor.length = 42;
        descriptors.write(2, descriptor);

        assert_eq!(listing(&slot, &descriptors), vec![("bar".to_string(), 42)]);
    }

    #[test]
    fn insert_fails_once_the_single_block_is_full() {
        let mut slot = OftSlot::new();
        let capacity = svfs_fs::BLOCK_SIZE / ENTRY_SIZE;
        for i in 0..capacity {
            let name = format!("{:04}", i);
            insert(&mut slot, &name, i + 1).unwrap();
        }
        assert_eq!(insert(&mut slot, "full", 9999), Err(Error::DirectoryFull));
    }

    #[test]
    fn save_and_load_round_trip_through_the_block_device() {
        let mut slot = OftSlot::new();
        let mut descriptors = DescriptorTable::new();
        let mut device = MemoryBlockDevice::new();

        insert(&mut slot, "abcd", 3).unwrap();
        save(&mut slot, &mut descriptors, &mut device);

        let mut reloaded = OftSlot::new();
        load(&mut reloaded, &descriptors, &device);
        assert_eq!(reloaded.cached_length, ENTRY_SIZE);
        assert_eq!(find(&reloaded, "abcd"), Some(3));
    }
}
