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

//! The single owning aggregate: a volume plus its scratch memory.
//! `System::reinit` is literally reconstructing this aggregate — there
//! are no module-level statics anywhere in this crate for `in` to zero.

use log::debug;
use svfs_fs::{FileSystem, BLOCK_SIZE};
use svfs_storage_memory::MemoryBlockDevice;
use svfs_volume::{ScratchMemory, Volume};

use crate::command::Command;

pub struct System {
    volume: Volume<MemoryBlockDevice>,
    memory: ScratchMemory,
}

impl System {
    pub fn new() -> Self {
        Self {
            volume: Volume::new(MemoryBlockDevice::new()),
            memory: ScratchMemory::new(),
        }
    }

    /// Flushes the current directory slot, then replaces the whole
    /// aggregate with a fresh one. The one fleet-level resource
    /// contract `in` carries: without the flush, data from the prior
    /// session would leak into the new one's listing.
    pub fn reinit(&mut self) {
        self.volume.finalize();
        *self = System::new();
    }

    pub fn dispatch(&mut self, command: Command) -> String {
        debug!("dispatch {command:?}");
        match command {
            Command::Init => {
                self.reinit();
                "system initialized".to_string()
            }
            Command::Create(name) => match self.volume.create(&name) {
                Ok(()) => format!("{name} created"),
                Err(err) => self.fail("create", &err),
            },
            Command::Destroy(name) => match self.volume.destroy(&name) {
                Ok(()) => format!("{name} destroyed"),
                Err(err) => self.fail("destroy", &err),
            },
            Command::Open(name) => match self.volume.open(&name) {
                Ok(slot) => format!("{name} opened {slot}"),
                Err(err) => self.fail("open", &err),
            },
            Command::Close(slot) => match self.volume.close(slot) {
                Ok(()) => format!("{slot} closed"),
                Err(err) => self.fail("close", &err),
            },
            Command::Read { slot, offset, count } => self.dispatch_read(slot, offset, count),
            Command::Write { slot, offset, count } => self.dispatch_write(slot, offset, count),
            Command::Seek { slot, position } => match self.volume.seek(slot, position) {
                Ok(position) => format!("position is {position}"),
                Err(err) => self.fail("seek", &err),
            },
            Command::Directory => self
                .volume
                .listing()
                .iter()
                .map(|(name, length)| format!("{name} {length}"))
                .collect::<Vec<_>>()
                .join(" "),
            Command::WriteMemory { offset, text } => match self.memory.write(offset, text.as_bytes()) {
                Ok(n) => format!("{n} bytes written to M"),
                Err(err) => self.fail("write_memory", &err),
            },
            Command::ReadMemory { offset, count } => match self.memory.read(offset, count) {
                Ok(text) => text,
                Err(err) => self.fail("read_memory", &err),
            },
        }
    }

    fn dispatch_read(&mut self, slot: usize, offset: usize, count: usize) -> String {
        let Some(end) = offset.checked_add(count) else {
            return self.fail("read", &svfs_fs::Error::InvalidArgument);
        };
        if end > BLOCK_SIZE {
            return self.fail("read", &svfs_fs::Error::InvalidArgument);
        }
        match self.volume.read(slot, &mut self.memory.as_mut_slice()[offset..end]) {
            Ok(n) => format!("{n} bytes read from {slot}"),
            Err(err) => self.fail("read", &err),
        }
    }

    fn dispatch_write(&mut self, slot: usize, offset: usize, count: usize) -> String {
        let Some(end) = offset.checked_add(count) else {
            return self.fail("write", &svfs_fs::Error::InvalidArgument);
        };
        if end > BLOCK_SIZE {
            return self.fail("write", &svfs_fs::Error::InvalidArgument);
        }
        match self.volume.write(slot, &self.memory.as_slice()[offset..end]) {
            Ok(n) => format!("{n} bytes written to {slot}"),
            Err(err) => self.fail("write", &err),
        }
    }

    fn fail(&self, operation: &str, err: &svfs_fs::Error) -> String {
        debug!("{operation} failed: {err}");
        "error".to_string()
    }
}

impl Default for System {
    fn default() -> Self {
        Self::new()
    }
}
