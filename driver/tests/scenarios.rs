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

//! The concrete command/response scenarios the command surface must
//! reproduce exactly, run end-to-end through [`System`] the way `main`
//! would drive it (minus the file I/O and blank-line bookkeeping, which
//! only matters across repeated `in` commands within one run).

use svfs_driver::{Command, System};

fn run(lines: &[&str]) -> Vec<String> {
    let mut system = System::new();
    lines
        .iter()
        .map(|line| match Command::parse(line) {
            Some(command) => system.dispatch(command),
            None => "error".to_string(),
        })
        .collect()
}

#[test]
fn scenario_create_and_list_reports_length_zero() {
    assert_eq!(
        run(&["in", "cr foo", "dr"]),
        vec!["system initialized", "foo created", "foo 0"],
    );
}

#[test]
fn scenario_name_too_long_is_an_error() {
    assert_eq!(run(&["in", "cr abcde"]), vec!["system initialized", "error"]);
}

#[test]
fn scenario_duplicate_create_is_an_error() {
    assert_eq!(
        run(&["in", "cr a", "cr a"]),
        vec!["system initialized", "a created", "error"],
    );
}

#[test]
fn scenario_write_then_seek_then_read_round_trips_through_memory() {
    assert_eq!(
        run(&[
            "in",
            "cr f",
            "op f",
            "wm 0 hello",
            "wr 1 0 5",
            "sk 1 0",
            "rd 1 0 5",
            "rm 0 5",
        ]),
        vec![
            "system initialized",
            "f created",
            "f opened 1",
            "5 bytes written to M",
            "5 bytes written to 1",
            "position is 0",
            "5 bytes read from 1",
            "hello",
        ],
    );
}

#[test]
fn scenario_writes_that_exceed_a_single_block_force_a_cross_block_swap() {
    // The scratch memory is itself only 512 bytes (matching the
    // original implementation's fixed-size `memory` array), so reaching
    // the cross-block case takes two writes rather than one literal
    // "600 bytes" write: the first fills block 0 exactly, the second
    // spills 88 bytes into block 1.
    let mut system = System::new();
    assert_eq!(system.dispatch(Command::Create("f".to_string())), "f created");
    assert_eq!(system.dispatch(Command::Open("f".to_string())), "f opened 1");

    let full_block = "X".repeat(512);
    assert_eq!(
        system.dispatch(Command::WriteMemory {
            offset: 0,
            text: full_block,
        }),
        "512 bytes written to M"
    );
    assert_eq!(
        system.dispatch(Command::Write {
            slot: 1,
            offset: 0,
            count: 512,
        }),
        "512 bytes written to 1"
    );

    let spillover = "Y".repeat(88);
    assert_eq!(
        system.dispatch(Command::WriteMemory {
            offset: 0,
            text: spillover,
        }),
        "88 bytes written to M"
    );
    assert_eq!(
        system.dispatch(Command::Write {
            slot: 1,
            offset: 0,
            count: 88,
        }),
        "88 bytes written to 1"
    );

    // The 513th written byte lives in block 1; seeking back to 512
    // flushes block 0 and loads block 1.
    assert_eq!(system.dispatch(Command::Seek { slot: 1, position: 512 }), "position is 512");
    assert_eq!(
        system.dispatch(Command::Read {
            slot: 1,
            offset: 0,
            count: 10,
        }),
        "10 bytes read from 1"
    );
}

#[test]
fn scenario_destroy_while_open_is_an_error() {
    assert_eq!(
        run(&["in", "cr f", "op f", "de f"]),
        vec!["system initialized", "f created", "f opened 1", "error"],
    );
}

#[test]
fn a_second_in_reinitializes_and_drops_the_prior_directory() {
    let mut system = System::new();
    assert_eq!(system.dispatch(Command::Create("foo".to_string())), "foo created");
    assert_eq!(system.dispatch(Command::Init), "system initialized");
    assert_eq!(system.dispatch(Command::Directory), "");
}
