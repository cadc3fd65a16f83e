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

//! Reads `input.txt` line by line, dispatches each command through a
//! [`System`], and writes every response to `output.txt` on EOF. No
//! environment variables, no CLI flags: the two file names are fixed.

use std::fs;
use std::process::ExitCode;

use log::info;
use svfs_driver::{Command, System};

const INPUT_FILE_NAME: &str = "input.txt";
const OUTPUT_FILE_NAME: &str = "output.txt";

#[derive(Debug, thiserror::Error)]
enum DriverError {
    #[error("failed to read {INPUT_FILE_NAME}: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write {OUTPUT_FILE_NAME}: {0}")]
    Write(#[source] std::io::Error),
}

fn main() -> ExitCode {
    env_logger::init();
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<(), DriverError> {
    let input = fs::read_to_string(INPUT_FILE_NAME).map_err(DriverError::Read)?;

    let mut system = System::new();
    let mut output: Vec<String> = Vec::new();

    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        let response = match Command::parse(line) {
            Some(Command::Init) => {
                if !output.is_empty() {
                    output.push(String::new());
                }
                system.dispatch(Command::Init)
            }
            Some(command) => system.dispatch(command),
            None => "error".to_string(),
        };
        output.push(response);
    }

    info!("processed {} command(s)", output.len());
    fs::write(OUTPUT_FILE_NAME, output.join("\n") + "\n").map_err(DriverError::Write)?;
    Ok(())
}
